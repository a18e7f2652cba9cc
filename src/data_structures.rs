use crate::error::PkeError;
use crate::group;
use ark_ec::CurveGroup;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// ElGamal ciphertext, shared by the lifted and twisted variants.
///
/// The wire encoding is the concatenation of the two compressed points,
/// which is exactly what the canonical-serialize derive produces.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, CanonicalSerialize, CanonicalDeserialize,
)]
#[serde(bound(
    serialize = "C: CanonicalSerialize",
    deserialize = "C: CanonicalDeserialize"
))]
pub struct ElGamalCiphertext<C: CurveGroup> {
    #[serde(with = "crate::crypto_serde::curve")]
    pub x: C,
    #[serde(with = "crate::crypto_serde::curve")]
    pub y: C,
}

impl<C: CurveGroup> ElGamalCiphertext<C> {
    pub fn new(x: C, y: C) -> Self {
        Self { x, y }
    }

    /// Scalar homomorphism: an encryption of `k * m` from an encryption of `m`.
    pub fn scale(&self, k: &C::ScalarField) -> Self {
        Self::new(self.x * *k, self.y * *k)
    }

    /// Wire encoding `compressed(X) || compressed(Y)`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = group::point_to_bytes(&self.x);
        bytes.extend_from_slice(&group::point_to_bytes(&self.y));
        bytes
    }

    /// Decode a ciphertext from its wire encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PkeError> {
        let width = group::compressed_point_size::<C>();
        if bytes.len() != 2 * width {
            return Err(PkeError::DecodingFailed);
        }
        Ok(Self::new(
            group::point_from_bytes(&bytes[..width])?,
            group::point_from_bytes(&bytes[width..])?,
        ))
    }
}

/// Component-wise addition: decrypts to the sum of the two plaintexts.
impl<C: CurveGroup> Add for &ElGamalCiphertext<C> {
    type Output = ElGamalCiphertext<C>;

    fn add(self, other: Self) -> ElGamalCiphertext<C> {
        ElGamalCiphertext::new(self.x + other.x, self.y + other.y)
    }
}

/// Component-wise subtraction: decrypts to the difference of the plaintexts.
impl<C: CurveGroup> Sub for &ElGamalCiphertext<C> {
    type Output = ElGamalCiphertext<C>;

    fn sub(self, other: Self) -> ElGamalCiphertext<C> {
        ElGamalCiphertext::new(self.x - other.x, self.y - other.y)
    }
}

/// A secret scalar together with the matching public key.
///
/// The relation between the two differs per scheme (`pk = sk * g` lifted,
/// `pk = (1/sk) * g` twisted); the scheme modules own key generation.
#[derive(Clone, Debug)]
pub struct ElGamalKeys<C: CurveGroup> {
    pub secret_key: C::ScalarField,
    pub public_key: C,
}

impl<C: CurveGroup> ElGamalKeys<C> {
    pub fn new(secret_key: C::ScalarField, public_key: C) -> Self {
        Self {
            secret_key,
            public_key,
        }
    }
}
