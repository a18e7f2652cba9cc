//! Thin adapter over the arkworks group API.
//!
//! Point addition, subtraction, doubling, negation and equality come straight
//! from [`CurveGroup`]; this module only adds the pieces the schemes need on
//! top: random sampling, canonical compressed byte codecs, a deterministic
//! hash-to-point, and a two-term multi-scalar multiplication.

use crate::error::PkeError;
use ark_ec::CurveGroup;
use ark_ff::UniformRand;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::rand::Rng;
use ark_std::Zero;
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake128;

/// Sample a uniformly random scalar in `[0, n)`.
pub fn rand_scalar<C: CurveGroup, R: Rng>(rng: &mut R) -> C::ScalarField {
    C::ScalarField::rand(rng)
}

/// Sample a uniformly random scalar in `[1, n)`.
pub fn rand_nonzero_scalar<C: CurveGroup, R: Rng>(rng: &mut R) -> C::ScalarField {
    loop {
        let s = C::ScalarField::rand(rng);
        if !s.is_zero() {
            return s;
        }
    }
}

/// Sample a random group element as `r * g` for uniform `r`.
pub fn rand_point<C: CurveGroup, R: Rng>(rng: &mut R) -> C {
    C::generator() * rand_scalar::<C, _>(rng)
}

/// Two-term multi-scalar multiplication `a * p + b * q`.
pub fn multi_mul<C: CurveGroup>(a: &C::ScalarField, p: &C, b: &C::ScalarField, q: &C) -> C {
    *p * *a + *q * *b
}

/// Width in bytes of the canonical compressed point encoding for `C`.
pub fn compressed_point_size<C: CurveGroup>() -> usize {
    C::generator().into_affine().compressed_size()
}

/// Canonical compressed encoding of a group element.
pub fn point_to_bytes<C: CurveGroup>(point: &C) -> Vec<u8> {
    let affine = point.into_affine();
    let mut bytes = Vec::with_capacity(affine.compressed_size());
    affine
        .serialize_compressed(&mut bytes)
        .expect("compressed serialization into a Vec cannot fail");
    bytes
}

/// Decode a group element from its canonical compressed encoding.
///
/// Rejects malformed bytes, off-curve encodings and trailing garbage.
pub fn point_from_bytes<C: CurveGroup>(bytes: &[u8]) -> Result<C, PkeError> {
    if bytes.len() != compressed_point_size::<C>() {
        return Err(PkeError::DecodingFailed);
    }
    let affine = C::Affine::deserialize_compressed(bytes).map_err(|_| PkeError::DecodingFailed)?;
    Ok(affine.into())
}

/// Fixed-width big-endian encoding of a scalar.
pub fn scalar_to_bytes<C: CurveGroup>(scalar: &C::ScalarField) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(scalar.compressed_size());
    scalar
        .serialize_compressed(&mut bytes)
        .expect("compressed serialization into a Vec cannot fail");
    // arkworks emits little-endian limb bytes; the wire format is big-endian.
    bytes.reverse();
    bytes
}

/// Decode a scalar from its fixed-width big-endian encoding.
pub fn scalar_from_bytes<C: CurveGroup>(bytes: &[u8]) -> Result<C::ScalarField, PkeError> {
    let mut le = bytes.to_vec();
    le.reverse();
    C::ScalarField::deserialize_compressed(le.as_slice()).map_err(|_| PkeError::DecodingFailed)
}

/// Deterministic, domain-separated hash onto the group.
///
/// Try-and-increment: Shake128 over `domain || input || counter` produces
/// compressed-width candidates until one decodes as a valid non-identity
/// point. Deterministic for a fixed `(domain, input)` pair.
pub fn hash_to_point<C: CurveGroup>(domain: &[u8], input: &[u8]) -> C {
    let width = compressed_point_size::<C>();
    let mut candidate = vec![0u8; width];
    for counter in 0u32..=u32::MAX {
        let mut hasher = Shake128::default();
        hasher.update(domain);
        hasher.update(input);
        hasher.update(&counter.to_le_bytes());
        hasher.finalize_xof().read(&mut candidate);
        if let Ok(affine) = C::Affine::deserialize_compressed(candidate.as_slice()) {
            let point: C = affine.into();
            if !point.is_zero() {
                return point;
            }
        }
    }
    unreachable!("hash-to-point exhausted its counter space")
}

/// Embed a small message into the scalar field.
pub fn scalar_from_u64<C: CurveGroup>(value: u64) -> C::ScalarField {
    C::ScalarField::from(value)
}
