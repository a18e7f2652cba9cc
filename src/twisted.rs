//! Twisted ElGamal: randomness rides on the public key and the message on a
//! second base, `(X, Y) = (r*pk, r*g + m*h)` with `pk = (1/sk)*g`.
//!
//! Decryption computes `Y - sk*X = m*h`, so the discrete-log table is built
//! over `h`, not `g`. The scheme also exposes a KEM: encapsulation publishes
//! `X = r*pk` and keeps `r*g`, which the secret key recovers as `sk*X`.

use crate::config::SystemParams;
use crate::data_structures::{ElGamalCiphertext, ElGamalKeys};
use crate::dlog::{self, ShanksSolver};
use crate::error::PkeError;
use crate::fast_mul::FixedBaseTable;
use crate::group;
use crate::parallel::join2;
use ark_ec::{CurveGroup, PrimeGroup};
use ark_ff::Field;
use ark_std::rand::Rng;
use std::path::Path;

const LOG_TARGET: &str = "elgamal::twisted";

/// Domain string for deriving the message base `h` from the generator.
///
/// `h = hash_to_point(MESSAGE_BASE_DOMAIN, compressed(g))` via deterministic
/// try-and-increment, so nobody knows a discrete-log relation between `g`
/// and `h`. Persisted tables are bound to this derivation through the file
/// header's curve tag.
pub const MESSAGE_BASE_DOMAIN: &[u8] = b"elgamal-pke/twisted-message-base/v1";

pub struct TwistedElGamal<C: CurveGroup> {
    params: SystemParams,
    solver: ShanksSolver<C>,
    gen_table: FixedBaseTable<C>,
    msg_table: FixedBaseTable<C>,
}

impl<C: CurveGroup> TwistedElGamal<C> {
    /// Derive the message base, then load or build its baby-step table.
    pub fn setup(params: SystemParams, table_dir: &Path) -> Result<Self, PkeError> {
        let g = C::generator();
        let h: C = group::hash_to_point(MESSAGE_BASE_DOMAIN, &group::point_to_bytes(&g));
        tracing::info!(
            target: LOG_TARGET,
            msg_bits = params.msg_bits,
            tuning = params.tuning,
            "initializing twisted ElGamal"
        );
        let baby_steps = dlog::load_or_build(&h, &params, table_dir)?;
        Ok(Self {
            params,
            solver: ShanksSolver::new(h, &params, baby_steps),
            gen_table: FixedBaseTable::new(g),
            msg_table: FixedBaseTable::new(h),
        })
    }

    pub fn params(&self) -> &SystemParams {
        &self.params
    }

    /// The derived message base `h`.
    pub fn message_base(&self) -> C {
        self.msg_table.base()
    }

    /// `sk` uniform in `[1, n)`, `pk = (1/sk) * g`.
    pub fn keygen<R: Rng>(&self, rng: &mut R) -> ElGamalKeys<C> {
        loop {
            let sk = group::rand_nonzero_scalar::<C, _>(rng);
            if let Some(inverse) = sk.inverse() {
                return ElGamalKeys::new(sk, self.gen_table.mul(&inverse));
            }
        }
    }

    fn message_scalar(&self, m: u64) -> Result<C::ScalarField, PkeError> {
        if m >= self.params.message_bound() {
            return Err(PkeError::MessageOutOfRange(m, self.params.msg_bits));
        }
        Ok(group::scalar_from_u64::<C>(m))
    }

    pub fn encrypt<R: Rng>(
        &self,
        pk: &C,
        m: u64,
        rng: &mut R,
    ) -> Result<ElGamalCiphertext<C>, PkeError> {
        self.encrypt_with(pk, m, &group::rand_nonzero_scalar::<C, _>(rng))
    }

    /// Encrypt with caller-supplied randomness.
    pub fn encrypt_with(
        &self,
        pk: &C,
        m: u64,
        r: &C::ScalarField,
    ) -> Result<ElGamalCiphertext<C>, PkeError> {
        let m_scalar = self.message_scalar(m)?;
        Ok(ElGamalCiphertext::new(
            *pk * *r,
            self.gen_table.mul(r) + self.msg_table.mul(&m_scalar),
        ))
    }

    /// Encrypt against a precomputed table for `pk`.
    pub fn encrypt_with_key_table(
        &self,
        pk_table: &FixedBaseTable<C>,
        m: u64,
        r: &C::ScalarField,
    ) -> Result<ElGamalCiphertext<C>, PkeError> {
        let m_scalar = self.message_scalar(m)?;
        Ok(ElGamalCiphertext::new(
            pk_table.mul(r),
            self.gen_table.mul(r) + self.msg_table.mul(&m_scalar),
        ))
    }

    /// Both ciphertext components computed concurrently; output identical to
    /// [`Self::encrypt_with`].
    pub fn encrypt_parallel_with(
        &self,
        pk: &C,
        m: u64,
        r: &C::ScalarField,
    ) -> Result<ElGamalCiphertext<C>, PkeError> {
        let m_scalar = self.message_scalar(m)?;
        let (x, y) = join2(
            || *pk * *r,
            || self.gen_table.mul(r) + self.msg_table.mul(&m_scalar),
        );
        Ok(ElGamalCiphertext::new(x, y))
    }

    pub fn encrypt_parallel<R: Rng>(
        &self,
        pk: &C,
        m: u64,
        rng: &mut R,
    ) -> Result<ElGamalCiphertext<C>, PkeError> {
        self.encrypt_parallel_with(pk, m, &group::rand_nonzero_scalar::<C, _>(rng))
    }

    /// `Y - sk*X`, the plaintext embedded as `m * h`.
    fn recover_message_point(&self, sk: &C::ScalarField, ct: &ElGamalCiphertext<C>) -> C {
        ct.y - ct.x * *sk
    }

    pub fn decrypt(&self, sk: &C::ScalarField, ct: &ElGamalCiphertext<C>) -> Result<u64, PkeError> {
        self.solver.solve(&self.recover_message_point(sk, ct))
    }

    /// Decrypt with the giant-step search spread over `dec_threads` workers.
    pub fn decrypt_parallel(
        &self,
        sk: &C::ScalarField,
        ct: &ElGamalCiphertext<C>,
    ) -> Result<u64, PkeError> {
        self.solver
            .solve_parallel(&self.recover_message_point(sk, ct), self.params.dec_threads)
    }

    /// Fresh encryption of the same plaintext under randomness `r`.
    pub fn rerandomize_with(
        &self,
        pk: &C,
        sk: &C::ScalarField,
        ct: &ElGamalCiphertext<C>,
        r: &C::ScalarField,
    ) -> ElGamalCiphertext<C> {
        let message_point = self.recover_message_point(sk, ct);
        ElGamalCiphertext::new(*pk * *r, self.gen_table.mul(r) + message_point)
    }

    pub fn rerandomize<R: Rng>(
        &self,
        pk: &C,
        sk: &C::ScalarField,
        ct: &ElGamalCiphertext<C>,
        rng: &mut R,
    ) -> ElGamalCiphertext<C> {
        self.rerandomize_with(pk, sk, ct, &group::rand_nonzero_scalar::<C, _>(rng))
    }

    /// Parallel form of [`Self::rerandomize_with`].
    pub fn rerandomize_parallel_with(
        &self,
        pk: &C,
        sk: &C::ScalarField,
        ct: &ElGamalCiphertext<C>,
        r: &C::ScalarField,
    ) -> ElGamalCiphertext<C> {
        let message_point = self.recover_message_point(sk, ct);
        let (x, y) = join2(|| *pk * *r, || self.gen_table.mul(r) + message_point);
        ElGamalCiphertext::new(x, y)
    }

    /// Encapsulate with caller-supplied randomness: `(X = r*pk, key = r*g)`.
    pub fn encaps_with(&self, pk: &C, r: &C::ScalarField) -> (C, C) {
        (*pk * *r, self.gen_table.mul(r))
    }

    /// KEM encapsulation. Returns the public share `X` and the shared key.
    pub fn encaps<R: Rng>(&self, pk: &C, rng: &mut R) -> (C, C) {
        self.encaps_with(pk, &group::rand_nonzero_scalar::<C, _>(rng))
    }

    /// KEM decapsulation: `sk * X = r*g` recovers the shared key.
    pub fn decaps(&self, sk: &C::ScalarField, x: &C) -> C {
        *x * *sk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::G1Projective;
    use ark_std::rand::Rng as _;
    use ark_std::test_rng;

    type Curve = G1Projective;
    type Scalar = <Curve as PrimeGroup>::ScalarField;

    fn test_scheme() -> (TwistedElGamal<Curve>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let params = SystemParams::new(18, 4, 4, 4).unwrap();
        let scheme = TwistedElGamal::setup(params, dir.path()).unwrap();
        (scheme, dir)
    }

    #[test]
    fn message_base_is_deterministic_and_independent() {
        let (scheme, _dir) = test_scheme();
        let (other, _dir2) = test_scheme();
        let h = scheme.message_base();
        assert_eq!(h, other.message_base());
        assert_ne!(h, Curve::generator());
    }

    #[test]
    fn key_relation_holds() {
        let (scheme, _dir) = test_scheme();
        let mut rng = test_rng();
        let keys = scheme.keygen(&mut rng);
        // pk = (1/sk) * g, so sk * pk = g.
        assert_eq!(keys.public_key * keys.secret_key, Curve::generator());
    }

    #[test]
    fn boundary_and_random_messages_round_trip() {
        let (scheme, _dir) = test_scheme();
        let mut rng = test_rng();
        let keys = scheme.keygen(&mut rng);
        let bound = scheme.params().message_bound();

        for m in [0u64, bound - 1] {
            let ct = scheme.encrypt(&keys.public_key, m, &mut rng).unwrap();
            assert_eq!(scheme.decrypt(&keys.secret_key, &ct).unwrap(), m);
        }

        for _ in 0..200 {
            let m = rng.gen_range(0..bound);
            let ct = scheme.encrypt(&keys.public_key, m, &mut rng).unwrap();
            assert_eq!(scheme.decrypt(&keys.secret_key, &ct).unwrap(), m);
        }
    }

    #[test]
    fn homomorphic_operations() {
        let (scheme, _dir) = test_scheme();
        let mut rng = test_rng();
        let keys = scheme.keygen(&mut rng);

        let ct_a = scheme.encrypt(&keys.public_key, 12345, &mut rng).unwrap();
        let ct_b = scheme.encrypt(&keys.public_key, 67890, &mut rng).unwrap();
        assert_eq!(
            scheme.decrypt(&keys.secret_key, &(&ct_a + &ct_b)).unwrap(),
            80235
        );
        assert_eq!(
            scheme.decrypt(&keys.secret_key, &(&ct_b - &ct_a)).unwrap(),
            55545
        );

        let ct = scheme.encrypt(&keys.public_key, 7, &mut rng).unwrap();
        assert_eq!(
            scheme
                .decrypt(&keys.secret_key, &ct.scale(&Scalar::from(11u64)))
                .unwrap(),
            77
        );
    }

    #[test]
    fn message_out_of_range_is_rejected() {
        let (scheme, _dir) = test_scheme();
        let mut rng = test_rng();
        let keys = scheme.keygen(&mut rng);
        let bound = scheme.params().message_bound();

        assert!(matches!(
            scheme.encrypt(&keys.public_key, bound, &mut rng),
            Err(PkeError::MessageOutOfRange(_, 18))
        ));
    }

    #[test]
    fn rerandomization_preserves_plaintext() {
        let (scheme, _dir) = test_scheme();
        let mut rng = test_rng();
        let keys = scheme.keygen(&mut rng);

        let ct = scheme.encrypt(&keys.public_key, 31415, &mut rng).unwrap();
        let fresh = scheme.rerandomize(&keys.public_key, &keys.secret_key, &ct, &mut rng);
        assert_ne!(fresh.x, ct.x);
        assert_eq!(scheme.decrypt(&keys.secret_key, &fresh).unwrap(), 31415);

        let r = group::rand_nonzero_scalar::<Curve, _>(&mut rng);
        assert_eq!(
            scheme.rerandomize_with(&keys.public_key, &keys.secret_key, &ct, &r),
            scheme.encrypt_with(&keys.public_key, 31415, &r).unwrap()
        );
    }

    #[test]
    fn parallel_forms_are_bit_identical() {
        let (scheme, _dir) = test_scheme();
        let mut rng = test_rng();
        let keys = scheme.keygen(&mut rng);
        let r = group::rand_nonzero_scalar::<Curve, _>(&mut rng);

        let serial = scheme.encrypt_with(&keys.public_key, 8080, &r).unwrap();
        assert_eq!(
            serial,
            scheme
                .encrypt_parallel_with(&keys.public_key, 8080, &r)
                .unwrap()
        );

        let r2 = group::rand_nonzero_scalar::<Curve, _>(&mut rng);
        assert_eq!(
            scheme.rerandomize_with(&keys.public_key, &keys.secret_key, &serial, &r2),
            scheme.rerandomize_parallel_with(&keys.public_key, &keys.secret_key, &serial, &r2)
        );

        assert_eq!(
            scheme.decrypt(&keys.secret_key, &serial).unwrap(),
            scheme.decrypt_parallel(&keys.secret_key, &serial).unwrap()
        );
    }

    #[test]
    fn precomputed_key_table_matches_plain_encryption() {
        let (scheme, _dir) = test_scheme();
        let mut rng = test_rng();
        let keys = scheme.keygen(&mut rng);
        let pk_table = FixedBaseTable::new(keys.public_key);
        let r = group::rand_nonzero_scalar::<Curve, _>(&mut rng);

        assert_eq!(
            scheme.encrypt_with(&keys.public_key, 555, &r).unwrap(),
            scheme.encrypt_with_key_table(&pk_table, 555, &r).unwrap()
        );
    }

    #[test]
    fn encaps_decaps_agree() {
        let (scheme, _dir) = test_scheme();
        let mut rng = test_rng();
        let keys = scheme.keygen(&mut rng);

        let (x, key) = scheme.encaps(&keys.public_key, &mut rng);
        assert_eq!(scheme.decaps(&keys.secret_key, &x), key);

        // The encapsulated key is r*g for the randomness used.
        let r = group::rand_nonzero_scalar::<Curve, _>(&mut rng);
        let (x, key) = scheme.encaps_with(&keys.public_key, &r);
        assert_eq!(key, Curve::generator() * r);
        assert_eq!(scheme.decaps(&keys.secret_key, &x), key);
    }
}
