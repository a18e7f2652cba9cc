//! Lifted ElGamal: the classic scheme with the message in the exponent,
//! `(X, Y) = (r*g, m*g + r*pk)`. Additively homomorphic; decryption needs
//! the bounded discrete-log solver to pull `m` back out of `m*g`.

use crate::config::SystemParams;
use crate::data_structures::{ElGamalCiphertext, ElGamalKeys};
use crate::dlog::{self, ShanksSolver};
use crate::error::PkeError;
use crate::fast_mul::FixedBaseTable;
use crate::group;
use crate::parallel::join2;
use ark_ec::{CurveGroup, PrimeGroup};
use ark_std::rand::Rng;
use std::path::Path;

const LOG_TARGET: &str = "elgamal::lifted";

pub struct LiftedElGamal<C: CurveGroup> {
    params: SystemParams,
    solver: ShanksSolver<C>,
    gen_table: FixedBaseTable<C>,
}

impl<C: CurveGroup> LiftedElGamal<C> {
    /// Load or build the baby-step table for the generator and precompute
    /// the fixed-base multiplication table.
    pub fn setup(params: SystemParams, table_dir: &Path) -> Result<Self, PkeError> {
        let g = C::generator();
        tracing::info!(
            target: LOG_TARGET,
            msg_bits = params.msg_bits,
            tuning = params.tuning,
            "initializing lifted ElGamal"
        );
        let baby_steps = dlog::load_or_build(&g, &params, table_dir)?;
        Ok(Self {
            params,
            solver: ShanksSolver::new(g, &params, baby_steps),
            gen_table: FixedBaseTable::new(g),
        })
    }

    pub fn params(&self) -> &SystemParams {
        &self.params
    }

    /// `sk` uniform in `[1, n)`, `pk = sk * g`.
    pub fn keygen<R: Rng>(&self, rng: &mut R) -> ElGamalKeys<C> {
        let sk = group::rand_nonzero_scalar::<C, _>(rng);
        ElGamalKeys::new(sk, self.gen_table.mul(&sk))
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
        let x = self.gen_table.mul(r);
        let y = group::multi_mul(&m_scalar, &self.gen_table.base(), r, pk);
        Ok(ElGamalCiphertext::new(x, y))
    }

    /// Encrypt against a precomputed table for `pk`, for callers that reuse
    /// one public key across many encryptions.
    pub fn encrypt_with_key_table(
        &self,
        pk_table: &FixedBaseTable<C>,
        m: u64,
        r: &C::ScalarField,
    ) -> Result<ElGamalCiphertext<C>, PkeError> {
        let m_scalar = self.message_scalar(m)?;
        Ok(ElGamalCiphertext::new(
            self.gen_table.mul(r),
            self.gen_table.mul(&m_scalar) + pk_table.mul(r),
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
            || self.gen_table.mul(r),
            || group::multi_mul(&m_scalar, &self.gen_table.base(), r, pk),
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

    /// `Y - sk*X`, the plaintext embedded as `m * g`.
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
    ///
    /// Recovers `m*g` with the secret key first, which costs fewer group
    /// operations than layering homomorphic randomness on top and resets the
    /// accumulated randomness to exactly `r`.
    pub fn rerandomize_with(
        &self,
        pk: &C,
        sk: &C::ScalarField,
        ct: &ElGamalCiphertext<C>,
        r: &C::ScalarField,
    ) -> ElGamalCiphertext<C> {
        let message_point = self.recover_message_point(sk, ct);
        ElGamalCiphertext::new(self.gen_table.mul(r), *pk * *r + message_point)
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
        let (x, y) = join2(|| self.gen_table.mul(r), || *pk * *r + message_point);
        ElGamalCiphertext::new(x, y)
    }
}
