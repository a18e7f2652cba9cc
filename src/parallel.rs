//! Two-way fork-join wrappers for operations whose ciphertext components
//! have no data dependency.
//!
//! Each wrapper runs one component on a scoped worker thread and the other
//! on the calling thread, then joins. Outputs are bit-identical to the
//! serial forms.

use crate::data_structures::ElGamalCiphertext;
use ark_ec::CurveGroup;

/// Run two independent computations concurrently and return both results.
///
/// `left` runs on a scoped worker; `right` runs on the calling thread. A
/// panic on the worker is resumed on the caller.
pub fn join2<T, U>(left: impl FnOnce() -> T + Send, right: impl FnOnce() -> U + Send) -> (T, U)
where
    T: Send,
    U: Send,
{
    std::thread::scope(|scope| {
        let handle = scope.spawn(left);
        let right_value = right();
        let left_value = match handle.join() {
            Ok(value) => value,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        (left_value, right_value)
    })
}

/// Parallel form of component-wise ciphertext addition.
pub fn homo_add_parallel<C: CurveGroup>(
    a: &ElGamalCiphertext<C>,
    b: &ElGamalCiphertext<C>,
) -> ElGamalCiphertext<C> {
    let (x, y) = join2(|| a.x + b.x, || a.y + b.y);
    ElGamalCiphertext::new(x, y)
}

/// Parallel form of component-wise ciphertext subtraction.
pub fn homo_sub_parallel<C: CurveGroup>(
    a: &ElGamalCiphertext<C>,
    b: &ElGamalCiphertext<C>,
) -> ElGamalCiphertext<C> {
    let (x, y) = join2(|| a.x - b.x, || a.y - b.y);
    ElGamalCiphertext::new(x, y)
}

/// Parallel form of the scalar homomorphism.
pub fn scalar_mul_parallel<C: CurveGroup>(
    ct: &ElGamalCiphertext<C>,
    k: &C::ScalarField,
) -> ElGamalCiphertext<C> {
    let (x, y) = join2(|| ct.x * *k, || ct.y * *k);
    ElGamalCiphertext::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::G1Projective;
    use ark_ec::PrimeGroup;
    use ark_std::UniformRand;

    type Curve = G1Projective;
    type Scalar = <Curve as PrimeGroup>::ScalarField;

    fn sample(rng: &mut impl ark_std::rand::Rng) -> ElGamalCiphertext<Curve> {
        ElGamalCiphertext::new(Curve::rand(rng), Curve::rand(rng))
    }

    #[test]
    fn parallel_forms_match_serial_forms() {
        let mut rng = rand::thread_rng();
        let a = sample(&mut rng);
        let b = sample(&mut rng);
        let k = Scalar::rand(&mut rng);

        assert_eq!(homo_add_parallel(&a, &b), &a + &b);
        assert_eq!(homo_sub_parallel(&a, &b), &a - &b);
        assert_eq!(scalar_mul_parallel(&a, &k), a.scale(&k));
    }
}
