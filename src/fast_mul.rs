//! Fixed-base scalar multiplication via wNAF with block splitting.
//!
//! The precomputed table stores odd multiples of `2^(8j) * base` for every
//! 8-digit block `j` of a wNAF, so one table serves every scalar width and a
//! multiplication needs at most 8 doublings plus one addition per nonzero
//! digit.

use ark_ec::CurveGroup;
use ark_ff::{AdditiveGroup, PrimeField};
use ark_std::Zero;

/// wNAF digit positions per splitting block.
const BLOCK_SIZE: usize = 8;

/// Window width ladder by scalar bit size.
fn window_bits_for_scalar_size(bits: usize) -> usize {
    if bits >= 2000 {
        6
    } else if bits >= 800 {
        5
    } else if bits >= 300 {
        4
    } else if bits >= 70 {
        3
    } else if bits >= 20 {
        2
    } else {
        1
    }
}

/// Signed odd-digit wNAF of `scalar`, least significant digit first.
///
/// Digits are odd values in `(-2^window, 2^window)` with at least
/// `window - 1` zeros after every nonzero digit.
fn wnaf_form<F: PrimeField>(scalar: &F, window: usize) -> Vec<i32> {
    debug_assert!((2..=30).contains(&window));
    let mut limbs: Vec<u64> = scalar.into_bigint().as_ref().to_vec();
    limbs.push(0);

    let bit_len = F::MODULUS_BIT_SIZE as usize + 1;
    let width = 1u64 << window;
    let half = (width / 2) as i64;
    let mask = width - 1;

    let mut digits: Vec<i32> = Vec::with_capacity(bit_len + window);
    let mut pos = 0usize;
    let mut carry = 0u64;
    while pos < bit_len || carry != 0 {
        let limb = pos / 64;
        let bit = pos % 64;
        let mut buf = limbs.get(limb).copied().unwrap_or(0) >> bit;
        if bit != 0 {
            buf |= limbs.get(limb + 1).copied().unwrap_or(0) << (64 - bit);
        }
        let window_val = carry + (buf & mask);
        if window_val & 1 == 0 {
            digits.push(0);
            pos += 1;
            continue;
        }
        if (window_val as i64) < half {
            carry = 0;
            digits.push(window_val as i32);
        } else {
            carry = 1;
            digits.push(window_val as i32 - width as i32);
        }
        digits.extend(std::iter::repeat(0).take(window - 1));
        pos += window;
    }
    while digits.last() == Some(&0) {
        digits.pop();
    }
    digits
}

/// Precomputed odd multiples of a fixed base, laid out per splitting block.
///
/// Entry `j * 2^(w-1) + k` holds `(2k+1) * 2^(8j) * base` in affine form.
/// Read-only after construction and freely shareable across threads.
pub struct FixedBaseTable<C: CurveGroup> {
    base: C,
    window: usize,
    num_blocks: usize,
    points: Vec<C::Affine>,
}

impl<C: CurveGroup> FixedBaseTable<C> {
    /// Build the table for `base`. Single-threaded and deterministic.
    pub fn new(base: C) -> Self {
        let bits = <C::ScalarField as PrimeField>::MODULUS_BIT_SIZE as usize;
        let window = window_bits_for_scalar_size(bits).max(4);
        let num_blocks = (bits + BLOCK_SIZE - 1) / BLOCK_SIZE;
        let per_block = 1usize << (window - 1);

        let mut projective = Vec::with_capacity(num_blocks * per_block);
        let mut block_base = base;
        for block in 0..num_blocks {
            let twice = block_base.double();
            let mut odd = block_base;
            projective.push(odd);
            for _ in 1..per_block {
                odd += twice;
                projective.push(odd);
            }
            if block < num_blocks - 1 {
                for _ in 0..BLOCK_SIZE {
                    block_base.double_in_place();
                }
            }
        }

        Self {
            base,
            window,
            num_blocks,
            points: C::normalize_batch(&projective),
        }
    }

    /// The base point this table was built for.
    pub fn base(&self) -> C {
        self.base
    }

    /// Compute `scalar * base` using the precomputed table.
    pub fn mul(&self, scalar: &C::ScalarField) -> C {
        let digits = wnaf_form(scalar, self.window);
        if digits.is_empty() {
            return C::zero();
        }
        let per_block = 1usize << (self.window - 1);
        let mut acc = C::zero();
        if digits.len() <= self.num_blocks * BLOCK_SIZE {
            let used_blocks = (digits.len() + BLOCK_SIZE - 1) / BLOCK_SIZE;
            for pos in (0..BLOCK_SIZE).rev() {
                acc.double_in_place();
                for block in 0..used_blocks {
                    let idx = block * BLOCK_SIZE + pos;
                    if idx >= digits.len() {
                        continue;
                    }
                    let digit = digits[idx];
                    if digit == 0 {
                        continue;
                    }
                    let entry = self.points[block * per_block + (digit.unsigned_abs() as usize >> 1)];
                    if digit > 0 {
                        acc += entry;
                    } else {
                        acc -= entry;
                    }
                }
            }
        } else {
            // wNAF longer than the split table covers; plain wNAF over the
            // first block's odd multiples.
            for &digit in digits.iter().rev() {
                acc.double_in_place();
                if digit == 0 {
                    continue;
                }
                let entry = self.points[digit.unsigned_abs() as usize >> 1];
                if digit > 0 {
                    acc += entry;
                } else {
                    acc -= entry;
                }
            }
        }
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::G1Projective;
    use ark_ec::PrimeGroup;
    use ark_ff::One;
    use ark_std::{test_rng, UniformRand};

    type Curve = G1Projective;
    type Scalar = <Curve as PrimeGroup>::ScalarField;

    fn scalar_value(digits: &[i32]) -> i128 {
        digits
            .iter()
            .enumerate()
            .map(|(i, &d)| (d as i128) << i)
            .sum()
    }

    #[test]
    fn wnaf_digits_are_odd_and_sparse() {
        for value in [0u64, 1, 2, 0xdead_beef, u64::MAX] {
            let scalar = Scalar::from(value);
            let digits = wnaf_form(&scalar, 4);
            for (i, &d) in digits.iter().enumerate() {
                if d != 0 {
                    assert_eq!(d.unsigned_abs() % 2, 1, "even digit at {i}");
                    assert!(d.unsigned_abs() < 16, "digit {d} out of window");
                    for j in 1..4 {
                        assert_eq!(digits.get(i + j).copied().unwrap_or(0), 0);
                    }
                }
            }
            assert_eq!(scalar_value(&digits), value as i128);
        }
    }

    #[test]
    fn table_shape_matches_parameters() {
        let mut rng = test_rng();
        let base = Curve::rand(&mut rng);
        let table = FixedBaseTable::new(base);
        assert_eq!(
            table.points.len(),
            table.num_blocks << (table.window - 1)
        );
        assert_eq!(table.base(), base);
    }

    #[test]
    fn fast_mul_matches_naive_for_random_scalars() {
        let mut rng = test_rng();
        let base = Curve::rand(&mut rng);
        let table = FixedBaseTable::new(base);
        for _ in 0..256 {
            let scalar = Scalar::rand(&mut rng);
            assert_eq!(table.mul(&scalar), base * scalar);
        }
    }

    #[test]
    fn fast_mul_edge_scalars() {
        let mut rng = test_rng();
        let base = Curve::rand(&mut rng);
        let table = FixedBaseTable::new(base);

        assert!(table.mul(&Scalar::ZERO).is_zero());
        assert_eq!(table.mul(&Scalar::one()), base);
        assert_eq!(table.mul(&Scalar::from(2u64)), base.double());
        let minus_one = -Scalar::one();
        assert_eq!(table.mul(&minus_one), -base);
    }

    #[test]
    fn fast_mul_on_second_curve() {
        let mut rng = test_rng();
        let base = ark_grumpkin::Projective::rand(&mut rng);
        let table = FixedBaseTable::new(base);
        for _ in 0..32 {
            let scalar = <ark_grumpkin::Projective as PrimeGroup>::ScalarField::rand(&mut rng);
            assert_eq!(table.mul(&scalar), base * scalar);
        }
    }
}
