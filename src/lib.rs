//! Additively homomorphic ElGamal public-key encryption over prime-order
//! elliptic-curve groups.
//!
//! Two variants are provided: [`LiftedElGamal`] (`X = r*g, Y = m*g + r*pk`)
//! and [`TwistedElGamal`] (`X = r*pk, Y = r*g + m*h`). Both embed the
//! message in the exponent, so decryption recovers `m` from `m*base` with a
//! Shanks baby-step/giant-step solver backed by a precomputed, persisted
//! lookup table. Fixed-base scalar multiplications go through a wNAF engine
//! with block splitting.

pub mod config;
pub mod crypto_serde;
pub mod data_structures;
pub mod dlog;
pub mod error;
pub mod fast_mul;
pub mod group;
pub mod lifted;
pub mod parallel;
pub mod serialization;
pub mod twisted;

pub use config::SystemParams;
pub use data_structures::{ElGamalCiphertext, ElGamalKeys};
pub use error::PkeError;
pub use fast_mul::FixedBaseTable;
pub use lifted::LiftedElGamal;
pub use twisted::TwistedElGamal;
