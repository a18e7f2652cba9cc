use crate::error::PkeError;
use serde::{Deserialize, Serialize};

/// System-wide tuning parameters shared by both ElGamal variants.
///
/// `msg_bits` is the message-space bit length L: plaintexts live in
/// `[0, 2^L)`. `tuning` trades baby-step table space for giant-step time:
/// the table holds `2^(L/2 + tuning)` entries and decryption walks at most
/// `2^(L/2 - tuning)` giant steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemParams {
    pub msg_bits: u32,
    pub tuning: u32,
    /// Worker count for the parallel table build.
    pub io_threads: usize,
    /// Worker count for the parallel giant-step search.
    pub dec_threads: usize,
}

impl SystemParams {
    pub fn new(
        msg_bits: u32,
        tuning: u32,
        io_threads: usize,
        dec_threads: usize,
    ) -> Result<Self, PkeError> {
        if msg_bits == 0 || msg_bits > 62 {
            return Err(PkeError::InvalidParameters(format!(
                "msg_bits must be in [1, 62], got {msg_bits}"
            )));
        }
        if msg_bits % 2 != 0 {
            return Err(PkeError::InvalidParameters(format!(
                "msg_bits must be even, got {msg_bits}"
            )));
        }
        if tuning > msg_bits / 2 {
            return Err(PkeError::InvalidParameters(format!(
                "tuning must be in [0, {}], got {tuning}",
                msg_bits / 2
            )));
        }
        if io_threads == 0 || dec_threads == 0 {
            return Err(PkeError::InvalidParameters(
                "thread counts must be nonzero".into(),
            ));
        }
        Ok(Self {
            msg_bits,
            tuning,
            io_threads,
            dec_threads,
        })
    }

    /// Baby-step table size N = 2^(L/2 + t).
    pub fn baby_count(&self) -> u64 {
        1u64 << (self.msg_bits / 2 + self.tuning)
    }

    /// Giant-step count G = 2^(L/2 - t).
    pub fn giant_count(&self) -> u64 {
        1u64 << (self.msg_bits / 2 - self.tuning)
    }

    /// Exclusive upper bound of the message space, 2^L.
    pub fn message_bound(&self) -> u64 {
        1u64 << self.msg_bits
    }
}
