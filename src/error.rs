use thiserror::Error;

#[derive(Error, Debug)]
pub enum PkeError {
    #[error("message {0} out of range [0, 2^{1})")]
    MessageOutOfRange(u64, u32),

    #[error("failed to decode group element or scalar bytes")]
    DecodingFailed,

    #[error("persisted dlog table does not match expected parameters: {0}")]
    TableMismatch(String),

    #[error("discrete log not found in range [0, 2^{0})")]
    NotFoundInRange(u32),

    #[error("table file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}
