//! Workload errors.

use thiserror::Error;

/// Errors raised while running a workload.
///
/// Malformed or out-of-range parameters never end up here: they are
/// replaced by defaults or clamped. Only failures of the computation itself
/// are reported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkloadError {
    /// The requested digest is not a known PBKDF2 hash function.
    #[error("Digest method not supported: {0}")]
    UnsupportedDigest(String),

    /// The iteration count does not fit the 32-bit round counter.
    #[error("Iterations out of range: {0} (must be between 1 and {max})", max = u32::MAX)]
    IterationsOutOfRange(u64),
}

impl WorkloadError {
    /// Name of the workload that failed.
    pub fn op(&self) -> &'static str {
        match self {
            WorkloadError::UnsupportedDigest(_) | WorkloadError::IterationsOutOfRange(_) => {
                "pbkdf2"
            }
        }
    }
}
