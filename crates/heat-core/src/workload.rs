//! Workload definition and dispatch.

use std::fmt;

use serde::Serialize;

use crate::kdf::KeyDerivationParams;
use crate::matrix::MatrixParams;
use crate::params::QueryParams;
use crate::primes::PrimeCountParams;
use crate::WorkloadError;

/// The kinds of workload the library can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Pbkdf2,
    Primes,
    Matmul,
}

impl WorkloadKind {
    /// Every workload kind, in route order.
    pub const ALL: [WorkloadKind; 3] = [
        WorkloadKind::Pbkdf2,
        WorkloadKind::Primes,
        WorkloadKind::Matmul,
    ];

    /// Operation name, as reported in the `op` field.
    pub fn name(&self) -> &'static str {
        match self {
            WorkloadKind::Pbkdf2 => "pbkdf2",
            WorkloadKind::Primes => "primes",
            WorkloadKind::Matmul => "matmul",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A fully clamped request for one workload invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkloadRequest {
    Pbkdf2(KeyDerivationParams),
    Primes(PrimeCountParams),
    Matmul(MatrixParams),
}

impl WorkloadRequest {
    /// Build a request from query parameters, substituting defaults and
    /// clamping.
    pub fn from_query(kind: WorkloadKind, query: &QueryParams) -> Self {
        match kind {
            WorkloadKind::Pbkdf2 => Self::Pbkdf2(KeyDerivationParams::from_query(query)),
            WorkloadKind::Primes => Self::Primes(PrimeCountParams::from_query(query)),
            WorkloadKind::Matmul => Self::Matmul(MatrixParams::from_query(query)),
        }
    }

    /// The workload this request runs.
    pub fn kind(&self) -> WorkloadKind {
        match self {
            Self::Pbkdf2(_) => WorkloadKind::Pbkdf2,
            Self::Primes(_) => WorkloadKind::Primes,
            Self::Matmul(_) => WorkloadKind::Matmul,
        }
    }

    /// Run the workload to completion on the calling thread.
    pub fn run(&self) -> Result<WorkloadResult, WorkloadError> {
        match self {
            Self::Pbkdf2(params) => params.run(),
            Self::Primes(params) => Ok(params.run()),
            Self::Matmul(params) => Ok(params.run()),
        }
    }
}

/// Outcome of one workload run: the clamped parameters actually used, the
/// workload output, and the elapsed milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum WorkloadResult {
    Pbkdf2 {
        iterations: u32,
        parallel: u32,
        keylen: usize,
        digest: String,
        ms: u64,
    },
    Primes {
        limit: u64,
        count: u64,
        ms: u64,
    },
    Matmul {
        n: usize,
        ms: u64,
    },
}

impl WorkloadResult {
    /// The workload that produced this result.
    pub fn kind(&self) -> WorkloadKind {
        match self {
            Self::Pbkdf2 { .. } => WorkloadKind::Pbkdf2,
            Self::Primes { .. } => WorkloadKind::Primes,
            Self::Matmul { .. } => WorkloadKind::Matmul,
        }
    }

    /// Elapsed wall-clock milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        match self {
            Self::Pbkdf2 { ms, .. } | Self::Primes { ms, .. } | Self::Matmul { ms, .. } => *ms,
        }
    }
}
