//! CPU-burn workload library.
//!
//! This crate provides the workloads served by the heat service:
//! - `KeyDerivationParams` - PBKDF2 key derivation repeated N times
//! - `PrimeCountParams` - naive trial-division prime counting
//! - `MatrixParams` - dense `f64` matrix multiplication
//!
//! Every workload is a pure, synchronous function of its clamped parameters.
//! Parameters are built from raw query values with `from_query`, which
//! substitutes defaults for missing or unparseable input before clamping.

mod error;
mod kdf;
mod matrix;
mod params;
mod primes;
mod timing;
mod workload;

pub use error::*;
pub use kdf::*;
pub use matrix::*;
pub use params::*;
pub use primes::*;
pub use timing::*;
pub use workload::*;
