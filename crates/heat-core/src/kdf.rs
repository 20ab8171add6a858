//! Key-derivation workload.
//!
//! Runs PBKDF2-HMAC with a fixed password and a fresh random salt, repeated
//! a configurable number of times. The derived keys are thrown away; only
//! the CPU time matters.

use std::fmt;
use std::hint::black_box;

use md5::Md5;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512, Sha512_224, Sha512_256};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512};

use crate::params::{int_param, str_param, Bounds, QueryParams};
use crate::timing::Stopwatch;
use crate::{WorkloadError, WorkloadResult};

/// Password fed to every derivation.
pub const PASSWORD: &str = "dummy-password";

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Default PBKDF2 iteration count.
pub const DEFAULT_ITERATIONS: u32 = 300_000;
/// Default number of back-to-back derivations.
pub const DEFAULT_PARALLEL: u32 = 1;
/// Default derived key length in bytes.
pub const DEFAULT_KEYLEN: usize = 32;
/// Default digest name.
pub const DEFAULT_DIGEST: &str = "sha512";

/// Iterations are only clamped from below. Counts PBKDF2 cannot take fail
/// when the workload runs.
pub const ITERATIONS_BOUNDS: Bounds = Bounds::at_least(1);
/// Allowed number of derivations per request.
pub const PARALLEL_BOUNDS: Bounds = Bounds::new(1, 16);
/// Allowed derived key length.
pub const KEYLEN_BOUNDS: Bounds = Bounds::new(32, 64);

/// Hash function used inside PBKDF2-HMAC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Digest {
    Md5,
    Ripemd160,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Sha512_224,
    Sha512_256,
    Sha3_224,
    Sha3_256,
    Sha3_384,
    Sha3_512,
}

impl Digest {
    /// Every supported digest.
    pub const ALL: [Digest; 13] = [
        Digest::Md5,
        Digest::Ripemd160,
        Digest::Sha1,
        Digest::Sha224,
        Digest::Sha256,
        Digest::Sha384,
        Digest::Sha512,
        Digest::Sha512_224,
        Digest::Sha512_256,
        Digest::Sha3_224,
        Digest::Sha3_256,
        Digest::Sha3_384,
        Digest::Sha3_512,
    ];

    /// Resolve a digest by name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Result<Self, WorkloadError> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| WorkloadError::UnsupportedDigest(name.to_string()))
    }

    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Digest::Md5 => "md5",
            Digest::Ripemd160 => "ripemd160",
            Digest::Sha1 => "sha1",
            Digest::Sha224 => "sha224",
            Digest::Sha256 => "sha256",
            Digest::Sha384 => "sha384",
            Digest::Sha512 => "sha512",
            Digest::Sha512_224 => "sha512-224",
            Digest::Sha512_256 => "sha512-256",
            Digest::Sha3_224 => "sha3-224",
            Digest::Sha3_256 => "sha3-256",
            Digest::Sha3_384 => "sha3-384",
            Digest::Sha3_512 => "sha3-512",
        }
    }

    /// Derive `out.len()` bytes of key material.
    pub fn derive(&self, password: &[u8], salt: &[u8], rounds: u32, out: &mut [u8]) {
        match self {
            Digest::Md5 => pbkdf2_hmac::<Md5>(password, salt, rounds, out),
            Digest::Ripemd160 => pbkdf2_hmac::<Ripemd160>(password, salt, rounds, out),
            Digest::Sha1 => pbkdf2_hmac::<Sha1>(password, salt, rounds, out),
            Digest::Sha224 => pbkdf2_hmac::<Sha224>(password, salt, rounds, out),
            Digest::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, rounds, out),
            Digest::Sha384 => pbkdf2_hmac::<Sha384>(password, salt, rounds, out),
            Digest::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, rounds, out),
            Digest::Sha512_224 => pbkdf2_hmac::<Sha512_224>(password, salt, rounds, out),
            Digest::Sha512_256 => pbkdf2_hmac::<Sha512_256>(password, salt, rounds, out),
            Digest::Sha3_224 => pbkdf2_hmac::<Sha3_224>(password, salt, rounds, out),
            Digest::Sha3_256 => pbkdf2_hmac::<Sha3_256>(password, salt, rounds, out),
            Digest::Sha3_384 => pbkdf2_hmac::<Sha3_384>(password, salt, rounds, out),
            Digest::Sha3_512 => pbkdf2_hmac::<Sha3_512>(password, salt, rounds, out),
        }
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate a random salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

/// Clamped parameters for the key-derivation workload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDerivationParams {
    iterations: u64,
    parallel: u32,
    keylen: usize,
    digest: String,
}

impl KeyDerivationParams {
    /// Create parameters from raw values, clamping each into range.
    ///
    /// The digest name is kept as given and only resolved when the
    /// workload runs.
    pub fn new(iterations: i64, parallel: i64, keylen: i64, digest: impl Into<String>) -> Self {
        Self {
            iterations: ITERATIONS_BOUNDS.clamp(iterations) as u64,
            parallel: PARALLEL_BOUNDS.clamp(parallel) as u32,
            keylen: KEYLEN_BOUNDS.clamp(keylen) as usize,
            digest: digest.into(),
        }
    }

    /// Build from `iter`, `par`, `keylen` and `digest` query parameters.
    pub fn from_query(query: &QueryParams) -> Self {
        Self::new(
            int_param(query, "iter", i64::from(DEFAULT_ITERATIONS)),
            int_param(query, "par", i64::from(DEFAULT_PARALLEL)),
            int_param(query, "keylen", DEFAULT_KEYLEN as i64),
            str_param(query, "digest", DEFAULT_DIGEST),
        )
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn parallel(&self) -> u32 {
        self.parallel
    }

    pub fn keylen(&self) -> usize {
        self.keylen
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Run `parallel` derivations back to back on the calling thread.
    pub fn run(&self) -> Result<WorkloadResult, WorkloadError> {
        let watch = Stopwatch::start();
        let digest = Digest::from_name(&self.digest)?;
        let rounds = u32::try_from(self.iterations)
            .map_err(|_| WorkloadError::IterationsOutOfRange(self.iterations))?;
        let mut key = vec![0u8; self.keylen];

        for _ in 0..self.parallel {
            let salt = generate_salt();
            digest.derive(PASSWORD.as_bytes(), &salt, rounds, &mut key);
            black_box(&key);
        }

        Ok(WorkloadResult::Pbkdf2 {
            iterations: rounds,
            parallel: self.parallel,
            keylen: self.keylen,
            digest: self.digest.clone(),
            ms: watch.elapsed_ms(),
        })
    }
}

impl Default for KeyDerivationParams {
    fn default() -> Self {
        Self::from_query(&QueryParams::new())
    }
}
