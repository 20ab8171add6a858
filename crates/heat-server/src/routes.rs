//! Route table.

use heat_core::WorkloadKind;
use http::Method;

/// Plain-text body served at `/`.
pub const USAGE: &str = "High-CPU Dummy App. Try /pbkdf2, /primes, /matmul";

/// A resolved route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Usage hint.
    Index,
    /// One of the CPU-burn workloads.
    Workload(WorkloadKind),
}

impl Route {
    /// Path this route is served at.
    pub fn path(&self) -> &'static str {
        match self {
            Route::Index => "/",
            Route::Workload(WorkloadKind::Pbkdf2) => "/pbkdf2",
            Route::Workload(WorkloadKind::Primes) => "/primes",
            Route::Workload(WorkloadKind::Matmul) => "/matmul",
        }
    }

    /// Every route the service exposes.
    pub fn all() -> impl Iterator<Item = Route> {
        std::iter::once(Route::Index).chain(WorkloadKind::ALL.into_iter().map(Route::Workload))
    }

    /// Resolve a method and path.
    ///
    /// `GET` and `HEAD` are routed. Paths match ignoring ASCII case, and a
    /// single trailing slash is ignored.
    pub fn resolve(method: &Method, path: &str) -> Option<Route> {
        if method != Method::GET && method != Method::HEAD {
            return None;
        }

        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };

        Self::all().find(|route| route.path().eq_ignore_ascii_case(path))
    }
}
