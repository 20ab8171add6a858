//! HTTP boundary for the heat CPU-burn service.
//!
//! Routes `GET /pbkdf2`, `/primes` and `/matmul` to the workloads in
//! `heat-core` and serialises their results as JSON. `GET /` returns a
//! plain-text usage hint.
//!
//! ```rust,ignore
//! let config = ServerConfig::default().with_port(0);
//! let server = Server::bind(config).await?;
//! let addr = server.local_addr();
//! tokio::spawn(server.run());
//! ```

mod config;
mod error;
mod handlers;
mod routes;
mod server;
mod wire;

pub use config::*;
pub use error::*;
pub use handlers::*;
pub use routes::*;
pub use server::*;
pub use wire::*;
