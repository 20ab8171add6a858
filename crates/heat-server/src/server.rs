//! TCP listener and connection loop.

use std::future::Future;
use std::net::SocketAddr;

use heat_observability::{MetricsCollector, RequestId};
use http::header::HeaderValue;
use http::{Method, StatusCode};
use tokio::net::{TcpListener, TcpStream};

use crate::{
    handle_request, read_request, text_response, write_response, ExecutionMode, ServerConfig,
    ServerError,
};

/// Response header carrying the request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A bound heat server.
///
/// Each accepted connection is served on its own task. Whether the workload
/// then blocks that task or moves to the blocking pool depends on
/// `ServerConfig::execution`.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    local_addr: SocketAddr,
}

impl Server {
    /// Bind the listener described by `config`.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate()?;

        let addr = config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            listener,
            config,
            local_addr,
        })
    }

    /// Address actually bound (resolves port `0`).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Startup banner.
    pub fn banner(&self) -> String {
        format!(
            "Dummy app listening on http://{}:{}",
            self.config.host,
            self.local_addr.port()
        )
    }

    /// Serve connections forever.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(std::future::pending()).await
    }

    /// Serve connections until `shutdown` completes. In-flight connections
    /// are left to finish on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let mode = self.config.execution;
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutting down listener on {}", self.local_addr);
                    return Ok(());
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tokio::spawn(async move {
                            if let Err(e) = serve_connection(stream, mode).await {
                                tracing::warn!(%peer, error = %e, "connection error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!("Accept error: {}", e);
                        continue;
                    }
                },
            }
        }
    }
}

/// Serve exactly one request on `stream`.
pub async fn serve_connection(mut stream: TcpStream, mode: ExecutionMode) -> Result<(), ServerError> {
    let request_id = RequestId::generate();
    let mut metrics = MetricsCollector::new(request_id.clone());

    let (method, mut response) = match read_request(&mut stream).await {
        Ok(request) => {
            metrics.set_method(request.method().as_str());
            metrics.set_route(request.uri().path());
            let response = handle_request(&request, mode, &mut metrics).await;
            (request.method().clone(), response)
        }
        Err(e) if e.is_client_error() => (
            Method::GET,
            text_response(StatusCode::BAD_REQUEST, e.to_string()),
        ),
        Err(e) => return Err(e),
    };

    if let Ok(value) = HeaderValue::from_str(request_id.as_str()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    write_response(&mut stream, &method, &response).await?;
    metrics.finalize(response.status().as_u16()).emit();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn local() -> ServerConfig {
        ServerConfig::default().with_host("127.0.0.1").with_port(0)
    }

    async fn roundtrip(addr: SocketAddr, raw: &[u8]) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(raw).await.unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let server = Server::bind(local()).await.unwrap();

        assert_ne!(server.local_addr().port(), 0);
        assert_eq!(
            server.banner(),
            format!("Dummy app listening on http://127.0.0.1:{}", server.local_addr().port())
        );
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_config() {
        let err = Server::bind(local().with_host("")).await.unwrap_err();

        assert!(matches!(err, ServerError::Config(_)));
    }

    #[tokio::test]
    async fn test_bind_port_in_use() {
        let first = Server::bind(local()).await.unwrap();
        let taken = local().with_port(first.local_addr().port());

        let err = Server::bind(taken).await.unwrap_err();

        assert!(matches!(err, ServerError::Bind { .. }));
    }

    #[tokio::test]
    async fn test_serves_request_with_id_header() {
        let server = Server::bind(local()).await.unwrap();
        let addr = server.local_addr();
        tokio::spawn(server.run());

        let raw = roundtrip(addr, b"GET / HTTP/1.1\r\nHost: test\r\n\r\n").await;

        assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(raw.contains("x-request-id: "));
        assert!(raw.ends_with(crate::USAGE));
    }

    #[tokio::test]
    async fn test_bad_request_line() {
        let server = Server::bind(local()).await.unwrap();
        let addr = server.local_addr();
        tokio::spawn(server.run());

        let raw = roundtrip(addr, b"HELLO\r\n\r\n").await;

        assert!(raw.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn test_head_request_has_no_body() {
        let server = Server::bind(local()).await.unwrap();
        let addr = server.local_addr();
        tokio::spawn(server.run());

        let raw = roundtrip(addr, b"HEAD / HTTP/1.1\r\nHost: test\r\n\r\n").await;

        assert!(raw.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(raw.contains(&format!("content-length: {}\r\n", crate::USAGE.len())));
        assert!(raw.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let server = Server::bind(local()).await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(server.run_until(async {
            let _ = rx.await;
        }));

        tx.send(()).unwrap();

        assert!(handle.await.unwrap().is_ok());
    }
}
