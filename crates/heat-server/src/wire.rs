//! Minimal HTTP/1.1 wire codec.
//!
//! One request per connection: the head is read up to the blank line, the
//! body (if any) is ignored, and the response is written with
//! `Connection: close`.

use http::header::{self, HeaderValue};
use http::{Method, Request, Response, StatusCode, Version};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::ServerError;

/// Largest request head accepted.
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json; charset=utf-8";

/// Parse a request head (request line plus headers).
pub fn parse_request_head(head: &[u8]) -> Result<Request<()>, ServerError> {
    let head = std::str::from_utf8(head)
        .map_err(|_| ServerError::BadRequest("request head is not UTF-8".to_string()))?;
    let mut lines = head.lines();

    let request_line = lines
        .next()
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("empty request".to_string()))?;

    let mut parts = request_line.split_whitespace();
    let (method, target, version) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(m), Some(t), Some(v), None) => (m, t, v),
        _ => {
            return Err(ServerError::BadRequest(format!(
                "malformed request line: {request_line}"
            )))
        }
    };

    let version = match version {
        "HTTP/1.1" => Version::HTTP_11,
        "HTTP/1.0" => Version::HTTP_10,
        other => {
            return Err(ServerError::BadRequest(format!(
                "unsupported version: {other}"
            )))
        }
    };
    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_| ServerError::BadRequest(format!("invalid method: {method}")))?;

    let mut builder = Request::builder().method(method).uri(target).version(version);

    for line in lines.take_while(|l| !l.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| ServerError::BadRequest(format!("malformed header: {line}")))?;
        builder = builder.header(name.trim(), value.trim());
    }

    builder
        .body(())
        .map_err(|e| ServerError::BadRequest(e.to_string()))
}

/// Position just past the blank line ending the head, if present.
fn head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|i| i + 4)
        .or_else(|| buf.windows(2).position(|w| w == b"\n\n").map(|i| i + 2))
}

/// Read one request head from a stream.
pub async fn read_request<R>(reader: &mut R) -> Result<Request<()>, ServerError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        if let Some(end) = head_end(&buf) {
            return parse_request_head(&buf[..end]);
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(ServerError::BadRequest("request head too large".to_string()));
        }

        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(ServerError::BadRequest(
                "connection closed before end of request head".to_string(),
            ));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Serialise a response, adding `Content-Length` and `Connection: close`.
///
/// With `include_body` unset only the head is written; `Content-Length`
/// still describes the body, as `HEAD` requires.
pub fn encode_response(response: &Response<String>, include_body: bool) -> Vec<u8> {
    let status = response.status();
    let body = response.body().as_bytes();
    let mut out = Vec::with_capacity(128 + body.len());

    out.extend_from_slice(
        format!(
            "HTTP/1.1 {} {}\r\n",
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .as_bytes(),
    );

    for (name, value) in response.headers() {
        if name == header::CONTENT_LENGTH || name == header::CONNECTION {
            continue;
        }
        out.extend_from_slice(name.as_str().as_bytes());
        out.extend_from_slice(b": ");
        out.extend_from_slice(value.as_bytes());
        out.extend_from_slice(b"\r\n");
    }

    out.extend_from_slice(format!("content-length: {}\r\n", body.len()).as_bytes());
    out.extend_from_slice(b"connection: close\r\n\r\n");
    if include_body {
        out.extend_from_slice(body);
    }
    out
}

/// Write a response to a stream and flush it. The body is skipped when
/// answering a `HEAD` request.
pub async fn write_response<W>(
    writer: &mut W,
    method: &Method,
    response: &Response<String>,
) -> Result<(), ServerError>
where
    W: AsyncWrite + Unpin,
{
    let include_body = method != Method::HEAD;
    writer.write_all(&encode_response(response, include_body)).await?;
    writer.flush().await?;
    Ok(())
}

/// Build a plain-text response.
pub fn text_response(status: StatusCode, body: impl Into<String>) -> Response<String> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
    response
}

/// Build a JSON response.
pub fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response<String> {
    match serde_json::to_string(value) {
        Ok(body) => {
            let mut response = Response::new(body);
            *response.status_mut() = status;
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
            response
        }
        Err(e) => text_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
