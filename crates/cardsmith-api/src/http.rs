//! HTTP front end for [`RenderService`]
//!
//! Speaks just enough HTTP/1.1 for the card editor. Each connection carries
//! one request with a `Content-Length` body, and every response allows any
//! origin.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `POST /render` | [`RenderService::handle`] |
//! | `GET /health` | [`RenderService::health`] |
//! | `OPTIONS *` | CORS preflight, `204` |

use crate::service::{ErrorBody, RenderResponse, RenderService};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

/// Request line plus headers
const MAX_HEAD_BYTES: usize = 16 * 1024;

/// HTTP front end errors
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed request: {0}")]
    Malformed(&'static str),

    #[error("Request body of {size} bytes exceeds limit of {limit}")]
    BodyTooLarge { size: usize, limit: usize },
}

/// A parsed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub body: Vec<u8>,
}

/// Listener that forwards requests to a [`RenderService`]
pub struct HttpServer {
    listener: TcpListener,
    service: Arc<RenderService>,
}

impl HttpServer {
    /// Bind to `address`
    pub async fn bind(address: &str, service: Arc<RenderService>) -> Result<Self, HttpError> {
        let listener = TcpListener::bind(address).await?;
        Ok(Self { listener, service })
    }

    /// Address actually bound, useful after binding port 0
    pub fn local_addr(&self) -> Result<SocketAddr, HttpError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails
    pub async fn run(self) -> Result<(), HttpError> {
        info!("Render server listening on http://{}", self.local_addr()?);

        loop {
            let (stream, peer) = self.listener.accept().await?;
            let service = self.service.clone();
            tokio::spawn(async move {
                if let Err(e) = serve_connection(stream, &service).await {
                    warn!(%peer, error = %e, "Connection failed");
                }
            });
        }
    }
}

/// Answer a single request on `stream`, then close it
pub async fn serve_connection<S>(stream: S, service: &RenderService) -> Result<(), HttpError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);

    let response = match read_request(&mut reader, service.max_body_bytes()).await {
        Ok(request) => {
            debug!(method = %request.method, path = %request.path, "Request");
            route(service, &request).await
        }
        Err(HttpError::BodyTooLarge { size, .. }) => service.body_too_large(size),
        Err(e @ HttpError::Malformed(_)) => {
            warn!(error = %e, "Rejecting request");
            RenderResponse::json(400, &ErrorBody::new("请求格式错误", e))
        }
        Err(e) => return Err(e),
    };

    write_response(&mut writer, &response).await?;
    writer.shutdown().await?;
    Ok(())
}

/// Dispatch a parsed request
pub async fn route(service: &RenderService, request: &Request) -> RenderResponse {
    match (request.method.as_str(), request.path.as_str()) {
        ("POST", "/render") => service.handle(&request.body).await,
        ("GET", "/health") => service.health(),
        ("OPTIONS", _) => RenderResponse::empty(204),
        _ => RenderResponse::json(
            404,
            &ErrorBody {
                message: format!("Cannot {} {}", request.method, request.path),
                error: None,
            },
        ),
    }
}

/// Read the request head and a `Content-Length` body
///
/// A declared body over `max_body` is rejected before any of it is read.
pub async fn read_request<R>(reader: &mut R, max_body: usize) -> Result<Request, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let mut head = 0;
    let request_line = read_head_line(reader, &mut head).await?;
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(_version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(HttpError::Malformed("request line"));
    };
    let path = target.split('?').next().unwrap_or(target).to_string();
    let method = method.to_ascii_uppercase();

    let mut content_length = 0;
    loop {
        let line = read_head_line(reader, &mut head).await?;
        if line.is_empty() {
            break;
        }
        let (name, value) = line
            .split_once(':')
            .ok_or(HttpError::Malformed("header line"))?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            content_length = value
                .trim()
                .parse()
                .map_err(|_| HttpError::Malformed("content-length"))?;
        }
    }

    if content_length > max_body {
        return Err(HttpError::BodyTooLarge {
            size: content_length,
            limit: max_body,
        });
    }

    let mut body = vec![0; content_length];
    reader.read_exact(&mut body).await?;
    Ok(Request { method, path, body })
}

async fn read_head_line<R>(reader: &mut R, head: &mut usize) -> Result<String, HttpError>
where
    R: AsyncBufRead + Unpin,
{
    let remaining = MAX_HEAD_BYTES.saturating_sub(*head) as u64;
    let mut line = String::new();
    let n = (&mut *reader).take(remaining).read_line(&mut line).await?;
    *head += n;

    if !line.ends_with('\n') {
        return Err(if *head >= MAX_HEAD_BYTES {
            HttpError::Malformed("request head too large")
        } else {
            HttpError::Malformed("unexpected end of request")
        });
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn write_response<W>(writer: &mut W, response: &RenderResponse) -> Result<(), HttpError>
where
    W: AsyncWrite + Unpin,
{
    let mut head = format!("HTTP/1.1 {} {}\r\n", response.status, reason(response.status));
    if !response.body.is_empty() {
        head.push_str(&format!("Content-Type: {}\r\n", response.content_type));
    }
    head.push_str(&format!("Content-Length: {}\r\n", response.body.len()));
    head.push_str("Access-Control-Allow-Origin: *\r\n");
    head.push_str("Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n");
    head.push_str("Access-Control-Allow-Headers: Content-Type\r\n");
    head.push_str("Connection: close\r\n\r\n");

    writer.write_all(head.as_bytes()).await?;
    writer.write_all(&response.body).await?;
    writer.flush().await?;
    Ok(())
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "",
    }
}
