//! Render request handling
//!
//! Applies admission control, normalizes the body and maps typed render
//! failures onto transport status codes.

use crate::payload::{PayloadError, parse_card};
use cardsmith_core::CardError;
use cardsmith_raster::CardRenderer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Address the HTTP front end listens on
    pub listen_address: String,
    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_address: "127.0.0.1:3001".to_string(),
            max_body_bytes: 15 * 1024 * 1024,
        }
    }
}

pub const CONTENT_TYPE_PNG: &str = "image/png";
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Transport-neutral response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl RenderResponse {
    fn png(bytes: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: CONTENT_TYPE_PNG,
            body: bytes,
        }
    }

    pub(crate) fn json<T: Serialize>(status: u16, value: &T) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_JSON,
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    pub(crate) fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_JSON,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// JSON error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn new(message: &str, error: impl ToString) -> Self {
        Self {
            message: message.to_string(),
            error: Some(error.to_string()),
        }
    }
}

#[derive(Serialize)]
struct Health {
    ok: bool,
}

/// Card render service
pub struct RenderService {
    config: ServiceConfig,
    renderer: Arc<CardRenderer>,
}

impl RenderService {
    pub fn new(config: ServiceConfig, renderer: Arc<CardRenderer>) -> Self {
        Self { config, renderer }
    }

    /// Largest request body [`handle`](Self::handle) accepts
    pub fn max_body_bytes(&self) -> usize {
        self.config.max_body_bytes
    }

    /// Handle one render request body
    pub async fn handle(&self, body: &[u8]) -> RenderResponse {
        if body.len() > self.config.max_body_bytes {
            return self.body_too_large(body.len());
        }

        let card = match parse_card(body) {
            Ok(card) => card,
            Err(e) => return Self::payload_error(e),
        };

        match self.renderer.render_png(card).await {
            Ok(png) => {
                debug!(bytes = png.len(), "Card rendered");
                RenderResponse::png(png)
            }
            Err(e) => Self::render_error(e),
        }
    }

    /// Liveness response
    pub fn health(&self) -> RenderResponse {
        RenderResponse::json(200, &Health { ok: true })
    }

    /// Rejection for a body of `size` bytes over the limit
    pub fn body_too_large(&self, size: usize) -> RenderResponse {
        warn!(size, limit = self.config.max_body_bytes, "Request body rejected");
        let err = CardError::PayloadTooLarge {
            size,
            limit: self.config.max_body_bytes,
        };
        RenderResponse::json(413, &ErrorBody::new("请求体过大", err))
    }

    fn payload_error(e: PayloadError) -> RenderResponse {
        warn!(error = %e, "Malformed request body");
        RenderResponse::json(400, &ErrorBody::new("请求格式错误", e))
    }

    fn render_error(e: CardError) -> RenderResponse {
        let (status, message) = match &e {
            CardError::Validation(_) => (400, "缺少必填字段：name"),
            CardError::PayloadTooLarge { .. } => (413, "插画数据过大"),
            CardError::Render(_) | CardError::Encode(_) => (500, "渲染失败"),
        };

        if e.is_client_error() {
            warn!(error = %e, status, "Render request rejected");
        } else {
            error!(error = %e, "Render failed");
        }
        RenderResponse::json(status, &ErrorBody::new(message, e))
    }
}
