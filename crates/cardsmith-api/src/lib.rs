//! Cardsmith API
//!
//! The request-facing side of the renderer: field normalization for raw
//! payloads and the render service with its HTTP front end.

pub mod http;
pub mod payload;
pub mod service;

pub use http::{HttpError, HttpServer};
pub use payload::{PayloadError, normalize, parse_card};
pub use service::{ErrorBody, RenderResponse, RenderService, ServiceConfig};
