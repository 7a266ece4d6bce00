//! REST API implementation
//!
//! - types: request/response type definitions
//! - extractors: custom request extractors
//! - handlers: endpoint handlers
//! - router: router assembly
//! - tests: unit tests

mod extractors;
mod handlers;
mod router;
mod tests;
pub mod types;

pub use extractors::JsonExtractor;
pub use router::create_router;
pub use types::{AppState, GetFeaturesRequestPayload, GetFeaturesResponsePayload, HealthResponse, InvalidateRequestPayload, InvalidateResponsePayload, WarmRequestPayload, WarmResponsePayload};
