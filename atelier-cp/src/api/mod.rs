//! HTTP API handlers

mod curation;
mod health;
mod sse;

pub use curation::{curation_routes, StartCurationRequest, StatusResponse};
pub use health::health_routes;
pub use sse::{curation_event_stream, event_stream};
