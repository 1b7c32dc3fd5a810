//! Vibe API Library
//!
//! HTTP handlers, middleware and application setup for the editor backend.

mod api_doc;
mod handlers;
mod job_queue;
mod middleware;
pub mod setup;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod state;

pub use error::ErrorResponse;
pub use job_queue::VideoJobQueue;
