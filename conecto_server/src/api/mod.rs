//! HTTP API: router, handlers, errors, and request validation.

pub mod errors;
pub mod handlers;
pub mod server;
pub mod validation;

pub use server::{create_router, start_api_server, AppState};
