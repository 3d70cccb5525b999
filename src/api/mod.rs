//! HTTP API for the pet registry.
//!
//! This module handles:
//! - Request handlers and shared app state
//! - Route definitions
//! - Page-number pagination

pub mod handlers;
pub mod pagination;
pub mod routes;

pub use handlers::AppState;
pub use pagination::Page;
pub use routes::create_router;
