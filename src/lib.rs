//! Pet registry CRUD service.
//!
//! A small HTTP API for managing pet records with their taxonomic groups
//! and descriptive traits, backed by SQLite.
//!
//! Groups are keyed by scientific name and traits by case-insensitive
//! name; both are resolved-or-created on the fly when a pet references
//! them, so creating one pet may create group and trait rows as a side
//! effect.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`model`]: Entity types and payload validation
//! - [`store`]: Async SQLite storage layer
//! - [`api`]: HTTP handlers, routes, and pagination
//! - [`metrics`]: Prometheus counters

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod store;

pub use config::Config;
pub use error::{ApiError, Result};
