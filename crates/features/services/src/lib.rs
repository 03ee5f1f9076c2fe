//! # Service domains
//!
//! Configuration-driven CRUD over document collections, exposed as
//! `/services/{domain}/{record}[/{id}[/{qualifier}[/{qualifier_id}]]]`.
//!
//! A request flows through three steps:
//! 1. [`resolver`] matches the path against the immutable domain registry and parses
//!    hex identifiers into `ObjectId`s.
//! 2. [`validator`] checks qualifier payloads against their closed schema.
//! 3. The handlers build store queries (the qualifier name is the array field name) and
//!    render results, converting identifiers back to hex.
//!
//! Failures are [`ServiceError`]s, answered as `{ statusCode, error, message }`.

pub mod error;
mod handlers;
pub mod models;
mod query;
mod render;
pub mod resolver;
mod router;
pub mod validator;

pub use crate::error::{ServiceError, ServiceErrorExt};
pub use crate::router::services_router;
