//! HTTP handler modules for the blocklab API.
//!
//! Handlers parse requests, acquire the service lock where needed, delegate
//! to [`ProjectService`](crate::service::ProjectService) or the sandboxes,
//! and return JSON responses.

pub mod execute;
pub mod projects;
