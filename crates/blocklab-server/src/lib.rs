//! HTTP/JSON API server for the blocklab block editor.
//!
//! Provides the REST resource over stored projects and an execution endpoint
//! that runs generated code in the process sandboxes. This crate contains the
//! server framework, API schema types, error handling, configuration, and
//! route definitions.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod service;
pub mod state;
