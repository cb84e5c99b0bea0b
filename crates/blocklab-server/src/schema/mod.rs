//! API schema types for request/response definitions.

pub mod execute;
pub mod projects;
