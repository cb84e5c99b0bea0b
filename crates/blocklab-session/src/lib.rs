//! Single-user editing session for the block editor.
//!
//! [`Session`] holds the current language, diagram, generated code, last
//! execution result, and project list, and mediates between the external
//! block editor, the code sandboxes, and the project persistence API.
//!
//! # Modules
//!
//! - [`gateway`]: ProjectGateway trait, GatewayError, in-process StoreGateway
//! - [`http`]: HttpGateway talking to the blocklab REST server
//! - [`session`]: Session, its state machine, and notifications

pub mod gateway;
pub mod http;
pub mod session;

pub use gateway::{GatewayError, ProjectGateway, StoreGateway};
pub use http::HttpGateway;
pub use session::{
    EditorState, Notification, NotificationLevel, ProjectListState, RunOutcome, Session,
    SessionError, SessionState,
};
