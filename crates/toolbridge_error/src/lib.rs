//! Error types for the toolbridge workspace.
//!
//! Every error records the source location where it was raised, so a log
//! line points straight at the failing call site.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod config;
mod protocol;
mod retry;
mod schema;
mod transport;

pub use backend::BackendError;
pub use config::ConfigError;
pub use protocol::{ProtocolError, ProtocolErrorKind};
pub use retry::RetryableError;
pub use schema::SchemaError;
pub use transport::{TransportError, TransportErrorKind};
