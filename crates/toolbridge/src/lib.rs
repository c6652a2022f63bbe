//! Tool bridge: lets a chat model call tools hosted by a tool-protocol server.
//!
//! [`Settings`] loads layered configuration, [`ToolBridge`] wires the
//! components, and [`init_tracing`] sets up logging for binaries.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bridge;
mod settings;
mod telemetry;

pub use bridge::ToolBridge;
pub use settings::{
    ChatSettings, DEFAULT_SETTINGS_FILE, ENV_PREFIX, LlmSettings, McpSettings, Settings,
};
pub use telemetry::init_tracing;
