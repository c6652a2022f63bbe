//! Role types for conversation participants.

use serde::{Deserialize, Serialize};

/// Who authored a conversation message.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the conversation
    #[display("system")]
    System,
    /// The human caller
    #[display("user")]
    User,
    /// The model
    #[display("assistant")]
    Assistant,
    /// A tool result answering an assistant tool call
    #[display("tool")]
    Tool,
}
