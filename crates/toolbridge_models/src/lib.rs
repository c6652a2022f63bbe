//! Chat-completion provider integrations.
//!
//! Currently a single OpenAI-compatible client, which covers OpenAI itself
//! and the many providers that mirror its chat completions format.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod openai_compat;

pub use openai_compat::{OpenAICompatError, OpenAICompatibleClient};
