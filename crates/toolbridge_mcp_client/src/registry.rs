//! Name-keyed dispatch for tool calls requested by the model.

use crate::{McpClientError, McpClientErrorKind, McpClientResult, ToolInvoker};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use toolbridge_core::FunctionSpec;
use tracing::{debug, instrument};

/// Executes one named tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool with decoded arguments and return the raw result.
    async fn invoke(&self, arguments: Value) -> McpClientResult<Value>;
}

/// Handler forwarding to a tool on the tool server.
pub struct RemoteTool {
    name: String,
    invoker: Arc<dyn ToolInvoker>,
}

impl RemoteTool {
    /// Bind `name` to a session.
    pub fn new(name: impl Into<String>, invoker: Arc<dyn ToolInvoker>) -> Self {
        Self {
            name: name.into(),
            invoker,
        }
    }
}

#[async_trait]
impl ToolHandler for RemoteTool {
    async fn invoke(&self, arguments: Value) -> McpClientResult<Value> {
        self.invoker.call_tool(&self.name, arguments).await
    }
}

/// Maps tool names to handlers.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a [`RemoteTool`] for every discovered function.
    #[instrument(skip_all, fields(tool_count = specs.len()))]
    pub fn from_specs(specs: &[FunctionSpec], invoker: Arc<dyn ToolInvoker>) -> Self {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(
                spec.name().clone(),
                Arc::new(RemoteTool::new(spec.name(), Arc::clone(&invoker))),
            );
        }
        debug!("Built tool registry");
        registry
    }

    /// Register or replace the handler for `name`.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn ToolHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Whether `name` has a handler.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry has no tools.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler registered for `name`.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> McpClientResult<Value> {
        let handler = self.handlers.get(name).ok_or_else(|| {
            McpClientError::new(McpClientErrorKind::ToolNotFound(name.to_string()))
        })?;
        handler.invoke(arguments).await
    }
}
