//! Flatten tool-call results into the string a tool-role message carries.

use serde_json::Value;

/// One element of a tool result's `content` array.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    /// Text, either a `text` part or any part carrying a `text` field.
    Text(String),
    /// Embedded resource; `text` is the resource's inline text.
    Resource {
        /// Inline text of the resource, when present
        text: Option<String>,
        /// The part as received
        raw: Value,
    },
    /// Anything else (images, audio, unknown part types).
    Other(Value),
}

impl ContentPart {
    /// Classify a raw content element.
    pub fn from_value(part: &Value) -> Self {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            return ContentPart::Text(text.to_string());
        }

        if part.get("type").and_then(Value::as_str) == Some("resource") {
            let text = part
                .pointer("/resource/text")
                .and_then(Value::as_str)
                .map(str::to_string);
            return ContentPart::Resource {
                text,
                raw: part.clone(),
            };
        }

        ContentPart::Other(part.clone())
    }

    /// The part's text, or its JSON encoding when it has none.
    pub fn render(&self) -> String {
        match self {
            ContentPart::Text(text) => text.clone(),
            ContentPart::Resource {
                text: Some(text), ..
            } => text.clone(),
            ContentPart::Resource { raw, .. } => raw.to_string(),
            ContentPart::Other(Value::String(text)) => text.clone(),
            ContentPart::Other(raw) => raw.to_string(),
        }
    }
}

/// A tool result reduced to what the model will read.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Rendered `content` parts joined with newlines.
    Text(String),
    /// A result without a non-empty `content` array, forwarded as JSON.
    Passthrough(Value),
}

impl ToolOutput {
    /// Reduce a raw `tools/call` result.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use toolbridge_mcp_client::ToolOutput;
    ///
    /// let output = ToolOutput::from_result(&json!({
    ///     "content": [{"type": "text", "text": "4"}]
    /// }));
    /// assert_eq!(output, ToolOutput::Text("4".to_string()));
    /// ```
    pub fn from_result(result: &Value) -> Self {
        match result.get("content").and_then(Value::as_array) {
            Some(parts) if !parts.is_empty() => ToolOutput::Text(
                parts
                    .iter()
                    .map(|part| ContentPart::from_value(part).render())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            _ => ToolOutput::Passthrough(result.clone()),
        }
    }

    /// Message content for the tool-role message.
    pub fn into_content(self) -> String {
        match self {
            ToolOutput::Text(text) => text,
            ToolOutput::Passthrough(value) => value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parts_join_with_newlines() {
        let output = ToolOutput::from_result(&json!({
            "content": [
                {"type": "text", "text": "a"},
                {"type": "image", "data": "AAAA", "mimeType": "image/png"},
                {"type": "resource", "resource": {"uri": "file:///x", "text": "b"}}
            ]
        }));

        let content = output.into_content();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "a");
        assert_eq!(
            serde_json::from_str::<Value>(lines[1]).unwrap(),
            json!({"type": "image", "data": "AAAA", "mimeType": "image/png"})
        );
        assert_eq!(lines[2], "b");
    }

    #[test]
    fn test_result_without_content_passes_through() {
        let result = json!({"value": 4});
        let output = ToolOutput::from_result(&result);
        assert_eq!(output, ToolOutput::Passthrough(result));
        assert_eq!(output.into_content(), r#"{"value":4}"#);
    }

    #[test]
    fn test_empty_content_passes_through() {
        let result = json!({"content": [], "structuredContent": {"value": 4}});
        let output = ToolOutput::from_result(&result);
        assert_eq!(output, ToolOutput::Passthrough(result.clone()));
        assert_eq!(
            serde_json::from_str::<Value>(&output.into_content()).unwrap(),
            result
        );
    }

    #[test]
    fn test_error_results_render_like_any_other() {
        let output = ToolOutput::from_result(&json!({
            "isError": true,
            "content": [{"type": "text", "text": "division by zero"}]
        }));
        assert_eq!(output.into_content(), "division by zero");
    }
}
