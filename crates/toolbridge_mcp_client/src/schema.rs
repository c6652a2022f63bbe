//! Translate tool input schemas into function-parameter schemas.
//!
//! Tool servers publish loosely shaped JSON Schema. The chat-completion API
//! wants a strict subset: every node typed, every array with `items`,
//! every object with `properties`. Normalization is total (any input
//! yields a valid schema) and idempotent.

use serde_json::{Map, Value, json};
use toolbridge_core::{FunctionSpec, ToolDefinition};
use toolbridge_error::SchemaError;
use tracing::{debug, warn};

/// Keys copied verbatim from a source node when present.
const PASSTHROUGH_KEYS: [&str; 13] = [
    "description",
    "enum",
    "default",
    "minimum",
    "maximum",
    "minItems",
    "maxItems",
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "title",
    "examples",
];

/// Recursive schema normalizer collecting a diagnostic per degraded node.
#[derive(Debug, Default)]
pub struct SchemaNormalizer {
    diagnostics: Vec<SchemaError>,
}

impl SchemaNormalizer {
    /// Create a normalizer with no diagnostics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostics gathered so far.
    pub fn diagnostics(&self) -> &[SchemaError] {
        &self.diagnostics
    }

    /// Normalize `node`, recording diagnostics under `$`.
    pub fn normalize(&mut self, node: &Value) -> Value {
        self.normalize_at(node, "$")
    }

    fn normalize_at(&mut self, node: &Value, path: &str) -> Value {
        let Some(source) = node.as_object() else {
            self.diagnostics
                .push(SchemaError::new(path, "schema node is not an object"));
            return degraded(None);
        };

        let schema_type = match declared_type(source) {
            Some(schema_type) => schema_type,
            None if source.contains_key("properties") => "object".to_string(),
            None if source.contains_key("items") => "array".to_string(),
            None => {
                self.diagnostics
                    .push(SchemaError::new(path, "type is missing and cannot be inferred"));
                return degraded(source.get("description"));
            }
        };

        let mut out = Map::new();
        out.insert("type".to_string(), Value::String(schema_type.clone()));
        for key in PASSTHROUGH_KEYS {
            if let Some(value) = source.get(key) {
                out.insert(key.to_string(), value.clone());
            }
        }

        match schema_type.as_str() {
            "array" => {
                let items = self.normalize_items(source.get("items"), path);
                out.insert("items".to_string(), items);
            }
            "object" => {
                let mut properties = Map::new();
                if let Some(Value::Object(source_properties)) = source.get("properties") {
                    for (name, property) in source_properties {
                        let child = self.normalize_at(property, &format!("{path}.properties.{name}"));
                        properties.insert(name.clone(), child);
                    }
                }
                out.insert("properties".to_string(), Value::Object(properties));

                if let Some(required) = source.get("required") {
                    out.insert("required".to_string(), required.clone());
                }
                if let Some(additional) = source.get("additionalProperties") {
                    out.insert("additionalProperties".to_string(), additional.clone());
                }
            }
            _ => {}
        }

        Value::Object(out)
    }

    fn normalize_items(&mut self, items: Option<&Value>, path: &str) -> Value {
        let items_path = format!("{path}.items");
        match items {
            None | Some(Value::Null) => json!({"type": "number"}),
            Some(Value::Object(map)) if map.is_empty() => json!({"type": "number"}),
            Some(Value::Array(tuple)) => match tuple.first() {
                Some(first) => self.normalize_at(first, &format!("{items_path}[0]")),
                None => json!({"type": "number"}),
            },
            Some(other) => self.normalize_at(other, &items_path),
        }
    }
}

/// First concrete type of a node; in a type list `"null"` is skipped.
fn declared_type(source: &Map<String, Value>) -> Option<String> {
    match source.get("type") {
        Some(Value::String(schema_type)) => Some(schema_type.clone()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|schema_type| *schema_type != "null")
            .map(str::to_string),
        _ => None,
    }
}

fn degraded(description: Option<&Value>) -> Value {
    json!({
        "type": "string",
        "description": description.cloned().unwrap_or_else(|| Value::String(String::new())),
    })
}

/// Normalize a schema, logging and discarding diagnostics.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use toolbridge_mcp_client::normalize_schema;
///
/// let schema = normalize_schema(&json!({"type": "array"}));
/// assert_eq!(schema, json!({"type": "array", "items": {"type": "number"}}));
/// ```
pub fn normalize_schema(node: &Value) -> Value {
    let mut normalizer = SchemaNormalizer::new();
    let normalized = normalizer.normalize(node);
    for diagnostic in normalizer.diagnostics() {
        debug!(path = %diagnostic.path, message = %diagnostic.message, "Degraded schema node");
    }
    normalized
}

/// Convert a tool definition into a function spec with an object schema.
///
/// A top-level schema that does not normalize to an object is replaced by
/// an empty object schema.
pub fn to_function_spec(tool: &ToolDefinition) -> FunctionSpec {
    let mut normalizer = SchemaNormalizer::new();
    let mut parameters = normalizer.normalize(tool.input_schema());

    for diagnostic in normalizer.diagnostics() {
        debug!(
            tool = %tool.name(),
            path = %diagnostic.path,
            message = %diagnostic.message,
            "Degraded schema node"
        );
    }

    if parameters.get("type").and_then(Value::as_str) != Some("object") {
        if !is_empty_object(tool.input_schema()) {
            warn!(tool = %tool.name(), "Input schema is not an object, using empty parameters");
        }
        parameters = json!({"type": "object", "properties": {}});
    }

    FunctionSpec::new(tool.name(), tool.description(), parameters)
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().is_some_and(Map::is_empty)
}
