//! Tool Abstraction Layer
//!
//! This module provides the named, described, schema-carrying unit of
//! capability that agents and the tool server dispatch against.
//!
//! # Architecture
//!
//! ```text
//! Agent / ToolServer → ToolRegistry → Tool (metadata + async callable)
//! ```
//!
//! A [`ToolRegistry`] is an ordered set of [`Tool`]s addressed by exact name.
//! Input is validated once against the tool's declared parameters at the
//! dispatch boundary; whatever a tool callable returns (or fails with) is
//! normalized into a single string envelope suitable for feeding back to a
//! model.
//!
//! # Example
//!
//! ```rust
//! use notellm::tool_protocol::{ToolParameter, ToolParameterType};
//!
//! let param = ToolParameter::new("noteId", ToolParameterType::String)
//!     .with_description("The unique ID of the note to read")
//!     .required();
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Defines the type of a tool parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ToolParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

/// Defines a parameter for a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ToolParameterType,
    pub description: Option<String>,
    pub required: bool,
    /// For string types, the closed set of accepted values.
    pub enum_values: Option<Vec<String>>,
}

impl ToolParameter {
    /// Define a new tool parameter with the provided name and type.
    pub fn new(name: impl Into<String>, param_type: ToolParameterType) -> Self {
        Self {
            name: name.into(),
            param_type,
            description: None,
            required: false,
            enum_values: None,
        }
    }

    /// Add a human readable description that will surface in generated schemas.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the argument as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restrict a string parameter to a closed set of values.
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Metadata about a tool: everything that crosses the model boundary.
///
/// The callable itself stays process-local; only this metadata is ever
/// exported as a function declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMetadata {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParameter>,
}

impl ToolMetadata {
    /// Create metadata with the supplied identifier and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter definition to the tool metadata.
    pub fn with_parameter(mut self, param: ToolParameter) -> Self {
        self.parameters.push(param);
        self
    }
}

/// Error types for tool operations
#[derive(Debug, Clone)]
pub enum ToolError {
    /// Requested tool is not registered in the registry.
    NotFound(String),
    /// The provided input failed validation against the tool's schema.
    InvalidInput(String),
    /// Tool execution completed with an application level failure.
    ExecutionFailed(String),
    /// A tool with the same name is already registered.
    DuplicateName(String),
}

impl fmt::Display for ToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolError::NotFound(name) => write!(f, "Tool not found: {}", name),
            ToolError::InvalidInput(msg) => write!(f, "Invalid parameters: {}", msg),
            ToolError::ExecutionFailed(msg) => write!(f, "Tool execution failed: {}", msg),
            ToolError::DuplicateName(name) => {
                write!(f, "Tool already registered: {}", name)
            }
        }
    }
}

impl Error for ToolError {}

/// Type alias for async tool callables.
///
/// A callable takes the raw (already schema-validated) JSON input and
/// produces its payload as a self-describing, pre-serialized string.
pub type AsyncToolFn = Arc<
    dyn Fn(
            serde_json::Value,
        )
            -> Pin<Box<dyn Future<Output = Result<String, Box<dyn Error + Send + Sync>>> + Send>>
        + Send
        + Sync,
>;

/// A named, described, schema-carrying, callable unit of capability.
pub struct Tool {
    /// Metadata describing the tool interface.
    metadata: ToolMetadata,
    /// The process-local callable that performs the work.
    call: AsyncToolFn,
}

impl Tool {
    /// Create a new tool from its metadata and callable.
    pub fn new(metadata: ToolMetadata, call: AsyncToolFn) -> Self {
        Self { metadata, call }
    }

    /// The tool's registry name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Borrow the static metadata for the tool.
    pub fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    /// Invoke the callable directly, bypassing registry-level validation.
    pub async fn invoke(
        &self,
        args: serde_json::Value,
    ) -> Result<String, Box<dyn Error + Send + Sync>> {
        (self.call)(args).await
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Ordered registry of tools available to an agent or tool server.
///
/// Names are unique and immutable once registered; lookup is by exact name
/// match, scanning in registration order so the first entry wins if the
/// uniqueness invariant were ever violated externally.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    /// Build an empty registry.
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Build a registry from a fixed ordered set of tools.
    pub fn from_tools(tools: Vec<Tool>) -> Result<Self, ToolError> {
        let mut registry = Self::new();
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Insert a tool, rejecting duplicate names.
    pub fn register(&mut self, tool: Tool) -> Result<(), ToolError> {
        if self.get(tool.name()).is_some() {
            return Err(ToolError::DuplicateName(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    /// Borrow a tool by exact name, first match wins.
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Metadata for every registered tool, in registration order.
    pub fn list_tools(&self) -> Vec<&ToolMetadata> {
        self.tools.iter().map(Tool::metadata).collect()
    }

    /// Cloned metadata for export as function declarations.
    pub fn metadata(&self) -> Vec<ToolMetadata> {
        self.tools.iter().map(|t| t.metadata.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a named tool, returning typed errors.
    ///
    /// Input is validated against the tool's declared parameters before the
    /// callable runs, so malformed input fails here and never reaches the
    /// callable (or the network behind it).
    pub async fn execute(
        &self,
        name: &str,
        args: serde_json::Value,
    ) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        validate_input(tool.metadata(), &args)?;

        tool.invoke(args)
            .await
            .map_err(|err| ToolError::ExecutionFailed(err.to_string()))
    }

    /// Dispatch a named tool and normalize the outcome into a string
    /// envelope for onward transmission to a model. Never fails: unknown
    /// names and callable failures become JSON error objects.
    pub async fn dispatch(&self, name: &str, args: serde_json::Value) -> String {
        match self.execute(name, args).await {
            Ok(output) => output,
            Err(ToolError::NotFound(requested)) => serde_json::json!({
                "error": "Tool not found",
                "name": requested,
            })
            .to_string(),
            Err(ToolError::InvalidInput(msg)) | Err(ToolError::ExecutionFailed(msg)) => {
                serde_json::json!({ "error": msg }).to_string()
            }
            Err(other) => serde_json::json!({ "error": other.to_string() }).to_string(),
        }
    }
}

/// Validate raw JSON input against a tool's declared parameters.
fn validate_input(metadata: &ToolMetadata, args: &serde_json::Value) -> Result<(), ToolError> {
    if metadata.parameters.is_empty() {
        return Ok(());
    }

    let fields = match args {
        serde_json::Value::Object(map) => Some(map),
        serde_json::Value::Null => None,
        _ => {
            return Err(ToolError::InvalidInput(format!(
                "input for '{}' must be a JSON object",
                metadata.name
            )));
        }
    };

    for param in &metadata.parameters {
        let value = fields.and_then(|map| map.get(&param.name));
        match value {
            None | Some(serde_json::Value::Null) => {
                if param.required {
                    return Err(ToolError::InvalidInput(format!(
                        "missing required parameter '{}'",
                        param.name
                    )));
                }
            }
            Some(value) => {
                check_type(param, value)?;
                if param.required && value.as_str().map_or(false, str::is_empty) {
                    return Err(ToolError::InvalidInput(format!(
                        "parameter '{}' must not be empty",
                        param.name
                    )));
                }
                if let (Some(allowed), Some(actual)) = (&param.enum_values, value.as_str()) {
                    if !allowed.iter().any(|candidate| candidate == actual) {
                        return Err(ToolError::InvalidInput(format!(
                            "parameter '{}' must be one of [{}]",
                            param.name,
                            allowed.join(", ")
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}

fn check_type(param: &ToolParameter, value: &serde_json::Value) -> Result<(), ToolError> {
    let ok = match param.param_type {
        ToolParameterType::String => value.is_string(),
        ToolParameterType::Number => value.is_number(),
        ToolParameterType::Integer => value.is_i64() || value.is_u64(),
        ToolParameterType::Boolean => value.is_boolean(),
        ToolParameterType::Array => value.is_array(),
        ToolParameterType::Object => value.is_object(),
    };
    if ok {
        Ok(())
    } else {
        Err(ToolError::InvalidInput(format!(
            "parameter '{}' must be of type {:?}",
            param.name, param.param_type
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_tool(name: &str) -> Tool {
        Tool::new(
            ToolMetadata::new(name, "Echoes its input back"),
            Arc::new(|args| Box::pin(async move { Ok(args.to_string()) })),
        )
    }

    fn failing_tool(name: &str, message: &str) -> Tool {
        let message = message.to_string();
        Tool::new(
            ToolMetadata::new(name, "Always fails"),
            Arc::new(move |_args| {
                let message = message.clone();
                Box::pin(async move {
                    Err(Box::new(ToolError::ExecutionFailed(message))
                        as Box<dyn Error + Send + Sync>)
                })
            }),
        )
    }

    #[test]
    fn test_tool_parameter_builder() {
        let param = ToolParameter::new("keyword", ToolParameterType::String)
            .with_description("The keyword to search for")
            .required();

        assert_eq!(param.name, "keyword");
        assert_eq!(param.param_type, ToolParameterType::String);
        assert_eq!(
            param.description,
            Some("The keyword to search for".to_string())
        );
        assert!(param.required);
        assert!(param.enum_values.is_none());
    }

    #[test]
    fn test_registry_rejects_duplicate_names() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo")).unwrap();

        let err = registry.register(echo_tool("echo")).unwrap_err();
        match err {
            ToolError::DuplicateName(name) => assert_eq!(name, "echo"),
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool_yields_not_found_envelope() {
        let registry = ToolRegistry::new();
        let envelope = registry.dispatch("does_not_exist", json!({})).await;

        let parsed: serde_json::Value = serde_json::from_str(&envelope).unwrap();
        assert_eq!(parsed["error"], "Tool not found");
        assert_eq!(parsed["name"], "does_not_exist");
    }

    #[tokio::test]
    async fn test_dispatch_failing_tool_yields_error_envelope() {
        let mut registry = ToolRegistry::new();
        registry
            .register(failing_tool("broken", "Something failed"))
            .unwrap();

        let envelope = registry.dispatch("broken", json!({})).await;
        let parsed: serde_json::Value = serde_json::from_str(&envelope).unwrap();
        assert!(parsed["error"]
            .as_str()
            .unwrap()
            .contains("Something failed"));
    }

    #[tokio::test]
    async fn test_dispatch_success_returns_payload_unwrapped() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("echo")).unwrap();

        let envelope = registry.dispatch("echo", json!({"foo": "bar"})).await;
        assert_eq!(envelope, json!({"foo": "bar"}).to_string());
    }

    #[tokio::test]
    async fn test_execute_validates_required_parameter() {
        let tool = Tool::new(
            ToolMetadata::new("read_note", "Reads a note").with_parameter(
                ToolParameter::new("noteId", ToolParameterType::String).required(),
            ),
            Arc::new(|_args| Box::pin(async move { Ok("unreachable".to_string()) })),
        );
        let registry = ToolRegistry::from_tools(vec![tool]).unwrap();

        let err = registry.execute("read_note", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("noteId"));

        let err = registry
            .execute("read_note", json!({"noteId": ""}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("noteId"));

        let err = registry
            .execute("read_note", json!("not an object"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[tokio::test]
    async fn test_execute_validates_types_and_enums() {
        let tool = Tool::new(
            ToolMetadata::new("create_note", "Creates a note")
                .with_parameter(
                    ToolParameter::new("title", ToolParameterType::String).required(),
                )
                .with_parameter(
                    ToolParameter::new("readPermission", ToolParameterType::String)
                        .with_enum_values(vec!["owner", "signed_in", "guest"]),
                ),
            Arc::new(|_args| Box::pin(async move { Ok("{}".to_string()) })),
        );
        let registry = ToolRegistry::from_tools(vec![tool]).unwrap();

        let err = registry
            .execute("create_note", json!({"title": 42}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("title"));

        let err = registry
            .execute(
                "create_note",
                json!({"title": "T", "readPermission": "everyone"}),
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("readPermission"));

        let ok = registry
            .execute(
                "create_note",
                json!({"title": "T", "readPermission": "guest"}),
            )
            .await;
        assert!(ok.is_ok());
    }

    #[tokio::test]
    async fn test_parameterless_tool_accepts_null_input() {
        let mut registry = ToolRegistry::new();
        registry.register(echo_tool("list_notes")).unwrap();

        let result = registry.execute("list_notes", serde_json::Value::Null).await;
        assert!(result.is_ok());
    }
}
