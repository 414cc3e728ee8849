//! MCP Tool Registry
//!
//! Tools are contributed by modules through plain registration functions.
//! [`LazyRegistry`] runs an explicit list of them once, on first use.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};

use serde_json::{Map, Value};
use tracing::{info, warn};

use super::context::ToolContext;
use super::error::ToolError;
use super::protocol::{ToolDefinition, ToolsCallResult};

// ============================================================================
// Tool Types
// ============================================================================

/// Result type for tool execution
pub type ToolResult = Result<ToolsCallResult, ToolError>;

/// Boxed future for async tool execution
pub type ToolFuture = Pin<Box<dyn Future<Output = ToolResult> + Send>>;

/// Tool handler function type
pub type ToolHandler = Arc<dyn Fn(ToolContext, Value) -> ToolFuture + Send + Sync>;

/// A module's registration entry point.
pub type RegisterFn = fn(&mut McpRegistry);

/// Which Odoo environment a tool touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAccess {
    /// Reads from the primary environment.
    ReadOnly,
    /// Reads and writes the development environment.
    Development,
}

pub struct RegisteredTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub access: ToolAccess,
    pub handler: ToolHandler,
}

impl RegisteredTool {
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: self.input_schema.clone(),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

pub struct McpRegistry {
    tools: HashMap<String, RegisteredTool>,
}

impl McpRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. A name that is already taken is rejected and the
    /// existing tool is kept.
    pub fn register_tool(&mut self, tool: RegisteredTool) -> bool {
        if self.tools.contains_key(&tool.name) {
            warn!("Ignoring duplicate registration of tool '{}'", tool.name);
            return false;
        }
        self.tools.insert(tool.name.clone(), tool);
        true
    }

    /// Tool definitions sorted by name.
    pub fn get_available_tools(&self) -> Vec<ToolDefinition> {
        let mut tools: Vec<ToolDefinition> =
            self.tools.values().map(RegisteredTool::definition).collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn get_tool(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    pub fn count_by_access(&self, access: ToolAccess) -> usize {
        self.tools.values().filter(|t| t.access == access).count()
    }
}

impl Default for McpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Uninitialized,
    Ready,
}

/// A registry built from `modules` the first time it is needed.
pub struct LazyRegistry {
    modules: Vec<RegisterFn>,
    registry: OnceLock<McpRegistry>,
}

impl LazyRegistry {
    pub fn new(modules: &[RegisterFn]) -> Self {
        Self {
            modules: modules.to_vec(),
            registry: OnceLock::new(),
        }
    }

    pub fn get(&self) -> &McpRegistry {
        self.registry.get_or_init(|| {
            let mut registry = McpRegistry::new();
            for register in &self.modules {
                register(&mut registry);
            }
            info!(
                "MCP registry initialized with {} tools ({} development)",
                registry.tool_count(),
                registry.count_by_access(ToolAccess::Development)
            );
            registry
        })
    }

    pub fn warm_up(&self) {
        self.get();
    }

    pub fn state(&self) -> RegistryState {
        match self.registry.get() {
            Some(_) => RegistryState::Ready,
            None => RegistryState::Uninitialized,
        }
    }
}

// ============================================================================
// Argument validation
// ============================================================================

/// Check `arguments` against the object schema of a tool: the bag must be an
/// object (or absent), required keys must be present, and the primitive
/// `type` and `minimum` of each supplied property must hold. `null` counts
/// as absent.
pub fn validate_arguments(schema: &Value, arguments: Value) -> Result<Value, ToolError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        Value::Object(map) => Value::Object(map),
        _ => {
            return Err(ToolError::Validation(
                "arguments must be an object".to_string(),
            ))
        }
    };

    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();
    for name in required {
        if arguments.get(name).map_or(true, Value::is_null) {
            return Err(ToolError::Validation(format!(
                "missing required argument '{}'",
                name
            )));
        }
    }

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(arguments);
    };
    for (name, property) in properties {
        let Some(value) = arguments.get(name).filter(|v| !v.is_null()) else {
            continue;
        };
        if let Some(expected) = property.get("type").and_then(Value::as_str) {
            let ok = match expected {
                "string" => value.is_string(),
                "integer" => value.is_i64() || value.is_u64(),
                "number" => value.is_number(),
                "boolean" => value.is_boolean(),
                "array" => value.is_array(),
                "object" => value.is_object(),
                _ => true,
            };
            if !ok {
                return Err(ToolError::Validation(format!(
                    "argument '{}' must be of type {}",
                    name, expected
                )));
            }
        }
        if let (Some(minimum), Some(actual)) = (
            property.get("minimum").and_then(Value::as_f64),
            value.as_f64(),
        ) {
            if actual < minimum {
                return Err(ToolError::Validation(format!(
                    "argument '{}' must be >= {}",
                    name, minimum
                )));
            }
        }
    }

    Ok(arguments)
}

// ============================================================================
// Builder helpers
// ============================================================================

pub struct ToolBuilder {
    name: String,
    description: String,
    input_schema: Value,
    access: ToolAccess,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
            access: ToolAccess::ReadOnly,
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn access(mut self, access: ToolAccess) -> Self {
        self.access = access;
        self
    }

    pub fn build<F, Fut>(self, handler: F) -> RegisteredTool
    where
        F: Fn(ToolContext, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ToolResult> + Send + 'static,
    {
        RegisteredTool {
            name: self.name,
            description: self.description,
            input_schema: self.input_schema,
            access: self.access,
            handler: Arc::new(move |ctx, params| Box::pin(handler(ctx, params))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn echo(_ctx: ToolContext, params: Value) -> ToolResult {
        Ok(ToolsCallResult::json(&params)?)
    }

    fn echo_tool(name: &str) -> RegisteredTool {
        ToolBuilder::new(name).description("echo").build(echo)
    }

    #[test]
    fn test_registry_tool_count() {
        let registry = McpRegistry::new();
        assert_eq!(registry.tool_count(), 0);
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut registry = McpRegistry::new();
        assert!(registry.register_tool(echo_tool("echo")));
        let second = ToolBuilder::new("echo").description("other").build(echo);
        assert!(!registry.register_tool(second));
        assert_eq!(registry.tool_count(), 1);
        assert_eq!(registry.get_tool("echo").unwrap().description, "echo");
    }

    #[test]
    fn test_tools_are_listed_by_name() {
        let mut registry = McpRegistry::new();
        registry.register_tool(echo_tool("b"));
        registry.register_tool(echo_tool("a"));
        let names: Vec<_> = registry
            .get_available_tools()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    static REGISTRATIONS: AtomicUsize = AtomicUsize::new(0);

    fn counting_module(registry: &mut McpRegistry) {
        REGISTRATIONS.fetch_add(1, Ordering::SeqCst);
        registry.register_tool(echo_tool("counted"));
    }

    #[test]
    fn test_lazy_registry_initializes_once() {
        let lazy = LazyRegistry::new(&[counting_module]);
        assert_eq!(lazy.state(), RegistryState::Uninitialized);

        lazy.warm_up();
        lazy.warm_up();
        assert_eq!(lazy.get().tool_count(), 1);

        assert_eq!(lazy.state(), RegistryState::Ready);
        assert_eq!(REGISTRATIONS.load(Ordering::SeqCst), 1);
    }

    fn schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "task_id": {"type": "integer", "minimum": 1},
                "q": {"type": "string"},
                "active": {"type": "boolean"}
            },
            "required": ["task_id"]
        })
    }

    #[test]
    fn test_validate_accepts_good_arguments() {
        let args = validate_arguments(&schema(), json!({"task_id": 3, "q": null})).unwrap();
        assert_eq!(args["task_id"], 3);
    }

    #[test]
    fn test_validate_rejects_missing_required() {
        let err = validate_arguments(&schema(), Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "missing required argument 'task_id'");
    }

    #[test]
    fn test_validate_rejects_wrong_types() {
        let err = validate_arguments(&schema(), json!({"task_id": "3"})).unwrap_err();
        assert_eq!(err.to_string(), "argument 'task_id' must be of type integer");

        let err = validate_arguments(&schema(), json!({"task_id": 1, "active": "yes"})).unwrap_err();
        assert!(matches!(err, ToolError::Validation(_)));

        let err = validate_arguments(&schema(), json!([1, 2])).unwrap_err();
        assert_eq!(err.to_string(), "arguments must be an object");
    }

    #[test]
    fn test_validate_checks_minimum() {
        let err = validate_arguments(&schema(), json!({"task_id": 0})).unwrap_err();
        assert_eq!(err.to_string(), "argument 'task_id' must be >= 1");
    }
}
