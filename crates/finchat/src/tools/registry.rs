//! Function registry

use super::function::{FunctionKind, StockFunction};
use super::validation::validate_arguments;
use crate::error::{ChatError, Result};
use finchat_llm::FunctionSpec;
use serde_json::Value;
use std::collections::HashMap;

/// Immutable table of the functions advertised to the model
///
/// Built once at startup; resolves a model's function-call designation into
/// a typed [`StockFunction`].
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    specs: Vec<FunctionSpec>,
    schemas: HashMap<FunctionKind, Value>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let specs: Vec<FunctionSpec> = FunctionKind::ALL.into_iter().map(FunctionKind::spec).collect();
        let schemas = FunctionKind::ALL
            .into_iter()
            .map(|kind| (kind, kind.parameters()))
            .collect();
        Self { specs, schemas }
    }

    /// Specs to send alongside the conversation
    pub fn specs(&self) -> &[FunctionSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Resolve a designation `name` with its raw JSON argument string
    ///
    /// The payload must be a JSON object (an empty string counts as `{}`),
    /// the name must be registered, and the object must satisfy the
    /// function's schema.
    pub fn resolve(&self, name: &str, raw_arguments: &str) -> Result<StockFunction> {
        let args: Value = if raw_arguments.trim().is_empty() {
            Value::Object(serde_json::Map::new())
        } else {
            serde_json::from_str(raw_arguments)
                .map_err(|e| ChatError::malformed(name, format!("invalid JSON: {e}")))?
        };
        if !args.is_object() {
            return Err(ChatError::malformed(name, "arguments must be a JSON object"));
        }

        let (kind, schema) = FunctionKind::from_name(name)
            .and_then(|kind| self.schemas.get(&kind).map(|schema| (kind, schema)))
            .ok_or_else(|| ChatError::UnknownFunction(name.to_string()))?;

        validate_arguments(name, schema, &args)?;
        StockFunction::from_arguments(kind, args)
    }
}
