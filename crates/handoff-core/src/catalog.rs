//! Operation catalog — the invocable surface derived from the registry
//!
//! The catalog is a pure function of the current registry, recomputed on
//! every query so it always reflects the active providers: one `ask_*`
//! operation per provider in registry order, then the single fan-out
//! operation when at least one provider is registered.

use serde_json::{Value, json};

use crate::registry::ProviderRegistry;

/// Name of the fan-out operation that queries every active provider.
pub const FAN_OUT_OPERATION: &str = "ask_all_llms";

/// Normalization rule shared by the catalog and the dispatcher: the
/// operation for a provider is `ask_` + the lowercased display name.
pub fn operation_name(provider_name: &str) -> String {
    format!("ask_{}", provider_name.to_lowercase())
}

/// Whether an operation targets one provider or all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    /// Dispatch to the named provider (display name).
    Single { provider: String },
    /// Dispatch to every registered provider concurrently.
    FanOut,
}

/// A named, schema-described capability offered to the protocol layer.
/// Derived from the registry, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    pub kind: OperationKind,
    pub description: String,
}

impl Operation {
    /// JSON schema for the invocation input: one required string `prompt`.
    pub fn input_schema(&self) -> Value {
        let prompt_description = match self.kind {
            OperationKind::Single { .. } => "The prompt to send to the LLM",
            OperationKind::FanOut => "The prompt to send to all LLMs",
        };
        json!({
            "type": "object",
            "properties": {
                "prompt": {
                    "type": "string",
                    "description": prompt_description,
                }
            },
            "required": ["prompt"]
        })
    }
}

/// Enumerate the operations currently offered by the registry.
pub fn operations(registry: &ProviderRegistry) -> Vec<Operation> {
    let mut ops: Vec<Operation> = registry
        .iter()
        .map(|provider| Operation {
            name: operation_name(provider.name()),
            kind: OperationKind::Single {
                provider: provider.name().to_string(),
            },
            description: format!("Ask {} a question", provider.name()),
        })
        .collect();

    if !registry.is_empty() {
        ops.push(Operation {
            name: FAN_OUT_OPERATION.to_string(),
            kind: OperationKind::FanOut,
            description: "Ask all available LLMs the same question and get their responses"
                .to_string(),
        });
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn registry(openai: bool, perplexity: bool, gemini: bool) -> ProviderRegistry {
        ProviderRegistry::from_config(&Config {
            openai_api_key: openai.then(|| "k".to_string()),
            perplexity_api_key: perplexity.then(|| "k".to_string()),
            gemini_api_key: gemini.then(|| "k".to_string()),
        })
    }

    #[test]
    fn test_empty_registry_empty_catalog() {
        let ops = operations(&registry(false, false, false));
        assert!(ops.is_empty());
    }

    #[test]
    fn test_one_provider_two_operations() {
        let ops = operations(&registry(false, true, false));
        let names: Vec<&str> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["ask_perplexity", "ask_all_llms"]);
    }

    #[test]
    fn test_full_registry_catalog_order() {
        let ops = operations(&registry(true, true, true));
        let names: Vec<&str> = ops.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["ask_chatgpt", "ask_perplexity", "ask_gemini", "ask_all_llms"]
        );
    }

    #[test]
    fn test_removing_provider_removes_its_operation() {
        let before = operations(&registry(true, true, true));
        let after = operations(&registry(true, false, true));
        assert_eq!(before.len(), 4);
        assert_eq!(after.len(), 3);
        assert!(after.iter().all(|o| o.name != "ask_perplexity"));
        assert!(after.iter().any(|o| o.name == FAN_OUT_OPERATION));
    }

    #[test]
    fn test_operation_descriptions() {
        let ops = operations(&registry(true, false, false));
        assert_eq!(ops[0].description, "Ask ChatGPT a question");
        assert_eq!(
            ops[1].description,
            "Ask all available LLMs the same question and get their responses"
        );
    }

    #[test]
    fn test_input_schema_requires_prompt() {
        for op in operations(&registry(true, false, false)) {
            let schema = op.input_schema();
            assert_eq!(schema["type"], "object");
            assert_eq!(schema["properties"]["prompt"]["type"], "string");
            assert_eq!(schema["required"][0], "prompt");
        }
    }

    #[test]
    fn test_operation_name_normalization() {
        assert_eq!(operation_name("ChatGPT"), "ask_chatgpt");
        assert_eq!(operation_name("Gemini"), "ask_gemini");
    }
}
