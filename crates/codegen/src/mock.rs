//! Mock Codegen Backend Implementation
//!
//! Minimal mock used by `CodegenFactory` when provider is `"mock"`.
//! Returns deterministic code for testing; failure modes are programmable
//! so orchestrator tests can exercise the no-penalty path.

use std::sync::{Arc, Mutex};

use crate::{AppSpec, CodegenError, GeneratedApp, GenerationBackend};

/// Outcome the mock backend produces for the next generations
#[derive(Debug, Clone, Default, PartialEq)]
pub enum MockOutcome {
    #[default]
    Succeed,
    Fail,
    Reject,
}

/// Mock codegen backend for testing
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    outcome: Arc<Mutex<MockOutcome>>,
    generated: Arc<Mutex<Vec<AppSpec>>>,
}

impl MockBackend {
    /// Create a new mock backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the outcome of subsequent generations
    pub fn set_outcome(&self, outcome: MockOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    /// Specs this backend has successfully generated for
    pub fn generated_specs(&self) -> Vec<AppSpec> {
        self.generated.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, spec: &AppSpec) -> Result<GeneratedApp, CodegenError> {
        tracing::info!("Mock codegen backend processing spec");

        match self.outcome.lock().unwrap().clone() {
            MockOutcome::Fail => {
                return Err(CodegenError::Request("mock backend unreachable".to_string()))
            }
            MockOutcome::Reject => {
                return Err(CodegenError::Rejected("mock content policy".to_string()))
            }
            MockOutcome::Succeed => {}
        }

        let code = format!(
            "// {category} app: {description}\nexport default function App() {{\n  // behavior: {behavior}\n  return render(\"{style}\", \"{color}\");\n}}\n",
            category = spec.category,
            description = spec.description,
            behavior = spec.behavior,
            style = spec.style,
            color = spec.color,
        );

        self.generated.lock().unwrap().push(spec.clone());

        let input_tokens = spec.description.len() as i32 / 4;
        let output_tokens = code.len() as i32 / 4;

        Ok(GeneratedApp {
            code,
            model: "mock-model".to_string(),
            input_tokens,
            output_tokens,
            stop_reason: "end_turn".to_string(),
        })
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }
}
