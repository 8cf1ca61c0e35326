//! Two-stage LLM workflow: plan the server, then write its files

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::LlmConfig;
use crate::generation::{
    ConversationMessage, GenerationWorkflow, WorkflowError, WorkflowOutcome, WorkflowState,
};
use crate::infrastructure::llm::{
    ChatCompletionClient, CodingPrompt, CompletionOptions, PlanningPrompt, PromptRenderer,
};

/// Models and sampling settings for both stages
#[derive(Debug, Clone)]
pub struct PlanAndCodeSettings {
    pub planning_model: String,
    pub coding_model: String,
    pub planning_temperature: f32,
    pub coding_temperature: f32,
    /// Documentation is cut to this many characters before planning
    pub documentation_char_limit: usize,
}

impl From<&LlmConfig> for PlanAndCodeSettings {
    fn from(config: &LlmConfig) -> Self {
        Self {
            planning_model: config.planning_model.clone(),
            coding_model: config.coding_model.clone(),
            planning_temperature: config.planning_temperature,
            coding_temperature: config.coding_temperature,
            documentation_char_limit: config.documentation_char_limit,
        }
    }
}

pub struct PlanAndCodeWorkflow {
    client: Arc<ChatCompletionClient>,
    prompts: PromptRenderer,
    settings: PlanAndCodeSettings,
}

impl PlanAndCodeWorkflow {
    pub fn new(
        client: Arc<ChatCompletionClient>,
        settings: PlanAndCodeSettings,
    ) -> Result<Self, WorkflowError> {
        Ok(Self {
            client,
            prompts: PromptRenderer::new()?,
            settings,
        })
    }

    async fn ask(
        &self,
        state: &mut WorkflowState,
        prompt: String,
        model: &str,
        temperature: f32,
    ) -> Result<String, crate::infrastructure::llm::LlmError> {
        let message = ConversationMessage::user(prompt);
        let options = CompletionOptions {
            model,
            temperature,
            json_response: true,
        };
        let reply = self.client.complete(std::slice::from_ref(&message), options).await?;
        state.push_message(message);
        state.push_message(ConversationMessage::assistant(reply.clone()));
        Ok(reply)
    }
}

#[async_trait]
impl GenerationWorkflow for PlanAndCodeWorkflow {
    async fn run(&self, mut state: WorkflowState) -> Result<WorkflowOutcome, WorkflowError> {
        let credential_keys = state.api_credentials.keys();
        let credential_keys: Vec<String> = credential_keys.into_iter().map(str::to_string).collect();
        let keys: Vec<&str> = credential_keys.iter().map(String::as_str).collect();
        let documentation = state
            .documentation
            .truncated(self.settings.documentation_char_limit)
            .to_string();
        let instruction = state.latest_user_message.clone();

        // 1. Plan
        let planning_prompt = self.prompts.planning(&PlanningPrompt {
            instruction: &instruction,
            documentation: &documentation,
            credential_keys: keys.clone(),
        })?;
        let plan = self
            .ask(
                &mut state,
                planning_prompt,
                &self.settings.planning_model,
                self.settings.planning_temperature,
            )
            .await
            .map_err(|e| WorkflowError::Planning(e.to_string()))?;
        info!(plan_chars = plan.len(), "Implementation plan ready");
        state.implementation_plan = plan.clone();

        // 2. Code
        let coding_prompt = self.prompts.coding(&CodingPrompt {
            instruction: &instruction,
            plan: &plan,
            credential_keys: keys,
        })?;
        let outcome = match self
            .ask(
                &mut state,
                coding_prompt,
                &self.settings.coding_model,
                self.settings.coding_temperature,
            )
            .await
        {
            Ok(raw_response) => {
                info!(
                    raw_chars = raw_response.len(),
                    turns = state.messages().len(),
                    "Code generation finished"
                );
                WorkflowOutcome {
                    server_id: state.server_id.clone(),
                    raw_response: Some(raw_response),
                    implementation_plan: Some(plan),
                    ..Default::default()
                }
            }
            Err(e) => {
                warn!(error = %e, "Code generation failed after planning");
                WorkflowOutcome {
                    server_id: state.server_id.clone(),
                    implementation_plan: Some(plan),
                    error: Some(WorkflowError::Coding(e.to_string()).to_string()),
                    ..Default::default()
                }
            }
        };

        Ok(outcome)
    }
}
