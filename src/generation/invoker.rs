//! Workflow invocation and outcome normalisation

use crate::documentation::AggregatedDocumentation;
use crate::generation::extraction::parse_files_object;
use crate::generation::{
    DEBUG_RAW_RESPONSE_FILE, FileEntry, GeneratedArtifact, GenerationRequest, GenerationWorkflow,
    Invocation, WorkflowError, WorkflowOutcome, WorkflowState, is_safe_template_id,
    new_template_id,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Runs the generation workflow and turns whatever it returns into an [`Invocation`]
pub struct WorkflowInvoker {
    workflow: Arc<dyn GenerationWorkflow>,
}

impl WorkflowInvoker {
    pub fn new(workflow: Arc<dyn GenerationWorkflow>) -> Self {
        Self { workflow }
    }

    /// Never fails. A workflow error or panic becomes `error_details` on an
    /// empty artifact with a fresh template id.
    pub async fn invoke(
        &self,
        request: &GenerationRequest,
        documentation: AggregatedDocumentation,
    ) -> Invocation {
        let state = WorkflowState::initial(request, documentation);
        let workflow = Arc::clone(&self.workflow);

        info!(user_id = %request.user_id, "Invoking generation workflow");
        let result = match tokio::spawn(async move { workflow.run(state).await }).await {
            Ok(result) => result,
            Err(join_error) => Err(WorkflowError::Aborted(join_error.to_string())),
        };

        match result {
            Ok(outcome) => normalise(request, outcome),
            Err(e) => {
                let template_id = new_template_id();
                error!(
                    template_id = %template_id,
                    error = %e,
                    "Generation workflow failed, continuing with an empty artifact"
                );
                Invocation {
                    template_id,
                    server_id: request.server_id.clone(),
                    artifact: GeneratedArtifact::default(),
                    implementation_plan: String::new(),
                    error_details: Some(e.to_string()),
                }
            }
        }
    }
}

fn normalise(request: &GenerationRequest, outcome: WorkflowOutcome) -> Invocation {
    let workflow_id = outcome.template_id.filter(|id| {
        let usable = is_safe_template_id(id);
        if !usable {
            warn!(template_id = %id, "Ignoring unusable template id from workflow");
        }
        usable
    });
    let template_id = workflow_id
        .or_else(|| request.template_id.clone())
        .unwrap_or_else(new_template_id);

    let mut raw_response = outcome.raw_response;
    let mut files = outcome.generated_code;

    if let Some(list) = files.as_mut() {
        let promoted = take_debug_entry(list);
        if raw_response.is_none() {
            if let Some(content) = promoted {
                debug!(template_id = %template_id, "Promoted debug file to raw response");
                raw_response = Some(content);
            }
        }
    }

    if files.as_ref().is_none_or(Vec::is_empty) {
        if let Some(raw) = raw_response.as_deref() {
            match parse_files_object(raw) {
                Some(parsed) => files = Some(parsed),
                None => debug!(
                    template_id = %template_id,
                    "Raw response is not a files object, leaving it to the extractor"
                ),
            }
        }
    }

    let error_details = outcome.error.filter(|e| !e.trim().is_empty());
    if let Some(details) = &error_details {
        warn!(template_id = %template_id, error = %details, "Workflow reported an error");
    }

    Invocation {
        template_id,
        server_id: outcome.server_id.or_else(|| request.server_id.clone()),
        artifact: GeneratedArtifact {
            raw_response: raw_response.unwrap_or_default(),
            files,
        },
        implementation_plan: outcome.implementation_plan.unwrap_or_default(),
        error_details,
    }
}

/// Remove every debug entry from the list, returning the last one's content
fn take_debug_entry(list: &mut Vec<FileEntry>) -> Option<String> {
    let mut taken = None;
    list.retain(|entry| {
        if entry.name.trim() == DEBUG_RAW_RESPONSE_FILE {
            taken = Some(entry.content.clone());
            false
        } else {
            true
        }
    });
    taken
}
