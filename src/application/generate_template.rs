//! Use case for generating a template from API documentation

use crate::application::{
    ApplicationError, GenerateResponse, RecordStore, SessionRecorder, TemplateRecord,
};
use crate::documentation::DocumentationAggregator;
use crate::generation::{
    DEBUG_RAW_RESPONSE_FILE, GenerationRequest, Invocation, PersistReport, ResponseExtractor,
    TemplatePersister, WorkflowInvoker,
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_TEMPLATE_NAME: &str = "Generated MCP server";
const DESCRIPTION_CHARS: usize = 200;

/// Use case for generating a template: aggregate, invoke, extract, persist
pub struct GenerateTemplateUseCase {
    aggregator: DocumentationAggregator,
    invoker: WorkflowInvoker,
    extractor: ResponseExtractor,
    persister: TemplatePersister,
    recorder: SessionRecorder,
    store: Arc<dyn RecordStore>,
}

impl GenerateTemplateUseCase {
    pub fn new(
        aggregator: DocumentationAggregator,
        invoker: WorkflowInvoker,
        persister: TemplatePersister,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            aggregator,
            invoker,
            extractor: ResponseExtractor::new(),
            persister,
            recorder: SessionRecorder::new(Arc::clone(&store)),
            store,
        }
    }

    pub fn with_extractor(mut self, extractor: ResponseExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Only an invalid request is an error. Everything after that is reported
    /// through the response envelope.
    pub async fn execute(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerateResponse, ApplicationError> {
        // 1. Validate request
        request.validate()?;

        // 2. Aggregate documentation
        let documentation = self.aggregator.aggregate(&request.doc_urls).await;

        // 3. Run the workflow
        let invocation = self.invoker.invoke(&request, documentation).await;
        let template_id = invocation.template_id.as_str();
        let raw_response = invocation.artifact.raw_response.as_str();

        // 4. Extract files
        let extracted = self.extractor.extract(&invocation.artifact);

        // 5. Persist and record the session side by side
        let (report, chat_session_id) = tokio::join!(
            self.persister.persist(template_id, raw_response, &extracted.files),
            self.recorder.record(&request, template_id, raw_response),
        );

        // 6. Make the template findable for deployment
        self.record_template(&request, &invocation, &report).await;

        let message = summary_message(&report);
        info!(
            template_id = %template_id,
            files = report.files.len(),
            strategy = extracted.strategy.unwrap_or("none"),
            "Generation run finished"
        );

        Ok(GenerateResponse {
            success: true,
            template_id: invocation.template_id.clone(),
            server_id: invocation.server_id.clone(),
            message,
            error_details: invocation.error_details.clone(),
            chat_session_id,
            files: report.files,
            template_path: report.directory.display().to_string(),
        })
    }

    async fn record_template(
        &self,
        request: &GenerationRequest,
        invocation: &Invocation,
        report: &PersistReport,
    ) {
        let (name, description) = describe_template(&invocation.implementation_plan, &request.instruction);
        let now = Utc::now();
        let record = TemplateRecord {
            id: invocation.template_id.clone(),
            name,
            description,
            owner_id: request.user_id.clone(),
            directory: report.directory.display().to_string(),
            file_count: source_file_count(report),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.store.upsert_template(&record).await {
            warn!(template_id = %record.id, error = %e, "Failed to save template record");
        }
    }
}

/// Name and description from the plan's `service_name`/`description`, if it is JSON
fn describe_template(plan: &str, instruction: &str) -> (String, String) {
    let plan: Option<Value> = serde_json::from_str(plan).ok();
    let field = |key: &str| {
        plan.as_ref()
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let name = field("service_name").unwrap_or_else(|| DEFAULT_TEMPLATE_NAME.to_string());
    let description =
        field("description").unwrap_or_else(|| instruction.trim().chars().take(DESCRIPTION_CHARS).collect());
    (name, description)
}

fn source_file_count(report: &PersistReport) -> usize {
    report
        .files
        .iter()
        .filter(|f| f.as_str() != DEBUG_RAW_RESPONSE_FILE)
        .count()
}

fn summary_message(report: &PersistReport) -> String {
    let count = source_file_count(report);
    if count == 0 {
        "No files could be generated; the raw response was saved for review".to_string()
    } else if report.fallback_written {
        "Files could not be extracted; wrote a fallback main.py from the raw response".to_string()
    } else if report.timed_out {
        format!("Template partially saved ({count} files) before the save timed out")
    } else {
        format!("Template generated with {count} files")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_template_from_plan() {
        let plan = r#"{"service_name":"weather-mcp","description":"Forecast tools"}"#;
        assert_eq!(
            describe_template(plan, "ignored"),
            ("weather-mcp".to_string(), "Forecast tools".to_string())
        );
    }

    #[test]
    fn test_describe_template_without_plan() {
        let (name, description) = describe_template("not json", "  Wrap the search API  ");
        assert_eq!(name, DEFAULT_TEMPLATE_NAME);
        assert_eq!(description, "Wrap the search API");
    }

    #[test]
    fn test_summary_message() {
        let mut report = PersistReport {
            files: vec![DEBUG_RAW_RESPONSE_FILE.to_string()],
            ..Default::default()
        };
        assert!(summary_message(&report).starts_with("No files"));

        report.files.push("main.py".to_string());
        assert_eq!(summary_message(&report), "Template generated with 1 files");

        report.fallback_written = true;
        assert!(summary_message(&report).contains("fallback"));
    }
}
