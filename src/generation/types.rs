//! Core types for the generation domain

use crate::documentation::AggregatedDocumentation;
use crate::generation::{ApiCredentials, GenerationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// File name under which the raw model response is always kept
pub const DEBUG_RAW_RESPONSE_FILE: &str = "debug_raw_response.txt";

/// Extracted files, keyed by relative path
pub type FileMap = BTreeMap<String, String>;

/// Inputs to one generation run
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub user_id: String,
    pub instruction: String,
    pub doc_urls: Vec<String>,
    pub api_credentials: ApiCredentials,
    pub template_id: Option<String>,
    pub server_id: Option<String>,
    pub chat_session_id: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        user_id: impl Into<String>,
        instruction: impl Into<String>,
        doc_urls: Vec<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            instruction: instruction.into(),
            doc_urls,
            api_credentials: ApiCredentials::default(),
            template_id: None,
            server_id: None,
            chat_session_id: None,
        }
    }

    pub fn with_credentials(mut self, credentials: ApiCredentials) -> Self {
        self.api_credentials = credentials;
        self
    }

    /// Resume an existing template; its directory is overwritten file by file
    pub fn with_template_id(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    pub fn with_server_id(mut self, server_id: impl Into<String>) -> Self {
        self.server_id = Some(server_id.into());
        self
    }

    pub fn with_chat_session_id(mut self, chat_session_id: impl Into<String>) -> Self {
        self.chat_session_id = Some(chat_session_id.into());
        self
    }

    /// Check the request before a run starts
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.instruction.trim().is_empty() {
            return Err(GenerationError::ValidationError(
                "Instruction cannot be empty".to_string(),
            ));
        }
        if self.doc_urls.is_empty() {
            return Err(GenerationError::NoDocumentationSources);
        }
        for url in &self.doc_urls {
            url::Url::parse(url).map_err(|e| GenerationError::InvalidDocumentationUrl {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(template_id) = &self.template_id {
            if !is_safe_template_id(template_id) {
                return Err(GenerationError::ValidationError(format!(
                    "Template id must be a single path component: {template_id}"
                )));
            }
        }
        Ok(())
    }
}

/// Template ids name a directory under the templates root
pub fn is_safe_template_id(template_id: &str) -> bool {
    !template_id.is_empty()
        && template_id != "."
        && template_id != ".."
        && !template_id.contains(['/', '\\'])
}

/// Mint a fresh template identifier
pub fn new_template_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(MessageRole::User),
            "assistant" => Some(MessageRole::Assistant),
            _ => None,
        }
    }
}

/// One turn of the workflow conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Context threaded through the LLM workflow
#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub user_id: String,
    pub latest_user_message: String,
    messages: Vec<ConversationMessage>,
    pub documentation: AggregatedDocumentation,
    pub implementation_plan: String,
    pub generated_code: Vec<FileEntry>,
    pub api_credentials: ApiCredentials,
    pub error: Option<String>,
    pub template_id: Option<String>,
    pub server_id: Option<String>,
}

impl WorkflowState {
    /// Initial state: empty plan, no code, no error
    pub fn initial(request: &GenerationRequest, documentation: AggregatedDocumentation) -> Self {
        Self {
            user_id: request.user_id.clone(),
            latest_user_message: request.instruction.clone(),
            messages: Vec::new(),
            documentation,
            implementation_plan: String::new(),
            generated_code: Vec::new(),
            api_credentials: request.api_credentials.clone(),
            error: None,
            template_id: request.template_id.clone(),
            server_id: request.server_id.clone(),
        }
    }

    /// Conversation history is append-only
    pub fn push_message(&mut self, message: ConversationMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }
}

/// A (name, content) pair reported by the model. Either side may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// What the workflow handed back, normalised by the invoker
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedArtifact {
    /// Unstructured response text, possibly empty
    pub raw_response: String,
    /// Structured file list, when the workflow or the invoker produced one
    pub files: Option<Vec<FileEntry>>,
}

impl GeneratedArtifact {
    pub fn from_raw(raw_response: impl Into<String>) -> Self {
        Self {
            raw_response: raw_response.into(),
            files: None,
        }
    }

    pub fn with_files(mut self, files: Vec<FileEntry>) -> Self {
        self.files = Some(files);
        self
    }
}

/// Result contract of a generation workflow. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub server_id: Option<String>,
    #[serde(default)]
    pub raw_response: Option<String>,
    #[serde(default)]
    pub generated_code: Option<Vec<FileEntry>>,
    #[serde(default)]
    pub implementation_plan: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Normalised result of the workflow stage
#[derive(Debug, Clone)]
pub struct Invocation {
    pub template_id: String,
    pub server_id: Option<String>,
    pub artifact: GeneratedArtifact,
    pub implementation_plan: String,
    pub error_details: Option<String>,
}
