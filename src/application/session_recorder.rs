//! Best-effort linkage of a generation run to a chat session

use crate::application::{ChatMessageRecord, ChatSessionRecord, RecordStore, StoreError};
use crate::generation::{GenerationRequest, MessageRole};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const TITLE_CHARS: usize = 80;
const DEFAULT_TITLE: &str = "MCP Generation Session";

/// Records the conversation side of a run; never fails the run
pub struct SessionRecorder {
    store: Arc<dyn RecordStore>,
}

impl SessionRecorder {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Returns the session id to report: the supplied one, or the new one if creation worked
    pub async fn record(
        &self,
        request: &GenerationRequest,
        template_id: &str,
        raw_response: &str,
    ) -> Option<String> {
        match &request.chat_session_id {
            Some(session_id) => {
                if let Err(e) = self.append(session_id, raw_response).await {
                    warn!(
                        session_id = %session_id,
                        error = %e,
                        "Failed to save response to chat session"
                    );
                }
                Some(session_id.clone())
            }
            None => match self.create(request, template_id, raw_response).await {
                Ok(session_id) => Some(session_id),
                Err(e) => {
                    warn!(template_id = %template_id, error = %e, "Failed to create chat session");
                    None
                }
            },
        }
    }

    async fn create(
        &self,
        request: &GenerationRequest,
        template_id: &str,
        raw_response: &str,
    ) -> Result<String, StoreError> {
        let session = ChatSessionRecord {
            id: Uuid::new_v4().to_string(),
            user_id: request.user_id.clone(),
            title: session_title(&request.instruction),
            template_id: Some(template_id.to_string()),
            doc_urls: request.doc_urls.clone(),
            raw_response: Some(raw_response.to_string()),
            created_at: Utc::now(),
        };
        self.store.create_chat_session(&session).await?;
        self.store
            .append_chat_message(&ChatMessageRecord::new(
                &session.id,
                MessageRole::User,
                &request.instruction,
            ))
            .await?;
        self.store
            .append_chat_message(&ChatMessageRecord::new(
                &session.id,
                MessageRole::Assistant,
                raw_response,
            ))
            .await?;

        info!(session_id = %session.id, template_id = %template_id, "Chat session created");
        Ok(session.id)
    }

    async fn append(&self, session_id: &str, raw_response: &str) -> Result<(), StoreError> {
        self.store.save_chat_response(session_id, raw_response).await?;
        self.store
            .append_chat_message(&ChatMessageRecord::new(
                session_id,
                MessageRole::Assistant,
                raw_response,
            ))
            .await?;
        info!(session_id = %session_id, "Chat session response saved");
        Ok(())
    }
}

fn session_title(instruction: &str) -> String {
    let first_line = instruction.lines().map(str::trim).find(|l| !l.is_empty());
    match first_line {
        Some(line) if line.chars().count() > TITLE_CHARS => {
            let mut title: String = line.chars().take(TITLE_CHARS).collect();
            title.push_str("...");
            title
        }
        Some(line) => line.to_string(),
        None => DEFAULT_TITLE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::store::SqliteRecordStore;
    use tempfile::TempDir;
    use tracing_test::traced_test;

    async fn store(temp: &TempDir) -> Arc<SqliteRecordStore> {
        Arc::new(
            SqliteRecordStore::open(temp.path().join("records.db"))
                .await
                .unwrap(),
        )
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new(
            "user-1",
            "Wrap the forecast endpoint",
            vec!["https://docs.example.com/weather".to_string()],
        )
    }

    #[tokio::test]
    async fn test_new_session_created_with_both_turns() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp).await;
        let recorder = SessionRecorder::new(store.clone());

        let session_id = recorder.record(&request(), "tpl-1", "raw output").await.unwrap();

        let messages = store.list_chat_messages(&session_id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "Wrap the forecast endpoint");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "raw output");
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unknown_supplied_session_still_reported() {
        let temp = TempDir::new().unwrap();
        let recorder = SessionRecorder::new(store(&temp).await);
        let request = request().with_chat_session_id("missing-session");

        let session_id = recorder.record(&request, "tpl-1", "raw").await;

        assert_eq!(session_id.as_deref(), Some("missing-session"));
        assert!(logs_contain("Failed to save response to chat session"));
    }

    #[tokio::test]
    async fn test_existing_session_gets_response_appended() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp).await;
        let recorder = SessionRecorder::new(store.clone());

        let session_id = recorder.record(&request(), "tpl-1", "first").await.unwrap();
        let resumed = request().with_chat_session_id(session_id.clone());
        let reported = recorder.record(&resumed, "tpl-1", "second").await;

        assert_eq!(reported.as_deref(), Some(session_id.as_str()));
        let messages = store.list_chat_messages(&session_id).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].content, "second");
    }

    #[test]
    fn test_session_title() {
        assert_eq!(session_title("  \n Build it \nmore"), "Build it");
        assert_eq!(session_title(""), DEFAULT_TITLE);
        let long = "x".repeat(100);
        assert_eq!(session_title(&long).chars().count(), TITLE_CHARS + 3);
    }
}
