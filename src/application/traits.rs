//! Port interfaces for the application layer

use crate::application::{
    ChatMessageRecord, ChatSessionRecord, ServerRecord, ServerStatus, StoreError, TemplateRecord,
};
use async_trait::async_trait;

/// Persistence for template, server and chat-session records
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_template(&self, template_id: &str) -> Result<Option<TemplateRecord>, StoreError>;

    /// Insert or replace by id; `created_at` of an existing record is kept
    async fn upsert_template(&self, record: &TemplateRecord) -> Result<(), StoreError>;

    async fn create_server(&self, record: &ServerRecord) -> Result<(), StoreError>;

    async fn get_server(&self, server_id: &str) -> Result<Option<ServerRecord>, StoreError>;

    async fn update_server_status(
        &self,
        server_id: &str,
        status: ServerStatus,
        url: Option<&str>,
    ) -> Result<(), StoreError>;

    async fn create_chat_session(&self, session: &ChatSessionRecord) -> Result<(), StoreError>;

    /// Attach a model response to an existing session
    async fn save_chat_response(&self, session_id: &str, raw_response: &str)
    -> Result<(), StoreError>;

    async fn append_chat_message(&self, message: &ChatMessageRecord) -> Result<(), StoreError>;

    async fn list_chat_messages(&self, session_id: &str)
    -> Result<Vec<ChatMessageRecord>, StoreError>;
}
