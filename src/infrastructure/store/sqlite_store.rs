//! SQLite-backed record store
//!
//! All database work runs on the blocking pool through [`SqliteRecordStore::with_connection`].
//! Timestamps are stored as Unix milliseconds.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::application::{
    ChatMessageRecord, ChatSessionRecord, RecordStore, ServerRecord, ServerStatus, StoreError,
    TemplateRecord,
};
use crate::generation::MessageRole;
use crate::infrastructure::store::migrations::migrations;

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<rusqlite_migration::Error> for StoreError {
    fn from(e: rusqlite_migration::Error) -> Self {
        StoreError::Migration(e.to_string())
    }
}

/// Record store over a pooled SQLite database file
pub struct SqliteRecordStore {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteRecordStore {
    /// Open (creating if needed) the database and bring its schema up to date
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StoreError::Database(format!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let manager = SqliteConnectionManager::file(&path);
        let pool = Pool::builder()
            .max_size(8)
            .connection_timeout(Duration::from_secs(30))
            .build(manager)
            .map_err(|e| StoreError::Pool(format!("Failed to create connection pool: {}", e)))?;

        let store = Self { pool };
        store
            .with_connection(|conn| {
                // Ignore errors for databases that cannot switch journal mode
                conn.pragma_update(None, "journal_mode", "WAL").ok();
                migrations().to_latest(conn)?;
                Ok(())
            })
            .await?;

        debug!(path = %path.display(), "Record store ready");
        Ok(store)
    }

    /// Execute a function with a database connection from the pool
    async fn with_connection<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<R, StoreError> + Send + 'static,
        R: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Pool(format!("Failed to get pooled connection: {}", e)))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Spawn(e.to_string()))?
    }
}

fn millis(at: &DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

fn not_found(entity: &'static str, id: &str) -> StoreError {
    StoreError::NotFound {
        entity,
        id: id.to_string(),
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn get_template(&self, template_id: &str) -> Result<Option<TemplateRecord>, StoreError> {
        let template_id = template_id.to_string();
        self.with_connection(move |conn| {
            let record = conn
                .query_row(
                    "SELECT id, name, description, owner_id, directory, file_count, created_at, updated_at
                     FROM templates WHERE id = ?1",
                    params![template_id],
                    |row| {
                        Ok(TemplateRecord {
                            id: row.get(0)?,
                            name: row.get(1)?,
                            description: row.get(2)?,
                            owner_id: row.get(3)?,
                            directory: row.get(4)?,
                            file_count: row.get::<_, i64>(5)?.max(0) as usize,
                            created_at: from_millis(row.get(6)?),
                            updated_at: from_millis(row.get(7)?),
                        })
                    },
                )
                .optional()?;
            Ok(record)
        })
        .await
    }

    async fn upsert_template(&self, record: &TemplateRecord) -> Result<(), StoreError> {
        let record = record.clone();
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO templates
                    (id, name, description, owner_id, directory, file_count, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    description = excluded.description,
                    owner_id = excluded.owner_id,
                    directory = excluded.directory,
                    file_count = excluded.file_count,
                    updated_at = excluded.updated_at",
                params![
                    record.id,
                    record.name,
                    record.description,
                    record.owner_id,
                    record.directory,
                    record.file_count as i64,
                    millis(&record.created_at),
                    millis(&record.updated_at),
                ],
            )?;
            debug!(template_id = %record.id, "Template record saved");
            Ok(())
        })
        .await
    }

    async fn create_server(&self, record: &ServerRecord) -> Result<(), StoreError> {
        let record = record.clone();
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO servers
                    (id, template_id, owner_id, name, description, status, url, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    record.id,
                    record.template_id,
                    record.owner_id,
                    record.name,
                    record.description,
                    record.status.as_str(),
                    record.url,
                    millis(&record.created_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn get_server(&self, server_id: &str) -> Result<Option<ServerRecord>, StoreError> {
        let server_id = server_id.to_string();
        self.with_connection(move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, template_id, owner_id, name, description, status, url, created_at
                     FROM servers WHERE id = ?1",
                    params![server_id],
                    |row| {
                        Ok((
                            ServerRecord {
                                id: row.get(0)?,
                                template_id: row.get(1)?,
                                owner_id: row.get(2)?,
                                name: row.get(3)?,
                                description: row.get(4)?,
                                status: ServerStatus::Created,
                                url: row.get(6)?,
                                created_at: from_millis(row.get(7)?),
                            },
                            row.get::<_, String>(5)?,
                        ))
                    },
                )
                .optional()?;

            row.map(|(mut record, status)| {
                record.status = status.parse().map_err(StoreError::Database)?;
                Ok(record)
            })
            .transpose()
        })
        .await
    }

    async fn update_server_status(
        &self,
        server_id: &str,
        status: ServerStatus,
        url: Option<&str>,
    ) -> Result<(), StoreError> {
        let server_id = server_id.to_string();
        let url = url.map(str::to_string);
        self.with_connection(move |conn| {
            let updated = conn.execute(
                "UPDATE servers SET status = ?2, url = COALESCE(?3, url), updated_at = ?4
                 WHERE id = ?1",
                params![server_id, status.as_str(), url, millis(&Utc::now())],
            )?;
            if updated == 0 {
                return Err(not_found("Server", &server_id));
            }
            Ok(())
        })
        .await
    }

    async fn create_chat_session(&self, session: &ChatSessionRecord) -> Result<(), StoreError> {
        let session = session.clone();
        let doc_urls = serde_json::to_string(&session.doc_urls)?;
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO chat_sessions
                    (id, user_id, title, template_id, doc_urls_json, raw_response, has_response,
                     created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                params![
                    session.id,
                    session.user_id,
                    session.title,
                    session.template_id,
                    doc_urls,
                    session.raw_response,
                    session.raw_response.is_some(),
                    millis(&session.created_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn save_chat_response(
        &self,
        session_id: &str,
        raw_response: &str,
    ) -> Result<(), StoreError> {
        let session_id = session_id.to_string();
        let raw_response = raw_response.to_string();
        self.with_connection(move |conn| {
            let updated = conn.execute(
                "UPDATE chat_sessions SET raw_response = ?2, has_response = 1, updated_at = ?3
                 WHERE id = ?1",
                params![session_id, raw_response, millis(&Utc::now())],
            )?;
            if updated == 0 {
                return Err(not_found("Chat session", &session_id));
            }
            Ok(())
        })
        .await
    }

    async fn append_chat_message(&self, message: &ChatMessageRecord) -> Result<(), StoreError> {
        let message = message.clone();
        self.with_connection(move |conn| {
            conn.execute(
                "INSERT INTO chat_messages (session_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    message.session_id,
                    message.role.as_str(),
                    message.content,
                    millis(&message.created_at),
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn list_chat_messages(
        &self,
        session_id: &str,
    ) -> Result<Vec<ChatMessageRecord>, StoreError> {
        let session_id = session_id.to_string();
        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT session_id, role, content, created_at FROM chat_messages
                 WHERE session_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map(params![session_id], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                })?
                .collect::<Result<Vec<_>, _>>()?;

            rows.into_iter()
                .map(|(session_id, role, content, created_at)| {
                    let role = MessageRole::parse(&role).ok_or_else(|| {
                        StoreError::Database(format!("unknown message role '{role}'"))
                    })?;
                    Ok(ChatMessageRecord {
                        session_id,
                        role,
                        content,
                        created_at: from_millis(created_at),
                    })
                })
                .collect()
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open(temp: &TempDir) -> SqliteRecordStore {
        SqliteRecordStore::open(temp.path().join("nested/records.db"))
            .await
            .unwrap()
    }

    fn template(id: &str, name: &str) -> TemplateRecord {
        let now = Utc::now();
        TemplateRecord {
            id: id.to_string(),
            name: name.to_string(),
            description: "desc".to_string(),
            owner_id: "user-1".to_string(),
            directory: format!("/tmp/{id}"),
            file_count: 2,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_template_upsert_keeps_created_at() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp).await;

        let first = template("tpl-1", "first");
        store.upsert_template(&first).await.unwrap();

        let mut second = template("tpl-1", "second");
        second.created_at = first.created_at + chrono::Duration::hours(1);
        second.file_count = 5;
        store.upsert_template(&second).await.unwrap();

        let stored = store.get_template("tpl-1").await.unwrap().unwrap();
        assert_eq!(stored.name, "second");
        assert_eq!(stored.file_count, 5);
        assert_eq!(stored.created_at.timestamp_millis(), first.created_at.timestamp_millis());
    }

    #[tokio::test]
    async fn test_missing_template_is_none() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp).await;
        assert!(store.get_template("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_status_update() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp).await;
        store.upsert_template(&template("tpl-1", "t")).await.unwrap();

        store
            .create_server(&ServerRecord {
                id: "srv-1".to_string(),
                template_id: "tpl-1".to_string(),
                owner_id: "user-1".to_string(),
                name: "weather".to_string(),
                description: None,
                status: ServerStatus::Created,
                url: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        store
            .update_server_status("srv-1", ServerStatus::Deployed, Some("https://x/srv-1"))
            .await
            .unwrap();

        let server = store.get_server("srv-1").await.unwrap().unwrap();
        assert_eq!(server.status, ServerStatus::Deployed);
        assert_eq!(server.url.as_deref(), Some("https://x/srv-1"));

        let missing = store
            .update_server_status("srv-404", ServerStatus::Failed, None)
            .await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_chat_session_flow() {
        let temp = TempDir::new().unwrap();
        let store = open(&temp).await;

        store
            .create_chat_session(&ChatSessionRecord {
                id: "chat-1".to_string(),
                user_id: "user-1".to_string(),
                title: "Weather".to_string(),
                template_id: Some("tpl-1".to_string()),
                doc_urls: vec!["https://docs.example.com".to_string()],
                raw_response: None,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        store.save_chat_response("chat-1", "raw").await.unwrap();
        store
            .append_chat_message(&ChatMessageRecord::new("chat-1", MessageRole::User, "hi"))
            .await
            .unwrap();
        store
            .append_chat_message(&ChatMessageRecord::new("chat-1", MessageRole::Assistant, "raw"))
            .await
            .unwrap();

        let messages = store.list_chat_messages("chat-1").await.unwrap();
        assert_eq!(
            messages.iter().map(|m| m.role).collect::<Vec<_>>(),
            [MessageRole::User, MessageRole::Assistant]
        );

        let missing = store.save_chat_response("chat-404", "raw").await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_reopen_keeps_records() {
        let temp = TempDir::new().unwrap();
        open(&temp).await.upsert_template(&template("tpl-1", "t")).await.unwrap();

        let reopened = open(&temp).await;
        assert!(reopened.get_template("tpl-1").await.unwrap().is_some());
    }
}
