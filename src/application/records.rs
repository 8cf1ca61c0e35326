//! Records kept about templates, deployed servers and chat sessions

use crate::generation::MessageRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A persisted template as the record store sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    /// Directory the files were written to
    pub directory: String,
    pub file_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of a server record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Created,
    Deployed,
    Failed,
}

impl ServerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerStatus::Created => "created",
            ServerStatus::Deployed => "deployed",
            ServerStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(ServerStatus::Created),
            "deployed" => Ok(ServerStatus::Deployed),
            "failed" => Ok(ServerStatus::Failed),
            other => Err(format!("unknown server status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRecord {
    pub id: String,
    pub template_id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ServerStatus,
    pub url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A conversation that produced (or revised) a template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSessionRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub template_id: Option<String>,
    pub doc_urls: Vec<String>,
    pub raw_response: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    pub session_id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessageRecord {
    pub fn new(session_id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_status_round_trips_through_text() {
        for status in [ServerStatus::Created, ServerStatus::Deployed, ServerStatus::Failed] {
            assert_eq!(status.as_str().parse::<ServerStatus>(), Ok(status));
        }
        assert!("running".parse::<ServerStatus>().is_err());
    }

    #[test]
    fn test_server_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ServerStatus::Deployed).unwrap(),
            "\"deployed\""
        );
    }
}
