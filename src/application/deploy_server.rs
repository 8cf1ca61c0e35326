//! Use case for registering a server built from a stored template

use crate::application::{
    ApplicationError, DeployRequest, DeployResponse, RecordStore, ServerRecord, ServerStatus,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Creates a server record for a template and marks it deployed.
///
/// No runtime is started; the URL is a placeholder under the configured base.
pub struct DeployServerUseCase {
    store: Arc<dyn RecordStore>,
    base_url: String,
}

impl DeployServerUseCase {
    pub fn new(store: Arc<dyn RecordStore>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            base_url: base_url.into(),
        }
    }

    pub async fn execute(&self, request: DeployRequest) -> Result<DeployResponse, ApplicationError> {
        // 1. Validate request
        request.validate()?;

        // 2. Resolve the template
        let template = self
            .store
            .get_template(&request.template_id)
            .await?
            .ok_or_else(|| ApplicationError::TemplateNotFound(request.template_id.clone()))?;

        // 3. Register the server
        let server_id = Uuid::new_v4().to_string();
        let record = ServerRecord {
            id: server_id.clone(),
            template_id: template.id.clone(),
            owner_id: request.user_id.clone(),
            name: request.name.trim().to_string(),
            description: request.description.clone(),
            status: ServerStatus::Created,
            url: None,
            created_at: Utc::now(),
        };
        self.store.create_server(&record).await?;

        // 4. Mark it deployed
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), server_id);
        self.store
            .update_server_status(&server_id, ServerStatus::Deployed, Some(&url))
            .await?;

        info!(server_id = %server_id, template_id = %template.id, url = %url, "Server deployed");

        Ok(DeployResponse {
            success: true,
            server_id,
            template_id: template.id,
            status: ServerStatus::Deployed,
            url,
            message: format!("Server '{}' deployed from template '{}'", record.name, template.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::TemplateRecord;
    use crate::infrastructure::store::SqliteRecordStore;
    use tempfile::TempDir;

    async fn store_with_template(temp: &TempDir) -> Arc<SqliteRecordStore> {
        let store = SqliteRecordStore::open(temp.path().join("records.db"))
            .await
            .unwrap();
        let now = Utc::now();
        store
            .upsert_template(&TemplateRecord {
                id: "tpl-1".to_string(),
                name: "weather-mcp".to_string(),
                description: "Forecast tools".to_string(),
                owner_id: "user-1".to_string(),
                directory: "/tmp/tpl-1".to_string(),
                file_count: 3,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        Arc::new(store)
    }

    fn request(template_id: &str) -> DeployRequest {
        DeployRequest {
            template_id: template_id.to_string(),
            name: "weather".to_string(),
            description: Some("prod".to_string()),
            user_id: "user-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_deploy_marks_server_deployed() {
        let temp = TempDir::new().unwrap();
        let store = store_with_template(&temp).await;
        let use_case = DeployServerUseCase::new(store.clone(), "https://mcp.example.com/");

        let response = use_case.execute(request("tpl-1")).await.unwrap();

        assert!(response.success);
        assert_eq!(response.status, ServerStatus::Deployed);
        assert_eq!(
            response.url,
            format!("https://mcp.example.com/{}", response.server_id)
        );

        let server = store.get_server(&response.server_id).await.unwrap().unwrap();
        assert_eq!(server.status, ServerStatus::Deployed);
        assert_eq!(server.url.as_deref(), Some(response.url.as_str()));
        assert_eq!(server.template_id, "tpl-1");
    }

    #[tokio::test]
    async fn test_deploy_unknown_template() {
        let temp = TempDir::new().unwrap();
        let store = store_with_template(&temp).await;
        let use_case = DeployServerUseCase::new(store, "https://mcp.example.com");

        let result = use_case.execute(request("missing")).await;
        assert!(matches!(result, Err(ApplicationError::TemplateNotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_deploy_rejects_empty_name() {
        let temp = TempDir::new().unwrap();
        let store = store_with_template(&temp).await;
        let use_case = DeployServerUseCase::new(store, "https://mcp.example.com");

        let mut unnamed = request("tpl-1");
        unnamed.name = "  ".to_string();
        assert!(matches!(
            use_case.execute(unnamed).await,
            Err(ApplicationError::ValidationError(_))
        ));
    }
}
