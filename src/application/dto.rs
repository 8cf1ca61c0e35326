//! Data transfer objects for the application layer

use crate::application::{ServerStatus, ValidationError};
use serde::{Deserialize, Serialize};

/// Envelope returned for every generation run that got past validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Always true: failures after validation are reported in `error_details`
    pub success: bool,
    pub template_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_session_id: Option<String>,
    /// Files present in the template directory, relative to it
    pub files: Vec<String>,
    pub template_path: String,
}

/// Request for deploying a server from a stored template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployRequest {
    pub template_id: String,
    pub name: String,
    pub description: Option<String>,
    pub user_id: String,
}

impl DeployRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.template_id.trim().is_empty() {
            return Err(ValidationError::MissingField("template_id".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyServerName);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployResponse {
    pub success: bool,
    pub server_id: String,
    pub template_id: String,
    pub status: ServerStatus,
    pub url: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deploy_request() -> DeployRequest {
        DeployRequest {
            template_id: "tpl-1".to_string(),
            name: "weather".to_string(),
            description: None,
            user_id: "user-1".to_string(),
        }
    }

    #[test]
    fn test_deploy_request_validation() {
        assert!(deploy_request().validate().is_ok());

        let mut missing_template = deploy_request();
        missing_template.template_id = " ".to_string();
        assert!(matches!(
            missing_template.validate(),
            Err(ValidationError::MissingField(_))
        ));

        let mut unnamed = deploy_request();
        unnamed.name = String::new();
        assert!(matches!(
            unnamed.validate(),
            Err(ValidationError::EmptyServerName)
        ));
    }

    #[test]
    fn test_generate_response_omits_absent_fields() {
        let response = GenerateResponse {
            success: true,
            template_id: "tpl".to_string(),
            server_id: None,
            message: "ok".to_string(),
            error_details: None,
            chat_session_id: None,
            files: vec!["main.py".to_string()],
            template_path: "/tmp/tpl".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error_details").is_none());
        assert!(json.get("server_id").is_none());
    }
}
