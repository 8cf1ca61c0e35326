//! Integration tests for the docforge command line

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LLM_KEY_ENV: &str = "DOCFORGE_CLI_TEST_LLM_KEY";

fn docforge(workspace: &Path, config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("docforge").unwrap();
    cmd.arg("--config")
        .arg(config)
        .arg("--templates-dir")
        .arg(workspace.join("templates"))
        .arg("--database")
        .arg(workspace.join("records.db"));
    cmd
}

fn write_config(workspace: &Path, body: &str) -> std::path::PathBuf {
    let config = workspace.join("docforge.toml");
    std::fs::write(&config, body).unwrap();
    config
}

fn chat_reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("docforge")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("deploy"));
}

#[test]
fn test_generate_help_lists_options() {
    Command::cargo_bin("docforge")
        .unwrap()
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--doc-url"))
        .stdout(predicate::str::contains("--credential"))
        .stdout(predicate::str::contains("--template-id"));
}

#[test]
fn test_generate_requires_doc_url() {
    Command::cargo_bin("docforge")
        .unwrap()
        .args(["generate", "--message", "wrap the API"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--doc-url"));
}

#[test]
fn test_generate_rejects_malformed_credential() {
    Command::cargo_bin("docforge")
        .unwrap()
        .args([
            "generate",
            "--doc-url",
            "https://docs.example.com",
            "--message",
            "wrap the API",
            "--credential",
            "NO_EQUALS_SIGN",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn test_generate_without_llm_key_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        &format!("[llm]\napi_key_env = \"{LLM_KEY_ENV}\"\n"),
    );

    docforge(temp.path(), &config)
        .env_remove(LLM_KEY_ENV)
        .args([
            "generate",
            "--doc-url",
            "https://docs.example.com",
            "--message",
            "wrap the API",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to create LLM client"));
}

#[test]
fn test_missing_config_file_fails() {
    let temp = TempDir::new().unwrap();

    docforge(temp.path(), &temp.path().join("absent.toml"))
        .args(["deploy", "--template-id", "t-1", "--name", "srv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_deploy_unknown_template_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(temp.path(), "");

    docforge(temp.path(), &config)
        .args(["deploy", "--template-id", "missing", "--name", "srv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Template not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_generate_then_deploy() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("# Search\nGET /search?q="))
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("\"model\":\"planner\""))
        .respond_with(chat_reply(
            r#"{"service_name":"search-mcp","description":"Search tools"}"#,
        ))
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("\"model\":\"coder\""))
        .respond_with(chat_reply(
            r#"{"files":[{"name":"main.py","content":"import os\n"},{"name":"requirements.txt","content":"mcp\n"}]}"#,
        ))
        .mount(&upstream)
        .await;

    let temp = TempDir::new().unwrap();
    let config = write_config(
        temp.path(),
        &format!(
            "[fetch]\nreader_base_url = \"{uri}\"\napi_key_env = \"DOCFORGE_CLI_TEST_UNSET_READER_KEY\"\n\n\
             [llm]\nbase_url = \"{uri}\"\napi_key_env = \"{LLM_KEY_ENV}\"\n\
             planning_model = \"planner\"\ncoding_model = \"coder\"\n\n\
             [deployment]\nbase_url = \"https://mcp.example.com/\"\n",
            uri = upstream.uri()
        ),
    );
    let workspace = temp.path().to_path_buf();

    let generate = {
        let (workspace, config) = (workspace.clone(), config.clone());
        tokio::task::spawn_blocking(move || {
            docforge(&workspace, &config)
                .env(LLM_KEY_ENV, "test-key")
                .args([
                    "generate",
                    "--doc-url",
                    "https://docs.example.com/search",
                    "--message",
                    "Expose search as a tool",
                ])
                .output()
                .unwrap()
        })
        .await
        .unwrap()
    };
    assert!(
        generate.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&generate.stderr)
    );

    let response: Value = serde_json::from_slice(&generate.stdout).unwrap();
    assert_eq!(response["success"], true);
    assert!(response.get("error_details").is_none());
    assert_eq!(
        response["files"],
        json!(["debug_raw_response.txt", "main.py", "requirements.txt"])
    );
    let template_id = response["template_id"].as_str().unwrap().to_string();
    let main = workspace.join("templates").join(&template_id).join("main.py");
    assert_eq!(std::fs::read_to_string(main).unwrap(), "import os\n");

    let deploy = tokio::task::spawn_blocking(move || {
        docforge(&workspace, &config)
            .args(["deploy", "--template-id", template_id.as_str(), "--name", "search"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();
    assert!(deploy.status.success());

    let response: Value = serde_json::from_slice(&deploy.stdout).unwrap();
    assert_eq!(response["status"], "deployed");
    let server_id = response["server_id"].as_str().unwrap();
    assert_eq!(
        response["url"],
        format!("https://mcp.example.com/{server_id}")
    );
}
