//! Prompt templates for the plan-then-code workflow

use serde::Serialize;
use tera::{Context, Tera};

const PLANNING_TEMPLATE: &str = r#"You are an expert planning agent that analyzes API documentation to design MCP (Model Context Protocol) servers.

USER REQUEST: {{ instruction }}

API DOCUMENTATION:

{{ documentation }}
{% if credential_keys %}
The user supplied credentials for: {{ credential_keys | join(sep=", ") }}. Read them from environment variables; never hard-code values.
{% endif %}
Your task is to:
1. Analyze the documentation
2. Identify the endpoints worth exposing as MCP tools
3. Plan an MCP server built on the FastMCP framework
4. Break the implementation into clear steps

Return a JSON object with this structure:
{
  "service_name": "Name of the MCP service",
  "description": "Description of the service",
  "tools": [
    {
      "name": "tool_name",
      "description": "Tool description",
      "parameters": [{"name": "param", "type": "str", "description": "..."}],
      "returns": "What the tool returns",
      "endpoint": "API endpoint to call",
      "method": "HTTP method"
    }
  ],
  "auth_requirements": {"type": "API key, OAuth, ...", "credentials": ["..."]},
  "dependencies": ["Python packages"]
}
"#;

const CODING_TEMPLATE: &str = r#"You are an expert coding agent that implements MCP (Model Context Protocol) servers with FastMCP.

USER REQUEST: {{ instruction }}

IMPLEMENTATION PLAN:
{{ plan }}
{% if credential_keys %}
Credentials are provided through these environment variables: {{ credential_keys | join(sep=", ") }}.
{% endif %}
Generate complete, working code for the server. It must use FastMCP, handle errors, carry type annotations and be documented.

Produce these files:
1. main.py - the MCP server, ending with `if __name__ == "__main__": mcp.run(transport="stdio")`
2. requirements.txt - pinned dependencies
3. .env.example - example environment variables
4. README.md - setup and usage

Return only a JSON object with this structure:
{
  "files": [
    {"name": "main.py", "content": "..."},
    {"name": "requirements.txt", "content": "..."},
    {"name": ".env.example", "content": "..."},
    {"name": "README.md", "content": "..."}
  ]
}
"#;

#[derive(Debug, Serialize)]
pub struct PlanningPrompt<'a> {
    pub instruction: &'a str,
    pub documentation: &'a str,
    pub credential_keys: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct CodingPrompt<'a> {
    pub instruction: &'a str,
    pub plan: &'a str,
    pub credential_keys: Vec<&'a str>,
}

/// Renders the workflow prompts
pub struct PromptRenderer {
    tera: Tera,
}

impl PromptRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("planning", PLANNING_TEMPLATE),
            ("coding", CODING_TEMPLATE),
        ])?;
        // Prompts are plain text
        tera.autoescape_on(vec![]);
        Ok(Self { tera })
    }

    pub fn planning(&self, prompt: &PlanningPrompt<'_>) -> Result<String, tera::Error> {
        self.tera.render("planning", &Context::from_serialize(prompt)?)
    }

    pub fn coding(&self, prompt: &CodingPrompt<'_>) -> Result<String, tera::Error> {
        self.tera.render("coding", &Context::from_serialize(prompt)?)
    }
}
