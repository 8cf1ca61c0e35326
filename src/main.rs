//! docforge CLI entrypoint
//! Parses command-line arguments, wires the pipeline together and prints the response envelope.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use docforge::application::{DeployServerUseCase, RecordStore};
use docforge::documentation::DocumentationAggregator;
use docforge::generation::{TemplatePersister, WorkflowInvoker};
use docforge::infrastructure::llm::ChatCompletionClient;
use docforge::infrastructure::{
    FileSystemOutputService, PlanAndCodeSettings, PlanAndCodeWorkflow, ReaderDocumentationFetcher,
    SqliteRecordStore,
};
use docforge::{
    ApiCredentials, Config, DeployRequest, Error, GenerateTemplateUseCase, GenerationRequest,
};
use std::path::PathBuf;
use std::sync::Arc;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Root directory for generated templates
    #[arg(long, global = true)]
    templates_dir: Option<PathBuf>,
    /// SQLite database for template, server and chat-session records
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate an MCP server template from API documentation
    Generate {
        /// Documentation page to include (repeatable, order is kept)
        #[arg(long = "doc-url", required = true)]
        doc_urls: Vec<String>,
        /// What the generated server should do
        #[arg(long)]
        message: String,
        /// Credential for the target API as KEY=VALUE (repeatable)
        #[arg(long = "credential", value_parser = parse_credential)]
        credentials: Vec<(String, String)>,
        /// Existing template to overwrite
        #[arg(long)]
        template_id: Option<String>,
        /// Existing server to associate with the run
        #[arg(long)]
        server_id: Option<String>,
        /// Chat session to append the response to
        #[arg(long)]
        session_id: Option<String>,
        /// Requesting user
        #[arg(long, default_value = "local")]
        user_id: String,
    },
    /// Register a server for a generated template
    Deploy {
        /// Template to deploy
        #[arg(long)]
        template_id: String,
        /// Server name
        #[arg(long)]
        name: String,
        /// Server description
        #[arg(long)]
        description: Option<String>,
        /// Requesting user
        #[arg(long, default_value = "local")]
        user_id: String,
    },
}

fn parse_credential(pair: &str) -> Result<(String, String), String> {
    ApiCredentials::parse_pair(pair).ok_or_else(|| format!("expected KEY=VALUE, got '{pair}'"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the JSON response
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting docforge");
    let config = load_config(&cli).context("Failed to load configuration")?;
    let store: Arc<dyn RecordStore> = Arc::new(
        open_store(&config)
            .await
            .context("Failed to open record store")?,
    );

    match cli.command {
        Commands::Generate {
            doc_urls,
            message,
            credentials,
            template_id,
            server_id,
            session_id,
            user_id,
        } => {
            let mut request = GenerationRequest::new(user_id, message, doc_urls)
                .with_credentials(credentials.into_iter().collect());
            if let Some(id) = template_id {
                request = request.with_template_id(id);
            }
            if let Some(id) = server_id {
                request = request.with_server_id(id);
            }
            if let Some(id) = session_id {
                request = request.with_chat_session_id(id);
            }

            let use_case = build_generate_use_case(&config, store)?;
            let response = use_case.execute(request).await?;
            print_json(&response)?;
        }
        Commands::Deploy {
            template_id,
            name,
            description,
            user_id,
        } => {
            let use_case = DeployServerUseCase::new(store, config.deployment.base_url.clone());
            let response = use_case
                .execute(DeployRequest {
                    template_id,
                    name,
                    description,
                    user_id,
                })
                .await?;
            print_json(&response)?;
        }
    }
    Ok(())
}

/// Config file values with CLI overrides applied
fn load_config(cli: &Cli) -> docforge::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.templates_dir {
        if dir.is_file() {
            return Err(Error::config(format!(
                "templates directory {} is a file",
                dir.display()
            )));
        }
        config.paths.templates_root = dir.clone();
    }
    if let Some(database) = &cli.database {
        config.paths.database = database.clone();
    }
    Ok(config)
}

async fn open_store(config: &Config) -> docforge::Result<SqliteRecordStore> {
    Ok(SqliteRecordStore::open(&config.paths.database).await?)
}

fn build_generate_use_case(
    config: &Config,
    store: Arc<dyn RecordStore>,
) -> anyhow::Result<GenerateTemplateUseCase> {
    let fetcher = ReaderDocumentationFetcher::from_config(&config.fetch)
        .context("Failed to create documentation fetcher")?;
    let client = ChatCompletionClient::from_config(&config.llm)
        .context("Failed to create LLM client")?;
    let workflow = PlanAndCodeWorkflow::new(
        Arc::new(client),
        PlanAndCodeSettings::from(&config.llm),
    )
    .context("Failed to prepare generation workflow")?;

    let aggregator =
        DocumentationAggregator::new(Arc::new(fetcher)).with_concurrency(config.fetch.concurrency);
    let persister = TemplatePersister::new(
        config.paths.templates_root.clone(),
        Arc::new(FileSystemOutputService::new()),
    )
    .with_save_timeout(config.persistence.save_timeout());

    Ok(GenerateTemplateUseCase::new(
        aggregator,
        WorkflowInvoker::new(Arc::new(workflow)),
        persister,
        store,
    ))
}

fn print_json<T: Serialize>(value: &T) -> docforge::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
