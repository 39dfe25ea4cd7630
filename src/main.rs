use std::path::PathBuf;

use anyhow::{bail, Context};
use apq_chain::{ChainConfig, GraphQLClient, Operation};
use clap::Parser;
use log::info;

#[derive(Parser, Debug)]
#[command(name = "apq-chain")]
#[command(about = "Run a GraphQL operation using automatic persisted queries")]
#[command(long_about = r#"
Run a GraphQL operation using automatic persisted queries.

The first attempt sends only the SHA-256 hash of the query. If the server
does not recognise it, the query is resent once with the full document.

Examples:
  apq-chain --endpoint http://localhost:4000/graphql --query '{ hero { name } }'

  apq-chain --query-file hero.graphql --variables '{"episode": "JEDI"}' --get
"#)]
struct CliArgs {
    #[arg(long)]
    endpoint: Option<String>,

    #[arg(long, conflicts_with = "query_file")]
    query: Option<String>,

    #[arg(long)]
    query_file: Option<PathBuf>,

    /// Variables as a JSON object
    #[arg(long)]
    variables: Option<String>,

    #[arg(long)]
    operation_name: Option<String>,

    /// Always send the full document
    #[arg(long, default_value_t = false)]
    no_apq: bool,

    /// Send hash-only attempts as GET
    #[arg(long, default_value_t = false)]
    get: bool,

    #[arg(long)]
    max_retries: Option<u32>,

    #[arg(long)]
    timeout_secs: Option<u64>,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = "info", value_parser = ["debug", "info", "warn", "error"])]
    log_level: String,
}

impl CliArgs {
    fn to_config(&self) -> anyhow::Result<ChainConfig> {
        let mut config = match &self.config {
            Some(path) => ChainConfig::from_file(path)?,
            None => ChainConfig::default(),
        };
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if self.no_apq {
            config.auto_persist_queries = false;
        }
        if self.get {
            config.use_get_for_persisted_queries = true;
        }
        if let Some(max_retries) = self.max_retries {
            config.max_retries = max_retries;
        }
        if let Some(timeout_secs) = self.timeout_secs {
            config.request_timeout_secs = timeout_secs;
        }
        Ok(config)
    }

    fn to_operation(&self) -> anyhow::Result<Operation> {
        let document = match (&self.query, &self.query_file) {
            (Some(query), _) => query.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read query file {}", path.display()))?,
            (None, None) => bail!("Either --query or --query-file is required"),
        };

        let mut operation = Operation::new(document);
        if let Some(name) = &self.operation_name {
            operation = operation.with_name(name.clone());
        }
        if let Some(variables) = &self.variables {
            let variables: serde_json::Value =
                serde_json::from_str(variables).context("--variables must be valid JSON")?;
            if !variables.is_object() {
                bail!("--variables must be a JSON object");
            }
            operation = operation.with_variables(variables);
        }
        Ok(operation)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let config = args.to_config()?;
    let operation = args.to_operation()?;
    info!(
        "Sending operation {} to {} (persisted queries: {})",
        operation.document_hash(),
        config.endpoint,
        config.auto_persist_queries
    );

    let client = GraphQLClient::new(config)?;
    let result = client.fetch(operation).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
