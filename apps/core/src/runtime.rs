use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::{self, ConfigError};
use crate::contract::{self, SearchRequest, SearchResponse};
use crate::core_service::{OmnisearchService, ServiceError};
use crate::input_controller::{self, InputEvent, Renderer};
use crate::model::SearchResult;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid command line: {0}")]
    Usage(#[from] clap::Error),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("logging setup failed: {0}")]
    Logging(#[source] std::io::Error),
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Parser)]
#[command(name = "omnisearch-core", about = "Incremental search over navigation targets and remote entities")]
pub struct CliOptions {
    /// Path to config.toml (defaults to the per-user data directory)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// GraphQL endpoint, overriding the config file
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Run one round for this text and print the JSON response
    #[arg(long)]
    pub query: Option<String>,

    /// Write the effective config to disk if no file exists yet
    #[arg(long)]
    pub write_config: bool,
}

/// Parses the process arguments and runs.
pub fn run() -> Result<(), RuntimeError> {
    let options = CliOptions::try_parse()?;
    run_with_options(options)
}

pub fn run_with_options(options: CliOptions) -> Result<(), RuntimeError> {
    let _logging = crate::logging::init().map_err(RuntimeError::Logging)?;

    let mut cfg = config::load(options.config.as_deref())?;
    if let Some(endpoint) = options.endpoint {
        cfg.endpoint = endpoint;
        config::validate(&cfg)?;
    }
    if options.write_config && !cfg.config_path.exists() {
        config::save(&cfg)?;
        info!(path = %cfg.config_path.display(), "wrote default config");
    }
    info!(
        endpoint = %cfg.endpoint,
        debounce_ms = cfg.debounce_ms,
        max_displayed = cfg.max_displayed,
        "omnisearch starting"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let service = Arc::new(OmnisearchService::new(&cfg)?);
        match options.query {
            Some(query) => {
                let response = contract::handle_request(&service, SearchRequest { query }).await;
                println!("{}", contract::encode(&response));
            }
            None => run_interactive(service, Duration::from_millis(cfg.debounce_ms)).await,
        }
        Ok::<(), RuntimeError>(())
    })
}

/// Feeds stdin lines to the input controller. Lines starting with `:` are
/// commands (`:open`, `:close`, `:up`, `:down`, `:enter`); anything else is
/// the new input text.
async fn run_interactive(service: Arc<OmnisearchService>, quiescence: Duration) {
    let (events_tx, events_rx) = mpsc::channel(64);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if events_tx.send(parse_input_line(&line)).await.is_err() {
                break;
            }
        }
    });

    let mut renderer = JsonLineRenderer;
    input_controller::run(service, quiescence, events_rx, &mut renderer).await;
}

pub fn parse_input_line(line: &str) -> InputEvent {
    match line.trim_end_matches(['\r', '\n']) {
        ":open" => InputEvent::Open,
        ":close" => InputEvent::Close,
        ":up" => InputEvent::MoveSelection(-1),
        ":down" => InputEvent::MoveSelection(1),
        ":enter" => InputEvent::Activate,
        text => InputEvent::Text(text.to_string()),
    }
}

struct JsonLineRenderer;

impl Renderer for JsonLineRenderer {
    fn render(&mut self, results: &[SearchResult]) {
        let response = contract::TransportResponse::Ok {
            response: SearchResponse::from_results(results),
        };
        println!("{}", contract::encode(&response));
    }

    fn navigate(&mut self, destination: &str) {
        println!("{}", serde_json::json!({ "navigate": destination }));
    }
}
