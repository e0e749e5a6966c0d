//! surveykit-export: run one survey report export and print the invocation response.
//!
//! Exit codes:
//!   0 - Response status below 500
//!   1 - Export failed, or the event could not be read

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde_json::{Value, json};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use surveykit_export::{
    ExportConfig, ExportError, InvocationResponse, S3ReportStore, handle_invocation,
};

#[derive(Debug, Parser)]
#[command(name = "surveykit-export", version, about = "Export survey analysis records to an XLSX report")]
struct Args {
    /// Invocation event JSON file; `-` or omitted reads stdin.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["workspace", "survey"])]
    event: Option<PathBuf>,

    /// Workspace name (shorthand for a flat event).
    #[arg(long, requires = "survey")]
    workspace: Option<String>,

    /// Survey name (shorthand for a flat event).
    #[arg(long, requires = "workspace")]
    survey: Option<String>,

    /// TOML config file used in place of `surveykit.toml`.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Args {
    fn read_event(&self) -> Result<Value> {
        if let (Some(workspace), Some(survey)) = (&self.workspace, &self.survey) {
            return Ok(json!({"workspace_name": workspace, "survey_name": survey}));
        }

        let c_raw = match self.event.as_deref() {
            Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read event file {}", path.display()))?,
            _ => {
                let mut c_buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut c_buf)
                    .context("failed to read event from stdin")?;
                c_buf
            }
        };
        serde_json::from_str(&c_raw).context("event is not valid JSON")
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing subscriber: {err}"))
}

async fn run(args: &Args) -> Result<InvocationResponse> {
    let event = args.read_event()?;
    debug!(%event, "received event");

    let config = match ExportConfig::load_from(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return Ok(InvocationResponse::failure(&ExportError::from(err))),
    };
    let store = match S3ReportStore::from_config(&config) {
        Ok(store) => store,
        Err(err) => return Ok(InvocationResponse::failure(&ExportError::from(err))),
    };

    Ok(handle_invocation(&store, &config, &event, Utc::now().naive_utc()).await)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging()?;

    let response = match run(&args).await {
        Ok(response) => response,
        Err(err) => {
            error!("{err:#}");
            std::process::exit(1);
        }
    };

    let c_output = serde_json::to_string_pretty(&response).context("failed to encode response")?;
    println!("{c_output}");

    if response.status_code >= 500 {
        std::process::exit(1);
    }
    Ok(())
}
