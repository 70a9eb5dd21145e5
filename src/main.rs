use anyhow::Result;
use clap::{Parser, Subcommand};
use kpi_rca::config::{Config, RuntimeConfig};
use kpi_rca::http::{AppState, start_http_server};
use kpi_rca::intent::extract_intent;
use kpi_rca::rca::{SiteReading, summarize};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// KPI analytics and root cause analysis backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Analyze a single site reading and print the result as JSON
    Analyze {
        #[arg(long)]
        kpi: String,
        #[arg(long, allow_hyphen_values = true)]
        value: f64,
        #[arg(long)]
        id: Option<String>,
        /// Caller-side severity hint echoed in the result
        #[arg(long, allow_hyphen_values = true)]
        severity_hint: Option<f64>,
    },
    /// Print a fleet summary for the given site ids
    Summary { site_ids: Vec<String> },
    /// Answer an operator prompt from the configured KPI source
    Prompt { text: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(RuntimeConfig::load_from_env().log_level))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let state = AppState::from_config(&config)?;
            info!(
                "Starting kpi-rca: {} KPI rules, {} KPI source",
                state.engine.catalog().len(),
                state.kpi.source_name()
            );
            start_http_server(&config, state).await?;
        }
        Command::Analyze {
            kpi,
            value,
            id,
            severity_hint,
        } => {
            if !value.is_finite() {
                anyhow::bail!("--value must be a finite number");
            }
            let mut reading = SiteReading::new(kpi, value);
            if let Some(id) = id {
                reading = reading.with_id(id);
            }
            if let Some(hint) = severity_hint {
                reading = reading.with_severity_hint(hint);
            }
            let state = AppState::from_config(&config)?;
            let result = state.engine.analyze(&reading);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Summary { site_ids } => {
            println!("{}", serde_json::to_string_pretty(&summarize(&site_ids))?);
        }
        Command::Prompt { text } => {
            let state = AppState::from_config(&config)?;
            let intent = extract_intent(&text.join(" "));
            let response = state.kpi.query(&intent)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
