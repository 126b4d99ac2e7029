//! # loadcheck CLI Entry Point
//!
//! Runs scenarios against the services and validates bodies offline.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use loadcheck::client::{ApiClient, ReqwestTransport};
use loadcheck::config::{parse_duration, HttpConfig, LoadProfile, ServiceEndpoints};
use loadcheck::contracts::{ContractValidator, SchemaStore};
use loadcheck::driver::WorkloadDriver;
use loadcheck::observability::init_tracing;
use loadcheck::report::{render_text, write_report};
use loadcheck::scenarios::{scenario_by_name, SCENARIO_NAMES};

/// Load and contract tests for the product and order services.
#[derive(Parser, Debug)]
#[command(name = "loadcheck", version, about)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario against the services.
    Run(RunArgs),
    /// Validate a JSON body against a schema definition.
    Validate(ValidateArgs),
    /// List the built-in scenarios.
    List,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Scenario name (see `loadcheck list`).
    scenario: String,

    /// Swagger document for the contract scenario; fetched from the order service when omitted.
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Report path; `.html`, `.json` or text by extension.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Override the profile with a constant number of VUs.
    #[arg(long)]
    vus: Option<u32>,

    /// Run length for `--vus`, e.g. `30s` or `1m30s`.
    #[arg(long, group = "duration_or_iterations", value_parser = parse_duration)]
    duration: Option<Duration>,

    /// Total iterations shared by `--vus`.
    #[arg(long, group = "duration_or_iterations")]
    iterations: Option<u64>,

    /// Per-request timeout in seconds.
    #[arg(long)]
    timeout: Option<f64>,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Swagger/OpenAPI document.
    #[arg(long)]
    spec: PathBuf,

    /// Definition name, e.g. `domain.Product` or `Product`.
    #[arg(long)]
    schema: String,

    /// JSON body to check.
    #[arg(long)]
    body: PathBuf,

    /// Treat the body as an array and validate every element.
    #[arg(long)]
    items: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Validate(args) => validate(&args),
        Commands::List => {
            for name in SCENARIO_NAMES {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let store = match &args.spec {
        Some(path) => Some(Arc::new(
            SchemaStore::from_path(path).with_context(|| format!("loading {}", path.display()))?,
        )),
        None => None,
    };
    let scenario = scenario_by_name(&args.scenario, store)?;

    let mut options = scenario.options();
    match (args.vus, args.duration, args.iterations) {
        (Some(vus), Some(duration), _) => options.profile = LoadProfile::fixed(vus, duration),
        (Some(vus), None, Some(iterations)) => {
            options.profile = LoadProfile::iterations(vus, iterations);
        }
        (Some(_), None, None) => bail!("--vus needs --duration or --iterations"),
        (None, Some(_), _) | (None, _, Some(_)) => bail!("--duration and --iterations need --vus"),
        (None, None, None) => {}
    }
    if let Some(report) = args.report {
        options.report_path = Some(report);
    }

    let mut http = HttpConfig::default();
    if let Some(timeout) = args.timeout {
        http.timeout_seconds = timeout;
    }
    let endpoints = ServiceEndpoints::from_env();
    tracing::info!(product = %endpoints.product, order = %endpoints.order, "Service endpoints");

    let transport = Arc::new(ReqwestTransport::new(&http)?);
    let driver = WorkloadDriver::new(ApiClient::new(transport, endpoints));

    let token = driver.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping run");
            token.cancel("interrupted");
        }
    });

    let summary = driver.run(scenario, &options).await?;
    print!("{}", render_text(&summary));

    if let Some(path) = &options.report_path {
        write_report(&summary, path).with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(if summary.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn validate(args: &ValidateArgs) -> anyhow::Result<ExitCode> {
    let store = SchemaStore::from_path(&args.spec)
        .with_context(|| format!("loading {}", args.spec.display()))?;
    let text = std::fs::read_to_string(&args.body)
        .with_context(|| format!("reading {}", args.body.display()))?;
    let body: Value = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.body.display()))?;

    let validator = ContractValidator::new(&store);
    let result = if args.items {
        validator.validate_items(&body, &args.schema)
    } else {
        validator.validate(&body, &args.schema)
    };

    println!("{result}");
    Ok(if result.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}
