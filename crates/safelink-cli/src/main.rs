use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use config::{Config, Environment, File};
use safelink_core::{
    assess_with_config, normalize_url, render_report, BackendSettings, FixtureBackend,
    HttpBackend, OutputFormat, Phase, ReportView, RiskConfig, ScanBackend, ScanRunner,
    ScanSession, ScoreBand, SignalBundle,
};
use serde::Deserialize;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "safelink",
    author,
    version,
    about = "Check a link before you click it"
)]
struct Cli {
    /// Optional configuration file (TOML, YAML or JSON)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Output format for reports
    #[arg(long, value_enum, default_value_t = Format::Human, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan a URL through the analysis backend
    Scan {
        /// URL or bare domain to scan
        url: String,
        /// Serve the signal bundle from a JSON file instead of the backend
        #[arg(long, value_name = "FILE")]
        fixture: Option<PathBuf>,
    },
    /// Assess a signal bundle read from a file or stdin
    Assess {
        /// Signal bundle JSON; reads stdin when omitted
        file: Option<PathBuf>,
    },
    /// Print the normalized form of a URL
    Normalize {
        /// Raw URL text
        text: String,
    },
    /// Check that the analysis backend is reachable
    Health,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Human,
    Json,
    Yaml,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Human => OutputFormat::Human,
            Format::Json => OutputFormat::Json,
            Format::Yaml => OutputFormat::Yaml,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AppConfig {
    backend: BackendSettings,
    risk: RiskConfig,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let format = OutputFormat::from(cli.format);
    match cli.command {
        Commands::Normalize { text } => normalize(&text)?,
        Commands::Scan { url, fixture } => {
            let app = load_config(cli.config.as_deref())?;
            scan(app, &url, fixture, format).await?
        }
        Commands::Assess { file } => {
            let app = load_config(cli.config.as_deref())?;
            assess_bundle(&app.risk, file.as_deref(), format).await?
        }
        Commands::Health => {
            let app = load_config(cli.config.as_deref())?;
            health(&app.backend).await?
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let env_backend = BackendSettings::from_env()?;
    let mut builder = Config::builder()
        .set_default("backend.api_url", env_backend.api_url)?
        .set_default("backend.timeout", env_backend.timeout)?
        .set_default("backend.max_retries", i64::from(env_backend.max_retries))?;
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }
    let app: AppConfig = builder
        .add_source(Environment::with_prefix("SAFELINK").separator("__"))
        .build()
        .context("failed to load configuration")?
        .try_deserialize()
        .context("invalid configuration")?;
    app.backend.timeout_duration()?;
    debug!(api_url = %app.backend.api_url, "configuration loaded");
    Ok(app)
}

fn normalize(text: &str) -> Result<()> {
    let url = normalize_url(text)?;
    println!("{url}");
    Ok(())
}

async fn scan(
    app: AppConfig,
    url: &str,
    fixture: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let backend: Arc<dyn ScanBackend> = match fixture {
        Some(path) => {
            info!(fixture = %path.display(), "using fixture backend");
            Arc::new(FixtureBackend::new(path))
        }
        None => Arc::new(HttpBackend::new(&app.backend)?),
    };
    let mut runner = ScanRunner::new(backend, ScanSession::with_config(app.risk));
    runner.submit(url);
    let view = runner.run_until_settled().await.view();

    if let Some(error) = view.input_error {
        bail!(error);
    }
    match (view.phase, view.report) {
        (Phase::Ready, Some(report)) => print_report(&report, format),
        (Phase::Failed, _) => bail!(view.error.unwrap_or_else(|| "Scan failed".into())),
        (phase, _) => bail!("scan ended unexpectedly in {phase:?} phase"),
    }
}

async fn assess_bundle(risk: &RiskConfig, file: Option<&Path>, format: OutputFormat) -> Result<()> {
    let raw = match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read signal bundle from stdin")?;
            buf
        }
    };
    let bundle = SignalBundle::from_json(&raw).context("invalid signal bundle")?;
    let assessment = assess_with_config(&bundle, risk);
    print_report(&ReportView::new(&bundle, &assessment, risk), format)
}

fn print_report(report: &ReportView, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Human {
        let banner = format!("● {}", report.tier_label);
        let banner = match report.band {
            ScoreBand::Safe => banner.green(),
            ScoreBand::Caution => banner.yellow(),
            ScoreBand::Danger => banner.red(),
            ScoreBand::Inactive => banner.dimmed(),
        };
        println!("{}", banner.bold());
    }
    print!("{}", render_report(report, format)?);
    Ok(())
}

async fn health(settings: &BackendSettings) -> Result<()> {
    println!("Checking backend {}", settings.api_url);
    let backend = HttpBackend::new(settings)?;
    match backend.health().await {
        Ok(()) => {
            println!("{}", "ok".green());
            Ok(())
        }
        Err(err) => {
            println!("{}", "unreachable".red());
            Err(err).context("backend health check failed")
        }
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tokio=warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
