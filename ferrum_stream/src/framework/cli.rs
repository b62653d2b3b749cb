use crate::config::stream_config::StreamConfig;
use crate::core::engine::{Engine, RunSummary};
use crate::core::registry::{JobRegistry, Mode};
use crate::framework::errors::Result;
use anyhow::Context as _;
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::fmt::format::FmtSpan;

/// Run one map or reduce job over stdin/stdout, reporting counters and
/// status on stderr.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// `map` or `reduce`
    #[arg(long)]
    pub mode: Mode,

    /// Registered job name, e.g. WordCountMapper
    #[arg(long = "type")]
    pub job_type: String,

    #[arg(long)]
    pub package: Option<String>,

    /// XML runtime configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overrides `log.level` from the configuration
    #[arg(long)]
    pub log_level: Option<String>,
}

impl Cli {
    pub fn load_config(&self) -> Result<StreamConfig> {
        let mut config = match &self.config {
            Some(path) => StreamConfig::from_xml_file(&path.to_string_lossy())?,
            None => StreamConfig::default(),
        };
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        Ok(config)
    }
}

/// Installs the stderr log subscriber. Log lines never start with the
/// `reporter:` marker, so they share the side channel safely.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(level: tracing::Level) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("cannot install log subscriber: {}", err))
}

/// Parses the process arguments and runs the selected job.
pub fn run(registry: &JobRegistry) -> anyhow::Result<RunSummary> {
    run_with(registry, Cli::parse())
}

pub fn run_with(registry: &JobRegistry, cli: Cli) -> anyhow::Result<RunSummary> {
    let config = cli.load_config()?;
    init_logging(config.tracing_level()?)?;

    info!(
        time = %Local::now().format("%Y-%m-%d %H:%M:%S"),
        mode = %cli.mode,
        job = %cli.job_type,
        package = ?cli.package,
        "starting streaming job"
    );

    let engine = Engine::from_config(config);
    let summary = registry
        .run_stdio(cli.mode, &cli.job_type, &engine)
        .with_context(|| format!("{} job '{}' failed", cli.mode, cli.job_type))?;
    Ok(summary)
}
