use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use pulse_ingest::{DatasetKind, RawExports};
use pulse_metrics::{DashboardData, month_number, process_exports};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tokio::task::JoinSet;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt};

mod config;
mod render;

use config::{Config, OutputFormat, load_config};
use render::{ChartKind, render_text, write_chart_csv};

#[derive(Parser, Debug)]
#[command(name = "pulse", version, about = "Monthly studio KPIs from sales exports")]
struct Cli {
    /// Config file (default: ~/.pulse/pulse.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct PeriodArgs {
    /// Month name ("September") or zero-based index (0-11)
    #[arg(long)]
    month: String,

    #[arg(long)]
    year: i32,

    /// Directory holding the six exports
    #[arg(long)]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute KPIs, scorecard, charts and summary for one month
    Dashboard {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output format (default from config)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Export one thirteen-month chart series as CSV
    Chart {
        #[arg(value_enum)]
        kind: ChartKind,

        #[command(flatten)]
        period: PeriodArgs,

        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Manage ~/.pulse/pulse.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config_override = cli.config.as_deref();

    match cli.command {
        Command::Dashboard { period, format } => {
            let cfg = load_config(config_override)?;
            let data = run_pipeline(&cfg, &period).await?;
            match format.unwrap_or(cfg.output.format) {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&data).context("serialize dashboard")?;
                    println!("{json}");
                }
                OutputFormat::Text => print!("{}", render_text(&data)),
            }
        }

        Command::Chart { kind, period, out } => {
            let cfg = load_config(config_override)?;
            let data = run_pipeline(&cfg, &period).await?;
            match out {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("create {}", path.display()))?;
                    write_chart_csv(&data.charts, kind, file)?;
                    info!(path = %path.display(), "wrote chart series");
                }
                None => write_chart_csv(&data.charts, kind, io::stdout().lock())?,
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(config_override)?,
            ConfigCommand::Show => {
                let cfg = load_config(config_override)?;
                let path = config::config_path(config_override)?;
                println!("# {}", path.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

/// Accepts a full English month name or a 0-11 index.
fn parse_month(arg: &str) -> Result<u32> {
    if let Some(m) = month_number(arg.trim()) {
        return Ok(m);
    }
    match arg.trim().parse::<u32>() {
        Ok(m) if m < 12 => Ok(m),
        _ => bail!("unknown month {arg:?} (use a name like September or 0-11)"),
    }
}

async fn run_pipeline(cfg: &Config, period: &PeriodArgs) -> Result<DashboardData> {
    let month = parse_month(&period.month)?;
    if let Some(dir) = &period.dir {
        if !dir.is_dir() {
            bail!("export directory not found: {}", dir.display());
        }
    }

    let raw = read_exports(&cfg.exports.paths(period.dir.as_deref())).await?;
    let data = process_exports(&raw, month, period.year)
        .with_context(|| format!("computing dashboard for {} {}", period.month, period.year))?;
    Ok(data)
}

/// Read every export concurrently. A file that does not exist is left
/// absent so the pipeline reports it by name.
async fn read_exports(paths: &[(DatasetKind, PathBuf)]) -> Result<RawExports> {
    let mut reads = JoinSet::new();
    for (kind, path) in paths.iter().cloned() {
        reads.spawn(read_optional(kind, path));
    }

    let mut raw = RawExports::new();
    while let Some(joined) = reads.join_next().await {
        if let (kind, Some(text)) = joined.context("export read task failed")?? {
            raw.set(kind, text);
        }
    }
    Ok(raw)
}

async fn read_optional(kind: DatasetKind, path: PathBuf) -> Result<(DatasetKind, Option<String>)> {
    match tokio::fs::read_to_string(&path).await {
        Ok(text) => {
            debug!(
                dataset = kind.display_name(),
                path = %path.display(),
                bytes = text.len(),
                "read export"
            );
            Ok((kind, Some(text)))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dataset = kind.display_name(), path = %path.display(), "export not found");
            Ok((kind, None))
        }
        Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
    }
}
