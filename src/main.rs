use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod align;
mod config;
mod error;
mod model;
mod plot;
mod render;
mod run;
mod trace;

use config::Config;
use plot::PlotBook;
use run::Run;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "trace-run-viz")]
#[command(about = "Thermal and power trace run visualizer", long_about = None)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

/// Where the run lives and how to present it.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Run directory holding thermal.txt, thermal_governor.txt,
    /// pid_controller.txt, in_power.txt and out_power.txt.
    #[arg(long)]
    pub run: PathBuf,

    /// TOML config file (actor labels, plot defaults).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Label an actor, e.g. --actor 00000000,0000000f=little. Repeatable.
    #[arg(long = "actor", value_name = "ID=LABEL", value_parser = parse_actor)]
    pub actors: Vec<(String, String)>,

    /// Time origin; defaults to the earliest event in the run.
    #[arg(long)]
    pub basetime: Option<f64>,

    /// Prefix for every figure title.
    #[arg(long)]
    pub title: Option<String>,

    /// Figure width in inches.
    #[arg(long)]
    pub width: Option<f64>,

    /// Figure height in inches.
    #[arg(long)]
    pub height: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an HTML report with power histograms and in/out frequency plots.
    Report {
        #[command(flatten)]
        run: RunArgs,

        #[arg(short = 'o', long)]
        out: PathBuf,
    },

    /// Dump the aligned in/out frequency tables as JSON.
    Freqs {
        #[command(flatten)]
        run: RunArgs,

        /// Output file; stdout when omitted.
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },

    /// Write a starter config file.
    InitConfig {
        #[arg(long, default_value = config::DEFAULT_CONFIG_FILE)]
        path: PathBuf,
    },
}

fn parse_actor(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((id, label)) if !id.is_empty() && !label.is_empty() => {
            Ok((id.to_string(), label.to_string()))
        }
        _ => Err(format!("expected ID=LABEL, got {:?}", s)),
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Load the run, apply config and CLI overrides, normalize its time base.
fn open_run(args: &RunArgs) -> Result<(Run, Config, f64)> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.merge_with_args(args);
    debug!("effective config: {:?}", config);

    let mut run = Run::open(&args.run)
        .with_context(|| format!("open run directory {}", args.run.display()))?;

    let basetime = config
        .run
        .basetime
        .or_else(|| run.earliest_time())
        .unwrap_or(0.0);
    run.normalize_time(basetime);

    info!(
        "loaded run {} ({} actors labelled, basetime {})",
        args.run.display(),
        config.actors.len(),
        basetime
    );
    Ok((run, config, basetime))
}

fn write_report(args: &RunArgs, out: &Path) -> Result<()> {
    let (run, config, basetime) = open_run(args)?;
    if config.actors.is_empty() {
        warn!(
            "no actors labelled (use --actor or [actors] in the config); \
             no figures will be produced"
        );
    }

    // 1) Describe figures.
    let mut book = PlotBook::new();
    run.plot_power_hists(&config.actors, &config.plot.title, &mut book);
    run.plot_allfreqs(
        &config.actors,
        &config.plot.title,
        config.plot.width,
        config.plot.height,
        &mut book,
    )?;
    info!("recorded {} figures", book.figures().len());

    // 2) Aggregate.
    let data = model::build_report_data(&run, &config, basetime, book.into_figures());

    // 3) Render HTML.
    let html = render::render_html_report(&data)?;
    std::fs::write(out, html).with_context(|| format!("write report {}", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(())
}

fn write_freqs(args: &RunArgs, out: Option<&Path>) -> Result<()> {
    let (run, config, _) = open_run(args)?;

    let tables = run.get_all_freqs_data(&config.actors)?;
    let json = serde_json::to_string_pretty(&tables)?;

    match out {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!(
            "{} already exists; remove it first or edit it manually",
            path.display()
        );
    }
    std::fs::write(path, Config::default_toml())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Created {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.cmd {
        Commands::Report { run, out } => write_report(&run, &out)?,
        Commands::Freqs { run, out } => write_freqs(&run, out.as_deref())?,
        Commands::InitConfig { path } => init_config(&path)?,
    }

    Ok(())
}
