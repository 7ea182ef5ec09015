use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use violation_map::aggregate::format_count;
use violation_map::config::AppConfig;
use violation_map::controller::{DashboardController, DashboardEvent, ViewCommand};
use violation_map::{data, export};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration; compiled-in defaults are used when omitted
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Dataset URL or path, overrides `input.source`
    #[arg(short, long, value_name = "SOURCE", global = true)]
    data: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the overview chart series for the whole dataset
    Summarize {
        /// Also write the series as CSV
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },
    /// Select locations by display key and print the statistics panel
    Select {
        /// Display key; the first replaces, later ones are added as with a modifier click
        #[arg(short, long = "key", value_name = "KEY", required = true)]
        keys: Vec<String>,
    },
    /// Feed newline-delimited JSON events through the dashboard and print view commands
    Replay {
        #[arg(short, long, value_name = "FILE")]
        events: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut app_config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(source) = cli.data {
        app_config.input.source = source;
    }

    let mut controller = DashboardController::new(&app_config);
    let features = data::load_features(&app_config.input).await?;

    match &cli.command {
        Commands::Summarize { csv } => {
            controller.load(features);
            let overview = controller.overview();
            println!("{} features, {} categories", controller.features().len(), overview.len());
            for (label, value) in overview.iter() {
                println!("{}: {}", label, format_count(value));
            }
            if let Some(path) = csv {
                export::write_series_file(path, overview)?;
                println!("Wrote {:?}", path);
            }
        }
        Commands::Select { keys } => {
            controller.load(features);
            let (_, missing) = controller.select_by_display_keys(keys);
            for key in &missing {
                tracing::warn!(key = %key, "No feature with this display key");
            }

            let summary = controller
                .aggregator()
                .describe_selection(controller.selection().features());
            println!("{}", summary.title);
            println!("{}", summary.description);
            println!("{}", summary.statistics_html);
        }
        Commands::Replay { events } => {
            let file = File::open(events)
                .with_context(|| format!("Failed to open events file: {:?}", events))?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();

            emit(&mut out, controller.init())?;
            emit(&mut out, controller.map_loaded())?;
            emit(&mut out, controller.load(features))?;

            for (n, line) in BufReader::new(file).lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                let event: DashboardEvent = serde_json::from_str(&line)
                    .with_context(|| format!("Invalid event on line {}", n + 1))?;
                emit(&mut out, controller.handle(event))?;
            }
        }
    }

    Ok(())
}

fn emit(out: &mut impl Write, commands: Vec<ViewCommand>) -> Result<()> {
    for command in commands {
        serde_json::to_writer(&mut *out, &command)?;
        writeln!(out)?;
    }
    Ok(())
}
