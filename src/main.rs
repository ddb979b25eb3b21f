// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// Use library instead of local modules
use udhiyath::{
    calculate, import_into, AnimalSection, AppConfig, DistributionInput, Session,
};

const LOG_ENV: &str = "UDHIYATH_LOG";

#[derive(Parser, Debug)]
#[command(name = "udhiyath", version, about = "Ud'hiyath meat allocation calculator")]
struct Cli {
    #[arg(long, global = true, help = "Config file (JSON); falls back to UDHIYATH_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculate owner and public shares for one animal
    Calc {
        /// Animal ID, e.g. B1
        id: String,

        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, help = "Meat weights in kg, comma separated")]
        meat: Vec<f64>,

        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, help = "Bone weights in kg, comma separated")]
        bone: Vec<f64>,

        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, help = "Liver weights in kg, comma separated")]
        liver: Vec<f64>,
    },

    /// Import a weight sheet (CSV) and print the allocation report
    #[command(alias = "report")]
    Import {
        csv: PathBuf,

        #[command(flatten)]
        distribution: DistributionArgs,
    },

    /// Interactive console, optionally preloaded from a weight sheet
    #[cfg(feature = "tui")]
    Tui {
        csv: Option<PathBuf>,

        #[command(flatten)]
        distribution: DistributionArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct DistributionArgs {
    #[arg(long, help = "Number of households (defaults to the configured count)")]
    households: Option<String>,

    #[arg(long, default_value = "", help = "Meat taken out before distribution (kg)")]
    meat_deduction: String,

    #[arg(long, default_value = "", help = "Bone taken out before distribution (kg)")]
    bone_deduction: String,

    #[arg(long, default_value = "", help = "Liver taken out before distribution (kg)")]
    liver_deduction: String,
}

impl DistributionArgs {
    fn to_input(&self, app_config: &AppConfig) -> DistributionInput {
        DistributionInput {
            households: self
                .households
                .clone()
                .unwrap_or_else(|| app_config.default_households.to_string()),
            meat_deduction: self.meat_deduction.clone(),
            bone_deduction: self.bone_deduction.clone(),
            liver_deduction: self.liver_deduction.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let app_config = AppConfig::load(cli.config.as_deref())?;

    match &cli.command {
        Commands::Calc { id, meat, bone, liver } => run_calc(&app_config, cli.json, id, meat, bone, liver),
        Commands::Import { csv, distribution } => run_import(&app_config, cli.json, csv, distribution),
        #[cfg(feature = "tui")]
        Commands::Tui { csv, distribution } => run_ui_mode(&app_config, csv.as_deref(), distribution),
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

fn run_calc(
    app_config: &AppConfig,
    json: bool,
    id: &str,
    meat: &[f64],
    bone: &[f64],
    liver: &[f64],
) -> Result<()> {
    let record = calculate(id, meat, bone, liver).context("Cannot calculate animal")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        print!("{}", AnimalSection::from_record(&record, app_config.co_owners).render_text());
    }

    Ok(())
}

fn run_import(
    app_config: &AppConfig,
    json: bool,
    csv_path: &Path,
    distribution: &DistributionArgs,
) -> Result<()> {
    let mut session = Session::new(distribution.to_input(app_config).into_config());

    if !json {
        println!("📂 Loading weight sheet {:?}...", csv_path);
    }

    let stats = import_into(&mut session, csv_path)?;

    if !json {
        println!(
            "✓ Read {} rows → {} animals ({} entries skipped)",
            stats.rows_read,
            stats.animals(),
            stats.entries_skipped
        );
        println!();
    }

    let report = session.report(app_config);
    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_text());
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(
    app_config: &AppConfig,
    csv_path: Option<&Path>,
    distribution: &DistributionArgs,
) -> Result<()> {
    let mut session = Session::new(distribution.to_input(app_config).into_config());

    if let Some(path) = csv_path {
        let stats = import_into(&mut session, path)?;
        println!("✓ Loaded {} animals from {:?}", stats.animals(), path);
    }

    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(session, app_config.clone());
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}
