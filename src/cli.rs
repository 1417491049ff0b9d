use crate::server;
use clap::{Args, Parser, Subcommand};
use lernprofil::config::AppConfig;
use lernprofil::error::AppError;
use lernprofil::telemetry;
use lernprofil::workflows::profile::{
    Construct, ItemRegistry, Profile, ProfileAssembler, TextReport,
};
use lernprofil::workflows::responses::ResponseImporter;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "lernprofil",
    about = "Score Learning Energy Profile questionnaires from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Compute profiles and inspect the item registry
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Score one answered questionnaire CSV
    Compute(ComputeArgs),
    /// List constructs, item counts, and reverse-coded items
    Items,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
struct ComputeArgs {
    /// Answered questionnaire with `item_code,rating` columns
    #[arg(long)]
    csv: PathBuf,
    /// Profile id (defaults to the CSV file name without extension)
    #[arg(long)]
    id: Option<String>,
    /// Write the profile JSON to this path
    #[arg(long)]
    output: Option<PathBuf>,
    /// Write the plain-text report to this path
    #[arg(long)]
    report: Option<PathBuf>,
    /// Print JSON to stdout instead of the text report
    #[arg(long)]
    json: bool,
    /// Refuse to score sheets with unknown, invalid, duplicate, or missing items
    #[arg(long)]
    strict: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Profile {
            command: ProfileCommand::Compute(args),
        } => run_compute(args),
        Command::Profile {
            command: ProfileCommand::Items,
        } => run_items(),
    }
}

fn run_compute(args: ComputeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let ComputeArgs {
        csv,
        id,
        output,
        report,
        json,
        strict,
    } = args;

    let registry = Arc::new(ItemRegistry::standard()?);
    let import = ResponseImporter::new(&registry)
        .strict(strict)
        .import_path(&csv)?;
    for issue in &import.issues {
        warn!(%issue, "import issue");
    }

    let id = id.unwrap_or_else(|| profile_id_from_path(&csv));
    let assembler = ProfileAssembler::new(registry, config.scoring);
    let profile = assembler.assemble(id, &import.responses);

    if let Some(path) = output {
        write_json(&profile, &path)?;
        info!(path = %path.display(), "profile json written");
    }
    if let Some(path) = report {
        fs::write(&path, TextReport::new(&profile).to_string())?;
        info!(path = %path.display(), "text report written");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print!("{}", TextReport::new(&profile));
    }

    Ok(())
}

fn run_items() -> Result<(), AppError> {
    let registry = ItemRegistry::standard()?;

    println!(
        "Learning Energy Profile instrument: {} items ({} main scale, {} additional, {} reverse-coded in main scales)",
        registry.len(),
        registry.main_scale_count(),
        registry.additional_count(),
        registry.main_reverse_count()
    );

    for construct in Construct::ordered() {
        let items: Vec<_> = registry.items_for(construct).collect();
        let reverse: Vec<_> = items
            .iter()
            .filter(|item| item.is_reverse())
            .map(|item| item.code)
            .collect();
        let reverse_note = if reverse.is_empty() {
            "none".to_string()
        } else {
            reverse.join(", ")
        };
        println!(
            "- {} ({}): {} items, reverse: {}",
            construct.label(),
            construct.id(),
            items.len(),
            reverse_note
        );
    }

    Ok(())
}

fn write_json(profile: &Profile, path: &Path) -> Result<(), AppError> {
    let mut body = serde_json::to_string_pretty(profile)?;
    body.push('\n');
    fs::write(path, body)?;
    Ok(())
}

fn profile_id_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "profile".to_string())
}
