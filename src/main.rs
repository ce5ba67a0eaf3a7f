//! regs-harvest - harvest regulations.gov docket comments into a CSV file

use clap::Parser;
use regs_harvest::{Config, DocketId, HarvestOutcome, HarvestRequest, Harvester};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Harvest the public comments of a regulations.gov docket into a CSV file
#[derive(Debug, Parser)]
#[command(name = "regs-harvest")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Docket id (e.g. FSIS-2010-0004)
    docket_id: String,

    /// Stop after this many comments
    #[arg(long)]
    max_comments: Option<usize>,

    /// Do not download attachments
    #[arg(long)]
    no_attachments: bool,

    /// File with one API key per line
    #[arg(long)]
    keys_file: Option<PathBuf>,

    /// API key; repeat for several keys
    #[arg(long = "api-key", env = "REGS_API_KEYS", value_delimiter = ',', hide_env_values = true)]
    api_keys: Vec<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory the CSV file is written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Start key rotation at a random key
    #[arg(long)]
    random_start: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Log to stderr; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("regs_harvest=info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(HarvestOutcome::Written { path, rows }) => {
            println!("{}", path.display());
            tracing::info!(rows, "done");
            ExitCode::SUCCESS
        }
        Ok(HarvestOutcome::NoDocuments) => {
            eprintln!("No documents found for this docket ID.");
            ExitCode::from(2)
        }
        Ok(HarvestOutcome::NoComments) => {
            eprintln!("No comments found for documents in this docket.");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> regs_harvest::Result<HarvestOutcome> {
    let docket = DocketId::parse(&cli.docket_id)?;

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if !cli.api_keys.is_empty() {
        config.api.api_keys = cli.api_keys;
    }
    if cli.keys_file.is_some() {
        config.api.keys_file = cli.keys_file;
    }
    if let Some(dir) = cli.output_dir {
        config.harvest.output_dir = dir;
    }
    config.api.random_start |= cli.random_start;

    let request = HarvestRequest {
        docket,
        max_comments: cli.max_comments.or(config.harvest.max_comments),
        extract_attachments: config.harvest.extract_attachments && !cli.no_attachments,
    };

    let mut harvester = Harvester::new(config)?;
    let caps = harvester.capabilities();
    tracing::info!(
        pdf = caps.pdf,
        docx = caps.docx,
        keys = harvester.client().rotator().len(),
        start_key = %harvester.client().rotator().current(),
        "attachment extraction support"
    );
    if request.extract_attachments && !caps.any() {
        tracing::warn!("no attachment decoders compiled in; attachments will be detected but not extracted");
    }

    harvester.run(&request).await
}
