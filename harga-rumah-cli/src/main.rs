use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use harga_rumah::{
    CanonicalField, DatasetStore, ImportOutcome, Importer, StoreConfig, SynonymTable, UploadFormat,
};
use std::{fs, path::PathBuf};
use tracing::{info, warn, Level};

/// Harga Rumah Importer
/// Ingests CSV, Excel, or JSON listing uploads into the raw and clean stores
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output for detailed processing information
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import an uploaded dataset file into the raw and clean stores
    Import {
        /// Path to the upload (.csv, .xlsx, or .json)
        #[arg(short, long, value_name = "PATH TO UPLOAD")]
        file: PathBuf,

        /// Override the format inferred from the file extension (csv/xlsx/json)
        #[arg(short = 't', long)]
        format: Option<String>,

        /// Directory holding the raw and clean store files
        #[arg(short, long, default_value = "data", value_name = "DATA DIRECTORY")]
        data_dir: PathBuf,

        /// Path to a synonym table JSON file (defaults to the built-in mapping)
        #[arg(short, long, value_name = "PATH TO SYNONYMS")]
        synonyms: Option<PathBuf>,
    },
    /// Check that an upload satisfies the canonical schema without persisting it
    Validate {
        /// Path to the upload to check
        #[arg(short, long, value_name = "PATH TO UPLOAD")]
        file: PathBuf,

        /// Override the format inferred from the file extension (csv/xlsx/json)
        #[arg(short = 't', long)]
        format: Option<String>,

        /// Path to a synonym table JSON file (defaults to the built-in mapping)
        #[arg(short, long, value_name = "PATH TO SYNONYMS")]
        synonyms: Option<PathBuf>,
    },
    /// Print the column mapping used for schema reconciliation
    Mapping {
        /// Path to a synonym table JSON file (defaults to the built-in mapping)
        #[arg(short, long, value_name = "PATH TO SYNONYMS")]
        synonyms: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with appropriate level
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Import {
            file,
            format,
            data_dir,
            synonyms,
        } => import_command(file, format.as_deref(), data_dir, synonyms).await,
        Commands::Validate {
            file,
            format,
            synonyms,
        } => validate_command(file, format.as_deref(), synonyms).await,
        Commands::Mapping { synonyms } => mapping_command(synonyms),
    }
}

fn load_synonyms(path: &Option<PathBuf>) -> Result<SynonymTable> {
    match path {
        Some(path) => SynonymTable::from_file(path)
            .context("Failed to load synonym table. See errors for additional details:"),
        None => Ok(SynonymTable::default_mapping()),
    }
}

fn resolve_format(file: &PathBuf, format: Option<&str>) -> Result<UploadFormat> {
    let format = match format {
        Some(tag) => UploadFormat::from_tag(tag),
        None => UploadFormat::from_extension(file),
    };
    format.context("Could not determine the upload format")
}

async fn import_command(
    file: &PathBuf,
    format: Option<&str>,
    data_dir: &PathBuf,
    synonyms: &Option<PathBuf>,
) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("Upload file not found: {}", file.display());
    }

    let format = resolve_format(file, format)?;
    let synonyms = load_synonyms(synonyms)?;
    let store = DatasetStore::new(StoreConfig::new(data_dir));
    let importer = Importer::new(synonyms, store);

    info!("Importing {} as {}", file.display(), format);
    let bytes = fs::read(file)
        .with_context(|| format!("Failed to read upload file: {}", file.display()))?;

    let report = importer
        .process_upload(&bytes, format)
        .await
        .context("Failed to process upload")?;

    info!(
        "Ingested {} new rows ({} in batch); raw store now has {} rows",
        report.new_rows, report.batch_rows, report.store_rows
    );
    info!(
        "Raw store: {} | Clean store: {}",
        importer.store().raw_path().display(),
        importer.store().clean_path().display()
    );

    match ImportOutcome::from_state(report.state) {
        ImportOutcome::Success => info!("Import completed successfully"),
        ImportOutcome::SuccessWithWarnings(warnings) => {
            warn!("Import completed with {} warning(s):", warnings.len());
            for warning in warnings {
                warn!("  {}", warning.message);
            }
        }
        ImportOutcome::Failure { errors, .. } => {
            anyhow::bail!("Import recorded {} error(s)", errors.len());
        }
    }
    Ok(())
}

async fn validate_command(
    file: &PathBuf,
    format: Option<&str>,
    synonyms: &Option<PathBuf>,
) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("Upload file not found: {}", file.display());
    }

    let format = resolve_format(file, format)?;
    let synonyms = load_synonyms(synonyms)?;
    // The store is never touched by validation; any directory will do.
    let store = DatasetStore::new(StoreConfig::new("data"));
    let importer = Importer::new(synonyms, store);

    let bytes = fs::read(file)
        .with_context(|| format!("Failed to read upload file: {}", file.display()))?;

    let reconciled = importer
        .validate_upload(&bytes, format)
        .await
        .context("Upload does not satisfy the canonical schema")?;

    info!(
        "Upload satisfies the canonical schema ({} rows reconciled)",
        reconciled.len()
    );
    Ok(())
}

fn mapping_command(synonyms: &Option<PathBuf>) -> Result<()> {
    let synonyms = load_synonyms(synonyms)?;

    println!("{:<20} {}", "alias", "canonical field");
    for field in CanonicalField::ALL {
        for alias in synonyms.aliases_for(field) {
            println!("{:<20} {}", alias, field);
        }
    }
    Ok(())
}
