use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use marine_data_ingest::config::UploadOptions;
use marine_data_ingest::ingestion::TracingObserver;
use marine_data_ingest::logging;
use marine_data_ingest::persistence::DocumentStore;
use marine_data_ingest::upload::{UploadRequest, UploadService};

#[derive(Parser, Debug)]
#[command(name = "marine-ingest")]
#[command(about = "Upload a CSV, JSON or Excel file of marine research data")]
#[command(version)]
struct Args {
    /// File to upload (.csv, .json, .xlsx, .xls)
    file: PathBuf,

    /// Data type: species, oceanographic, edna, otolith or genetic
    #[arg(short, long)]
    kind: String,

    /// SQLite database file (in-memory when omitted)
    #[arg(long, env = "MARINE_INGEST_DB")]
    db: Option<PathBuf>,

    /// TOML file with upload options
    #[arg(short, long, env = "MARINE_INGEST_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let args = Args::parse();

    let options = match &args.config {
        Some(path) => UploadOptions::from_path(path).with_context(|| format!("loading {}", path.display()))?,
        None => UploadOptions::default(),
    };
    let policy = options.mapping_policy()?;

    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("reading {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());

    let store = open_store(args.db.as_ref())?;
    let service = UploadService::new(store)
        .with_options(options)?
        .with_policy(policy)
        .with_observer(Arc::new(TracingObserver));

    info!(file = %args.file.display(), kind = %args.kind, "uploading");
    let response = service
        .handle(&UploadRequest::new(file_name, args.kind, bytes))
        .await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.success {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "sqlite")]
fn open_store(db: Option<&PathBuf>) -> Result<Arc<dyn DocumentStore>> {
    use marine_data_ingest::persistence::SqliteStore;

    let store = match db {
        Some(path) => SqliteStore::open(path).with_context(|| format!("opening {}", path.display()))?,
        None => SqliteStore::open_in_memory()?,
    };
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
fn open_store(db: Option<&PathBuf>) -> Result<Arc<dyn DocumentStore>> {
    use marine_data_ingest::persistence::MemoryStore;

    if db.is_some() {
        anyhow::bail!("--db requires the 'sqlite' feature");
    }
    Ok(Arc::new(MemoryStore::new()))
}
