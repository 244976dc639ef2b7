use cartera::application::ingest::{MovementLoader, SheetSource};
use cartera::domain::ports::MovementStoreBox;
use cartera::infrastructure::in_memory::InMemoryMovementStore;
use cartera::interfaces::csv::movement_reader::MovementReader;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input bank movements CSV file
    input: PathBuf,

    /// Source spreadsheet id recorded on each ingested movement
    #[arg(long)]
    sheet_id: Option<String>,

    /// Source sheet name recorded on each ingested movement
    #[arg(long)]
    sheet_name: Option<String>,

    /// Source sheet tab (gid) recorded on each ingested movement
    #[arg(long)]
    gid: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let store: MovementStoreBox = Box::new(InMemoryMovementStore::new());
    let loader = MovementLoader::new(store);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = MovementReader::new(file);
    let mut rows = Vec::new();
    for row in reader.movements() {
        match row {
            Ok(movement) => rows.push(movement),
            Err(e) => eprintln!("Error reading movement: {}", e),
        }
    }

    let source = SheetSource {
        sheet_id: cli.sheet_id,
        sheet_name: cli.sheet_name,
        gid: cli.gid,
    };
    let summary = loader
        .upsert_movements(rows, &source)
        .await
        .into_diagnostic()?;

    println!("{}", serde_json::to_string(&summary).into_diagnostic()?);

    Ok(())
}
