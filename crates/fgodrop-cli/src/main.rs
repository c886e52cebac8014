//! fgodrop CLI
//!
//! Command-line tool for syncing the community drop-rate spreadsheet into
//! relational snapshot blobs, and for inspecting what has been published.

use clap::{Parser, Subcommand};
use fgodrop_core::{
    codec, fetch_values, load_previous, parse_values, preview, publish, sync, values_from_csv,
    BlobFormat, Dataset, History, SnapshotStore,
};
use reqwest::blocking::Client;
use std::env;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Community sheet the drop rates are measured in
const DEFAULT_SPREADSHEET_ID: &str = "1qjiymRgcpdAYv201jdzcfRSPKrNaquNRJGIRYFlaimo";
/// Tab holding the drop-rate grid
const DEFAULT_RANGE: &str = "ドロップ率表";
/// Environment variable consulted when --api-key is not given
const API_KEY_ENV: &str = "GOOGLE_SHEETS_API_KEY";

#[derive(Parser)]
#[command(name = "fgodrop")]
#[command(about = "FGO drop-rate spreadsheet sync", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the sheet, merge it into the store and publish on change
    Sync {
        /// Spreadsheet to fetch
        #[arg(long, default_value = DEFAULT_SPREADSHEET_ID)]
        spreadsheet_id: String,

        /// Sheet range holding the grid
        #[arg(short, long, default_value = DEFAULT_RANGE)]
        range: String,

        /// Sheets API key (falls back to GOOGLE_SHEETS_API_KEY)
        #[arg(long)]
        api_key: Option<String>,

        /// Directory the snapshot blobs live in
        #[arg(short, long, default_value = "snapshots")]
        store: PathBuf,

        /// Blob layout (json or csv)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Merge and compare without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Transform a CSV export of the sheet without touching the store
    Parse {
        /// Path to a CSV export of the grid
        #[arg(short, long)]
        file: PathBuf,

        /// Write the parsed dataset as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the published snapshot
    Show {
        /// Directory the snapshot blobs live in
        #[arg(short, long, default_value = "snapshots")]
        store: PathBuf,

        /// Maximum number of quests to display
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Export the published snapshot to plain files
    Export {
        /// Directory the snapshot blobs live in
        #[arg(short, long, default_value = "snapshots")]
        store: PathBuf,

        /// Output format (csv or json)
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (json) or directory (csv)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List recent sync runs
    History {
        /// Directory the snapshot blobs live in
        #[arg(short, long, default_value = "snapshots")]
        store: PathBuf,

        /// Number of runs to display
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(filter).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> fgodrop_core::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            spreadsheet_id,
            range,
            api_key,
            store,
            format,
            dry_run,
        } => cmd_sync(&spreadsheet_id, &range, api_key, &store, &format, dry_run),
        Commands::Parse { file, output } => cmd_parse(&file, output.as_ref()),
        Commands::Show { store, limit } => cmd_show(&store, limit),
        Commands::Export {
            store,
            format,
            output,
        } => cmd_export(&store, &format, &output),
        Commands::History { store, limit } => cmd_history(&store, limit),
    }
}

fn cmd_sync(
    spreadsheet_id: &str,
    range: &str,
    api_key: Option<String>,
    store_dir: &PathBuf,
    format: &str,
    dry_run: bool,
) -> fgodrop_core::Result<()> {
    let format = parse_format(format)?;
    let api_key = api_key
        .or_else(|| env::var(API_KEY_ENV).ok())
        .ok_or_else(|| {
            fgodrop_core::Error::Config(format!(
                "no API key; pass --api-key or set {}",
                API_KEY_ENV
            ))
        })?;

    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    info!("fetching spreadsheet {} range {}", spreadsheet_id, range);
    let values = fetch_values(&client, spreadsheet_id, range, &api_key)?;
    let snapshot = parse_values(&values)?;
    println!(
        "Parsed {} items, {} quests, {} drop rates",
        snapshot.items.len(),
        snapshot.quests.len(),
        snapshot.drop_rates.len()
    );

    let store = SnapshotStore::open(store_dir)?;
    if dry_run {
        let outcome = preview(&store, format, &snapshot)?;
        if outcome.written {
            println!(
                "Dry run: publishing would update the store to {} items, {} quests, {} drop rates",
                outcome.items, outcome.quests, outcome.drop_rates
            );
        } else {
            println!("Dry run: store is already up to date");
        }
        return Ok(());
    }

    let outcome = publish(&store, format, &snapshot)?;
    if outcome.written {
        println!(
            "Published {} items, {} quests, {} drop rates to {}",
            outcome.items,
            outcome.quests,
            outcome.drop_rates,
            store_dir.display()
        );
    } else {
        println!("Store is already up to date");
    }

    Ok(())
}

fn cmd_parse(file: &PathBuf, output: Option<&PathBuf>) -> fgodrop_core::Result<()> {
    let values = values_from_csv(file)?;
    let data = parse_values(&values)?;

    println!("File: {}", file.display());
    println!("Items: {}", data.items.len());
    println!("Quests: {}", data.quests.len());
    println!("Drop rates: {}", data.drop_rates.len());

    if let Some(output) = output {
        let file = File::create(output)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", codec::to_json_pretty(&data)?)?;
        println!("Wrote {}", output.display());
    }

    Ok(())
}

fn cmd_show(store_dir: &PathBuf, limit: Option<usize>) -> fgodrop_core::Result<()> {
    let store = SnapshotStore::open(store_dir)?;
    let data = load_stored(&store)?;

    if data.is_empty() {
        println!("Store is empty; run sync first.");
        return Ok(());
    }

    println!(
        "{} items, {} quests, {} drop rates",
        data.items.len(),
        data.quests.len(),
        data.drop_rates.len()
    );
    println!();

    println!("id\tsection\tarea\tname\tap\tsamples");
    println!("{}", "-".repeat(72));
    let row_limit = limit.unwrap_or(data.quests.len());
    for quest in data.quests.iter().take(row_limit) {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            quest.id,
            quest.section,
            quest.area,
            quest.name,
            display_opt(quest.ap),
            display_opt(quest.samples)
        );
    }
    if data.quests.len() > row_limit {
        println!("... ({} more rows)", data.quests.len() - row_limit);
    }

    Ok(())
}

fn cmd_export(store_dir: &PathBuf, format: &str, output: &PathBuf) -> fgodrop_core::Result<()> {
    let store = SnapshotStore::open(store_dir)?;
    let data = load_stored(&store)?;

    match parse_format(format)? {
        BlobFormat::Json => {
            let file = File::create(output)?;
            let mut writer = BufWriter::new(file);
            writeln!(writer, "{}", codec::to_json_pretty(&data)?)?;
            println!(
                "Exported {} quests to {}",
                data.quests.len(),
                output.display()
            );
        }
        BlobFormat::Csv => {
            fs::create_dir_all(output)?;
            let tables = [
                ("items.csv", codec::to_csv("items", &data.items)?),
                ("quests.csv", codec::quests_to_csv(&data.quests)?),
                ("drop_rates.csv", codec::to_csv("drop_rates", &data.drop_rates)?),
            ];
            for (name, content) in tables {
                let path = output.join(name);
                fs::write(&path, content)?;
                println!("Wrote {}", path.display());
            }
        }
    }

    Ok(())
}

fn cmd_history(store_dir: &PathBuf, limit: usize) -> fgodrop_core::Result<()> {
    let store = SnapshotStore::open(store_dir)?;
    let history = History::load(&store)?;

    if history.entries.is_empty() {
        println!("No sync runs recorded.");
        return Ok(());
    }

    println!("Sync runs (most recent first):");
    for entry in history.recent(limit) {
        let status = if entry.written { "written" } else { "no change" };
        println!(
            "  {}  items {}  quests {}  drop rates {}  [{}]",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.items,
            entry.quests,
            entry.drop_rates,
            status
        );
    }

    Ok(())
}

/// Load whichever blob layout the store holds; an untouched store reads as
/// an empty dataset
fn load_stored(store: &SnapshotStore) -> fgodrop_core::Result<Dataset> {
    if store.get(sync::JSON_BLOB)?.is_some() {
        load_previous(store, BlobFormat::Json)
    } else {
        load_previous(store, BlobFormat::Csv)
    }
}

fn parse_format(format: &str) -> fgodrop_core::Result<BlobFormat> {
    match format.to_lowercase().as_str() {
        "json" => Ok(BlobFormat::Json),
        "csv" => Ok(BlobFormat::Csv),
        other => Err(fgodrop_core::Error::Config(format!(
            "unknown format '{}', expected csv or json",
            other
        ))),
    }
}

fn display_opt(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
