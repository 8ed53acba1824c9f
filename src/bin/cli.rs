//! lsmkv CLI
//!
//! Command-line interface operating directly on a data directory.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lsmkv::{Config, Result, Tree};
use tracing_subscriber::{fmt, EnvFilter};

/// lsmkv CLI
#[derive(Parser, Debug)]
#[command(name = "lsmkv-cli")]
#[command(about = "CLI for the lsmkv key-value store")]
#[command(version)]
struct Args {
    /// Database directory
    #[arg(long, default_value = "./data")]
    db: PathBuf,

    /// Level 0 capacity (distinct keys) before compaction
    #[arg(long, default_value = "10000")]
    threshold: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set a key-value pair
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Print records in write order; everything when no key is given
    Scan {
        /// Start from this key
        from: Option<String>,
    },

    /// Print keys >= FROM in sorted order, newest value per key
    Range {
        /// Lower bound (inclusive)
        from: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::builder()
        .data_dir(&args.db)
        .threshold(args.threshold)
        .build();
    let mut tree = Tree::open(config)?;

    let outcome = execute(&mut tree, args.command);
    let closed = tree.close();
    outcome.and(closed)
}

fn execute(tree: &mut Tree, command: Commands) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    // Printing failures (closed pipe) are not storage errors
    let mut print = |key: &[u8], value: &[u8]| {
        let _ = writeln!(
            out,
            "{} | {}",
            String::from_utf8_lossy(key),
            String::from_utf8_lossy(value)
        );
    };

    match command {
        Commands::Put { key, value } => tree.put(key.as_bytes(), value.as_bytes()),
        Commands::Get { key } => {
            let value = tree.get(key.as_bytes())?;
            println!("{}", String::from_utf8_lossy(&value));
            Ok(())
        }
        Commands::Scan { from: None } => tree.scan_all(&mut print),
        Commands::Scan { from: Some(from) } => tree.scan(from.as_bytes(), &mut print),
        Commands::Range { from } => tree.scan_range(from.as_bytes(), &mut print),
    }
}
