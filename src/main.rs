use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use memtier::adapters::{error_payload, execute, Command};
use memtier::{FileMemoryStore, StoreConfig};

#[derive(Parser)]
#[command(name = "memtier")]
#[command(about = "Tiered file-backed memory store")]
#[command(version)]
struct Cli {
    /// Store root directory (overrides MEMTIER_ROOT)
    #[arg(long, global = true)]
    root: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MEMTIER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> memtier::Result<serde_json::Value> {
    let mut config = StoreConfig::from_env();
    if let Some(root) = &cli.root {
        config = config.with_root(root);
    }
    let store = FileMemoryStore::open(&config)?;
    execute(&store, &cli.command)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(serde_json::Value::String(text)) => {
            print!("{}", text);
            ExitCode::SUCCESS
        }
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", error_payload(&e.into()));
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            let payload = error_payload(&e);
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string())
            );
            ExitCode::FAILURE
        }
    }
}
