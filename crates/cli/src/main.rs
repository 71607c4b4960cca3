//! `floatbook` command line: run the ledger engine over an exported document.
//!
//! `adjust` and `close` act on today and write the document back in place.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::json;

use floatbook_core::BusinessId;
use floatbook_infra::{FloatBook, FloatBookConfig, InMemoryLedgerStore, LedgerDocument};
use floatbook_ledger::Channel;

#[derive(Debug, Parser)]
#[command(name = "floatbook")]
#[command(about = "Float ledger and end-of-day reconciliation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Print balances, stats and reconciliation for a date
    View {
        /// Exported ledger document (JSON)
        path: PathBuf,

        /// YYYY-MM-DD; defaults to today
        date: Option<NaiveDate>,
    },

    /// Post today's adjustment that zeroes a channel's discrepancy
    Adjust {
        path: PathBuf,

        /// Channel id: cash, bank, wave, aps, orange, nafa, westernUnion (or wu)
        #[arg(value_parser = parse_channel)]
        channel: Channel,
    },

    /// Close today and carry counted balances into tomorrow
    Close {
        path: PathBuf,

        /// Reconciliation notes; required when a channel is unreconciled
        #[arg(trailing_var_arg = true)]
        notes: Vec<String>,
    },
}

impl Command {
    fn path(&self) -> &Path {
        match self {
            Command::View { path, .. }
            | Command::Adjust { path, .. }
            | Command::Close { path, .. } => path,
        }
    }
}

fn parse_channel(raw: &str) -> Result<Channel, String> {
    Channel::from_id(raw).ok_or_else(|| format!("unknown channel: {raw}"))
}

fn load_document(path: &Path) -> anyhow::Result<LedgerDocument> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(LedgerDocument::from_json(&raw)?)
}

fn save_document(path: &Path, document: &LedgerDocument) -> anyhow::Result<()> {
    std::fs::write(path, document.to_json_pretty()?)
        .with_context(|| format!("failed to write {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    floatbook_observability::init();

    let cli = Cli::parse();
    let path = cli.command.path().to_path_buf();
    let config = FloatBookConfig::from_env().context("invalid configuration")?;

    let business_id = BusinessId::new();
    let store = Arc::new(InMemoryLedgerStore::new());
    store.load(business_id, load_document(&path)?)?;

    let book = FloatBook::new(business_id, store.clone(), config.clock(), config.clone());
    tracing::info!(path = %path.display(), today = %book.today(), "ledger loaded");

    let output = match cli.command {
        Command::View { date, .. } => {
            let view = book.view(date.unwrap_or_else(|| book.today()))?;
            json!({ "reportName": config.report_name, "view": view })
        }
        Command::Adjust { channel, .. } => {
            let diff = book.reconciliation(book.today())?.diff(channel);
            let outcome = book.create_adjustment(channel, diff)?;
            save_document(&path, &store.export(business_id)?)?;
            serde_json::to_value(outcome)?
        }
        Command::Close { notes, .. } => {
            let outcome = book.close_day(&notes.join(" "))?;
            save_document(&path, &store.export(business_id)?)?;
            serde_json::to_value(outcome)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
