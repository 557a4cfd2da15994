//! Command-line administration of listing shapes.
//!
//! Every command runs against one community in a SQLite database and prints
//! its result as JSON. Transaction processes are given on the command line;
//! they decide which fields the community may edit.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use shapekit_engine::{
    filter_uneditable, validate, CapabilitySet, ShapeConfig, ShapeService, StaticProcesses,
};
use shapekit_model::{ShapeForm, ShapeInput};
use shapekit_store::SqliteShapeStore;
use shapekit_types::{CommunityId, ProcessKind, ShapeId, TransactionProcess};

#[derive(Parser, Debug)]
#[command(name = "shapekit-admin")]
#[command(about = "Manage the listing shapes of a community")]
pub struct Cli {
    /// Path to the SQLite database
    #[arg(long, default_value = "shapekit.db", global = true)]
    pub db: PathBuf,

    /// Path to the configuration file
    #[arg(long, default_value = "shapekit.toml", global = true)]
    pub config: PathBuf,

    /// Community to operate on
    #[arg(short, long, default_value = "1", global = true)]
    pub community: u64,

    /// Transaction process configured for the community (repeatable)
    #[arg(short, long = "process", global = true)]
    pub processes: Vec<ProcessKind>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List shapes in display order
    List {
        /// Include category links
        #[arg(long)]
        categories: bool,
    },
    /// Show the edit view of a shape
    Show {
        id: ShapeId,
        #[arg(long)]
        locale: Option<String>,
    },
    /// Show the view of a blank shape
    New,
    /// Create a shape from a JSON form file
    Create { input: PathBuf },
    /// Update a shape from a JSON form file
    Update { id: ShapeId, input: PathBuf },
    /// Put shapes in the given order (comma-separated ids)
    Reorder {
        #[arg(value_delimiter = ',', required = true)]
        ids: Vec<ShapeId>,
    },
    /// Close every open listing of a shape
    CloseListings { id: ShapeId },
    /// Delete a shape, closing and detaching its listings
    Delete { id: ShapeId },
    /// Check a JSON form file without touching the database
    Validate { input: PathBuf },
}

fn read_input(path: &Path) -> Result<ShapeInput> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read form file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse form file {}", path.display()))
}

/// Gates and validates a form file without touching the database.
fn check_form(input: &Path, capabilities: &CapabilitySet) -> Result<Value> {
    let form = filter_uneditable(read_input(input)?, capabilities).apply_to(&ShapeForm::default());
    Ok(match validate(form) {
        Ok(form) => json!({ "valid": true, "form": form }),
        Err(errors) => json!({ "valid": false, "errors": errors.messages() }),
    })
}

type AdminService = ShapeService<SqliteShapeStore, StaticProcesses, SqliteShapeStore>;

/// Opens the database and wires it into a service.
fn open_service(cli: &Cli, processes: Vec<TransactionProcess>) -> Result<AdminService> {
    let db = cli
        .db
        .to_str()
        .context("Database path is not valid UTF-8")?;
    let store = SqliteShapeStore::open(db).context("Failed to open shape database")?;
    Ok(ShapeService::new(
        store.clone(),
        StaticProcesses::new(processes),
        store,
        ShapeConfig::load_from(&cli.config),
    ))
}

/// Runs `cli.command` and returns its JSON output.
///
/// `validate` only reads the form file; every other command opens the
/// database.
pub fn execute(cli: &Cli) -> Result<Value> {
    let community = CommunityId::new(cli.community);
    let processes: Vec<TransactionProcess> = cli
        .processes
        .iter()
        .copied()
        .map(TransactionProcess::new)
        .collect();
    let service = || open_service(cli, processes.clone());

    let output = match &cli.command {
        Command::Validate { input } => check_form(input, &CapabilitySet::from_processes(&processes))?,
        Command::List { categories } => {
            serde_json::to_value(service()?.list(community, *categories)?)?
        }
        Command::Show { id, locale } => {
            serde_json::to_value(service()?.edit_view(community, *id, locale.as_deref())?)?
        }
        Command::New => serde_json::to_value(service()?.new_view(community)?)?,
        Command::Create { input } => serde_json::to_value(
            service()?
                .create(community, read_input(input)?)
                .context("Failed to create listing shape")?,
        )?,
        Command::Update { id, input } => serde_json::to_value(
            service()?
                .update(community, *id, read_input(input)?)
                .with_context(|| format!("Failed to update listing shape {id}"))?,
        )?,
        Command::Reorder { ids } => serde_json::to_value(
            service()?
                .reorder(community, ids)
                .context("Failed to reorder listing shapes")?,
        )?,
        Command::CloseListings { id } => {
            json!({ "closed": service()?.close_listings(community, *id)? })
        }
        Command::Delete { id } => serde_json::to_value(service()?.delete(community, *id)?)?,
    };
    Ok(output)
}
