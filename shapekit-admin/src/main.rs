//! shapekit admin tool
//!
//! Usage:
//!   shapekit-admin --db shapes.db --process preauthorize create form.json
//!   shapekit-admin --db shapes.db reorder 3,1,2

use anyhow::Result;
use clap::Parser;
use shapekit_admin::{execute, Cli};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    debug!(command = ?cli.command, community = cli.community, "Running admin command");
    let output = execute(&cli)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
