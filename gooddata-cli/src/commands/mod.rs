//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod account;
mod project;
mod warehouse;

pub use account::AccountCommands;
pub use project::ProjectCommands;
pub use warehouse::WarehouseCommands;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Account of the logged-in user
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
    /// Project management
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Warehouse management
    Warehouse {
        #[command(subcommand)]
        command: WarehouseCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let gd = config.connect()?;

    let result = match command {
        Commands::Account { command } => account::handle_account_command(command, &gd).await,
        Commands::Project { command } => project::handle_project_command(command, &gd).await,
        Commands::Warehouse { command } => {
            warehouse::handle_warehouse_command(command, &gd).await
        }
    };

    if let Err(e) = gd.logout().await {
        tracing::warn!("logout failed: {e}");
    }

    result
}

/// Format an optional API timestamp for display
pub(crate) fn format_time(time: Option<&DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        let time = gooddata_core::parse_timestamp("2014-04-11 11:43:45").unwrap();
        assert_eq!(format_time(Some(&time)), "2014-04-11 11:43:45");
        assert_eq!(format_time(None), "-");
    }
}
