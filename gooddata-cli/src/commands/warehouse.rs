//! Warehouse command handlers

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use gooddata_client::{GoodData, PageRequest};
use gooddata_core::domain::warehouse::{Warehouse, WarehouseStatus};

use super::format_time;

/// Warehouse subcommands
#[derive(Subcommand)]
pub enum WarehouseCommands {
    /// List warehouses
    List,
    /// Get warehouse details
    Get {
        /// Warehouse ID
        id: String,
    },
    /// Create a warehouse and wait until it is provisioned
    Create {
        /// Warehouse title
        #[arg(short, long)]
        title: String,

        /// Warehouse authorization token
        #[arg(short, long, env = "GOODDATA_AUTH_TOKEN", hide_env_values = true)]
        auth_token: String,

        /// Warehouse description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a warehouse
    Delete {
        /// Warehouse ID
        id: String,
    },
    /// List schemas of a warehouse
    Schemas {
        /// Warehouse ID
        id: String,
    },
}

/// Handle warehouse commands
///
/// # Arguments
/// * `command` - The warehouse command to execute
/// * `gd` - Connected API client
pub async fn handle_warehouse_command(command: WarehouseCommands, gd: &GoodData) -> Result<()> {
    match command {
        WarehouseCommands::List => list_warehouses(gd).await,
        WarehouseCommands::Get { id } => get_warehouse(gd, &id).await,
        WarehouseCommands::Create {
            title,
            auth_token,
            description,
        } => create_warehouse(gd, title, auth_token, description).await,
        WarehouseCommands::Delete { id } => delete_warehouse(gd, &id).await,
        WarehouseCommands::Schemas { id } => list_schemas(gd, &id).await,
    }
}

async fn list_warehouses(gd: &GoodData) -> Result<()> {
    let warehouses = gd.warehouse_service().get_warehouses().await?;

    if warehouses.is_empty() {
        println!("{}", "No warehouses found.".yellow());
    } else {
        println!(
            "{}",
            format!("Found {} warehouse(s):", warehouses.len()).bold()
        );
        println!();
        for warehouse in warehouses {
            print_warehouse_summary(&warehouse);
        }
    }

    Ok(())
}

async fn get_warehouse(gd: &GoodData, id: &str) -> Result<()> {
    let warehouse = gd.warehouse_service().get_warehouse_by_id(id).await?;
    print_warehouse_details(&warehouse);
    Ok(())
}

async fn create_warehouse(
    gd: &GoodData,
    title: String,
    auth_token: String,
    description: Option<String>,
) -> Result<()> {
    let mut warehouse = Warehouse::new(title, auth_token);
    warehouse.description = description;

    println!("{}", "Creating warehouse...".dimmed());

    let warehouse = gd
        .warehouse_service()
        .create_warehouse(&warehouse)
        .await?
        .get()
        .await
        .context("Warehouse creation failed")?;

    println!("{}", "✓ Warehouse created successfully!".green().bold());
    println!("  ID:    {}", warehouse.id().unwrap_or("-").cyan());
    println!("  Title: {}", warehouse.title.bold());
    if let Some(jdbc) = warehouse.jdbc_connection_string() {
        println!("  JDBC:  {}", jdbc.dimmed());
    }

    Ok(())
}

async fn delete_warehouse(gd: &GoodData, id: &str) -> Result<()> {
    let service = gd.warehouse_service();
    let warehouse = service.get_warehouse_by_id(id).await?;
    service.remove_warehouse(&warehouse).await?;

    println!(
        "{}",
        format!("✓ Warehouse {} deleted successfully!", id)
            .green()
            .bold()
    );

    Ok(())
}

async fn list_schemas(gd: &GoodData, id: &str) -> Result<()> {
    let service = gd.warehouse_service();
    let warehouse = service.get_warehouse_by_id(id).await?;
    let schemas = service
        .list_warehouse_schemas(&warehouse, &PageRequest::default())
        .await?;

    if schemas.is_empty() {
        println!("{}", "No schemas found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Schemas of {}:", warehouse.title).bold());
    for schema in schemas.iter() {
        let marker = if schema.is_default() { " (default)" } else { "" };
        println!("  {} {}{}", "▸".cyan(), schema.name.bold(), marker.dimmed());
        if let Some(description) = &schema.description {
            println!("    {}", description.dimmed());
        }
    }

    Ok(())
}

fn colored_status(status: Option<&WarehouseStatus>) -> ColoredString {
    match status {
        Some(WarehouseStatus::Enabled) => "ENABLED".green(),
        Some(status @ (WarehouseStatus::Error | WarehouseStatus::Deleted)) => status.as_str().red(),
        Some(status) => status.as_str().yellow(),
        None => "-".normal(),
    }
}

fn print_warehouse_summary(warehouse: &Warehouse) {
    println!("  {} {}", "▸".cyan(), warehouse.title.bold());
    println!("    ID:      {}", warehouse.id().unwrap_or("-").dimmed());
    println!("    Status:  {}", colored_status(warehouse.status.as_ref()));
    println!(
        "    Created: {}",
        format_time(warehouse.created.as_ref()).dimmed()
    );
    println!();
}

fn print_warehouse_details(warehouse: &Warehouse) {
    println!("{}", "Warehouse Details:".bold());
    println!("  ID:          {}", warehouse.id().unwrap_or("-").cyan());
    println!("  Title:       {}", warehouse.title.bold());
    if let Some(description) = &warehouse.description {
        println!("  Description: {}", description);
    }
    println!("  Status:      {}", colored_status(warehouse.status.as_ref()));
    if let Some(environment) = &warehouse.environment {
        println!("  Environment: {}", environment);
    }
    if let Some(jdbc) = warehouse.jdbc_connection_string() {
        println!("  JDBC:        {}", jdbc);
    }
    println!("  Created:     {}", format_time(warehouse.created.as_ref()));
    println!("  Updated:     {}", format_time(warehouse.updated.as_ref()));
}
