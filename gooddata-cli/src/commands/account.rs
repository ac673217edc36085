//! Account command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use gooddata_client::GoodData;

use super::format_time;

/// Account subcommands
#[derive(Subcommand)]
pub enum AccountCommands {
    /// Show the account of the logged-in user
    Current,
}

pub async fn handle_account_command(command: AccountCommands, gd: &GoodData) -> Result<()> {
    match command {
        AccountCommands::Current => current_account(gd).await,
    }
}

async fn current_account(gd: &GoodData) -> Result<()> {
    let account = gd.account_service().get_current().await?;

    let name = [account.first_name.as_deref(), account.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    println!("{}", "Account Details:".bold());
    println!("  ID:       {}", account.id().unwrap_or("-").cyan());
    println!("  Login:    {}", account.login.as_deref().unwrap_or("-").bold());
    if !name.is_empty() {
        println!("  Name:     {}", name);
    }
    if let Some(email) = &account.email {
        println!("  Email:    {}", email);
    }
    if let Some(company) = &account.company_name {
        println!("  Company:  {}", company);
    }
    if let Some(timezone) = &account.timezone {
        println!("  Timezone: {}", timezone.dimmed());
    }
    println!("  Created:  {}", format_time(account.created.as_ref()));

    Ok(())
}
