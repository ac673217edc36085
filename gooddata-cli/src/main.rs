//! GoodData CLI
//!
//! Command-line interface for projects, warehouses and accounts on the
//! GoodData platform.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gooddata")]
#[command(about = "GoodData platform CLI", long_about = None)]
struct Cli {
    /// API host, or a base URL such as http://localhost:8080
    #[arg(long, env = "GOODDATA_HOST", default_value = "secure.gooddata.com")]
    host: String,

    /// Login (email) of the user
    #[arg(long, env = "GOODDATA_LOGIN")]
    login: String,

    /// Password of the user
    #[arg(long, env = "GOODDATA_PASSWORD", hide_env_values = true)]
    password: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gooddata_client=info,gooddata_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        host: cli.host,
        login: cli.login,
        password: cli.password,
    };

    handle_command(cli.command, &config).await
}
