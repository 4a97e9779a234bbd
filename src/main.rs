use std::{fmt::Debug, process::ExitCode};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};

use chutes::{
    ChutesClient, ConfigStore,
    commands::{self, CheckResult},
    display,
    prompt::TerminalOperator,
};
use log::debug;

#[derive(Parser)]
#[command(name = "chutes")]
#[command(about = "Manage Chutes AI models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available models
    #[command(visible_alias = "ls")]
    List,
    /// Show config
    #[command(visible_alias = "cfg")]
    Config,
    /// Check config models are still live
    Check,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(ExitCode::FAILURE);
    };

    match command {
        Commands::List => handle_list().await,
        Commands::Config => handle_config(),
        Commands::Check => handle_check().await,
    }
    .log_error()?;

    Ok(ExitCode::SUCCESS)
}

async fn handle_list() -> Result<()> {
    let client = ChutesClient::new()?;
    let table = commands::list(&client)
        .await
        .context("Failed to list models")?;
    print!("{table}");
    Ok(())
}

fn handle_config() -> Result<()> {
    let store = ConfigStore::beside_executable()?;
    let groups = commands::show_config(&store).context("Failed to show config")?;
    print!("{groups}");
    Ok(())
}

async fn handle_check() -> Result<()> {
    let client = ChutesClient::new()?;
    let store = ConfigStore::beside_executable()?;
    let mut operator = TerminalOperator::new();

    let result = commands::check(&client, &store, &mut operator)
        .await
        .context("Failed to check config models")?;
    debug!("check result: {result:?}");

    match &result {
        CheckResult::AllLive => println!("{}", display::all_live_line()),
        CheckResult::Unchanged(_) => {}
        CheckResult::Written(outcome) => {
            print!("{}", display::replacements_summary(&outcome.replacements))
        }
    }
    Ok(())
}

trait LogError<T> {
    fn log_error(self) -> Self;
}

impl<T, E: Debug> LogError<T> for Result<T, E> {
    fn log_error(self) -> Self {
        self.inspect_err(|e| debug!("{:?}", e))
    }
}
