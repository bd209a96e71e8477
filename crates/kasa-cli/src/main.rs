mod cli;
mod commands;
mod config;
mod lock;
mod logging;
mod output;
mod state;

use anyhow::Result;
use clap::Parser;

use kasa_coordination::Trigger;
use kasa_types::ContractType;

use crate::cli::{Cli, Commands};
use crate::config::KasaConfig;
use crate::lock::ServeLock;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let state_dir = cli
        .state_dir
        .clone()
        .unwrap_or_else(KasaConfig::default_state_dir);
    let config = KasaConfig::load(&state_dir)?;
    logging::init(&config.log_level, cli.log_json);

    if let Commands::Config { action } = cli.command {
        return commands::config::handle(action, &state_dir);
    }

    if cli.command.is_mutation() {
        ServeLock::ensure_not_serving(&state_dir)?;
    }

    let state = AppState::load_from(&state_dir, config).await?;

    match cli.command {
        Commands::Tzm { user } => {
            commands::contract::register(&state, user, ContractType::Tzm).await?;
        }
        Commands::Met { user } => {
            commands::contract::register(&state, user, ContractType::Met).await?;
        }
        Commands::React { user, marker } => {
            commands::contract::run(&state, Trigger::reaction(user, marker)).await?;
        }
        Commands::Summary => commands::contract::run(&state, Trigger::ShowAll).await?,
        Commands::Ranking => commands::contract::run(&state, Trigger::ShowTop).await?,
        Commands::Mine { user } => {
            commands::contract::run(&state, Trigger::ShowMine { caller_id: user }).await?;
        }
        Commands::Export { output, stdout } => {
            commands::export::handle(&state, output, stdout).await?;
        }
        Commands::Reset { yes } => commands::contract::reset(&state, yes).await?,
        Commands::Serve => commands::serve::handle(state).await?,
        Commands::Config { action } => commands::config::handle(action, &state.state_dir)?,
    }

    Ok(())
}
