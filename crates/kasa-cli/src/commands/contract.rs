use anyhow::{Result, bail};

use kasa_coordination::Trigger;
use kasa_types::ContractType;

use crate::output;
use crate::state::AppState;

/// Run a trigger through the dispatcher and render the response.
pub async fn run(state: &AppState, trigger: Trigger) -> Result<()> {
    let response = state.dispatcher.dispatch(trigger).await?;
    output::print_response(&response);
    Ok(())
}

pub async fn register(state: &AppState, user: String, contract: ContractType) -> Result<()> {
    run(state, Trigger::register(user, contract)).await
}

pub async fn reset(state: &AppState, confirmed: bool) -> Result<()> {
    if !confirmed {
        bail!("Reset wipes every counter and bonus. Re-run with --yes to confirm.");
    }
    run(state, Trigger::Reset).await
}
