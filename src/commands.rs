//! The three verbs, wired to the client, the config store and the reconciler.

use log::{debug, info};

use crate::{
    client::ChutesClient,
    config::{ConfigStore, Group, ReplacementMap},
    display,
    error::Result,
    models::ModelRecord,
    reconcile::{Operator, ReconcileOutcome, Reconciler},
};

#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    /// Every configured model is live. Nothing was written.
    AllLive,
    /// Some models are missing but no replacement was accepted. Nothing was
    /// written.
    Unchanged(ReconcileOutcome),
    /// Accepted replacements were applied to every group and saved.
    Written(ReconcileOutcome),
}

impl CheckResult {
    pub fn replacements(&self) -> Option<&ReplacementMap> {
        match self {
            CheckResult::Written(outcome) => Some(&outcome.replacements),
            _ => None,
        }
    }
}

async fn fetch_models(client: &ChutesClient) -> Result<Vec<ModelRecord>> {
    let pb = display::spinner("Fetching models...");
    let result = client.list_models().await;
    pb.finish_and_clear();
    result
}

pub async fn list(client: &ChutesClient) -> Result<String> {
    let models = fetch_models(client).await?;
    Ok(display::models_table(&models))
}

pub fn show_config(store: &ConfigStore) -> Result<String> {
    let config = store.load()?;
    Ok(display::config_groups(config.groups()))
}

/// Reconciles the `all` group against the live inventory and saves the
/// config when at least one replacement was accepted.
pub async fn check<O>(client: &ChutesClient, store: &ConfigStore, operator: &mut O) -> Result<CheckResult>
where
    O: Operator + ?Sized,
{
    let live = fetch_models(client).await?;
    let mut config = store.load()?;
    debug!(
        "check: {} live, {} configured",
        live.len(),
        config.group(Group::All).len()
    );

    let outcome = Reconciler::new(&live).run(config.group(Group::All), operator)?;

    if outcome.replacements.is_empty() {
        return Ok(if outcome.all_live() {
            CheckResult::AllLive
        } else {
            CheckResult::Unchanged(outcome)
        });
    }

    let rewritten = config.apply_replacements(&outcome.replacements);
    store.save(&config)?;
    info!(
        "check: {} replacements, {rewritten} entries rewritten",
        outcome.replacements.len()
    );
    Ok(CheckResult::Written(outcome))
}
