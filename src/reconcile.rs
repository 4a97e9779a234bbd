//! Detects configured models that left the inventory and walks the operator
//! through picking replacements for them.

use std::{cmp::Ordering, collections::HashSet};

use log::debug;

use crate::{
    config::ReplacementMap,
    error::Result,
    models::{ModelRecord, provider_of},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Use this candidate as the replacement.
    Accept,
    /// Skip to the next candidate.
    Reject,
    /// Abandon the whole run. Replacements accepted so far are kept.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    Live(&'a str),
    Missing(&'a str),
    NoCandidates(&'a str),
    Exhausted(&'a str),
}

/// Source of replacement decisions: the terminal, a script, or a policy.
pub trait Operator {
    fn decide(&mut self, dead: &str, candidate: &ModelRecord) -> Result<Decision>;

    fn report(&mut self, _event: Event<'_>) {}
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileOutcome {
    pub replacements: ReplacementMap,
    /// Every configured id found missing, in scan order.
    pub missing: Vec<String>,
    /// Missing ids left without a replacement.
    pub unresolved: Vec<String>,
    pub stopped: bool,
}

impl ReconcileOutcome {
    pub fn all_live(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Live models not in `in_use`, same provider as `dead` first, then by
/// descending completion price. Ties keep inventory order.
pub fn rank_candidates<'a>(
    dead: &str,
    live: &'a [ModelRecord],
    in_use: &HashSet<String>,
) -> Vec<&'a ModelRecord> {
    let dead_provider = provider_of(dead);
    let group = |m: &ModelRecord| u8::from(m.provider() != dead_provider);

    let mut candidates: Vec<&ModelRecord> =
        live.iter().filter(|m| !in_use.contains(&m.id)).collect();
    candidates.sort_by(|a, b| {
        group(a).cmp(&group(b)).then_with(|| {
            b.pricing
                .completion
                .partial_cmp(&a.pricing.completion)
                .unwrap_or(Ordering::Equal)
        })
    });
    candidates
}

pub struct Reconciler<'a> {
    live: &'a [ModelRecord],
    live_ids: HashSet<&'a str>,
}

impl<'a> Reconciler<'a> {
    pub fn new(live: &'a [ModelRecord]) -> Self {
        let live_ids = live.iter().map(|m| m.id.as_str()).collect();
        Self { live, live_ids }
    }

    pub fn is_live(&self, id: &str) -> bool {
        self.live_ids.contains(id)
    }

    /// Scans `configured` in order. Live ids are reported and skipped; each
    /// missing id is offered ranked candidates until the operator accepts
    /// one, the candidates run out, or the operator stops the run.
    pub fn run<O>(&self, configured: &[String], operator: &mut O) -> Result<ReconcileOutcome>
    where
        O: Operator + ?Sized,
    {
        let mut outcome = ReconcileOutcome::default();
        let mut in_use: HashSet<String> = configured.iter().cloned().collect();

        for model in configured {
            if self.is_live(model) {
                operator.report(Event::Live(model));
                continue;
            }
            if outcome.replacements.get(model).is_some() || outcome.unresolved.contains(model) {
                debug!("{model}: already handled");
                continue;
            }

            operator.report(Event::Missing(model));
            outcome.missing.push(model.clone());

            let candidates = rank_candidates(model, self.live, &in_use);
            debug!("{model}: {} candidates", candidates.len());
            if candidates.is_empty() {
                operator.report(Event::NoCandidates(model));
                outcome.unresolved.push(model.clone());
                continue;
            }

            let mut chosen = None;
            for candidate in candidates {
                match operator.decide(model, candidate)? {
                    Decision::Accept => {
                        chosen = Some(candidate.id.clone());
                        break;
                    }
                    Decision::Reject => continue,
                    Decision::Stop => {
                        outcome.stopped = true;
                        break;
                    }
                }
            }

            match chosen {
                Some(replacement) => {
                    debug!("{model}: replaced by {replacement}");
                    in_use.remove(model);
                    in_use.insert(replacement.clone());
                    outcome.replacements.insert(model.clone(), replacement);
                }
                None => {
                    outcome.unresolved.push(model.clone());
                    if outcome.stopped {
                        debug!("{model}: stopped by operator");
                        break;
                    }
                    operator.report(Event::Exhausted(model));
                }
            }
        }

        Ok(outcome)
    }
}
