//! Chutes - a CLI for keeping a local model catalogue in line with the
//! Chutes AI inventory.
//!
//! This library lists live models, shows the configured model groups and
//! reconciles `config.toml` when configured models disappear upstream.

pub mod client;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod prompt;
pub mod reconcile;

pub use client::{ChutesClient, ChutesClientBuilder};
pub use config::{ConfigDocument, ConfigStore, Group, ModelGroups, ReplacementMap};
pub use error::{Error, Result};
pub use models::{ModelFlag, ModelRecord, Pricing};
pub use reconcile::{Decision, Event, Operator, ReconcileOutcome, Reconciler};
