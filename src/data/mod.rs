//! Data acquisition.
//!
//! Defines the `StatsProvider` and `PropsProvider` traits and the adapters
//! that implement them. Providers only fetch; validation and coercion
//! happen in the normalizer.

pub mod action_network;
pub mod csv_source;
pub mod fixtures;
pub mod nba_stats;
pub mod registry;

use anyhow::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::types::RawTable;

/// Source of season totals per player.
///
/// The returned table carries counting-stat totals plus games played;
/// per-game division is the normalizer's job.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StatsProvider: Send + Sync {
    /// Provider name for logging and identification.
    fn name(&self) -> &'static str;

    async fn fetch_stats(&self) -> Result<RawTable>;
}

/// Source of posted player prop lines.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PropsProvider: Send + Sync {
    /// Provider name for logging and identification.
    fn name(&self) -> &'static str;

    async fn fetch_props(&self) -> Result<RawTable>;
}
