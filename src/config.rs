//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every field has a default so a missing file or a partial file still
//! yields a complete configuration.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::storage::{ExportFormat, NullEdge};
use crate::strategy::edge::{EdgeRules, Threshold};

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub run: RunConfig,
    pub stats: StatsSourceConfig,
    pub props: PropsSourceConfig,
    pub rules: RulesConfig,
    pub report: ReportConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RunConfig {
    /// NBA season label, e.g. "2024-25".
    pub season: String,
    /// Skip all network providers and use the demo fixtures.
    pub offline: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            season: "2024-25".to_string(),
            offline: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatsSource {
    NbaApi,
    Csv,
    Fixture,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StatsSourceConfig {
    pub source: StatsSource,
    pub base_url: String,
    pub csv_path: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl Default for StatsSourceConfig {
    fn default() -> Self {
        Self {
            source: StatsSource::NbaApi,
            base_url: "https://stats.nba.com/stats".to_string(),
            csv_path: None,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PropsSource {
    ActionNetwork,
    Csv,
    Fixture,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PropsSourceConfig {
    pub source: PropsSource,
    pub url: String,
    pub csv_path: Option<PathBuf>,
    pub timeout_secs: u64,
    /// Sportsbook label for scraped lines (the page shows a consensus line).
    pub sportsbook: String,
}

impl Default for PropsSourceConfig {
    fn default() -> Self {
        Self {
            source: PropsSource::ActionNetwork,
            url: "https://www.actionnetwork.com/nba/props".to_string(),
            csv_path: None,
            timeout_secs: 15,
            sportsbook: "Action Network".to_string(),
        }
    }
}

/// One row of the rule table, as written in TOML.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ThresholdConfig {
    pub strong_buy: Decimal,
    pub consider: Decimal,
    pub avoid: Decimal,
}

impl From<ThresholdConfig> for Threshold {
    fn from(t: ThresholdConfig) -> Self {
        Threshold {
            strong_buy: t.strong_buy,
            consider: t.consider,
            avoid: t.avoid,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RulesConfig {
    pub points: ThresholdConfig,
    pub rebounds: ThresholdConfig,
    pub assists: ThresholdConfig,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            points: ThresholdConfig { strong_buy: dec!(1.5), consider: dec!(0.5), avoid: dec!(-1.0) },
            rebounds: ThresholdConfig { strong_buy: dec!(1.2), consider: dec!(0.3), avoid: dec!(-1.0) },
            assists: ThresholdConfig { strong_buy: dec!(1.0), consider: dec!(0.2), avoid: dec!(-1.0) },
        }
    }
}

impl RulesConfig {
    /// Build validated edge rules from the configured thresholds.
    pub fn to_rules(&self) -> Result<EdgeRules> {
        let rules = EdgeRules {
            points: self.points.into(),
            rebounds: self.rebounds.into(),
            assists: self.assists.into(),
        };
        rules.validate()?;
        Ok(rules)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReportConfig {
    /// Sort each tier section by descending edge.
    pub sort_by_edge: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { sort_by_edge: true }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub format: ExportFormat,
    pub null_edge: NullEdge,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: ExportFormat::Csv,
            null_edge: NullEdge::Zero,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.rules.to_rules()?;
        Ok(config)
    }

    /// Apply environment overrides (`PROPSCOUT_OFFLINE`).
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("PROPSCOUT_OFFLINE") {
            self.run.offline = matches!(v.trim(), "1" | "true" | "yes");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_rule_table() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.run.season, "2024-25");
        assert_eq!(cfg.stats.source, StatsSource::NbaApi);
        assert_eq!(cfg.props.source, PropsSource::ActionNetwork);
        assert_eq!(cfg.rules.points.strong_buy, dec!(1.5));
        assert_eq!(cfg.rules.rebounds.consider, dec!(0.3));
        assert_eq!(cfg.rules.assists.avoid, dec!(-1.0));
        assert!(cfg.report.sort_by_edge);
        assert_eq!(cfg.export.format, ExportFormat::Csv);
        assert_eq!(cfg.export.null_edge, NullEdge::Zero);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [run]
            offline = true

            [export]
            format = "json"
            null_edge = "blank"
            output_dir = "reports"
            "#,
        )
        .unwrap();
        assert!(cfg.run.offline);
        assert_eq!(cfg.run.season, "2024-25");
        assert_eq!(cfg.export.format, ExportFormat::Json);
        assert_eq!(cfg.export.null_edge, NullEdge::Blank);
        assert_eq!(cfg.export.output_dir, PathBuf::from("reports"));
        assert_eq!(cfg.rules.points.consider, dec!(0.5));
    }

    #[test]
    fn test_rule_override() {
        let cfg = AppConfig::from_toml(
            r#"
            [rules.points]
            strong_buy = 2.0
            consider = 1.0
            avoid = -1.5
            "#,
        )
        .unwrap();
        let rules = cfg.rules.to_rules().unwrap();
        assert_eq!(rules.points.strong_buy, dec!(2.0));
        assert_eq!(rules.rebounds.strong_buy, dec!(1.2));
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let result = AppConfig::from_toml(
            r#"
            [rules.assists]
            strong_buy = 0.1
            consider = 0.5
            avoid = -1.0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_sources_parse() {
        let cfg = AppConfig::from_toml(
            r#"
            [stats]
            source = "csv"
            csv_path = "stats.csv"

            [props]
            source = "fixture"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.stats.source, StatsSource::Csv);
        assert_eq!(cfg.stats.csv_path, Some(PathBuf::from("stats.csv")));
        assert_eq!(cfg.props.source, PropsSource::Fixture);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let cfg = AppConfig::load_or_default("/tmp/propscout_missing_config_xyz.toml").unwrap();
        assert_eq!(cfg.run.season, "2024-25");
    }
}
