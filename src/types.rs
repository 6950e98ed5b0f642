//! Shared types for the PROPSCOUT engine.
//!
//! These types form the data model used across all modules: the raw
//! provider tables, the canonical per-game records, and the evaluated
//! lines handed to the reporter and exporter.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Raw provider tables
// ---------------------------------------------------------------------------

/// A provider table before normalization: header names plus string cells.
///
/// Both the NBA stats JSON (`headers` + `rowSet`) and local CSV files map
/// onto this shape, so the normalizer only has one input format to validate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Table label used in logs and errors ("stats" | "props").
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(name: &str, headers: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row. Short rows are padded with empty cells.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells.into_iter().map(Into::into).collect();
        if row.len() < self.headers.len() {
            row.resize(self.headers.len(), String::new());
        }
        self.rows.push(row);
    }

    /// Index of the first header matching any alias (case-insensitive).
    pub fn column_index(&self, aliases: &[&str]) -> Option<usize> {
        self.headers.iter().position(|h| {
            let h = h.trim();
            aliases.iter().any(|a| h.eq_ignore_ascii_case(a))
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Prop market type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropType {
    Points,
    Rebounds,
    Assists,
    ThreePointers,
    /// Any market without an edge rule, kept under its provider label.
    Other(String),
}

impl PropType {
    /// Upper-case label used in report entries ("POINTS").
    pub fn label_upper(&self) -> String {
        self.to_string().to_uppercase()
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropType::Points => write!(f, "Points"),
            PropType::Rebounds => write!(f, "Rebounds"),
            PropType::Assists => write!(f, "Assists"),
            PropType::ThreePointers => write!(f, "Three Pointers"),
            PropType::Other(label) => write!(f, "{label}"),
        }
    }
}

/// Parse a provider market label. Unknown labels become `Other`.
impl FromStr for PropType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Ok(match label.to_lowercase().as_str() {
            "points" | "pts" | "player points" => PropType::Points,
            "rebounds" | "reb" | "player rebounds" => PropType::Rebounds,
            "assists" | "ast" | "player assists" => PropType::Assists,
            "three pointers" | "threes" | "3-pointers" | "3pm" | "three pointers made" => {
                PropType::ThreePointers
            }
            _ => PropType::Other(label.to_string()),
        })
    }
}

/// Recommendation tier.
///
/// Variant order is the tier ordering: `Avoid < Neutral < Consider < StrongBuy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Avoid,
    Neutral,
    Consider,
    StrongBuy,
}

impl Tier {
    /// StrongBuy and Consider are the tiers reported as opportunities.
    pub fn is_opportunity(&self) -> bool {
        matches!(self, Tier::StrongBuy | Tier::Consider)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::StrongBuy => write!(f, "STRONG BUY"),
            Tier::Consider => write!(f, "CONSIDER"),
            Tier::Neutral => write!(f, "NEUTRAL"),
            Tier::Avoid => write!(f, "AVOID"),
        }
    }
}

/// Where a normalized table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataOrigin {
    Live,
    /// Built-in demonstration dataset, used when the provider failed or
    /// returned no usable rows.
    Fallback,
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataOrigin::Live => write!(f, "live"),
            DataOrigin::Fallback => write!(f, "fallback demo data"),
        }
    }
}

// ---------------------------------------------------------------------------
// American odds
// ---------------------------------------------------------------------------

/// Largest odds magnitude accepted from a provider (+1000000 is 10000-to-1).
const MAX_ODDS_MAGNITUDE: u32 = 1_000_000;

/// American odds, e.g. `-110` or `+120`. Magnitude is between 100 and
/// `MAX_ODDS_MAGNITUDE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmericanOdds(i32);

impl AmericanOdds {
    pub fn new(value: i32) -> Result<Self, ScoutError> {
        let magnitude = value.unsigned_abs();
        if !(100..=MAX_ODDS_MAGNITUDE).contains(&magnitude) {
            return Err(ScoutError::InvalidOdds(value.to_string()));
        }
        Ok(Self(value))
    }

    /// For literals known to be valid (fixtures).
    pub(crate) const fn new_unchecked(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for AmericanOdds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 > 0 {
            write!(f, "+{}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for AmericanOdds {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if raw.eq_ignore_ascii_case("even") || raw.eq_ignore_ascii_case("ev") {
            return Ok(Self(100));
        }
        // Normalise unicode minus signs some books render.
        let cleaned = raw.replace('\u{2212}', "-");
        let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
        let value: i32 = digits
            .parse()
            .map_err(|_| ScoutError::InvalidOdds(raw.to_string()))?;
        Self::new(value).map_err(|_| ScoutError::InvalidOdds(raw.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Canonical records
// ---------------------------------------------------------------------------

/// Per-game season averages for one player. `player_name` is unique per table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatRecord {
    pub player_name: String,
    pub ppg: Decimal,
    pub rpg: Decimal,
    pub apg: Decimal,
    pub spg: Decimal,
    pub bpg: Decimal,
    pub mpg: Decimal,
    pub games_played: u32,
}

impl PlayerStatRecord {
    /// The per-game average compared against a prop of this type, if the
    /// type has an edge rule.
    pub fn average_for(&self, prop_type: &PropType) -> Option<Decimal> {
        match prop_type {
            PropType::Points => Some(self.ppg),
            PropType::Rebounds => Some(self.rpg),
            PropType::Assists => Some(self.apg),
            PropType::ThreePointers | PropType::Other(_) => None,
        }
    }

    /// Helper to build a test record with sensible defaults.
    #[cfg(test)]
    pub fn sample(name: &str, ppg: Decimal, rpg: Decimal, apg: Decimal) -> Self {
        PlayerStatRecord {
            player_name: name.to_string(),
            ppg,
            rpg,
            apg,
            spg: Decimal::ONE,
            bpg: Decimal::ONE,
            mpg: Decimal::from(34),
            games_played: 15,
        }
    }
}

/// A posted player prop line. Not unique: one player may have many lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropLine {
    pub player_name: String,
    pub prop_type: PropType,
    pub prop_line: Decimal,
    pub odds: AmericanOdds,
    pub sportsbook: String,
}

impl fmt::Display for PropLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} o{} ({} @ {})",
            self.player_name, self.prop_type, self.prop_line, self.odds, self.sportsbook
        )
    }
}

impl PropLine {
    #[cfg(test)]
    pub fn sample(name: &str, prop_type: PropType, line: Decimal) -> Self {
        PropLine {
            player_name: name.to_string(),
            prop_type,
            prop_line: line,
            odds: AmericanOdds(-110),
            sportsbook: "DraftKings".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline rows
// ---------------------------------------------------------------------------

/// A prop line after the left join. `stats` is `None` when no record matched.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedLine {
    pub prop: PropLine,
    pub stats: Option<PlayerStatRecord>,
}

/// A joined line with its computed edge and tier.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedLine {
    pub prop: PropLine,
    pub stats: Option<PlayerStatRecord>,
    /// Per-game average the line was compared against.
    pub average: Option<Decimal>,
    /// `average - prop_line`. `None` when unmatched or the prop type has no rule.
    pub edge: Option<Decimal>,
    pub tier: Tier,
}

impl EvaluatedLine {
    pub fn is_matched(&self) -> bool {
        self.stats.is_some()
    }

    /// Only lines with a computed edge can be opportunities.
    pub fn is_opportunity(&self) -> bool {
        self.edge.is_some() && self.tier.is_opportunity()
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for PROPSCOUT.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    /// Fatal: the table cannot be interpreted at all.
    #[error("Malformed {table} table: missing required column(s) {missing:?}")]
    MalformedTable { table: String, missing: Vec<String> },

    #[error("Invalid stat record for {player}: {reason}")]
    InvalidStatRecord { player: String, reason: String },

    #[error("Invalid prop line for {player}: {reason}")]
    InvalidPropLine { player: String, reason: String },

    #[error("No stat record for {0}")]
    MissingStat(String),

    #[error("Provider unavailable ({provider}): {message}")]
    ProviderUnavailable { provider: String, message: String },

    #[error("Invalid American odds: {0:?}")]
    InvalidOdds(String),

    #[error("Invalid edge rules: {0}")]
    InvalidRules(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
