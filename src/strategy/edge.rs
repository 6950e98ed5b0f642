//! Edge evaluation.
//!
//! Compares a player's per-game average to the posted line and buckets
//! the difference into a recommendation tier using per-prop-type
//! thresholds.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, warn};

use crate::types::{EvaluatedLine, JoinedLine, PropType, ScoutError, Tier};

// ---------------------------------------------------------------------------
// Configuration (defaults, overridden by config.toml at runtime)
// ---------------------------------------------------------------------------

/// Tier boundaries for one prop type, in the units of the stat.
///
/// All comparisons are strict: an edge exactly on a boundary falls into
/// the lower tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    /// StrongBuy if edge > this.
    pub strong_buy: Decimal,
    /// Consider if edge > this.
    pub consider: Decimal,
    /// Avoid if edge < this.
    pub avoid: Decimal,
}

impl Threshold {
    /// Classify an edge. StrongBuy is checked first, then Consider, then Avoid.
    pub fn classify(&self, edge: Decimal) -> Tier {
        if edge > self.strong_buy {
            Tier::StrongBuy
        } else if edge > self.consider {
            Tier::Consider
        } else if edge < self.avoid {
            Tier::Avoid
        } else {
            Tier::Neutral
        }
    }
}

/// The rule table: which prop types get an edge and where the tiers split.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRules {
    pub points: Threshold,
    pub rebounds: Threshold,
    pub assists: Threshold,
}

impl Default for EdgeRules {
    fn default() -> Self {
        Self {
            points: Threshold { strong_buy: dec!(1.5), consider: dec!(0.5), avoid: dec!(-1.0) },
            rebounds: Threshold { strong_buy: dec!(1.2), consider: dec!(0.3), avoid: dec!(-1.0) },
            assists: Threshold { strong_buy: dec!(1.0), consider: dec!(0.2), avoid: dec!(-1.0) },
        }
    }
}

impl EdgeRules {
    /// Thresholds for a prop type. `None` means no edge is computed.
    pub fn threshold_for(&self, prop_type: &PropType) -> Option<&Threshold> {
        match prop_type {
            PropType::Points => Some(&self.points),
            PropType::Rebounds => Some(&self.rebounds),
            PropType::Assists => Some(&self.assists),
            PropType::ThreePointers | PropType::Other(_) => None,
        }
    }

    /// Each row must satisfy `strong_buy > consider >= 0 > avoid`.
    pub fn validate(&self) -> Result<(), ScoutError> {
        for (name, t) in [
            ("points", &self.points),
            ("rebounds", &self.rebounds),
            ("assists", &self.assists),
        ] {
            if t.strong_buy <= t.consider {
                return Err(ScoutError::InvalidRules(format!(
                    "{name}: strong_buy ({}) must exceed consider ({})",
                    t.strong_buy, t.consider
                )));
            }
            if t.consider < Decimal::ZERO {
                return Err(ScoutError::InvalidRules(format!(
                    "{name}: consider ({}) must not be negative",
                    t.consider
                )));
            }
            if t.avoid >= Decimal::ZERO {
                return Err(ScoutError::InvalidRules(format!(
                    "{name}: avoid ({}) must be negative",
                    t.avoid
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Maps joined lines to evaluated lines. Stateless apart from its rules.
pub struct EdgeEvaluator {
    rules: EdgeRules,
}

impl EdgeEvaluator {
    pub fn new(rules: EdgeRules) -> Self {
        Self { rules }
    }

    /// Access the rule table.
    pub fn rules(&self) -> &EdgeRules {
        &self.rules
    }

    /// Evaluate every joined line. Output order and length match the input.
    pub fn evaluate_all(&self, joined: &[JoinedLine]) -> Vec<EvaluatedLine> {
        joined.iter().map(|line| self.evaluate(line)).collect()
    }

    /// Compute the edge and tier of a single line.
    pub fn evaluate(&self, line: &JoinedLine) -> EvaluatedLine {
        let prop = &line.prop;
        let average = line
            .stats
            .as_ref()
            .and_then(|s| s.average_for(&prop.prop_type));

        let (edge, tier) = match (average, self.rules.threshold_for(&prop.prop_type)) {
            (Some(avg), Some(threshold)) => {
                let Some(edge) = avg.checked_sub(prop.prop_line) else {
                    warn!(
                        player = %prop.player_name,
                        line = %prop.prop_line,
                        average = %avg,
                        "Edge out of range, line left unrated"
                    );
                    return EvaluatedLine {
                        prop: prop.clone(),
                        stats: line.stats.clone(),
                        average,
                        edge: None,
                        tier: Tier::Neutral,
                    };
                };
                let tier = threshold.classify(edge);
                debug!(
                    player = %prop.player_name,
                    prop_type = %prop.prop_type,
                    line = %prop.prop_line,
                    average = %avg,
                    edge = %edge,
                    tier = %tier,
                    "Edge computed"
                );
                (Some(edge), tier)
            }
            _ => (None, Tier::Neutral),
        };

        EvaluatedLine {
            prop: prop.clone(),
            stats: line.stats.clone(),
            average,
            edge,
            tier,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
