//! Core engine: normalize, match, evaluate.
//!
//! One run is a pure function of the two normalized tables and the rule
//! table; the async fetch happens before this point.

pub mod matcher;
pub mod normalizer;

use chrono::{DateTime, Local};
use tracing::info;

use crate::strategy::edge::EdgeEvaluator;
use crate::strategy::OpportunitySet;
use crate::types::{DataOrigin, EvaluatedLine, PlayerStatRecord, PropLine};
use normalizer::Normalized;

/// Result of one analysis run, consumed by the reporter and exporter.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub generated_at: DateTime<Local>,
    pub stats_origin: DataOrigin,
    pub props_origin: DataOrigin,
    /// Number of players in the stats table.
    pub players: usize,
    /// One entry per prop line, in prop-table order.
    pub lines: Vec<EvaluatedLine>,
}

impl Analysis {
    /// Join props onto stats and evaluate every joined line.
    pub fn run(
        stats: &Normalized<PlayerStatRecord>,
        props: &Normalized<PropLine>,
        evaluator: &EdgeEvaluator,
        generated_at: DateTime<Local>,
    ) -> Self {
        let joined = matcher::match_lines(&props.records, &stats.records);
        let lines = evaluator.evaluate_all(&joined);

        info!(
            lines = lines.len(),
            stats_origin = %stats.origin,
            props_origin = %props.origin,
            "Analysis complete"
        );

        Self {
            generated_at,
            stats_origin: stats.origin,
            props_origin: props.origin,
            players: stats.records.len(),
            lines,
        }
    }

    /// StrongBuy and Consider lines, grouped.
    pub fn opportunities(&self, sort_by_edge: bool) -> OpportunitySet<'_> {
        OpportunitySet::select(&self.lines, sort_by_edge)
    }

    pub fn unmatched(&self) -> usize {
        self.lines.iter().filter(|l| !l.is_matched()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::edge::EdgeRules;
    use crate::types::{PropType, Tier};
    use rust_decimal_macros::dec;

    fn live<T>(records: Vec<T>) -> Normalized<T> {
        Normalized {
            records,
            origin: DataOrigin::Live,
            skipped: 0,
        }
    }

    #[test]
    fn test_run_lebron_points() {
        let stats = live(vec![PlayerStatRecord::sample(
            "LeBron James",
            dec!(25.3),
            dec!(7.3),
            dec!(8.3),
        )]);
        let props = live(vec![
            PropLine::sample("LeBron James", PropType::Points, dec!(23.5)),
            PropLine::sample("Kevin Durant", PropType::Points, dec!(27.5)),
        ]);
        let analysis = Analysis::run(
            &stats,
            &props,
            &EdgeEvaluator::new(EdgeRules::default()),
            Local::now(),
        );

        assert_eq!(analysis.lines.len(), 2);
        assert_eq!(analysis.players, 1);
        assert_eq!(analysis.unmatched(), 1);
        assert_eq!(analysis.lines[0].edge, Some(dec!(1.8)));
        assert_eq!(analysis.lines[0].tier, Tier::StrongBuy);
        assert_eq!(analysis.opportunities(true).len(), 1);
    }
}
