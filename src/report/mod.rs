//! Text report.
//!
//! Renders an `Analysis` as the human-readable summary: header, counts,
//! then the STRONG BUY and CONSIDER sections.

use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

use crate::engine::Analysis;
use crate::strategy::OpportunitySet;
use crate::types::{EvaluatedLine, Tier};

const RULE_WIDTH: usize = 70;

/// Shown in place of both sections when nothing qualifies.
pub const NO_OPPORTUNITIES: &str = "No betting opportunities found.";

/// One decimal place, halves rounded away from zero.
fn one_dp(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Report over a finished analysis. Borrowed; rendering never changes it.
pub struct Report<'a> {
    analysis: &'a Analysis,
    opportunities: OpportunitySet<'a>,
}

impl<'a> Report<'a> {
    pub fn new(analysis: &'a Analysis, sort_by_edge: bool) -> Self {
        Self {
            analysis,
            opportunities: analysis.opportunities(sort_by_edge),
        }
    }

    /// StrongBuy + Consider.
    pub fn opportunity_count(&self) -> usize {
        self.opportunities.len()
    }

    pub fn avoid_count(&self) -> usize {
        self.analysis
            .lines
            .iter()
            .filter(|l| l.tier == Tier::Avoid)
            .count()
    }

    fn write_section(
        f: &mut fmt::Formatter<'_>,
        title: &str,
        lines: &[&EvaluatedLine],
    ) -> fmt::Result {
        if lines.is_empty() {
            return Ok(());
        }
        writeln!(f)?;
        writeln!(f, "{title} ({} found)", lines.len())?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;
        for line in lines {
            writeln!(f, "{}", entry(line))?;
            writeln!(f, "  Odds: {} | Book: {}", line.prop.odds, line.prop.sportsbook)?;
        }
        Ok(())
    }
}

/// `"<player> - <TYPE>, Line <line>, Avg <avg>, Edge +<edge>"`, each
/// number to one decimal place.
///
/// Only called for opportunities, which always carry an average and a
/// positive edge.
pub fn entry(line: &EvaluatedLine) -> String {
    let avg = line.average.map(one_dp).unwrap_or_default();
    let edge = line.edge.map(one_dp).unwrap_or_default();
    format!(
        "{} - {}, Line {:.1}, Avg {:.1}, Edge +{:.1}",
        line.prop.player_name,
        line.prop.prop_type.label_upper(),
        one_dp(line.prop.prop_line),
        avg,
        edge,
    )
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.analysis;
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "{rule}")?;
        writeln!(f, "NBA PLAYER PROP BETTING REPORT")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Generated: {}", a.generated_at.format("%Y-%m-%d %H:%M"))?;
        writeln!(f, "Stats data: {} | Props data: {}", a.stats_origin, a.props_origin)?;
        writeln!(f, "Total props analyzed: {}", a.lines.len())?;
        writeln!(f, "Opportunities found: {}", self.opportunity_count())?;
        writeln!(f, "Unmatched lines: {}", a.unmatched())?;
        writeln!(f, "Avoid: {}", self.avoid_count())?;
        writeln!(f, "{rule}")?;

        if self.opportunities.is_empty() {
            writeln!(f)?;
            return writeln!(f, "{NO_OPPORTUNITIES}");
        }

        Self::write_section(f, "STRONG BUY", &self.opportunities.strong_buy)?;
        Self::write_section(f, "CONSIDER", &self.opportunities.consider)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use crate::engine::normalizer::Normalized;
    use crate::strategy::edge::{EdgeEvaluator, EdgeRules};
    use crate::types::{DataOrigin, PlayerStatRecord, PropLine, PropType};
    use chrono::{Local, TimeZone};
    use rust_decimal_macros::dec;

    fn analysis(stats: Vec<PlayerStatRecord>, props: Vec<PropLine>) -> Analysis {
        Analysis::run(
            &Normalized { records: stats, origin: DataOrigin::Live, skipped: 0 },
            &Normalized { records: props, origin: DataOrigin::Fallback, skipped: 0 },
            &EdgeEvaluator::new(EdgeRules::default()),
            Local.with_ymd_and_hms(2025, 1, 7, 9, 5, 0).single().unwrap(),
        )
    }

    #[test]
    fn test_lebron_entry() {
        let a = analysis(
            vec![PlayerStatRecord::sample("LeBron James", dec!(25.3), dec!(7.3), dec!(8.3))],
            vec![PropLine::sample("LeBron James", PropType::Points, dec!(23.5))],
        );
        let text = Report::new(&a, true).to_string();
        assert!(text.contains("LeBron James - POINTS, Line 23.5, Avg 25.3, Edge +1.8"));
        assert!(text.contains("  Odds: -110 | Book: DraftKings"));
        assert!(text.contains("STRONG BUY (1 found)"));
        assert!(!text.contains("CONSIDER"));
        assert!(text.contains("Generated: 2025-01-07 09:05"));
        assert!(text.contains("Stats data: live | Props data: fallback demo data"));
    }

    #[test]
    fn test_no_opportunities() {
        let a = analysis(
            vec![PlayerStatRecord::sample("LeBron James", dec!(25.3), dec!(7.3), dec!(8.3))],
            vec![
                PropLine::sample("LeBron James", PropType::Points, dec!(25.5)),
                PropLine::sample("Kevin Durant", PropType::Points, dec!(27.5)),
            ],
        );
        let report = Report::new(&a, true);
        assert_eq!(report.opportunity_count(), 0);
        let text = report.to_string();
        assert!(text.contains("Opportunities found: 0"));
        assert!(text.contains("Unmatched lines: 1"));
        assert!(text.contains(NO_OPPORTUNITIES));
        assert!(!text.contains("STRONG BUY"));
    }

    #[test]
    fn test_demo_data_report() {
        let a = analysis(fixtures::demo_stats(), fixtures::demo_props());
        let report = Report::new(&a, true);
        assert_eq!(report.opportunity_count(), 3);
        assert_eq!(report.avoid_count(), 0);

        let text = report.to_string();
        assert!(text.contains("Total props analyzed: 8"));
        assert!(text.contains("CONSIDER (3 found)"));
        // Sorted by edge: Luka points (+1.0) leads.
        let luka = text.find("Luka Doncic - POINTS").unwrap();
        let jokic = text.find("Nikola Jokic - REBOUNDS").unwrap();
        let assists = text.find("Luka Doncic - ASSISTS").unwrap();
        assert!(luka < jokic && jokic < assists);
    }

    #[test]
    fn test_entry_whole_number_line_keeps_decimal() {
        let a = analysis(
            vec![PlayerStatRecord::sample("A", dec!(27), dec!(1), dec!(1))],
            vec![PropLine::sample("A", PropType::Points, dec!(25.0).normalize())],
        );
        assert_eq!(entry(&a.lines[0]), "A - POINTS, Line 25.0, Avg 27.0, Edge +2.0");
    }

    #[test]
    fn test_entry_rounds_half_away_from_zero() {
        let a = analysis(
            vec![PlayerStatRecord::sample("A", dec!(22.25), dec!(1), dec!(1))],
            vec![PropLine::sample("A", PropType::Points, dec!(20.5))],
        );
        // edge 1.75 -> +1.8, avg 22.25 -> 22.3
        assert_eq!(entry(&a.lines[0]), "A - POINTS, Line 20.5, Avg 22.3, Edge +1.8");
    }
}
