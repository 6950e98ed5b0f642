//! Edge evaluation and opportunity selection.

pub mod edge;

use std::cmp::Ordering;

use tracing::info;

use crate::types::{EvaluatedLine, Tier};

// ---------------------------------------------------------------------------
// Opportunity set
// ---------------------------------------------------------------------------

/// Evaluated lines grouped by the tiers that count as opportunities.
///
/// Borrowed from the evaluated table; building it never mutates or
/// reorders the table itself.
#[derive(Debug, Clone, Default)]
pub struct OpportunitySet<'a> {
    pub strong_buy: Vec<&'a EvaluatedLine>,
    pub consider: Vec<&'a EvaluatedLine>,
}

impl<'a> OpportunitySet<'a> {
    /// Partition evaluated lines into StrongBuy and Consider groups.
    ///
    /// Lines without an edge (unmatched, or a prop type with no rule) are
    /// never included. With `sort_by_edge`, each group is ordered by
    /// descending edge; ties keep input order.
    pub fn select(lines: &'a [EvaluatedLine], sort_by_edge: bool) -> Self {
        let mut set = OpportunitySet::default();
        for line in lines.iter().filter(|l| l.is_opportunity()) {
            match line.tier {
                Tier::StrongBuy => set.strong_buy.push(line),
                Tier::Consider => set.consider.push(line),
                Tier::Neutral | Tier::Avoid => {}
            }
        }

        if sort_by_edge {
            set.strong_buy.sort_by(|a, b| by_edge_desc(a, b));
            set.consider.sort_by(|a, b| by_edge_desc(a, b));
        }

        info!(
            lines_in = lines.len(),
            strong_buy = set.strong_buy.len(),
            consider = set.consider.len(),
            "Opportunity selection complete"
        );

        set
    }

    /// StrongBuy + Consider count.
    pub fn len(&self) -> usize {
        self.strong_buy.len() + self.consider.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn by_edge_desc(a: &EvaluatedLine, b: &EvaluatedLine) -> Ordering {
    b.edge.cmp(&a.edge)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
