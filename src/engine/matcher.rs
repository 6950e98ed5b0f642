//! Left join of prop lines onto stat records.
//!
//! Join key is the exact, case-sensitive `player_name`. Unmatched lines
//! survive with no stats; the output always has one row per prop line,
//! in input order.

use std::collections::HashMap;
use tracing::{debug, info};

use crate::types::{JoinedLine, PlayerStatRecord, PropLine, ScoutError};

/// Join every prop line to at most one stat record.
pub fn match_lines(props: &[PropLine], stats: &[PlayerStatRecord]) -> Vec<JoinedLine> {
    // First record wins if the table somehow carries duplicates.
    let mut by_name: HashMap<&str, &PlayerStatRecord> = HashMap::with_capacity(stats.len());
    for record in stats {
        by_name.entry(record.player_name.as_str()).or_insert(record);
    }

    let joined: Vec<JoinedLine> = props
        .iter()
        .map(|prop| {
            let stats = by_name.get(prop.player_name.as_str()).map(|r| (*r).clone());
            if stats.is_none() {
                debug!(reason = %ScoutError::MissingStat(prop.player_name.clone()), "Prop left unmatched");
            }
            JoinedLine {
                prop: prop.clone(),
                stats,
            }
        })
        .collect();

    let matched = joined.iter().filter(|j| j.stats.is_some()).count();
    info!(
        props = props.len(),
        players = stats.len(),
        matched,
        unmatched = joined.len() - matched,
        "Join complete"
    );

    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PropType;
    use rust_decimal_macros::dec;

    fn stats() -> Vec<PlayerStatRecord> {
        vec![
            PlayerStatRecord::sample("LeBron James", dec!(25.3), dec!(7.3), dec!(8.3)),
            PlayerStatRecord::sample("Stephen Curry", dec!(28.5), dec!(4.5), dec!(5.2)),
        ]
    }

    #[test]
    fn test_left_join_keeps_every_prop() {
        let props = vec![
            PropLine::sample("LeBron James", PropType::Points, dec!(25.5)),
            PropLine::sample("LeBron James", PropType::Rebounds, dec!(7.5)),
            PropLine::sample("Kevin Durant", PropType::Points, dec!(27.5)),
            PropLine::sample("Stephen Curry", PropType::ThreePointers, dec!(4.5)),
        ];
        let joined = match_lines(&props, &stats());
        assert_eq!(joined.len(), props.len());
        for (j, p) in joined.iter().zip(&props) {
            assert_eq!(&j.prop, p);
        }
        assert!(joined[0].stats.is_some());
        assert!(joined[1].stats.is_some());
        assert!(joined[2].stats.is_none());
        assert_eq!(joined[3].stats.as_ref().unwrap().player_name, "Stephen Curry");
    }

    #[test]
    fn test_match_is_case_sensitive_and_exact() {
        let props = vec![
            PropLine::sample("lebron james", PropType::Points, dec!(25.5)),
            PropLine::sample("LeBron James Jr.", PropType::Points, dec!(25.5)),
            PropLine::sample("LeBron James ", PropType::Points, dec!(25.5)),
        ];
        let joined = match_lines(&props, &stats());
        assert!(joined.iter().all(|j| j.stats.is_none()));
    }

    #[test]
    fn test_empty_inputs() {
        assert!(match_lines(&[], &stats()).is_empty());
        let props = vec![PropLine::sample("LeBron James", PropType::Points, dec!(25.5))];
        let joined = match_lines(&props, &[]);
        assert_eq!(joined.len(), 1);
        assert!(joined[0].stats.is_none());
    }

    #[test]
    fn test_duplicate_stats_do_not_duplicate_rows() {
        let mut dup = stats();
        dup.push(PlayerStatRecord::sample("LeBron James", dec!(1), dec!(1), dec!(1)));
        let props = vec![PropLine::sample("LeBron James", PropType::Points, dec!(25.5))];
        let joined = match_lines(&props, &dup);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].stats.as_ref().unwrap().ppg, dec!(25.3));
    }
}
