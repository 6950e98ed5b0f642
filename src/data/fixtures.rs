//! Built-in demonstration datasets.
//!
//! Used in offline mode and whenever a live provider fails or returns no
//! usable rows. The report always labels these tables as demo data.
//! Values are already per-game and are not divided again.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{AmericanOdds, PlayerStatRecord, PropLine, PropType};

#[allow(clippy::too_many_arguments)]
fn stat(
    name: &str,
    ppg: Decimal,
    rpg: Decimal,
    apg: Decimal,
    spg: Decimal,
    bpg: Decimal,
    mpg: Decimal,
    games_played: u32,
) -> PlayerStatRecord {
    PlayerStatRecord {
        player_name: name.to_string(),
        ppg,
        rpg,
        apg,
        spg,
        bpg,
        mpg,
        games_played,
    }
}

fn prop(name: &str, prop_type: PropType, line: Decimal, odds: i32, book: &str) -> PropLine {
    PropLine {
        player_name: name.to_string(),
        prop_type,
        prop_line: line,
        odds: AmericanOdds::new_unchecked(odds),
        sportsbook: book.to_string(),
    }
}

/// Demo per-game averages for five players.
pub fn demo_stats() -> Vec<PlayerStatRecord> {
    vec![
        stat("LeBron James", dec!(25.3), dec!(7.3), dec!(8.3), dec!(1.3), dec!(0.5), dec!(35.2), 15),
        stat("Stephen Curry", dec!(28.5), dec!(4.5), dec!(5.2), dec!(0.8), dec!(0.2), dec!(33.8), 18),
        stat("Luka Doncic", dec!(33.5), dec!(8.9), dec!(9.8), dec!(1.4), dec!(0.6), dec!(37.5), 16),
        stat("Nikola Jokic", dec!(26.8), dec!(12.3), dec!(9.2), dec!(1.2), dec!(0.9), dec!(34.1), 17),
        stat("Kevin Durant", dec!(28.2), dec!(6.7), dec!(5.5), dec!(0.9), dec!(1.3), dec!(36.8), 19),
    ]
}

/// Demo prop lines across three books, including one market without an
/// edge rule.
pub fn demo_props() -> Vec<PropLine> {
    vec![
        prop("LeBron James", PropType::Points, dec!(25.5), -110, "DraftKings"),
        prop("LeBron James", PropType::Rebounds, dec!(7.5), 115, "FanDuel"),
        prop("Stephen Curry", PropType::Points, dec!(28.5), -120, "BetMGM"),
        prop("Stephen Curry", PropType::ThreePointers, dec!(4.5), -110, "DraftKings"),
        prop("Luka Doncic", PropType::Points, dec!(32.5), -125, "FanDuel"),
        prop("Luka Doncic", PropType::Assists, dec!(9.5), -110, "BetMGM"),
        prop("Nikola Jokic", PropType::Points, dec!(26.5), -115, "DraftKings"),
        prop("Nikola Jokic", PropType::Rebounds, dec!(11.5), -110, "FanDuel"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_demo_stats_valid() {
        let stats = demo_stats();
        assert_eq!(stats.len(), 5);
        assert!(stats.iter().all(|s| s.games_played > 0));
        let names: HashSet<_> = stats.iter().map(|s| s.player_name.as_str()).collect();
        assert_eq!(names.len(), stats.len());
    }

    #[test]
    fn test_demo_props_reference_demo_players() {
        let names: HashSet<_> = demo_stats().into_iter().map(|s| s.player_name).collect();
        let props = demo_props();
        assert_eq!(props.len(), 8);
        assert!(props.iter().all(|p| names.contains(&p.player_name)));
    }
}
