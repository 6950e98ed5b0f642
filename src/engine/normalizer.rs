//! Provider tables to canonical records.
//!
//! Resolves provider column names, converts stat totals to per-game
//! rates, parses prop lines, and drops rows that cannot be coerced.
//! A failed or empty provider is replaced by the demo fixtures; a table
//! missing required columns is a hard error.

use anyhow::Result;
use rust_decimal::prelude::*;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::data::fixtures;
use crate::data::{PropsProvider, StatsProvider};
use crate::types::{AmericanOdds, DataOrigin, PlayerStatRecord, PropLine, PropType, RawTable, ScoutError};

// ---------------------------------------------------------------------------
// Column aliases
// ---------------------------------------------------------------------------

const PLAYER: &[&str] = &["player_name", "player"];
const PPG: &[&str] = &["ppg", "pts"];
const RPG: &[&str] = &["rpg", "reb"];
const APG: &[&str] = &["apg", "ast"];
const SPG: &[&str] = &["spg", "stl"];
const BPG: &[&str] = &["bpg", "blk"];
const MPG: &[&str] = &["mpg", "min"];
const GAMES: &[&str] = &["games_played", "gp"];

const STATS_COLUMNS: [(&str, &[&str]); 8] = [
    ("player_name", PLAYER),
    ("ppg", PPG),
    ("rpg", RPG),
    ("apg", APG),
    ("spg", SPG),
    ("bpg", BPG),
    ("mpg", MPG),
    ("games_played", GAMES),
];

const PROPS_COLUMNS: [(&str, &[&str]); 5] = [
    ("player_name", PLAYER),
    ("prop_type", &["prop_type", "market", "type"]),
    ("prop_line", &["prop_line", "line"]),
    ("odds", &["odds", "price"]),
    ("sportsbook", &["sportsbook", "book"]),
];

/// Resolve every required column or fail with the full list of missing ones.
fn resolve_columns<const N: usize>(
    table: &RawTable,
    columns: &[(&str, &[&str]); N],
) -> Result<[usize; N], ScoutError> {
    let mut indices = [0usize; N];
    let mut missing = Vec::new();
    for (slot, (canonical, aliases)) in indices.iter_mut().zip(columns.iter()) {
        match table.column_index(aliases) {
            Some(idx) => *slot = idx,
            None => missing.push(canonical.to_string()),
        }
    }
    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(ScoutError::MalformedTable {
            table: table.name.clone(),
            missing,
        })
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim()).ok().map(|d| d.normalize())
}

// ---------------------------------------------------------------------------
// Normalized output
// ---------------------------------------------------------------------------

/// A normalized table and where it came from.
#[derive(Debug, Clone)]
pub struct Normalized<T> {
    pub records: Vec<T>,
    pub origin: DataOrigin,
    /// Rows dropped during coercion.
    pub skipped: usize,
}

impl<T> Normalized<T> {
    fn fallback(records: Vec<T>) -> Self {
        Self {
            records,
            origin: DataOrigin::Fallback,
            skipped: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

pub struct Normalizer;

impl Normalizer {
    /// Convert a stats table of season totals into per-game records.
    ///
    /// Returns the records and the number of skipped rows. Fails only when
    /// a required column is missing.
    pub fn stats_from_table(table: &RawTable) -> Result<(Vec<PlayerStatRecord>, usize), ScoutError> {
        let cols = resolve_columns(table, &STATS_COLUMNS)?;
        let mut seen: HashSet<String> = HashSet::new();
        let mut records = Vec::with_capacity(table.len());
        let mut skipped = 0usize;

        for row in &table.rows {
            match Self::stat_row(row, &cols) {
                Ok(record) => {
                    if !seen.insert(record.player_name.clone()) {
                        warn!(player = %record.player_name, "Duplicate stat record dropped");
                        skipped += 1;
                        continue;
                    }
                    records.push(record);
                }
                Err(e) => {
                    warn!(error = %e, "Skipping stat row");
                    skipped += 1;
                }
            }
        }

        Ok((records, skipped))
    }

    fn stat_row(row: &[String], cols: &[usize; 8]) -> Result<PlayerStatRecord, ScoutError> {
        let player = cell(row, cols[0]).to_string();
        let invalid = |reason: &str| ScoutError::InvalidStatRecord {
            player: if player.is_empty() { "<unnamed>".to_string() } else { player.clone() },
            reason: reason.to_string(),
        };

        if player.is_empty() {
            return Err(invalid("empty player name"));
        }

        let games_raw = cell(row, cols[7]);
        if games_raw.is_empty() {
            return Err(invalid("games_played missing"));
        }
        let games = parse_decimal(games_raw)
            .filter(|g| g.fract().is_zero() && *g >= Decimal::ZERO)
            .and_then(|g| g.to_u32())
            .ok_or_else(|| invalid(&format!("games_played not a count: {games_raw:?}")))?;
        if games == 0 {
            return Err(invalid("games_played is zero"));
        }

        let mut totals = [Decimal::ZERO; 5];
        for (slot, (name, idx)) in totals
            .iter_mut()
            .zip([("ppg", cols[1]), ("rpg", cols[2]), ("apg", cols[3]), ("spg", cols[4]), ("bpg", cols[5])])
        {
            let raw = cell(row, idx);
            *slot = parse_decimal(raw).ok_or_else(|| invalid(&format!("{name} not numeric: {raw:?}")))?;
        }
        let mpg_raw = cell(row, cols[6]);
        let mpg = parse_decimal(mpg_raw).ok_or_else(|| invalid(&format!("mpg not numeric: {mpg_raw:?}")))?;

        let gp = Decimal::from(games);
        let [pts, reb, ast, stl, blk] = totals;
        Ok(PlayerStatRecord {
            player_name: player.clone(),
            ppg: pts / gp,
            rpg: reb / gp,
            apg: ast / gp,
            spg: stl / gp,
            bpg: blk / gp,
            mpg,
            games_played: games,
        })
    }

    /// Parse a props table. Values pass through; only types are coerced.
    pub fn props_from_table(table: &RawTable) -> Result<(Vec<PropLine>, usize), ScoutError> {
        let cols = resolve_columns(table, &PROPS_COLUMNS)?;
        let mut lines = Vec::with_capacity(table.len());
        let mut skipped = 0usize;

        for row in &table.rows {
            match Self::prop_row(row, &cols) {
                Ok(line) => lines.push(line),
                Err(e) => {
                    warn!(error = %e, "Skipping prop row");
                    skipped += 1;
                }
            }
        }

        Ok((lines, skipped))
    }

    fn prop_row(row: &[String], cols: &[usize; 5]) -> Result<PropLine, ScoutError> {
        let player = cell(row, cols[0]).to_string();
        let invalid = |reason: String| ScoutError::InvalidPropLine {
            player: if player.is_empty() { "<unnamed>".to_string() } else { player.clone() },
            reason,
        };

        if player.is_empty() {
            return Err(invalid("empty player name".to_string()));
        }
        let type_raw = cell(row, cols[1]);
        if type_raw.is_empty() {
            return Err(invalid("empty prop type".to_string()));
        }
        let prop_type = type_raw
            .parse::<PropType>()
            .unwrap_or_else(|never| match never {});
        let line_raw = cell(row, cols[2]);
        let prop_line = parse_decimal(line_raw)
            .ok_or_else(|| invalid(format!("prop_line not numeric: {line_raw:?}")))?;
        let odds = cell(row, cols[3])
            .parse::<AmericanOdds>()
            .map_err(|e| invalid(e.to_string()))?;

        Ok(PropLine {
            player_name: player.clone(),
            prop_type,
            prop_line,
            odds,
            sportsbook: cell(row, cols[4]).to_string(),
        })
    }

    /// Fetch and normalize stats. `None` means offline: use the demo fixtures.
    pub async fn load_stats(provider: Option<&dyn StatsProvider>) -> Result<Normalized<PlayerStatRecord>> {
        let Some(provider) = provider else {
            info!("Offline mode, using demo stats");
            return Ok(Normalized::fallback(fixtures::demo_stats()));
        };

        let table = match provider.fetch_stats().await {
            Ok(table) => table,
            Err(e) => {
                if is_malformed(&e) {
                    return Err(e);
                }
                let err = ScoutError::ProviderUnavailable {
                    provider: provider.name().to_string(),
                    message: format!("{e:#}"),
                };
                warn!(error = %err, "Stats provider failed, falling back to demo stats");
                return Ok(Normalized::fallback(fixtures::demo_stats()));
            }
        };

        let (records, skipped) = Self::stats_from_table(&table)?;
        if records.is_empty() {
            warn!(
                provider = provider.name(),
                rows = table.len(),
                skipped,
                "Stats provider returned no usable rows, falling back to demo stats"
            );
            return Ok(Normalized::fallback(fixtures::demo_stats()));
        }

        info!(
            provider = provider.name(),
            players = records.len(),
            skipped,
            "Stats loaded"
        );
        Ok(Normalized {
            records,
            origin: DataOrigin::Live,
            skipped,
        })
    }

    /// Fetch and normalize props. `None` means offline: use the demo fixtures.
    pub async fn load_props(provider: Option<&dyn PropsProvider>) -> Result<Normalized<PropLine>> {
        let Some(provider) = provider else {
            info!("Offline mode, using demo props");
            return Ok(Normalized::fallback(fixtures::demo_props()));
        };

        let table = match provider.fetch_props().await {
            Ok(table) => table,
            Err(e) => {
                if is_malformed(&e) {
                    return Err(e);
                }
                let err = ScoutError::ProviderUnavailable {
                    provider: provider.name().to_string(),
                    message: format!("{e:#}"),
                };
                warn!(error = %err, "Props provider failed, falling back to demo props");
                return Ok(Normalized::fallback(fixtures::demo_props()));
            }
        };

        let (records, skipped) = Self::props_from_table(&table)?;
        if records.is_empty() {
            warn!(
                provider = provider.name(),
                rows = table.len(),
                skipped,
                "Props provider returned no usable rows, falling back to demo props"
            );
            return Ok(Normalized::fallback(fixtures::demo_props()));
        }

        info!(
            provider = provider.name(),
            lines = records.len(),
            skipped,
            "Props loaded"
        );
        Ok(Normalized {
            records,
            origin: DataOrigin::Live,
            skipped,
        })
    }
}

fn is_malformed(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ScoutError>(),
        Some(ScoutError::MalformedTable { .. })
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MockPropsProvider, MockStatsProvider};
    use rust_decimal_macros::dec;

    fn stats_table() -> RawTable {
        let mut t = RawTable::new(
            "stats",
            &["PLAYER", "PTS", "REB", "AST", "STL", "BLK", "MIN", "GP"],
        );
        t.push_row(["LeBron James", "380", "110", "125", "20", "8", "35.2", "15"]);
        t.push_row(["Zero Games", "0", "0", "0", "0", "0", "0", "0"]);
        t.push_row(["No Games", "10", "1", "1", "0", "0", "5.0", ""]);
        t.push_row(["Bad Points", "abc", "1", "1", "0", "0", "5.0", "3"]);
        t
    }

    fn props_table() -> RawTable {
        let mut t = RawTable::new(
            "props",
            &["player_name", "prop_type", "prop_line", "odds", "sportsbook"],
        );
        t.push_row(["LeBron James", "Points", "25.5", "-110", "DraftKings"]);
        t.push_row(["LeBron James", "Three Pointers", "1.5", "+120", "FanDuel"]);
        t.push_row(["Broken Odds", "Points", "20.5", "n/a", "BetMGM"]);
        t
    }

    #[test]
    fn test_stats_divided_by_games() {
        let (records, skipped) = Normalizer::stats_from_table(&stats_table()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(skipped, 3);
        let lebron = &records[0];
        assert_eq!(lebron.player_name, "LeBron James");
        assert_eq!(lebron.games_played, 15);
        assert_eq!(lebron.rpg, dec!(110) / dec!(15));
        assert_eq!(lebron.apg, dec!(125) / dec!(15));
        assert_eq!(lebron.ppg.round_dp(1), dec!(25.3));
        assert_eq!(lebron.mpg, dec!(35.2));
    }

    #[test]
    fn test_canonical_stat_headers_accepted() {
        let mut t = RawTable::new(
            "stats",
            &["player_name", "ppg", "rpg", "apg", "spg", "bpg", "mpg", "games_played"],
        );
        t.push_row(["Nikola Jokic", "510", "230", "175", "23", "17", "34.1", "19"]);
        let (records, skipped) = Normalizer::stats_from_table(&t).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(records[0].rpg, dec!(230) / dec!(19));
    }

    #[test]
    fn test_duplicate_stat_records_first_wins() {
        let mut t = stats_table();
        t.push_row(["LeBron James", "1", "1", "1", "1", "1", "1", "1"]);
        let (records, _) = Normalizer::stats_from_table(&t).unwrap();
        let lebrons: Vec<_> = records.iter().filter(|r| r.player_name == "LeBron James").collect();
        assert_eq!(lebrons.len(), 1);
        assert_eq!(lebrons[0].games_played, 15);
    }

    #[test]
    fn test_missing_stat_column_is_malformed() {
        let t = RawTable::new("stats", &["PLAYER", "PTS", "REB"]);
        let err = Normalizer::stats_from_table(&t).unwrap_err();
        match err {
            ScoutError::MalformedTable { table, missing } => {
                assert_eq!(table, "stats");
                assert!(missing.contains(&"games_played".to_string()));
                assert!(missing.contains(&"apg".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_props_pass_through() {
        let (lines, skipped) = Normalizer::props_from_table(&props_table()).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(skipped, 1);
        assert_eq!(lines[0].prop_type, PropType::Points);
        assert_eq!(lines[0].prop_line, dec!(25.5));
        assert_eq!(lines[0].odds.value(), -110);
        assert_eq!(lines[0].sportsbook, "DraftKings");
        assert_eq!(lines[1].prop_type, PropType::ThreePointers);
    }

    #[test]
    fn test_props_extreme_odds_row_skipped() {
        let mut t = RawTable::new(
            "props",
            &["player_name", "prop_type", "prop_line", "odds", "sportsbook"],
        );
        t.push_row(["LeBron James", "Points", "25.5", "-2147483648", "DraftKings"]);
        t.push_row(["Stephen Curry", "Points", "28.5", "-120", "BetMGM"]);
        let (lines, skipped) = Normalizer::props_from_table(&t).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(skipped, 1);
        assert_eq!(lines[0].player_name, "Stephen Curry");
    }

    #[test]
    fn test_props_missing_column_is_malformed() {
        let t = RawTable::new("props", &["player_name", "prop_type", "prop_line"]);
        assert!(matches!(
            Normalizer::props_from_table(&t),
            Err(ScoutError::MalformedTable { .. })
        ));
    }

    #[tokio::test]
    async fn test_offline_uses_fixtures() {
        let stats = Normalizer::load_stats(None).await.unwrap();
        let props = Normalizer::load_props(None).await.unwrap();
        assert_eq!(stats.origin, DataOrigin::Fallback);
        assert_eq!(props.origin, DataOrigin::Fallback);
        assert!(!stats.records.is_empty());
        assert!(!props.records.is_empty());
    }

    #[tokio::test]
    async fn test_provider_error_falls_back() {
        let mut provider = MockStatsProvider::new();
        provider.expect_name().return_const("mock-stats");
        provider
            .expect_fetch_stats()
            .returning(|| Err(anyhow::anyhow!("connection refused")));

        let stats = Normalizer::load_stats(Some(&provider)).await.unwrap();
        assert_eq!(stats.origin, DataOrigin::Fallback);
        assert_eq!(stats.records, fixtures::demo_stats());
    }

    #[tokio::test]
    async fn test_provider_empty_falls_back() {
        let mut provider = MockPropsProvider::new();
        provider.expect_name().return_const("mock-props");
        provider
            .expect_fetch_props()
            .returning(|| Ok(props_table_header_only()));

        let props = Normalizer::load_props(Some(&provider)).await.unwrap();
        assert_eq!(props.origin, DataOrigin::Fallback);
        assert_eq!(props.records, fixtures::demo_props());
    }

    fn props_table_header_only() -> RawTable {
        RawTable::new(
            "props",
            &["player_name", "prop_type", "prop_line", "odds", "sportsbook"],
        )
    }

    #[tokio::test]
    async fn test_live_stats_kept() {
        let mut provider = MockStatsProvider::new();
        provider.expect_name().return_const("mock-stats");
        provider.expect_fetch_stats().returning(|| Ok(stats_table()));

        let stats = Normalizer::load_stats(Some(&provider)).await.unwrap();
        assert_eq!(stats.origin, DataOrigin::Live);
        assert_eq!(stats.records.len(), 1);
        assert_eq!(stats.skipped, 3);
    }

    #[tokio::test]
    async fn test_malformed_table_is_fatal() {
        let mut provider = MockStatsProvider::new();
        provider.expect_name().return_const("mock-stats");
        provider
            .expect_fetch_stats()
            .returning(|| Ok(RawTable::new("stats", &["PLAYER"])));

        let result = Normalizer::load_stats(Some(&provider)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_malformed_error_from_provider_is_fatal() {
        let mut provider = MockPropsProvider::new();
        provider.expect_name().return_const("mock-props");
        provider.expect_fetch_props().returning(|| {
            Err(ScoutError::MalformedTable {
                table: "props".into(),
                missing: vec!["odds".into()],
            }
            .into())
        });

        let result = Normalizer::load_props(Some(&provider)).await;
        assert!(result.is_err());
    }
}
