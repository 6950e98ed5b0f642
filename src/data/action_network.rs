//! Action Network props scraper.
//!
//! Fetches the public NBA props page, flattens its visible text, and scans
//! for `<player> <market> O|Over <line> <odds>` sequences. Player names are
//! recognised only when they resolve through the `PlayerRegistry`, so the
//! output is keyed by canonical names the matcher can join on.
//!
//! Under lines are ignored: the engine evaluates the over side only.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::*;
use scraper::Html;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, info};

use super::registry::{fold_name, PlayerRegistry};
use super::PropsProvider;
use crate::types::{AmericanOdds, PropType, RawTable};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const PROVIDER_NAME: &str = "action-network";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Name suffix tokens skipped between a player name and the market.
const NAME_SUFFIXES: &[&str] = &["jr", "sr", "ii", "iii", "iv"];

// ---------------------------------------------------------------------------
// Text extraction
// ---------------------------------------------------------------------------

/// Visible text of a page, one space between text nodes. Script and style
/// contents are skipped.
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .map(|name| matches!(name, "script" | "style" | "noscript"))
            .unwrap_or(false);
        if hidden {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(trimmed);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Token scan
// ---------------------------------------------------------------------------

struct Token<'a> {
    raw: &'a str,
    folded: String,
}

/// Split `Gilgeous-Alexander` into its words so they line up with the
/// registry keys, where hyphens fold to spaces. Tokens that start with a
/// sign or digit (`-110`) are left whole.
fn split_hyphenated(raw: &str) -> Vec<&str> {
    if raw.starts_with(char::is_alphabetic) && raw.contains('-') {
        raw.split('-').filter(|part| !part.is_empty()).collect()
    } else {
        vec![raw]
    }
}

/// Registry keys indexed by their first word.
fn index_registry(registry: &PlayerRegistry) -> HashMap<String, Vec<(Vec<String>, String)>> {
    let mut index: HashMap<String, Vec<(Vec<String>, String)>> = HashMap::new();
    for (key, canonical) in registry.keys_longest_first() {
        let words: Vec<String> = key.split(' ').map(str::to_string).collect();
        if let Some(first) = words.first().cloned() {
            index.entry(first).or_default().push((words, canonical.to_string()));
        }
    }
    index
}

fn parse_number(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim_matches(|c: char| !(c.is_ascii_digit() || c == '.'));
    Decimal::from_str(trimmed).ok().map(|d| d.normalize())
}

/// Market label at `pos`, with the number of tokens it spans.
fn parse_market(tokens: &[Token], pos: usize) -> Option<(PropType, usize)> {
    if let (Some(a), Some(b)) = (tokens.get(pos), tokens.get(pos + 1)) {
        let two = format!("{} {}", a.folded, b.folded);
        let parsed = two.parse::<PropType>().unwrap_or_else(|never| match never {});
        if !matches!(parsed, PropType::Other(_)) {
            return Some((parsed, 2));
        }
    }
    let one = tokens.get(pos)?;
    match one.folded.parse::<PropType>().unwrap_or_else(|never| match never {}) {
        PropType::Other(_) => None,
        parsed => Some((parsed, 1)),
    }
}

/// Over line at `pos` ("O 25.5", "Over 25.5" or "o25.5"), with tokens used.
/// Returns `None` for under lines and anything else.
fn parse_over_line(tokens: &[Token], pos: usize) -> Option<(Decimal, usize)> {
    let tok = tokens.get(pos)?;
    let lower = tok.raw.to_ascii_lowercase();
    if lower == "o" || lower == "over" {
        let line = parse_number(tokens.get(pos + 1)?.raw)?;
        return Some((line, 2));
    }
    let rest = lower.strip_prefix('o')?;
    if rest.starts_with(|c: char| c.is_ascii_digit()) {
        return parse_number(rest).map(|line| (line, 1));
    }
    None
}

/// Scan page text for over lines of registered players.
///
/// Returns a props table with canonical headers. Identical lines are
/// emitted once.
pub fn scan_props(text: &str, registry: &PlayerRegistry, sportsbook: &str) -> RawTable {
    let mut table = RawTable::new(
        "props",
        &["player_name", "prop_type", "prop_line", "odds", "sportsbook"],
    );
    let tokens: Vec<Token> = text
        .split_whitespace()
        .flat_map(split_hyphenated)
        .map(|raw| Token {
            raw,
            folded: fold_name(raw),
        })
        .collect();
    let index = index_registry(registry);
    let mut seen: HashSet<(String, String, Decimal, i32)> = HashSet::new();

    let mut i = 0;
    while i < tokens.len() {
        let Some(candidates) = index.get(&tokens[i].folded) else {
            i += 1;
            continue;
        };

        let matched = candidates.iter().find(|(words, _)| {
            words
                .iter()
                .enumerate()
                .all(|(k, w)| tokens.get(i + k).map(|t| &t.folded == w).unwrap_or(false))
        });
        let Some((words, canonical)) = matched else {
            i += 1;
            continue;
        };

        let mut pos = i + words.len();
        while tokens
            .get(pos)
            .map(|t| NAME_SUFFIXES.contains(&t.folded.as_str()))
            .unwrap_or(false)
        {
            pos += 1;
        }

        let parsed = parse_market(&tokens, pos).and_then(|(prop_type, used)| {
            let (line, used_line) = parse_over_line(&tokens, pos + used)?;
            let odds_tok = tokens.get(pos + used + used_line)?;
            let odds = odds_tok.raw.parse::<AmericanOdds>().ok()?;
            Some((prop_type, line, odds, used + used_line + 1))
        });

        match parsed {
            Some((prop_type, line, odds, used)) => {
                let key = (canonical.clone(), prop_type.to_string(), line, odds.value());
                if seen.insert(key) {
                    table.push_row([
                        canonical.clone(),
                        prop_type.to_string(),
                        line.to_string(),
                        odds.to_string(),
                        sportsbook.to_string(),
                    ]);
                }
                i = pos + used;
            }
            None => i += words.len(),
        }
    }

    debug!(lines = table.len(), tokens = tokens.len(), "Props page scanned");
    table
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct ActionNetworkScraper {
    http: Client,
    url: String,
    sportsbook: String,
    registry: PlayerRegistry,
}

impl ActionNetworkScraper {
    pub fn new(url: &str, sportsbook: &str, timeout_secs: u64, registry: PlayerRegistry) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build props HTTP client")?;
        Ok(Self {
            http,
            url: url.to_string(),
            sportsbook: sportsbook.to_string(),
            registry,
        })
    }
}

#[async_trait]
impl PropsProvider for ActionNetworkScraper {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_props(&self) -> Result<RawTable> {
        debug!(url = %self.url, players = self.registry.len(), "Fetching props page");

        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("Props page request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Props page returned HTTP {status}");
        }

        let html = resp.text().await.context("Failed to read props page body")?;
        let text = page_text(&html);
        let table = scan_props(&text, &self.registry, &self.sportsbook);

        info!(
            bytes = html.len(),
            lines = table.len(),
            "Props page parsed"
        );
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures;
    use rust_decimal_macros::dec;

    fn registry() -> PlayerRegistry {
        let mut r = PlayerRegistry::from_records(&fixtures::demo_stats());
        r.insert("Jaren Jackson Jr.");
        r
    }

    #[test]
    fn test_page_text_skips_scripts() {
        let html = r#"<html><head><style>.x{}</style></head><body>
            <div>LeBron James</div><script>var x = "Points O 99.5 -110";</script>
            <span>Points</span></body></html>"#;
        let text = page_text(html);
        assert!(text.contains("LeBron James"));
        assert!(text.contains("Points"));
        assert!(!text.contains("99.5"));
        assert!(!text.contains(".x{}"));
    }

    #[test]
    fn test_scan_basic_over_line() {
        let text = "Today LeBron James Points O 25.5 -110 more text";
        let table = scan_props(text, &registry(), "Action Network");
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows[0],
            vec!["LeBron James", "Points", "25.5", "-110", "Action Network"]
        );
    }

    #[test]
    fn test_scan_resolves_diacritics_and_compact_line() {
        let text = "Luka Dončić Assists o9.5 +105";
        let table = scan_props(text, &registry(), "AN");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0][0], "Luka Doncic");
        assert_eq!(table.rows[0][1], "Assists");
        assert_eq!(table.rows[0][2], "9.5");
        assert_eq!(table.rows[0][3], "+105");
    }

    #[test]
    fn test_scan_two_word_market_and_suffix() {
        let text = "Jaren Jackson Jr. Three Pointers Over 1.5 +140";
        let table = scan_props(text, &registry(), "AN");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0][0], "Jaren Jackson Jr.");
        assert_eq!(table.rows[0][1], "Three Pointers");
    }

    #[test]
    fn test_scan_hyphenated_name() {
        let mut registry = PlayerRegistry::new();
        registry.insert("Shai Gilgeous-Alexander");
        let text = "Shai Gilgeous-Alexander Points O 30.5 -110";
        let table = scan_props(text, &registry, "AN");
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows[0],
            vec!["Shai Gilgeous-Alexander", "Points", "30.5", "-110", "AN"]
        );
    }

    #[test]
    fn test_scan_ignores_unders_unknown_players_and_missing_odds() {
        let text = "Nikola Jokic Rebounds U 11.5 -110 \
                    Seth Curry Points O 10.5 -110 \
                    Kevin Durant Points O 27.5 \
                    Stephen Curry Points O 28.5 -120";
        let table = scan_props(text, &registry(), "AN");
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0][0], "Stephen Curry");
        assert_eq!(parse_number(&table.rows[0][2]), Some(dec!(28.5)));
    }

    #[test]
    fn test_scan_dedupes_repeated_lines() {
        let text = "LeBron James Points O 25.5 -110 LeBron James Points O 25.5 -110 \
                    LeBron James Points O 26.5 +100";
        let table = scan_props(text, &registry(), "AN");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_scan_empty_registry_finds_nothing() {
        let table = scan_props("LeBron James Points O 25.5 -110", &PlayerRegistry::new(), "AN");
        assert!(table.is_empty());
    }
}
