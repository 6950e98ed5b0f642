//! NBA stats provider.
//!
//! Pulls season totals from the public `leagueleaders` endpoint.
//!
//! API: `https://stats.nba.com/stats/leagueleaders`
//! Auth: none, but the endpoint rejects requests without browser-like
//! `Referer`/`Origin` headers.
//! Shape: `{"resultSet": {"headers": [...], "rowSet": [[...], ...]}}`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER};
use reqwest::Client;
use rust_decimal::prelude::*;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::StatsProvider;
use crate::types::RawTable;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const PROVIDER_NAME: &str = "nba-stats";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LeagueLeadersResponse {
    #[serde(rename = "resultSet")]
    result_set: ResultSet,
}

#[derive(Debug, Deserialize)]
struct ResultSet {
    headers: Vec<String>,
    #[serde(rename = "rowSet", default)]
    row_set: Vec<Vec<serde_json::Value>>,
}

fn value_to_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parse a `leagueleaders` body into a raw stats table.
///
/// Requested in `Totals` mode, so `MIN` is converted to minutes per game
/// here; the counting stats stay as totals for the normalizer.
pub fn parse_league_leaders(body: &str) -> Result<RawTable> {
    let resp: LeagueLeadersResponse =
        serde_json::from_str(body).context("Failed to parse leagueleaders response")?;
    let rs = resp.result_set;

    let mut table = RawTable {
        name: "stats".to_string(),
        headers: rs.headers,
        rows: Vec::with_capacity(rs.row_set.len()),
    };

    let min_idx = table.column_index(&["MIN"]);
    let gp_idx = table.column_index(&["GP"]);

    for raw in &rs.row_set {
        let mut row: Vec<String> = raw.iter().map(value_to_cell).collect();
        if let (Some(mi), Some(gi)) = (min_idx, gp_idx) {
            let per_game = row
                .get(mi)
                .and_then(|m| Decimal::from_str(m).ok())
                .zip(row.get(gi).and_then(|g| Decimal::from_str(g).ok()))
                .filter(|(_, gp)| !gp.is_zero())
                .map(|(min, gp)| (min / gp).round_dp(1));
            if let Some(mpg) = per_game {
                row[mi] = mpg.to_string();
            }
        }
        table.push_row(row);
    }

    Ok(table)
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct NbaStatsClient {
    http: Client,
    base_url: String,
    season: String,
}

impl NbaStatsClient {
    pub fn new(base_url: &str, season: &str, timeout_secs: u64) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.nba.com/"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.nba.com"));

        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("Failed to build NBA stats HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            season: season.to_string(),
        })
    }
}

#[async_trait]
impl StatsProvider for NbaStatsClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_stats(&self) -> Result<RawTable> {
        let url = format!("{}/leagueleaders", self.base_url);
        debug!(url = %url, season = %self.season, "Fetching league leaders");

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("LeagueID", "00"),
                ("PerMode", "Totals"),
                ("Scope", "S"),
                ("Season", self.season.as_str()),
                ("SeasonType", "Regular Season"),
                ("StatCategory", "PTS"),
                ("ActiveFlag", ""),
            ])
            .send()
            .await
            .context("NBA stats request failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("NBA stats returned HTTP {status}");
        }

        let body = resp.text().await.context("Failed to read NBA stats body")?;
        let table = parse_league_leaders(&body)?;
        info!(rows = table.len(), season = %self.season, "League leaders fetched");
        Ok(table)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
