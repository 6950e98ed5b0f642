//! Local CSV providers.
//!
//! Stats files carry season totals in the same shape the NBA endpoint returns
//! (either the provider headers PLAYER/PTS/.../GP or the canonical names);
//! props files carry the five prop columns. Header validation is left to the
//! normalizer.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{PropsProvider, StatsProvider};
use crate::types::RawTable;

/// Read a CSV stream into a raw table. Ragged rows are accepted and padded.
pub fn read_table<R: Read>(name: &str, rdr: R) -> Result<RawTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(rdr);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut table = RawTable {
        name: name.to_string(),
        headers,
        rows: Vec::new(),
    };
    for record in reader.records() {
        let record = record?;
        table.push_row(record.iter().map(str::to_string));
    }
    Ok(table)
}

async fn read_file(name: &str, path: &Path) -> Result<RawTable> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {name} file {}", path.display()))?;
    let table = read_table(name, bytes.as_slice())
        .with_context(|| format!("CSV error in {}", path.display()))?;
    info!(path = %path.display(), rows = table.len(), "CSV {name} loaded");
    Ok(table)
}

pub struct CsvStatsProvider {
    path: PathBuf,
}

impl CsvStatsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StatsProvider for CsvStatsProvider {
    fn name(&self) -> &'static str {
        "csv-stats"
    }

    async fn fetch_stats(&self) -> Result<RawTable> {
        read_file("stats", &self.path).await
    }
}

pub struct CsvPropsProvider {
    path: PathBuf,
}

impl CsvPropsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PropsProvider for CsvPropsProvider {
    fn name(&self) -> &'static str {
        "csv-props"
    }

    async fn fetch_props(&self) -> Result<RawTable> {
        read_file("props", &self.path).await
    }
}
