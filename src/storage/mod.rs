//! Persistence layer.
//!
//! Flattens the evaluated table into export rows and hands them, along
//! with the text report, to a `ReportSink`. The file sink writes one
//! timestamped CSV (or JSON) file per run and prints the report to stdout.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::types::EvaluatedLine;

/// File name prefix for exported tables.
const EXPORT_PREFIX: &str = "nba_prop_report";

// ---------------------------------------------------------------------------
// Export settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

/// How a line without an edge is written to the `edge` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullEdge {
    /// Write `0` (the persisted column is always numeric).
    Zero,
    /// Leave the cell empty (`null` in JSON).
    Blank,
}

// ---------------------------------------------------------------------------
// Export rows
// ---------------------------------------------------------------------------

/// One exported line. Field order is the column order: prop columns, stat
/// columns, then `edge` and `recommendation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub player_name: String,
    pub prop_type: String,
    pub prop_line: Decimal,
    pub odds: String,
    pub sportsbook: String,
    pub ppg: Option<Decimal>,
    pub rpg: Option<Decimal>,
    pub apg: Option<Decimal>,
    pub spg: Option<Decimal>,
    pub bpg: Option<Decimal>,
    pub mpg: Option<Decimal>,
    pub games_played: Option<u32>,
    pub edge: Option<Decimal>,
    pub recommendation: String,
}

impl ExportRow {
    pub fn from_line(line: &EvaluatedLine, null_edge: NullEdge) -> Self {
        let stats = line.stats.as_ref();
        let edge = match (line.edge, null_edge) {
            (Some(edge), _) => Some(edge),
            (None, NullEdge::Zero) => Some(Decimal::ZERO),
            (None, NullEdge::Blank) => None,
        };

        Self {
            player_name: line.prop.player_name.clone(),
            prop_type: line.prop.prop_type.to_string(),
            prop_line: line.prop.prop_line,
            odds: line.prop.odds.to_string(),
            sportsbook: line.prop.sportsbook.clone(),
            ppg: stats.map(|s| s.ppg),
            rpg: stats.map(|s| s.rpg),
            apg: stats.map(|s| s.apg),
            spg: stats.map(|s| s.spg),
            bpg: stats.map(|s| s.bpg),
            mpg: stats.map(|s| s.mpg),
            games_played: stats.map(|s| s.games_played),
            edge,
            recommendation: line.tier.to_string(),
        }
    }
}

/// `nba_prop_report_<YYYYMMDD>_<HHMM>.<ext>`
pub fn export_file_name(at: DateTime<Local>, format: ExportFormat) -> String {
    format!(
        "{EXPORT_PREFIX}_{}.{}",
        at.format("%Y%m%d_%H%M"),
        format.extension()
    )
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Destination for the text report and the annotated table.
pub trait ReportSink {
    /// Display the human-readable report.
    fn publish_summary(&mut self, summary: &str) -> Result<()>;

    /// Persist the table under `name`. Returns where it was stored.
    fn store_table(&mut self, name: &str, rows: &[ExportRow]) -> Result<PathBuf>;

    /// Encoding used by `store_table`; the export file extension follows it.
    fn format(&self) -> ExportFormat;
}

/// Writes tables into a directory and the report to stdout.
pub struct FileSink {
    output_dir: PathBuf,
    format: ExportFormat,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
        }
    }

    fn write_csv(path: &Path, rows: &[ExportRow]) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        for row in rows {
            writer.serialize(row).context("Failed to serialise export row")?;
        }
        // Header-only file when there are no rows.
        if rows.is_empty() {
            writer.write_record(EXPORT_COLUMNS)?;
        }
        writer.flush().context("Failed to flush CSV export")?;
        Ok(())
    }

    fn write_json(path: &Path, rows: &[ExportRow]) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, rows).context("Failed to serialise export rows")?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}

impl ReportSink for FileSink {
    fn publish_summary(&mut self, summary: &str) -> Result<()> {
        let stdout = std::io::stdout();
        let mut lock = stdout.lock();
        writeln!(lock, "{summary}").context("Failed to write report to stdout")?;
        Ok(())
    }

    fn store_table(&mut self, name: &str, rows: &[ExportRow]) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {}", self.output_dir.display())
        })?;
        let path = self.output_dir.join(name);
        match self.format {
            ExportFormat::Csv => Self::write_csv(&path, rows)?,
            ExportFormat::Json => Self::write_json(&path, rows)?,
        }
        debug!(path = %path.display(), rows = rows.len(), "Table written");
        Ok(path)
    }

    fn format(&self) -> ExportFormat {
        self.format
    }
}

/// Export column order.
pub const EXPORT_COLUMNS: [&str; 14] = [
    "player_name",
    "prop_type",
    "prop_line",
    "odds",
    "sportsbook",
    "ppg",
    "rpg",
    "apg",
    "spg",
    "bpg",
    "mpg",
    "games_played",
    "edge",
    "recommendation",
];

// ---------------------------------------------------------------------------
// Exporter
// ---------------------------------------------------------------------------

pub struct Exporter {
    null_edge: NullEdge,
}

impl Exporter {
    pub fn new(null_edge: NullEdge) -> Self {
        Self { null_edge }
    }

    /// One export row per evaluated line. The lines are only read.
    pub fn rows(&self, lines: &[EvaluatedLine]) -> Vec<ExportRow> {
        lines
            .iter()
            .map(|line| ExportRow::from_line(line, self.null_edge))
            .collect()
    }

    /// Build the rows and store them under the timestamped name, with the
    /// extension of the sink's format.
    pub fn export(
        &self,
        lines: &[EvaluatedLine],
        at: DateTime<Local>,
        sink: &mut dyn ReportSink,
    ) -> Result<PathBuf> {
        let rows = self.rows(lines);
        let name = export_file_name(at, sink.format());
        let path = sink.store_table(&name, &rows)?;
        info!(path = %path.display(), rows = rows.len(), "Full report exported");
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
