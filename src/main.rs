//! PROPSCOUT: NBA player prop edge finder.
//!
//! Entry point. Loads configuration, initialises structured logging,
//! fetches stats then props (falling back to demo data when a source is
//! down), prints the report and exports the annotated table.

use anyhow::Result;
use chrono::Local;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use propscout::config::{AppConfig, PropsSource, StatsSource, DEFAULT_CONFIG_FILE};
use propscout::data::action_network::ActionNetworkScraper;
use propscout::data::csv_source::{CsvPropsProvider, CsvStatsProvider};
use propscout::data::nba_stats::NbaStatsClient;
use propscout::data::registry::PlayerRegistry;
use propscout::data::{PropsProvider, StatsProvider};
use propscout::engine::normalizer::Normalizer;
use propscout::engine::Analysis;
use propscout::report::Report;
use propscout::storage::{Exporter, FileSink, ReportSink};
use propscout::strategy::edge::EdgeEvaluator;
use propscout::types::ScoutError;

const BANNER: &str = r#"
 ____  ____   ___  ____  ____   ____ ___  _   _ _____
|  _ \|  _ \ / _ \|  _ \/ ___| / ___/ _ \| | | |_   _|
| |_) | |_) | | | | |_) \___ \| |  | | | | | | | | |
|  __/|  _ <| |_| |  __/ ___) | |__| |_| | |_| | | |
|_|   |_| \_\\___/|_|   |____/ \____\___/ \___/  |_|

  NBA player prop edge finder
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    init_logging();

    let config_path =
        std::env::var("PROPSCOUT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
    let mut cfg = AppConfig::load_or_default(&config_path)?;
    cfg.apply_env();

    println!("{BANNER}");
    info!(
        config = %config_path,
        season = %cfg.run.season,
        offline = cfg.run.offline,
        stats_source = ?cfg.stats.source,
        props_source = ?cfg.props.source,
        "PROPSCOUT starting up"
    );

    let run_id = Uuid::new_v4();
    run(cfg).instrument(info_span!("run", %run_id)).await
}

/// One analysis run: fetch, evaluate, report, export.
async fn run(cfg: AppConfig) -> Result<()> {
    let evaluator = EdgeEvaluator::new(cfg.rules.to_rules()?);

    // Stats first: their names seed the registry the props scraper needs.
    let stats_provider = build_stats_provider(&cfg)?;
    let stats = Normalizer::load_stats(stats_provider.as_deref()).await?;

    let registry = PlayerRegistry::from_records(&stats.records);
    let props_provider = build_props_provider(&cfg, registry)?;
    let props = Normalizer::load_props(props_provider.as_deref()).await?;

    let generated_at = Local::now();
    let analysis = Analysis::run(&stats, &props, &evaluator, generated_at);
    let report = Report::new(&analysis, cfg.report.sort_by_edge);

    let mut sink = FileSink::new(&cfg.export.output_dir, cfg.export.format);
    sink.publish_summary(&report.to_string())?;

    let exporter = Exporter::new(cfg.export.null_edge);
    let path = exporter.export(&analysis.lines, generated_at, &mut sink)?;
    println!("Full report exported to: {}", path.display());

    info!(
        lines = analysis.lines.len(),
        opportunities = report.opportunity_count(),
        unmatched = analysis.unmatched(),
        stats_origin = %analysis.stats_origin,
        props_origin = %analysis.props_origin,
        "Run complete"
    );
    Ok(())
}

/// `None` selects the demo stats (offline or `source = "fixture"`).
fn build_stats_provider(cfg: &AppConfig) -> Result<Option<Box<dyn StatsProvider>>> {
    if cfg.run.offline {
        return Ok(None);
    }
    let provider: Box<dyn StatsProvider> = match cfg.stats.source {
        StatsSource::NbaApi => Box::new(NbaStatsClient::new(
            &cfg.stats.base_url,
            &cfg.run.season,
            cfg.stats.timeout_secs,
        )?),
        StatsSource::Csv => {
            let path = cfg.stats.csv_path.clone().ok_or_else(|| {
                ScoutError::Config("stats.csv_path is required when stats.source = \"csv\"".into())
            })?;
            Box::new(CsvStatsProvider::new(path))
        }
        StatsSource::Fixture => return Ok(None),
    };
    Ok(Some(provider))
}

/// `None` selects the demo props (offline or `source = "fixture"`).
fn build_props_provider(
    cfg: &AppConfig,
    registry: PlayerRegistry,
) -> Result<Option<Box<dyn PropsProvider>>> {
    if cfg.run.offline {
        return Ok(None);
    }
    let provider: Box<dyn PropsProvider> = match cfg.props.source {
        PropsSource::ActionNetwork => Box::new(ActionNetworkScraper::new(
            &cfg.props.url,
            &cfg.props.sportsbook,
            cfg.props.timeout_secs,
            registry,
        )?),
        PropsSource::Csv => {
            let path = cfg.props.csv_path.clone().ok_or_else(|| {
                ScoutError::Config("props.csv_path is required when props.source = \"csv\"".into())
            })?;
            Box::new(CsvPropsProvider::new(path))
        }
        PropsSource::Fixture => return Ok(None),
    };
    Ok(Some(provider))
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("propscout=info"));

    let json_logging = std::env::var("PROPSCOUT_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
