// src/lib.rs

pub mod config;
pub mod error;
pub mod indicators;
pub mod models;
pub mod provider;
pub mod report;

use crate::config::VwapConfig;
use crate::error::VwapError;
use crate::indicators::monthly_vwap::{MonthlyVwapAggregator, MonthlyVwapTable};
use crate::models::Sample;
use crate::provider::{DailySeriesProvider, HistoryWindow, YahooChartProvider};
use crate::report::render_report;

use chrono::{Local, Utc};
use tracing::info;

/// Fetches the configured symbol from the chart endpoint and renders the
/// monthly VWAP report for the trailing window ending now.
pub async fn run(cfg: &VwapConfig) -> Result<String, VwapError> {
    let provider = YahooChartProvider::new(&cfg.http, &cfg.interval)?;
    run_with(&provider, cfg, Utc::now().timestamp()).await
}

/// Full fetch → aggregate → render pipeline against any provider.
/// Either the whole report is produced or the first error is returned.
pub async fn run_with<P>(provider: &P, cfg: &VwapConfig, now: i64) -> Result<String, VwapError>
where
    P: DailySeriesProvider + ?Sized,
{
    let window = HistoryWindow::trailing_years(now, cfg.years_of_history);
    let samples = provider.fetch_daily(&cfg.symbol, window).await?;

    let table = aggregate_in_configured_zone(cfg, samples)?;
    info!("📊 Aggregated {} months for {}", table.len(), cfg.symbol);

    Ok(render_report(&cfg.symbol, &table))
}

fn aggregate_in_configured_zone(cfg: &VwapConfig, samples: Vec<Sample>) -> Result<MonthlyVwapTable, VwapError> {
    let table = match cfg.time_zone()? {
        Some(tz) => MonthlyVwapAggregator::new(tz).aggregate(samples),
        None => MonthlyVwapAggregator::new(Local).aggregate(samples),
    };
    Ok(table)
}
