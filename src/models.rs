//! Chart endpoint data models.
//!
//! `ChartResponse` mirrors the JSON returned by the `v8/finance/chart` endpoint
//! closely enough to pull out the daily series. Every field is optional at the
//! serde layer so that a structurally incomplete body decodes cleanly and is
//! then rejected by [`ChartResponse::into_samples`] with a schema error instead
//! of an opaque decode error.

use serde::Deserialize;

use crate::error::VwapError;

/// One daily observation. Null price or volume in the source stays `None`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: i64, // Unix timestamp (seconds)
    pub price: Option<f64>,
    pub volume: Option<i64>,
}

impl Sample {
    pub fn new(timestamp: i64, price: Option<f64>, volume: Option<i64>) -> Self {
        Self { timestamp, price, volume }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub struct ChartError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    #[serde(default)]
    pub indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

/// Per-day quote arrays, index-aligned with `ChartResult::timestamp`.
#[derive(Debug, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub close: Option<Vec<Option<f64>>>,
    // Decoded as f64 so a fractional volume is accepted; truncated to whole
    // shares when paired into samples.
    #[serde(default)]
    pub volume: Option<Vec<Option<f64>>>,
}

impl ChartResponse {
    pub fn from_json(body: &str) -> Result<Self, VwapError> {
        Ok(serde_json::from_str(body)?)
    }

    /// Pairs the parallel timestamp/close/volume arrays into samples.
    pub fn into_samples(self) -> Result<Vec<Sample>, VwapError> {
        if let Some(err) = self.chart.error {
            return Err(VwapError::Api {
                code: err.code,
                description: err.description,
            });
        }

        let result = self
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| VwapError::Schema("chart.result is empty".into()))?;

        let timestamps = result
            .timestamp
            .ok_or_else(|| VwapError::Schema("timestamp array is absent".into()))?;

        let quote = result
            .indicators
            .and_then(|i| i.quote.into_iter().next())
            .ok_or_else(|| VwapError::Schema("indicators.quote is empty".into()))?;

        let closes = quote
            .close
            .ok_or_else(|| VwapError::Schema("close array is absent".into()))?;
        let volumes = quote
            .volume
            .ok_or_else(|| VwapError::Schema("volume array is absent".into()))?;

        if closes.len() != timestamps.len() || volumes.len() != timestamps.len() {
            return Err(VwapError::Schema(format!(
                "array lengths differ (timestamp={}, close={}, volume={})",
                timestamps.len(),
                closes.len(),
                volumes.len()
            )));
        }

        Ok(timestamps
            .into_iter()
            .zip(closes)
            .zip(volumes)
            .map(|((ts, close), volume)| Sample::new(ts, close, volume.map(|v| v as i64)))
            .collect())
    }
}
