//! Data-source collaborator for the daily price series.
//!
//! [`DailySeriesProvider`] is the seam between the pipeline and the network:
//! the pipeline only needs a list of [`Sample`]s for a symbol and window, so
//! tests can swap in an in-memory provider.

use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, info};

use crate::config::HttpConfig;
use crate::error::VwapError;
use crate::models::{ChartResponse, Sample};

const SECONDS_IN_DAY: i64 = 24 * 60 * 60;
const DAYS_IN_YEAR: i64 = 365;

/// Closed `[start, end]` window in epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    pub start: i64,
    pub end: i64,
}

impl HistoryWindow {
    /// Window ending at `now` and reaching back `years` × 365 days.
    pub fn trailing_years(now: i64, years: u32) -> Self {
        Self {
            start: now - DAYS_IN_YEAR * SECONDS_IN_DAY * years as i64,
            end: now,
        }
    }
}

#[async_trait]
pub trait DailySeriesProvider {
    /// Fetches one sample per trading day for `symbol` inside `window`.
    async fn fetch_daily(&self, symbol: &str, window: HistoryWindow) -> Result<Vec<Sample>, VwapError>;
}

/// Reads daily bars from the `v8/finance/chart` endpoint.
pub struct YahooChartProvider {
    client: Client,
    base_url: String,
    interval: String,
}

impl YahooChartProvider {
    /// Builds the HTTP client. The endpoint turns away requests that do not
    /// look like a browser, hence the full navigation header set.
    pub fn new(http: &HttpConfig, interval: &str) -> Result<Self, VwapError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            header::HeaderValue::from_static("en-US,en;q=0.5"),
        );
        headers.insert(header::CONNECTION, header::HeaderValue::from_static("keep-alive"));
        headers.insert(header::UPGRADE_INSECURE_REQUESTS, header::HeaderValue::from_static("1"));
        headers.insert(header::HeaderName::from_static("sec-fetch-dest"), header::HeaderValue::from_static("document"));
        headers.insert(header::HeaderName::from_static("sec-fetch-mode"), header::HeaderValue::from_static("navigate"));
        headers.insert(header::HeaderName::from_static("sec-fetch-site"), header::HeaderValue::from_static("none"));
        headers.insert(header::CACHE_CONTROL, header::HeaderValue::from_static("max-age=0"));

        let client = Client::builder()
            .user_agent(http.user_agent.clone())
            .default_headers(headers)
            .connect_timeout(http.connect_timeout())
            .read_timeout(http.read_timeout())
            .timeout(http.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: http.base_url.trim_end_matches('/').to_string(),
            interval: interval.to_string(),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/{}", self.base_url, symbol)
    }
}

#[async_trait]
impl DailySeriesProvider for YahooChartProvider {
    async fn fetch_daily(&self, symbol: &str, window: HistoryWindow) -> Result<Vec<Sample>, VwapError> {
        let url = self.chart_url(symbol);
        info!("🚀 Fetching {} daily bars ({} .. {})", symbol, window.start, window.end);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", window.start.to_string()),
                ("period2", window.end.to_string()),
                ("interval", self.interval.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(VwapError::HttpStatus { status, body });
        }

        let body = response.text().await?;
        debug!("Received {} bytes from {}", body.len(), url);

        let samples = ChartResponse::from_json(&body)?.into_samples()?;
        info!("✅ Received {} daily samples for {}", samples.len(), symbol);
        Ok(samples)
    }
}
