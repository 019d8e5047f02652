use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

use monthly_vwap::config::VwapConfig;

/// Formats log timestamps in the system's local timezone instead of UTC.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(w, "{}", now.format("%Y-%m-%dT%H:%M:%S%.3f"))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Log level comes from RUST_LOG (defaults to "info").
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_timer(LocalTimer)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match VwapConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("❌ Critical Error: Failed to load configuration: {}", e);
            eprintln!("Error calculating VWAP: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("🚀 Starting monthly VWAP report for {}...", cfg.symbol);

    match monthly_vwap::run(&cfg).await {
        Ok(report) => {
            print!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("⚠️ Run aborted: {:?}", e);
            eprintln!("Error calculating VWAP: {}", e);
            ExitCode::FAILURE
        }
    }
}
