//! Close Aged Events
//!
//! Closes every open event in one event class whose last occurrence is older
//! than the lookback window. Set LOOKBACK_MINUTES=0 to close all of them.
//!
//! Usage:
//!   cargo run --release --bin close_aged_events
//!
//! Environment variables:
//!   ZENOSS_URL - Zenoss base URL (required)
//!   ZENOSS_USERNAME / ZENOSS_PASSWORD - API credentials (required)
//!   EVENT_CLASS - Event class to reconcile (default: /Unknown)
//!   LOOKBACK_MINUTES - Keep events seen within this window (default: 10)
//!   PAGE_SIZE - Events per query and per close request, max 1000 (default: 100)
//!   VERIFY_TLS - Verify the server certificate (default: true)
//!   REQUEST_TIMEOUT_SECS - Per-request timeout (default: 30)
//!   LOG_FILE - Append logs to this file instead of stderr

use chrono::{Local, Utc};
use dotenv::dotenv;
use evreaper::{
    config::ReaperConfig,
    logging::init_logging,
    reconcile::{Cutoff, ReconciliationLoop},
    report::{format_epoch, write_summary, ConsoleReporter},
    router::RouterClient,
};
use log::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let config = ReaperConfig::from_env()?;
    init_logging(&config.rust_log, config.log_file.as_deref())?;

    let started = Utc::now();
    let cutoff = Cutoff::from_lookback(started, config.lookback_minutes);

    info!("🚀 Close Aged Events");
    info!("   ├─ Router: {}", config.router_url());
    info!("   ├─ Event class: {}", config.event_class);
    info!("   ├─ Lookback: {} minutes", config.lookback_minutes);
    info!("   ├─ Cutoff: {}", format_epoch(cutoff.epoch_secs()));
    info!("   ├─ Page size: {}", config.page_size);
    info!("   └─ TLS verification: {}", config.verify_tls);

    let client = RouterClient::new(&config)?;
    let mut reporter = ConsoleReporter::stdout(started.with_timezone(&Local));

    let reconciliation = ReconciliationLoop::new(&client, &client, config.page_size, cutoff);
    let result = reconciliation.run(&mut reporter).await;

    let mut stdout = std::io::stdout();
    match result {
        Ok(totals) => {
            write_summary(&mut stdout, &totals, true)?;
            Ok(())
        }
        Err(failure) => {
            error!("❌ {}", failure);
            eprintln!("\n*** Run aborted: {} ***\n", failure.error);
            write_summary(&mut stdout, &failure.partial, false)?;
            std::process::exit(1);
        }
    }
}
