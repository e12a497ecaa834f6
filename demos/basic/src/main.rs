//! Vessel API walkthrough
//!
//! Looks up a vessel, then walks the recent port calls of Rotterdam page by page.
//! Set `VESSELAPI_API_KEY`; `RUST_LOG=vesselapi=debug` shows every attempt.

// Demo-specific lint allowances
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]
#![allow(clippy::print_stderr)]

use std::pin::pin;
use std::time::Duration;

use futures_util::StreamExt;
use tracing_subscriber::EnvFilter;
use vesselapi::prelude::*;

/// Summary printed by the demo.
#[derive(Debug)]
struct Report {
    vessel: Option<String>,
    port_calls: Vec<String>,
}

/// Fetch a vessel by IMO and up to `max_calls` port events of `unlocode`.
async fn report(
    client: &VesselClient,
    imo: &str,
    unlocode: &str,
    max_calls: usize,
) -> Result<Report> {
    let vessel = client
        .vessels()
        .get(imo, &VesselQuery::default())
        .await?
        .vessel
        .and_then(|vessel| vessel.name);

    let events = client
        .port_events()
        .all_by_port(unlocode, &PortEventsQuery::default().limit(20))
        .into_stream()
        .take(max_calls);
    let mut events = pin!(events);

    let mut port_calls = Vec::new();
    while let Some(event) = events.next().await {
        let event = event?;
        port_calls.push(format!(
            "{} {}",
            event.timestamp.as_deref().unwrap_or("?"),
            event.event.as_deref().unwrap_or("?"),
        ));
    }

    Ok(Report { vessel, port_calls })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Ok(api_key) = std::env::var("VESSELAPI_API_KEY") else {
        eprintln!("VESSELAPI_API_KEY is not set");
        return Ok(());
    };

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let client = VesselClient::builder(api_key)
        .max_retries(3)
        .with_logging()
        .build()?
        .with_cancellation(cancel)
        .with_timeout(Duration::from_secs(60));

    match report(&client, "9811000", "NLRTM", 10).await {
        Ok(report) => {
            println!(
                "Vessel: {}",
                report.vessel.as_deref().unwrap_or("<unnamed>")
            );
            for call in &report.port_calls {
                println!("  {call}");
            }
        }
        Err(err) if err.is_cancellation() => eprintln!("stopped: {err}"),
        Err(err) if err.is_auth_error() => eprintln!("check VESSELAPI_API_KEY: {err}"),
        Err(err) => return Err(err),
    }

    Ok(())
}
