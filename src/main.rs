//! sitewarm - asset cache warmer for a static site.
//!
//! Thin CLI over the library: warm the asset cache, inspect or clear the
//! freshness record, and run the page-load bootstrap flow.

use std::io;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sitewarm::app::{App, WarmSelection};
use sitewarm::preload::ProgressUpdate;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Set up logging with environment-based filter
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!("Usage: sitewarm <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  warm [--mobile|--all]        warm the asset cache");
    eprintln!("  status                       print the freshness record");
    eprintln!("  clear                        drop the freshness record");
    eprintln!("  bootstrap <page> [--debug]   run the page-load flow");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("sitewarm starting");

    let args: Vec<String> = std::env::args().collect();
    let app = App::new()?;

    match args.get(1).map(String::as_str) {
        Some("warm") => warm(&app, &args).await,
        Some("status") => {
            let status = app.status();
            println!("{}", serde_json::to_string_pretty(&status)?);
            eprintln!("Last warmed: {}", status.age_display());
            Ok(())
        }
        Some("clear") => {
            app.clear()?;
            eprintln!("Cache record cleared");
            Ok(())
        }
        Some("bootstrap") => {
            let Some(page) = args.get(2).filter(|a| !a.starts_with("--")) else {
                print_usage();
                return Ok(());
            };
            let debug = args.iter().any(|a| a == "--debug");
            let nav = app.bootstrap(page, debug).await?;
            if nav.is_enabled() {
                eprintln!(
                    "Instant navigation enabled, {} pages prefetched",
                    nav.hints().len()
                );
            } else {
                eprintln!("Instant navigation disabled (cache cold or home page)");
            }
            Ok(())
        }
        _ => {
            print_usage();
            Ok(())
        }
    }
}

async fn warm(app: &App, args: &[String]) -> Result<()> {
    let selection = if args.iter().any(|a| a == "--all") {
        WarmSelection::All
    } else if args.iter().any(|a| a == "--mobile") {
        WarmSelection::Mobile
    } else {
        WarmSelection::Desktop
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<ProgressUpdate>();
    let printer = tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            eprintln!(
                "  {}/{} loaded ({}%)",
                update.loaded, update.total, update.percent
            );
        }
    });

    let report = app.warm(selection, Some(tx)).await?;
    printer.await?;

    eprintln!(
        "Warmed {}/{} assets ({}% success)",
        report.loaded.len(),
        report.total,
        report.success_rate
    );
    for url in &report.failed {
        eprintln!("  failed: {}", url);
    }
    Ok(())
}
