//! Fetch a list of image URLs from a text file
//!
//! This example demonstrates the core functionality of image-dl:
//! - Building a configuration
//! - Creating an engine instance
//! - Subscribing to events
//! - Running with graceful signal handling
//! - Dumping failed URLs for a follow-up run
//!
//! Usage: `cargo run --example fetch_list -- urls.txt [output_folder]`

use image_dl::{Config, Engine, Event, read_urls, run_with_shutdown, write_failed_urls};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let input_urls: PathBuf = args.next().unwrap_or_else(|| "urls.txt".to_string()).into();
    let output_folder: PathBuf = args.next().unwrap_or_else(|| "images".to_string()).into();

    // Build configuration
    let config = Config {
        input_urls,
        output_folder,
        max_workers: 4,
        max_attempts: 5,
        random_sleep_time: true,
        min_sleep_time: 0,
        max_sleep_time: 5,
        ..Default::default()
    };

    // Initialize tracing; `debug = true` in the config turns on debug logs
    let default_level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .init();

    // Create the engine
    let engine = Engine::new(config)?;

    // Subscribe to events
    let mut events = engine.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                Event::Downloaded { url, path, attempts } => {
                    println!("✓ {} -> {} ({} attempts)", url, path.display(), attempts);
                }
                Event::AttemptFailed {
                    url,
                    attempt,
                    max_attempts,
                    error,
                } => {
                    println!("⟳ {} attempt {}/{} failed: {}", url, attempt, max_attempts, error);
                }
                Event::Failed { url, reason } => {
                    println!("✗ {} failed: {}", url, reason);
                }
                Event::Skipped { url, path } => {
                    println!("- {} already downloaded at {}", url, path.display());
                }
            }
        }
    });

    // Run with automatic signal handling (Ctrl+C cancels cooperatively)
    let urls = read_urls(&engine.config().input_urls).await?;
    let summary = run_with_shutdown(&engine, urls).await;

    println!(
        "done: {} downloaded, {} failed, {} skipped",
        summary.downloaded,
        summary.failed.len(),
        summary.skipped.len()
    );

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        write_failed_urls(Path::new("failed_urls.txt"), &summary.failed_urls()).await?;
        println!("failed URLs dumped to failed_urls.txt");
        Ok(ExitCode::FAILURE)
    }
}
