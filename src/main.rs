// src/main.rs

use anyhow::Context;
use clap::Parser;
use lesson2deck::{
    AppError, BatchRunner, BatchSummary, CommandLineInput, DeckClient, ExportFetcher, RunConfig,
};
use lesson2deck::analytics::missing_exports;
use lesson2deck::output::HttpExportFetcher;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use std::fs;
use std::process::ExitCode;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("lesson2deck.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file_path)
        .with_context(|| format!("cannot open log file {}", log_file_path.display()))?;

    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LevelFilter::Debug)))
                .build("file", Box::new(file_appender)),
        )
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(log_level),
        )?;

    log4rs::init_config(config)?;
    log::debug!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Runs the batch: generate every lesson, then write the site.
async fn execute_batch(config: &RunConfig) -> Result<BatchSummary, AppError> {
    let client = DeckClient::connect(&config.client)?;
    let fetcher = if config.download_exports {
        Some(HttpExportFetcher::new(config.client.request_timeout)?)
    } else {
        None
    };

    let runner = BatchRunner::new(
        config,
        &client,
        fetcher.as_ref().map(|f| f as &dyn ExportFetcher),
    )?;
    runner.run().await
}

/// Prints the end-of-run summary for the user.
fn report_completion(config: &RunConfig, summary: &BatchSummary) {
    let stats = &summary.stats;
    println!(
        "📚 {} lessons: {} completed, {} failed, {} throttled, {} timed out, {} rejected.",
        stats.total, stats.completed, stats.failed, stats.throttled, stats.timeout, stats.rejected
    );

    if !stats.all_completed() {
        println!("⚠️  {} lessons did not produce a deck.", stats.unsuccessful());
    }
    let without_export = missing_exports(
        summary.lessons.iter().map(|l| &l.outcome),
        config.generation.export_as.is_some(),
    );
    if without_export > 0 {
        println!("⚠️  {} decks came back without an export link.", without_export);
    }

    for lesson in &summary.lessons {
        let outcome = &lesson.outcome;
        match (outcome.status.is_success(), &outcome.share_url) {
            (true, Some(url)) => println!("  ✓ {}: {}", outcome.title, url),
            (true, None) => println!("  ✓ {} (no share link returned)", outcome.title),
            (false, _) => println!(
                "  ✗ {} [{}]: {}",
                outcome.title,
                outcome.status,
                outcome.error.as_deref().unwrap_or("unknown error")
            ),
        }
        if let Some(path) = &outcome.downloaded_file {
            println!("      saved {}", path.display());
        }
    }

    let report = &summary.report;
    if report.is_success() {
        println!(
            "✓ Site written to {} ({} files, {} bytes)",
            config.output_dir.join("index.html").display(),
            report.written.len(),
            report.bytes_written()
        );
    } else if report.site_is_browsable() {
        let pages: Vec<&str> = report.failed_pages().collect();
        eprintln!(
            "⚠️  Site written to {} but {} lesson pages are missing: {}",
            config.output_dir.display(),
            pages.len(),
            pages.join(", ")
        );
    } else {
        eprintln!(
            "⚠️  The site index or status snapshot could not be written to {}; see the log for details.",
            config.output_dir.display()
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = match RunConfig::resolve(cli) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    match execute_batch(&config).await {
        Ok(summary) => {
            report_completion(&config, &summary);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_fatal() => {
            log::error!("{}", err);
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            log::error!("Batch did not finish cleanly: {}", err);
            Ok(ExitCode::SUCCESS)
        }
    }
}
