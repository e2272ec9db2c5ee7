//! # scorecard_scrape
//!
//! Fetches every `--input`, extracts records of one page type, retries pages
//! that produced no table, removes duplicates and writes a dated JSON report.
//!
//! ## Usage
//!
//! ```sh
//! scorecard_scrape --page season --season 2011 -i pages/ipl-2011.html -o ./out
//! ```
//!
//! ## Pipeline
//!
//! 1. **Fetching**: URLs over HTTP with backoff, everything else from disk
//! 2. **Extraction**: parse and extract each page (bounded concurrency)
//! 3. **Retry**: with `--retry-failed`, failed pages get more passes; saved
//!    pages are re-read as snapshots until their anchor table appears
//! 4. **Output**: deduplicate and write `{output_dir}/{date}/{page}.json`

use chrono::{Local, Utc};
use clap::Parser;
use futures::stream::{self, StreamExt};
use scorecard_scrape::extract::FileSnapshot;
use scorecard_scrape::fetch::{FetchAsync, SourceFetch, is_url};
use scorecard_scrape::grammar::link::{self, IdKind};
use scorecard_scrape::models::{Field, PageContext, PageResult, PageType, RunReport, SourceReport};
use scorecard_scrape::outputs::{dedupe, json};
use scorecard_scrape::utils::ensure_writable_dir;
use scorecard_scrape::{SiteConfig, pages};
use std::error::Error;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::Cli;

const HTTP_RETRIES: usize = 3;
const HTTP_BASE_DELAY: Duration = Duration::from_secs(1);
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// One input's latest result.
struct Outcome {
    index: usize,
    source: String,
    result: PageResult,
    attempts: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = Instant::now();
    let started_at = Utc::now().to_rfc3339();
    info!("scorecard_scrape starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match &args.config {
        Some(path) => SiteConfig::load(path)?,
        None => SiteConfig::default(),
    };

    // Early check: ensure output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let fetcher = SourceFetch::new(HTTP_RETRIES, HTTP_BASE_DELAY, HTTP_TIMEOUT)?;
    let base = PageContext {
        match_id: Field::from(args.match_id),
        season: Field::from(args.season.clone()),
        player_id: Field::from(args.player_id),
        player_name: Field::from(args.player_name.clone()),
        team_id: Field::from(args.team_id),
        team_names: args.teams.clone(),
        base_url: config.base_url(),
    };

    // ---- Fetch and extract (bounded) ----
    let page = args.page;
    let concurrency = args.concurrency.max(1);
    info!(inputs = args.inputs.len(), concurrency, %page, "Starting extraction");
    let mut outcomes: Vec<Outcome> = stream::iter(args.inputs.iter().enumerate())
        .map(|(index, source)| {
            let (fetcher, base, config) = (&fetcher, &base, &config);
            async move {
                let result = process(fetcher, source, page, base, config).await;
                Outcome {
                    index,
                    source: source.clone(),
                    result,
                    attempts: 1,
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;
    outcomes.sort_by_key(|o| o.index);

    // ---- Retry queue ----
    let failed = outcomes.iter().filter(|o| !o.result.success).count();
    if failed > 0 && args.retry_failed {
        info!(failed, attempts = config.retry.attempts, "Retrying failed pages");
        for outcome in outcomes.iter_mut().filter(|o| !o.result.success) {
            retry(outcome, &fetcher, page, &base, &config).await;
        }
    } else if failed > 0 {
        warn!(failed, "Some pages produced no table; rerun with --retry-failed to retry them");
    }

    // ---- Output ----
    let sources: Vec<SourceReport> = outcomes
        .iter()
        .map(|o| SourceReport {
            source: o.source.clone(),
            success: o.result.success,
            records: o.result.records.len(),
            attempts: o.attempts,
        })
        .collect();
    let successful = sources.iter().filter(|s| s.success).count();
    let records = dedupe::dedupe(
        page,
        outcomes.into_iter().flat_map(|o| o.result.records).collect(),
    );

    let report = RunReport {
        page,
        run_date: Local::now().date_naive().to_string(),
        started_at,
        finished_at: Utc::now().to_rfc3339(),
        sources,
        records,
    };
    let path = json::write_report(&report, &args.output_dir).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        path = %path.display(),
        total = report.sources.len(),
        successful,
        failed = report.sources.len() - successful,
        records = report.records.len(),
        "Execution complete"
    );
    Ok(())
}

/// The caller's context, with the match id taken from a scorecard URL when
/// none was given.
fn context_for(source: &str, page: PageType, base: &PageContext) -> PageContext {
    let mut ctx = base.clone();
    if page == PageType::Scorecard && ctx.match_id.is_missing() && is_url(source) {
        ctx.match_id = link::id_from_href(source, IdKind::Match);
    }
    ctx
}

/// Fetch `source` and extract it. Fetch errors are a failed page.
#[instrument(level = "info", skip_all, fields(%source))]
async fn process(
    fetcher: &SourceFetch,
    source: &str,
    page: PageType,
    base: &PageContext,
    config: &SiteConfig,
) -> PageResult {
    let markup = match fetcher.fetch(source).await {
        Ok(markup) => markup,
        Err(e) => {
            error!(error = %e, "Fetch failed; marking page as failed");
            return PageResult::failed(page);
        }
    };
    pages::extract_markup(&markup, page, &context_for(source, page, base), config)
}

/// More passes over a failed page, bounded by `config.retry`.
///
/// Saved pages are settled as file snapshots on a blocking thread; URLs are
/// re-fetched after the configured delay.
#[instrument(level = "info", skip_all, fields(source = %outcome.source))]
async fn retry(outcome: &mut Outcome, fetcher: &SourceFetch, page: PageType, base: &PageContext, config: &SiteConfig) {
    if !is_url(&outcome.source) {
        let ctx = context_for(&outcome.source, page, base);
        let config = config.clone();
        let mut snapshots = FileSnapshot {
            path: PathBuf::from(&outcome.source),
        };
        outcome.attempts += 1;
        match tokio::task::spawn_blocking(move || pages::extract_with_retry(&mut snapshots, page, &ctx, &config)).await {
            Ok(result) => outcome.result = result,
            Err(e) => error!(error = %e, "Snapshot retry task failed"),
        }
    } else {
        while !outcome.result.success && outcome.attempts < config.retry.attempts {
            sleep(config.retry.delay).await;
            outcome.attempts += 1;
            info!(attempt = outcome.attempts, "Re-fetching page");
            outcome.result = process(fetcher, &outcome.source, page, base, config).await;
        }
    }

    if outcome.result.success {
        info!(attempts = outcome.attempts, records = outcome.result.records.len(), "Page recovered");
    } else {
        warn!(attempts = outcome.attempts, "Page still failing after retries");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_takes_match_id_from_scorecard_url() {
        let base = PageContext::new();
        let url = "https://www.espncricinfo.com/series/ipl-2011-466304/csk-vs-kkr-1st-match-501198/full-scorecard";
        assert_eq!(context_for(url, PageType::Scorecard, &base).match_id, Field::Int(501198));
        assert_eq!(context_for(url, PageType::Season, &base).match_id, Field::Missing);
    }

    #[test]
    fn test_context_keeps_explicit_match_id() {
        let base = PageContext::new().with_match_id(7i64);
        let url = "https://www.espncricinfo.com/series/ipl-2011-466304/csk-vs-kkr-1st-match-501198/full-scorecard";
        assert_eq!(context_for(url, PageType::Scorecard, &base).match_id, Field::Int(7));
        assert_eq!(context_for("saved/501198.html", PageType::Scorecard, &PageContext::new()).match_id, Field::Missing);
    }
}
