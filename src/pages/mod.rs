//! Record assembly, one module per page layout.
//!
//! Each page module exposes an `extract` that takes a parsed document, the
//! caller's [`PageContext`] and the [`SiteConfig`], and returns a
//! [`PageResult`]. Nothing here returns an error or panics on bad markup:
//! missing segments are logged and reported through `success`.
//!
//! # Entry points
//!
//! - [`extract`]: dispatch on [`PageType`] for an already-parsed document
//! - [`extract_markup`]: parse markup first; blank markup is a failed page
//! - [`extract_with_retry`]: re-parse snapshots until the page's anchor
//!   segment appears, then extract

pub mod career;
pub mod innings;
pub mod scorecard;
pub mod season;
pub mod team_averages;
pub mod teams;

use crate::config::SiteConfig;
use crate::extract::{Located, Locator, SnapshotSource, settle};
use crate::models::{PageContext, PageResult, PageType, Record};
use scraper::{ElementRef, Html};
use tracing::{info, instrument, warn};
use url::Url;

static NOTHING: Locator = Locator::new(Vec::new());

/// Extract every record of `page` from `doc`.
#[instrument(level = "info", skip_all, fields(page = %page))]
pub fn extract(doc: &Html, page: PageType, ctx: &PageContext, config: &SiteConfig) -> PageResult {
    let result = match page {
        PageType::Season => season::extract(doc, ctx, config),
        PageType::Scorecard => scorecard::extract(doc, ctx, config),
        PageType::CareerBatting => career::extract_batting(doc, ctx, config),
        PageType::CareerBowling => career::extract_bowling(doc, ctx, config),
        PageType::InningsList => innings::extract(doc, ctx, config),
        PageType::TeamBatting => team_averages::extract(doc, ctx, config, team_averages::Segment::Batting),
        PageType::TeamBowling => team_averages::extract(doc, ctx, config, team_averages::Segment::Bowling),
        PageType::Teams => teams::extract(doc, ctx, config),
    };
    info!(records = result.records.len(), success = result.success, "Page extracted");
    result
}

/// Parse `markup` and extract. Blank markup is a failed page with no
/// records.
pub fn extract_markup(markup: &str, page: PageType, ctx: &PageContext, config: &SiteConfig) -> PageResult {
    if markup.trim().is_empty() {
        warn!(%page, "Empty document");
        return PageResult::failed(page);
    }
    extract(&Html::parse_document(markup), page, ctx, config)
}

/// Re-parse snapshots from `source` until the anchor segment of `page` is
/// located (bounded by `config.retry`), then extract from the last document.
pub fn extract_with_retry<S>(source: &mut S, page: PageType, ctx: &PageContext, config: &SiteConfig) -> PageResult
where
    S: SnapshotSource + ?Sized,
{
    let settled = settle(source, anchor(page, config), &config.retry);
    match settled.document {
        Some(doc) => extract(&doc, page, ctx, config),
        None => {
            warn!(%page, attempts = settled.attempts, "No snapshot available");
            PageResult::failed(page)
        }
    }
}

/// The segment whose presence means the page has rendered.
pub fn anchor(page: PageType, config: &SiteConfig) -> &Locator {
    match page {
        PageType::Season => &config.season.table,
        PageType::Scorecard => config
            .scorecard
            .innings
            .first()
            .map(|innings| &innings.batting)
            .unwrap_or(&NOTHING),
        PageType::CareerBatting | PageType::CareerBowling => &config.career.table,
        PageType::InningsList => &config.innings_list.table,
        PageType::TeamBatting | PageType::TeamBowling => &config.team_averages.table,
        PageType::Teams => &config.teams.list,
    }
}

/// Locate a segment, logging when every strategy misses.
pub(crate) fn locate_segment<'a>(doc: &'a Html, locator: &Locator, segment: &str) -> Option<ElementRef<'a>> {
    match locator.locate(doc) {
        Located::Exhausted => {
            warn!(segment, "Segment not located");
            None
        }
        located => located.element(),
    }
}

/// Base for resolving relative links: the context's, else the site's.
pub(crate) fn base_url(ctx: &PageContext, config: &SiteConfig) -> Option<Url> {
    ctx.base_url.clone().or_else(|| config.base_url())
}

/// A successful page.
pub(crate) fn found(page: PageType, records: Vec<Record>) -> PageResult {
    PageResult {
        page,
        records,
        success: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_markup_fails() {
        let config = SiteConfig::default();
        let ctx = PageContext::new();
        for page in [PageType::Season, PageType::Scorecard, PageType::Teams] {
            let result = extract_markup("  \n ", page, &ctx, &config);
            assert!(!result.success);
            assert!(result.records.is_empty());
        }
    }

    #[test]
    fn test_unrelated_markup_fails_without_panicking() {
        let config = SiteConfig::default();
        let ctx = PageContext::new();
        let pages = [
            PageType::Season,
            PageType::Scorecard,
            PageType::CareerBatting,
            PageType::CareerBowling,
            PageType::InningsList,
            PageType::TeamBatting,
            PageType::TeamBowling,
            PageType::Teams,
        ];
        for page in pages {
            let result = extract_markup("<html><body><p>Access denied</p></body></html>", page, &ctx, &config);
            assert!(!result.success, "{page} should fail");
            assert!(result.records.is_empty());
        }
    }

    #[test]
    fn test_extract_with_retry_without_snapshots() {
        let mut config = SiteConfig::default();
        config.retry = crate::extract::RetryPolicy::once();
        let mut source = || -> Option<String> { None };
        let result = extract_with_retry(&mut source, PageType::Season, &PageContext::new(), &config);
        assert!(!result.success);
    }

    #[test]
    fn test_extract_with_retry_uses_later_snapshot() {
        let mut config = SiteConfig::default();
        config.retry = crate::extract::RetryPolicy {
            attempts: 3,
            delay: std::time::Duration::ZERO,
        };
        let rendered = r#"<div id="main-container"><div class="ReactCollapse--collapse"><div><div><ul>
            <li><a href="/records/trophy/team-averages/indian-premier-league-117?team=4343">Chennai Super Kings</a></li>
        </ul></div></div></div></div>"#;
        let mut snapshots = vec![
            "<div id=\"main-container\"><p>Loading…</p></div>".to_string(),
            rendered.to_string(),
        ]
        .into_iter();
        let mut calls = 0;
        let mut source = || {
            calls += 1;
            snapshots.next()
        };

        let result = extract_with_retry(&mut source, PageType::Teams, &PageContext::new(), &config);
        assert_eq!(calls, 2);
        assert!(result.success);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].value("team_id"), crate::models::Field::Int(4343));
    }
}
