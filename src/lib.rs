//! # scorecard_scrape
//!
//! Resilient extraction of cricket statistics from HTML pages whose markup
//! drifts between seasons: season results, full scorecards, career averages,
//! innings lists, team averages and team lists.
//!
//! ## Architecture
//!
//! The extraction core is synchronous and pure over a parsed document:
//! 1. **Locate**: find each table through an ordered list of strategies
//!    ([`extract::Locator`]), re-parsing fresh snapshots while the page settles
//! 2. **Reconstruct**: turn raw `<tr>` rows into logical rows, dropping
//!    footers and merging dismissal-detail rows ([`extract::Reconstructor`])
//! 3. **Map**: read cells by field name through a configured schema
//!    ([`extract::TableSchema`])
//! 4. **Parse**: apply small text grammars ([`grammar`]) and assemble
//!    ordered [`Record`]s into a [`PageResult`]
//!
//! Selectors, schemas and row rules live in one immutable [`SiteConfig`].
//! The binary adds fetching ([`fetch`]), bounded concurrency and JSON output
//! ([`outputs`]).
//!
//! ## Usage
//!
//! ```ignore
//! use scorecard_scrape::{PageContext, PageType, SiteConfig, pages};
//!
//! let config = SiteConfig::default();
//! let ctx = PageContext::new().with_match_id(501198i64);
//! let result = pages::extract_markup(&html, PageType::Scorecard, &ctx, &config);
//! ```

pub mod config;
pub mod extract;
pub mod fetch;
pub mod grammar;
pub mod models;
pub mod outputs;
pub mod pages;
pub mod utils;

pub use config::SiteConfig;
pub use models::{Field, PageContext, PageResult, PageType, Record};
