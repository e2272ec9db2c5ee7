//! Multi-strategy location of a target subtree.
//!
//! A [`Locator`] is an ordered list of [`Strategy`] values. Strategies are
//! tried in order against a parsed document; each miss is logged as
//! exhausted before the next one runs, so new fallbacks can be appended in
//! configuration without touching control flow.
//!
//! # States
//!
//! ```text
//! NotTried ──► PrimaryFound
//!    │
//!    └──────► ContainerFallback ──► Found
//!                      │
//!                      └──────────► Exhausted
//! ```
//!
//! [`settle`] adds the bounded retry loop: it re-parses fresh snapshots from
//! a [`SnapshotSource`] until the locator finds its target or the attempt
//! budget runs out.

use crate::extract::field::{self, selector};
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// One way of finding the target element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// Select against the whole document.
    Select { selector: String },
    /// Narrow to a more stable ancestor container, then select inside it.
    WithinContainer { container: String, selector: String },
    /// Find a caption element whose text contains `text`, then take the
    /// first following sibling of the caption's parent matching `sibling`.
    AfterCaption {
        caption: String,
        text: String,
        sibling: String,
    },
}

impl Strategy {
    pub fn select(css: &str) -> Self {
        Strategy::Select {
            selector: css.to_string(),
        }
    }

    pub fn within(container: &str, css: &str) -> Self {
        Strategy::WithinContainer {
            container: container.to_string(),
            selector: css.to_string(),
        }
    }

    pub fn after_caption(caption: &str, text: &str, sibling: &str) -> Self {
        Strategy::AfterCaption {
            caption: caption.to_string(),
            text: text.to_string(),
            sibling: sibling.to_string(),
        }
    }

    /// Every CSS selector this strategy uses.
    pub fn selectors(&self) -> Vec<&str> {
        match self {
            Strategy::Select { selector } => vec![selector.as_str()],
            Strategy::WithinContainer { container, selector } => {
                vec![container.as_str(), selector.as_str()]
            }
            Strategy::AfterCaption { caption, sibling, .. } => {
                vec![caption.as_str(), sibling.as_str()]
            }
        }
    }

    /// Run this strategy against a document.
    pub fn attempt<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        match self {
            Strategy::Select { selector: css } => doc.select(&selector(css)?).next(),
            Strategy::WithinContainer { container, selector: css } => {
                let scope = doc.select(&selector(container)?).next()?;
                field::select_first(scope, css)
            }
            Strategy::AfterCaption { caption, text, sibling } => {
                let caption_sel = selector(caption)?;
                let sibling_sel = selector(sibling)?;
                let caption_el = doc
                    .select(&caption_sel)
                    .find(|el| el.text().collect::<String>().contains(text.as_str()))?;
                let parent = caption_el.parent().and_then(ElementRef::wrap)?;
                parent
                    .next_siblings()
                    .filter_map(ElementRef::wrap)
                    .find(|el| sibling_sel.matches(el))
            }
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Select { selector } => write!(f, "select '{selector}'"),
            Strategy::WithinContainer { container, selector } => {
                write!(f, "select '{selector}' within '{container}'")
            }
            Strategy::AfterCaption { caption, text, sibling } => {
                write!(f, "'{sibling}' after {caption} containing '{text}'")
            }
        }
    }
}

/// Where the locator is in its search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateState {
    NotTried,
    PrimaryFound,
    ContainerFallback,
    Found,
    Exhausted,
}

/// The outcome of [`Locator::locate`].
#[derive(Debug, Clone, Copy)]
pub enum Located<'a> {
    /// The first strategy matched.
    Primary(ElementRef<'a>),
    /// A later strategy matched; `strategy` is its index.
    Fallback { element: ElementRef<'a>, strategy: usize },
    /// Every strategy missed.
    Exhausted,
}

impl<'a> Located<'a> {
    pub fn element(&self) -> Option<ElementRef<'a>> {
        match self {
            Located::Primary(el) | Located::Fallback { element: el, .. } => Some(*el),
            Located::Exhausted => None,
        }
    }

    pub fn state(&self) -> LocateState {
        match self {
            Located::Primary(_) => LocateState::PrimaryFound,
            Located::Fallback { .. } => LocateState::Found,
            Located::Exhausted => LocateState::Exhausted,
        }
    }
}

/// An ordered list of strategies for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Locator {
    strategies: Vec<Strategy>,
}

impl Locator {
    pub const fn new(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    /// Append a fallback strategy.
    pub fn then(mut self, strategy: Strategy) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Try each strategy in order. Never fails; a total miss is
    /// [`Located::Exhausted`].
    pub fn locate<'a>(&self, doc: &'a Html) -> Located<'a> {
        let mut state = LocateState::NotTried;
        for (i, strategy) in self.strategies.iter().enumerate() {
            if let Some(element) = strategy.attempt(doc) {
                if i == 0 {
                    debug!(%strategy, "Located target with primary strategy");
                    return Located::Primary(element);
                }
                debug!(%strategy, index = i, ?state, "Located target with fallback strategy");
                return Located::Fallback { element, strategy: i };
            }
            debug!(%strategy, index = i, "Strategy exhausted");
            state = LocateState::ContainerFallback;
        }
        debug!(strategies = self.strategies.len(), ?state, "All strategies exhausted");
        Located::Exhausted
    }
}

/// Supplies fresh copies of a page's markup for re-parsing.
///
/// The browser or fetch collaborator implements this; the locator only ever
/// reads from it.
pub trait SnapshotSource {
    /// The current markup, or `None` if no snapshot is available right now.
    fn snapshot(&mut self) -> Option<String>;
}

impl<F> SnapshotSource for F
where
    F: FnMut() -> Option<String>,
{
    fn snapshot(&mut self) -> Option<String> {
        self()
    }
}

/// A snapshot that never changes (already-fetched markup).
#[derive(Debug, Clone)]
pub struct StaticSnapshot(pub String);

impl SnapshotSource for StaticSnapshot {
    fn snapshot(&mut self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Re-reads a file on every snapshot, for pages dumped to disk by a browser
/// that may still be rendering.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    pub path: PathBuf,
}

impl SnapshotSource for FileSnapshot {
    fn snapshot(&mut self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(markup) => Some(markup),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Snapshot read failed");
                None
            }
        }
    }
}

/// Bounds for the re-parse loop in [`settle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total snapshot attempts, including the first.
    pub attempts: usize,
    /// Pause between attempts.
    #[serde(with = "millis")]
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A single attempt with no delay.
    pub fn once() -> Self {
        Self {
            attempts: 1,
            delay: Duration::ZERO,
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// The document produced by [`settle`].
#[derive(Debug)]
pub struct Settled {
    /// The last document parsed, if any snapshot was available.
    pub document: Option<Html>,
    /// Whether the locator found its target in `document`.
    pub found: bool,
    /// Attempts used.
    pub attempts: usize,
}

/// Re-parse snapshots until `locator` finds its target.
///
/// Synchronous and bounded: at most `policy.attempts` snapshots, sleeping
/// `policy.delay` between them. Never fails; exhaustion is reported through
/// [`Settled::found`] together with the last document seen.
#[instrument(level = "debug", skip_all, fields(attempts = policy.attempts))]
pub fn settle<S>(source: &mut S, locator: &Locator, policy: &RetryPolicy) -> Settled
where
    S: SnapshotSource + ?Sized,
{
    let attempts = policy.attempts.max(1);
    let mut last = None;
    for attempt in 1..=attempts {
        if let Some(markup) = source.snapshot() {
            let doc = Html::parse_document(&markup);
            if locator.locate(&doc).element().is_some() {
                if attempt > 1 {
                    info!(attempt, "Target located after re-parse");
                }
                return Settled {
                    document: Some(doc),
                    found: true,
                    attempts: attempt,
                };
            }
            last = Some(doc);
        }
        if attempt < attempts {
            warn!(attempt, max = attempts, delay = ?policy.delay, "Target not found in snapshot; retrying");
            std::thread::sleep(policy.delay);
        }
    }
    error!(attempts, "Target not found after exhausting snapshot attempts");
    Settled {
        document: last,
        found: false,
        attempts,
    }
}
