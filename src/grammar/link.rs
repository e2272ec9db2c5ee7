//! Numeric identifiers carried in profile, ground, match and team links.
//!
//! # Patterns
//!
//! | Kind   | Pattern(s), first match wins                        |
//! |--------|-----------------------------------------------------|
//! | Ground | `[/-](\d+)/?$`                                      |
//! | Player | `/cricketers/.*?-(\d+)`, then `(?:-\|/)(\d+)(?:\.html)?$` |
//! | Match  | `-(\d+)/[^/]*$`, then `[/-](\d+)/?$`                |
//! | Team   | the `team` query parameter                          |

use crate::extract::field;
use crate::models::Field;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use tracing::{debug, warn};
use url::{Url, form_urlencoded};

static GROUND: Lazy<Vec<Regex>> = Lazy::new(|| compile(&[r"[/-](\d+)/?$"]));
static PLAYER: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"/cricketers/.*?-(\d+)", r"(?:-|/)(\d+)(?:\.html)?$"]));
static MATCH: Lazy<Vec<Regex>> = Lazy::new(|| compile(&[r"-(\d+)/[^/]*$", r"[/-](\d+)/?$"]));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().filter_map(|p| Regex::new(p).ok()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Ground,
    Player,
    Match,
    Team,
}

/// A link's href and the identifier found in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkId {
    pub href: Field,
    pub id: Field,
}

/// `node` itself when it is an anchor with an href, else its first
/// descendant `a[href]`.
pub fn anchor(node: Option<ElementRef<'_>>) -> Option<ElementRef<'_>> {
    let el = node?;
    if el.value().name() == "a" && el.value().attr("href").is_some() {
        return Some(el);
    }
    field::select_first(el, "a[href]")
}

fn numeric(s: &str) -> Field {
    Field::int_from(s).or(Field::from_text(s))
}

/// Extract an identifier of `kind` from an href.
pub fn id_from_href(href: &str, kind: IdKind) -> Field {
    let patterns: &[Regex] = match kind {
        IdKind::Ground => &GROUND,
        IdKind::Player => &PLAYER,
        IdKind::Match => &MATCH,
        IdKind::Team => return team_param(href),
    };
    patterns
        .iter()
        .find_map(|re| re.captures(href))
        .map(|c| numeric(&c[1]))
        .unwrap_or_else(|| {
            warn!(?kind, href, "No identifier in link");
            Field::Missing
        })
}

fn team_param(href: &str) -> Field {
    let query = href
        .split_once('?')
        .map(|(_, q)| q.split('#').next().unwrap_or_default())
        .unwrap_or_default();
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "team")
        .map(|(_, v)| numeric(&v))
        .unwrap_or_else(|| {
            debug!(href, "No team parameter in link");
            Field::Missing
        })
}

/// Href and identifier of the link in or at `node`.
pub fn id_from_link(node: Option<ElementRef<'_>>, kind: IdKind) -> LinkId {
    let Some(a) = anchor(node) else {
        debug!(?kind, "No anchor with href");
        return LinkId::default();
    };
    let href = field::attr(Some(a), "href");
    let id = href
        .as_str()
        .map(|h| id_from_href(h, kind))
        .unwrap_or_default();
    LinkId { href, id }
}

/// Absolute form of `href` against `base`; unchanged without a base or when
/// joining fails.
pub fn resolve(base: Option<&Url>, href: &Field) -> Field {
    match (base, href.as_str()) {
        (Some(base), Some(h)) => base
            .join(h)
            .map(|u| Field::Text(u.to_string()))
            .unwrap_or_else(|_| href.clone()),
        _ => href.clone(),
    }
}
