//! Dismissal notation: "c Smith b Jones", "lbw b Starc", "run out (Smith)".

use crate::models::Field;
use crate::utils::{collapse_ws, strip_name_markers};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static FIELDER_AND_BOWLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:c|st)\s+(.+?)\s+b\s+(.+)$").expect("valid dismissal regex")
});

static BOWLED_BY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+b\s+").expect("valid bowler regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DismissalKind {
    NotOut,
    CaughtAndBowled,
    Stumped,
    Caught,
    RunOut,
    Lbw,
    Bowled,
    RetiredHurt,
    RetiredOut,
    HitWicket,
    /// Unrecognised notation, kept verbatim.
    Other(String),
}

impl fmt::Display for DismissalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DismissalKind::NotOut => "not out",
            DismissalKind::CaughtAndBowled => "caught and bowled",
            DismissalKind::Stumped => "stumped",
            DismissalKind::Caught => "caught",
            DismissalKind::RunOut => "run out",
            DismissalKind::Lbw => "lbw",
            DismissalKind::Bowled => "bowled",
            DismissalKind::RetiredHurt => "retired hurt",
            DismissalKind::RetiredOut => "retired out",
            DismissalKind::HitWicket => "hit wicket",
            DismissalKind::Other(raw) => raw,
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDismissal {
    pub raw: Field,
    /// `None` when the input was missing.
    pub kind: Option<DismissalKind>,
    pub fielder: Field,
    pub bowler: Field,
}

impl ParsedDismissal {
    fn missing() -> Self {
        Self {
            raw: Field::Missing,
            kind: None,
            fielder: Field::Missing,
            bowler: Field::Missing,
        }
    }

    pub fn kind_field(&self) -> Field {
        self.kind
            .as_ref()
            .map(|k| Field::Text(k.to_string()))
            .unwrap_or_default()
    }
}

fn name(s: &str) -> Field {
    Field::from_text(&strip_name_markers(s))
}

/// The text after `prefix` (already known to match case-insensitively).
fn after<'t>(text: &'t str, prefix: &str) -> &'t str {
    text.get(prefix.len()..).unwrap_or_default()
}

/// Fielder and bowler from "c X b Y" / "st X b Y", falling back to a split on
/// " b " and then to everything after the prefix as the fielder.
fn fielder_and_bowler(text: &str, prefix: &str) -> (Field, Field) {
    if let Some(c) = FIELDER_AND_BOWLER.captures(text) {
        return (name(&c[1]), name(&c[2]));
    }
    let rest = after(text, prefix);
    match BOWLED_BY.find(rest) {
        Some(m) => (name(&rest[..m.start()]), name(&rest[m.end()..])),
        None => (name(rest), Field::Missing),
    }
}

/// Parse a dismissal cell.
pub fn parse(raw: &Field) -> ParsedDismissal {
    let Some(text) = raw.as_str() else {
        return ParsedDismissal::missing();
    };
    let text = collapse_ws(text);
    let lower = text.to_lowercase();

    let (kind, fielder, bowler) = if lower == "not out" {
        (DismissalKind::NotOut, Field::Missing, Field::Missing)
    } else if lower.starts_with("c & b ") {
        let bowler = name(after(&text, "c & b "));
        (DismissalKind::CaughtAndBowled, bowler.clone(), bowler)
    } else if lower.starts_with("st ") {
        let (f, b) = fielder_and_bowler(&text, "st ");
        (DismissalKind::Stumped, f, b)
    } else if lower.starts_with("c ") {
        let (f, b) = fielder_and_bowler(&text, "c ");
        (DismissalKind::Caught, f, b)
    } else if lower.starts_with("run out") {
        let fielder = match (text.find('('), text.rfind(')')) {
            (Some(open), Some(close)) if open < close => name(&text[open + 1..close]),
            _ => Field::Missing,
        };
        (DismissalKind::RunOut, fielder, Field::Missing)
    } else if lower.starts_with("lbw b ") {
        (DismissalKind::Lbw, Field::Missing, name(after(&text, "lbw b ")))
    } else if lower.starts_with("b ") {
        (DismissalKind::Bowled, Field::Missing, name(after(&text, "b ")))
    } else if lower == "retired hurt" {
        (DismissalKind::RetiredHurt, Field::Missing, Field::Missing)
    } else if lower == "retired out" {
        (DismissalKind::RetiredOut, Field::Missing, Field::Missing)
    } else if lower.starts_with("hit wicket") {
        let bowler = BOWLED_BY
            .find(&text)
            .map(|m| name(&text[m.end()..]))
            .unwrap_or_default();
        (DismissalKind::HitWicket, Field::Missing, bowler)
    } else {
        (DismissalKind::Other(text.clone()), Field::Missing, Field::Missing)
    };

    ParsedDismissal {
        raw: Field::Text(text),
        kind: Some(kind),
        fielder,
        bowler,
    }
}
