//! Best-bowling figures in `W/R` form.

use crate::models::Field;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digits regex"));

/// Wickets and runs from a `W/R` cell. Both are known or both are missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BowlingFigures {
    pub raw: Field,
    pub wickets: Field,
    pub runs: Field,
}

fn first_number(s: &str) -> Option<i64> {
    DIGITS.find(s).and_then(|m| m.as_str().parse().ok())
}

fn split(text: &str) -> Option<(i64, i64)> {
    let (w, r) = text.split_once('/')?;
    if r.contains('/') {
        warn!(figures = text, "More than one '/' in bowling figures");
        return None;
    }
    Some((first_number(w)?, first_number(r)?))
}

/// Parse a `W/R` cell. `"-"`, missing input or any malformed side yields
/// missing wickets and runs.
pub fn parse(raw: &Field) -> BowlingFigures {
    let parsed = match raw.as_str() {
        None | Some("-") => None,
        Some(text) if !text.contains('/') => {
            warn!(figures = text, "Bowling figures without '/'");
            None
        }
        Some(text) => split(text),
    };
    let (wickets, runs) = match parsed {
        Some((w, r)) => (Field::Int(w), Field::Int(r)),
        None => (Field::Missing, Field::Missing),
    };
    BowlingFigures {
        raw: raw.clone(),
        wickets,
        runs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(s: &str) -> (Field, Field) {
        let f = parse(&Field::from_text(s));
        (f.wickets, f.runs)
    }

    #[test]
    fn test_figures() {
        assert_eq!(pair("3/15"), (Field::Int(3), Field::Int(15)));
        assert_eq!(pair(" 5/27 "), (Field::Int(5), Field::Int(27)));
    }

    #[test]
    fn test_missing_or_dash() {
        assert_eq!(pair("-"), (Field::Missing, Field::Missing));
        assert_eq!(parse(&Field::Missing).wickets, Field::Missing);
    }

    #[test]
    fn test_malformed_invalidates_both() {
        assert_eq!(pair("3-15"), (Field::Missing, Field::Missing));
        assert_eq!(pair("3/"), (Field::Missing, Field::Missing));
        assert_eq!(pair("x/15"), (Field::Missing, Field::Missing));
        assert_eq!(pair("1/2/3"), (Field::Missing, Field::Missing));
    }

    #[test]
    fn test_raw_is_kept() {
        assert_eq!(parse(&Field::from_text("3-15")).raw, Field::Text("3-15".into()));
    }
}
