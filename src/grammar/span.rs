//! Career spans: "2011-2013" or "2015".

use crate::models::Field;
use tracing::debug;

/// First and last season of a career span.
///
/// Well-formed spans yield integer years. Anything else is passed through as
/// the same text for both ends, which tells downstream numeric coercion the
/// field is not a year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CareerSpan {
    pub raw: Field,
    pub first: Field,
    pub last: Field,
}

fn year(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

fn years(text: &str) -> Option<(i64, i64)> {
    match text.split_once('-') {
        Some((a, b)) => Some((year(a)?, year(b)?)),
        None => year(text).map(|y| (y, y)),
    }
}

pub fn parse(raw: &Field) -> CareerSpan {
    let (first, last) = match raw.as_str() {
        None => (Field::Missing, Field::Missing),
        Some(text) => match years(text) {
            Some((a, b)) => (Field::Int(a), Field::Int(b)),
            None => {
                debug!(span = text, "Span is not a year range; passing through");
                (raw.clone(), raw.clone())
            }
        },
    };
    CareerSpan {
        raw: raw.clone(),
        first,
        last,
    }
}
