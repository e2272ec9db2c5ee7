//! Run counts with a not-out star: "123*", "45", "DNB".

use crate::models::Field;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScore {
    pub raw: Field,
    pub runs: Field,
    pub not_out: bool,
}

/// Parse a runs or highest-score cell. Non-numeric cells keep their raw text
/// with runs missing.
pub fn parse(raw: &Field) -> ParsedScore {
    let (runs, not_out) = match raw.as_str() {
        Some(text) => {
            let not_out = text.ends_with('*');
            (Field::int_from(text.trim_end_matches('*')), not_out)
        }
        None => (Field::Missing, false),
    };
    ParsedScore {
        raw: raw.clone(),
        runs,
        not_out,
    }
}
