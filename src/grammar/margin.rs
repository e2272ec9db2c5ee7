//! Match result margins: "Mumbai won by 23 runs", "5 wickets", "tied".

use crate::models::Field;
use once_cell::sync::Lazy;
use regex::Regex;

static WON_BY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(.+?)\s+won by\s+(\d+)\s+(runs|wickets|wicket|run)\b").expect("valid margin regex")
});
static BARE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+)\s+(runs|wickets|wicket|run)\b").expect("valid margin regex"));

/// A parsed margin. Either both the number and the unit are known, the text
/// is kept verbatim, or there is nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Margin {
    Runs(u32),
    Wickets(u32),
    /// Present but not a runs/wickets margin ("tied", "no result", ...).
    Verbatim(String),
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMargin {
    pub raw: Field,
    pub margin: Margin,
}

impl ParsedMargin {
    pub fn net_margin(&self) -> Field {
        match self.margin {
            Margin::Runs(n) | Margin::Wickets(n) => Field::from(n),
            _ => Field::Missing,
        }
    }

    /// "runs", "wickets", the verbatim text, or missing.
    pub fn margin_type(&self) -> Field {
        match &self.margin {
            Margin::Runs(_) => Field::Text("runs".into()),
            Margin::Wickets(_) => Field::Text("wickets".into()),
            Margin::Verbatim(s) => Field::Text(s.clone()),
            Margin::Missing => Field::Missing,
        }
    }
}

fn unit(n: &str, unit: &str) -> Option<Margin> {
    let n = n.parse().ok()?;
    match unit.to_lowercase().as_str() {
        "run" | "runs" => Some(Margin::Runs(n)),
        "wicket" | "wickets" => Some(Margin::Wickets(n)),
        _ => None,
    }
}

/// Parse a margin cell.
pub fn parse(raw: &Field) -> ParsedMargin {
    let margin = match raw.as_str() {
        None | Some("-") => Margin::Missing,
        Some(text) => WON_BY
            .captures(text)
            .and_then(|c| unit(&c[2], &c[3]))
            .or_else(|| BARE.captures(text).and_then(|c| unit(&c[1], &c[2])))
            .unwrap_or_else(|| Margin::Verbatim(text.to_string())),
    };
    ParsedMargin {
        raw: raw.clone(),
        margin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(s: &str) -> (Field, Field) {
        let p = parse(&Field::from_text(s));
        (p.net_margin(), p.margin_type())
    }

    #[test]
    fn test_bare_margins() {
        assert_eq!(parsed("23 runs"), (Field::Int(23), Field::Text("runs".into())));
        assert_eq!(parsed("5 wicket"), (Field::Int(5), Field::Text("wickets".into())));
        assert_eq!(parsed("1 run"), (Field::Int(1), Field::Text("runs".into())));
        assert_eq!(parsed("7 Wickets"), (Field::Int(7), Field::Text("wickets".into())));
    }

    #[test]
    fn test_won_by_sentence() {
        assert_eq!(
            parsed("Chennai Super Kings won by 58 runs"),
            (Field::Int(58), Field::Text("runs".into()))
        );
        assert_eq!(
            parsed("Mumbai Indians won by 8 wickets (with 12 balls remaining)"),
            (Field::Int(8), Field::Text("wickets".into()))
        );
    }

    #[test]
    fn test_verbatim_fallback() {
        assert_eq!(parsed("tied"), (Field::Missing, Field::Text("tied".into())));
        assert_eq!(parsed("no result"), (Field::Missing, Field::Text("no result".into())));
        let p = parse(&Field::from_text("tied"));
        assert_eq!(p.raw, Field::Text("tied".into()));
    }

    #[test]
    fn test_missing_and_dash() {
        assert_eq!(parsed("-"), (Field::Missing, Field::Missing));
        assert_eq!(parse(&Field::Missing).margin, Margin::Missing);
    }

    #[test]
    fn test_number_without_unit_is_verbatim() {
        assert_eq!(parsed("23 overs"), (Field::Missing, Field::Text("23 overs".into())));
    }
}
