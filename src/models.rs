//! Data models shared by the extraction core and the output shell.
//!
//! This module defines the values that cross the core/shell boundary:
//! - [`Field`]: a single extracted value, or the one "missing" sentinel
//! - [`Record`]: an ordered field-name → [`Field`] mapping (one logical row)
//! - [`PageResult`]: the records of one page plus its success flag
//! - [`PageContext`]: page-scoped identifiers stamped into every record
//! - [`PageType`]: which page layout a document follows
//!
//! Records keep insertion order so that extracting the same document twice
//! serializes to identical bytes.

use clap::ValueEnum;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use url::Url;

/// One extracted value.
///
/// Absence of data is a normal outcome of extraction, so there is exactly one
/// way to represent it: [`Field::Missing`]. Serializes as JSON `null`, a
/// boolean, a number, or a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Field {
    /// No data: absent node, empty text, or a failed parse.
    #[default]
    Missing,
    /// A flag produced by a grammar (not-out stars).
    Bool(bool),
    /// A numeric value produced by a grammar (ids, margins, years, runs).
    Int(i64),
    /// Raw or cleaned text.
    Text(String),
}

impl Field {
    /// Build a field from raw text, treating whitespace-only text as missing.
    pub fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            Field::Missing
        } else {
            Field::Text(trimmed.to_string())
        }
    }

    /// Parse a whole string as an integer; anything else is missing.
    pub fn int_from(s: &str) -> Self {
        s.trim().parse::<i64>().map(Field::Int).unwrap_or(Field::Missing)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Field::Missing)
    }

    /// Borrow the text of a [`Field::Text`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Field::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Field::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Use `other` when this field is missing.
    pub fn or(self, other: Field) -> Field {
        if self.is_missing() { other } else { self }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Missing => Ok(()),
            Field::Bool(b) => write!(f, "{b}"),
            Field::Int(n) => write!(f, "{n}"),
            Field::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Field {
    fn from(s: &str) -> Self {
        Field::from_text(s)
    }
}

impl From<String> for Field {
    fn from(s: String) -> Self {
        Field::from_text(&s)
    }
}

impl From<bool> for Field {
    fn from(b: bool) -> Self {
        Field::Bool(b)
    }
}

impl From<i64> for Field {
    fn from(n: i64) -> Self {
        Field::Int(n)
    }
}

impl From<u32> for Field {
    fn from(n: u32) -> Self {
        Field::Int(i64::from(n))
    }
}

impl<T: Into<Field>> From<Option<T>> for Field {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Field::Missing)
    }
}

/// One logical record: a batting line, a bowling line, a match summary, …
///
/// Field order is insertion order. Setting an existing name replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Field)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field.
    pub fn set(&mut self, name: &str, value: impl Into<Field>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    /// Builder form of [`Record::set`].
    pub fn with(mut self, name: &str, value: impl Into<Field>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// The value of `name`, or [`Field::Missing`] when the record lacks it.
    pub fn value(&self, name: &str) -> Field {
        self.get(name).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// The page layouts the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageType {
    /// Season results: one row per match with margin, ground and scorecard link.
    Season,
    /// Full match scorecard: batting and bowling tables for up to two innings.
    Scorecard,
    /// A player's career batting averages.
    CareerBatting,
    /// A player's career bowling averages.
    CareerBowling,
    /// A player's innings-by-innings batting list.
    InningsList,
    /// A team's batting averages for a trophy.
    TeamBatting,
    /// A team's bowling averages for a trophy.
    TeamBowling,
    /// The list of teams that took part in a trophy.
    Teams,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Season => "season",
            PageType::Scorecard => "scorecard",
            PageType::CareerBatting => "career-batting",
            PageType::CareerBowling => "career-bowling",
            PageType::InningsList => "innings-list",
            PageType::TeamBatting => "team-batting",
            PageType::TeamBowling => "team-bowling",
            PageType::Teams => "teams",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of extracting one page.
///
/// `success` is true iff at least one structurally valid table was located
/// and row-reconstructed, independent of individual field parse failures.
/// The shell uses it to decide whether to keep the records or queue a retry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult {
    pub page: PageType,
    pub records: Vec<Record>,
    pub success: bool,
}

impl PageResult {
    /// A failed page with no records.
    pub fn failed(page: PageType) -> Self {
        Self {
            page,
            records: Vec::new(),
            success: false,
        }
    }
}

/// How one input fared in a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub success: bool,
    pub records: usize,
    /// Fetch-and-extract passes, including retries of failed pages.
    pub attempts: usize,
}

/// Everything one run of the binary writes for one page type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub page: PageType,
    pub run_date: String,
    pub started_at: String,
    pub finished_at: String,
    pub sources: Vec<SourceReport>,
    pub records: Vec<Record>,
}

/// Page-scoped identifiers supplied by the caller.
///
/// Each extractor stamps the identifiers relevant to its page type into the
/// records it emits; the rest are ignored.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub match_id: Field,
    pub season: Field,
    pub player_id: Field,
    pub player_name: Field,
    pub team_id: Field,
    /// Team names known in advance, in batting order. Used when the page
    /// heading for an innings cannot be located.
    pub team_names: Vec<String>,
    /// Base URL used to resolve relative links.
    pub base_url: Option<Url>,
}

impl PageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match_id(mut self, id: impl Into<Field>) -> Self {
        self.match_id = id.into();
        self
    }

    pub fn with_season(mut self, season: impl Into<Field>) -> Self {
        self.season = season.into();
        self
    }

    pub fn with_player(mut self, id: impl Into<Field>, name: impl Into<Field>) -> Self {
        self.player_id = id.into();
        self.player_name = name.into();
        self
    }

    pub fn with_team_id(mut self, id: impl Into<Field>) -> Self {
        self.team_id = id.into();
        self
    }

    pub fn with_team_names(mut self, names: Vec<String>) -> Self {
        self.team_names = names;
        self
    }

    pub fn with_base_url(mut self, base: Url) -> Self {
        self.base_url = Some(base);
        self
    }

    /// The known name of the team batting in `innings` (1-based).
    pub fn team_name(&self, innings: usize) -> Option<&str> {
        innings
            .checked_sub(1)
            .and_then(|i| self.team_names.get(i))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_from_text_treats_blank_as_missing() {
        assert_eq!(Field::from_text("  "), Field::Missing);
        assert_eq!(Field::from_text(" 42 "), Field::Text("42".to_string()));
    }

    #[test]
    fn test_field_serialization() {
        let json = serde_json::to_string(&vec![
            Field::Missing,
            Field::Bool(true),
            Field::Int(7),
            Field::Text("tied".to_string()),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,true,7,"tied"]"#);
    }

    #[test]
    fn test_field_or() {
        assert_eq!(Field::Missing.or(Field::Int(1)), Field::Int(1));
        assert_eq!(Field::Int(2).or(Field::Int(1)), Field::Int(2));
    }

    #[test]
    fn test_record_keeps_insertion_order() {
        let record = Record::new()
            .with("match_id", 1254058i64)
            .with("batter", "V Kohli")
            .with("runs", Field::Missing);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"match_id":1254058,"batter":"V Kohli","runs":null}"#);
    }

    #[test]
    fn test_record_set_replaces_in_place() {
        let mut record = Record::new().with("a", 1i64).with("b", 2i64);
        record.set("a", 3i64);
        assert_eq!(record.len(), 2);
        assert_eq!(record.value("a"), Field::Int(3));
        assert_eq!(record.iter().next().map(|(n, _)| n), Some("a"));
    }

    #[test]
    fn test_record_value_of_absent_field() {
        let record = Record::new();
        assert!(record.is_empty());
        assert_eq!(record.value("nope"), Field::Missing);
    }

    #[test]
    fn test_page_context_team_name() {
        let ctx = PageContext::new().with_team_names(vec!["CSK".into(), "MI".into()]);
        assert_eq!(ctx.team_name(1), Some("CSK"));
        assert_eq!(ctx.team_name(2), Some("MI"));
        assert_eq!(ctx.team_name(0), None);
        assert_eq!(ctx.team_name(3), None);
    }

    #[test]
    fn test_page_type_names() {
        assert_eq!(PageType::CareerBatting.to_string(), "career-batting");
        let failed = PageResult::failed(PageType::Scorecard);
        assert!(!failed.success);
        assert!(failed.records.is_empty());
    }
}
