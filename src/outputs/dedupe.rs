//! Duplicate elimination across pages of one run.
//!
//! The same match or player can be reached from more than one input (two
//! season pages listing a final, a retried page that half-succeeded the first
//! time). Records are considered the same when their key fields are equal;
//! the first one seen wins. Records missing every anchor field of their page
//! cannot be told apart from genuine repeats and are always kept.

use crate::models::{Field, PageType, Record};
use itertools::Itertools;
use tracing::info;

/// Fields that identify a record of `page`.
pub fn key_fields(page: PageType) -> &'static [&'static str] {
    match page {
        PageType::Season => &["match_id"],
        PageType::Scorecard => &["segment", "match_id", "innings", "batter", "batter_id", "bowler", "bowler_id"],
        PageType::CareerBatting | PageType::CareerBowling => &["player_id", "format"],
        PageType::InningsList => &["player_id", "start_date", "innings", "opposition", "runs"],
        PageType::TeamBatting | PageType::TeamBowling => &["team_id", "player_id"],
        PageType::Teams => &["team_id"],
    }
}

/// Fields of which at least one must be present for a record to be compared.
fn anchor_fields(page: PageType) -> &'static [&'static str] {
    match page {
        PageType::InningsList => &["start_date", "opposition"],
        _ => &[],
    }
}

fn key(record: &Record, position: usize, fields: &[&str], anchors: &[&str]) -> Vec<Field> {
    let mut key: Vec<Field> = fields.iter().map(|f| record.value(f)).collect();
    if !anchors.is_empty() && anchors.iter().all(|f| record.value(f).is_missing()) {
        key.push(Field::Int(position as i64));
    }
    key
}

/// Drop records whose key repeats an earlier record's.
pub fn dedupe(page: PageType, records: Vec<Record>) -> Vec<Record> {
    let (fields, anchors) = (key_fields(page), anchor_fields(page));
    let before = records.len();
    let unique: Vec<Record> = records
        .into_iter()
        .enumerate()
        .unique_by(|(i, r)| key(r, *i, fields, anchors))
        .map(|(_, r)| r)
        .collect();
    if unique.len() < before {
        info!(%page, before, after = unique.len(), "Removed duplicate records");
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_record_wins() {
        let records = vec![
            Record::new().with("match_id", 501198i64).with("winner", "CSK"),
            Record::new().with("match_id", 501199i64).with("winner", "RR"),
            Record::new().with("match_id", 501198i64).with("winner", "KKR"),
        ];
        let unique = dedupe(PageType::Season, records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].value("winner"), Field::Text("CSK".into()));
    }

    #[test]
    fn test_scorecard_batting_and_bowling_are_distinct() {
        let records = vec![
            Record::new()
                .with("segment", "batting")
                .with("match_id", 1i64)
                .with("innings", 1i64)
                .with("batter", "DJ Bravo"),
            Record::new()
                .with("segment", "bowling")
                .with("match_id", 1i64)
                .with("innings", 1i64)
                .with("bowler", "DJ Bravo"),
        ];
        assert_eq!(dedupe(PageType::Scorecard, records).len(), 2);
    }

    #[test]
    fn test_partial_innings_rows_are_kept() {
        let records = vec![
            Record::new().with("player_id", 253802i64).with("runs", "absent"),
            Record::new().with("player_id", 253802i64).with("runs", "DNB"),
            Record::new().with("player_id", 253802i64).with("runs", "DNB"),
        ];
        assert_eq!(dedupe(PageType::InningsList, records).len(), 3);
    }

    #[test]
    fn test_repeated_innings_are_removed() {
        let innings = || {
            Record::new()
                .with("player_id", 253802i64)
                .with("runs", "73")
                .with("opposition", "v Pakistan")
                .with("start_date", "18 Mar 2012")
        };
        let other = innings().with("runs", "12");
        let unique = dedupe(PageType::InningsList, vec![innings(), innings(), other]);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[1].value("runs"), Field::Text("12".into()));
    }
}
