//! Team batting and bowling averages for a trophy.
//!
//! These tables change columns between segments and seasons, so the schema
//! is built from the header row of each table and rows must match the
//! header width exactly.

use crate::config::SiteConfig;
use crate::extract::{LogicalRow, Reconstructor, TableSchema, body_rows, field};
use crate::grammar::{figures, player, score, span};
use crate::models::{PageContext, PageResult, PageType, Record};
use crate::pages::{found, locate_segment};
use scraper::{ElementRef, Html};
use std::fmt;
use tracing::{instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Batting,
    Bowling,
}

impl Segment {
    fn page(self) -> PageType {
        match self {
            Segment::Batting => PageType::TeamBatting,
            Segment::Bowling => PageType::TeamBowling,
        }
    }

    fn columns(self, config: &SiteConfig) -> &[(String, String)] {
        match self {
            Segment::Batting => &config.team_averages.batting_columns,
            Segment::Bowling => &config.team_averages.bowling_columns,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Batting => f.write_str("batting averages"),
            Segment::Bowling => f.write_str("bowling averages"),
        }
    }
}

#[instrument(level = "info", skip_all, fields(team_id = %ctx.team_id, %segment))]
pub fn extract(doc: &Html, ctx: &PageContext, config: &SiteConfig, segment: Segment) -> PageResult {
    let layout = &config.team_averages;
    let page = segment.page();
    let Some(table) = locate_segment(doc, &layout.table, &segment.to_string()) else {
        return PageResult::failed(page);
    };
    let headers = headers(table, &layout.header_row);
    if headers.is_empty() {
        warn!("Averages table has no header row");
        return PageResult::failed(page);
    }

    let schema = TableSchema::from_headers(&headers);
    let rows = body_rows(table);
    let columns = segment.columns(config);
    let records = Reconstructor::new(&schema, &layout.rules)
        .logical_rows(&rows)
        .iter()
        .filter_map(|row| record(row, ctx, columns, &layout.rules.profile_link_marker))
        .collect();
    found(page, records)
}

fn headers(table: ElementRef<'_>, css: &str) -> Vec<String> {
    let Some(row) = field::select_first(table, css) else {
        return Vec::new();
    };
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "th" | "td"))
        .map(|el| field::text(Some(el)).to_string())
        .collect()
}

fn record(row: &LogicalRow<'_, '_>, ctx: &PageContext, columns: &[(String, String)], marker: &str) -> Option<Record> {
    let cells = &row.row;
    let mut record = Record::new().with("team_id", ctx.team_id.clone());
    for (header, name) in columns {
        let value = cells.text(header);
        match header.as_str() {
            "Player" => {
                let player = player::player_info(cells.cell(header), marker);
                if player.id.is_missing() {
                    warn!(row = row.index, player = %player.name, "Skipping player without id");
                    return None;
                }
                record.set(name, player.name);
                record.set("player_id", player.id);
            }
            "Span" => {
                let span = span::parse(&value);
                record.set("first_season", span.first);
                record.set("last_season", span.last);
                record.set(name, span.raw);
            }
            "HS" => {
                let highest = score::parse(&value);
                record.set(name, highest.runs.or(highest.raw));
            }
            "BBI" => {
                let bbi = figures::parse(&value);
                record.set(name, bbi.raw);
                record.set(&format!("{name}_wickets"), bbi.wickets);
                record.set(&format!("{name}_runs"), bbi.runs);
            }
            _ => record.set(name, value),
        }
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use crate::pages::extract_markup;

    const BATTING: &str = r#"<html><body><table class="ds-table">
        <thead><tr><th>Player</th><th>Span</th><th>Mat</th><th>Inns</th><th>NO</th><th>Runs</th><th>HS</th><th>Ave</th><th>BF</th><th>SR</th><th>100</th><th>50</th><th>0</th><th>4s</th><th>6s</th></tr></thead>
        <tbody>
          <tr><td><a href="/cricketers/suresh-raina-33335"><span>Suresh Raina</span></a></td><td>2008-2015</td><td>118</td><td>115</td><td>15</td><td>3699</td><td>100*</td><td>36.99</td><td>2637</td><td>140.27</td><td>1</td><td>26</td><td>6</td><td>354</td><td>146</td></tr>
          <tr><td><a href="/cricketers/ms-dhoni-28081">MS Dhoni †</a></td><td>2008</td><td>16</td><td>14</td><td>4</td><td>414</td><td>65</td><td>41.40</td><td>310</td><td>133.54</td><td>0</td><td>2</td><td>0</td><td>30</td><td>14</td></tr>
          <tr><td>Extras</td><td colspan="14">12</td></tr>
          <tr><td>Team total</td><td>-</td><td>16</td><td>16</td><td>0</td><td>2300</td><td>-</td><td>-</td><td>-</td><td>-</td><td>0</td><td>10</td><td>0</td><td>200</td><td>90</td></tr>
        </tbody></table></body></html>"#;

    const BOWLING: &str = r#"<html><body><table class="ds-table">
        <thead><tr><th>Player</th><th>Span</th><th>Mat</th><th>Inns</th><th>Overs</th><th>Mdns</th><th>Runs</th><th>Wkts</th><th>BBI</th><th>Ave</th><th>Econ</th><th>SR</th><th>4</th><th>5</th></tr></thead>
        <tbody>
          <tr><td><a href="/cricketers/dwayne-bravo-51439">Dwayne Bravo</a></td><td>2011-2015</td><td>60</td><td>58</td><td>210.2</td><td>1</td><td>1720</td><td>84</td><td>4/42</td><td>20.47</td><td>8.17</td><td>15.0</td><td>1</td><td>0</td></tr>
          <tr><td><a href="/cricketers/r-ashwin-26421">R Ashwin</a></td><td>2010-2015</td><td>80</td><td>79</td><td>300.0</td><td>2</td><td>2000</td><td>75</td><td>-</td><td>26.6</td><td>6.6</td><td>24.0</td><td>0</td><td>0</td></tr>
        </tbody></table></body></html>"#;

    fn ctx() -> PageContext {
        PageContext::new().with_team_id(4343i64)
    }

    #[test]
    fn test_batting_averages() {
        let result = extract_markup(BATTING, PageType::TeamBatting, &ctx(), &SiteConfig::default());
        assert!(result.success);
        assert_eq!(result.records.len(), 2);

        let raina = &result.records[0];
        assert_eq!(raina.value("team_id"), Field::Int(4343));
        assert_eq!(raina.value("player"), Field::Text("Suresh Raina".into()));
        assert_eq!(raina.value("player_id"), Field::Int(33335));
        assert_eq!(raina.value("first_season"), Field::Int(2008));
        assert_eq!(raina.value("last_season"), Field::Int(2015));
        assert_eq!(raina.value("span_raw"), Field::Text("2008-2015".into()));
        assert_eq!(raina.value("runs_scored"), Field::Text("3699".into()));
        assert_eq!(raina.value("highest_score"), Field::Int(100));
        assert_eq!(raina.value("batting_average"), Field::Text("36.99".into()));
        assert_eq!(raina.value("ducks"), Field::Text("6".into()));
        assert_eq!(raina.get("4s"), None);

        let dhoni = &result.records[1];
        assert_eq!(dhoni.value("player"), Field::Text("MS Dhoni".into()));
        assert_eq!(dhoni.value("first_season"), Field::Int(2008));
        assert_eq!(dhoni.value("last_season"), Field::Int(2008));
    }

    #[test]
    fn test_batting_field_order() {
        let result = extract_markup(BATTING, PageType::TeamBatting, &ctx(), &SiteConfig::default());
        let names: Vec<&str> = result.records[0].iter().map(|(n, _)| n).take(7).collect();
        assert_eq!(
            names,
            vec!["team_id", "player", "player_id", "first_season", "last_season", "span_raw", "matches"]
        );
    }

    #[test]
    fn test_bowling_averages() {
        let result = extract_markup(BOWLING, PageType::TeamBowling, &ctx(), &SiteConfig::default());
        assert!(result.success);
        assert_eq!(result.records.len(), 2);

        let bravo = &result.records[0];
        assert_eq!(bravo.value("runs_conceded"), Field::Text("1720".into()));
        assert_eq!(bravo.value("wickets"), Field::Text("84".into()));
        assert_eq!(bravo.value("bbi"), Field::Text("4/42".into()));
        assert_eq!(bravo.value("bbi_wickets"), Field::Int(4));
        assert_eq!(bravo.value("bbi_runs"), Field::Int(42));
        assert_eq!(bravo.value("bowling_average"), Field::Text("20.47".into()));
        assert_eq!(bravo.value("economy"), Field::Text("8.17".into()));
        assert_eq!(bravo.value("five_wickets"), Field::Text("0".into()));
        assert_eq!(bravo.value("ten_wickets"), Field::Missing);

        let ashwin = &result.records[1];
        assert_eq!(ashwin.value("bbi_wickets"), Field::Missing);
        assert_eq!(ashwin.value("bbi_runs"), Field::Missing);
    }

    #[test]
    fn test_table_without_header_fails() {
        let markup = r#"<table class="ds-table"><tbody><tr><td>x</td></tr></tbody></table>"#;
        let result = extract_markup(markup, PageType::TeamBatting, &ctx(), &SiteConfig::default());
        assert!(!result.success);
    }
}
