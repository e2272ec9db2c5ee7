//! Full match scorecard: batting and bowling lines per innings.
//!
//! The first innings is required. Later innings are optional and are only
//! read when both of their tables are present, so a one-innings match (rain,
//! forfeit) is not an error. Team names come from each innings heading, then
//! from the caller's known team names, then `"unknown"`; the bowling side of
//! an innings is the other team.

use crate::config::SiteConfig;
use crate::extract::{LogicalRow, Reconstructor, SchemaKind, body_rows, field};
use crate::grammar::{dismissal, player};
use crate::models::{Field, PageContext, PageResult, PageType, Record};
use crate::pages::{found, locate_segment};
use scraper::{ElementRef, Html};
use tracing::{debug, error, info, instrument, warn};

const UNKNOWN_TEAM: &str = "unknown";

#[instrument(level = "info", skip_all, fields(match_id = %ctx.match_id))]
pub fn extract(doc: &Html, ctx: &PageContext, config: &SiteConfig) -> PageResult {
    let layout = &config.scorecard;
    let teams: Vec<Field> = layout
        .innings
        .iter()
        .enumerate()
        .map(|(i, innings)| {
            let number = i + 1;
            let heading = field::text(innings.team_name.locate(doc).element());
            if heading.is_missing() {
                warn!(innings = number, "Team name heading not found");
            }
            heading
                .or(Field::from(ctx.team_name(number)))
                .or(Field::Text(UNKNOWN_TEAM.into()))
        })
        .collect();

    let mut records = Vec::new();
    let mut located = false;
    for (i, innings) in layout.innings.iter().enumerate() {
        let number = i + 1;
        let batting = locate_segment(doc, &innings.batting, &format!("innings {number} batting"));
        let bowling = locate_segment(doc, &innings.bowling, &format!("innings {number} bowling"));
        if number > 1 && (batting.is_none() || bowling.is_none()) {
            info!(innings = number, "Innings tables not found; assuming the innings was not played");
            continue;
        }

        let batting_team = &teams[i];
        let bowling_team = opponent(&teams, ctx, batting_team);
        info!(innings = number, batting = %batting_team, bowling = %bowling_team, "Processing innings");

        if let Some(table) = batting {
            located = true;
            records.extend(batting_records(table, number, batting_team, ctx, config));
        }
        if let Some(table) = bowling {
            located = true;
            records.extend(bowling_records(table, number, &bowling_team, ctx, config));
        }
    }

    if !located {
        error!("No innings table located");
        return PageResult::failed(PageType::Scorecard);
    }
    found(PageType::Scorecard, records)
}

/// The first known team that is not `batting`.
fn opponent(teams: &[Field], ctx: &PageContext, batting: &Field) -> Field {
    teams
        .iter()
        .cloned()
        .chain(ctx.team_names.iter().map(|name| Field::from_text(name)))
        .find(|team| team != batting && team.as_str().is_some_and(|s| s != UNKNOWN_TEAM))
        .unwrap_or_else(|| Field::Text(UNKNOWN_TEAM.into()))
}

/// Dismissal text for a batting line: the paired detail row when it has
/// text, else the inline dismissal cell.
fn dismissal_text(row: &LogicalRow<'_, '_>, detail_selectors: &[String]) -> Field {
    let detail = row
        .detail
        .map(|cell| {
            detail_selectors
                .iter()
                .find_map(|css| field::select_first(cell, css))
                .map(|el| field::text(Some(el)))
                .unwrap_or_default()
                .or(field::text(Some(cell)))
        })
        .unwrap_or_default();
    if detail.is_missing() {
        debug!(row = row.index, "No dismissal detail; using inline text");
        return row.row.text("dismissal");
    }
    detail
}

fn batting_records(
    table: ElementRef<'_>,
    innings: usize,
    team: &Field,
    ctx: &PageContext,
    config: &SiteConfig,
) -> Vec<Record> {
    let Some(schema) = config.schema(SchemaKind::Batting) else {
        warn!("No batting schema configured");
        return Vec::new();
    };
    let rules = config.rules(SchemaKind::Batting);
    let rows = body_rows(table);
    let records: Vec<Record> = Reconstructor::new(schema, rules)
        .logical_rows(&rows)
        .iter()
        .map(|row| {
            let cells = &row.row;
            let batter = player::player_info(cells.cell("batter"), &rules.profile_link_marker);
            let out = dismissal::parse(&dismissal_text(row, &config.scorecard.detail_selectors));
            Record::new()
                .with("segment", "batting")
                .with("match_id", ctx.match_id.clone())
                .with("innings", innings as i64)
                .with("batting_team", team.clone())
                .with("batter", batter.name)
                .with("batter_id", batter.id)
                .with("dismissal_raw", out.raw.clone())
                .with("dismissal_type", out.kind_field())
                .with("dismissal_fielder", out.fielder)
                .with("dismissal_bowler", out.bowler)
                .with("runs", cells.text("runs"))
                .with("balls", cells.text("balls"))
                .with("minutes", cells.text("minutes"))
                .with("fours", cells.text("fours"))
                .with("sixes", cells.text("sixes"))
                .with("strike_rate", cells.text("strike_rate"))
        })
        .collect();
    debug!(innings, batters = records.len(), "Batting table processed");
    records
}

fn bowling_records(
    table: ElementRef<'_>,
    innings: usize,
    team: &Field,
    ctx: &PageContext,
    config: &SiteConfig,
) -> Vec<Record> {
    let Some(schema) = config.schema(SchemaKind::Bowling) else {
        warn!("No bowling schema configured");
        return Vec::new();
    };
    let rules = config.rules(SchemaKind::Bowling);
    let rows = body_rows(table);
    let records: Vec<Record> = Reconstructor::new(schema, rules)
        .logical_rows(&rows)
        .iter()
        .map(|row| {
            let cells = &row.row;
            let bowler = player::player_info(cells.cell("bowler"), &rules.profile_link_marker);
            let wickets_cell = cells.cell("wickets");
            let wickets = field::text(wickets_cell.and_then(|c| field::select_first(c, &config.scorecard.wicket_selector)))
                .or(field::text(wickets_cell));
            Record::new()
                .with("segment", "bowling")
                .with("match_id", ctx.match_id.clone())
                .with("innings", innings as i64)
                .with("bowling_team", team.clone())
                .with("bowler", bowler.name)
                .with("bowler_id", bowler.id)
                .with("overs", cells.text("overs"))
                .with("maidens", cells.text("maidens"))
                .with("runs", cells.text("runs"))
                .with("wickets", wickets)
                .with("economy", cells.text("economy"))
                .with("dots", cells.text("dots"))
                .with("fours", cells.text("fours"))
                .with("sixes", cells.text("sixes"))
                .with("wides", cells.text("wides"))
                .with("no_balls", cells.text("no_balls"))
        })
        .collect();
    debug!(innings, bowlers = records.len(), "Bowling table processed");
    records
}
