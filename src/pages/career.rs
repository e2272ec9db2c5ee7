//! Career averages: one record per player page, from the first data row.
//!
//! The averages table is only trusted when its second header cell is the
//! playing-span column; the same slot holds unrelated tables on other
//! templates.

use crate::config::{CareerLayout, SiteConfig};
use crate::extract::{MappedRow, Reconstructor, SchemaKind, body_rows, field};
use crate::grammar::{figures, score, span};
use crate::models::{PageContext, PageResult, PageType, Record};
use crate::pages::{found, locate_segment};
use scraper::{ElementRef, Html};
use tracing::{info, instrument, warn};

type Build = fn(&MappedRow<'_, '_>, &PageContext) -> Record;

#[instrument(level = "info", skip_all, fields(player_id = %ctx.player_id))]
pub fn extract_batting(doc: &Html, ctx: &PageContext, config: &SiteConfig) -> PageResult {
    extract_career(doc, ctx, config, PageType::CareerBatting, SchemaKind::CareerBatting, batting)
}

#[instrument(level = "info", skip_all, fields(player_id = %ctx.player_id))]
pub fn extract_bowling(doc: &Html, ctx: &PageContext, config: &SiteConfig) -> PageResult {
    extract_career(doc, ctx, config, PageType::CareerBowling, SchemaKind::CareerBowling, bowling)
}

fn has_span_header(table: ElementRef<'_>, layout: &CareerLayout) -> bool {
    let header = field::select_first(table, &layout.span_header);
    field::attr(header, "title")
        .as_str()
        .is_some_and(|title| title.to_lowercase().contains(&layout.span_title))
}

fn extract_career(
    doc: &Html,
    ctx: &PageContext,
    config: &SiteConfig,
    page: PageType,
    kind: SchemaKind,
    build: Build,
) -> PageResult {
    let Some(table) = locate_segment(doc, &config.career.table, "career table") else {
        return PageResult::failed(page);
    };
    if !has_span_header(table, &config.career) {
        warn!("Located table has no playing-span header");
        return PageResult::failed(page);
    }
    let Some(schema) = config.schema(kind) else {
        warn!(?kind, "No career schema configured");
        return PageResult::failed(page);
    };

    let rows = body_rows(table);
    let logical = Reconstructor::new(schema, config.rules(kind)).logical_rows(&rows);
    let Some(first) = logical.first() else {
        warn!("Career table has no data rows");
        return found(page, Vec::new());
    };
    if first.row.text("span").is_missing() {
        info!("Empty span; no career in this format");
        return found(page, Vec::new());
    }
    found(page, vec![build(&first.row, ctx)])
}

fn stamp(ctx: &PageContext, cells: &MappedRow<'_, '_>) -> Record {
    let span_raw = cells.text("span");
    let span = span::parse(&span_raw);
    Record::new()
        .with("player_id", ctx.player_id.clone())
        .with("player_name", ctx.player_name.clone())
        .with("format", cells.text("format"))
        .with("span", span_raw)
        .with("first_season", span.first)
        .with("last_season", span.last)
        .with("matches", cells.text("matches"))
        .with("innings", cells.text("innings"))
}

fn batting(cells: &MappedRow<'_, '_>, ctx: &PageContext) -> Record {
    let highest = score::parse(&cells.text("highest_score"));
    stamp(ctx, cells)
        .with("not_outs", cells.text("not_outs"))
        .with("runs", cells.text("runs"))
        .with("highest_score", highest.runs)
        .with("highest_score_not_out", highest.not_out)
        .with("average", cells.text("average"))
        .with("balls_faced", cells.text("balls_faced"))
        .with("strike_rate", cells.text("strike_rate"))
        .with("hundreds", cells.text("hundreds"))
        .with("fifties", cells.text("fifties"))
        .with("ducks", cells.text("ducks"))
        .with("fours", cells.text("fours"))
        .with("sixes", cells.text("sixes"))
}

fn bowling(cells: &MappedRow<'_, '_>, ctx: &PageContext) -> Record {
    let bbi = figures::parse(&cells.text("bbi"));
    stamp(ctx, cells)
        .with("overs", cells.text("overs"))
        .with("maidens", cells.text("maidens"))
        .with("runs", cells.text("runs"))
        .with("wickets", cells.text("wickets"))
        .with("bbi_raw", bbi.raw)
        .with("bbi_wickets", bbi.wickets)
        .with("bbi_runs", bbi.runs)
        .with("average", cells.text("average"))
        .with("economy", cells.text("economy"))
        .with("strike_rate", cells.text("strike_rate"))
        .with("four_wickets", cells.text("four_wickets"))
        .with("five_wickets", cells.text("five_wickets"))
}
