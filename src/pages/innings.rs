//! A player's innings-by-innings batting list.

use crate::config::SiteConfig;
use crate::extract::{LogicalRow, Reconstructor, SchemaKind, body_rows, field};
use crate::grammar::score;
use crate::models::{Field, PageContext, PageResult, PageType, Record};
use crate::pages::{found, locate_segment};
use scraper::Html;
use tracing::{debug, instrument, warn};

#[instrument(level = "info", skip_all, fields(player_id = %ctx.player_id))]
pub fn extract(doc: &Html, ctx: &PageContext, config: &SiteConfig) -> PageResult {
    let Some(table) = locate_segment(doc, &config.innings_list.table, "innings list") else {
        return PageResult::failed(PageType::InningsList);
    };
    let Some(schema) = config.schema(SchemaKind::InningsByInnings) else {
        warn!("No innings-by-innings schema configured");
        return PageResult::failed(PageType::InningsList);
    };
    let rows = body_rows(table);
    let records = Reconstructor::new(schema, config.rules(SchemaKind::InningsByInnings))
        .logical_rows(&rows)
        .iter()
        .map(|row| record(row, ctx, config))
        .collect();
    found(PageType::InningsList, records)
}

/// Text of `name`, read from the configured inner element when there is one.
fn inner(row: &LogicalRow<'_, '_>, name: &str, config: &SiteConfig) -> Field {
    match config.innings_list.inner.get(name) {
        Some(css) => field::inner_text(row.row.cell(name), css),
        None => row.row.text(name),
    }
}

fn record(row: &LogicalRow<'_, '_>, ctx: &PageContext, config: &SiteConfig) -> Record {
    let cells = &row.row;
    if row.is_partial() {
        debug!(row = row.index, runs = %cells.text("runs"), "Partial innings row");
    }
    let runs = score::parse(&cells.text("runs"));
    Record::new()
        .with("player_id", ctx.player_id.clone())
        .with("player_name", ctx.player_name.clone())
        .with("runs", runs.runs.clone().or(runs.raw.clone()))
        .with("not_out", runs.not_out)
        .with("minutes", cells.text("minutes"))
        .with("balls_faced", cells.text("balls_faced"))
        .with("fours", cells.text("fours"))
        .with("sixes", cells.text("sixes"))
        .with("strike_rate", cells.text("strike_rate"))
        .with("position", cells.text("position"))
        .with("dismissal", cells.text("dismissal"))
        .with("innings", cells.text("innings"))
        .with("opposition", inner(row, "opposition", config))
        .with("ground", inner(row, "ground", config))
        .with("start_date", inner(row, "start_date", config))
}
