//! Season results: one record per match.

use crate::config::SiteConfig;
use crate::extract::{LogicalRow, Reconstructor, SchemaKind, body_rows, field};
use crate::grammar::link::{self, IdKind};
use crate::grammar::margin;
use crate::models::{PageContext, PageResult, PageType, Record};
use crate::pages::{base_url, found, locate_segment};
use scraper::Html;
use tracing::warn;
use url::Url;

pub fn extract(doc: &Html, ctx: &PageContext, config: &SiteConfig) -> PageResult {
    let Some(table) = locate_segment(doc, &config.season.table, "season table") else {
        return PageResult::failed(PageType::Season);
    };
    let Some(schema) = config.schema(SchemaKind::SeasonSummary) else {
        warn!("No season summary schema configured");
        return PageResult::failed(PageType::Season);
    };
    let rows = body_rows(table);
    let base = base_url(ctx, config);
    let records = Reconstructor::new(schema, config.rules(SchemaKind::SeasonSummary))
        .logical_rows(&rows)
        .iter()
        .filter_map(|row| record(row, ctx, base.as_ref()))
        .collect();
    found(PageType::Season, records)
}

fn record(row: &LogicalRow<'_, '_>, ctx: &PageContext, base: Option<&Url>) -> Option<Record> {
    let cells = &row.row;
    let scorecard = link::id_from_link(cells.cell("scorecard"), IdKind::Match);
    if scorecard.id.is_missing() || scorecard.href.is_missing() {
        warn!(row = row.index, href = %scorecard.href, "Skipping match without id or scorecard link");
        return None;
    }
    let margin_raw = cells.text("margin");
    let margin = margin::parse(&margin_raw);
    let ground = cells.cell("ground");

    Some(
        Record::new()
            .with("season", ctx.season.clone())
            .with("match_id", scorecard.id)
            .with("team_1", cells.text("team_1"))
            .with("team_2", cells.text("team_2"))
            .with("winner", cells.text("winner"))
            .with("net_margin", margin.net_margin())
            .with("margin_type", margin.margin_type())
            .with("margin_raw", margin_raw)
            .with("ground_name", field::inner_text(ground, "a"))
            .with("ground_id", link::id_from_link(ground, IdKind::Ground).id)
            .with("match_date", cells.text("match_date"))
            .with("scorecard_link", scorecard.href.clone())
            .with("scorecard_url", link::resolve(base, &scorecard.href)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use crate::pages::extract_markup;

    const ROWS: &str = r#"<table><thead><tr><th>Team 1</th></tr></thead><tbody>
        <tr>
            <td>Chennai Super Kings</td><td>Kolkata Knight Riders</td><td>Chennai Super Kings</td>
            <td>2 runs</td><td><a href="/cricket-grounds/ma-chidambaram-stadium-58008">Chennai</a></td>
            <td>Apr 9, 2011</td><td><a href="/series/ipl-2011-466304/csk-vs-kkr-1st-match-501198/full-scorecard">T20 # 5118</a></td>
        </tr>
        <tr>
            <td>Rajasthan Royals</td><td>Deccan Chargers</td><td>Rajasthan Royals</td>
            <td>8 wickets</td><td><a href="/cricket-grounds/sawai-mansingh-stadium-58142">Jaipur</a></td>
            <td>Apr 9, 2011</td><td><a href="/series/ipl-2011-466304/dc-vs-rr-2nd-match-501199/full-scorecard">T20 # 5119</a></td>
        </tr>
        <tr>
            <td>Royal Challengers</td><td>Kochi Tuskers</td><td>no result</td>
            <td>-</td><td><a href="/cricket-grounds/chinnaswamy-stadium-58316">Bengaluru</a></td>
            <td>Apr 10, 2011</td><td>abandoned</td>
        </tr>
        <tr><td colspan="7">No result found</td></tr>
    </tbody></table>"#;

    fn primary_page() -> String {
        format!(r#"<html><body><div id="main-container"><div class="ds-overflow-x-auto">{ROWS}</div></div></body></html>"#)
    }

    fn container_page() -> String {
        format!(
            r#"<html><body><div id="main-container"><div class="ds-relative"><div><div class="ds-grow">
                <div>nav</div><div><div><div>{ROWS}</div></div></div>
            </div></div></div></div></body></html>"#
        )
    }

    fn ctx() -> PageContext {
        PageContext::new().with_season("2011")
    }

    #[test]
    fn test_season_records() {
        let result = extract_markup(&primary_page(), PageType::Season, &ctx(), &SiteConfig::default());
        assert!(result.success);
        assert_eq!(result.records.len(), 2);

        let first = &result.records[0];
        assert_eq!(first.value("season"), Field::Text("2011".into()));
        assert_eq!(first.value("match_id"), Field::Int(501198));
        assert_eq!(first.value("team_1"), Field::Text("Chennai Super Kings".into()));
        assert_eq!(first.value("net_margin"), Field::Int(2));
        assert_eq!(first.value("margin_type"), Field::Text("runs".into()));
        assert_eq!(first.value("ground_name"), Field::Text("Chennai".into()));
        assert_eq!(first.value("ground_id"), Field::Int(58008));
        assert_eq!(
            first.value("scorecard_url"),
            Field::Text("https://www.espncricinfo.com/series/ipl-2011-466304/csk-vs-kkr-1st-match-501198/full-scorecard".into())
        );

        let second = &result.records[1];
        assert_eq!(second.value("net_margin"), Field::Int(8));
        assert_eq!(second.value("margin_type"), Field::Text("wickets".into()));
    }

    #[test]
    fn test_container_fallback_matches_primary() {
        let config = SiteConfig::default();
        let primary = extract_markup(&primary_page(), PageType::Season, &ctx(), &config);
        let fallback = extract_markup(&container_page(), PageType::Season, &ctx(), &config);
        assert!(fallback.success);
        assert_eq!(primary.records, fallback.records);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let config = SiteConfig::default();
        let a = serde_json::to_string(&extract_markup(&primary_page(), PageType::Season, &ctx(), &config)).unwrap();
        let b = serde_json::to_string(&extract_markup(&primary_page(), PageType::Season, &ctx(), &config)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_field_order_is_stable() {
        let result = extract_markup(&primary_page(), PageType::Season, &ctx(), &SiteConfig::default());
        let names: Vec<&str> = result.records[0].iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "season",
                "match_id",
                "team_1",
                "team_2",
                "winner",
                "net_margin",
                "margin_type",
                "margin_raw",
                "ground_name",
                "ground_id",
                "match_date",
                "scorecard_link",
                "scorecard_url",
            ]
        );
    }
}
