//! Teams that took part in a trophy, from the team filter list.

use crate::config::SiteConfig;
use crate::extract::field;
use crate::grammar::link::{self, IdKind};
use crate::models::{PageContext, PageResult, PageType, Record};
use crate::pages::{base_url, found, locate_segment};
use scraper::Html;
use tracing::{debug, instrument, warn};

#[instrument(level = "info", skip_all)]
pub fn extract(doc: &Html, ctx: &PageContext, config: &SiteConfig) -> PageResult {
    let layout = &config.teams;
    let Some(list) = locate_segment(doc, &layout.list, "team list") else {
        return PageResult::failed(PageType::Teams);
    };
    let base = base_url(ctx, config);

    let records = field::children_named(list, "li")
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let Some(anchor) = link::anchor(Some(item)) else {
                debug!(item = i + 1, "List item without link");
                return None;
            };
            let name = field::text(field::select_first(anchor, &layout.name_selector)).or(field::text(Some(anchor)));
            let team = link::id_from_link(Some(anchor), IdKind::Team);
            if name.is_missing() || team.id.is_missing() {
                warn!(item = i + 1, href = %team.href, "Skipping team without name or id");
                return None;
            }
            Some(
                Record::new()
                    .with("team_name", name)
                    .with("team_id", team.id)
                    .with("team_url", link::resolve(base.as_ref(), &team.href)),
            )
        })
        .collect();
    found(PageType::Teams, records)
}
