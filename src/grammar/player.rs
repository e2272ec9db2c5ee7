//! Player name, id and profile link from a table cell.

use crate::extract::field;
use crate::grammar::link::{self, IdKind};
use crate::models::Field;
use crate::utils::strip_name_markers;
use scraper::ElementRef;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerInfo {
    pub name: Field,
    pub id: Field,
    pub href: Field,
}

fn profile_anchor<'a>(cell: ElementRef<'a>, marker: &str) -> Option<ElementRef<'a>> {
    let sel = field::selector("a[href]")?;
    cell.select(&sel)
        .find(|a| a.value().attr("href").is_some_and(|h| h.contains(marker)))
}

fn title_name(anchor: ElementRef<'_>) -> Field {
    let Some(title) = anchor.value().attr("title") else {
        return Field::Missing;
    };
    const SUFFIX: &str = " profile";
    let name = title.replace("View full profile of", "");
    let name = name.trim();
    let stem = name
        .len()
        .checked_sub(SUFFIX.len())
        .filter(|&at| name.get(at..).is_some_and(|s| s.eq_ignore_ascii_case(SUFFIX)))
        .and_then(|at| name.get(..at))
        .unwrap_or(name);
    Field::from_text(stem)
}

fn clean(name: Field) -> Field {
    match name.as_str() {
        Some(s) => Field::from_text(&strip_name_markers(s)),
        None => name,
    }
}

/// Name, id and href of the player whose profile link (an href containing
/// `marker`) sits in `cell`.
///
/// The name comes from the link's `title`, then its name span, any span, and
/// the link text. Without a profile link the cell text is the name.
pub fn player_info(cell: Option<ElementRef<'_>>, marker: &str) -> PlayerInfo {
    let Some(cell) = cell else {
        return PlayerInfo::default();
    };
    let Some(anchor) = profile_anchor(cell, marker) else {
        return PlayerInfo {
            name: clean(field::text(Some(cell))),
            ..PlayerInfo::default()
        };
    };
    let link = link::id_from_link(Some(anchor), IdKind::Player);
    let name = title_name(anchor)
        .or(field::text(field::select_first(anchor, "span.ds-text-tight-s.ds-font-medium")))
        .or(field::text(field::select_first(anchor, "span")))
        .or(field::text(Some(anchor)));
    PlayerInfo {
        name: clean(name),
        id: link.id,
        href: link.href,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn info(html: &str) -> PlayerInfo {
        let doc = Html::parse_fragment(&format!("<table><tr><td>{html}</td></tr></table>"));
        let td = doc.select(&Selector::parse("td").unwrap()).next();
        player_info(td, "/cricketers/")
    }

    #[test]
    fn test_title_attribute() {
        let p = info(r#"<a href="/cricketers/ms-dhoni-28081" title="View full profile of MS Dhoni">MSD</a>"#);
        assert_eq!(p.name, Field::Text("MS Dhoni".into()));
        assert_eq!(p.id, Field::Int(28081));
        assert_eq!(p.href, Field::Text("/cricketers/ms-dhoni-28081".into()));
    }

    #[test]
    fn test_title_with_trailing_profile() {
        let p = info(r#"<a href="/cricketers/virat-kohli-253802" title="Virat Kohli profile">VK</a>"#);
        assert_eq!(p.name, Field::Text("Virat Kohli".into()));
    }

    #[test]
    fn test_name_span_and_markers() {
        let p = info(
            r#"<div><a href="/cricketers/ms-dhoni-28081"><span class="ds-text-tight-s ds-font-medium">MS Dhoni (c)†</span><span>ignored</span></a></div>"#,
        );
        assert_eq!(p.name, Field::Text("MS Dhoni".into()));
    }

    #[test]
    fn test_anchor_text_fallback() {
        let p = info(r#"<a href="/cricketers/rg-sharma-34102">RG  Sharma</a>"#);
        assert_eq!(p.name, Field::Text("RG Sharma".into()));
        assert_eq!(p.id, Field::Int(34102));
    }

    #[test]
    fn test_no_profile_link_uses_cell_text() {
        let p = info(r#"<a href="/team/x">Extras</a>"#);
        assert_eq!(p.name, Field::Text("Extras".into()));
        assert_eq!(p.id, Field::Missing);
        assert_eq!(player_info(None, "/cricketers/"), PlayerInfo::default());
    }
}
