//! Null-tolerant text and attribute access on tree nodes.
//!
//! Every grammar input passes through here first, so downstream parsers only
//! ever see one representation of "no data": [`Field::Missing`].

use crate::models::Field;
use crate::utils::collapse_ws;
use scraper::{ElementRef, Selector};
use tracing::warn;

/// Stripped text content of `node`, or [`Field::Missing`].
pub fn text(node: Option<ElementRef<'_>>) -> Field {
    text_or(node, Field::Missing)
}

/// Stripped text content of `node`, or `default` when the node is absent or
/// its text is empty.
pub fn text_or(node: Option<ElementRef<'_>>, default: Field) -> Field {
    match node {
        Some(el) => {
            let raw = el.text().collect::<String>();
            match collapse_ws(&raw) {
                s if s.is_empty() => default,
                s => Field::Text(s),
            }
        }
        None => default,
    }
}

/// Trimmed value of attribute `name` on `node`, or [`Field::Missing`].
pub fn attr(node: Option<ElementRef<'_>>, name: &str) -> Field {
    node.and_then(|el| el.value().attr(name))
        .map(Field::from_text)
        .unwrap_or_default()
}

/// Compile a CSS selector from configuration.
///
/// Invalid selectors are logged and treated as matching nothing; the
/// configuration loader validates them up front so this only happens for
/// hand-built configurations.
pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!(selector = css, error = %e, "Invalid CSS selector; treating as no match");
            None
        }
    }
}

/// First descendant of `node` matching `css`.
pub fn select_first<'a>(node: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    node.select(&sel).next()
}

/// Text of the first descendant matching `css`, falling back to the text of
/// `node` itself.
pub fn inner_text(node: Option<ElementRef<'_>>, css: &str) -> Field {
    match node {
        Some(el) => text(select_first(el, css)).or(text(Some(el))),
        None => Field::Missing,
    }
}

/// Direct element children of `node` with tag `name`.
pub fn children_named<'a>(node: ElementRef<'a>, name: &str) -> Vec<ElementRef<'a>> {
    node.children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == name)
        .collect()
}
