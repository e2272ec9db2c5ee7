//! Raw table rows to logical rows.
//!
//! A stats table mixes data rows with footers ("Extras", "Total"), header
//! rows, message rows ("No result") and, on batting cards, single-cell
//! dismissal-detail rows that belong to the batter row above them. The
//! [`Reconstructor`] walks the raw rows once, in document order, and emits
//! only the rows that carry a record.

use crate::extract::field::{self, children_named};
use crate::extract::schema::{MappedRow, TableSchema};
use crate::utils::truncate_for_log;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One `<tr>` with its direct `<td>` cells.
#[derive(Debug, Clone)]
pub struct RawRow<'a> {
    /// Position among the table's body rows, 1-based, for logging.
    pub index: usize,
    pub element: ElementRef<'a>,
    pub cells: Vec<ElementRef<'a>>,
    pub has_header_cells: bool,
}

impl<'a> RawRow<'a> {
    pub fn new(index: usize, element: ElementRef<'a>) -> Self {
        Self {
            index,
            element,
            cells: children_named(element, "td"),
            has_header_cells: !children_named(element, "th").is_empty(),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &'a str> {
        self.element.value().classes()
    }

    /// Lowercased text of the first cell; empty when there is none.
    pub fn first_cell_text(&self) -> String {
        field::text(self.cells.first().copied())
            .as_str()
            .map(str::to_lowercase)
            .unwrap_or_default()
    }

    pub fn has_nested_table(&self) -> bool {
        field::select_first(self.element, "table").is_some()
    }

    /// A single cell and no nested table: the shape of a dismissal-detail row.
    pub fn is_detail_shaped(&self) -> bool {
        self.cells.len() == 1 && !self.has_nested_table()
    }
}

/// Body rows of a located table.
///
/// Accepts either the `<table>` or its `<tbody>`. Only direct `<tr>`
/// children are taken, so rows of nested tables never leak into the parent.
pub fn body_rows(table: ElementRef<'_>) -> Vec<RawRow<'_>> {
    let rows = match table.value().name() {
        "tbody" => children_named(table, "tr"),
        _ => {
            let bodies = children_named(table, "tbody");
            if bodies.is_empty() {
                children_named(table, "tr")
            } else {
                bodies
                    .into_iter()
                    .flat_map(|body| children_named(body, "tr"))
                    .collect()
            }
        }
    };
    rows.into_iter()
        .enumerate()
        .map(|(i, tr)| RawRow::new(i + 1, tr))
        .collect()
}

/// How a raw row was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    Data,
    /// No `<td>` cells at all.
    Empty,
    Footer,
    Header,
    /// A message row such as "No result".
    NonRow,
    /// Ends the table; nothing after it is read.
    Terminal,
}

/// Per-table row classification and pairing rules.
///
/// Markers are matched case-insensitively as substrings of the first cell's
/// text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowRules {
    /// Class tags that mark a footer row.
    pub footer_classes: Vec<String>,
    pub footer_markers: Vec<String>,
    pub terminal_markers: Vec<String>,
    pub non_row_markers: Vec<String>,
    /// Short rows whose first cell matches one of these are mapped partially
    /// instead of rejected.
    pub lenient_markers: Vec<String>,
    pub skip_header_rows: bool,
    /// Require the row width to equal the schema width exactly.
    pub exact_width: bool,
    /// When set, the named cell must hold a profile link or the row is
    /// rejected as ornamental.
    pub identity_field: Option<String>,
    pub profile_link_marker: String,
    /// Attach a following single-cell row as the detail of a data row,
    /// unless its text carries a footer, message or terminal marker.
    pub pair_detail: bool,
}

impl Default for RowRules {
    fn default() -> Self {
        Self {
            footer_classes: Vec::new(),
            footer_markers: Vec::new(),
            terminal_markers: Vec::new(),
            non_row_markers: Vec::new(),
            lenient_markers: Vec::new(),
            skip_header_rows: false,
            exact_width: false,
            identity_field: None,
            profile_link_marker: "/cricketers/".to_string(),
            pair_detail: false,
        }
    }
}

fn matches_any(text: &str, markers: &[String]) -> bool {
    markers.iter().any(|m| text.contains(&m.to_lowercase()))
}

impl RowRules {
    pub fn classify(&self, row: &RawRow<'_>) -> RowClass {
        if row.cells.is_empty() {
            return if row.has_header_cells { RowClass::Header } else { RowClass::Empty };
        }
        let first = row.first_cell_text();
        if matches_any(&first, &self.terminal_markers) {
            return RowClass::Terminal;
        }
        if row
            .classes()
            .any(|c| self.footer_classes.iter().any(|f| f == c))
            || matches_any(&first, &self.footer_markers)
        {
            return RowClass::Footer;
        }
        if matches_any(&first, &self.non_row_markers) {
            return RowClass::NonRow;
        }
        if self.skip_header_rows && row.has_header_cells {
            return RowClass::Header;
        }
        RowClass::Data
    }

    /// Whether the first cell carries a footer, message or terminal marker.
    /// Class tags are not consulted.
    pub fn has_text_marker(&self, row: &RawRow<'_>) -> bool {
        let first = row.first_cell_text();
        [&self.terminal_markers, &self.footer_markers, &self.non_row_markers]
            .into_iter()
            .any(|markers| matches_any(&first, markers))
    }

    pub fn is_lenient(&self, row: &RawRow<'_>) -> bool {
        matches_any(&row.first_cell_text(), &self.lenient_markers)
    }

    /// Whether `cell` holds an anchor pointing at a player profile.
    pub fn has_profile_link(&self, cell: ElementRef<'_>) -> bool {
        let Some(sel) = field::selector("a[href]") else {
            return false;
        };
        cell.select(&sel).any(|a| {
            a.value()
                .attr("href")
                .is_some_and(|href| href.contains(&self.profile_link_marker))
        })
    }
}

/// A data row mapped through its schema, plus its paired detail cell.
#[derive(Debug, Clone)]
pub struct LogicalRow<'s, 'a> {
    /// Index of the primary raw row.
    pub index: usize,
    pub row: MappedRow<'s, 'a>,
    pub detail: Option<ElementRef<'a>>,
}

impl<'s, 'a> LogicalRow<'s, 'a> {
    pub fn is_partial(&self) -> bool {
        self.row.is_partial()
    }
}

/// Applies a [`TableSchema`] and [`RowRules`] to a table's raw rows.
#[derive(Debug, Clone, Copy)]
pub struct Reconstructor<'s> {
    pub schema: &'s TableSchema,
    pub rules: &'s RowRules,
}

impl<'s> Reconstructor<'s> {
    pub fn new(schema: &'s TableSchema, rules: &'s RowRules) -> Self {
        Self { schema, rules }
    }

    /// Classify, width-check, identity-gate and pair `rows`, in that order.
    ///
    /// Rejected rows are logged and skipped; they never affect their
    /// neighbours. A terminal row stops the walk.
    pub fn logical_rows<'a>(&self, rows: &[RawRow<'a>]) -> Vec<LogicalRow<'s, 'a>> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < rows.len() {
            let raw = &rows[i];
            i += 1;

            match self.rules.classify(raw) {
                RowClass::Data => {}
                RowClass::Terminal => {
                    debug!(row = raw.index, text = %raw.first_cell_text(), "Terminal row; stopping table");
                    break;
                }
                class => {
                    debug!(row = raw.index, ?class, text = %raw.first_cell_text(), "Skipping non-data row");
                    continue;
                }
            }

            let Some(mapped) = self.map(raw) else {
                continue;
            };

            if let Some(name) = &self.rules.identity_field {
                if !mapped.cell(name).is_some_and(|c| self.rules.has_profile_link(c)) {
                    debug!(row = raw.index, field = %name, "Skipping row without profile link");
                    continue;
                }
            }

            let mut detail = None;
            if self.rules.pair_detail {
                let candidate = rows
                    .get(i)
                    .filter(|next| next.is_detail_shaped() && !self.rules.has_text_marker(next));
                if let Some(next) = candidate {
                    debug!(row = raw.index, detail_row = next.index, "Merging detail row");
                    detail = next.cells.first().copied();
                    i += 1;
                }
            }

            out.push(LogicalRow {
                index: raw.index,
                row: mapped,
                detail,
            });
        }
        debug!(raw = rows.len(), logical = out.len(), "Reconstructed rows");
        out
    }

    fn map<'a>(&self, raw: &RawRow<'a>) -> Option<MappedRow<'s, 'a>> {
        let required = self.schema.required_width();
        if self.rules.exact_width && raw.cells.len() != required {
            debug!(row = raw.index, found = raw.cells.len(), required, "Skipping row with mismatched width");
            return None;
        }
        match self.schema.map(raw.cells.clone()) {
            Ok(mapped) => Some(mapped),
            Err(_) if self.rules.is_lenient(raw) => {
                debug!(row = raw.index, text = %raw.first_cell_text(), "Mapping lenient short row");
                Some(self.schema.map_partial(raw.cells.clone()))
            }
            Err(short) => {
                if raw.cells.len() > 1 {
                    warn!(
                        row = raw.index,
                        %short,
                        html = %truncate_for_log(&raw.element.html(), 200),
                        "Skipping short row"
                    );
                } else {
                    debug!(row = raw.index, %short, "Skipping short row");
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use scraper::{Html, Selector};

    fn table(doc: &Html) -> ElementRef<'_> {
        doc.select(&Selector::parse("table").unwrap()).next().unwrap()
    }

    fn batting_schema() -> TableSchema {
        TableSchema::new([("batter", 1), ("dismissal", 2), ("runs", 3)])
    }

    fn batting_rules() -> RowRules {
        RowRules {
            footer_classes: vec!["ds-bg-fill-content-alternate".into()],
            footer_markers: vec!["extras".into(), "total".into(), "did not bat".into()],
            terminal_markers: vec!["fall of wickets".into()],
            identity_field: Some("batter".into()),
            pair_detail: true,
            ..RowRules::default()
        }
    }

    const CARD: &str = r#"<table><tbody>
        <tr><td><a href="/cricketers/virat-kohli-253802">Virat Kohli</a></td><td>c Smith b Jones</td><td>82</td></tr>
        <tr><td><div><span><i>c Smith b Starc</i></span></div></td></tr>
        <tr><td><a href="/cricketers/ms-dhoni-28081">MS Dhoni</a></td><td>not out</td><td>12</td></tr>
        <tr class="ds-bg-fill-content-alternate"><td>Extras</td><td>(lb 2)</td><td>2</td></tr>
        <tr><td>Header</td><td>ornament</td><td>x</td></tr>
        <tr><td>Fall of wickets: 1-12</td></tr>
        <tr><td><a href="/cricketers/late-1">Late</a></td><td>b X</td><td>1</td></tr>
    </tbody></table>"#;

    #[test]
    fn test_body_rows_direct_children_only() {
        let doc = Html::parse_document(
            "<table><tbody><tr><td>a<table><tr><td>nested</td></tr></table></td></tr><tr><td>b</td></tr></tbody></table>",
        );
        let rows = body_rows(table(&doc));
        assert_eq!(rows.len(), 2);
        assert!(rows[0].has_nested_table());
        assert_eq!(rows[1].index, 2);
    }

    #[test]
    fn test_body_rows_accepts_tbody() {
        let doc = Html::parse_document("<table><tbody><tr><td>a</td></tr></tbody></table>");
        let tbody = doc.select(&Selector::parse("tbody").unwrap()).next().unwrap();
        assert_eq!(body_rows(tbody).len(), 1);
    }

    #[test]
    fn test_paired_row_merge_yields_one_record() {
        let doc = Html::parse_document(CARD);
        let rows = body_rows(table(&doc));
        let (schema, rules) = (batting_schema(), batting_rules());
        let logical = Reconstructor::new(&schema, &rules).logical_rows(&rows);

        assert_eq!(logical.len(), 2);
        assert_eq!(logical[0].row.text("batter"), Field::Text("Virat Kohli".into()));
        assert_eq!(field::text(logical[0].detail), Field::Text("c Smith b Starc".into()));
        assert_eq!(logical[1].row.text("batter"), Field::Text("MS Dhoni".into()));
        assert!(logical[1].detail.is_none());
    }

    #[test]
    fn test_single_cell_footer_is_not_paired() {
        let doc = Html::parse_document(
            r#"<table><tbody>
            <tr><td><a href="/cricketers/ms-dhoni-28081">MS Dhoni</a></td><td>not out</td><td>12</td></tr>
            <tr><td>Did not bat: A, B</td></tr>
            <tr><td><a href="/cricketers/sk-raina-33335">SK Raina</a></td><td>b Zaheer</td><td>7</td></tr>
            <tr><td>Fall of wickets: 1-12</td></tr>
            </tbody></table>"#,
        );
        let rows = body_rows(table(&doc));
        let (schema, rules) = (batting_schema(), batting_rules());
        let logical = Reconstructor::new(&schema, &rules).logical_rows(&rows);
        assert_eq!(logical.len(), 2);
        assert!(logical.iter().all(|r| r.detail.is_none()));
    }

    #[test]
    fn test_detail_row_pairs_despite_footer_class() {
        let doc = Html::parse_document(
            r#"<table><tbody>
            <tr><td><a href="/cricketers/virat-kohli-253802">Virat Kohli</a></td><td>c Smith b Jones</td><td>82</td></tr>
            <tr class="ds-bg-fill-content-alternate"><td><i>c Smith b Starc</i></td></tr>
            </tbody></table>"#,
        );
        let rows = body_rows(table(&doc));
        let (schema, rules) = (batting_schema(), batting_rules());
        let logical = Reconstructor::new(&schema, &rules).logical_rows(&rows);
        assert_eq!(logical.len(), 1);
        assert_eq!(field::text(logical[0].detail), Field::Text("c Smith b Starc".into()));
    }

    #[test]
    fn test_classification() {
        let doc = Html::parse_document(CARD);
        let rows = body_rows(table(&doc));
        let rules = batting_rules();
        assert_eq!(rules.classify(&rows[0]), RowClass::Data);
        assert_eq!(rules.classify(&rows[3]), RowClass::Footer);
        assert_eq!(rules.classify(&rows[5]), RowClass::Terminal);
    }

    #[test]
    fn test_terminal_row_stops_table() {
        let doc = Html::parse_document(CARD);
        let rows = body_rows(table(&doc));
        let (schema, rules) = (batting_schema(), batting_rules());
        let logical = Reconstructor::new(&schema, &rules).logical_rows(&rows);
        assert!(logical.iter().all(|r| r.row.text("batter") != Field::Text("Late".into())));
    }

    #[test]
    fn test_too_narrow_table_yields_nothing() {
        let doc = Html::parse_document(
            "<table><tbody><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></tbody></table>",
        );
        let rows = body_rows(table(&doc));
        let schema = TableSchema::new([("a", 1), ("b", 2), ("c", 3), ("d", 8)]);
        let rules = RowRules::default();
        assert!(Reconstructor::new(&schema, &rules).logical_rows(&rows).is_empty());
    }

    #[test]
    fn test_lenient_short_row_is_mapped_partially() {
        let doc = Html::parse_document(
            "<table><tbody><tr><th>Runs</th></tr><tr><td>DNB</td><td>-</td></tr><tr><td>45*</td><td>60</td><td>3</td></tr></tbody></table>",
        );
        let rows = body_rows(table(&doc));
        let schema = TableSchema::new([("runs", 1), ("mins", 2), ("pos", 3)]);
        let rules = RowRules {
            lenient_markers: vec!["dnb".into()],
            skip_header_rows: true,
            ..RowRules::default()
        };
        let logical = Reconstructor::new(&schema, &rules).logical_rows(&rows);
        assert_eq!(logical.len(), 2);
        assert!(logical[0].is_partial());
        assert_eq!(logical[0].row.text("pos"), Field::Missing);
        assert!(!logical[1].is_partial());
    }

    #[test]
    fn test_exact_width() {
        let doc = Html::parse_document(
            "<table><tbody><tr><td>a</td><td>b</td><td>extra</td></tr><tr><td>a</td><td>b</td></tr></tbody></table>",
        );
        let rows = body_rows(table(&doc));
        let schema = TableSchema::from_headers(&["Player".to_string(), "Mat".to_string()]);
        let rules = RowRules {
            exact_width: true,
            ..RowRules::default()
        };
        let logical = Reconstructor::new(&schema, &rules).logical_rows(&rows);
        assert_eq!(logical.len(), 1);
        assert_eq!(logical[0].index, 2);
    }

    #[test]
    fn test_non_row_marker() {
        let doc = Html::parse_document("<table><tbody><tr><td>No result</td><td>x</td></tr></tbody></table>");
        let rows = body_rows(table(&doc));
        let rules = RowRules {
            non_row_markers: vec!["No Result".into()],
            ..RowRules::default()
        };
        assert_eq!(rules.classify(&rows[0]), RowClass::NonRow);
    }
}
