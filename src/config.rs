//! Site configuration: selectors, column schemas and row rules.
//!
//! Everything that drifts when the site changes its templates lives here, in
//! one immutable [`SiteConfig`] passed by reference to the extractors. The
//! built-in defaults describe the layouts known today; a YAML file can
//! override any part of them.
//!
//! # Example override
//!
//! ```yaml
//! retry:
//!   attempts: 5
//!   delay: 1500
//! schemas:
//!   season_summary:
//!     columns: [[team_1, 1], [team_2, 2], [winner, 3], [margin, 4], [ground, 5], [match_date, 6], [scorecard, 8]]
//! season:
//!   table:
//!     - kind: select
//!       selector: "div.ds-overflow-x-auto > table"
//! ```

use crate::extract::{Locator, RetryPolicy, RowRules, SchemaKind, Strategy, TableSchema};
use once_cell::sync::Lazy;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use tracing::{info, instrument, warn};
use url::Url;

static DEFAULT_RULES: Lazy<RowRules> = Lazy::new(RowRules::default);

const SEASON_CONTAINER: &str =
    "#main-container div.ds-relative div div.ds-grow > div:nth-child(2) > div > div:nth-child(1)";
const SCORECARD_ROOT: &str = "#main-container > div.ds-relative > div > div > div.ds-flex.ds-space-x-5 > div.ds-grow > div.ds-mt-3 > div:nth-child(1)";
const TEAM_HEADING: &str = "div.ds-flex.ds-px-4.ds-border-b.ds-border-line.ds-py-3.ds-bg-ui-fill-translucent-hover > div > span > span.ds-text-title-xs.ds-font-bold.ds-capitalize";
const ENGINE_ROOT: &str = "#ciHomeContentlhs > div.pnl650M";
const TEAM_LIST: &str = "#main-container > div.ds-relative > div > div.ds-flex.ds-space-x-5 > div.ds-grow > div.ds-grid.ds-grid-cols-3.ds-gap-2 > div:nth-child(2) > div:nth-child(1) > div.ds-p-0 > div:nth-child(1) > div > div.ReactCollapse--collapse > div > div > ul";

/// Season results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonLayout {
    pub table: Locator,
}

impl Default for SeasonLayout {
    fn default() -> Self {
        Self {
            table: Locator::new(vec![
                Strategy::select("div.ds-overflow-x-auto > table"),
                Strategy::within(SEASON_CONTAINER, "table"),
            ]),
        }
    }
}

/// Locators for one innings of a scorecard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsLayout {
    pub team_name: Locator,
    pub batting: Locator,
    pub bowling: Locator,
}

impl InningsLayout {
    /// The layout of innings `n` (1-based) on the current scorecard template.
    pub fn nth(n: usize) -> Self {
        let block = format!("{SCORECARD_ROOT} > div:nth-child({})", n + 1);
        let container = format!("div.ds-mt-3 > div:nth-child(1) > div:nth-child({})", n + 1);
        Self {
            team_name: Locator::new(vec![
                Strategy::select(&format!("{block} > div > {TEAM_HEADING}")),
                Strategy::within(&container, "span.ds-text-title-xs.ds-font-bold"),
            ]),
            batting: Locator::new(vec![
                Strategy::select(&format!("{block} > div > div.ds-p-0 > table.ci-scorecard-table")),
                Strategy::within(&container, "table.ci-scorecard-table"),
            ]),
            bowling: Locator::new(vec![
                Strategy::select(&format!("{block} > div > div.ds-p-0 > table:nth-child(2)")),
                Strategy::within(&container, "div.ds-p-0 > table:nth-child(2)"),
            ]),
        }
    }
}

/// Full scorecard page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorecardLayout {
    /// The first innings is required; the rest are optional.
    pub innings: Vec<InningsLayout>,
    /// Tried in order inside a dismissal-detail cell.
    pub detail_selectors: Vec<String>,
    /// Inside the wickets cell.
    pub wicket_selector: String,
}

impl Default for ScorecardLayout {
    fn default() -> Self {
        Self {
            innings: vec![InningsLayout::nth(1), InningsLayout::nth(2)],
            detail_selectors: vec!["div > span > i".into(), "div > span".into(), "div".into()],
            wicket_selector: "span > strong".into(),
        }
    }
}

/// Career averages pages (batting and bowling share the layout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareerLayout {
    pub table: Locator,
    /// Header cell inside the table that must describe the span column.
    pub span_header: String,
    /// Lowercase text the span header's `title` must contain.
    pub span_title: String,
}

impl Default for CareerLayout {
    fn default() -> Self {
        Self {
            table: Locator::new(vec![
                Strategy::select(&format!("{ENGINE_ROOT} > table:nth-child(4)")),
                Strategy::within(ENGINE_ROOT, "table:nth-child(4)"),
            ]),
            span_header: "thead > tr > th:nth-child(2)".into(),
            span_title: "playing span".into(),
        }
    }
}

/// Innings-by-innings list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InningsListLayout {
    pub table: Locator,
    /// Field name → selector of the element inside the cell holding its text.
    pub inner: BTreeMap<String, String>,
}

impl Default for InningsListLayout {
    fn default() -> Self {
        Self {
            table: Locator::new(vec![
                Strategy::after_caption("b", "Innings by innings list", "table.engineTable"),
                Strategy::select(&format!("{ENGINE_ROOT} > table:nth-child(5)")),
            ]),
            inner: [("opposition", "a"), ("ground", "a"), ("start_date", "b")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Team batting and bowling averages pages.
///
/// The column set varies by segment, so the schema is derived from each
/// table's header row. The column maps pick the headers worth keeping and
/// name their fields; `Player`, `Span`, `HS` and `BBI` get grammar treatment
/// on top of the rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamAveragesLayout {
    pub table: Locator,
    pub header_row: String,
    pub rules: RowRules,
    /// Header text → field name.
    pub batting_columns: Vec<(String, String)>,
    pub bowling_columns: Vec<(String, String)>,
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(h, f)| (h.to_string(), f.to_string()))
        .collect()
}

impl Default for TeamAveragesLayout {
    fn default() -> Self {
        Self {
            table: Locator::new(vec![Strategy::select("table.ds-table")]),
            header_row: "thead tr".into(),
            rules: RowRules {
                exact_width: true,
                ..RowRules::default()
            },
            batting_columns: pairs(&[
                ("Player", "player"),
                ("Span", "span_raw"),
                ("Mat", "matches"),
                ("Inns", "innings"),
                ("NO", "not_outs"),
                ("Runs", "runs_scored"),
                ("HS", "highest_score"),
                ("Ave", "batting_average"),
                ("SR", "batting_strike_rate"),
                ("100", "hundreds"),
                ("50", "fifties"),
                ("0", "ducks"),
            ]),
            bowling_columns: pairs(&[
                ("Player", "player"),
                ("Span", "span_raw"),
                ("Mat", "matches"),
                ("Inns", "innings"),
                ("Mdns", "maidens"),
                ("Runs", "runs_conceded"),
                ("Wkts", "wickets"),
                ("BBI", "bbi"),
                ("Ave", "bowling_average"),
                ("Econ", "economy"),
                ("SR", "bowling_strike_rate"),
                ("5", "five_wickets"),
                ("10", "ten_wickets"),
            ]),
        }
    }
}

/// Trophy team list page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamListLayout {
    pub list: Locator,
    pub name_selector: String,
}

impl Default for TeamListLayout {
    fn default() -> Self {
        Self {
            list: Locator::new(vec![
                Strategy::select(TEAM_LIST),
                Strategy::within("#main-container", "div.ReactCollapse--collapse ul"),
            ]),
            name_selector: "span".into(),
        }
    }
}

/// Every selector, schema and rule the extractors use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub base_url: String,
    pub retry: RetryPolicy,
    pub schemas: BTreeMap<SchemaKind, TableSchema>,
    pub rules: BTreeMap<SchemaKind, RowRules>,
    pub season: SeasonLayout,
    pub scorecard: ScorecardLayout,
    pub career: CareerLayout,
    pub innings_list: InningsListLayout,
    pub team_averages: TeamAveragesLayout,
    pub teams: TeamListLayout,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_schemas() -> BTreeMap<SchemaKind, TableSchema> {
    BTreeMap::from([
        (
            SchemaKind::SeasonSummary,
            TableSchema::new([
                ("team_1", 1),
                ("team_2", 2),
                ("winner", 3),
                ("margin", 4),
                ("ground", 5),
                ("match_date", 6),
                ("scorecard", 7),
            ]),
        ),
        (
            SchemaKind::Batting,
            TableSchema::new([
                ("batter", 1),
                ("dismissal", 2),
                ("runs", 3),
                ("balls", 4),
                ("minutes", 5),
                ("fours", 6),
                ("sixes", 7),
                ("strike_rate", 8),
            ]),
        ),
        (
            SchemaKind::Bowling,
            TableSchema::new([
                ("bowler", 1),
                ("overs", 2),
                ("maidens", 3),
                ("runs", 4),
                ("wickets", 5),
                ("economy", 6),
                ("dots", 7),
                ("fours", 8),
                ("sixes", 9),
                ("wides", 10),
                ("no_balls", 11),
            ]),
        ),
        (
            SchemaKind::CareerBatting,
            TableSchema::new([
                ("format", 1),
                ("span", 2),
                ("matches", 3),
                ("innings", 4),
                ("not_outs", 5),
                ("runs", 6),
                ("highest_score", 7),
                ("average", 8),
                ("balls_faced", 9),
                ("strike_rate", 10),
                ("hundreds", 11),
                ("fifties", 12),
                ("ducks", 13),
                ("fours", 14),
                ("sixes", 15),
            ]),
        ),
        (
            SchemaKind::CareerBowling,
            TableSchema::new([
                ("format", 1),
                ("span", 2),
                ("matches", 3),
                ("innings", 4),
                ("overs", 5),
                ("maidens", 6),
                ("runs", 7),
                ("wickets", 8),
                ("bbi", 9),
                ("average", 10),
                ("economy", 11),
                ("strike_rate", 12),
                ("four_wickets", 13),
                ("five_wickets", 14),
            ]),
        ),
        (
            SchemaKind::InningsByInnings,
            TableSchema::new([
                ("runs", 1),
                ("minutes", 2),
                ("balls_faced", 3),
                ("fours", 4),
                ("sixes", 5),
                ("strike_rate", 6),
                ("position", 7),
                ("dismissal", 8),
                ("innings", 9),
                ("opposition", 11),
                ("ground", 12),
                ("start_date", 13),
            ]),
        ),
    ])
}

fn default_rules() -> BTreeMap<SchemaKind, RowRules> {
    BTreeMap::from([
        (
            SchemaKind::SeasonSummary,
            RowRules {
                non_row_markers: strings(&["no result"]),
                ..RowRules::default()
            },
        ),
        (
            SchemaKind::Batting,
            RowRules {
                footer_classes: strings(&[
                    "ds-text-tight-s",
                    "ds-opacity-40",
                    "!ds-border-b-0",
                    "ds-font-regular",
                    "ds-bg-fill-content-alternate",
                ]),
                footer_markers: strings(&["extras", "total", "did not bat"]),
                terminal_markers: strings(&["fall of wickets"]),
                identity_field: Some("batter".into()),
                pair_detail: true,
                ..RowRules::default()
            },
        ),
        (
            SchemaKind::Bowling,
            RowRules {
                footer_classes: strings(&["ds-bg-fill-content-alternate", "ds-text-tight-s"]),
                identity_field: Some("bowler".into()),
                ..RowRules::default()
            },
        ),
        (SchemaKind::CareerBatting, RowRules::default()),
        (SchemaKind::CareerBowling, RowRules::default()),
        (
            SchemaKind::InningsByInnings,
            RowRules {
                skip_header_rows: true,
                lenient_markers: strings(&["dnb", "absent", "sub", "retired hurt", "tdnb"]),
                ..RowRules::default()
            },
        ),
    ])
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.espncricinfo.com".into(),
            retry: RetryPolicy::default(),
            schemas: default_schemas(),
            rules: default_rules(),
            season: SeasonLayout::default(),
            scorecard: ScorecardLayout::default(),
            career: CareerLayout::default(),
            innings_list: InningsListLayout::default(),
            team_averages: TeamAveragesLayout::default(),
            teams: TeamListLayout::default(),
        }
    }
}

impl SiteConfig {
    /// Parse a YAML override. Schema and rule kinds the YAML leaves out keep
    /// their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        let mut config: SiteConfig = serde_yaml::from_str(yaml)?;
        for (kind, schema) in default_schemas() {
            config.schemas.entry(kind).or_insert(schema);
        }
        for (kind, rules) in default_rules() {
            config.rules.entry(kind).or_insert(rules);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// contains a selector that does not compile.
    #[instrument(level = "info", skip_all, fields(path = %path))]
    pub fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let yaml = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&yaml)?;
        info!(schemas = config.schemas.len(), "Loaded site configuration");
        Ok(config)
    }

    pub fn schema(&self, kind: SchemaKind) -> Option<&TableSchema> {
        self.schemas.get(&kind)
    }

    /// Row rules for `kind`, or permissive defaults.
    pub fn rules(&self, kind: SchemaKind) -> &RowRules {
        self.rules.get(&kind).unwrap_or(&*DEFAULT_RULES)
    }

    pub fn base_url(&self) -> Option<Url> {
        match Url::parse(&self.base_url) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(base_url = %self.base_url, error = %e, "Invalid base URL; links stay relative");
                None
            }
        }
    }

    fn locators(&self) -> Vec<(&'static str, &Locator)> {
        let mut out = vec![
            ("season.table", &self.season.table),
            ("career.table", &self.career.table),
            ("innings_list.table", &self.innings_list.table),
            ("team_averages.table", &self.team_averages.table),
            ("teams.list", &self.teams.list),
        ];
        for innings in &self.scorecard.innings {
            out.push(("scorecard.innings.team_name", &innings.team_name));
            out.push(("scorecard.innings.batting", &innings.batting));
            out.push(("scorecard.innings.bowling", &innings.bowling));
        }
        out
    }

    /// Compile every selector up front.
    ///
    /// # Errors
    ///
    /// Returns an error naming every selector that fails to compile.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        let mut selectors: Vec<(&str, &str)> = self
            .locators()
            .into_iter()
            .flat_map(|(name, locator)| {
                locator
                    .strategies()
                    .iter()
                    .flat_map(|s| s.selectors())
                    .map(move |css| (name, css))
            })
            .collect();
        selectors.extend(self.scorecard.detail_selectors.iter().map(|s| ("scorecard.detail_selectors", s.as_str())));
        selectors.push(("scorecard.wicket_selector", self.scorecard.wicket_selector.as_str()));
        selectors.push(("career.span_header", self.career.span_header.as_str()));
        selectors.push(("team_averages.header_row", self.team_averages.header_row.as_str()));
        selectors.push(("teams.name_selector", self.teams.name_selector.as_str()));
        selectors.extend(self.innings_list.inner.values().map(|s| ("innings_list.inner", s.as_str())));

        let bad: Vec<String> = selectors
            .into_iter()
            .filter_map(|(name, css)| {
                Selector::parse(css)
                    .err()
                    .map(|e| format!("{name}: '{css}' ({e})"))
            })
            .collect();
        if bad.is_empty() {
            Ok(())
        } else {
            Err(format!("invalid selectors: {}", bad.join("; ")).into())
        }
    }
}
