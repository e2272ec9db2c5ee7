//! Declarative column schemas.
//!
//! A [`TableSchema`] maps field names to 1-based column positions and knows
//! how wide a row must be before any of those positions may be read. Layout
//! drift between seasons is handled by swapping schemas in configuration,
//! not by editing extraction code.

use crate::extract::field;
use crate::models::Field;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The table layouts that have a schema in the configuration arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    SeasonSummary,
    Batting,
    Bowling,
    CareerBatting,
    CareerBowling,
    InningsByInnings,
}

/// Field name → 1-based column position, plus the minimum row width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    columns: Vec<(String, usize)>,
    #[serde(default)]
    required_width: Option<usize>,
}

impl TableSchema {
    /// Build a schema from `(name, position)` pairs. The required width is
    /// the largest position.
    pub fn new<'n>(columns: impl IntoIterator<Item = (&'n str, usize)>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, pos)| (name.to_string(), pos))
                .collect(),
            required_width: None,
        }
    }

    /// Override the required width.
    pub fn with_required_width(mut self, width: usize) -> Self {
        self.required_width = Some(width);
        self
    }

    /// Derive a schema from a header row: each header text becomes a field
    /// at its own position. Rows must be exactly as wide as the header, so
    /// the required width is the header count.
    pub fn from_headers(headers: &[String]) -> Self {
        Self {
            columns: headers
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i + 1))
                .collect(),
            required_width: Some(headers.len()),
        }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, pos)| *pos)
    }

    pub fn required_width(&self) -> usize {
        self.required_width
            .unwrap_or_else(|| self.columns.iter().map(|(_, p)| *p).max().unwrap_or(0))
    }

    /// Field names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Check a row's width and expose its cells by field name.
    ///
    /// # Errors
    ///
    /// Returns [`ShortRow`] when the row has fewer cells than the schema
    /// requires. The caller classifies such rows as non-data.
    pub fn map<'s, 'a>(&'s self, cells: Vec<ElementRef<'a>>) -> Result<MappedRow<'s, 'a>, ShortRow> {
        let required = self.required_width();
        if cells.len() < required {
            return Err(ShortRow {
                found: cells.len(),
                required,
            });
        }
        Ok(MappedRow {
            schema: self,
            cells,
            partial: false,
        })
    }

    /// Map a row without the width check. Fields beyond the row's width
    /// resolve to missing.
    pub fn map_partial<'s, 'a>(&'s self, cells: Vec<ElementRef<'a>>) -> MappedRow<'s, 'a> {
        let partial = cells.len() < self.required_width();
        MappedRow {
            schema: self,
            cells,
            partial,
        }
    }
}

/// A row narrower than its schema requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortRow {
    pub found: usize,
    pub required: usize,
}

impl fmt::Display for ShortRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row has {} cells, schema requires {}", self.found, self.required)
    }
}

impl std::error::Error for ShortRow {}

/// A row whose cells can be read by field name.
#[derive(Debug, Clone)]
pub struct MappedRow<'s, 'a> {
    schema: &'s TableSchema,
    cells: Vec<ElementRef<'a>>,
    partial: bool,
}

impl<'s, 'a> MappedRow<'s, 'a> {
    /// The cell for `name`, if the schema knows the field and the row is wide
    /// enough.
    pub fn cell(&self, name: &str) -> Option<ElementRef<'a>> {
        let pos = self.schema.position(name)?;
        self.cells.get(pos.checked_sub(1)?).copied()
    }

    /// Text of the cell for `name`, through Safe Field Access.
    pub fn text(&self, name: &str) -> Field {
        field::text(self.cell(name))
    }

    pub fn cells(&self) -> &[ElementRef<'a>] {
        &self.cells
    }

    pub fn schema(&self) -> &'s TableSchema {
        self.schema
    }

    /// True when the row was mapped without meeting the required width.
    pub fn is_partial(&self) -> bool {
        self.partial
    }
}
