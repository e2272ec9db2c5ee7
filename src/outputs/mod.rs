//! Output generation for a run.
//!
//! # Submodules
//!
//! - [`dedupe`]: drops records repeated across inputs, by per-page key fields
//! - [`json`]: writes a [`RunReport`](crate::models::RunReport) to a dated
//!   JSON file
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── 2026-04-09/
//! │   ├── season.json
//! │   ├── scorecard.json
//! │   └── teams.json
//! ```

pub mod dedupe;
pub mod json;
