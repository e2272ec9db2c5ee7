//! Small text grammars applied to cell text.
//!
//! Every parser takes a [`Field`](crate::models::Field) and never fails:
//! unparseable input becomes missing fields or a verbatim fallback, and the
//! raw text is kept alongside the typed values.

pub mod dismissal;
pub mod figures;
pub mod link;
pub mod margin;
pub mod player;
pub mod score;
pub mod span;

pub use dismissal::{DismissalKind, ParsedDismissal};
pub use figures::BowlingFigures;
pub use link::{IdKind, LinkId};
pub use margin::{Margin, ParsedMargin};
pub use player::PlayerInfo;
pub use score::ParsedScore;
pub use span::CareerSpan;
