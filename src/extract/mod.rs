//! Table extraction primitives: null-tolerant field access, column schemas,
//! structural location and row reconstruction.

pub mod field;
pub mod locate;
pub mod rows;
pub mod schema;

pub use locate::{
    FileSnapshot, Located, LocateState, Locator, RetryPolicy, Settled, SnapshotSource, StaticSnapshot, Strategy, settle,
};
pub use rows::{LogicalRow, RawRow, Reconstructor, RowClass, RowRules, body_rows};
pub use schema::{MappedRow, SchemaKind, ShortRow, TableSchema};
