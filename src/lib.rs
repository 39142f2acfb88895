//! vecbridge — typed columnar marshaling for vector-search engines
//!
//! Sits between application record types and the untyped columnar format a
//! storage/vector-search engine consumes:
//! - describe a table's columns (name, logical type, vector dimension,
//!   nullability)
//! - convert typed in-memory collections into flat columnar buffers for
//!   bulk insertion
//! - convert result batches back into typed records, including the derived
//!   `_distance` column
//! - validate structural invariants before anything crosses the boundary
//!
//! ## Architecture
//! - Column layer: type-tag resolution + [`FieldColumn`] flattening
//! - Batch layer: [`BatchInserter`] + boundary wire structures
//! - Adapter layer: [`TableSchema`] record ⇄ column transposition
//! - Engine boundary: the [`Engine`] trait, with [`MemEngine`] as the
//!   in-memory reference implementation
//!
//! ## Quick start
//!
//! ```
//! use vecbridge::{record_binding, Connection, MemEngine, TableSchema};
//!
//! #[derive(Debug, Default, Clone)]
//! struct Doc {
//!     id: i32,
//!     embedding: Vec<f32>,
//!     content: String,
//! }
//!
//! record_binding! {
//!     static DOC_BINDING: Doc => "documents" {
//!         "id" => id,
//!         "embedding" => embedding,
//!         "content" => content,
//!     }
//! }
//!
//! # fn main() -> vecbridge::Result<()> {
//! let conn = Connection::<MemEngine>::open("mem://docs")?;
//! let docs = vec![
//!     Doc { id: 0, embedding: vec![1.0, 0.0], content: "north".into() },
//!     Doc { id: 1, embedding: vec![0.0, 1.0], content: "east".into() },
//! ];
//!
//! let schema = TableSchema::new(&conn, &DOC_BINDING).create_table(true);
//! schema.run(&docs)?;
//!
//! let hits = schema.query("embedding", &[0.0, 1.0])?;
//! assert_eq!(hits.records[0].id, 1);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod batch;
pub mod column;
pub mod distance;
pub mod engine;
pub mod inserter;
pub mod schema;
pub mod types;

mod error;

pub use adapter::{ColumnBinding, RecordBinding, RecordHits, TableSchema};
pub use batch::{CellData, InsertBatch, ResultBatch, ResultColumn, DISTANCE_COLUMN};
pub use column::{
    ColumnData, Element, FieldColumn, FlatCells, FlatFieldColumn, FlattenedColumn, Scalar,
};
pub use engine::{Connection, Engine, MemEngine, MemEngineOptions, MemEngineStats, SearchResults};
pub use error::{BridgeError, Result};
pub use inserter::BatchInserter;
pub use schema::{ColumnDescriptor, Schema};
pub use types::{Blob, LogicalType, Shape, Timestamp};
