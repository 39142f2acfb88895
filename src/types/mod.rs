//! Logical column types and cell value types

mod blob;
mod timestamp;

pub use blob::Blob;
pub use timestamp::Timestamp;

use serde::{Deserialize, Serialize};

/// Engine-level scalar type tag carried by every column.
///
/// `Float16` is a wire-level tag only: no native element type resolves to
/// it, but result batches produced by an engine may carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalType {
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float16,
    Float32,
    Float64,
    String,
    Blob,
    Timestamp,
}

impl LogicalType {
    /// Whether cells of this type have per-row byte lengths instead of a
    /// fixed width.
    pub fn is_variable_length(&self) -> bool {
        matches!(self, LogicalType::String | LogicalType::Blob)
    }
}

/// Whether a column holds one scalar per row or a fixed-dimension vector
/// per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Scalar,
    /// Fixed-width vector with the given dimension.
    Vector(usize),
}

impl Shape {
    /// Cells per row: 1 for scalars, the dimension for vectors.
    pub fn dimension(&self) -> usize {
        match self {
            Shape::Scalar => 1,
            Shape::Vector(dim) => *dim,
        }
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Shape::Vector(_))
    }
}
