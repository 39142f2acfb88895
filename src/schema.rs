//! Schema descriptors for table creation
//!
//! A [`ColumnDescriptor`] is the immutable projection of one column's
//! metadata; a [`Schema`] is the ordered list handed to the engine's
//! `create_table_with_schema`. Column-name uniqueness within a schema is a
//! caller invariant, not enforced here.

use crate::column::ColumnData;
use crate::types::{LogicalType, Shape};
use serde::{Deserialize, Serialize};

/// Immutable description of one column: name, logical type, shape,
/// nullability, and whether the engine should index it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Logical cell type
    pub logical_type: LogicalType,
    /// Scalar or fixed-dimension vector
    pub shape: Shape,
    /// Whether this column is nullable
    pub nullable: bool,
    /// Engine hint: build an index over this column
    pub create_index: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, logical_type: LogicalType, shape: Shape) -> Self {
        Self {
            name: name.into(),
            logical_type,
            shape,
            nullable: false,
            create_index: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.create_index = true;
        self
    }

    /// Cells per row (1 for scalar columns)
    pub fn dimension(&self) -> usize {
        self.shape.dimension()
    }
}

/// Ordered list of column descriptors for one table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Column descriptors (ordered)
    pub columns: Vec<ColumnDescriptor>,
}

impl Schema {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self { columns }
    }

    /// Build a schema from a heterogeneous column set, in order.
    pub fn from_columns(columns: &[&dyn ColumnData]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.descriptor()).collect(),
        }
    }

    /// Get descriptor by name
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
