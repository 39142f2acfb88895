//! Columnar batches crossing the engine boundary
//!
//! [`InsertBatch`] is the outbound form: it borrows every column's
//! flattened cells, so no row data is copied on its way into the engine.
//! [`ResultBatch`] is the inbound form: cell buffers the engine allocated
//! for a query result, owned until released through the engine's own free
//! operation (see [`SearchResults`](crate::engine::SearchResults)).

use crate::column::{FlatCells, FlattenedColumn};
use crate::types::{LogicalType, Shape, Timestamp};
use std::fmt;

/// Reserved name of the derived similarity column in search results.
pub const DISTANCE_COLUMN: &str = "_distance";

/// Ordered set of flattened columns submitted to one boundary insert.
#[derive(Debug)]
pub struct InsertBatch<'a> {
    columns: Vec<FlattenedColumn<'a>>,
}

impl<'a> InsertBatch<'a> {
    pub fn new(columns: Vec<FlattenedColumn<'a>>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[FlattenedColumn<'a>] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Owned cell buffers of one result column.
///
/// The owned twin of [`FlatCells`]: engines fill these when materializing
/// a search result. Variable-length cells keep per-row buffers, so their
/// byte lengths travel with the data.
#[derive(Debug, Clone, PartialEq)]
pub enum CellData {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Timestamp(Vec<Timestamp>),
    Str(Vec<String>),
    Blob(Vec<Vec<u8>>),
}

impl CellData {
    /// An empty buffer of the right variant for a logical type.
    ///
    /// `Float16` has no native buffer representation and yields `None`.
    pub fn empty_of(logical_type: LogicalType) -> Option<Self> {
        match logical_type {
            LogicalType::Int8 => Some(CellData::Int8(Vec::new())),
            LogicalType::Int16 => Some(CellData::Int16(Vec::new())),
            LogicalType::Int32 => Some(CellData::Int32(Vec::new())),
            LogicalType::Int64 => Some(CellData::Int64(Vec::new())),
            LogicalType::UInt8 => Some(CellData::UInt8(Vec::new())),
            LogicalType::UInt16 => Some(CellData::UInt16(Vec::new())),
            LogicalType::UInt32 => Some(CellData::UInt32(Vec::new())),
            LogicalType::UInt64 => Some(CellData::UInt64(Vec::new())),
            LogicalType::Float16 => None,
            LogicalType::Float32 => Some(CellData::Float32(Vec::new())),
            LogicalType::Float64 => Some(CellData::Float64(Vec::new())),
            LogicalType::String => Some(CellData::Str(Vec::new())),
            LogicalType::Blob => Some(CellData::Blob(Vec::new())),
            LogicalType::Timestamp => Some(CellData::Timestamp(Vec::new())),
        }
    }

    /// Total number of cells in the buffer.
    pub fn len(&self) -> usize {
        match self {
            CellData::Int8(v) => v.len(),
            CellData::Int16(v) => v.len(),
            CellData::Int32(v) => v.len(),
            CellData::Int64(v) => v.len(),
            CellData::UInt8(v) => v.len(),
            CellData::UInt16(v) => v.len(),
            CellData::UInt32(v) => v.len(),
            CellData::UInt64(v) => v.len(),
            CellData::Float32(v) => v.len(),
            CellData::Float64(v) => v.len(),
            CellData::Timestamp(v) => v.len(),
            CellData::Str(v) => v.len(),
            CellData::Blob(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append flattened insert cells to this buffer. Fails (returns false)
    /// when the variants disagree.
    pub fn append_flat(&mut self, cells: &FlatCells<'_>) -> bool {
        match (self, cells) {
            (CellData::Int8(own), FlatCells::Int8(new)) => own.extend_from_slice(new),
            (CellData::Int16(own), FlatCells::Int16(new)) => own.extend_from_slice(new),
            (CellData::Int32(own), FlatCells::Int32(new)) => own.extend_from_slice(new),
            (CellData::Int64(own), FlatCells::Int64(new)) => own.extend_from_slice(new),
            (CellData::UInt8(own), FlatCells::UInt8(new)) => own.extend_from_slice(new),
            (CellData::UInt16(own), FlatCells::UInt16(new)) => own.extend_from_slice(new),
            (CellData::UInt32(own), FlatCells::UInt32(new)) => own.extend_from_slice(new),
            (CellData::UInt64(own), FlatCells::UInt64(new)) => own.extend_from_slice(new),
            (CellData::Float32(own), FlatCells::Float32(new)) => own.extend_from_slice(new),
            (CellData::Float64(own), FlatCells::Float64(new)) => own.extend_from_slice(new),
            (CellData::Timestamp(own), FlatCells::Timestamp(new)) => own.extend_from_slice(new),
            (CellData::Str(own), FlatCells::Str(new)) => {
                own.extend(new.iter().map(|s| s.to_string()))
            }
            (CellData::Blob(own), FlatCells::Blob { bytes, .. }) => {
                own.extend(bytes.iter().map(|b| b.to_vec()))
            }
            _ => return false,
        }
        true
    }

    /// Project the given row indices into a new buffer, row-major for the
    /// given dimension.
    pub fn take_rows(&self, rows: &[usize], dimension: usize) -> Self {
        fn take<T: Copy>(values: &[T], rows: &[usize], dimension: usize) -> Vec<T> {
            let mut taken = Vec::with_capacity(rows.len() * dimension);
            for &row in rows {
                taken.extend_from_slice(&values[row * dimension..(row + 1) * dimension]);
            }
            taken
        }

        match self {
            CellData::Int8(v) => CellData::Int8(take(v, rows, dimension)),
            CellData::Int16(v) => CellData::Int16(take(v, rows, dimension)),
            CellData::Int32(v) => CellData::Int32(take(v, rows, dimension)),
            CellData::Int64(v) => CellData::Int64(take(v, rows, dimension)),
            CellData::UInt8(v) => CellData::UInt8(take(v, rows, dimension)),
            CellData::UInt16(v) => CellData::UInt16(take(v, rows, dimension)),
            CellData::UInt32(v) => CellData::UInt32(take(v, rows, dimension)),
            CellData::UInt64(v) => CellData::UInt64(take(v, rows, dimension)),
            CellData::Float32(v) => CellData::Float32(take(v, rows, dimension)),
            CellData::Float64(v) => CellData::Float64(take(v, rows, dimension)),
            CellData::Timestamp(v) => CellData::Timestamp(take(v, rows, dimension)),
            CellData::Str(v) => CellData::Str(rows.iter().map(|&row| v[row].clone()).collect()),
            CellData::Blob(v) => CellData::Blob(rows.iter().map(|&row| v[row].clone()).collect()),
        }
    }
}

/// One column of a result batch: metadata plus engine-allocated cells.
#[derive(Debug, Clone)]
pub struct ResultColumn {
    name: String,
    logical_type: LogicalType,
    shape: Shape,
    row_count: usize,
    cells: CellData,
}

impl ResultColumn {
    pub fn new(
        name: impl Into<String>,
        logical_type: LogicalType,
        shape: Shape,
        row_count: usize,
        cells: CellData,
    ) -> Self {
        Self {
            name: name.into(),
            logical_type,
            shape,
            row_count,
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logical_type(&self) -> LogicalType {
        self.logical_type
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Cells per row (1 for scalar columns)
    pub fn dimension(&self) -> usize {
        self.shape.dimension()
    }

    pub fn cells(&self) -> &CellData {
        &self.cells
    }
}

/// A query result in boundary layout.
///
/// Memory ownership: the cells were allocated by the engine and are
/// released exactly once through the engine's free operation, never
/// directly by callers.
#[derive(Debug, Default)]
pub struct ResultBatch {
    columns: Vec<ResultColumn>,
}

impl ResultBatch {
    pub fn new(columns: Vec<ResultColumn>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[ResultColumn] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Look up a column by name (linear scan).
    pub fn column(&self, name: &str) -> Option<&ResultColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Detach all columns, leaving the batch empty. Used by engines when
    /// releasing result memory.
    pub fn take_columns(&mut self) -> Vec<ResultColumn> {
        std::mem::take(&mut self.columns)
    }
}

impl fmt::Display for ResultBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "result batch: {} columns", self.columns.len())?;
        for column in &self.columns {
            writeln!(
                f,
                "  {} [{:?} {:?}] rows={} cells={}",
                column.name,
                column.logical_type,
                column.shape,
                column.row_count,
                column.cells.len()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_of_matches_variant() {
        assert_eq!(
            CellData::empty_of(LogicalType::Float32),
            Some(CellData::Float32(Vec::new()))
        );
        assert_eq!(
            CellData::empty_of(LogicalType::Blob),
            Some(CellData::Blob(Vec::new()))
        );
        assert_eq!(CellData::empty_of(LogicalType::Float16), None);
    }

    #[test]
    fn test_append_flat_same_variant() {
        let mut cells = CellData::Int32(vec![1, 2]);
        assert!(cells.append_flat(&FlatCells::Int32(vec![3, 4].into())));
        assert_eq!(cells, CellData::Int32(vec![1, 2, 3, 4]));

        // variant mismatch is refused
        assert!(!cells.append_flat(&FlatCells::Float32(vec![1.0].into())));
    }

    #[test]
    fn test_append_flat_variable_length() {
        let mut strings = CellData::Str(Vec::new());
        assert!(strings.append_flat(&FlatCells::Str(vec!["a", "b"])));
        assert_eq!(strings, CellData::Str(vec!["a".into(), "b".into()]));

        let payload = [7u8, 8, 9];
        let mut blobs = CellData::Blob(Vec::new());
        assert!(blobs.append_flat(&FlatCells::Blob {
            bytes: vec![&payload],
            sizes: vec![3],
        }));
        assert_eq!(blobs, CellData::Blob(vec![vec![7, 8, 9]]));
    }

    #[test]
    fn test_take_rows_row_major() {
        let cells = CellData::Float32(vec![0.0, 0.1, 1.0, 1.1, 2.0, 2.1]);
        let taken = cells.take_rows(&[2, 0], 2);
        assert_eq!(taken, CellData::Float32(vec![2.0, 2.1, 0.0, 0.1]));
    }

    #[test]
    fn test_batch_column_lookup() {
        let batch = ResultBatch::new(vec![
            ResultColumn::new(
                "idx",
                LogicalType::Int32,
                Shape::Scalar,
                2,
                CellData::Int32(vec![4, 7]),
            ),
            ResultColumn::new(
                DISTANCE_COLUMN,
                LogicalType::Float32,
                Shape::Scalar,
                2,
                CellData::Float32(vec![0.0, 0.4]),
            ),
        ]);
        assert_eq!(batch.column("idx").unwrap().row_count(), 2);
        assert!(batch.column(DISTANCE_COLUMN).is_some());
        assert!(batch.column("missing").is_none());

        let rendered = batch.to_string();
        assert!(rendered.contains("idx"));
        assert!(rendered.contains(DISTANCE_COLUMN));
    }
}
