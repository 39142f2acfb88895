//! Typed field columns and their boundary flattening
//!
//! The type-tag resolver lives here as a pair of sealed traits: [`Scalar`]
//! covers the fixed-width cell types, [`Element`] covers everything a row
//! may hold (scalars, strings, blobs, and fixed-width vectors of scalars).
//! Unsupported element types are rejected at definition time because the
//! traits cannot be implemented outside this crate; vectors of vectors are
//! unrepresentable for the same reason.

mod field;
mod flatten;

pub use field::{ColumnData, FieldColumn, FlatFieldColumn};
pub use flatten::{FlatCells, FlattenedColumn};

use crate::batch::{CellData, ResultColumn};
use crate::error::{BridgeError, Result};
use crate::types::{Blob, LogicalType, Timestamp};
use std::borrow::Cow;

mod sealed {
    pub trait Sealed {}
}

/// Fixed-width cell types: the element types a vector column may carry.
///
/// Each implementor resolves to exactly one [`LogicalType`]. The trait is
/// sealed; the implementor set is the closed dispatch table of the
/// marshaling layer.
pub trait Scalar: sealed::Sealed + Copy + 'static {
    /// The unique logical type tag for this element type.
    const LOGICAL: LogicalType;

    /// Borrow a row slice as boundary cells.
    fn cells_borrowed(rows: &[Self]) -> FlatCells<'_>;

    /// Wrap an owned, already row-major buffer as boundary cells.
    fn cells_owned(cells: Vec<Self>) -> FlatCells<'static>;

    /// View a result column's cell buffer as this type, if the tags match.
    fn result_cells(cells: &CellData) -> Option<&[Self]>;
}

macro_rules! impl_scalar {
    ($ty:ty, $variant:ident) => {
        impl sealed::Sealed for $ty {}

        impl Scalar for $ty {
            const LOGICAL: LogicalType = LogicalType::$variant;

            fn cells_borrowed(rows: &[Self]) -> FlatCells<'_> {
                FlatCells::$variant(Cow::Borrowed(rows))
            }

            fn cells_owned(cells: Vec<Self>) -> FlatCells<'static> {
                FlatCells::$variant(Cow::Owned(cells))
            }

            fn result_cells(cells: &CellData) -> Option<&[Self]> {
                match cells {
                    CellData::$variant(values) => Some(values),
                    _ => None,
                }
            }
        }

        impl Element for $ty {
            const LOGICAL: LogicalType = LogicalType::$variant;
            const IS_VECTOR: bool = false;

            fn probe_dimension(_rows: &[Self]) -> usize {
                1
            }

            fn uniform(_rows: &[Self]) -> bool {
                true
            }

            fn flatten_rows(rows: &[Self]) -> FlatCells<'_> {
                <$ty as Scalar>::cells_borrowed(rows)
            }

            fn read_cell(column: &ResultColumn, row: usize) -> Result<Self> {
                let cells = <$ty as Scalar>::result_cells(column.cells())
                    .ok_or_else(|| cell_type_mismatch(column, LogicalType::$variant))?;
                cells
                    .get(row)
                    .copied()
                    .ok_or_else(|| cell_row_range(column, row))
            }
        }
    };
}

impl_scalar!(i8, Int8);
impl_scalar!(i16, Int16);
impl_scalar!(i32, Int32);
impl_scalar!(i64, Int64);
impl_scalar!(u8, UInt8);
impl_scalar!(u16, UInt16);
impl_scalar!(u32, UInt32);
impl_scalar!(u64, UInt64);
impl_scalar!(f32, Float32);
impl_scalar!(f64, Float64);
impl_scalar!(Timestamp, Timestamp);

/// Row element types accepted by [`FieldColumn`]: every [`Scalar`], plus
/// `String`, [`Blob`], and `Vec<S: Scalar>`.
///
/// A `Vec<S>` row resolves to `S`'s logical type with vector shape. Only
/// these two nesting levels exist: there is no `Element` impl for
/// `Vec<Vec<_>>`, `Vec<String>`, or `Vec<Blob>`, so deeper or
/// variable-width nesting fails to compile.
pub trait Element: sealed::Sealed + Clone + 'static {
    /// Logical type tag; for vector rows, the element's tag.
    const LOGICAL: LogicalType;

    /// Whether rows are fixed-width vectors.
    const IS_VECTOR: bool;

    /// Dimension taken from row 0 (1 for scalar-shaped elements, and for
    /// vector columns with no rows).
    fn probe_dimension(rows: &[Self]) -> usize;

    /// Whether every row has the same width as row 0.
    fn uniform(rows: &[Self]) -> bool;

    /// Flatten rows into boundary cells (row-major for vectors).
    fn flatten_rows(rows: &[Self]) -> FlatCells<'_>;

    /// Read one row's value back out of a result column.
    fn read_cell(column: &ResultColumn, row: usize) -> Result<Self>;
}

fn cell_type_mismatch(column: &ResultColumn, expected: LogicalType) -> BridgeError {
    BridgeError::UnsupportedDataType(format!(
        "result column '{}' holds {:?} cells, field expects {:?}",
        column.name(),
        column.logical_type(),
        expected
    ))
}

fn cell_row_range(column: &ResultColumn, row: usize) -> BridgeError {
    BridgeError::InvalidData(format!(
        "row {} out of range for result column '{}' ({} rows)",
        row,
        column.name(),
        column.row_count()
    ))
}

impl<S: Scalar> sealed::Sealed for Vec<S> {}

impl<S: Scalar> Element for Vec<S> {
    const LOGICAL: LogicalType = S::LOGICAL;
    const IS_VECTOR: bool = true;

    fn probe_dimension(rows: &[Self]) -> usize {
        rows.first().map_or(1, |row| row.len())
    }

    fn uniform(rows: &[Self]) -> bool {
        match rows.first() {
            Some(first) => rows.iter().all(|row| row.len() == first.len()),
            None => true,
        }
    }

    fn flatten_rows(rows: &[Self]) -> FlatCells<'_> {
        let dimension = Self::probe_dimension(rows);
        let mut cells = Vec::with_capacity(rows.len() * dimension);
        for row in rows {
            cells.extend_from_slice(row);
        }
        S::cells_owned(cells)
    }

    fn read_cell(column: &ResultColumn, row: usize) -> Result<Self> {
        let cells =
            S::result_cells(column.cells()).ok_or_else(|| cell_type_mismatch(column, S::LOGICAL))?;
        let dimension = column.dimension();
        let start = row * dimension;
        let end = start + dimension;
        if end > cells.len() {
            return Err(cell_row_range(column, row));
        }
        Ok(cells[start..end].to_vec())
    }
}

impl sealed::Sealed for String {}

impl Element for String {
    const LOGICAL: LogicalType = LogicalType::String;
    const IS_VECTOR: bool = false;

    fn probe_dimension(_rows: &[Self]) -> usize {
        1
    }

    fn uniform(_rows: &[Self]) -> bool {
        true
    }

    fn flatten_rows(rows: &[Self]) -> FlatCells<'_> {
        FlatCells::Str(rows.iter().map(|s| s.as_str()).collect())
    }

    fn read_cell(column: &ResultColumn, row: usize) -> Result<Self> {
        match column.cells() {
            CellData::Str(values) => values
                .get(row)
                .cloned()
                .ok_or_else(|| cell_row_range(column, row)),
            _ => Err(cell_type_mismatch(column, LogicalType::String)),
        }
    }
}

impl sealed::Sealed for Blob {}

impl Element for Blob {
    const LOGICAL: LogicalType = LogicalType::Blob;
    const IS_VECTOR: bool = false;

    fn probe_dimension(_rows: &[Self]) -> usize {
        1
    }

    fn uniform(_rows: &[Self]) -> bool {
        true
    }

    fn flatten_rows(rows: &[Self]) -> FlatCells<'_> {
        FlatCells::Blob {
            bytes: rows.iter().map(|b| b.as_bytes()).collect(),
            sizes: rows.iter().map(|b| b.len()).collect(),
        }
    }

    fn read_cell(column: &ResultColumn, row: usize) -> Result<Self> {
        match column.cells() {
            // Result blob buffers carry their per-row byte length; the
            // hydrated blob is sized from it.
            CellData::Blob(values) => values
                .get(row)
                .map(|bytes| Blob::new(bytes.clone()))
                .ok_or_else(|| cell_row_range(column, row)),
            _ => Err(cell_type_mismatch(column, LogicalType::Blob)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Shape;

    #[test]
    fn test_scalar_type_tags() {
        assert_eq!(<i8 as Element>::LOGICAL, LogicalType::Int8);
        assert_eq!(<u64 as Element>::LOGICAL, LogicalType::UInt64);
        assert_eq!(<f32 as Element>::LOGICAL, LogicalType::Float32);
        assert_eq!(<Timestamp as Element>::LOGICAL, LogicalType::Timestamp);
        assert_eq!(<String as Element>::LOGICAL, LogicalType::String);
        assert_eq!(<Blob as Element>::LOGICAL, LogicalType::Blob);
        assert!(!<f64 as Element>::IS_VECTOR);
    }

    #[test]
    fn test_vector_resolves_to_element_tag() {
        assert_eq!(<Vec<f32> as Element>::LOGICAL, LogicalType::Float32);
        assert_eq!(<Vec<i16> as Element>::LOGICAL, LogicalType::Int16);
        assert!(<Vec<f32> as Element>::IS_VECTOR);
    }

    #[test]
    fn test_vector_dimension_and_uniformity() {
        let rows = vec![vec![1.0f32, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert_eq!(<Vec<f32> as Element>::probe_dimension(&rows), 3);
        assert!(<Vec<f32> as Element>::uniform(&rows));

        let ragged = vec![vec![1.0f32, 2.0, 3.0], vec![4.0]];
        assert_eq!(<Vec<f32> as Element>::probe_dimension(&ragged), 3);
        assert!(!<Vec<f32> as Element>::uniform(&ragged));
    }

    #[test]
    fn test_row_major_flatten() {
        let rows = vec![vec![1i32, 2], vec![3, 4], vec![5, 6]];
        match <Vec<i32> as Element>::flatten_rows(&rows) {
            FlatCells::Int32(cells) => assert_eq!(cells.as_ref(), &[1, 2, 3, 4, 5, 6]),
            other => panic!("unexpected cells: {:?}", other),
        }
    }

    #[test]
    fn test_read_cell_type_mismatch() {
        let column = ResultColumn::new(
            "idx",
            LogicalType::Int32,
            Shape::Scalar,
            2,
            CellData::Int32(vec![7, 8]),
        );
        assert_eq!(<i32 as Element>::read_cell(&column, 1).unwrap(), 8);
        assert!(matches!(
            <f32 as Element>::read_cell(&column, 0),
            Err(BridgeError::UnsupportedDataType(_))
        ));
        assert!(matches!(
            <i32 as Element>::read_cell(&column, 2),
            Err(BridgeError::InvalidData(_))
        ));
    }
}
