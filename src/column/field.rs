//! Named, typed columns of row data
//!
//! A column never fails on construction: structural problems (empty data,
//! ragged vector rows, bad flat sizing) set a validity flag that consumers
//! check before anything crosses the boundary.

use crate::column::flatten::{FlatCells, FlattenedColumn};
use crate::column::Element;
use crate::schema::ColumnDescriptor;
use crate::types::Shape;

/// The seam between typed columns and the batch machinery: metadata
/// projection, validity, and boundary flattening.
pub trait ColumnData {
    /// Immutable projection of name, logical type, shape, and flags.
    fn descriptor(&self) -> ColumnDescriptor;

    fn name(&self) -> &str;

    fn row_count(&self) -> usize;

    /// Whether the bound data passed structural validation.
    fn is_valid(&self) -> bool;

    /// Build the boundary view. The result borrows from this column.
    fn flatten(&self) -> FlattenedColumn<'_>;
}

/// A single named column owning its row values.
///
/// Shape and logical type are resolved from the element type when the
/// column is declared. Vector columns take their dimension from row 0 and
/// are valid only when non-empty and uniform; scalar columns are valid
/// when non-empty.
#[derive(Debug, Clone)]
pub struct FieldColumn<T: Element> {
    name: String,
    rows: Vec<T>,
    nullable: bool,
    create_index: bool,
    dimension: usize,
    valid: bool,
}

impl<T: Element> FieldColumn<T> {
    pub fn new(name: impl Into<String>, rows: Vec<T>) -> Self {
        let dimension = if T::IS_VECTOR {
            T::probe_dimension(&rows)
        } else {
            1
        };
        let valid = !rows.is_empty() && T::uniform(&rows);
        Self {
            name: name.into(),
            rows,
            nullable: false,
            create_index: false,
            dimension,
            valid,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Hint the engine to index this column
    pub fn indexed(mut self) -> Self {
        self.create_index = true;
        self
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Vector dimension, taken from row 0 even when validation failed.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn shape(&self) -> Shape {
        if T::IS_VECTOR {
            Shape::Vector(self.dimension)
        } else {
            Shape::Scalar
        }
    }
}

impl<T: Element> ColumnData for FieldColumn<T> {
    fn descriptor(&self) -> ColumnDescriptor {
        ColumnDescriptor {
            name: self.name.clone(),
            logical_type: T::LOGICAL,
            shape: self.shape(),
            nullable: self.nullable,
            create_index: self.create_index,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn flatten(&self) -> FlattenedColumn<'_> {
        FlattenedColumn::new(self.descriptor(), self.rows.len(), T::flatten_rows(&self.rows))
    }
}

/// A column whose cells arrive already flattened, with the shape supplied
/// by the caller.
///
/// The cell sequence of a vector column must divide evenly by the declared
/// dimension. Variable-length element types (strings, blobs) only make
/// sense with scalar shape; a vector shape over them is invalid.
#[derive(Debug, Clone)]
pub struct FlatFieldColumn<T: Element> {
    name: String,
    cells: Vec<T>,
    shape: Shape,
    nullable: bool,
    create_index: bool,
    valid: bool,
}

impl<T: Element> FlatFieldColumn<T> {
    pub fn new(name: impl Into<String>, cells: Vec<T>, shape: Shape) -> Self {
        let valid = Self::check_valid(&cells, shape);
        Self {
            name: name.into(),
            cells,
            shape,
            nullable: false,
            create_index: false,
            valid,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Hint the engine to index this column
    pub fn indexed(mut self) -> Self {
        self.create_index = true;
        self
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    pub fn dimension(&self) -> usize {
        self.shape.dimension()
    }

    fn check_valid(cells: &[T], shape: Shape) -> bool {
        // The cell type itself must be flat; a pre-flattened column of
        // vectors would be a third nesting level.
        if T::IS_VECTOR {
            return false;
        }
        if T::LOGICAL.is_variable_length() && shape.is_vector() {
            return false;
        }
        let dimension = shape.dimension();
        if dimension == 0 || cells.is_empty() {
            return false;
        }
        cells.len() % dimension == 0
    }
}

impl<T: Element> ColumnData for FlatFieldColumn<T> {
    fn descriptor(&self) -> ColumnDescriptor {
        ColumnDescriptor {
            name: self.name.clone(),
            logical_type: T::LOGICAL,
            shape: self.shape,
            nullable: self.nullable,
            create_index: self.create_index,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn row_count(&self) -> usize {
        let dimension = self.shape.dimension();
        if dimension == 0 {
            0
        } else {
            self.cells.len() / dimension
        }
    }

    fn is_valid(&self) -> bool {
        self.valid
    }

    fn flatten(&self) -> FlattenedColumn<'_> {
        FlattenedColumn::new(
            self.descriptor(),
            self.row_count(),
            T::flatten_rows(&self.cells),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Blob, LogicalType};

    #[test]
    fn test_vector_column() {
        let column = FieldColumn::new("test", vec![vec![1.0f32, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let desc = column.descriptor();
        assert_eq!(desc.logical_type, LogicalType::Float32);
        assert_eq!(desc.shape, Shape::Vector(3));
        assert!(column.is_valid());

        let flat = column.flatten();
        assert_eq!(flat.row_count(), 2);
        assert_eq!(flat.dimension(), 3);
        match flat.cells() {
            FlatCells::Float32(cells) => {
                assert_eq!(cells.as_ref(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            }
            other => panic!("unexpected cells: {:?}", other),
        }
    }

    #[test]
    fn test_scalar_column() {
        let column = FieldColumn::new("test2", vec![1i32, 2, 3]);
        let desc = column.descriptor();
        assert_eq!(desc.logical_type, LogicalType::Int32);
        assert_eq!(desc.shape, Shape::Scalar);
        assert_eq!(column.dimension(), 1);
        assert!(column.is_valid());
    }

    #[test]
    fn test_ragged_vector_column_invalid_keeps_row0_dimension() {
        let column = FieldColumn::new("test3", vec![vec![1.0f32, 2.0, 3.0], vec![3.0]]);
        assert!(!column.is_valid());
        assert_eq!(column.dimension(), 3);
    }

    #[test]
    fn test_empty_columns_invalid() {
        let scalar = FieldColumn::new("empty", Vec::<i64>::new());
        assert!(!scalar.is_valid());

        let vector = FieldColumn::new("empty_vec", Vec::<Vec<f32>>::new());
        assert!(!vector.is_valid());
        assert_eq!(vector.dimension(), 1);
    }

    #[test]
    fn test_string_column_flatten() {
        let column = FieldColumn::new(
            "test7",
            vec!["hello".to_string(), "kitty".to_string(), "!".to_string()],
        );
        assert!(column.is_valid());
        let desc = column.descriptor();
        assert_eq!(desc.logical_type, LogicalType::String);
        assert_eq!(desc.shape, Shape::Scalar);

        let flat = column.flatten();
        match flat.cells() {
            FlatCells::Str(cells) => assert_eq!(cells, &["hello", "kitty", "!"]),
            other => panic!("unexpected cells: {:?}", other),
        }
    }

    #[test]
    fn test_blob_column_flatten_sizes() {
        let column = FieldColumn::new(
            "payload",
            vec![
                Blob::new(vec![1, 2, 3, 4, 5]),
                Blob::new(vec![2, 4, 5, 6, 7, 8, 9, 0]),
            ],
        );
        assert!(column.is_valid());
        assert_eq!(column.descriptor().logical_type, LogicalType::Blob);

        let flat = column.flatten();
        let sizes = flat.byte_sizes().unwrap();
        assert_eq!(flat.cells().len(), sizes.len());
        assert_eq!(sizes, &[5, 8]);
        match flat.cells() {
            FlatCells::Blob { bytes, .. } => {
                assert_eq!(bytes[0], &[1, 2, 3, 4, 5]);
                assert_eq!(bytes[1], &[2, 4, 5, 6, 7, 8, 9, 0]);
            }
            other => panic!("unexpected cells: {:?}", other),
        }
    }

    #[test]
    fn test_flat_column_scalar() {
        let column = FlatFieldColumn::new("test4", vec![0.0f32; 128], Shape::Scalar);
        assert!(column.is_valid());
        assert_eq!(column.row_count(), 128);
        assert_eq!(column.descriptor().shape, Shape::Scalar);
    }

    #[test]
    fn test_flat_column_vector() {
        let column = FlatFieldColumn::new("test5", vec![0.0f32; 128], Shape::Vector(16));
        assert!(column.is_valid());
        assert_eq!(column.row_count(), 8);
        assert_eq!(column.dimension(), 16);
    }

    #[test]
    fn test_flat_column_uneven_cells_invalid() {
        // 128 cells do not divide into rows of 19
        let column = FlatFieldColumn::new("test6", vec![0i16; 128], Shape::Vector(19));
        assert!(!column.is_valid());
        assert_eq!(column.descriptor().logical_type, LogicalType::Int16);
    }

    #[test]
    fn test_flat_column_variable_length_vector_shape_invalid() {
        let column = FlatFieldColumn::new(
            "names",
            vec!["a".to_string(), "b".to_string()],
            Shape::Vector(2),
        );
        assert!(!column.is_valid());

        let scalar_shaped =
            FlatFieldColumn::new("names", vec!["a".to_string(), "b".to_string()], Shape::Scalar);
        assert!(scalar_shaped.is_valid());
    }

    #[test]
    fn test_flat_blob_column() {
        let column = FlatFieldColumn::new(
            "payload",
            vec![
                Blob::new(vec![1, 2, 3, 4, 5]),
                Blob::new(vec![2, 4, 5, 6, 7, 8, 9, 0]),
            ],
            Shape::Scalar,
        );
        assert!(column.is_valid());
        let flat = column.flatten();
        assert_eq!(flat.byte_sizes(), Some(&[5usize, 8][..]));
    }

    #[test]
    fn test_descriptor_flags() {
        let column = FieldColumn::new("idx", vec![1u64, 2]).nullable().indexed();
        let desc = column.descriptor();
        assert!(desc.nullable);
        assert!(desc.create_index);
    }
}
