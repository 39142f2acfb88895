//! Static record-to-column binding tables
//!
//! A [`RecordBinding`] is a manually built reflection table: an ordered,
//! immutable list of (column name, gather, hydrate) entries for one record
//! type, defined once and shared by every
//! [`TableSchema`](crate::adapter::TableSchema) over that type. The
//! [`record_binding!`](crate::record_binding) macro writes the entries;
//! a field whose type has no column mapping fails to compile.

use crate::batch::ResultColumn;
use crate::column::{ColumnData, Element, FieldColumn};
use crate::error::Result;

/// One bound column: its table column name plus the two transposition
/// functions for the record type.
pub struct ColumnBinding<R: 'static> {
    /// Column name in the table
    pub name: &'static str,
    /// Gather every record's field value into one typed column
    pub gather: fn(&'static str, &[R]) -> Box<dyn ColumnData>,
    /// Write one result row's cell back into a record's field
    pub hydrate: fn(&mut R, &ResultColumn, usize) -> Result<()>,
}

/// Ordered, immutable binding of a record type's members to named columns.
pub struct RecordBinding<R: 'static> {
    /// Table this record type maps to
    pub table: &'static str,
    /// Bindings in column order
    pub columns: &'static [ColumnBinding<R>],
}

/// Build a [`FieldColumn`] from gathered field values.
///
/// Macro support; shape and logical type resolve from the field type.
pub fn gather_field<T: Element>(name: &'static str, values: Vec<T>) -> Box<dyn ColumnData> {
    Box::new(FieldColumn::new(name, values))
}

/// Copy one result cell into a record field.
///
/// Macro support; scalar cells copy by value, vector cells size the field
/// to the result dimension, blob cells size it from the per-row byte
/// length.
pub fn hydrate_field<T: Element>(slot: &mut T, column: &ResultColumn, row: usize) -> Result<()> {
    *slot = T::read_cell(column, row)?;
    Ok(())
}

/// Define the static [`RecordBinding`] for a record type.
///
/// ```
/// use vecbridge::record_binding;
///
/// #[derive(Debug, Default, Clone)]
/// struct Doc {
///     id: i32,
///     embedding: Vec<f32>,
///     content: String,
/// }
///
/// record_binding! {
///     static DOC_BINDING: Doc => "documents" {
///         "id" => id,
///         "embedding" => embedding,
///         "content" => content,
///     }
/// }
///
/// assert_eq!(DOC_BINDING.table, "documents");
/// assert_eq!(DOC_BINDING.columns.len(), 3);
/// ```
#[macro_export]
macro_rules! record_binding {
    (
        $vis:vis static $name:ident : $record:ty => $table:literal {
            $($column:literal => $field:ident),+ $(,)?
        }
    ) => {
        $vis static $name: $crate::adapter::RecordBinding<$record> =
            $crate::adapter::RecordBinding {
                table: $table,
                columns: &[
                    $(
                        $crate::adapter::ColumnBinding {
                            name: $column,
                            gather: |name, records| {
                                $crate::adapter::gather_field(
                                    name,
                                    records.iter().map(|r| r.$field.clone()).collect(),
                                )
                            },
                            hydrate: |record, column, row| {
                                $crate::adapter::hydrate_field(&mut record.$field, column, row)
                            },
                        },
                    )+
                ],
            };
    };
}
