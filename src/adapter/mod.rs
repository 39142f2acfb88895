//! Record↔column adaption
//!
//! Converts between array-of-records and the struct-of-arrays layout the
//! boundary consumes, in both directions: transposing records into typed
//! columns for insertion, and hydrating result batches back into records
//! plus the derived distance column.

mod binding;

pub use binding::{gather_field, hydrate_field, ColumnBinding, RecordBinding};

use crate::batch::{CellData, ResultBatch, DISTANCE_COLUMN};
use crate::column::ColumnData;
use crate::engine::{Connection, Engine, SearchResults};
use crate::error::{BridgeError, Result};
use tracing::debug;

/// Query hits hydrated into records, with one distance per result row.
#[derive(Debug, Clone, Default)]
pub struct RecordHits<R> {
    pub records: Vec<R>,
    pub distances: Vec<f32>,
}

/// Binds one record type to one table through its static
/// [`RecordBinding`].
///
/// Stateless between calls apart from the two flags controlling what
/// [`run`](TableSchema::run) does.
pub struct TableSchema<'c, R: 'static, E: Engine> {
    conn: &'c Connection<E>,
    binding: &'static RecordBinding<R>,
    create_table: bool,
    create_data: bool,
}

impl<'c, R: 'static, E: Engine> TableSchema<'c, R, E> {
    pub fn new(conn: &'c Connection<E>, binding: &'static RecordBinding<R>) -> Self {
        Self {
            conn,
            binding,
            create_table: false,
            create_data: true,
        }
    }

    /// Whether `run` creates the table before inserting (default false).
    pub fn create_table(mut self, create_table: bool) -> Self {
        self.create_table = create_table;
        self
    }

    /// Whether `run` inserts the records (default true).
    pub fn create_data(mut self, create_data: bool) -> Self {
        self.create_data = create_data;
        self
    }

    pub fn table_name(&self) -> &'static str {
        self.binding.table
    }

    pub fn connection(&self) -> &'c Connection<E> {
        self.conn
    }

    /// Transpose records into columns and drive the batch inserter.
    ///
    /// When table creation is requested and fails, the run aborts without
    /// attempting the insert.
    pub fn run(&self, records: &[R]) -> Result<()> {
        if !self.create_table && !self.create_data {
            return Err(BridgeError::InvalidOperation(
                "neither table creation nor data insertion requested".into(),
            ));
        }
        let columns: Vec<Box<dyn ColumnData>> = self
            .binding
            .columns
            .iter()
            .map(|binding| (binding.gather)(binding.name, records))
            .collect();
        let refs: Vec<&dyn ColumnData> = columns.iter().map(|c| c.as_ref()).collect();
        let inserter = self.conn.batch_inserter(&refs)?;
        if self.create_table {
            inserter.create_table(self.binding.table)?;
        }
        if self.create_data {
            inserter.insert(self.binding.table)?;
        }
        Ok(())
    }

    /// Vector query passthrough; the caller interprets the raw batch.
    pub fn search(&self, column: &str, embedding: &[f32]) -> Result<SearchResults<'c, E>> {
        self.conn.search(self.binding.table, column, embedding)
    }

    /// Vector query plus hydration of every bound column into records.
    ///
    /// A bound column absent from the result set leaves its field at the
    /// default — schemas may project a subset of columns. The reserved
    /// `_distance` column is mandatory; its absence is
    /// [`FieldNotFound`](BridgeError::FieldNotFound).
    pub fn query(&self, column: &str, embedding: &[f32]) -> Result<RecordHits<R>>
    where
        R: Default + Clone,
    {
        let results = self.search(column, embedding)?;
        let batch = results.get();
        let records = self.hydrate_records(batch)?;
        let distances = extract_distances(batch)?;
        Ok(RecordHits { records, distances })
    }

    fn hydrate_records(&self, batch: &ResultBatch) -> Result<Vec<R>>
    where
        R: Default + Clone,
    {
        let mut records: Vec<R> = Vec::new();
        for binding in self.binding.columns {
            let Some(column) = batch.column(binding.name) else {
                debug!(
                    column = binding.name,
                    "column absent from result set, field left at default"
                );
                continue;
            };
            if records.is_empty() {
                records = vec![R::default(); column.row_count()];
            }
            for (row, record) in records.iter_mut().enumerate() {
                (binding.hydrate)(record, column, row)?;
            }
        }
        Ok(records)
    }
}

/// Pull the reserved `_distance` column out of a result batch.
pub fn extract_distances(batch: &ResultBatch) -> Result<Vec<f32>> {
    let column = batch
        .column(DISTANCE_COLUMN)
        .ok_or_else(|| BridgeError::FieldNotFound(DISTANCE_COLUMN.into()))?;
    match column.cells() {
        CellData::Float32(values) => Ok(values.clone()),
        _ => Err(BridgeError::UnsupportedDataType(format!(
            "distance column holds {:?} cells",
            column.logical_type()
        ))),
    }
}
