//! In-memory reference engine
//!
//! A brute-force implementation of the boundary contract, used to exercise
//! the marshaling layer end to end. Tables live in a lock-guarded map;
//! search is an exact L2 scan over one Float32 vector column. This is a
//! reference collaborator, not an ANN index.

use crate::batch::{CellData, InsertBatch, ResultBatch, ResultColumn, DISTANCE_COLUMN};
use crate::distance::euclidean_distance;
use crate::engine::Engine;
use crate::schema::Schema;
use crate::types::{LogicalType, Shape};
use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tracing::debug;

/// Tuning knobs for the reference engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MemEngineOptions {
    /// Maximum rows returned by one search
    pub search_limit: usize,
}

impl Default for MemEngineOptions {
    fn default() -> Self {
        Self { search_limit: 10 }
    }
}

/// Counters exposed for introspection and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemEngineStats {
    pub tables: usize,
    pub searches: u64,
    pub freed_batches: u64,
}

struct MemTable {
    schema: Schema,
    /// One cell buffer per schema column, row-major
    columns: Vec<CellData>,
    rows: usize,
}

/// Brute-force in-memory engine behind the boundary contract.
pub struct MemEngine {
    tables: RwLock<AHashMap<String, MemTable>>,
    options: MemEngineOptions,
    searches: AtomicU64,
    freed_batches: AtomicU64,
}

impl MemEngine {
    pub fn with_options(options: MemEngineOptions) -> Self {
        Self {
            tables: RwLock::new(AHashMap::new()),
            options,
            searches: AtomicU64::new(0),
            freed_batches: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> MemEngineOptions {
        self.options
    }

    pub fn table_exists(&self, table: &str) -> bool {
        self.tables.read().contains_key(table)
    }

    pub fn stats(&self) -> MemEngineStats {
        MemEngineStats {
            tables: self.tables.read().len(),
            searches: self.searches.load(AtomicOrdering::Relaxed),
            freed_batches: self.freed_batches.load(AtomicOrdering::Relaxed),
        }
    }
}

impl Default for MemEngine {
    fn default() -> Self {
        Self::with_options(MemEngineOptions::default())
    }
}

impl Engine for MemEngine {
    fn open(uri: &str) -> Option<Self> {
        if uri.is_empty() {
            return None;
        }
        Some(Self::default())
    }

    fn close(&mut self) {
        self.tables.write().clear();
    }

    fn create_table_with_schema(&self, table: &str, schema: &Schema) -> bool {
        let mut tables = self.tables.write();
        if tables.contains_key(table) {
            debug!(table, "table already exists");
            return false;
        }
        let mut columns = Vec::with_capacity(schema.column_count());
        for descriptor in &schema.columns {
            match CellData::empty_of(descriptor.logical_type) {
                Some(cells) => columns.push(cells),
                // Float16 is a wire tag this engine cannot materialize
                None => {
                    debug!(table, column = %descriptor.name, "unsupported cell type");
                    return false;
                }
            }
        }
        tables.insert(
            table.to_string(),
            MemTable {
                schema: schema.clone(),
                columns,
                rows: 0,
            },
        );
        true
    }

    fn insert(&self, table: &str, batch: &InsertBatch<'_>) -> bool {
        let mut tables = self.tables.write();
        let Some(stored) = tables.get_mut(table) else {
            debug!(table, "insert into unknown table");
            return false;
        };
        if batch.column_count() != stored.schema.column_count() {
            return false;
        }

        // Resolve and type-check every column before mutating anything, so
        // a rejected batch leaves the table untouched.
        let mut new_rows = 0usize;
        let mut targets = Vec::with_capacity(batch.column_count());
        for (position, column) in batch.columns().iter().enumerate() {
            let descriptor = column.descriptor();
            let Some(index) = stored
                .schema
                .columns
                .iter()
                .position(|c| c.name == descriptor.name)
            else {
                debug!(table, column = %descriptor.name, "column not in schema");
                return false;
            };
            let declared = &stored.schema.columns[index];
            if declared.logical_type != descriptor.logical_type || declared.shape != descriptor.shape
            {
                return false;
            }
            if position == 0 {
                new_rows = column.row_count();
            } else if column.row_count() != new_rows {
                return false;
            }
            targets.push(index);
        }

        for (column, &index) in batch.columns().iter().zip(&targets) {
            if !stored.columns[index].append_flat(column.cells()) {
                return false;
            }
        }
        stored.rows += new_rows;
        true
    }

    fn search(
        &self,
        table: &str,
        column: &str,
        query: &[f32],
        dimension: usize,
    ) -> Option<ResultBatch> {
        let tables = self.tables.read();
        let stored = tables.get(table)?;
        let index = stored.schema.columns.iter().position(|c| c.name == column)?;
        let descriptor = &stored.schema.columns[index];
        if descriptor.logical_type != LogicalType::Float32
            || descriptor.shape != Shape::Vector(dimension)
        {
            debug!(table, column, "not a Float32 vector column of that dimension");
            return None;
        }
        let CellData::Float32(cells) = &stored.columns[index] else {
            return None;
        };
        self.searches.fetch_add(1, AtomicOrdering::Relaxed);

        let mut scored: Vec<(usize, f32)> = (0..stored.rows)
            .map(|row| {
                let vector = &cells[row * dimension..(row + 1) * dimension];
                (row, euclidean_distance(vector, query))
            })
            .collect();
        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        scored.truncate(self.options.search_limit);

        let picked: Vec<usize> = scored.iter().map(|(row, _)| *row).collect();
        let distances: Vec<f32> = scored.iter().map(|(_, d)| *d).collect();

        let mut columns: Vec<ResultColumn> = stored
            .schema
            .columns
            .iter()
            .zip(&stored.columns)
            .map(|(descriptor, cells)| {
                ResultColumn::new(
                    descriptor.name.clone(),
                    descriptor.logical_type,
                    descriptor.shape,
                    picked.len(),
                    cells.take_rows(&picked, descriptor.dimension()),
                )
            })
            .collect();
        columns.push(ResultColumn::new(
            DISTANCE_COLUMN,
            LogicalType::Float32,
            Shape::Scalar,
            distances.len(),
            CellData::Float32(distances),
        ));
        Some(ResultBatch::new(columns))
    }

    fn free_result_batch(&self, batch: &mut ResultBatch) -> bool {
        if batch.column_count() == 0 {
            return false;
        }
        drop(batch.take_columns());
        self.freed_batches.fetch_add(1, AtomicOrdering::Relaxed);
        true
    }
}
