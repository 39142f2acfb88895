//! Multi-column batch insertion
//!
//! A [`BatchInserter`] aggregates a fixed set of heterogeneous columns and
//! drives the two boundary operations that consume them. All structural
//! validation happens locally: an invalid batch never reaches the engine,
//! and a batch either goes across whole or not at all — atomicity of the
//! insert itself belongs to the engine.

use crate::batch::InsertBatch;
use crate::column::ColumnData;
use crate::engine::{Connection, Engine};
use crate::error::{BridgeError, Result};
use crate::schema::Schema;
use tracing::debug;

/// Coordinates table creation and insertion for one batch of columns.
///
/// Arity is fixed at construction; so is the validity verdict (every
/// column structurally valid, and all row counts in agreement).
pub struct BatchInserter<'a, E: Engine> {
    conn: &'a Connection<E>,
    columns: &'a [&'a dyn ColumnData],
    valid: bool,
}

impl<'a, E: Engine> BatchInserter<'a, E> {
    pub(crate) fn new(conn: &'a Connection<E>, columns: &'a [&'a dyn ColumnData]) -> Result<Self> {
        if columns.is_empty() {
            return Err(BridgeError::InvalidArgument(
                "batch needs at least one column".into(),
            ));
        }
        let mut valid = columns.iter().all(|c| c.is_valid());
        if valid {
            let rows = columns[0].row_count();
            valid = columns.iter().all(|c| c.row_count() == rows);
        }
        Ok(Self {
            conn,
            columns,
            valid,
        })
    }

    /// Whether every column passed validation and row counts agree.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Create the table from the columns' schema descriptors.
    pub fn create_table(&self, table: &str) -> Result<()> {
        let engine = self.conn.engine()?;
        if !self.valid {
            return Err(BridgeError::InvalidData(
                "batch columns failed validation".into(),
            ));
        }
        let schema = Schema::from_columns(self.columns);
        if engine.create_table_with_schema(table, &schema) {
            Ok(())
        } else {
            debug!(table, "engine rejected create_table_with_schema");
            Err(BridgeError::InternalError)
        }
    }

    /// Flatten every column and submit the whole batch to the engine.
    pub fn insert(&self, table: &str) -> Result<()> {
        let engine = self.conn.engine()?;
        if !self.valid {
            return Err(BridgeError::InvalidData(
                "batch columns failed validation".into(),
            ));
        }
        let flattened = self.columns.iter().map(|c| c.flatten()).collect();
        let batch = InsertBatch::new(flattened);
        if engine.insert(table, &batch) {
            Ok(())
        } else {
            debug!(table, "engine rejected insert");
            Err(BridgeError::InsertFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::ResultBatch;
    use crate::column::FieldColumn;
    use crate::engine::MemEngine;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts boundary calls so tests can assert fail-fast behavior.
    struct ProbeEngine {
        calls: &'static AtomicUsize,
    }

    static PROBE_CALLS: AtomicUsize = AtomicUsize::new(0);

    impl Engine for ProbeEngine {
        fn open(_uri: &str) -> Option<Self> {
            Some(Self {
                calls: &PROBE_CALLS,
            })
        }

        fn close(&mut self) {}

        fn create_table_with_schema(&self, _table: &str, _schema: &Schema) -> bool {
            self.calls.fetch_add(1, Ordering::Relaxed);
            true
        }

        fn insert(&self, _table: &str, _batch: &InsertBatch<'_>) -> bool {
            self.calls.fetch_add(1, Ordering::Relaxed);
            true
        }

        fn search(
            &self,
            _table: &str,
            _column: &str,
            _query: &[f32],
            _dimension: usize,
        ) -> Option<ResultBatch> {
            None
        }

        fn free_result_batch(&self, _batch: &mut ResultBatch) -> bool {
            true
        }
    }

    #[test]
    fn test_invalid_column_fails_before_boundary() {
        PROBE_CALLS.store(0, Ordering::Relaxed);
        let conn = Connection::<ProbeEngine>::open("probe://").unwrap();

        let ragged = FieldColumn::new("embedding", vec![vec![1.0f32, 2.0, 3.0], vec![4.0]]);
        let ids = FieldColumn::new("idx", vec![1i32, 2]);
        let columns: [&dyn ColumnData; 2] = [&ids, &ragged];
        let inserter = conn.batch_inserter(&columns).unwrap();

        assert!(!inserter.is_valid());
        assert!(matches!(
            inserter.create_table("t"),
            Err(BridgeError::InvalidData(_))
        ));
        assert!(matches!(inserter.insert("t"), Err(BridgeError::InvalidData(_))));
        assert_eq!(PROBE_CALLS.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_row_count_disagreement_is_invalid() {
        let conn = Connection::<MemEngine>::open("mem://rows").unwrap();
        let ids = FieldColumn::new("idx", vec![1i32, 2, 3]);
        let names = FieldColumn::new("name", vec!["a".to_string(), "b".to_string()]);
        let columns: [&dyn ColumnData; 2] = [&ids, &names];
        let inserter = conn.batch_inserter(&columns).unwrap();
        assert!(!inserter.is_valid());
    }

    #[test]
    fn test_empty_column_list_rejected() {
        let conn = Connection::<MemEngine>::open("mem://arity").unwrap();
        let columns: [&dyn ColumnData; 0] = [];
        assert!(matches!(
            conn.batch_inserter(&columns),
            Err(BridgeError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_hundred_row_batch_finds_marked_embedding() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let mut idx = Vec::new();
        let mut embeddings = Vec::new();
        for i in 0..100 {
            idx.push(i as i32);
            let mut embedding: Vec<f32> = if i == 44 {
                vec![1.0; 768]
            } else {
                (0..768).map(|_| rng.gen::<f32>()).collect()
            };
            let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            for value in &mut embedding {
                *value /= norm;
            }
            embeddings.push(embedding);
        }
        let comments: Vec<String> = (0..100)
            .map(|i| format!("Today you are so beautiful! I repeat for {} times!", i))
            .collect();

        let idx_data = FieldColumn::new("idx", idx);
        let embedding_data = FieldColumn::new("embedding", embeddings.clone());
        let comment_data = FieldColumn::new("comment", comments);

        let conn = Connection::<MemEngine>::open("mem://batch100").unwrap();
        let columns: [&dyn ColumnData; 3] = [&idx_data, &embedding_data, &comment_data];
        let inserter = conn.batch_inserter(&columns).unwrap();
        inserter.create_table("test_table").unwrap();
        inserter.insert("test_table").unwrap();

        let results = conn
            .search("test_table", "embedding", &embeddings[44])
            .unwrap();
        assert!(results.is_valid());
        let batch = results.get();

        let ids = batch.column("idx").unwrap();
        match ids.cells() {
            crate::batch::CellData::Int32(values) => assert_eq!(values[0], 44),
            other => panic!("unexpected cells: {:?}", other),
        }
        match batch.column("_distance").unwrap().cells() {
            crate::batch::CellData::Float32(values) => assert!(values[0].abs() < 1e-5),
            other => panic!("unexpected cells: {:?}", other),
        }
    }

    #[test]
    fn test_create_and_insert_through_reference_engine() {
        let conn = Connection::<MemEngine>::open("mem://inserter").unwrap();
        let ids = FieldColumn::new("idx", vec![0i32, 1]);
        let embedding = FieldColumn::new("embedding", vec![vec![0.0f32, 1.0], vec![1.0, 0.0]]);
        let comments = FieldColumn::new(
            "comment",
            vec!["first".to_string(), "second".to_string()],
        );
        let columns: [&dyn ColumnData; 3] = [&ids, &embedding, &comments];
        let inserter = conn.batch_inserter(&columns).unwrap();

        assert!(inserter.is_valid());
        inserter.create_table("notes").unwrap();
        inserter.insert("notes").unwrap();

        // creating the same table again is an engine-side failure
        assert!(matches!(
            inserter.create_table("notes"),
            Err(BridgeError::InternalError)
        ));

        let results = conn.search("notes", "embedding", &[1.0, 0.0]).unwrap();
        let top = results.get().column("idx").unwrap();
        match top.cells() {
            crate::batch::CellData::Int32(values) => assert_eq!(values[0], 1),
            other => panic!("unexpected cells: {:?}", other),
        }
    }
}
