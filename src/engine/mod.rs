//! Engine boundary contract and connection lifecycle
//!
//! The marshaling layer talks to a storage/vector-search engine only
//! through the [`Engine`] trait, which mirrors the boundary contract
//! verbatim: open/close, create-table-with-schema, insert, search, free.
//! All calls are synchronous and block the caller; the layer adds no
//! locking of its own and assumes at most one in-flight operation per
//! handle.

mod mem;

pub use mem::{MemEngine, MemEngineOptions, MemEngineStats};

use crate::batch::{InsertBatch, ResultBatch};
use crate::column::ColumnData;
use crate::error::{BridgeError, Result};
use crate::inserter::BatchInserter;
use crate::schema::Schema;
use tracing::{debug, warn};

/// The boundary contract of the external engine.
///
/// Boolean returns mirror the wire contract: the engine reports failure
/// with no further detail, and the marshaling layer surfaces it as an
/// opaque error without retrying.
pub trait Engine {
    /// Open a connection; `None` mirrors the boundary's null handle.
    fn open(uri: &str) -> Option<Self>
    where
        Self: Sized;

    /// Release the handle. Called exactly once, when the connection
    /// closes.
    fn close(&mut self);

    fn create_table_with_schema(&self, table: &str, schema: &Schema) -> bool;

    fn insert(&self, table: &str, batch: &InsertBatch<'_>) -> bool;

    /// Nearest-neighbor search over a vector column. `None` means the
    /// engine failed and no result batch was produced.
    fn search(&self, table: &str, column: &str, query: &[f32], dimension: usize)
        -> Option<ResultBatch>;

    /// Release a result batch the engine allocated. False if the batch is
    /// malformed (e.g. already released).
    fn free_result_batch(&self, batch: &mut ResultBatch) -> bool;
}

/// A live engine handle.
///
/// After [`close`](Connection::close), every operation reports
/// [`NotConnected`](BridgeError::NotConnected); dropping the connection
/// closes it.
pub struct Connection<E: Engine> {
    engine: Option<E>,
}

impl<E: Engine> Connection<E> {
    /// Open the engine at `uri`. A null handle from the boundary maps to
    /// [`NotConnected`](BridgeError::NotConnected).
    pub fn open(uri: &str) -> Result<Self> {
        match E::open(uri) {
            Some(engine) => Ok(Self {
                engine: Some(engine),
            }),
            None => {
                warn!(uri, "engine refused connection");
                Err(BridgeError::NotConnected)
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.engine.is_some()
    }

    pub(crate) fn engine(&self) -> Result<&E> {
        self.engine.as_ref().ok_or(BridgeError::NotConnected)
    }

    /// Close the handle; later operations return `NotConnected`.
    pub fn close(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.close();
        }
    }

    /// Aggregate a fixed set of heterogeneous columns for batch
    /// insertion. The column list must be non-empty.
    pub fn batch_inserter<'a>(
        &'a self,
        columns: &'a [&'a dyn ColumnData],
    ) -> Result<BatchInserter<'a, E>> {
        BatchInserter::new(self, columns)
    }

    /// Run a vector search and take ownership of the result batch.
    pub fn search(&self, table: &str, column: &str, query: &[f32]) -> Result<SearchResults<'_, E>> {
        let engine = self.engine()?;
        if query.is_empty() {
            return Err(BridgeError::InvalidData("empty query vector".into()));
        }
        match engine.search(table, column, query, query.len()) {
            Some(batch) => Ok(SearchResults {
                conn: self,
                batch: Some(batch),
            }),
            None => {
                debug!(table, column, "engine search failed");
                Err(BridgeError::InternalError)
            }
        }
    }
}

impl<E: Engine> Drop for Connection<E> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Scoped owner of one engine-allocated result batch.
///
/// The batch is released through the engine's free operation exactly once,
/// when this handle goes out of scope, on every exit path.
pub struct SearchResults<'c, E: Engine> {
    conn: &'c Connection<E>,
    batch: Option<ResultBatch>,
}

impl<E: Engine> SearchResults<'_, E> {
    /// The result batch. Available for the whole lifetime of the handle.
    pub fn get(&self) -> &ResultBatch {
        self.batch.as_ref().expect("result batch already released")
    }

    pub fn is_valid(&self) -> bool {
        self.batch.is_some()
    }
}

impl<E: Engine> Drop for SearchResults<'_, E> {
    fn drop(&mut self) {
        if let Some(mut batch) = self.batch.take() {
            match self.conn.engine() {
                Ok(engine) => {
                    if !engine.free_result_batch(&mut batch) {
                        debug!("engine failed to free result batch");
                    }
                }
                Err(_) => warn!("connection closed before result batch release"),
            }
        }
    }
}
