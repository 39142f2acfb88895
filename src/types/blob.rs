//! Binary blob cell type

use serde::{Deserialize, Serialize};

/// Owned binary payload for blob columns.
///
/// Each row of a blob column carries an independently sized byte buffer;
/// the flattened boundary view keeps a parallel byte-length array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Blob {
    bytes: Vec<u8>,
}

impl Blob {
    /// Create a blob from raw bytes
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Borrow the underlying bytes (zero-copy)
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte length of the payload
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the blob and take its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl From<Vec<u8>> for Blob {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}
