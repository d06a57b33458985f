//! In-memory, chunked columnar storage with dictionary compression and a
//! table scan operator.

pub mod config;
pub mod error;
pub mod executor;
pub mod storage;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use executor::{GetTable, Operator, ScanType, TableScan, TableWrapper};
pub use storage::{
    AnyDictionarySegment, AnyValueSegment, AttributeVector, Catalog, Chunk, DictionarySegment,
    ReferenceSegment, Segment, Table, ValueSegment,
};
pub use types::{
    ChunkId, ChunkOffset, ColumnId, ColumnType, DataType, PosList, RowId, Value, ValueId,
    INVALID_VALUE_ID,
};
