use std::fmt;
use std::mem;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::storage::segment::Segment;
use crate::storage::table::Table;
use crate::types::{ColumnId, DataType, PosList, RowId, Value};

/// Read-only view of selected rows of one column of another table.
///
/// The referenced column is always physically stored: `new` refuses a target
/// column that is itself made of reference segments, so resolving a position
/// never takes more than one hop.
#[derive(Clone)]
pub struct ReferenceSegment {
    referenced_table: Arc<Table>,
    referenced_column_id: ColumnId,
    data_type: DataType,
    pos_list: Arc<PosList>,
}

impl ReferenceSegment {
    pub fn new(
        referenced_table: Arc<Table>,
        referenced_column_id: ColumnId,
        pos_list: Arc<PosList>,
    ) -> Result<Self> {
        let data_type = referenced_table.column_type(referenced_column_id)?;
        for chunk in referenced_table.chunks() {
            if chunk.get_segment(referenced_column_id)?.is_reference() {
                return Err(Error::Unsupported(format!(
                    "column {} of the referenced table is not physically stored",
                    referenced_column_id
                )));
            }
        }

        Ok(ReferenceSegment {
            referenced_table,
            referenced_column_id,
            data_type,
            pos_list,
        })
    }

    pub fn get(&self, offset: usize) -> Result<Value> {
        let row_id = self
            .pos_list
            .get(offset)
            .ok_or_else(|| Error::out_of_range("reference segment", offset, self.pos_list.len()))?;
        self.value_at(*row_id)
    }

    /// Fetch the physically stored value at `row_id` in the referenced table
    pub fn value_at(&self, row_id: RowId) -> Result<Value> {
        let chunk = self.referenced_table.get_chunk(row_id.chunk_id)?;
        match chunk.get_segment(self.referenced_column_id)? {
            Segment::Reference(_) => Err(Error::Unsupported(
                "reference segments resolve a single level of indirection".to_string(),
            )),
            segment => segment.get(row_id.chunk_offset as usize),
        }
    }

    pub fn append(&mut self, _value: &Value) -> Result<()> {
        Err(Error::Unsupported("reference segments are immutable".to_string()))
    }

    pub fn pos_list(&self) -> &Arc<PosList> {
        &self.pos_list
    }

    pub fn referenced_table(&self) -> &Arc<Table> {
        &self.referenced_table
    }

    pub fn referenced_column_id(&self) -> ColumnId {
        self.referenced_column_id
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn len(&self) -> usize {
        self.pos_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos_list.is_empty()
    }

    /// Counts the position list only; the referenced table is shared
    pub fn estimate_memory_usage(&self) -> usize {
        self.pos_list.len() * mem::size_of::<RowId>()
    }
}

impl fmt::Debug for ReferenceSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceSegment")
            .field("referenced_column_id", &self.referenced_column_id)
            .field("data_type", &self.data_type)
            .field("rows", &self.pos_list.len())
            .finish()
    }
}
