use crate::error::{Error, Result};
use crate::storage::segment::Segment;
use crate::types::{ColumnId, DataType, Value};

/// A row group: one segment per column, all of the same length
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    segments: Vec<Segment>,
}

impl Chunk {
    pub fn new() -> Self {
        Chunk {
            segments: Vec::new(),
        }
    }

    /// An empty chunk with one value segment per column type
    pub fn with_schema(column_types: &[DataType]) -> Self {
        Chunk {
            segments: column_types.iter().map(|&t| Segment::empty(t)).collect(),
        }
    }

    pub fn add_segment(&mut self, segment: Segment) {
        debug_assert!(
            self.segments.is_empty() || segment.len() == self.len(),
            "segment length {} does not match chunk length {}",
            segment.len(),
            self.len()
        );
        self.segments.push(segment);
    }

    /// Append one value per column, in column order. Either every column
    /// receives its value or the chunk is left as it was.
    pub fn append(&mut self, row: &[Value]) -> Result<()> {
        if row.len() != self.column_count() {
            return Err(Error::SchemaViolation(format!(
                "row has {} values but chunk has {} columns",
                row.len(),
                self.column_count()
            )));
        }

        let len = self.len();
        for (column, value) in row.iter().enumerate() {
            if let Err(e) = self.segments[column].append(value) {
                for segment in &mut self.segments[..column] {
                    segment.truncate(len);
                }
                return Err(e);
            }
        }
        Ok(())
    }

    pub fn get_segment(&self, column_id: ColumnId) -> Result<&Segment> {
        self.segments
            .get(column_id as usize)
            .ok_or_else(|| Error::out_of_range("chunk columns", column_id as usize, self.segments.len()))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn column_count(&self) -> usize {
        self.segments.len()
    }

    pub fn len(&self) -> usize {
        self.segments.first().map_or(0, Segment::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.segments.iter().map(Segment::estimate_memory_usage).sum()
    }
}
