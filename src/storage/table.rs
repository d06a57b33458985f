use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::chunk::Chunk;
use crate::storage::reference_segment::ReferenceSegment;
use crate::storage::segment::Segment;
use crate::types::{ChunkId, ChunkOffset, ColumnId, DataType, Value};

/// Ordered chunks sharing one schema.
///
/// Rows are appended to the last chunk until it holds `max_chunk_size` rows,
/// then a new chunk is started. The chunk list sits behind a lock so that
/// `compress_chunk` can swap a chunk while other threads read the table; every
/// other mutation requires `&mut self`.
#[derive(Debug)]
pub struct Table {
    column_names: Vec<String>,
    column_types: Vec<DataType>,
    chunks: RwLock<Vec<Arc<Chunk>>>,
    max_chunk_size: usize,
    parallel_compression: bool,
}

impl Table {
    /// A table without columns holding one empty chunk. The capacity is
    /// clamped to `1..=ChunkOffset::MAX`.
    pub fn new(max_chunk_size: usize) -> Self {
        Self::with_config(&Config::default().with_max_chunk_size(max_chunk_size))
    }

    pub fn with_config(config: &Config) -> Self {
        Table {
            column_names: Vec::new(),
            column_types: Vec::new(),
            chunks: RwLock::new(vec![Arc::new(Chunk::new())]),
            max_chunk_size: config.max_chunk_size.clamp(1, ChunkOffset::MAX as usize),
            parallel_compression: config.parallel_compression,
        }
    }

    /// Build an operator result: a single chunk holding `segments`, one per column
    pub(crate) fn from_reference_segments(
        schema: Vec<(String, DataType)>,
        segments: Vec<ReferenceSegment>,
    ) -> Self {
        let mut chunk = Chunk::new();
        for segment in segments {
            chunk.add_segment(Segment::Reference(segment));
        }
        let (column_names, column_types) = schema.into_iter().unzip();

        Table {
            column_names,
            column_types,
            max_chunk_size: chunk.len().max(1),
            chunks: RwLock::new(vec![Arc::new(chunk)]),
            parallel_compression: Config::default().parallel_compression,
        }
    }

    pub fn add_column(&mut self, name: &str, data_type: DataType) -> Result<()> {
        if self.row_count() > 0 {
            return Err(Error::SchemaViolation(format!(
                "cannot add column {} to a table that already holds rows",
                name
            )));
        }
        if self.column_count() > ColumnId::MAX as usize {
            return Err(Error::SchemaViolation(format!(
                "cannot add column {}, table already has {} columns",
                name,
                self.column_count()
            )));
        }

        self.column_names.push(name.to_string());
        self.column_types.push(data_type);
        for chunk in self.chunks.get_mut().iter_mut() {
            Arc::make_mut(chunk).add_segment(Segment::empty(data_type));
        }
        Ok(())
    }

    pub fn append(&mut self, row: &[Value]) -> Result<()> {
        if row.len() != self.column_count() {
            return Err(Error::SchemaViolation(format!(
                "row has {} values but table has {} columns",
                row.len(),
                self.column_count()
            )));
        }

        let max_chunk_size = self.max_chunk_size;
        let column_types = &self.column_types;
        let chunks = self.chunks.get_mut();

        if let Some(last) = chunks.last_mut().filter(|last| last.len() < max_chunk_size) {
            return Arc::make_mut(last).append(row);
        }

        let mut chunk = Chunk::with_schema(column_types);
        chunk.append(row)?;
        chunks.push(Arc::new(chunk));
        debug!(chunk_id = chunks.len() - 1, max_chunk_size, "started new chunk");
        Ok(())
    }

    /// Start an empty chunk even if the last one still has room
    pub fn create_new_chunk(&mut self) {
        let chunk = Chunk::with_schema(&self.column_types);
        self.chunks.get_mut().push(Arc::new(chunk));
    }

    pub fn column_count(&self) -> usize {
        self.column_names.len()
    }

    pub fn row_count(&self) -> usize {
        self.chunks.read().iter().map(|chunk| chunk.len()).sum()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn column_id_by_name(&self, name: &str) -> Result<ColumnId> {
        self.column_names
            .iter()
            .position(|column| column == name)
            .map(|id| id as ColumnId)
            .ok_or_else(|| Error::NotFound(format!("column {}", name)))
    }

    pub fn max_chunk_size(&self) -> usize {
        self.max_chunk_size
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_name(&self, column_id: ColumnId) -> Result<&str> {
        self.column_names
            .get(column_id as usize)
            .map(String::as_str)
            .ok_or_else(|| Error::out_of_range("table columns", column_id as usize, self.column_count()))
    }

    pub fn column_type(&self, column_id: ColumnId) -> Result<DataType> {
        self.column_types
            .get(column_id as usize)
            .copied()
            .ok_or_else(|| Error::out_of_range("table columns", column_id as usize, self.column_count()))
    }

    pub fn column_types(&self) -> &[DataType] {
        &self.column_types
    }

    /// (name, type) pairs in column order
    pub fn schema(&self) -> Vec<(String, DataType)> {
        self.column_names
            .iter()
            .cloned()
            .zip(self.column_types.iter().copied())
            .collect()
    }

    pub fn get_chunk(&self, chunk_id: ChunkId) -> Result<Arc<Chunk>> {
        let chunks = self.chunks.read();
        chunks
            .get(chunk_id as usize)
            .cloned()
            .ok_or_else(|| Error::out_of_range("table chunks", chunk_id as usize, chunks.len()))
    }

    /// Snapshot of the current chunk list
    pub fn chunks(&self) -> Vec<Arc<Chunk>> {
        self.chunks.read().clone()
    }

    /// Replace the chunk at `chunk_id` with a dictionary-encoded copy.
    ///
    /// Columns are encoded independently (on the rayon pool when parallel
    /// compression is enabled). The write lock is held only for the final swap.
    pub fn compress_chunk(&self, chunk_id: ChunkId) -> Result<()> {
        let source = self.get_chunk(chunk_id)?;

        let compress = |(segment, data_type): (&Segment, &DataType)| segment.compress(*data_type);
        let segments = if self.parallel_compression {
            source
                .segments()
                .par_iter()
                .zip(self.column_types.par_iter())
                .map(compress)
                .collect::<Result<Vec<_>>>()?
        } else {
            source
                .segments()
                .iter()
                .zip(self.column_types.iter())
                .map(compress)
                .collect::<Result<Vec<_>>>()?
        };

        let mut compressed = Chunk::new();
        for segment in segments {
            compressed.add_segment(segment);
        }
        let bytes_before = source.estimate_memory_usage();
        let bytes_after = compressed.estimate_memory_usage();

        {
            let mut chunks = self.chunks.write();
            chunks[chunk_id as usize] = Arc::new(compressed);
        }

        info!(
            chunk_id,
            columns = self.column_count(),
            rows = source.len(),
            bytes_before,
            bytes_after,
            "compressed chunk"
        );
        Ok(())
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.chunks
            .read()
            .iter()
            .map(|chunk| chunk.estimate_memory_usage())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Operator, ScanType, TableScan};
    use crate::storage::segment::AnyDictionarySegment;

    fn table() -> Table {
        let mut t = Table::new(2);
        t.add_column("col_1", DataType::Int).unwrap();
        t.add_column("col_2", DataType::String).unwrap();
        t
    }

    fn fill(t: &mut Table) {
        t.append(&[4.into(), "Hello,".into()]).unwrap();
        t.append(&[6.into(), "world".into()]).unwrap();
        t.append(&[3.into(), "!".into()]).unwrap();
    }

    #[test]
    fn test_chunk_count() {
        let mut t = table();
        assert_eq!(t.chunk_count(), 1);
        fill(&mut t);
        assert_eq!(t.chunk_count(), 2);
        assert_eq!(t.get_chunk(0).unwrap().len(), 2);
        assert_eq!(t.get_chunk(1).unwrap().len(), 1);
    }

    #[test]
    fn test_get_chunk() {
        let mut t = table();
        t.get_chunk(0).unwrap();
        assert!(matches!(t.get_chunk(1), Err(Error::OutOfRange { .. })));
        fill(&mut t);
        t.get_chunk(1).unwrap();
    }

    #[test]
    fn test_column_count() {
        assert_eq!(table().column_count(), 2);
    }

    #[test]
    fn test_row_count() {
        let mut t = table();
        assert_eq!(t.row_count(), 0);
        fill(&mut t);
        assert_eq!(t.row_count(), 3);
    }

    #[test]
    fn test_column_names_and_types() {
        let t = table();
        assert_eq!(t.column_name(0).unwrap(), "col_1");
        assert_eq!(t.column_name(1).unwrap(), "col_2");
        assert!(t.column_name(2).is_err());
        assert_eq!(t.column_names(), &["col_1", "col_2"]);
        assert_eq!(t.column_type(0).unwrap(), DataType::Int);
        assert_eq!(t.column_type(1).unwrap(), DataType::String);
        assert!(t.column_type(2).is_err());
    }

    #[test]
    fn test_column_id_by_name() {
        let t = table();
        assert_eq!(t.column_id_by_name("col_2").unwrap(), 1);
        assert!(matches!(t.column_id_by_name("no_column_name"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_max_chunk_size() {
        assert_eq!(table().max_chunk_size(), 2);
    }

    #[test]
    fn test_add_column_after_rows() {
        let mut t = table();
        fill(&mut t);
        assert!(matches!(t.add_column("col_3", DataType::Double), Err(Error::SchemaViolation(_))));
        assert_eq!(t.column_count(), 2);
    }

    #[test]
    fn test_append_wrong_width() {
        let mut t = table();
        assert!(matches!(t.append(&[1.into()]), Err(Error::SchemaViolation(_))));
        assert_eq!(t.row_count(), 0);
    }

    #[test]
    fn test_failed_append_into_full_chunk_adds_no_chunk() {
        let mut t = table();
        t.append(&[4.into(), "Hello,".into()]).unwrap();
        t.append(&[6.into(), "world".into()]).unwrap();
        assert!(t.append(&["x".into(), "!".into()]).is_err());
        assert_eq!(t.chunk_count(), 1);
    }

    #[test]
    fn test_create_new_chunk() {
        let mut t = table();
        t.create_new_chunk();
        assert_eq!(t.chunk_count(), 2);
        assert_eq!(t.get_chunk(1).unwrap().column_count(), 2);
    }

    #[test]
    fn test_move() {
        let t = table();
        let t2 = t;
        assert_eq!(t2.chunk_count(), 1);
    }

    #[test]
    fn test_compress_chunk() {
        let mut t = table();
        t.append(&[4.into(), "Hello,".into()]).unwrap();
        t.append(&[6.into(), "world".into()]).unwrap();
        assert_eq!(t.chunk_count(), 1);

        t.compress_chunk(0).unwrap();

        assert_eq!(t.chunk_count(), 1);
        let chunk = t.get_chunk(0).unwrap();
        assert!(matches!(chunk.get_segment(0).unwrap(), Segment::Dictionary(AnyDictionarySegment::Int(_))));
        assert_eq!(chunk.get_segment(0).unwrap().get(0).unwrap(), Value::Int(4));
        assert_eq!(chunk.get_segment(1).unwrap().get(0).unwrap(), Value::from("Hello,"));
    }

    #[test]
    fn test_compress_keeps_earlier_snapshot() {
        let mut t = table();
        fill(&mut t);
        let before = t.get_chunk(0).unwrap();
        t.compress_chunk(0).unwrap();
        assert!(matches!(before.get_segment(0).unwrap(), Segment::Value(_)));
        assert!(matches!(t.get_chunk(0).unwrap().get_segment(0).unwrap(), Segment::Dictionary(_)));
    }

    #[test]
    fn test_compress_unknown_chunk() {
        assert!(matches!(table().compress_chunk(3), Err(Error::OutOfRange { .. })));
    }

    #[test]
    fn test_column_limit() {
        let mut t = Table::new(2);
        for _ in 0..=ColumnId::MAX as usize {
            t.add_column("c", DataType::Int).unwrap();
        }
        assert_eq!(t.column_count(), ColumnId::MAX as usize + 1);
        assert!(matches!(t.add_column("one_too_many", DataType::Int), Err(Error::SchemaViolation(_))));
        assert_eq!(t.column_count(), ColumnId::MAX as usize + 1);
    }

    #[test]
    fn test_capacity_clamped_to_offset_range() {
        assert_eq!(Table::new(0).max_chunk_size(), 1);
        assert_eq!(Table::new(usize::MAX).max_chunk_size(), ChunkOffset::MAX as usize);
    }

    #[test]
    fn test_compress_while_reading_from_other_threads() {
        let mut t = Table::new(4);
        t.add_column("id", DataType::Int).unwrap();
        t.add_column("name", DataType::String).unwrap();
        for i in 0..64 {
            t.append(&[(i % 7).into(), format!("name_{}", i % 5).into()]).unwrap();
        }
        let table = Arc::new(t);
        let scan = || {
            TableScan::new(table.clone(), 0, ScanType::LessThan, 3)
                .execute()
                .unwrap()
                .chunks()[0]
                .get_segment(0)
                .map(|segment| match segment {
                    Segment::Reference(r) => r.pos_list().to_vec(),
                    other => panic!("expected reference segment, got {:?}", other),
                })
                .unwrap()
        };
        let expected = scan();
        let chunk_count = table.chunk_count() as ChunkId;

        rayon::scope(|s| {
            s.spawn(|_| {
                for chunk_id in 0..chunk_count {
                    table.compress_chunk(chunk_id).unwrap();
                }
            });
            for _ in 0..3 {
                s.spawn(|_| {
                    for _ in 0..50 {
                        assert_eq!(table.row_count(), 64);
                        for chunk_id in 0..chunk_count {
                            let chunk = table.get_chunk(chunk_id).unwrap();
                            let encoded = chunk
                                .segments()
                                .iter()
                                .filter(|segment| matches!(segment, Segment::Dictionary(_)))
                                .count();
                            assert!(encoded == 0 || encoded == chunk.column_count());
                            assert_eq!(chunk.len(), 4);
                        }
                        assert_eq!(scan(), expected);
                    }
                });
            }
        });

        for chunk in table.chunks() {
            assert!(chunk.segments().iter().all(|segment| matches!(segment, Segment::Dictionary(_))));
        }
        assert_eq!(scan(), expected);
    }

    #[test]
    fn test_sequential_compression_matches_parallel() {
        let config = Config::default().with_max_chunk_size(4);
        let mut parallel = Table::with_config(&config);
        let mut sequential = Table::with_config(&config.clone().with_parallel_compression(false));
        for t in [&mut parallel, &mut sequential] {
            t.add_column("a", DataType::Long).unwrap();
            t.add_column("b", DataType::Float).unwrap();
            for i in 0..4i64 {
                t.append(&[(i % 2).into(), (i as f32 / 2.0).into()]).unwrap();
            }
            t.compress_chunk(0).unwrap();
        }

        let (p, s) = (parallel.get_chunk(0).unwrap(), sequential.get_chunk(0).unwrap());
        for column in 0..2 {
            match (p.get_segment(column).unwrap(), s.get_segment(column).unwrap()) {
                (Segment::Dictionary(a), Segment::Dictionary(b)) => assert_eq!(a, b),
                other => panic!("expected dictionary segments, got {:?}", other),
            }
        }
    }
}
