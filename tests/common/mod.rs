#![allow(dead_code)]

use std::sync::Arc;

use flintcol::{ChunkId, ColumnId, DataType, RowId, Segment, Table, Value};

pub const NAMES: [&str; 6] = ["Bill", "Steve", "Alexander", "Steve", "Hasso", "Bill"];

/// Six (id, name) rows, ids 1 through 6
pub fn people(max_chunk_size: usize) -> Table {
    let mut table = Table::new(max_chunk_size);
    table.add_column("id", DataType::Int).unwrap();
    table.add_column("name", DataType::String).unwrap();
    for (i, name) in NAMES.iter().enumerate() {
        table.append(&[(i as i32 + 1).into(), (*name).into()]).unwrap();
    }
    table
}

/// Dictionary-encode every chunk of `table`
pub fn compress_all(table: &Table) {
    for chunk_id in 0..table.chunk_count() {
        table.compress_chunk(chunk_id as ChunkId).unwrap();
    }
}

/// Every value of `column`, chunk by chunk
pub fn column_values(table: &Table, column: ColumnId) -> Vec<Value> {
    let mut values = Vec::new();
    for chunk in table.chunks() {
        let segment = chunk.get_segment(column).unwrap();
        for offset in 0..segment.len() {
            values.push(segment.get(offset).unwrap());
        }
    }
    values
}

/// The position list shared by a scan result
pub fn positions(result: &Table) -> Vec<RowId> {
    assert_eq!(result.chunk_count(), 1);
    match result.get_chunk(0).unwrap().get_segment(0).unwrap() {
        Segment::Reference(segment) => segment.pos_list().to_vec(),
        other => panic!("expected a reference segment, got {:?}", other),
    }
}

pub fn shared(table: Table) -> Arc<Table> {
    Arc::new(table)
}
