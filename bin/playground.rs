use std::env;
use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use flintcol::{Catalog, ChunkId, Config, DataType, GetTable, Operator, ScanType, Table, TableScan};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Small enough that the sample rows span several chunks
const DEMO_CHUNK_SIZE: usize = 4;

const PEOPLE: [(i32, &str); 10] = [
    (1, "Bill"),
    (2, "Steve"),
    (3, "Alexander"),
    (4, "Steve"),
    (5, "Hasso"),
    (6, "Bill"),
    (7, "Steve"),
    (8, "Grace"),
    (9, "Ada"),
    (10, "Steve"),
];

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let mut config = Config::from_env()?;
    if env::var_os("FLINTCOL_MAX_CHUNK_SIZE").is_none() {
        config.max_chunk_size = DEMO_CHUNK_SIZE;
    }

    let mut table = Table::with_config(&config);
    table.add_column("id", DataType::Int)?;
    table.add_column("name", DataType::String)?;
    for (id, name) in PEOPLE {
        table.append(&[id.into(), name.into()])?;
    }

    let bytes_before = table.estimate_memory_usage();
    for chunk_id in 0..table.chunk_count() {
        if table.get_chunk(chunk_id as ChunkId)?.len() == table.max_chunk_size() {
            table.compress_chunk(chunk_id as ChunkId)?;
        }
    }
    info!(bytes_before, bytes_after = table.estimate_memory_usage(), "compressed full chunks");

    let mut catalog = Catalog::new(config);
    catalog.add("people", Arc::new(table))?;

    let people = GetTable::new(&catalog, "people");
    let later = TableScan::from_operator(&people, 0, ScanType::GreaterThan, 2)?;
    let steves = TableScan::from_operator(&later, 1, ScanType::Equals, "Steve")?.execute()?;
    catalog.add("steves", steves.clone())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    catalog.print(&mut out)?;
    writeln!(out)?;
    print_rows(&mut out, &steves)?;
    Ok(())
}

fn print_rows(out: &mut impl Write, table: &Table) -> Result<(), Box<dyn Error>> {
    writeln!(out, "{}", table.column_names().join(" | "))?;
    for chunk in table.chunks() {
        for offset in 0..chunk.len() {
            let row = chunk
                .segments()
                .iter()
                .map(|segment| segment.get(offset).map(|value| value.to_string()))
                .collect::<flintcol::Result<Vec<_>>>()?;
            writeln!(out, "{}", row.join(" | "))?;
        }
    }
    Ok(())
}
