use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::table::Table;

/// Name-keyed registry of tables
#[derive(Debug, Default)]
pub struct Catalog {
    config: Config,
    /// All tables indexed by name
    tables: HashMap<String, Arc<Table>>,
    /// Table names in registration order
    order: Vec<String>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new(config: Config) -> Self {
        Catalog {
            config,
            tables: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a table under `name`
    pub fn add(&mut self, name: &str, table: Arc<Table>) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(Error::SchemaViolation(format!("table {} already exists", name)));
        }
        debug!(table = name, rows = table.row_count(), "registered table");
        self.tables.insert(name.to_string(), table);
        self.order.push(name.to_string());
        Ok(())
    }

    /// Create an empty table from the catalog config and register it
    pub fn create_table(&mut self, name: &str) -> Result<()> {
        self.add(name, Arc::new(Table::with_config(&self.config)))
    }

    pub fn remove(&mut self, name: &str) -> Result<Arc<Table>> {
        let table = self
            .tables
            .remove(name)
            .ok_or_else(|| Error::NotFound(format!("table {}", name)))?;
        self.order.retain(|n| n != name);
        debug!(table = name, "dropped table");
        Ok(table)
    }

    pub fn get(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .get(name)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("table {}", name)))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Drop every table
    pub fn reset(&mut self) {
        self.tables.clear();
        self.order.clear();
    }

    /// Write one summary line per table
    pub fn print(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "table name | column count | row count | chunk count")?;
        for name in &self.order {
            if let Some(table) = self.tables.get(name) {
                writeln!(
                    out,
                    "{} | {} | {} | {}",
                    name,
                    table.column_count(),
                    table.row_count(),
                    table.chunk_count()
                )?;
            }
        }
        Ok(())
    }
}
