pub mod table_scan;

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::storage::catalog::Catalog;
use crate::storage::table::Table;

pub use self::table_scan::{ScanType, TableScan};

/// A single-shot step producing a table
pub trait Operator {
    fn execute(&self) -> Result<Arc<Table>>;
}

/// Feeds an existing table into an operator tree
pub struct TableWrapper {
    table: Arc<Table>,
}

impl TableWrapper {
    pub fn new(table: Arc<Table>) -> Self {
        TableWrapper { table }
    }
}

impl Operator for TableWrapper {
    fn execute(&self) -> Result<Arc<Table>> {
        Ok(self.table.clone())
    }
}

/// Looks a table up by name in a catalog
pub struct GetTable<'a> {
    catalog: &'a Catalog,
    name: String,
}

impl<'a> GetTable<'a> {
    pub fn new(catalog: &'a Catalog, name: &str) -> Self {
        GetTable {
            catalog,
            name: name.to_string(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.name
    }
}

impl Operator for GetTable<'_> {
    fn execute(&self) -> Result<Arc<Table>> {
        debug!(table = %self.name, "resolving table");
        self.catalog.get(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_table_wrapper() {
        let table = Arc::new(Table::new(2));
        let wrapper = TableWrapper::new(table.clone());
        assert!(Arc::ptr_eq(&wrapper.execute().unwrap(), &table));
    }

    #[test]
    fn test_get_table() {
        let mut catalog = Catalog::default();
        catalog.create_table("aNiceTestTable").unwrap();

        let get = GetTable::new(&catalog, "aNiceTestTable");
        assert_eq!(get.table_name(), "aNiceTestTable");
        assert!(Arc::ptr_eq(&get.execute().unwrap(), &catalog.get("aNiceTestTable").unwrap()));

        let missing = GetTable::new(&catalog, "anUglyTestTable");
        assert!(matches!(missing.execute(), Err(Error::NotFound(_))));
    }
}
