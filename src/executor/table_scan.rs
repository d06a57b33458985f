use std::cmp::Ordering;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, span, Level};
use ulid::Ulid;

use crate::error::{Error, Result};
use crate::executor::Operator;
use crate::resolve_data_type;
use crate::storage::chunk::Chunk;
use crate::storage::dictionary_segment::DictionarySegment;
use crate::storage::reference_segment::ReferenceSegment;
use crate::storage::segment::{with_typed_segment, AnyDictionarySegment, AnyValueSegment, Segment};
use crate::storage::table::Table;
use crate::storage::value_segment::ValueSegment;
use crate::types::{ChunkId, ChunkOffset, ColumnId, ColumnType, PosList, RowId, Value, ValueId, INVALID_VALUE_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanType {
    Equals,
    NotEquals,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
}

impl ScanType {
    /// Whether `stored` compared to the search value as `ordering` satisfies the predicate
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            ScanType::Equals => ordering == Ordering::Equal,
            ScanType::NotEquals => ordering != Ordering::Equal,
            ScanType::LessThan => ordering == Ordering::Less,
            ScanType::LessOrEqual => ordering != Ordering::Greater,
            ScanType::GreaterThan => ordering == Ordering::Greater,
            ScanType::GreaterOrEqual => ordering != Ordering::Less,
        }
    }

    /// The predicate translated to dictionary codes. `lower` and `upper` are
    /// the search value's bounds, with a missing bound replaced by the
    /// dictionary size.
    fn matches_code(self, code: ValueId, lower: ValueId, upper: ValueId) -> bool {
        match self {
            ScanType::Equals => code == lower,
            ScanType::NotEquals => code < lower || code >= upper,
            ScanType::LessThan => code < lower,
            ScanType::LessOrEqual => code < upper,
            ScanType::GreaterThan => code >= upper,
            ScanType::GreaterOrEqual => code >= lower,
        }
    }

    /// True when no code of a dictionary with `unique` entries can match
    fn excludes_all_codes(self, lower: ValueId, upper: ValueId, unique: ValueId) -> bool {
        match self {
            ScanType::Equals => lower == upper,
            ScanType::NotEquals => lower == 0 && upper == unique,
            ScanType::LessThan => lower == 0,
            ScanType::LessOrEqual => upper == 0,
            ScanType::GreaterThan => upper == unique,
            ScanType::GreaterOrEqual => lower == unique,
        }
    }
}

/// Selects the rows of `input` whose value in one column satisfies a
/// comparison, producing a single-chunk table of reference segments.
pub struct TableScan {
    input: Arc<Table>,
    column_id: ColumnId,
    scan_type: ScanType,
    search_value: Value,
}

impl TableScan {
    pub fn new(
        input: Arc<Table>,
        column_id: ColumnId,
        scan_type: ScanType,
        search_value: impl Into<Value>,
    ) -> Self {
        TableScan {
            input,
            column_id,
            scan_type,
            search_value: search_value.into(),
        }
    }

    /// Run `input` and scan its output
    pub fn from_operator(
        input: &dyn Operator,
        column_id: ColumnId,
        scan_type: ScanType,
        search_value: impl Into<Value>,
    ) -> Result<Self> {
        Ok(Self::new(input.execute()?, column_id, scan_type, search_value))
    }

    pub fn input_table(&self) -> &Arc<Table> {
        &self.input
    }

    pub fn column_id(&self) -> ColumnId {
        self.column_id
    }

    pub fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    pub fn search_value(&self) -> &Value {
        &self.search_value
    }
}

impl Operator for TableScan {
    fn execute(&self) -> Result<Arc<Table>> {
        let scan_id = Ulid::new();
        let span = span!(
            Level::INFO,
            "table_scan",
            scan_id = %scan_id,
            column_id = self.column_id,
            scan_type = ?self.scan_type
        );
        let _enter = span.enter();

        let column_type = self.input.column_type(self.column_id)?;
        resolve_data_type!(column_type, T => T::from_value(&self.search_value).map(drop))?;

        let mut pos_list = PosList::new();
        let mut source = ScanSource::Unresolved;

        for (chunk_id, chunk) in self.input.chunks().iter().enumerate() {
            let chunk_id = chunk_id as ChunkId;
            match chunk.get_segment(self.column_id)? {
                Segment::Value(segment) => {
                    source.expect_physical()?;
                    with_typed_segment!(AnyValueSegment, segment, s => {
                        scan_value_segment(s, chunk_id, self.scan_type, &self.search_value, &mut pos_list)
                    })?;
                }
                Segment::Dictionary(segment) => {
                    source.expect_physical()?;
                    let scanned = with_typed_segment!(AnyDictionarySegment, segment, s => {
                        scan_dictionary_segment(s, chunk_id, self.scan_type, &self.search_value, &mut pos_list)
                    })?;
                    if !scanned {
                        debug!(chunk_id, "skipped chunk, no dictionary entry can match");
                    }
                }
                Segment::Reference(segment) => {
                    source.expect_references(chunk, segment)?;
                    resolve_data_type!(column_type, T => {
                        scan_reference_segment::<T>(segment, self.scan_type, &self.search_value, &mut pos_list)
                    })?;
                }
            }
        }

        info!(rows = pos_list.len(), "scan finished");

        let (target, column_ids) = match source {
            ScanSource::References { table, column_ids } => (table, column_ids),
            ScanSource::Unresolved | ScanSource::Physical => (
                self.input.clone(),
                (0..self.input.column_count()).map(|c| c as ColumnId).collect(),
            ),
        };

        let pos_list = Arc::new(pos_list);
        let segments = column_ids
            .into_iter()
            .map(|column_id| ReferenceSegment::new(target.clone(), column_id, pos_list.clone()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Arc::new(Table::from_reference_segments(self.input.schema(), segments)))
    }
}

/// What the scanned column is stored as, across all chunks seen so far
enum ScanSource {
    Unresolved,
    Physical,
    /// Every column references `table`, column `i` pointing at `column_ids[i]`
    References {
        table: Arc<Table>,
        column_ids: Vec<ColumnId>,
    },
}

impl ScanSource {
    fn expect_physical(&mut self) -> Result<()> {
        match self {
            ScanSource::Unresolved | ScanSource::Physical => {
                *self = ScanSource::Physical;
                Ok(())
            }
            ScanSource::References { .. } => Err(mixed_column()),
        }
    }

    fn expect_references(&mut self, chunk: &Chunk, scanned: &ReferenceSegment) -> Result<()> {
        let table = scanned.referenced_table();
        let column_ids = chunk
            .segments()
            .iter()
            .map(|segment| match segment {
                Segment::Reference(r)
                    if Arc::ptr_eq(r.referenced_table(), table) && same_rows(r, scanned) =>
                {
                    Ok(r.referenced_column_id())
                }
                _ => Err(Error::Unsupported(
                    "chunk columns do not reference the same rows of one table".to_string(),
                )),
            })
            .collect::<Result<Vec<_>>>()?;

        match self {
            ScanSource::Unresolved => {
                *self = ScanSource::References {
                    table: table.clone(),
                    column_ids,
                };
                Ok(())
            }
            ScanSource::References {
                table: seen,
                column_ids: seen_ids,
            } if Arc::ptr_eq(seen, table) && *seen_ids == column_ids => Ok(()),
            ScanSource::References { .. } => Err(Error::Unsupported(
                "scanned column references more than one table".to_string(),
            )),
            ScanSource::Physical => Err(mixed_column()),
        }
    }
}

fn mixed_column() -> Error {
    Error::Unsupported("scanned column mixes stored and referenced segments".to_string())
}

fn same_rows(a: &ReferenceSegment, b: &ReferenceSegment) -> bool {
    Arc::ptr_eq(a.pos_list(), b.pos_list()) || a.pos_list() == b.pos_list()
}

fn scan_value_segment<T: ColumnType>(
    segment: &ValueSegment<T>,
    chunk_id: ChunkId,
    scan_type: ScanType,
    search_value: &Value,
    pos_list: &mut PosList,
) -> Result<()> {
    let search = T::from_value(search_value)?;
    for (offset, value) in segment.values().iter().enumerate() {
        if scan_type.matches(value.compare(&search)) {
            pos_list.push(RowId::new(chunk_id, offset as ChunkOffset));
        }
    }
    Ok(())
}

/// Returns false when the chunk was skipped without reading its codes
fn scan_dictionary_segment<T: ColumnType>(
    segment: &DictionarySegment<T>,
    chunk_id: ChunkId,
    scan_type: ScanType,
    search_value: &Value,
    pos_list: &mut PosList,
) -> Result<bool> {
    let search = T::from_value(search_value)?;
    let unique = segment.unique_values_count() as ValueId;
    let bound = |id: ValueId| if id == INVALID_VALUE_ID { unique } else { id };
    let lower = bound(segment.lower_bound(&search));
    let upper = bound(segment.upper_bound(&search));

    if scan_type.excludes_all_codes(lower, upper, unique) {
        return Ok(false);
    }

    for (offset, code) in segment.attribute_vector().iter().enumerate() {
        if scan_type.matches_code(code, lower, upper) {
            pos_list.push(RowId::new(chunk_id, offset as ChunkOffset));
        }
    }
    Ok(true)
}

/// Compares referenced values as the scanned column's declared type `T` and
/// collects the positions in the referenced table
fn scan_reference_segment<T: ColumnType>(
    segment: &ReferenceSegment,
    scan_type: ScanType,
    search_value: &Value,
    pos_list: &mut PosList,
) -> Result<()> {
    let search = T::from_value(search_value)?;
    for row_id in segment.pos_list().iter() {
        let value = T::from_value(&segment.value_at(*row_id)?)?;
        if scan_type.matches(value.compare(&search)) {
            pos_list.push(*row_id);
        }
    }
    Ok(())
}
