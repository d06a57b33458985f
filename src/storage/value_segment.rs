use std::mem;

use crate::error::{Error, Result};
use crate::types::{ColumnType, Value};

/// Uncompressed, append-only column storage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSegment<T: ColumnType> {
    values: Vec<T>,
}

impl<T: ColumnType> ValueSegment<T> {
    pub fn new() -> Self {
        ValueSegment { values: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ValueSegment {
            values: Vec::with_capacity(capacity),
        }
    }

    pub fn get(&self, offset: usize) -> Result<Value> {
        self.get_typed(offset).map(|v| v.clone().into_value())
    }

    pub fn get_typed(&self, offset: usize) -> Result<&T> {
        self.values
            .get(offset)
            .ok_or_else(|| Error::out_of_range("value segment", offset, self.values.len()))
    }

    /// Convert `value` to `T` and push it
    pub fn append(&mut self, value: &Value) -> Result<()> {
        self.values.push(T::from_value(value)?);
        Ok(())
    }

    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// String payloads live on the heap and are not counted
    pub fn estimate_memory_usage(&self) -> usize {
        self.values.len() * mem::size_of::<T>()
    }
}
