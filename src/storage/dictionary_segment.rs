use std::cmp::Ordering;
use std::mem;

use crate::error::{Error, Result};
use crate::storage::attribute_vector::AttributeVector;
use crate::storage::segment::Segment;
use crate::types::{ColumnType, INVALID_VALUE_ID, Value, ValueId};

/// Immutable, dictionary-encoded column storage.
///
/// The dictionary holds every distinct value of the source once, in ascending
/// order; the attribute vector holds, per row, the index of that row's value.
#[derive(Debug, Clone, PartialEq)]
pub struct DictionarySegment<T: ColumnType> {
    dictionary: Vec<T>,
    attribute_vector: AttributeVector,
}

impl<T: ColumnType> DictionarySegment<T> {
    /// Encode any segment, converting each of its values to `T`
    pub fn from_segment(source: &Segment) -> Result<Self> {
        let values = (0..source.len())
            .map(|offset| source.get(offset).and_then(|v| T::from_value(&v)))
            .collect::<Result<Vec<T>>>()?;
        Self::from_values(values)
    }

    pub fn from_values(values: Vec<T>) -> Result<Self> {
        let mut dictionary = values.clone();
        dictionary.sort_by(T::compare);
        dictionary.dedup_by(|a, b| a.compare(b) == Ordering::Equal);

        let mut attribute_vector = AttributeVector::for_dictionary(dictionary.len(), values.len());
        for (offset, value) in values.iter().enumerate() {
            let code = dictionary.partition_point(|entry| entry.compare(value) == Ordering::Less);
            attribute_vector.set(offset, code as ValueId)?;
        }

        Ok(DictionarySegment {
            dictionary,
            attribute_vector,
        })
    }

    pub fn get(&self, offset: usize) -> Result<Value> {
        self.get_typed(offset).map(|v| v.clone().into_value())
    }

    pub fn get_typed(&self, offset: usize) -> Result<&T> {
        let value_id = self.attribute_vector.get(offset)?;
        self.value_by_value_id(value_id)
    }

    pub fn append(&mut self, _value: &Value) -> Result<()> {
        Err(Error::Unsupported("dictionary segments are immutable".to_string()))
    }

    pub fn dictionary(&self) -> &[T] {
        &self.dictionary
    }

    pub fn attribute_vector(&self) -> &AttributeVector {
        &self.attribute_vector
    }

    pub fn value_by_value_id(&self, value_id: ValueId) -> Result<&T> {
        self.dictionary
            .get(value_id as usize)
            .ok_or_else(|| Error::out_of_range("dictionary", value_id as usize, self.dictionary.len()))
    }

    /// First value id whose value is `>= value`, or `INVALID_VALUE_ID`
    pub fn lower_bound(&self, value: &T) -> ValueId {
        self.bound(|entry| entry.compare(value) == Ordering::Less)
    }

    /// First value id whose value is `> value`, or `INVALID_VALUE_ID`
    pub fn upper_bound(&self, value: &T) -> ValueId {
        self.bound(|entry| entry.compare(value) != Ordering::Greater)
    }

    pub fn lower_bound_value(&self, value: &Value) -> Result<ValueId> {
        Ok(self.lower_bound(&T::from_value(value)?))
    }

    pub fn upper_bound_value(&self, value: &Value) -> Result<ValueId> {
        Ok(self.upper_bound(&T::from_value(value)?))
    }

    fn bound(&self, before: impl Fn(&T) -> bool) -> ValueId {
        let index = self.dictionary.partition_point(before);
        if index == self.dictionary.len() {
            INVALID_VALUE_ID
        } else {
            index as ValueId
        }
    }

    pub fn unique_values_count(&self) -> usize {
        self.dictionary.len()
    }

    pub fn len(&self) -> usize {
        self.attribute_vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attribute_vector.is_empty()
    }

    pub fn estimate_memory_usage(&self) -> usize {
        self.dictionary.len() * mem::size_of::<T>() + self.len() * self.attribute_vector.width()
    }
}
