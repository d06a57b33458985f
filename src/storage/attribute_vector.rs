use std::mem;

use crate::error::{Error, Result};
use crate::types::ValueId;

/// Code width in bytes
pub type AttributeVectorWidth = usize;

/// Fixed-width array of dictionary codes, one per row of a dictionary segment
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeVector {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl AttributeVector {
    /// Create a zeroed vector of `len` codes, narrow enough for `dictionary_size` entries
    pub fn for_dictionary(dictionary_size: usize, len: usize) -> Self {
        if dictionary_size < 1 << 8 {
            AttributeVector::U8(vec![0; len])
        } else if dictionary_size < 1 << 16 {
            AttributeVector::U16(vec![0; len])
        } else {
            AttributeVector::U32(vec![0; len])
        }
    }

    pub fn get(&self, index: usize) -> Result<ValueId> {
        let code = match self {
            AttributeVector::U8(codes) => codes.get(index).map(|&c| c as ValueId),
            AttributeVector::U16(codes) => codes.get(index).map(|&c| c as ValueId),
            AttributeVector::U32(codes) => codes.get(index).copied(),
        };
        code.ok_or_else(|| Error::out_of_range("attribute vector", index, self.len()))
    }

    pub fn set(&mut self, index: usize, value_id: ValueId) -> Result<()> {
        let len = self.len();
        let out_of_range = || Error::out_of_range("attribute vector", index, len);
        match self {
            AttributeVector::U8(codes) => {
                *codes.get_mut(index).ok_or_else(out_of_range)? = value_id as u8;
            }
            AttributeVector::U16(codes) => {
                *codes.get_mut(index).ok_or_else(out_of_range)? = value_id as u16;
            }
            AttributeVector::U32(codes) => {
                *codes.get_mut(index).ok_or_else(out_of_range)? = value_id;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        match self {
            AttributeVector::U8(codes) => codes.len(),
            AttributeVector::U16(codes) => codes.len(),
            AttributeVector::U32(codes) => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> AttributeVectorWidth {
        match self {
            AttributeVector::U8(_) => mem::size_of::<u8>(),
            AttributeVector::U16(_) => mem::size_of::<u16>(),
            AttributeVector::U32(_) => mem::size_of::<u32>(),
        }
    }

    /// Iterate all codes widened to `ValueId`
    pub fn iter(&self) -> Box<dyn Iterator<Item = ValueId> + '_> {
        match self {
            AttributeVector::U8(codes) => Box::new(codes.iter().map(|&c| c as ValueId)),
            AttributeVector::U16(codes) => Box::new(codes.iter().map(|&c| c as ValueId)),
            AttributeVector::U32(codes) => Box::new(codes.iter().copied()),
        }
    }
}
