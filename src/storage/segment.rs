use crate::error::Result;
use crate::resolve_data_type;
use crate::storage::dictionary_segment::DictionarySegment;
use crate::storage::reference_segment::ReferenceSegment;
use crate::storage::value_segment::ValueSegment;
use crate::types::{DataType, Value};

/// Match a typed segment enum exhaustively, binding `$s` to the inner segment.
/// Every arm sees a different concrete `T`, so `$body` is checked five times.
macro_rules! with_typed_segment {
    ($enum:ident, $segment:expr, $s:ident => $body:expr) => {
        match $segment {
            $enum::Int($s) => $body,
            $enum::Long($s) => $body,
            $enum::Float($s) => $body,
            $enum::Double($s) => $body,
            $enum::String($s) => $body,
        }
    };
}

pub(crate) use with_typed_segment;

macro_rules! typed_segment_enum {
    (@from $name:ident, $segment:ident, $variant:ident, $t:ty) => {
        impl From<$segment<$t>> for $name {
            fn from(segment: $segment<$t>) -> Self {
                $name::$variant(segment)
            }
        }

        impl From<$segment<$t>> for Segment {
            fn from(segment: $segment<$t>) -> Self {
                Segment::from($name::$variant(segment))
            }
        }
    };
    ($(#[$meta:meta])* $name:ident, $segment:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $name {
            Int($segment<i32>),
            Long($segment<i64>),
            Float($segment<f32>),
            Double($segment<f64>),
            String($segment<String>),
        }

        impl $name {
            pub fn data_type(&self) -> DataType {
                match self {
                    $name::Int(_) => DataType::Int,
                    $name::Long(_) => DataType::Long,
                    $name::Float(_) => DataType::Float,
                    $name::Double(_) => DataType::Double,
                    $name::String(_) => DataType::String,
                }
            }

            pub fn len(&self) -> usize {
                with_typed_segment!($name, self, s => s.len())
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            pub fn get(&self, offset: usize) -> Result<Value> {
                with_typed_segment!($name, self, s => s.get(offset))
            }

            pub fn estimate_memory_usage(&self) -> usize {
                with_typed_segment!($name, self, s => s.estimate_memory_usage())
            }
        }

        typed_segment_enum!(@from $name, $segment, Int, i32);
        typed_segment_enum!(@from $name, $segment, Long, i64);
        typed_segment_enum!(@from $name, $segment, Float, f32);
        typed_segment_enum!(@from $name, $segment, Double, f64);
        typed_segment_enum!(@from $name, $segment, String, String);
    };
}

typed_segment_enum!(
    /// A value segment of any column type
    AnyValueSegment,
    ValueSegment
);

typed_segment_enum!(
    /// A dictionary segment of any column type
    AnyDictionarySegment,
    DictionarySegment
);

/// One column's rows within a chunk, in one of three representations
#[derive(Debug, Clone)]
pub enum Segment {
    Value(AnyValueSegment),
    Dictionary(AnyDictionarySegment),
    Reference(ReferenceSegment),
}

impl Segment {
    /// An empty, appendable segment for a column of `data_type`
    pub fn empty(data_type: DataType) -> Self {
        resolve_data_type!(data_type, T => Segment::from(ValueSegment::<T>::new()))
    }

    /// Dictionary-encode this segment's values as `data_type`
    pub fn compress(&self, data_type: DataType) -> Result<Segment> {
        resolve_data_type!(data_type, T => DictionarySegment::<T>::from_segment(self).map(Segment::from))
    }

    pub fn get(&self, offset: usize) -> Result<Value> {
        match self {
            Segment::Value(segment) => segment.get(offset),
            Segment::Dictionary(segment) => segment.get(offset),
            Segment::Reference(segment) => segment.get(offset),
        }
    }

    /// Append to a value segment; every other representation is immutable
    pub fn append(&mut self, value: &Value) -> Result<()> {
        match self {
            Segment::Value(segment) => {
                with_typed_segment!(AnyValueSegment, segment, s => s.append(value))
            }
            Segment::Dictionary(segment) => {
                with_typed_segment!(AnyDictionarySegment, segment, s => s.append(value))
            }
            Segment::Reference(segment) => segment.append(value),
        }
    }

    /// Drop appended rows past `len`; only value segments ever grow
    pub(crate) fn truncate(&mut self, len: usize) {
        if let Segment::Value(segment) = self {
            with_typed_segment!(AnyValueSegment, segment, s => s.truncate(len))
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Segment::Value(segment) => segment.len(),
            Segment::Dictionary(segment) => segment.len(),
            Segment::Reference(segment) => segment.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Segment::Value(segment) => segment.data_type(),
            Segment::Dictionary(segment) => segment.data_type(),
            Segment::Reference(segment) => segment.data_type(),
        }
    }

    pub fn estimate_memory_usage(&self) -> usize {
        match self {
            Segment::Value(segment) => segment.estimate_memory_usage(),
            Segment::Dictionary(segment) => segment.estimate_memory_usage(),
            Segment::Reference(segment) => segment.estimate_memory_usage(),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Segment::Reference(_))
    }
}

impl From<AnyValueSegment> for Segment {
    fn from(segment: AnyValueSegment) -> Self {
        Segment::Value(segment)
    }
}

impl From<AnyDictionarySegment> for Segment {
    fn from(segment: AnyDictionarySegment) -> Self {
        Segment::Dictionary(segment)
    }
}

impl From<ReferenceSegment> for Segment {
    fn from(segment: ReferenceSegment) -> Self {
        Segment::Reference(segment)
    }
}
