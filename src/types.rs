use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Chunk index within a table
pub type ChunkId = u32;

/// Row offset within a chunk
pub type ChunkOffset = u32;

/// Column index within a table schema
pub type ColumnId = u16;

/// Index of a value inside a dictionary
pub type ValueId = u32;

/// Marks "no such bound" in dictionary lookups. Narrower code widths never
/// store it, since a dictionary can hold at most `width::MAX` entries.
pub const INVALID_VALUE_ID: ValueId = ValueId::MAX;

/// Physical row address: (chunk, offset within chunk)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId {
    pub chunk_id: ChunkId,
    pub chunk_offset: ChunkOffset,
}

impl RowId {
    pub fn new(chunk_id: ChunkId, chunk_offset: ChunkOffset) -> Self {
        RowId {
            chunk_id,
            chunk_offset,
        }
    }
}

/// Ordered list of selected rows, shared between the reference segments of a result
pub type PosList = Vec<RowId>;

/// A single column value, passed across the type-erased segment boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Long(_) => DataType::Long,
            Value::Float(_) => DataType::Float,
            Value::Double(_) => DataType::Double,
            Value::String(_) => DataType::String,
        }
    }

    /// Convert to the native type `T`, following cast semantics for numbers
    pub fn cast<T: ColumnType>(&self) -> Result<T> {
        T::from_value(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Long(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Double(x) => write!(f, "{}", x),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Double(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

/// Column type tags. The canonical names are `int`, `long`, `float`, `double` and `string`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Long,
    Float,
    Double,
    String,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::String => "string",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int" => Ok(DataType::Int),
            "long" => Ok(DataType::Long),
            "float" => Ok(DataType::Float),
            "double" => Ok(DataType::Double),
            "string" => Ok(DataType::String),
            other => Err(Error::NotFound(format!("unknown data type: {}", other))),
        }
    }
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
    impl Sealed for String {}
}

/// Native element type of a column. Implemented for exactly the five types
/// named by [`DataType`].
pub trait ColumnType: sealed::Sealed + Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    const DATA_TYPE: DataType;

    fn from_value(value: &Value) -> Result<Self>;

    fn into_value(self) -> Value;

    /// Total order used for sorting, deduplication, bound search and predicates.
    /// Floats order by `total_cmp` except that `-0.0` equals `0.0`, so NaN
    /// sorts after every number.
    fn compare(&self, other: &Self) -> Ordering;
}

fn parse_text<T: FromStr>(text: &str, target: DataType) -> Result<T> {
    text.trim().parse::<T>().map_err(|_| {
        Error::TypeMismatch(format!("cannot convert '{}' to {}", text, target))
    })
}

macro_rules! impl_numeric_column_type {
    ($t:ty, $variant:ident, $cmp:expr) => {
        impl ColumnType for $t {
            const DATA_TYPE: DataType = DataType::$variant;

            fn from_value(value: &Value) -> Result<Self> {
                match value {
                    Value::Int(n) => Ok(*n as $t),
                    Value::Long(n) => Ok(*n as $t),
                    Value::Float(x) => Ok(*x as $t),
                    Value::Double(x) => Ok(*x as $t),
                    Value::String(s) => parse_text(s, DataType::$variant),
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn compare(&self, other: &Self) -> Ordering {
                $cmp(self, other)
            }
        }
    };
}

impl_numeric_column_type!(i32, Int, Ord::cmp);
impl_numeric_column_type!(i64, Long, Ord::cmp);
impl_numeric_column_type!(f32, Float, |a: &f32, b: &f32| {
    if a == b { Ordering::Equal } else { a.total_cmp(b) }
});
impl_numeric_column_type!(f64, Double, |a: &f64, b: &f64| {
    if a == b { Ordering::Equal } else { a.total_cmp(b) }
});

impl ColumnType for String {
    const DATA_TYPE: DataType = DataType::String;

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Ok(other.to_string()),
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        Ord::cmp(self, other)
    }
}

/// Run `$body` with `$t` bound to the native type of `$data_type`.
///
/// ```
/// use flintcol::{resolve_data_type, ColumnType, DataType};
///
/// let tag = resolve_data_type!(DataType::Double, T => T::DATA_TYPE.name());
/// assert_eq!(tag, "double");
/// ```
#[macro_export]
macro_rules! resolve_data_type {
    ($data_type:expr, $t:ident => $body:expr) => {
        match $data_type {
            $crate::DataType::Int => {
                type $t = i32;
                $body
            }
            $crate::DataType::Long => {
                type $t = i64;
                $body
            }
            $crate::DataType::Float => {
                type $t = f32;
                $body
            }
            $crate::DataType::Double => {
                type $t = f64;
                $body
            }
            $crate::DataType::String => {
                type $t = String;
                $body
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_casts() {
        assert_eq!(Value::Double(3.14).cast::<i32>().unwrap(), 3);
        assert_eq!(Value::Int(4).cast::<f64>().unwrap(), 4.0);
        assert_eq!(Value::Long(7).cast::<i32>().unwrap(), 7);
    }

    #[test]
    fn test_text_casts() {
        assert_eq!(Value::Int(3).cast::<String>().unwrap(), "3");
        assert_eq!(Value::Double(4.44).cast::<String>().unwrap(), "4.44");
        assert_eq!(Value::from(" 12 ").cast::<i64>().unwrap(), 12);
        assert!(matches!(
            Value::from("Hi").cast::<i32>(),
            Err(Error::TypeMismatch(_))
        ));
        assert!(matches!(
            Value::from("Hi").cast::<f64>(),
            Err(Error::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_data_type_tags() {
        for name in ["int", "long", "float", "double", "string"] {
            let data_type: DataType = name.parse().unwrap();
            assert_eq!(data_type.to_string(), name);
        }
        assert!(matches!("text".parse::<DataType>(), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_resolve_data_type() {
        let data_type: DataType = "long".parse().unwrap();
        let value = resolve_data_type!(data_type, T => T::from_value(&Value::Int(9)).map(T::into_value));
        assert_eq!(value.unwrap(), Value::Long(9));
    }

    #[test]
    fn test_float_total_order() {
        assert_eq!(f64::NAN.compare(&1.0), Ordering::Greater);
        assert_eq!(1.0f32.compare(&2.0), Ordering::Less);
    }

    #[test]
    fn test_signed_zeros_compare_equal() {
        assert_eq!((-0.0f64).compare(&0.0), Ordering::Equal);
        assert_eq!(0.0f32.compare(&-0.0), Ordering::Equal);
        assert_eq!((-1.0f64).compare(&-0.0), Ordering::Less);
        assert_eq!(f32::NAN.compare(&f32::NAN), Ordering::Equal);
    }
}
