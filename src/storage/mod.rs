pub mod attribute_vector;
pub mod catalog;
pub mod chunk;
pub mod dictionary_segment;
pub mod reference_segment;
pub mod segment;
pub mod table;
pub mod value_segment;

pub use self::attribute_vector::{AttributeVector, AttributeVectorWidth};
pub use self::catalog::Catalog;
pub use self::chunk::Chunk;
pub use self::dictionary_segment::DictionarySegment;
pub use self::reference_segment::ReferenceSegment;
pub use self::segment::{AnyDictionarySegment, AnyValueSegment, Segment};
pub use self::table::Table;
pub use self::value_segment::ValueSegment;
