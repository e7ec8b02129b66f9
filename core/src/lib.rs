#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

//! This is the core library of the workspace, containing the concepts
//! and data structures shared by every other crate.
//!
//! - [`header`] comprises the data types of a DICOM element header:
//!   tags, value representations and lengths.
//! - [`value`] holds the tagged value type of data elements
//!   and the conversion rules keyed by value representation.
//! - [`dictionary`] describes the behavior of DICOM data dictionaries,
//!   which translate tags to a name, a value representation and a multiplicity.
//! - [`uid`] generates new unique identifiers.

pub mod dictionary;
pub mod header;
pub mod uid;
pub mod value;

pub use dictionary::{DataDictionary, DictionaryEntry, Lookup, TagRange};
pub use header::{is_valid_tag, DataElementHeader, Length, Tag, ValueKind, VR};
pub use value::{C, Value};

// re-export crates that are part of the public API
pub use chrono;
pub use smallvec;
