//! This crate contains a high-level abstraction for reading,
//! manipulating and writing DICOM objects.
//!
//! An object is a tree of nodes held in an arena:
//! [elements](Element) are the leaves,
//! [sequences](Sequence) hold an ordered list of [items](Item),
//! and items hold elements and sequences keyed by tag,
//! just like the root of the object.
//! Nodes are addressed with a [`NodeId`]
//! and parents with a [`Parent`], which is either the root
//! or a sequence or item node.
//!
//! Loading a DICOM file can be done with ease via the function [`open_file`].
//! For additional file reading options, use [`OpenFileOptions`].
//!
//! # Examples
//!
//! Read an object and fetch some attributes:
//!
//! ```no_run
//! use dcm_dictionary_std::tags;
//! use dcm_object::open_file;
//! # fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! let obj = open_file("0001.dcm")?;
//! if !obj.read_success() {
//!     eprintln!("partial read: {:?}", obj.messages());
//! }
//! let patient_name = obj.value(tags::PATIENT_NAME)?.to_str().into_owned();
//! let modality = obj.element_by_name("Modality")?.to_str()?;
//! # Ok(())
//! # }
//! ```
//!
//! Build an object from scratch and serialize its data set:
//!
//! ```
//! use dcm_core::{Tag, VR};
//! use dcm_object::{DicomObject, Element, Item, Parent, Sequence};
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut obj = DicomObject::new();
//! obj.set_value(Tag(0x0010, 0x0010), "Doe^John")?;
//! let seq = obj.add(Parent::Root, Sequence::new(Tag(0x0008, 0x1140)))?;
//! let item = obj.add_item(seq, Some(Item::new()), None)?;
//! obj.add(item, Element::new(Tag(0x0008, 0x1150), VR::UI, "1.2.3")?)?;
//! assert_eq!(obj.count_all(Parent::Root), 4);
//!
//! let ts = dcm_transfer_syntax_registry::entries::EXPLICIT_VR_LITTLE_ENDIAN;
//! let bytes = obj.encode_dataset(&ts)?;
//! assert!(!bytes.is_empty());
//! # Ok(())
//! # }
//! # run().unwrap();
//! ```
pub mod dump;
pub mod file;
pub mod mem;
pub mod meta;
pub mod pixeldata;
mod read;
pub mod write;

pub use crate::dump::{dump_object, dump_object_to, DumpOptions};
pub use crate::file::{from_reader, open_file, DuplicatePolicy, OpenFileOptions, ReadPreamble};
pub use crate::mem::{DicomObject, Element, Item, Key, Node, NodeId, Parent, Sequence};
pub use crate::meta::FileMetaTable;
pub use crate::pixeldata::PixelDataError;
pub use dcm_core::Tag;
pub use dcm_dictionary_std::StandardDataDictionary;

use dcm_encoding::{decode, encode};
use snafu::{Backtrace, Snafu};

/// The default implementation of a root DICOM object.
pub type DefaultDicomObject = DicomObject<StandardDataDictionary>;

/// The implementation class UID written to the file meta group
/// of new files.
///
/// Automatically generated as per the standard, part 5, section B.2.
pub const IMPLEMENTATION_CLASS_UID: &str = "2.25.262086406829110419931297894772577063974";

/// The implementation version name written to the file meta group
/// of new files.
pub const IMPLEMENTATION_VERSION_NAME: &str = "DCM-RS 0.3";

/// An error which may occur when loading a DICOM object.
///
/// Only failures to access the source end up here:
/// malformed content is reported through
/// [`read_success`](DicomObject::read_success)
/// and [`messages`](DicomObject::messages) instead.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ReadError {
    #[snafu(display("Could not open file '{}'", filename.display()))]
    OpenFile {
        filename: std::path::PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not read from file '{}'", filename.display()))]
    ReadFile {
        filename: std::path::PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    /// Could not read from the byte source
    ReadSource {
        backtrace: Backtrace,
        source: std::io::Error,
    },
}

/// An error which may occur when writing a DICOM object
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum WriteError {
    #[snafu(display("Could not write to file '{}'", filename.display()))]
    WriteFile {
        filename: std::path::PathBuf,
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not write to the output"))]
    WriteOutput {
        backtrace: Backtrace,
        source: std::io::Error,
    },
    #[snafu(display("Could not encode header of {}", tag))]
    EncodeHeader {
        tag: Tag,
        #[snafu(backtrace)]
        source: encode::Error,
    },
    #[snafu(display("Could not encode value of {}", tag))]
    EncodeElementValue {
        tag: Tag,
        #[snafu(backtrace)]
        source: encode::primitive_value::Error,
    },
    #[snafu(display("Could not prepare the file meta group"))]
    PrepareMeta {
        #[snafu(backtrace)]
        source: ModifyError,
    },
    #[snafu(display("Unsupported transfer syntax `{}`", uid))]
    WriteUnsupportedTransferSyntax { uid: String, backtrace: Backtrace },
    #[snafu(display("Segment size must be greater than zero"))]
    ZeroSegmentSize { backtrace: Backtrace },
}

/// An error which may occur when looking up a DICOM object's attributes.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum AccessError {
    #[snafu(display("No such data element with tag {}", tag))]
    NoSuchDataElementTag { tag: Tag, backtrace: Backtrace },
    /// The tag refers to a sequence, which has no value of its own.
    #[snafu(display("Node {} is a {}, not an element", tag, kind))]
    NotAnElement {
        tag: Tag,
        kind: &'static str,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not decode value of {}", tag))]
    DecodeValue {
        tag: Tag,
        #[snafu(backtrace)]
        source: decode::primitive_value::Error,
    },
}

impl AccessError {
    pub fn into_access_by_name(self, alias: impl Into<String>) -> AccessByNameError {
        match self {
            AccessError::NoSuchDataElementTag { tag, backtrace } => {
                AccessByNameError::NoSuchDataElementAlias {
                    tag,
                    alias: alias.into(),
                    backtrace,
                }
            }
            e => AccessByNameError::Access { source: Box::new(e) },
        }
    }
}

/// An error which may occur when looking up a DICOM object's attributes
/// by a keyword (or alias) instead of by tag.
///
/// These accesses incur a look-up at the data element dictionary,
/// which may fail if no such entry exists.
#[derive(Debug, Snafu)]
pub enum AccessByNameError {
    #[snafu(display("No such data element {} (with tag {})", alias, tag))]
    NoSuchDataElementAlias {
        tag: Tag,
        alias: String,
        backtrace: Backtrace,
    },

    /// Could not resolve attribute name from the data dictionary
    #[snafu(display("Unknown data attribute named `{}`", name))]
    NoSuchAttributeName { name: String, backtrace: Backtrace },

    #[snafu(display("Could not access data element"))]
    Access { source: Box<AccessError> },
}

/// An error which may occur when modifying the tree of a DICOM object.
///
/// These are caller errors, such as adding a node where it does not belong.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum ModifyError {
    /// The parent node does not exist (anymore).
    #[snafu(display("No such parent node"))]
    NoSuchParent { backtrace: Backtrace },
    #[snafu(display("Element {} cannot hold children", tag))]
    NotAParent { tag: Tag, backtrace: Backtrace },
    #[snafu(display("Only items can be added to sequence {}, got {}", sequence, tag))]
    NotAnItem {
        sequence: Tag,
        tag: Tag,
        backtrace: Backtrace,
    },
    #[snafu(display("Items can only be added to sequences"))]
    ItemOutsideSequence { backtrace: Backtrace },
    #[snafu(display("Items of encapsulated pixel data cannot hold children"))]
    FragmentItem { backtrace: Backtrace },
    #[snafu(display("Item index {} is out of bounds (sequence has {} items)", index, len))]
    ItemIndexOutOfBounds {
        index: usize,
        len: usize,
        backtrace: Backtrace,
    },
    #[snafu(display("{} is a {}, cannot set a value", tag, kind))]
    SetNonElement {
        tag: Tag,
        kind: &'static str,
        backtrace: Backtrace,
    },
    #[snafu(display("Could not encode value of {}", tag))]
    EncodeValue {
        tag: Tag,
        #[snafu(backtrace)]
        source: encode::primitive_value::Error,
    },
}

/// Format an error along with its chain of sources, in a single line.
pub(crate) fn error_chain(error: &dyn std::error::Error) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(e) = source {
        out.push_str(": ");
        out.push_str(&e.to_string());
        source = e.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use snafu::IntoError;

    #[test]
    fn error_chain_joins_sources() {
        let err = ReadSourceSnafu.into_error(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(error_chain(&err), "Could not read from the byte source: boom");
    }
}
