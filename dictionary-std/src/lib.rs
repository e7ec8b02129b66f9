//! This crate implements the standard DICOM attribute dictionary
//! and a few normative constants.
//!
//! - [`data_element`] holds the run-time dictionary of attributes,
//!   which decoders consult to resolve the value representation
//!   of implicit VR elements and to name tags when dumping objects.
//!   It is provided as a lazily initialized singleton
//!   behind the unit type [`StandardDataDictionary`].
//! - [`tags`] maps attribute keywords to tags at compile time.
//! - [`uids`] declares transfer syntax, SOP class
//!   and application context identifiers.
//!
//! The table covers the command group, the file meta group
//! and the attributes most commonly found in composite objects.
//! Extra attributes can be layered on top with
//! [`ExtendedDictionary`](dcm_core::dictionary::ExtendedDictionary).
pub mod data_element;
pub mod tags;
pub mod uids;

pub use data_element::{StandardDataDictionary, StandardDataDictionaryRegistry};
