//! This crate contains the types and methods needed to interact
//! with DICOM nodes through the upper layer protocol.
//!
//! - The [`address`] module
//!   provides an abstraction for working with compound addresses
//!   referring to application entities in a network.
//! - The [`pdu`] module
//!   provides data structures representing _protocol data units_,
//!   along with their encoding and decoding.
//! - The [`association`] module
//!   comprises abstractions for establishing and negotiating associations
//!   between application entities,
//!   via the upper layer protocol by TCP.
//! - The [`dimse`] module
//!   builds DIMSE messages and implements the DIMSE-C services
//!   on the requesting side.
//! - The [`provider`] module
//!   serves DIMSE-C requests on incoming associations.

pub mod address;
pub mod association;
pub mod dimse;
pub mod pdu;
pub mod provider;

pub use dcm_object::{IMPLEMENTATION_CLASS_UID, IMPLEMENTATION_VERSION_NAME};

// re-exports

pub use address::AeAddr;
pub use association::client::{ClientAssociation, ClientAssociationOptions};
pub use association::server::{ServerAssociation, ServerAssociationOptions};
pub use association::AssociationState;
pub use dimse::{DimseOutcome, FindResponse, MoveResponse, SubOperations};
pub use pdu::read_pdu;
pub use pdu::write_pdu;
pub use pdu::Pdu;
pub use provider::ServiceProvider;
