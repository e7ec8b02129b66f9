//! DICOM encoding and decoding primitives.
//!
//! This crate provides the byte-level building blocks
//! shared by the object codec and the upper layer protocol:
//!
//! - [`stream`]: a positioned, endian-aware cursor over a byte buffer
//!   which may be filled incrementally, as when receiving network data;
//! - [`decode`] and [`encode`]: data element header framing
//!   and the value codec, which turns a [`Value`](dcm_core::Value)
//!   into its binary form for a given value representation and back;
//! - [`transfer_syntax`]: the transfer syntax specifier.
//!
//! All APIs are based on synchronous I/O.

pub mod decode;
pub mod encode;
pub mod stream;
pub mod transfer_syntax;

pub use byteordered::Endianness;
pub use decode::primitive_value::decode_value;
pub use encode::primitive_value::encode_value;
pub use stream::Stream;
pub use transfer_syntax::{Codec, TransferSyntax, TransferSyntaxIndex};
