//! This module contains all DICOM data element decoding logic.
//!
//! Headers are read from a [`Stream`], which holds the byte order.
//! Whether value representations are explicit is decided by the caller.
use crate::stream::{self, Stream};
use dcm_core::{DataElementHeader, Length, Tag, VR};
use snafu::{ResultExt, Snafu};

pub mod primitive_value;

/// Module-level error type:
/// for errors which may occur while decoding DICOM data.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Failed to read the header's tag field"))]
    ReadTag { source: stream::Error },
    #[snafu(display("Failed to read the header's value representation"))]
    ReadVr { source: stream::Error },
    #[snafu(display("Failed to read the header's reserved bytes"))]
    ReadReserved { source: stream::Error },
    #[snafu(display("Failed to read the header's element length field"))]
    ReadLength { source: stream::Error },
}

impl Error {
    /// Whether decoding failed only because the stream ran out of bytes.
    pub fn is_incomplete(&self) -> bool {
        let source = match self {
            Error::ReadTag { source }
            | Error::ReadVr { source }
            | Error::ReadReserved { source }
            | Error::ReadLength { source } => source,
        };
        source.is_incomplete()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// How the value representation of a decoded header came to be.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum VrOrigin {
    /// Read from the stream and recognized.
    Explicit,
    /// Read from the stream, but the two bytes are not a known VR.
    Unrecognized([u8; 2]),
    /// Not present in the stream: the VR must come from a dictionary.
    Implicit,
    /// An item or delimiter, which has no VR.
    Structural,
}

/// A data element header as decoded,
/// along with the provenance of its value representation.
///
/// The header's VR is `None` unless the origin is [`VrOrigin::Explicit`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DecodedHeader {
    pub header: DataElementHeader,
    pub vr_origin: VrOrigin,
}

/// Decode a data element header at the stream's position.
///
/// In explicit VR mode, short VRs carry a 2-byte length,
/// others 2 reserved bytes and a 4-byte length.
/// Unrecognized VR codes are assumed to carry a 2-byte length.
/// Items and delimiters always carry a 4-byte length and no VR.
///
/// On failure the stream is restored to where the header began,
/// so that an incomplete header can be retried once more bytes arrive.
pub fn decode_header(stream: &mut Stream, explicit_vr: bool) -> Result<DecodedHeader> {
    let start = stream.position();
    let out = decode_header_impl(stream, explicit_vr);
    if out.is_err() {
        // the position is always valid, it was read before
        let _ = stream.seek(start);
    }
    out
}

fn decode_header_impl(stream: &mut Stream, explicit_vr: bool) -> Result<DecodedHeader> {
    let tag = stream.read_tag().context(ReadTagSnafu)?;

    if tag.group() == 0xFFFE {
        let len = stream.read_u32().context(ReadLengthSnafu)?;
        return Ok(DecodedHeader {
            header: DataElementHeader::structural(tag, Length(len)),
            vr_origin: VrOrigin::Structural,
        });
    }

    if !explicit_vr {
        let len = stream.read_u32().context(ReadLengthSnafu)?;
        return Ok(DecodedHeader {
            header: DataElementHeader {
                tag,
                vr: None,
                len: Length(len),
            },
            vr_origin: VrOrigin::Implicit,
        });
    }

    let code = stream.read_bytes(2).context(ReadVrSnafu)?;
    let code = [code[0], code[1]];
    match VR::from_binary(code) {
        Some(vr) if vr.has_short_length() => {
            let len = stream.read_u16().context(ReadLengthSnafu)?;
            Ok(DecodedHeader {
                header: DataElementHeader::new(tag, vr, Length(u32::from(len))),
                vr_origin: VrOrigin::Explicit,
            })
        }
        Some(vr) => {
            stream.skip(2).context(ReadReservedSnafu)?;
            let len = stream.read_u32().context(ReadLengthSnafu)?;
            Ok(DecodedHeader {
                header: DataElementHeader::new(tag, vr, Length(len)),
                vr_origin: VrOrigin::Explicit,
            })
        }
        None => {
            let len = stream.read_u16().context(ReadLengthSnafu)?;
            Ok(DecodedHeader {
                header: DataElementHeader {
                    tag,
                    vr: None,
                    len: Length(u32::from(len)),
                },
                vr_origin: VrOrigin::Unrecognized(code),
            })
        }
    }
}

/// Whether the tag marks the end of a sequence or item.
pub fn is_delimiter(tag: Tag) -> bool {
    tag == Tag::ITEM_DELIMITER || tag == Tag::SEQUENCE_DELIMITER
}
