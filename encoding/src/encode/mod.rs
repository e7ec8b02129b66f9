//! This module contains all DICOM data element encoding logic.
use crate::stream::{self, Stream};
use dcm_core::{DataElementHeader, Tag, VR};
use snafu::{ensure, Backtrace, ResultExt, Snafu};

pub mod primitive_value;

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("Failed to write the header's tag"))]
    WriteTag { source: stream::Error },
    #[snafu(display("Failed to write the header's length"))]
    WriteLength { source: stream::Error },
    #[snafu(display("Element {} with VR {} is too long for a 2-byte length ({} bytes)", tag, vr, len))]
    LengthTooLong {
        tag: Tag,
        vr: VR,
        len: u32,
        backtrace: Backtrace,
    },
    #[snafu(display("Element {} has no value representation", tag))]
    MissingVr { tag: Tag, backtrace: Backtrace },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Encode a data element header at the stream's position,
/// in the stream's byte order.
///
/// Items and delimiters are always written as a tag and a 4-byte length.
pub fn encode_header(
    stream: &mut Stream,
    header: &DataElementHeader,
    explicit_vr: bool,
) -> Result<()> {
    stream.write_tag(header.tag).context(WriteTagSnafu)?;

    if header.tag.group() == 0xFFFE || !explicit_vr {
        return stream.write_u32(header.len.0).context(WriteLengthSnafu);
    }

    let vr = match header.vr {
        Some(vr) => vr,
        None => return MissingVrSnafu { tag: header.tag }.fail(),
    };
    stream.write_bytes(&vr.to_bytes());
    if vr.has_short_length() {
        ensure!(
            header.len.0 <= u32::from(u16::MAX),
            LengthTooLongSnafu {
                tag: header.tag,
                vr,
                len: header.len.0,
            }
        );
        stream.write_u16(header.len.0 as u16).context(WriteLengthSnafu)
    } else {
        stream.write_u16(0).context(WriteLengthSnafu)?;
        stream.write_u32(header.len.0).context(WriteLengthSnafu)
    }
}

/// The number of bytes that a header takes.
pub fn header_len(header: &DataElementHeader, explicit_vr: bool) -> u32 {
    match header.vr {
        _ if header.tag.group() == 0xFFFE || !explicit_vr => 8,
        Some(vr) if vr.has_short_length() => 8,
        _ => 12,
    }
}

/// Reverse the byte order of each number in a binary value.
///
/// Values are kept in little endian in memory;
/// this converts them to or from big endian.
/// Textual VRs are left untouched.
pub fn swap_byte_order(bytes: &mut [u8], vr: VR) {
    let unit = match vr.unit_size() {
        Some(unit) if unit > 1 => unit,
        _ => return,
    };
    for chunk in bytes.chunks_exact_mut(unit) {
        chunk.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_header;
    use byteordered::Endianness;
    use dcm_core::Length;
    use matches::assert_matches;

    #[test]
    fn explicit_le_short_and_long() {
        let mut stream = Stream::new(Endianness::Little);
        let pn = DataElementHeader::new(Tag(0x0010, 0x0010), VR::PN, Length(8));
        let ob = DataElementHeader::new(Tag(0x7FE0, 0x0010), VR::OB, Length(4));
        encode_header(&mut stream, &pn, true).unwrap();
        encode_header(&mut stream, &ob, true).unwrap();
        #[rustfmt::skip]
        let expected: &[u8] = &[
            0x10, 0x00, 0x10, 0x00, b'P', b'N', 0x08, 0x00,
            0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0x00, 0x00, 0x04, 0x00, 0x00, 0x00,
        ];
        assert_eq!(stream.as_bytes(), expected);
        assert_eq!(header_len(&pn, true), 8);
        assert_eq!(header_len(&ob, true), 12);
        assert_eq!(header_len(&ob, false), 8);
    }

    #[test]
    fn headers_read_back() {
        let headers = [
            DataElementHeader::new(Tag(0x0028, 0x0010), VR::US, Length(2)),
            DataElementHeader::new(Tag(0x0008, 0x1140), VR::SQ, Length::UNDEFINED),
            DataElementHeader::structural(Tag::ITEM, Length(0)),
        ];
        let mut stream = Stream::new(Endianness::Big);
        for h in &headers {
            encode_header(&mut stream, h, true).unwrap();
        }
        stream.seek(0).unwrap();
        let first = decode_header(&mut stream, true).unwrap().header;
        assert_eq!(first, headers[0]);
        let second = decode_header(&mut stream, true).unwrap().header;
        assert!(second.is_sequence_start() && second.len.is_undefined());
        let third = decode_header(&mut stream, true).unwrap().header;
        assert_eq!(third, headers[2]);
    }

    #[test]
    fn short_length_overflow() {
        let mut stream = Stream::new(Endianness::Little);
        let long = DataElementHeader::new(Tag(0x0010, 0x4000), VR::LT, Length(70_000));
        assert_matches!(
            encode_header(&mut stream, &long, true),
            Err(Error::LengthTooLong { len: 70_000, .. })
        );
    }

    #[test]
    fn swapping() {
        let mut bytes = [1_u8, 2, 3, 4];
        swap_byte_order(&mut bytes, VR::US);
        assert_eq!(bytes, [2, 1, 4, 3]);
        swap_byte_order(&mut bytes, VR::UL);
        assert_eq!(bytes, [3, 4, 1, 2]);
        swap_byte_order(&mut bytes, VR::LO);
        assert_eq!(bytes, [3, 4, 1, 2]);
    }
}
