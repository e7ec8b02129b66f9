//! Support for RLE Lossless image decoding.
//!
//! Each fragment holds one frame: a 64-byte header with the number of
//! segments and their offsets, followed by PackBits-compressed segments.
//! A segment contains one byte plane of one sample,
//! most significant byte first.
//!
//! See <https://dicom.nema.org/medical/dicom/current/output/chtml/part05/chapter_G.html>
use super::{
    InvalidFragmentSnafu, NoFragmentsSnafu, PixelDecompressor, Result,
    UnsupportedTransferSyntaxSnafu,
};
use byteordered::byteorder::{ByteOrder, LittleEndian};
use dcm_encoding::transfer_syntax::TransferSyntax;
use snafu::ensure;
use tracing::debug;

/// The UID of the RLE Lossless transfer syntax.
const RLE_LOSSLESS_UID: &str = "1.2.840.10008.1.2.5";

const HEADER_LEN: usize = 64;
const MAX_SEGMENTS: usize = 15;

/// Pixel data decompressor for RLE Lossless (UID `1.2.840.10008.1.2.5`).
///
/// Since only the fragments are available,
/// the sample layout is inferred from the number of segments:
/// a multiple of three is taken as three samples per pixel,
/// anything else as a single sample.
/// The output is pixel-interleaved, each sample in little endian.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RleLosslessDecompressor;

impl PixelDecompressor for RleLosslessDecompressor {
    fn decompress(&self, fragments: &[Vec<u8>], ts: &TransferSyntax) -> Result<Vec<u8>> {
        ensure!(
            ts.uid() == RLE_LOSSLESS_UID,
            UnsupportedTransferSyntaxSnafu {
                uid: ts.uid(),
                name: ts.name(),
            }
        );
        ensure!(!fragments.is_empty(), NoFragmentsSnafu);

        let mut dst = Vec::new();
        for (index, fragment) in fragments.iter().enumerate() {
            decode_frame(index, fragment, &mut dst)?;
        }
        Ok(dst)
    }
}

fn decode_frame(index: usize, fragment: &[u8], dst: &mut Vec<u8>) -> Result<()> {
    let invalid = |reason: &str| {
        InvalidFragmentSnafu {
            index,
            reason: reason.to_string(),
        }
        .build()
    };

    let offsets = read_rle_header(fragment).ok_or_else(|| invalid("bad RLE header"))?;
    let nr_segments = offsets.len();
    let (samples_per_pixel, bytes_per_sample) = if nr_segments % 3 == 0 {
        (3, nr_segments / 3)
    } else {
        (1, nr_segments)
    };
    debug!(
        "RLE frame #{}: {} segments, {} samples of {} bytes",
        index, nr_segments, samples_per_pixel, bytes_per_sample
    );

    let mut segments = Vec::with_capacity(nr_segments);
    for (i, &start) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).copied().unwrap_or(fragment.len() as u32);
        let (start, end) = (start as usize, end as usize);
        if start > end || end > fragment.len() {
            return Err(invalid("segment offsets out of order"));
        }
        let segment = unpack_bits(&fragment[start..end])
            .ok_or_else(|| invalid("truncated PackBits run"))?;
        segments.push(segment);
    }

    // segments may carry a trailing padding byte
    let pixels = segments.iter().map(Vec::len).min().unwrap_or(0);
    let base = dst.len();
    dst.resize(base + pixels * nr_segments, 0);

    // segment order is R MSB, R LSB, G MSB, ...
    // output order is R LSB, R MSB, G LSB, ... for each pixel
    for sample in 0..samples_per_pixel {
        for byte in 0..bytes_per_sample {
            let segment = &segments[sample * bytes_per_sample + (bytes_per_sample - 1 - byte)];
            let first = base + sample * bytes_per_sample + byte;
            for (pixel, value) in segment[..pixels].iter().enumerate() {
                dst[first + pixel * nr_segments] = *value;
            }
        }
    }
    Ok(())
}

/// Read the RLE header and return the segment offsets.
fn read_rle_header(fragment: &[u8]) -> Option<Vec<u32>> {
    if fragment.len() < HEADER_LEN {
        return None;
    }
    let nr_segments = LittleEndian::read_u32(&fragment[0..4]) as usize;
    if nr_segments == 0 || nr_segments > MAX_SEGMENTS {
        return None;
    }
    let mut offsets = vec![0; nr_segments];
    LittleEndian::read_u32_into(&fragment[4..4 * (nr_segments + 1)], &mut offsets);
    Some(offsets)
}

/// Decode a PackBits byte stream.
///
/// Returns `None` if a run is cut short.
fn unpack_bits(mut input: &[u8]) -> Option<Vec<u8>> {
    let mut buffer = Vec::with_capacity(input.len() * 2);
    while let Some((&header, rest)) = input.split_first() {
        let h = header as i8;
        input = rest;
        if (-127..=-1).contains(&h) {
            let (&value, rest) = input.split_first()?;
            buffer.resize(buffer.len() + (1 - h as isize) as usize, value);
            input = rest;
        } else if h >= 0 {
            let n = h as usize + 1;
            if input.len() < n {
                return None;
            }
            buffer.extend_from_slice(&input[..n]);
            input = &input[n..];
        }
        // h = -128 is a no-op
    }
    Some(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DecompressError;
    use crate::entries::{JPEG_BASELINE, RLE_LOSSLESS};
    use matches::assert_matches;

    /// Build a frame whose segments are stored as literal runs.
    fn literal_frame(segments: &[&[u8]]) -> Vec<u8> {
        let mut header = vec![0_u8; HEADER_LEN];
        LittleEndian::write_u32(&mut header[0..4], segments.len() as u32);
        let mut body = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            let offset = (HEADER_LEN + body.len()) as u32;
            LittleEndian::write_u32(&mut header[4 + 4 * i..8 + 4 * i], offset);
            body.push(segment.len() as u8 - 1);
            body.extend_from_slice(segment);
        }
        header.extend(body);
        header
    }

    #[test]
    fn test_packbits() {
        let encoded = vec![
            0xFE, 0xAA, 0x02, 0x80, 0x00, 0x2A, 0xFD, 0xAA, 0x03, 0x80, 0x00, 0x2A, 0x22, 0xF7,
            0xAA,
        ];
        let decoded = unpack_bits(&encoded).unwrap();
        let expected = vec![
            0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0xAA, 0xAA, 0xAA, 0xAA, 0x80, 0x00, 0x2A, 0x22,
            0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA,
        ];
        assert_eq!(decoded, expected);
    }

    #[test]
    fn truncated_packbits() {
        assert_eq!(unpack_bits(&[0x03, 0x01]), None);
        assert_eq!(unpack_bits(&[0xFE]), None);
        assert_eq!(unpack_bits(&[0x80]), Some(vec![]));
    }

    #[test]
    fn single_sample_16_bit() {
        // two pixels: 0x0102 and 0x0304
        let frame = literal_frame(&[&[0x01, 0x03], &[0x02, 0x04]]);
        let out = RleLosslessDecompressor
            .decompress(&[frame], &RLE_LOSSLESS)
            .unwrap();
        assert_eq!(out, vec![0x02, 0x01, 0x04, 0x03]);
    }

    #[test]
    fn rgb_8_bit_two_frames() {
        let frame = literal_frame(&[&[10, 11], &[20, 21], &[30, 31]]);
        let out = RleLosslessDecompressor
            .decompress(&[frame.clone(), frame], &RLE_LOSSLESS)
            .unwrap();
        assert_eq!(
            out,
            vec![10, 20, 30, 11, 21, 31, 10, 20, 30, 11, 21, 31]
        );
    }

    #[test]
    fn bad_input() {
        assert_matches!(
            RleLosslessDecompressor.decompress(&[], &RLE_LOSSLESS),
            Err(DecompressError::NoFragments { .. })
        );
        assert_matches!(
            RleLosslessDecompressor.decompress(&[vec![0; 10]], &RLE_LOSSLESS),
            Err(DecompressError::InvalidFragment { index: 0, .. })
        );
        assert_matches!(
            RleLosslessDecompressor.decompress(&[vec![0; 64]], &JPEG_BASELINE),
            Err(DecompressError::UnsupportedTransferSyntax { .. })
        );
    }
}
