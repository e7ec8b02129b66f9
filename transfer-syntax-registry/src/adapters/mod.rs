//! Root module for pixel data decompressors.
//!
//! Additional support for certain transfer syntaxes
//! can be added via Cargo features.
//!
//! - [`rle_lossless`](rle_lossless) provides native RLE lossless decoding.
//!   Requires the `rle` feature,
//!   enabled by default.
//!
//! Other image codecs are left to implementors of [`PixelDecompressor`].
use dcm_encoding::transfer_syntax::TransferSyntax;
use snafu::{Backtrace, Snafu};

#[cfg(feature = "rle")]
pub mod rle_lossless;

#[cfg(feature = "rle")]
pub use rle_lossless::RleLosslessDecompressor;

/// **Note:** This module is a stub.
/// Enable the `rle` feature to use this module.
#[cfg(not(feature = "rle"))]
pub mod rle_lossless {}

/// An error which may occur while decompressing pixel data.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum DecompressError {
    /// The decompressor does not handle this transfer syntax.
    #[snafu(display("Unsupported transfer syntax {} ({})", uid, name))]
    UnsupportedTransferSyntax {
        uid: &'static str,
        name: &'static str,
        backtrace: Backtrace,
    },
    /// There were no fragments to decode.
    #[snafu(display("No pixel data fragments to decode"))]
    NoFragments { backtrace: Backtrace },
    /// A fragment did not follow the expected format.
    #[snafu(display("Invalid fragment #{}: {}", index, reason))]
    InvalidFragment {
        index: usize,
        reason: String,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = DecompressError> = std::result::Result<T, E>;

/// A pixel data decompressor.
///
/// Receives the pixel data fragments of an object in an encapsulated
/// transfer syntax, excluding the basic offset table,
/// and produces native pixel data in little endian.
pub trait PixelDecompressor {
    /// Decompress all fragments into a single buffer of native pixel data.
    fn decompress(&self, fragments: &[Vec<u8>], ts: &TransferSyntax) -> Result<Vec<u8>>;
}

impl<T: ?Sized> PixelDecompressor for &T
where
    T: PixelDecompressor,
{
    fn decompress(&self, fragments: &[Vec<u8>], ts: &TransferSyntax) -> Result<Vec<u8>> {
        (**self).decompress(fragments, ts)
    }
}

impl<T: ?Sized> PixelDecompressor for Box<T>
where
    T: PixelDecompressor,
{
    fn decompress(&self, fragments: &[Vec<u8>], ts: &TransferSyntax) -> Result<Vec<u8>> {
        (**self).decompress(fragments, ts)
    }
}

/// Decompressor which supports no transfer syntax at all.
///
/// Useful as a placeholder when no image codec is available.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NoDecompressor;

impl PixelDecompressor for NoDecompressor {
    fn decompress(&self, _fragments: &[Vec<u8>], ts: &TransferSyntax) -> Result<Vec<u8>> {
        UnsupportedTransferSyntaxSnafu {
            uid: ts.uid(),
            name: ts.name(),
        }
        .fail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::JPEG_BASELINE;
    use matches::assert_matches;

    #[test]
    fn no_decompressor_rejects_everything() {
        let boxed: Box<dyn PixelDecompressor> = Box::new(NoDecompressor);
        assert_matches!(
            boxed.decompress(&[vec![0xFF, 0xD8]], &JPEG_BASELINE),
            Err(DecompressError::UnsupportedTransferSyntax {
                uid: "1.2.840.10008.1.2.4.50",
                ..
            })
        );
    }
}
