//! Access to the pixel data of an object.
//!
//! Native pixel data is returned as is.
//! Encapsulated pixel data is handed to a [`PixelDecompressor`],
//! such as the RLE lossless decoder of the transfer syntax registry.
use crate::mem::{DicomObject, Node, Parent};
use dcm_core::dictionary::DataDictionary;
use dcm_core::Tag;
use dcm_transfer_syntax_registry::{DecompressError, PixelDecompressor};
use snafu::{OptionExt, ResultExt, Snafu};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum PixelDataError {
    #[snafu(display("The object has no pixel data"))]
    MissingPixelData,
    #[snafu(display("Unknown transfer syntax `{}`", uid))]
    UnknownTransferSyntax { uid: String },
    #[snafu(display("Could not decompress pixel data"))]
    Decompress { source: DecompressError },
}

impl<D> DicomObject<D>
where
    D: DataDictionary,
{
    /// The fragments of encapsulated pixel data,
    /// without the basic offset table.
    ///
    /// Returns `None` if the pixel data is not encapsulated.
    pub fn fragments(&self) -> Option<Vec<Vec<u8>>> {
        let seq = self.get(Parent::Root, Tag::PIXEL_DATA)?;
        let seq = self.node(seq)?.as_sequence().filter(|s| s.is_encapsulated())?;
        Some(
            seq.items()
                .iter()
                .skip(1)
                .filter_map(|id| self.node(*id).and_then(Node::as_item))
                .filter_map(|item| item.fragment_bytes())
                .map(<[u8]>::to_vec)
                .collect(),
        )
    }

    /// Obtain the native pixel data of the object,
    /// decompressing it if it is encapsulated.
    pub fn decompressed_pixel_data(
        &self,
        decompressor: &dyn PixelDecompressor,
    ) -> Result<Vec<u8>, PixelDataError> {
        if let Ok(elem) = self.element(Tag::PIXEL_DATA) {
            return Ok(elem.bin().to_vec());
        }
        let fragments = self.fragments().context(MissingPixelDataSnafu)?;
        let uid = self.transfer_syntax();
        let ts = dcm_transfer_syntax_registry::get(uid)
            .context(UnknownTransferSyntaxSnafu { uid })?;
        decompressor.decompress(&fragments, ts).context(DecompressSnafu)
    }
}
