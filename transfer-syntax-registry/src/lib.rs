//! This crate contains the DICOM transfer syntax registry.
//!
//! The transfer syntax registry maps a DICOM UID of a transfer syntax into the
//! respective transfer syntax specifier.
//! The known specifiers are also available as constants in [`entries`].
//!
//! Pixel data in encapsulated transfer syntaxes is kept as compressed
//! fragments. A [`PixelDecompressor`] turns those fragments into native
//! pixel data; see the [`adapters`] module for the decompressors
//! built into this crate.
//!
//! ```
//! use dcm_encoding::TransferSyntaxIndex;
//! use dcm_transfer_syntax_registry::TransferSyntaxRegistry;
//!
//! let ts = TransferSyntaxRegistry.get("1.2.840.10008.1.2.1\0").unwrap();
//! assert_eq!(ts.name(), "Explicit VR Little Endian");
//! assert!(ts.explicit_vr());
//! ```

use dcm_encoding::transfer_syntax::{TransferSyntax, TransferSyntaxIndex};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

pub mod adapters;
pub mod entries;

pub use adapters::{DecompressError, PixelDecompressor};

lazy_static! {
    static ref REGISTRY: HashMap<&'static str, TransferSyntax> = initialize_codecs();
}

/// Main implementation of a registry of DICOM transfer syntaxes.
///
/// Consumers would generally use [`TransferSyntaxRegistry`] instead.
pub struct TransferSyntaxRegistryImpl {
    m: &'static HashMap<&'static str, TransferSyntax>,
}

impl fmt::Debug for TransferSyntaxRegistryImpl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let entries: HashMap<&str, &str> =
            self.m.iter().map(|(uid, ts)| (*uid, ts.name())).collect();
        f.debug_struct("TransferSyntaxRegistryImpl")
            .field("m", &entries)
            .finish()
    }
}

impl TransferSyntaxRegistryImpl {
    /// Obtain an iterator of all registered transfer syntaxes.
    pub fn iter(&self) -> impl Iterator<Item = &TransferSyntax> {
        self.m.values()
    }

    /// Obtain a transfer syntax by its UID.
    ///
    /// Trailing null characters and spaces are ignored.
    pub fn get(&self, uid: &str) -> Option<&'static TransferSyntax> {
        let m: &'static HashMap<_, _> = self.m;
        m.get(trim_uid(uid))
    }
}

/// Zero-sized representative of the main transfer syntax registry.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub struct TransferSyntaxRegistry;

impl TransferSyntaxRegistry {
    /// Obtain an iterator of all registered transfer syntaxes.
    pub fn iter(&self) -> impl Iterator<Item = &'static TransferSyntax> {
        REGISTRY.values()
    }
}

impl TransferSyntaxIndex for TransferSyntaxRegistry {
    fn get(&self, uid: &str) -> Option<&TransferSyntax> {
        get(uid)
    }
}

impl TransferSyntaxIndex for TransferSyntaxRegistryImpl {
    fn get(&self, uid: &str) -> Option<&TransferSyntax> {
        TransferSyntaxRegistryImpl::get(self, uid)
    }
}

/// Retrieve the default transfer syntax:
/// Implicit VR Little Endian.
pub fn default() -> TransferSyntax {
    entries::IMPLICIT_VR_LITTLE_ENDIAN
}

/// Retrieve the global transfer syntax registry.
pub fn get_registry() -> TransferSyntaxRegistryImpl {
    TransferSyntaxRegistryImpl { m: &REGISTRY }
}

/// Look up a transfer syntax in the global registry.
///
/// Trailing null characters and spaces are ignored.
pub fn get(uid: &str) -> Option<&'static TransferSyntax> {
    REGISTRY.get(trim_uid(uid))
}

fn trim_uid(uid: &str) -> &str {
    uid.trim_end_matches(|c: char| c == '\0' || c == ' ')
}

fn initialize_codecs() -> HashMap<&'static str, TransferSyntax> {
    use crate::entries::*;

    [
        // the three base transfer syntaxes, fully supported
        IMPLICIT_VR_LITTLE_ENDIAN,
        EXPLICIT_VR_LITTLE_ENDIAN,
        EXPLICIT_VR_BIG_ENDIAN,
        // encapsulated pixel data, read and written as fragments
        JPEG_BASELINE,
        JPEG_EXTENDED,
        JPEG_LOSSLESS_NON_HIERARCHICAL,
        JPEG_LOSSLESS_NON_HIERARCHICAL_FIRST_ORDER_PREDICTION,
        JPEG_LS_LOSSLESS_IMAGE_COMPRESSION,
        JPEG_LS_LOSSY_IMAGE_COMPRESSION,
        JPEG_2000_IMAGE_COMPRESSION_LOSSLESS_ONLY,
        JPEG_2000_IMAGE_COMPRESSION,
        MPEG2_MAIN_PROFILE_MAIN_LEVEL,
        MPEG2_MAIN_PROFILE_HIGH_LEVEL,
        MPEG4_AVC_H264_HIGH_PROFILE,
        RLE_LOSSLESS,
        // known but not supported
        DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
    ]
    .into_iter()
    .map(|ts| (ts.uid(), ts))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteordered::Endianness;
    use dcm_encoding::transfer_syntax::Codec;

    #[test]
    fn contains_base_ts() {
        let registry = TransferSyntaxRegistry;

        let ts = registry.get("1.2.840.10008.1.2").expect("implicit VR LE");
        assert_eq!(ts.uid(), "1.2.840.10008.1.2");
        assert_eq!(ts.endianness(), Endianness::Little);
        assert!(!ts.explicit_vr());
        assert_eq!(ts.codec(), Codec::None);

        let ts = registry.get("1.2.840.10008.1.2.1").expect("explicit VR LE");
        assert!(ts.explicit_vr());
        assert_eq!(ts.endianness(), Endianness::Little);

        let ts = registry.get("1.2.840.10008.1.2.2").expect("explicit VR BE");
        assert!(ts.explicit_vr());
        assert_eq!(ts.endianness(), Endianness::Big);
    }

    #[test]
    fn padded_uids_are_found() {
        assert!(get("1.2.840.10008.1.2.1\0").is_some());
        assert!(get("1.2.840.10008.1.2.5 ").is_some());
        assert!(get("1.2.840.10008.1.2.999").is_none());
    }

    #[test]
    fn encapsulated_and_deflated() {
        let ts = get("1.2.840.10008.1.2.4.50").unwrap();
        assert!(ts.is_encapsulated_pixel_data());
        assert!(ts.is_supported());

        let ts = get("1.2.840.10008.1.2.1.99").unwrap();
        assert!(ts.is_deflated());
        assert!(!ts.is_supported());
    }

    #[test]
    fn registry_handle_matches_global() {
        let registry = get_registry();
        assert_eq!(registry.iter().count(), TransferSyntaxRegistry.iter().count());
        assert_eq!(registry.iter().count(), 16);
        assert_eq!(
            registry.get("1.2.840.10008.1.2.4.90").map(|ts| ts.name()),
            Some("JPEG 2000 Image Compression (Lossless Only)")
        );
        assert_eq!(default().uid(), "1.2.840.10008.1.2");
    }
}
