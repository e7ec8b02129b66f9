//! Module containing the DICOM Transfer Syntax data structure and related methods.
//!
//! This crate does not host specific transfer syntaxes. They are declared
//! in the `dcm-transfer-syntax-registry` crate, which implements
//! [`TransferSyntaxIndex`].

use byteordered::Endianness;

/// A DICOM transfer syntax specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSyntax {
    /// The unique identifier of the transfer syntax.
    uid: &'static str,
    /// The name of the transfer syntax.
    name: &'static str,
    /// The byte order of data.
    byte_order: Endianness,
    /// Whether the transfer syntax mandates an explicit value representation,
    /// or the VR is implicit.
    explicit_vr: bool,
    /// The transfer syntax' requirements.
    codec: Codec,
}

/// A description of the encoding requirements of a transfer syntax
/// beyond the byte order and VR explicitness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    /// The data set is encoded natively.
    None,
    /// The whole data set is deflated.
    /// Such data sets are recognized but not decoded.
    Deflated,
    /// Pixel data is encapsulated in fragments,
    /// to be decoded by an external pixel data decompressor.
    EncapsulatedPixelData,
}

/// Trait for containers of transfer syntax specifiers.
pub trait TransferSyntaxIndex {
    /// Obtain a DICOM transfer syntax by its respective UID.
    ///
    /// Implementations of this method should be robust to the possible
    /// presence of trailing null characters (`\0`) or spaces in `uid`.
    fn get(&self, uid: &str) -> Option<&TransferSyntax>;
}

impl<T: ?Sized> TransferSyntaxIndex for &T
where
    T: TransferSyntaxIndex,
{
    fn get(&self, uid: &str) -> Option<&TransferSyntax> {
        (**self).get(uid)
    }
}

impl TransferSyntax {
    /// Create a new transfer syntax descriptor.
    pub const fn new(
        uid: &'static str,
        name: &'static str,
        byte_order: Endianness,
        explicit_vr: bool,
        codec: Codec,
    ) -> Self {
        TransferSyntax {
            uid,
            name,
            byte_order,
            explicit_vr,
            codec,
        }
    }

    /// Obtain this transfer syntax' unique identifier.
    pub const fn uid(&self) -> &'static str {
        self.uid
    }

    /// Obtain the name of this transfer syntax.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Obtain this transfer syntax' expected endianness.
    pub const fn endianness(&self) -> Endianness {
        self.byte_order
    }

    /// Whether value representations are written in the data set.
    pub const fn explicit_vr(&self) -> bool {
        self.explicit_vr
    }

    /// Obtain the codec descriptor.
    pub const fn codec(&self) -> Codec {
        self.codec
    }

    /// Check whether this transfer syntax expects pixel data to be encapsulated.
    pub fn is_encapsulated_pixel_data(&self) -> bool {
        self.codec == Codec::EncapsulatedPixelData
    }

    /// Check whether the whole data set is deflated.
    pub fn is_deflated(&self) -> bool {
        self.codec == Codec::Deflated
    }

    /// Whether data sets in this transfer syntax can be read and written
    /// by this library.
    ///
    /// Encapsulated pixel data is kept in its fragments,
    /// so only deflated data sets are out of reach.
    pub fn is_supported(&self) -> bool {
        !self.is_deflated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static DUMMY: TransferSyntax = TransferSyntax::new(
        "1.2.840.10008.1.2.5",
        "RLE Lossless",
        Endianness::Little,
        true,
        Codec::EncapsulatedPixelData,
    );

    struct OneSyntax;

    impl TransferSyntaxIndex for OneSyntax {
        fn get(&self, uid: &str) -> Option<&TransferSyntax> {
            (uid.trim_end_matches(|c: char| c == '\0' || c == ' ') == DUMMY.uid()).then_some(&DUMMY)
        }
    }

    #[test]
    fn index_by_reference() {
        let index = OneSyntax;
        let by_ref = &index;
        let ts = by_ref.get("1.2.840.10008.1.2.5\0").unwrap();
        assert!(ts.is_encapsulated_pixel_data());
        assert!(ts.is_supported());
        assert_eq!(ts.endianness(), Endianness::Little);
        assert!(by_ref.get("1.2.840.10008.1.2").is_none());
    }
}
