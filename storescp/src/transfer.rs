//! Accepted storage transfer options

use dcm_dictionary_std::uids;
use dcm_transfer_syntax_registry::entries;

/// The abstract syntaxes accepted by the storage service,
/// verification included.
pub fn abstract_syntaxes() -> impl Iterator<Item = &'static str> {
    std::iter::once(uids::VERIFICATION).chain(uids::STORAGE_SOP_CLASSES.iter().copied())
}

/// The transfer syntaxes accepted by the storage service.
///
/// Native syntaxes come first.
pub fn transfer_syntaxes(uncompressed_only: bool) -> Vec<&'static str> {
    let mut out = vec![
        entries::EXPLICIT_VR_LITTLE_ENDIAN.uid(),
        entries::IMPLICIT_VR_LITTLE_ENDIAN.uid(),
        entries::EXPLICIT_VR_BIG_ENDIAN.uid(),
    ];
    if !uncompressed_only {
        out.extend([
            entries::JPEG_BASELINE.uid(),
            entries::JPEG_EXTENDED.uid(),
            entries::JPEG_LOSSLESS_NON_HIERARCHICAL.uid(),
            entries::JPEG_LOSSLESS_NON_HIERARCHICAL_FIRST_ORDER_PREDICTION.uid(),
            entries::JPEG_LS_LOSSLESS_IMAGE_COMPRESSION.uid(),
            entries::JPEG_LS_LOSSY_IMAGE_COMPRESSION.uid(),
            entries::JPEG_2000_IMAGE_COMPRESSION_LOSSLESS_ONLY.uid(),
            entries::JPEG_2000_IMAGE_COMPRESSION.uid(),
            entries::RLE_LOSSLESS.uid(),
            entries::MPEG2_MAIN_PROFILE_MAIN_LEVEL.uid(),
            entries::MPEG2_MAIN_PROFILE_HIGH_LEVEL.uid(),
            entries::MPEG4_AVC_H264_HIGH_PROFILE.uid(),
        ]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncompressed_only() {
        let all = transfer_syntaxes(false);
        let native = transfer_syntaxes(true);
        assert_eq!(native.len(), 3);
        assert!(all.len() > native.len());
        assert!(all.starts_with(&native));
        assert!(!native.contains(&entries::RLE_LOSSLESS.uid()));
    }

    #[test]
    fn verification_is_accepted() {
        assert_eq!(abstract_syntaxes().next(), Some(uids::VERIFICATION));
        assert!(abstract_syntaxes().any(|uid| uid == uids::CT_IMAGE_STORAGE));
    }
}
