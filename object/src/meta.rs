//! Module containing the DICOM file meta information group.
//!
//! Meta elements (group `0002`) live in the root of the object tree
//! like any other element,
//! but they are always encoded in explicit VR little endian
//! and written before the data set.
use crate::mem::{DicomObject, Parent};
use crate::write::Encoder;
use crate::{AccessError, ModifyError, WriteError, IMPLEMENTATION_CLASS_UID, IMPLEMENTATION_VERSION_NAME};
use dcm_core::dictionary::DataDictionary;
use dcm_core::uid::{generate_uid, DEFAULT_UID_ROOT};
use dcm_core::{Tag, Value};
use dcm_dictionary_std::tags;
use tracing::debug;

/// DICOM File Meta Information Table.
///
/// A read-only snapshot of the file meta group of an object, as
/// specified in [1].
///
/// [1]: http://dicom.nema.org/medical/dicom/current/output/chtml/part06/chapter_7.html
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetaTable {
    /// File Meta Information Group Length
    pub information_group_length: u32,
    /// File Meta Information Version
    pub information_version: [u8; 2],
    /// Media Storage SOP Class UID
    pub media_storage_sop_class_uid: String,
    /// Media Storage SOP Instance UID
    pub media_storage_sop_instance_uid: String,
    /// Transfer Syntax UID
    pub transfer_syntax: String,
    /// Implementation Class UID
    pub implementation_class_uid: String,

    /// Implementation Version Name
    pub implementation_version_name: Option<String>,
    /// Source Application Entity Title
    pub source_application_entity_title: Option<String>,
}

impl FileMetaTable {
    /// Collect the file meta group of an object.
    ///
    /// Fails if a required element is missing.
    pub fn from_object<D>(obj: &DicomObject<D>) -> Result<Self, AccessError>
    where
        D: DataDictionary,
    {
        let text = |tag: Tag| obj.value(tag).map(|v| v.to_str().into_owned());
        let version = obj.value(tags::FILE_META_INFORMATION_VERSION)?;
        let version = match version.to_multi_int().as_deref() {
            Ok([a, b, ..]) => [*a as u8, *b as u8],
            _ => [0, 1],
        };
        Ok(FileMetaTable {
            information_group_length: obj
                .value(tags::FILE_META_INFORMATION_GROUP_LENGTH)
                .ok()
                .and_then(|v| v.to_int().ok())
                .unwrap_or(0),
            information_version: version,
            media_storage_sop_class_uid: text(tags::MEDIA_STORAGE_SOP_CLASS_UID)?,
            media_storage_sop_instance_uid: text(tags::MEDIA_STORAGE_SOP_INSTANCE_UID)?,
            transfer_syntax: text(tags::TRANSFER_SYNTAX_UID)?,
            implementation_class_uid: text(tags::IMPLEMENTATION_CLASS_UID)?,
            implementation_version_name: text(tags::IMPLEMENTATION_VERSION_NAME).ok(),
            source_application_entity_title: text(tags::SOURCE_APPLICATION_ENTITY_TITLE).ok(),
        })
    }
}

impl<D> DicomObject<D>
where
    D: DataDictionary,
{
    /// Fill in the file meta group for writing with the given transfer syntax.
    ///
    /// The transfer syntax UID is always replaced.
    /// Other required elements are only added when missing:
    /// SOP class and instance UIDs are taken from the data set
    /// (a new instance UID is generated if there is none),
    /// implementation identifiers from this library.
    pub fn prepare_meta(&mut self, ts_uid: &str) -> Result<(), ModifyError> {
        if !self.exists(Parent::Root, tags::FILE_META_INFORMATION_GROUP_LENGTH) {
            self.set_value(tags::FILE_META_INFORMATION_GROUP_LENGTH, 0_u32)?;
        }
        if !self.exists(Parent::Root, tags::FILE_META_INFORMATION_VERSION) {
            self.set_value(tags::FILE_META_INFORMATION_VERSION, vec![0_u8, 1])?;
        }
        self.fill_from(tags::MEDIA_STORAGE_SOP_CLASS_UID, tags::SOP_CLASS_UID)?;
        if !self.fill_from(tags::MEDIA_STORAGE_SOP_INSTANCE_UID, tags::SOP_INSTANCE_UID)? {
            let uid = generate_uid(DEFAULT_UID_ROOT, 1);
            debug!("Generated SOP instance UID {}", uid);
            self.set_value(tags::MEDIA_STORAGE_SOP_INSTANCE_UID, uid)?;
        }
        self.set_value(tags::TRANSFER_SYNTAX_UID, ts_uid)?;
        if !self.exists(Parent::Root, tags::IMPLEMENTATION_CLASS_UID) {
            self.set_value(tags::IMPLEMENTATION_CLASS_UID, IMPLEMENTATION_CLASS_UID)?;
        }
        if !self.exists(Parent::Root, tags::IMPLEMENTATION_VERSION_NAME) {
            self.set_value(tags::IMPLEMENTATION_VERSION_NAME, IMPLEMENTATION_VERSION_NAME)?;
        }
        Ok(())
    }

    /// Copy the value of `source` into `target` unless `target` exists.
    ///
    /// Returns whether `target` exists afterwards.
    fn fill_from(&mut self, target: Tag, source: Tag) -> Result<bool, ModifyError> {
        if self.exists(Parent::Root, target) {
            return Ok(true);
        }
        match self.value(source) {
            Ok(value) if !value.is_empty() => {
                self.set_value(target, Value::from(value.to_str().into_owned()))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Encode the file meta group in explicit VR little endian,
    /// with its group length recomputed.
    pub fn encode_meta(&self) -> Result<Vec<u8>, WriteError> {
        Encoder::EXPLICIT_LE.encode_children(self, Parent::Root, &|tag: Tag| tag.group() == 0x0002)
    }

    /// Collect the file meta group into a [`FileMetaTable`].
    pub fn meta(&self) -> Result<FileMetaTable, AccessError> {
        FileMetaTable::from_object(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DefaultDicomObject;

    #[test]
    fn prepare_meta_fills_from_data_set() {
        let mut obj = DefaultDicomObject::new();
        obj.set_value(tags::SOP_CLASS_UID, "1.2.840.10008.5.1.4.1.1.7").unwrap();
        obj.set_value(tags::SOP_INSTANCE_UID, "1.2.3.4").unwrap();
        obj.prepare_meta("1.2.840.10008.1.2.1").unwrap();

        let meta = obj.meta().unwrap();
        assert_eq!(meta.information_version, [0, 1]);
        assert_eq!(meta.media_storage_sop_class_uid, "1.2.840.10008.5.1.4.1.1.7");
        assert_eq!(meta.media_storage_sop_instance_uid, "1.2.3.4");
        assert_eq!(meta.transfer_syntax, "1.2.840.10008.1.2.1");
        assert_eq!(meta.implementation_class_uid, IMPLEMENTATION_CLASS_UID);
        assert_eq!(
            meta.implementation_version_name.as_deref(),
            Some(IMPLEMENTATION_VERSION_NAME)
        );
    }

    #[test]
    fn prepare_meta_generates_instance_uid() {
        let mut obj = DefaultDicomObject::new();
        obj.prepare_meta("1.2.840.10008.1.2").unwrap();
        let uid = obj
            .value(tags::MEDIA_STORAGE_SOP_INSTANCE_UID)
            .unwrap()
            .to_str()
            .into_owned();
        assert!(uid.starts_with(DEFAULT_UID_ROOT));
        assert!(obj.meta().is_err(), "no SOP class UID to fill in");
    }

    #[test]
    fn encoded_meta_group_length() {
        let mut obj = DefaultDicomObject::new();
        obj.set_value(tags::SOP_CLASS_UID, "1.2").unwrap();
        obj.set_value(tags::SOP_INSTANCE_UID, "1.2.3").unwrap();
        obj.prepare_meta("1.2.840.10008.1.2").unwrap();
        let bytes = obj.encode_meta().unwrap();

        // (0002,0000) UL 4
        assert_eq!(&bytes[..8], &[0x02, 0x00, 0x00, 0x00, b'U', b'L', 0x04, 0x00]);
        let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        assert_eq!(len as usize, bytes.len() - 12);
        // the data set leaves the meta group out
        let data_set = obj
            .encode_dataset(&dcm_transfer_syntax_registry::entries::IMPLICIT_VR_LITTLE_ENDIAN)
            .unwrap();
        assert_eq!(data_set[0..2], [0x08, 0x00]);
    }
}
