//! Writing received objects to disk.
use std::path::PathBuf;

use dcm_dictionary_std::tags;
use dcm_object::DefaultDicomObject;
use dcm_ul::{dimse::status, provider::StoreHandler};
use tracing::{info, warn};

/// Stores each received object in a directory,
/// named after its SOP instance UID.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    out_dir: PathBuf,
}

impl DirectoryStore {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        DirectoryStore {
            out_dir: out_dir.into(),
        }
    }

    fn file_name(obj: &DefaultDicomObject) -> Option<String> {
        let uid = obj.value(tags::SOP_INSTANCE_UID).ok()?;
        let uid = uid.to_str();
        let uid = uid.trim_end_matches(|c: char| c == '\0' || c == ' ');
        // UIDs only hold digits and dots
        if uid.is_empty() || !uid.chars().all(|c| c.is_ascii_digit() || c == '.') {
            return None;
        }
        Some(format!("{}.dcm", uid))
    }
}

impl StoreHandler for DirectoryStore {
    fn store(&self, calling_ae_title: &str, mut obj: DefaultDicomObject) -> u16 {
        let Some(file_name) = Self::file_name(&obj) else {
            warn!("Object from {} has no valid SOP Instance UID", calling_ae_title);
            return status::PROCESSING_FAILURE;
        };
        let path = self.out_dir.join(file_name);
        match obj.write_to_file(&path) {
            Ok(()) => {
                info!("Stored {} from {}", path.display(), calling_ae_title);
                status::SUCCESS
            }
            Err(e) => {
                warn!(
                    "Could not save {}: {}",
                    path.display(),
                    snafu::Report::from_error(e)
                );
                status::OUT_OF_RESOURCES
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcm_dictionary_std::uids;

    #[test]
    fn store_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());

        let mut obj = DefaultDicomObject::new();
        obj.set_value(tags::SOP_CLASS_UID, uids::SECONDARY_CAPTURE_IMAGE_STORAGE)
            .unwrap();
        obj.set_value(tags::SOP_INSTANCE_UID, "1.2.3.4.5").unwrap();
        obj.set_value(tags::PATIENT_NAME, "Doe^John").unwrap();
        assert_eq!(store.store("SCU", obj), status::SUCCESS);

        let path = dir.path().join("1.2.3.4.5.dcm");
        let saved = dcm_object::open_file(&path).unwrap();
        assert_eq!(
            saved.value(tags::PATIENT_NAME).unwrap().to_str().trim_end(),
            "Doe^John"
        );
    }

    #[test]
    fn reject_bad_instance_uids() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let mut obj = DefaultDicomObject::new();
        obj.set_value(tags::SOP_INSTANCE_UID, "../../etc").unwrap();
        assert_eq!(store.store("SCU", obj), status::PROCESSING_FAILURE);
        assert_eq!(
            store.store("SCU", DefaultDicomObject::new()),
            status::PROCESSING_FAILURE
        );
    }
}
