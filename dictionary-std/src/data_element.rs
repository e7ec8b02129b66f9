//! The standard data element dictionary.
use crate::tags::ENTRIES;
use dcm_core::dictionary::{DataDictionary, DictionaryEntry, TagRange::*};
use dcm_core::header::Tag;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fmt::{Display, Formatter};

static DICT: Lazy<StandardDataDictionaryRegistry> = Lazy::new(init_dictionary);

/// Retrieve a singleton instance of the standard dictionary registry.
///
/// The unit type [`StandardDataDictionary`]
/// already provides access to this singleton,
/// so calling this is only needed to inspect the registry itself.
#[inline]
pub fn registry() -> &'static StandardDataDictionaryRegistry {
    &DICT
}

/// The data struct actually containing the standard dictionary.
#[derive(Debug)]
pub struct StandardDataDictionaryRegistry {
    /// mapping: name → entry
    by_name: HashMap<&'static str, &'static DictionaryEntry>,
    /// mapping: tag → entry
    by_tag: HashMap<Tag, &'static DictionaryEntry>,
    /// repeating elements of the form (ggxx, eeee). The `xx` portion is zeroed.
    repeating_ggxx: HashSet<Tag>,
    /// repeating elements of the form (gggg, eexx). The `xx` portion is zeroed.
    repeating_eexx: HashSet<Tag>,
}

impl StandardDataDictionaryRegistry {
    fn new() -> StandardDataDictionaryRegistry {
        StandardDataDictionaryRegistry {
            by_name: HashMap::with_capacity(ENTRIES.len()),
            by_tag: HashMap::with_capacity(ENTRIES.len()),
            repeating_ggxx: HashSet::new(),
            repeating_eexx: HashSet::new(),
        }
    }

    /// record the given dictionary entry reference
    fn index(&mut self, entry: &'static DictionaryEntry) -> &mut Self {
        // entries in the table always borrow their alias
        if let std::borrow::Cow::Borrowed(alias) = entry.alias {
            self.by_name.insert(alias, entry);
        }
        self.by_tag.insert(entry.tag.inner(), entry);
        match entry.tag {
            Group100(tag) => {
                self.repeating_ggxx.insert(tag);
            }
            Element100(tag) => {
                self.repeating_eexx.insert(tag);
            }
            Single(_) => {}
        }
        self
    }

    /// The number of attributes in the registry.
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

/// A data element dictionary which consults
/// the library's global DICOM attribute registry.
///
/// This is the type which would generally be used
/// whenever a data element dictionary is needed,
/// such as when reading DICOM objects.
///
/// The dictionary index is automatically initialized upon the first use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StandardDataDictionary;

impl StandardDataDictionary {
    fn indexed_tag(tag: Tag) -> Option<&'static DictionaryEntry> {
        let r = registry();

        r.by_tag
            .get(&tag)
            .or_else(|| {
                // check tags repeating in different groups
                let group_trimmed = Tag(tag.0 & 0xFF00, tag.1);
                if r.repeating_ggxx.contains(&group_trimmed) {
                    return r.by_tag.get(&group_trimmed);
                }
                // check tags repeating in different elements
                let elem_trimmed = Tag(tag.0, tag.1 & 0xFF00);
                if r.repeating_eexx.contains(&elem_trimmed) {
                    return r.by_tag.get(&elem_trimmed);
                }

                None
            })
            .copied()
    }

    /// Resolve a tag expression into a tag.
    ///
    /// Accepts `(GGGG,EEEE)`, `GGGG,EEEE` or an attribute keyword.
    pub fn parse_tag(&self, expr: &str) -> Option<Tag> {
        let bare = expr
            .strip_prefix('(')
            .and_then(|e| e.strip_suffix(')'))
            .unwrap_or(expr);
        if let Ok(tag) = bare.parse::<Tag>() {
            return Some(tag);
        }
        registry().by_name.get(expr).map(|e| e.tag.inner())
    }
}

impl DataDictionary for StandardDataDictionary {
    fn by_name(&self, name: &str) -> Option<&DictionaryEntry> {
        registry().by_name.get(name).copied()
    }

    fn by_tag(&self, tag: Tag) -> Option<&DictionaryEntry> {
        StandardDataDictionary::indexed_tag(tag)
    }
}

impl Display for StandardDataDictionary {
    fn fmt(&self, f: &mut Formatter) -> Result<(), fmt::Error> {
        f.write_str("Standard DICOM Data Dictionary")
    }
}

fn init_dictionary() -> StandardDataDictionaryRegistry {
    let mut d = StandardDataDictionaryRegistry::new();
    for entry in ENTRIES {
        d.index(entry);
    }
    d
}

#[cfg(test)]
mod tests {
    use super::StandardDataDictionary;
    use dcm_core::dictionary::{DataDictionary, ExtendedDictionary, TagRange::*};
    use dcm_core::header::{Tag, VR};

    // tests for just a few attributes to make sure that the entries
    // were well installed into the crate
    #[test]
    fn smoke_test() {
        let dict = StandardDataDictionary;

        let patient_name = dict.by_name("PatientName").unwrap();
        assert_eq!(patient_name.tag, Single(Tag(0x0010, 0x0010)));
        assert_eq!(patient_name.vr, VR::PN);

        let modality = dict.by_name("Modality").unwrap();
        assert_eq!(modality.tag, Single(Tag(0x0008, 0x0060)));
        assert_eq!(modality.vr, VR::CS);

        let pixel_data = dict
            .by_tag(Tag(0x7FE0, 0x0010))
            .expect("Pixel Data attribute should exist");
        assert_eq!(pixel_data.alias, "PixelData");
        assert_eq!(&pixel_data.vr_candidates()[..], &[VR::OB, VR::OW]);

        // repeated overlay data
        let overlay_data = dict
            .by_tag(Tag(0x60EE, 0x3000))
            .expect("Repeated Overlay Data attribute should exist");
        assert_eq!(overlay_data.tag, Group100(Tag(0x6000, 0x3000)));
        assert_eq!(overlay_data.alias, "OverlayData");
    }

    #[test]
    fn constants_available() {
        use crate::tags::*;
        assert_eq!(PATIENT_NAME, Tag(0x0010, 0x0010));
        assert_eq!(MODALITY, Tag(0x0008, 0x0060));
        assert_eq!(PIXEL_DATA, Tag(0x7FE0, 0x0010));
        assert_eq!(STATUS, Tag(0x0000, 0x0900));
        assert_eq!(COMMAND_GROUP_LENGTH, Tag(0x0000, 0x0000));
        assert_eq!(FILE_META_INFORMATION_GROUP_LENGTH, Tag(0x0002, 0x0000));
    }

    #[test]
    fn can_parse_tags() {
        let dict = StandardDataDictionary;

        assert_eq!(dict.parse_tag("(7FE0,0010)"), Some(crate::tags::PIXEL_DATA));
        assert_eq!(dict.parse_tag("0010,21C0"), Some(Tag(0x0010, 0x21C0)));
        assert_eq!(dict.parse_tag("StudyDate"), Some(crate::tags::STUDY_DATE));

        // can't parse these
        assert_eq!(dict.parse_tag(""), None);
        assert_eq!(dict.parse_tag("1111,2222,3333"), None);
        assert_eq!(dict.parse_tag("0080 0010"), None);
        assert_eq!(dict.parse_tag("STUDYDATE"), None);
    }

    #[test]
    fn lookup_falls_back_for_unlisted_tags() {
        let dict = StandardDataDictionary;

        let lookup = dict.lookup(Tag(0x7FE0, 0x0000));
        assert_eq!(lookup.name, "GroupLength");
        assert_eq!(lookup.vr(), VR::UL);

        assert_eq!(dict.lookup(Tag(0x0009, 0x0010)).name, "PrivateCreator");
        assert_eq!(dict.lookup(Tag(0x00ED, 0x00FF)).vr(), VR::LO);
        assert_eq!(dict.lookup(Tag(0x0029, 0x1010)).name, "Private");
        assert_eq!(dict.lookup(Tag(0x0010, 0x9999)).name, "Unknown");
    }

    #[test]
    fn retired_attributes() {
        let dict = StandardDataDictionary;
        assert!(dict.is_retired(crate::tags::RECOGNITION_CODE));
        assert!(dict.is_retired(Tag(0x5010, 0x3000)));
        assert!(!dict.is_retired(crate::tags::PATIENT_NAME));
    }

    #[test]
    fn extended_with_private_attributes() {
        let dict = ExtendedDictionary::new(StandardDataDictionary).with_entry(
            Tag(0x0029, 0x1010),
            "VendorCsaHeader",
            VR::OB,
            "1",
        );
        assert_eq!(dict.lookup(Tag(0x0029, 0x1010)).name, "VendorCsaHeader");
        // base entries still resolve
        assert_eq!(dict.lookup(crate::tags::PATIENT_ID).vr(), VR::LO);
    }
}
