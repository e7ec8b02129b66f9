//! This module contains the concept of a DICOM data dictionary.
//!
//! A dictionary maps tags to their attribute name, value representation,
//! value multiplicity and retirement status.
//! The standard table lives in a separate crate;
//! this module defines the contract shared by every dictionary
//! and the fallback naming of tags unknown to it.

use crate::header::{Tag, VR};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::Debug;

/// The range of tags covered by a dictionary entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TagRange {
    /// Only a specific tag
    Single(Tag),
    /// The two rightmost digits of the _group_ portion are open:
    /// `(GGxx,EEEE)`
    Group100(Tag),
    /// The two rightmost digits of the _element_ portion are open:
    /// `(GGGG,EExx)`
    Element100(Tag),
}

impl TagRange {
    /// Retrieve the inner tag representation of this range.
    ///
    /// Open components are zeroed out.
    pub fn inner(self) -> Tag {
        match self {
            TagRange::Single(tag) => tag,
            TagRange::Group100(tag) => tag,
            TagRange::Element100(tag) => tag,
        }
    }

    /// Whether the given tag falls within this range.
    pub fn contains(self, tag: Tag) -> bool {
        match self {
            TagRange::Single(t) => t == tag,
            TagRange::Group100(t) => t.0 == tag.0 & 0xFF00 && t.1 == tag.1,
            TagRange::Element100(t) => t.0 == tag.0 && t.1 == tag.1 & 0xFF00,
        }
    }
}

/// A dictionary entry, representing a DICOM attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEntry {
    /// The attribute tag or tag range
    pub tag: TagRange,
    /// The alias of the attribute, with no spaces, in UpperCamelCase
    pub alias: Cow<'static, str>,
    /// The _typical_ value representation of the attribute
    pub vr: VR,
    /// An alternative value representation, when the standard admits two
    /// (such as `OB or OW`)
    pub alt_vr: Option<VR>,
    /// The value multiplicity, such as `1`, `1-n` or `2-2n`
    pub vm: Cow<'static, str>,
    /// Whether the attribute is retired
    pub retired: bool,
}

impl DictionaryEntry {
    /// Create an entry for a single tag, using borrowed static strings.
    pub const fn new(tag: Tag, alias: &'static str, vr: VR, vm: &'static str) -> Self {
        DictionaryEntry {
            tag: TagRange::Single(tag),
            alias: Cow::Borrowed(alias),
            vr,
            alt_vr: None,
            vm: Cow::Borrowed(vm),
            retired: false,
        }
    }

    /// Create an entry covering a tag range.
    pub const fn ranged(tag: TagRange, alias: &'static str, vr: VR, vm: &'static str) -> Self {
        DictionaryEntry {
            tag,
            alias: Cow::Borrowed(alias),
            vr,
            alt_vr: None,
            vm: Cow::Borrowed(vm),
            retired: false,
        }
    }

    /// Mark the entry as retired.
    pub const fn retired(mut self) -> Self {
        self.retired = true;
        self
    }

    /// Declare an alternative value representation.
    pub const fn or_vr(mut self, vr: VR) -> Self {
        self.alt_vr = Some(vr);
        self
    }

    /// All value representations admitted for this attribute.
    pub fn vr_candidates(&self) -> SmallVec<[VR; 2]> {
        let mut out = SmallVec::new();
        out.push(self.vr);
        out.extend(self.alt_vr);
        out
    }
}

/// The outcome of a dictionary lookup, including the fallback cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// attribute name (alias), or one of
    /// `GroupLength`, `PrivateCreator`, `Private`, `Unknown`
    pub name: Cow<'static, str>,
    /// value representation candidates, the first being the typical one
    pub vr: SmallVec<[VR; 2]>,
    /// value multiplicity
    pub vm: Cow<'static, str>,
    /// whether the attribute is retired
    pub retired: bool,
}

impl Lookup {
    /// The typical value representation.
    pub fn vr(&self) -> VR {
        self.vr.first().copied().unwrap_or(VR::UN)
    }
}

/// Type trait for a dictionary of DICOM attributes.
///
/// The methods herein have no generic parameters,
/// so as to enable being used as a trait object.
pub trait DataDictionary: Debug {
    /// Fetch an entry by its usual alias (e.g. "PatientName" or "SOPInstanceUID").
    /// Aliases are case sensitive and not separated by spaces.
    fn by_name(&self, name: &str) -> Option<&DictionaryEntry>;

    /// Fetch an entry by its tag.
    fn by_tag(&self, tag: Tag) -> Option<&DictionaryEntry>;

    /// Look up a tag, falling back to generic descriptions
    /// for group lengths, private tags and unknown tags.
    fn lookup(&self, tag: Tag) -> Lookup {
        if let Some(entry) = self.by_tag(tag) {
            return Lookup {
                name: entry.alias.clone(),
                vr: entry.vr_candidates(),
                vm: entry.vm.clone(),
                retired: entry.retired,
            };
        }
        let (name, vr) = if tag.is_group_length() {
            ("GroupLength", VR::UL)
        } else if tag.is_private_creator() {
            ("PrivateCreator", VR::LO)
        } else if tag.is_private() {
            ("Private", VR::UN)
        } else {
            ("Unknown", VR::UN)
        };
        Lookup {
            name: Cow::Borrowed(name),
            vr: SmallVec::from_elem(vr, 1),
            vm: Cow::Borrowed("1"),
            retired: false,
        }
    }

    /// Whether the tag is known to be retired.
    fn is_retired(&self, tag: Tag) -> bool {
        self.by_tag(tag).map(|e| e.retired).unwrap_or(false)
    }
}

impl<D> DataDictionary for &'_ D
where
    D: DataDictionary + ?Sized,
{
    fn by_name(&self, name: &str) -> Option<&DictionaryEntry> {
        (**self).by_name(name)
    }

    fn by_tag(&self, tag: Tag) -> Option<&DictionaryEntry> {
        (**self).by_tag(tag)
    }
}

impl<D> DataDictionary for std::sync::Arc<D>
where
    D: DataDictionary + ?Sized,
{
    fn by_name(&self, name: &str) -> Option<&DictionaryEntry> {
        (**self).by_name(name)
    }

    fn by_tag(&self, tag: Tag) -> Option<&DictionaryEntry> {
        (**self).by_tag(tag)
    }
}

/// A dictionary extending a base dictionary with custom entries.
///
/// Entries are added at initialization time,
/// before the dictionary is shared with any decoder.
/// Custom entries take precedence over the base dictionary.
#[derive(Debug, Clone)]
pub struct ExtendedDictionary<D> {
    base: D,
    by_tag: HashMap<Tag, DictionaryEntry>,
    by_name: HashMap<String, Tag>,
}

impl<D> ExtendedDictionary<D>
where
    D: DataDictionary,
{
    /// Wrap a base dictionary.
    pub fn new(base: D) -> Self {
        ExtendedDictionary {
            base,
            by_tag: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Add or replace an entry for a single tag.
    pub fn add_entry(&mut self, tag: Tag, alias: impl Into<String>, vr: VR, vm: impl Into<String>) {
        let alias = alias.into();
        self.by_name.insert(alias.clone(), tag);
        self.by_tag.insert(
            tag,
            DictionaryEntry {
                tag: TagRange::Single(tag),
                alias: Cow::Owned(alias),
                vr,
                alt_vr: None,
                vm: Cow::Owned(vm.into()),
                retired: false,
            },
        );
    }

    /// Builder-style variant of [`add_entry`](Self::add_entry).
    pub fn with_entry(mut self, tag: Tag, alias: impl Into<String>, vr: VR, vm: impl Into<String>) -> Self {
        self.add_entry(tag, alias, vr, vm);
        self
    }
}

impl<D> DataDictionary for ExtendedDictionary<D>
where
    D: DataDictionary,
{
    fn by_name(&self, name: &str) -> Option<&DictionaryEntry> {
        self.by_name
            .get(name)
            .and_then(|tag| self.by_tag.get(tag))
            .or_else(|| self.base.by_name(name))
    }

    fn by_tag(&self, tag: Tag) -> Option<&DictionaryEntry> {
        self.by_tag.get(&tag).or_else(|| self.base.by_tag(tag))
    }
}

/// A dictionary without any entries.
///
/// Every lookup resolves to the generic fallbacks.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StubDataDictionary;

impl DataDictionary for StubDataDictionary {
    fn by_name(&self, _: &str) -> Option<&DictionaryEntry> {
        None
    }

    fn by_tag(&self, _: Tag) -> Option<&DictionaryEntry> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_lookups() {
        let dict = StubDataDictionary;
        assert_eq!(dict.lookup(Tag(0x0010, 0x0000)).name, "GroupLength");
        assert_eq!(dict.lookup(Tag(0x0010, 0x0000)).vr(), VR::UL);
        assert_eq!(dict.lookup(Tag(0x0009, 0x0010)).name, "PrivateCreator");
        assert_eq!(dict.lookup(Tag(0x0009, 0x1001)).name, "Private");
        assert_eq!(dict.lookup(Tag(0x0010, 0x9999)).name, "Unknown");
        assert_eq!(dict.lookup(Tag(0x0010, 0x9999)).vr(), VR::UN);
    }

    #[test]
    fn repeating_group_range() {
        let range = TagRange::Group100(Tag(0x5000, 0x0005));
        assert!(range.contains(Tag(0x5000, 0x0005)));
        assert!(range.contains(Tag(0x50FE, 0x0005)));
        assert!(!range.contains(Tag(0x5100, 0x0005)));
        assert!(!range.contains(Tag(0x5002, 0x0006)));
    }

    #[test]
    fn custom_entries_take_precedence() {
        let dict = ExtendedDictionary::new(StubDataDictionary).with_entry(
            Tag(0x0009, 0x1001),
            "VendorThing",
            VR::LO,
            "1",
        );
        let lookup = dict.lookup(Tag(0x0009, 0x1001));
        assert_eq!(lookup.name, "VendorThing");
        assert_eq!(lookup.vr(), VR::LO);
        assert_eq!(dict.by_name("VendorThing").map(|e| e.tag), Some(TagRange::Single(Tag(0x0009, 0x1001))));
    }
}
