//! This module contains the data types of a DICOM element header:
//! tags, value representations and value lengths.

use snafu::{ensure, Snafu};
use std::cmp::Ordering;
use std::fmt;
use std::str::{from_utf8, FromStr};

/// Idiomatic alias for a tag's group number.
pub type GroupNumber = u16;
/// Idiomatic alias for a tag's element number.
pub type ElementNumber = u16;

/// An error which may occur when parsing a tag from its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[non_exhaustive]
pub enum ParseTagError {
    /// the tag must be exactly 9 characters long
    #[snafu(display("tag `{}` must have 9 characters, found {}", text, len))]
    Length { text: String, len: usize },
    /// the group and element must be separated by a comma
    #[snafu(display("tag `{}` is missing the comma at index 4", text))]
    Separator { text: String },
    /// group and element must be hexadecimal
    #[snafu(display("tag `{}` contains non-hexadecimal digits", text))]
    Digits { text: String },
}

/// The data type for DICOM data element tags.
///
/// The textual form of a tag is the 9 character string `GGGG,EEEE`,
/// with the group and element numbers in hexadecimal.
/// Parsing is case insensitive,
/// while formatting always produces upper case digits.
///
/// ```
/// # use dcm_core::Tag;
/// let tag: Tag = "0010,0010".parse()?;
/// assert_eq!(tag, Tag(0x0010, 0x0010));
/// assert_eq!(tag.to_string(), "0010,0010");
/// # Ok::<(), dcm_core::header::ParseTagError>(())
/// ```
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub struct Tag(pub GroupNumber, pub ElementNumber);

impl Tag {
    /// Item (FFFE,E000)
    pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
    /// Item Delimitation Item (FFFE,E00D)
    pub const ITEM_DELIMITER: Tag = Tag(0xFFFE, 0xE00D);
    /// Sequence Delimitation Item (FFFE,E0DD)
    pub const SEQUENCE_DELIMITER: Tag = Tag(0xFFFE, 0xE0DD);
    /// Pixel Data (7FE0,0010)
    pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);
    /// Data Set Trailing Padding (FFFC,FFFC)
    pub const TRAILING_PADDING: Tag = Tag(0xFFFC, 0xFFFC);

    /// Getter for the tag's group value.
    #[inline]
    pub fn group(self) -> GroupNumber {
        self.0
    }

    /// Getter for the tag's element value.
    #[inline]
    pub fn element(self) -> ElementNumber {
        self.1
    }

    /// Parse a tag from its `GGGG,EEEE` form.
    pub fn parse(text: &str) -> Result<Tag, ParseTagError> {
        text.parse()
    }

    /// Whether the tag belongs to a private group (odd group number).
    #[inline]
    pub fn is_private(self) -> bool {
        self.0 % 2 == 1
    }

    /// Whether this is a group length tag (element number 0000).
    #[inline]
    pub fn is_group_length(self) -> bool {
        self.1 == 0
    }

    /// Whether this is a private creator tag (gggg,0010-00FF in a private group).
    #[inline]
    pub fn is_private_creator(self) -> bool {
        self.is_private() && (0x0010..=0x00FF).contains(&self.1)
    }

    /// The group length tag of this tag's group.
    ///
    /// ```
    /// # use dcm_core::Tag;
    /// assert_eq!(Tag(0x0010, 0x0020).group_length_tag(), Tag(0x0010, 0x0000));
    /// ```
    #[inline]
    pub fn group_length_tag(self) -> Tag {
        Tag(self.0, 0x0000)
    }

    /// Whether this is the item tag.
    #[inline]
    pub fn is_item(self) -> bool {
        self == Tag::ITEM
    }

    /// Whether this is either the item or sequence delimiter.
    #[inline]
    pub fn is_delimiter(self) -> bool {
        self == Tag::ITEM_DELIMITER || self == Tag::SEQUENCE_DELIMITER
    }

    /// Whether the tag is in the structural group FFFE,
    /// whose elements never carry a value representation.
    #[inline]
    pub fn is_structural(self) -> bool {
        self.0 == 0xFFFE
    }
}

/// Check whether the given text is a valid tag string (`GGGG,EEEE`).
///
/// ```
/// # use dcm_core::is_valid_tag;
/// assert!(is_valid_tag("0010,0010"));
/// assert!(!is_valid_tag("0010,00000"));
/// assert!(!is_valid_tag(",0000"));
/// assert!(!is_valid_tag("000G,0000"));
/// ```
pub fn is_valid_tag(text: &str) -> bool {
    text.parse::<Tag>().is_ok()
}

impl FromStr for Tag {
    type Err = ParseTagError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let bytes = text.as_bytes();
        ensure!(
            bytes.len() == 9,
            LengthSnafu {
                text,
                len: bytes.len()
            }
        );
        ensure!(bytes[4] == b',', SeparatorSnafu { text });
        let hex = |part: &[u8]| -> Result<u16, ParseTagError> {
            ensure!(
                part.iter().all(u8::is_ascii_hexdigit),
                DigitsSnafu { text }
            );
            // ascii hex digits were checked above
            let part = from_utf8(part).map_err(|_| ParseTagError::Digits { text: text.into() })?;
            u16::from_str_radix(part, 16).map_err(|_| ParseTagError::Digits { text: text.into() })
        };
        Ok(Tag(hex(&bytes[0..4])?, hex(&bytes[5..9])?))
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({:#06X?}, {:#06X?})", self.0, self.1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04X},{:04X}", self.0, self.1)
    }
}

impl PartialEq<(u16, u16)> for Tag {
    fn eq(&self, other: &(u16, u16)) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl From<(u16, u16)> for Tag {
    #[inline]
    fn from(value: (u16, u16)) -> Tag {
        Tag(value.0, value.1)
    }
}

impl From<[u16; 2]> for Tag {
    #[inline]
    fn from(value: [u16; 2]) -> Tag {
        Tag(value[0], value[1])
    }
}

/// The kind of in-memory value that a value representation converts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// signed or unsigned integers
    Integer,
    /// single or double precision floats
    Float,
    /// text, including attribute tags in their `GGGG,EEEE` form
    Text,
    /// uninterpreted bytes
    Bytes,
}

/// An enum type for a DICOM value representation.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Ord, PartialOrd)]
pub enum VR {
    /// Application Entity
    AE,
    /// Age String
    AS,
    /// Attribute Tag
    AT,
    /// Code String
    CS,
    /// Date
    DA,
    /// Decimal String
    DS,
    /// Date Time
    DT,
    /// Floating Point Single
    FL,
    /// Floating Point Double
    FD,
    /// Integer String
    IS,
    /// Long String
    LO,
    /// Long Text
    LT,
    /// Other Byte
    OB,
    /// Other Double
    OD,
    /// Other Float
    OF,
    /// Other Long
    OL,
    /// Other Word
    OW,
    /// Person Name
    PN,
    /// Short String
    SH,
    /// Signed Long
    SL,
    /// Sequence of Items
    SQ,
    /// Signed Short
    SS,
    /// Short Text
    ST,
    /// Time
    TM,
    /// Unlimited Characters
    UC,
    /// Unique Identifier (UID)
    UI,
    /// Unsigned Long
    UL,
    /// Unknown
    UN,
    /// Universal Resource Identifier or Universal Resource Locator (URI/URL)
    UR,
    /// Unsigned Short
    US,
    /// Unlimited Text
    UT,
}

impl VR {
    /// Obtain the value representation corresponding to the given two bytes.
    /// Each byte should represent an alphabetic character in upper case.
    pub fn from_binary(chars: [u8; 2]) -> Option<Self> {
        from_utf8(chars.as_ref())
            .ok()
            .and_then(|s| VR::from_str(s).ok())
    }

    /// Retrieve a string representation of this VR.
    pub fn to_str(self) -> &'static str {
        use VR::*;
        match self {
            AE => "AE",
            AS => "AS",
            AT => "AT",
            CS => "CS",
            DA => "DA",
            DS => "DS",
            DT => "DT",
            FL => "FL",
            FD => "FD",
            IS => "IS",
            LO => "LO",
            LT => "LT",
            OB => "OB",
            OD => "OD",
            OF => "OF",
            OL => "OL",
            OW => "OW",
            PN => "PN",
            SH => "SH",
            SL => "SL",
            SQ => "SQ",
            SS => "SS",
            ST => "ST",
            TM => "TM",
            UC => "UC",
            UI => "UI",
            UL => "UL",
            UN => "UN",
            UR => "UR",
            US => "US",
            UT => "UT",
        }
    }

    /// Retrieve a copy of this VR's byte representation.
    /// The function returns two alphabetic characters in upper case.
    pub fn to_bytes(self) -> [u8; 2] {
        let bytes = self.to_str().as_bytes();
        [bytes[0], bytes[1]]
    }

    /// Whether this VR is written with a 2-byte length field
    /// in explicit VR transfer syntaxes.
    /// All other VRs take 2 reserved bytes followed by a 4-byte length.
    pub fn has_short_length(self) -> bool {
        use VR::*;
        matches!(
            self,
            AE | AS | AT | CS | DA | DS | DT | FL | FD | IS | LO | LT | PN | SH | SL | SS | ST
                | TM | UI | UL | US
        )
    }

    /// The kind of value which elements of this VR convert to.
    ///
    /// Integer VRs: US, SS, UL, SL, OB, OW, OL.
    /// Float VRs: FL, FD, OF, OD.
    /// UN holds raw bytes, everything else is text.
    pub fn value_kind(self) -> ValueKind {
        use VR::*;
        match self {
            US | SS | UL | SL | OB | OW | OL => ValueKind::Integer,
            FL | FD | OF | OD => ValueKind::Float,
            UN => ValueKind::Bytes,
            _ => ValueKind::Text,
        }
    }

    /// The byte used to pad values of this VR to an even length.
    pub fn padding(self) -> u8 {
        match self {
            VR::UI | VR::OB | VR::UN => 0,
            _ => b' ',
        }
    }

    /// The size in bytes of each binary number of this VR,
    /// or `None` for textual VRs.
    pub fn unit_size(self) -> Option<usize> {
        use VR::*;
        match self {
            OB | UN => Some(1),
            US | SS | OW | AT => Some(2),
            UL | SL | FL | OF | OL => Some(4),
            FD | OD => Some(8),
            _ => None,
        }
    }
}

/// Obtain the value representation corresponding to the given string.
/// The string should hold exactly two alphabetic characters
/// in upper case, otherwise no match is made.
impl FromStr for VR {
    type Err = &'static str;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        use VR::*;
        match string {
            "AE" => Ok(AE),
            "AS" => Ok(AS),
            "AT" => Ok(AT),
            "CS" => Ok(CS),
            "DA" => Ok(DA),
            "DS" => Ok(DS),
            "DT" => Ok(DT),
            "FL" => Ok(FL),
            "FD" => Ok(FD),
            "IS" => Ok(IS),
            "LO" => Ok(LO),
            "LT" => Ok(LT),
            "OB" => Ok(OB),
            "OD" => Ok(OD),
            "OF" => Ok(OF),
            "OL" => Ok(OL),
            "OW" => Ok(OW),
            "PN" => Ok(PN),
            "SH" => Ok(SH),
            "SL" => Ok(SL),
            "SQ" => Ok(SQ),
            "SS" => Ok(SS),
            "ST" => Ok(ST),
            "TM" => Ok(TM),
            "UC" => Ok(UC),
            "UI" => Ok(UI),
            "UL" => Ok(UL),
            "UN" => Ok(UN),
            "UR" => Ok(UR),
            "US" => Ok(US),
            "UT" => Ok(UT),
            _ => Err("no such value representation"),
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// A type for representing data set content length, in bytes.
/// An internal value of `0xFFFF_FFFF` represents an undefined
/// (unspecified) length, which would have to be determined
/// with a traversal based on the content's encoding.
///
/// Two lengths of undefined length are not equal.
///
/// ```
/// # use dcm_core::Length;
/// assert_ne!(Length::UNDEFINED, Length::UNDEFINED);
/// assert_eq!(Length(8), Length(8));
/// ```
#[derive(Clone, Copy)]
pub struct Length(pub u32);

const UNDEFINED_LEN: u32 = 0xFFFF_FFFF;

impl Length {
    /// A length that is undefined.
    pub const UNDEFINED: Self = Length(UNDEFINED_LEN);

    /// Create a new length value from its internal representation.
    /// This is equivalent to `Length(len)`.
    #[inline]
    pub fn new(len: u32) -> Self {
        Length(len)
    }

    /// Create a new length value with the given number of bytes.
    ///
    /// # Panic
    ///
    /// This function will panic if `len` represents an undefined length.
    #[inline]
    pub fn defined(len: u32) -> Self {
        assert_ne!(len, UNDEFINED_LEN);
        Length(len)
    }

    /// Check whether this length is undefined (unknown).
    #[inline]
    pub fn is_undefined(self) -> bool {
        self.0 == UNDEFINED_LEN
    }

    /// Check whether this length is well defined (not undefined).
    #[inline]
    pub fn is_defined(self) -> bool {
        !self.is_undefined()
    }

    /// Fetch the concrete length value, if available.
    /// Returns `None` if it represents an undefined length.
    #[inline]
    pub fn get(self) -> Option<u32> {
        match self.0 {
            UNDEFINED_LEN => None,
            v => Some(v),
        }
    }
}

impl PartialEq<Length> for Length {
    fn eq(&self, rhs: &Length) -> bool {
        match (self.0, rhs.0) {
            (UNDEFINED_LEN, _) | (_, UNDEFINED_LEN) => false,
            (l1, l2) => l1 == l2,
        }
    }
}

impl PartialOrd<Length> for Length {
    fn partial_cmp(&self, rhs: &Length) -> Option<Ordering> {
        match (self.0, rhs.0) {
            (UNDEFINED_LEN, _) | (_, UNDEFINED_LEN) => None,
            (l1, l2) => Some(l1.cmp(&l2)),
        }
    }
}

impl From<u32> for Length {
    #[inline]
    fn from(o: u32) -> Self {
        Length(o)
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("Length(Undefined)"),
            l => f.debug_tuple("Length").field(&l).finish(),
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            UNDEFINED_LEN => f.write_str("U/L"),
            l => write!(f, "{}", l),
        }
    }
}

/// The header of a data element, as read from or written to a data set.
///
/// Structural tags (items and delimiters) have no value representation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataElementHeader {
    /// DICOM tag
    pub tag: Tag,
    /// Value Representation, absent for items and delimiters
    pub vr: Option<VR>,
    /// Element length
    pub len: Length,
}

impl DataElementHeader {
    /// Create a new data element header with the given properties.
    pub fn new<T: Into<Tag>>(tag: T, vr: VR, len: Length) -> DataElementHeader {
        DataElementHeader {
            tag: tag.into(),
            vr: Some(vr),
            len,
        }
    }

    /// Create a header for an item or delimiter.
    pub fn structural(tag: Tag, len: Length) -> DataElementHeader {
        DataElementHeader { tag, vr: None, len }
    }

    /// Whether this header opens a sequence of items.
    pub fn is_sequence_start(&self) -> bool {
        self.vr == Some(VR::SQ)
    }

    /// Whether this header opens an encapsulated pixel data sequence.
    pub fn is_encapsulated_pixel_data(&self) -> bool {
        self.tag == Tag::PIXEL_DATA && self.len.is_undefined()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn tag_from_str_is_case_insensitive() {
        assert_eq!("7fe0,0010".parse::<Tag>(), Ok(Tag::PIXEL_DATA));
        assert_eq!("FFFE,e000".parse::<Tag>(), Ok(Tag::ITEM));
        assert_eq!(Tag(0x7FE0, 0x0010).to_string(), "7FE0,0010");
    }

    #[rstest]
    #[case("0010,0010", true)]
    #[case("0010,00000", false)]
    #[case(",0000", false)]
    #[case("000G,0000", false)]
    #[case("00100010", false)]
    #[case("0010.0010", false)]
    #[case("0010,001", false)]
    fn tag_validity(#[case] text: &str, #[case] valid: bool) {
        assert_eq!(is_valid_tag(text), valid);
    }

    #[rstest]
    #[case("0009,0010", true)]
    #[case("0011,0010", true)]
    #[case("001B,1001", true)]
    #[case("001F,0000", true)]
    #[case("0010,0010", false)]
    #[case("0008,0018", false)]
    #[case("001A,0010", false)]
    #[case("7FE0,0010", false)]
    fn private_tags_have_odd_groups(#[case] text: &str, #[case] private: bool) {
        let tag: Tag = text.parse().unwrap();
        assert_eq!(tag.is_private(), private);
    }

    #[test]
    fn group_length_derivation() {
        let tag: Tag = "0010,0020".parse().unwrap();
        assert_eq!(tag.group_length_tag().to_string(), "0010,0000");
        assert!(tag.group_length_tag().is_group_length());
        assert!(!tag.is_group_length());
    }

    #[test]
    fn short_length_vrs() {
        assert!(VR::US.has_short_length());
        assert!(VR::UI.has_short_length());
        assert!(!VR::OB.has_short_length());
        assert!(!VR::SQ.has_short_length());
        assert!(!VR::UT.has_short_length());
        assert!(!VR::UN.has_short_length());
    }

    #[test]
    fn vr_value_kinds() {
        assert_eq!(VR::US.value_kind(), ValueKind::Integer);
        assert_eq!(VR::OW.value_kind(), ValueKind::Integer);
        assert_eq!(VR::OF.value_kind(), ValueKind::Float);
        assert_eq!(VR::FD.value_kind(), ValueKind::Float);
        assert_eq!(VR::PN.value_kind(), ValueKind::Text);
        assert_eq!(VR::AT.value_kind(), ValueKind::Text);
        assert_eq!(VR::UN.value_kind(), ValueKind::Bytes);
    }

    #[test]
    fn vr_from_binary() {
        assert_eq!(VR::from_binary(*b"SQ"), Some(VR::SQ));
        assert_eq!(VR::from_binary(*b"XX"), None);
        assert_eq!(VR::from_binary([0, 0]), None);
    }

    #[test]
    fn undefined_lengths_never_compare_equal() {
        assert_ne!(Length::UNDEFINED, Length::UNDEFINED);
        assert!(Length::UNDEFINED.is_undefined());
        assert_eq!(Length(12).get(), Some(12));
        assert_eq!(Length::UNDEFINED.get(), None);
        assert!(Length(2) < Length(4));
    }
}
