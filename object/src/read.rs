//! The decoding pass from bytes to an object tree.
//!
//! Reading goes through three states:
//! the optional preamble and `DICM` magic code,
//! the file meta group (always explicit VR little endian),
//! and the data set in its transfer syntax.
//! Nodes are attached to the tree as soon as they are created,
//! so that a failure leaves everything decoded before it in place.
use crate::file::{DuplicatePolicy, OpenFileOptions, ReadPreamble};
use crate::mem::{DicomObject, Item, Node, NodeId, Parent, Sequence};
use crate::{error_chain, Element};
use dcm_core::dictionary::DataDictionary;
use dcm_core::{DataElementHeader, Tag, VR};
use dcm_dictionary_std::tags;
use dcm_encoding::decode::{self, decode_header, DecodedHeader, VrOrigin};
use dcm_encoding::encode::swap_byte_order;
use dcm_encoding::stream::{self, Stream};
use dcm_encoding::transfer_syntax::Codec;
use dcm_encoding::Endianness;
use snafu::{ensure, OptionExt, ResultExt, Snafu};
use tracing::{debug, warn};

const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";
/// Nothing shorter than one element header can hold a data set.
const MIN_SOURCE_LEN: usize = 8;

#[derive(Debug, Snafu)]
enum ParseError {
    #[snafu(display("Source is too small to hold a data set ({} bytes)", len))]
    TooSmall { len: usize },
    #[snafu(display("Missing DICM magic code after the preamble"))]
    MissingMagic,
    #[snafu(display("Could not read header at position {}", position))]
    ReadHeader {
        position: usize,
        source: decode::Error,
    },
    #[snafu(display("Could not read value of {} at position {}", tag, position))]
    ReadValue {
        tag: Tag,
        position: usize,
        source: stream::Error,
    },
    #[snafu(display("Unexpected {} at position {}", tag, position))]
    UnexpectedTag { tag: Tag, position: usize },
    #[snafu(display("Element {} at position {} has undefined length", tag, position))]
    UndefinedLength { tag: Tag, position: usize },
    #[snafu(display("Unsupported transfer syntax `{}`", uid))]
    UnsupportedTransferSyntax { uid: String },
    #[snafu(display("Deflated transfer syntax `{}` is not supported", uid))]
    DeflatedTransferSyntax { uid: String },
}

type Result<T, E = ParseError> = std::result::Result<T, E>;

/// How values are laid out in the part being read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Encoding {
    explicit_vr: bool,
    endianness: Endianness,
}

impl Encoding {
    const IMPLICIT_LE: Encoding = Encoding {
        explicit_vr: false,
        endianness: Endianness::Little,
    };
    const EXPLICIT_LE: Encoding = Encoding {
        explicit_vr: true,
        endianness: Endianness::Little,
    };
}

/// Where the children of a parent end.
#[derive(Debug, Copy, Clone)]
enum Bound {
    /// At the end of the source
    Eof,
    /// At this position
    Offset(usize),
    /// At an item delimiter, which is consumed
    Delimiter,
}

pub(crate) struct DataSetReader<'a, D> {
    options: &'a OpenFileOptions<D>,
}

impl<'a, D> DataSetReader<'a, D>
where
    D: DataDictionary,
{
    pub(crate) fn new(options: &'a OpenFileOptions<D>) -> Self {
        DataSetReader { options }
    }

    /// Decode the bytes into the object,
    /// recording the outcome and any messages in it.
    pub(crate) fn read(&self, bytes: &[u8], obj: &mut DicomObject<D>) {
        obj.clear_messages();
        let mut stream = Stream::from_bytes(bytes, Endianness::Little);
        match self.read_all(&mut stream, obj) {
            Ok(()) => obj.set_read_success(true),
            Err(e) => {
                let message = error_chain(&e);
                warn!("Failed to read DICOM object: {}", message);
                obj.set_read_success(false);
                obj.push_message(message);
            }
        }
    }

    fn read_all(&self, stream: &mut Stream, obj: &mut DicomObject<D>) -> Result<()> {
        let bytes = stream.as_bytes();
        ensure!(bytes.len() >= MIN_SOURCE_LEN, TooSmallSnafu { len: bytes.len() });

        let has_magic_after_preamble =
            bytes.len() >= PREAMBLE_LEN + MAGIC.len() && &bytes[PREAMBLE_LEN..PREAMBLE_LEN + 4] == MAGIC;
        let has_magic_at_start = &bytes[..4] == MAGIC;
        let start = match self.options.read_preamble {
            ReadPreamble::Never => None,
            ReadPreamble::Always => {
                ensure!(has_magic_after_preamble, MissingMagicSnafu);
                Some(PREAMBLE_LEN + MAGIC.len())
            }
            ReadPreamble::Auto if has_magic_after_preamble => Some(PREAMBLE_LEN + MAGIC.len()),
            ReadPreamble::Auto if has_magic_at_start => Some(MAGIC.len()),
            ReadPreamble::Auto => None,
        };

        if let Some(start) = start {
            // the magic code was found within the buffer
            let _ = stream.seek(start);
        }
        // raw streams may still lead with a file meta group
        if matches!(stream.peek_tag(), Ok(tag) if tag.group() == 0x0002) {
            self.read_meta(stream, obj)?;
        }

        let encoding = self.resolve_encoding(stream, obj)?;
        debug!(
            "Reading data set at position {} ({:?})",
            stream.position(),
            encoding
        );
        stream.set_endianness(encoding.endianness);
        self.read_children(stream, obj, Parent::Root, encoding, Bound::Eof)
    }

    /// Read the file meta group,
    /// until the group changes or its group length is exhausted.
    fn read_meta(&self, stream: &mut Stream, obj: &mut DicomObject<D>) -> Result<()> {
        stream.set_endianness(Endianness::Little);
        let mut end = None;
        loop {
            if matches!(end, Some(end) if stream.position() >= end) {
                break;
            }
            match stream.peek_tag() {
                Ok(tag) if tag.group() == 0x0002 => {}
                _ => break,
            }
            let decoded = self.read_header(stream, true)?;
            let tag = decoded.header.tag;
            self.read_node(stream, obj, Parent::Root, decoded, Encoding::EXPLICIT_LE)?;

            if tag == tags::FILE_META_INFORMATION_GROUP_LENGTH {
                end = obj
                    .value(tag)
                    .ok()
                    .and_then(|v| v.to_int::<u32>().ok())
                    .map(|len| stream.position() + len as usize);
            }
        }
        debug!("Read file meta group up to position {}", stream.position());
        Ok(())
    }

    /// Decide how the data set is encoded:
    /// by the caller's override, by the file meta group,
    /// or by looking at the first elements.
    fn resolve_encoding(&self, stream: &mut Stream, obj: &mut DicomObject<D>) -> Result<Encoding> {
        let declared = self.options.transfer_syntax.clone().or_else(|| {
            obj.value(tags::TRANSFER_SYNTAX_UID)
                .ok()
                .map(|v| v.to_str().trim_end_matches('\0').to_string())
                .filter(|uid| !uid.is_empty())
        });

        let Some(uid) = declared else {
            let encoding = self.guess_encoding(stream);
            let ts = if encoding.explicit_vr {
                dcm_transfer_syntax_registry::entries::EXPLICIT_VR_LITTLE_ENDIAN
            } else {
                dcm_transfer_syntax_registry::entries::IMPLICIT_VR_LITTLE_ENDIAN
            };
            let message = format!("No transfer syntax declared, assuming {}", ts.name());
            warn!("{}", message);
            obj.push_message(message);
            obj.set_transfer_syntax(ts.uid());
            return Ok(encoding);
        };

        let ts = dcm_transfer_syntax_registry::get(&uid)
            .context(UnsupportedTransferSyntaxSnafu { uid: uid.as_str() })?;
        obj.set_transfer_syntax(ts.uid());
        ensure!(
            !matches!(ts.codec(), Codec::Deflated),
            DeflatedTransferSyntaxSnafu { uid: ts.uid() }
        );
        Ok(Encoding {
            explicit_vr: ts.explicit_vr(),
            endianness: ts.endianness(),
        })
    }

    /// Read a sample of headers as explicit VR little endian,
    /// and take the data set as such if enough of them carry a known VR.
    ///
    /// The stream position is left untouched.
    fn guess_encoding(&self, stream: &mut Stream) -> Encoding {
        let start = stream.position();
        stream.set_endianness(Endianness::Little);
        let mut total = 0_usize;
        let mut recognized = 0_usize;
        while total < self.options.heuristic_sample && !stream.is_exhausted() {
            let Ok(DecodedHeader { header, vr_origin }) = decode_header(stream, true) else {
                total += 1;
                break;
            };
            match vr_origin {
                // items and delimiters say nothing about the encoding
                VrOrigin::Structural => continue,
                VrOrigin::Explicit => recognized += 1,
                VrOrigin::Unrecognized(_) | VrOrigin::Implicit => {}
            }
            total += 1;
            let Some(len) = header.len.get() else {
                continue;
            };
            if header.vr == Some(VR::SQ) {
                continue;
            }
            if stream.skip(len as usize).is_err() {
                break;
            }
        }
        let _ = stream.seek(start);

        let ratio = if total == 0 {
            0.
        } else {
            recognized as f32 / total as f32
        };
        debug!(
            "Encoding heuristic: {} of {} sampled elements have a known VR",
            recognized, total
        );
        if total > 0 && ratio >= self.options.heuristic_threshold {
            Encoding::EXPLICIT_LE
        } else {
            Encoding::IMPLICIT_LE
        }
    }

    fn read_header(&self, stream: &mut Stream, explicit_vr: bool) -> Result<DecodedHeader> {
        let position = stream.position();
        decode_header(stream, explicit_vr).context(ReadHeaderSnafu { position })
    }

    /// Read the children of a parent up to the given bound.
    fn read_children(
        &self,
        stream: &mut Stream,
        obj: &mut DicomObject<D>,
        parent: Parent,
        encoding: Encoding,
        bound: Bound,
    ) -> Result<()> {
        loop {
            match bound {
                Bound::Eof if stream.is_exhausted() => return Ok(()),
                Bound::Offset(end) if stream.position() >= end => return Ok(()),
                _ => {}
            }
            let position = stream.position();
            let decoded = self.read_header(stream, encoding.explicit_vr)?;
            let tag = decoded.header.tag;
            if tag == Tag::ITEM_DELIMITER && matches!(bound, Bound::Delimiter) {
                return Ok(());
            }
            ensure!(
                !tag.is_structural(),
                UnexpectedTagSnafu { tag, position }
            );
            self.read_node(stream, obj, parent, decoded, encoding)?;
        }
    }

    /// Read the value of an element or sequence whose header was just read,
    /// and attach it to the parent.
    fn read_node(
        &self,
        stream: &mut Stream,
        obj: &mut DicomObject<D>,
        parent: Parent,
        decoded: DecodedHeader,
        encoding: Encoding,
    ) -> Result<()> {
        let DecodedHeader { header, vr_origin } = decoded;
        let tag = header.tag;
        let position = stream.position();
        let vr = self.resolve_vr(obj, &header, vr_origin);

        let keep_existing = match obj.get(parent, tag) {
            Some(_) if self.options.duplicates == DuplicatePolicy::KeepFirst => {
                let message = format!(
                    "Duplicate element {} at position {}, keeping the first",
                    tag, position
                );
                warn!("{}", message);
                obj.push_message(message);
                true
            }
            Some(existing) => {
                debug!("Duplicate element {}, replacing the first", tag);
                obj.delete_node(existing);
                false
            }
            None => false,
        };

        if vr == VR::SQ || (vr == VR::UN && header.len.is_undefined()) {
            // sequences of unknown VR are always implicit VR little endian
            let item_encoding = if vr == VR::UN {
                Encoding::IMPLICIT_LE
            } else {
                encoding
            };
            let seq = Sequence::new(tag).with_length(header.len);
            let id = self.attach(obj, parent, seq.into(), keep_existing);
            stream.set_endianness(item_encoding.endianness);
            let result = self.read_items(stream, obj, id, header, item_encoding);
            stream.set_endianness(encoding.endianness);
            if keep_existing {
                obj.free_subtree(id);
            }
            return result;
        }

        if tag == Tag::PIXEL_DATA && header.len.is_undefined() {
            let id = self.attach(obj, parent, Sequence::encapsulated().into(), keep_existing);
            let result = self.read_fragments(stream, obj, id, encoding);
            if keep_existing {
                obj.free_subtree(id);
            }
            return result;
        }

        let len = header
            .len
            .get()
            .context(UndefinedLengthSnafu { tag, position })?;
        let mut bytes = stream
            .read_bytes(len as usize)
            .context(ReadValueSnafu { tag, position })?;
        if keep_existing {
            return Ok(());
        }
        if encoding.endianness == Endianness::Big {
            swap_byte_order(&mut bytes, vr);
        }
        let id = obj.alloc(parent, Element::from_bin(tag, vr, bytes).into());
        obj.link_tagged(parent, tag, id);
        Ok(())
    }

    /// Place a parent node in the tree,
    /// or leave it detached if its contents are to be discarded.
    fn attach(&self, obj: &mut DicomObject<D>, parent: Parent, node: Node, detached: bool) -> NodeId {
        let tag = node.tag();
        let id = obj.alloc(parent, node);
        if !detached {
            obj.link_tagged(parent, tag, id);
        }
        id
    }

    fn resolve_vr(&self, obj: &DicomObject<D>, header: &DataElementHeader, origin: VrOrigin) -> VR {
        match (origin, header.vr) {
            (VrOrigin::Explicit, Some(vr)) => vr,
            (VrOrigin::Unrecognized(code), _) => {
                let vr = obj.dictionary().lookup(header.tag).vr();
                warn!(
                    "Unrecognized VR {:?} for {}, using {}",
                    String::from_utf8_lossy(&code),
                    header.tag,
                    vr
                );
                vr
            }
            _ if header.len.is_undefined() && header.tag != Tag::PIXEL_DATA => VR::SQ,
            _ => obj.dictionary().lookup(header.tag).vr(),
        }
    }

    /// Read the items of a sequence,
    /// up to its length or up to the sequence delimiter.
    fn read_items(
        &self,
        stream: &mut Stream,
        obj: &mut DicomObject<D>,
        seq: NodeId,
        header: DataElementHeader,
        encoding: Encoding,
    ) -> Result<()> {
        let end = header.len.get().map(|len| stream.position() + len as usize);
        loop {
            if matches!(end, Some(end) if stream.position() >= end) {
                return Ok(());
            }
            let position = stream.position();
            let item = self.read_header(stream, encoding.explicit_vr)?.header;
            match item.tag {
                Tag::SEQUENCE_DELIMITER => return Ok(()),
                Tag::ITEM => {
                    let id = obj.alloc(
                        Parent::Node(seq),
                        Item::new().with_length(item.len).into(),
                    );
                    obj.link_item(seq, None, id);
                    let bound = match item.len.get() {
                        Some(len) => Bound::Offset(stream.position() + len as usize),
                        None => Bound::Delimiter,
                    };
                    self.read_children(stream, obj, Parent::Node(id), encoding, bound)?;
                }
                tag => return UnexpectedTagSnafu { tag, position }.fail(),
            }
        }
    }

    /// Read the fragments of encapsulated pixel data.
    ///
    /// The sequence ends at its delimiter,
    /// or before anything that is not an item,
    /// such as data set trailing padding.
    fn read_fragments(
        &self,
        stream: &mut Stream,
        obj: &mut DicomObject<D>,
        seq: NodeId,
        encoding: Encoding,
    ) -> Result<()> {
        loop {
            let position = stream.position();
            let tag = stream
                .peek_tag()
                .context(ReadValueSnafu {
                    tag: Tag::PIXEL_DATA,
                    position,
                })?;
            if tag != Tag::ITEM && tag != Tag::SEQUENCE_DELIMITER {
                warn!(
                    "Pixel data fragments end at {} (position {}) without a delimiter",
                    tag, position
                );
                return Ok(());
            }
            let header = self.read_header(stream, encoding.explicit_vr)?.header;
            if tag == Tag::SEQUENCE_DELIMITER {
                return Ok(());
            }
            let len = header
                .len
                .get()
                .context(UndefinedLengthSnafu { tag, position })?;
            let bytes = stream
                .read_bytes(len as usize)
                .context(ReadValueSnafu { tag, position })?;
            let id = obj.alloc(Parent::Node(seq), Item::fragment(bytes).into());
            obj.link_item(seq, None, id);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::file::{DuplicatePolicy, OpenFileOptions, ReadPreamble};
    use crate::mem::Parent;
    use dcm_core::{Value, VR};
    use dcm_dictionary_std::tags;

    /// (0010,0010) PN "Doe^John" then (0010,0020) LO "ID42",
    /// explicit VR little endian
    #[rustfmt::skip]
    const EXPLICIT_LE_PATIENT: &[u8] = &[
        0x10, 0x00, 0x10, 0x00, b'P', b'N', 0x08, 0x00,
        b'D', b'o', b'e', b'^', b'J', b'o', b'h', b'n',
        0x10, 0x00, 0x20, 0x00, b'L', b'O', 0x04, 0x00,
        b'I', b'D', b'4', b'2',
    ];

    /// The same elements, implicit VR little endian
    #[rustfmt::skip]
    const IMPLICIT_LE_PATIENT: &[u8] = &[
        0x10, 0x00, 0x10, 0x00, 0x08, 0x00, 0x00, 0x00,
        b'D', b'o', b'e', b'^', b'J', b'o', b'h', b'n',
        0x10, 0x00, 0x20, 0x00, 0x04, 0x00, 0x00, 0x00,
        b'I', b'D', b'4', b'2',
    ];

    fn raw() -> OpenFileOptions {
        OpenFileOptions::new().read_preamble(ReadPreamble::Never)
    }

    #[test]
    fn heuristic_detects_explicit_vr() {
        let obj = raw().from_bytes(EXPLICIT_LE_PATIENT);
        assert!(obj.read_success(), "{:?}", obj.messages());
        assert_eq!(obj.transfer_syntax(), "1.2.840.10008.1.2.1");
        assert_eq!(obj.element(tags::PATIENT_ID).unwrap().vr(), VR::LO);
        assert_eq!(obj.value(tags::PATIENT_NAME).unwrap(), Value::from("Doe^John"));
        assert_eq!(obj.messages().len(), 1);
    }

    #[test]
    fn heuristic_falls_back_to_implicit_vr() {
        let obj = OpenFileOptions::new().from_bytes(IMPLICIT_LE_PATIENT);
        assert!(obj.read_success(), "{:?}", obj.messages());
        assert_eq!(obj.transfer_syntax(), "1.2.840.10008.1.2");
        assert_eq!(obj.value(tags::PATIENT_ID).unwrap(), Value::from("ID42"));
        assert_eq!(obj.element(tags::PATIENT_NAME).unwrap().vr(), VR::PN);
    }

    #[test]
    fn override_transfer_syntax() {
        let obj = raw()
            .transfer_syntax("1.2.840.10008.1.2")
            .from_bytes(IMPLICIT_LE_PATIENT);
        assert!(obj.read_success());
        assert!(obj.messages().is_empty());
    }

    #[test]
    fn raw_stream_with_meta_group_switches_encoding() {
        // explicit VR LE group 0002 declaring implicit VR LE
        #[rustfmt::skip]
        let mut bytes = vec![
            0x02, 0x00, 0x00, 0x00, b'U', b'L', 0x04, 0x00,
            26, 0x00, 0x00, 0x00,
            0x02, 0x00, 0x10, 0x00, b'U', b'I', 18, 0x00,
        ];
        bytes.extend_from_slice(b"1.2.840.10008.1.2\0");
        bytes.extend_from_slice(IMPLICIT_LE_PATIENT);

        let obj = OpenFileOptions::new().from_bytes(&bytes);
        assert!(obj.read_success(), "{:?}", obj.messages());
        assert!(obj.messages().is_empty());
        assert_eq!(obj.transfer_syntax(), "1.2.840.10008.1.2");
        assert_eq!(obj.value(tags::PATIENT_NAME).unwrap(), Value::from("Doe^John"));
        assert_eq!(obj.value(tags::PATIENT_ID).unwrap(), Value::from("ID42"));
    }

    #[test]
    fn tiny_buffer_is_a_failure() {
        let obj = OpenFileOptions::new().from_bytes(&[0x10, 0x00]);
        assert!(!obj.read_success());
        assert_eq!(obj.messages().len(), 1);
    }

    #[test]
    fn missing_magic_is_a_failure() {
        let mut bytes = vec![0; 128];
        bytes.extend_from_slice(EXPLICIT_LE_PATIENT);
        let obj = OpenFileOptions::new()
            .read_preamble(ReadPreamble::Always)
            .from_bytes(&bytes);
        assert!(!obj.read_success());
        assert!(obj.messages()[0].contains("DICM"));
        assert_eq!(obj.count(Parent::Root), 0);
    }

    #[test]
    fn truncated_value_keeps_partial_result() {
        let bytes = &EXPLICIT_LE_PATIENT[..EXPLICIT_LE_PATIENT.len() - 2];
        let obj = raw().transfer_syntax("1.2.840.10008.1.2.1").from_bytes(bytes);
        assert!(!obj.read_success());
        assert_eq!(obj.value(tags::PATIENT_NAME).unwrap(), Value::from("Doe^John"));
        assert!(!obj.exists(Parent::Root, tags::PATIENT_ID));
        assert!(obj.messages()[0].contains("0010,0020"));
    }

    #[test]
    fn unrecognized_vr_uses_dictionary() {
        #[rustfmt::skip]
        let bytes: &[u8] = &[
            0x10, 0x00, 0x20, 0x00, b'?', b'?', 0x04, 0x00,
            b'I', b'D', b'4', b'2',
        ];
        let obj = raw().transfer_syntax("1.2.840.10008.1.2.1").from_bytes(bytes);
        assert!(obj.read_success());
        assert_eq!(obj.element(tags::PATIENT_ID).unwrap().vr(), VR::LO);
    }

    #[test]
    fn big_endian_values_are_normalized() {
        #[rustfmt::skip]
        let bytes: &[u8] = &[
            0x00, 0x28, 0x00, 0x10, b'U', b'S', 0x00, 0x02, 0x02, 0x00,
        ];
        let obj = raw().transfer_syntax("1.2.840.10008.1.2.2").from_bytes(bytes);
        assert!(obj.read_success(), "{:?}", obj.messages());
        let rows = obj.element(tags::ROWS).unwrap();
        assert_eq!(rows.bin(), &[0x00, 0x02]);
        assert_eq!(obj.value(tags::ROWS).unwrap().to_int::<u16>().unwrap(), 512);
    }

    #[test]
    fn duplicate_policies() {
        #[rustfmt::skip]
        let bytes: &[u8] = &[
            0x10, 0x00, 0x20, 0x00, b'L', b'O', 0x02, 0x00, b'A', b'A',
            0x10, 0x00, 0x20, 0x00, b'L', b'O', 0x02, 0x00, b'B', b'B',
            0x10, 0x00, 0x30, 0x00, b'D', b'A', 0x08, 0x00,
            b'2', b'0', b'2', b'4', b'0', b'1', b'0', b'1',
        ];
        let obj = raw().transfer_syntax("1.2.840.10008.1.2.1").from_bytes(bytes);
        assert!(obj.read_success());
        assert_eq!(obj.value(tags::PATIENT_ID).unwrap(), Value::from("AA"));
        assert!(obj.exists(Parent::Root, tags::PATIENT_BIRTH_DATE));

        let obj = raw()
            .transfer_syntax("1.2.840.10008.1.2.1")
            .duplicates(DuplicatePolicy::Overwrite)
            .from_bytes(bytes);
        assert_eq!(obj.value(tags::PATIENT_ID).unwrap(), Value::from("BB"));
        assert!(obj.exists(Parent::Root, tags::PATIENT_BIRTH_DATE));
        assert_eq!(obj.count(Parent::Root), 2);
    }

    #[test]
    fn unexpected_item_at_root() {
        #[rustfmt::skip]
        let bytes: &[u8] = &[
            0xFE, 0xFF, 0x00, 0xE0, 0x00, 0x00, 0x00, 0x00,
        ];
        let obj = raw().transfer_syntax("1.2.840.10008.1.2").from_bytes(bytes);
        assert!(!obj.read_success());
        assert!(obj.messages()[0].contains("FFFE,E000"));
        assert_eq!(obj.count(Parent::Root), 0);
    }
}
