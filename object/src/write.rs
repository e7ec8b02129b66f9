//! The encoding pass from an object tree to bytes.
//!
//! Explicit lengths of sequences and items are recomputed from their content,
//! and so are group length elements.
//! Sequences and items of undefined length are closed with delimiters.
use crate::mem::{DicomObject, Node, NodeId, Parent};
use crate::{
    error_chain, EncodeHeaderSnafu, PrepareMetaSnafu, WriteError, WriteFileSnafu,
    WriteOutputSnafu, WriteUnsupportedTransferSyntaxSnafu, ZeroSegmentSizeSnafu,
};
use dcm_core::dictionary::DataDictionary;
use dcm_core::{DataElementHeader, Length, Tag, VR};
use dcm_encoding::encode::{encode_header, swap_byte_order};
use dcm_encoding::transfer_syntax::{Codec, TransferSyntax};
use dcm_encoding::{Endianness, Stream};
use snafu::{ensure, OptionExt, ResultExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const PREAMBLE_LEN: usize = 128;

/// Encodes the children of a parent in one transfer syntax.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Encoder {
    explicit_vr: bool,
    endianness: Endianness,
}

impl Encoder {
    pub(crate) const EXPLICIT_LE: Encoder = Encoder {
        explicit_vr: true,
        endianness: Endianness::Little,
    };

    pub(crate) fn new(ts: &TransferSyntax) -> Self {
        Encoder {
            explicit_vr: ts.explicit_vr(),
            endianness: ts.endianness(),
        }
    }

    /// Encode the children of a parent whose tag passes the filter.
    pub(crate) fn encode_children<D>(
        &self,
        obj: &DicomObject<D>,
        parent: Parent,
        filter: &dyn Fn(Tag) -> bool,
    ) -> Result<Vec<u8>, WriteError>
    where
        D: DataDictionary,
    {
        let mut stream = Stream::new(self.endianness);
        self.write_children(&mut stream, obj, parent, filter)?;
        Ok(stream.into_inner())
    }

    fn write_children<D>(
        &self,
        stream: &mut Stream,
        obj: &DicomObject<D>,
        parent: Parent,
        filter: &dyn Fn(Tag) -> bool,
    ) -> Result<(), WriteError>
    where
        D: DataDictionary,
    {
        for id in obj.children(parent) {
            let Some(node) = obj.node(id) else {
                continue;
            };
            let tag = node.tag();
            if !filter(tag) {
                continue;
            }
            if tag.is_group_length() && matches!(node, Node::Element(_)) {
                let group = tag.group();
                let rest = self.encode_children(obj, parent, &|t: Tag| {
                    t.group() == group && !t.is_group_length() && filter(t)
                })?;
                self.write_group_length(stream, tag, rest.len() as u32)?;
                continue;
            }
            self.write_node(stream, obj, id, node)?;
        }
        Ok(())
    }

    fn write_group_length(&self, stream: &mut Stream, tag: Tag, len: u32) -> Result<(), WriteError> {
        let header = DataElementHeader::new(tag, VR::UL, Length(4));
        encode_header(stream, &header, self.explicit_vr).context(EncodeHeaderSnafu { tag })?;
        let bytes = match self.endianness {
            Endianness::Little => len.to_le_bytes(),
            Endianness::Big => len.to_be_bytes(),
        };
        stream.write_bytes(&bytes);
        Ok(())
    }

    fn write_header(&self, stream: &mut Stream, header: DataElementHeader) -> Result<(), WriteError> {
        encode_header(stream, &header, self.explicit_vr).context(EncodeHeaderSnafu { tag: header.tag })
    }

    fn write_node<D>(
        &self,
        stream: &mut Stream,
        obj: &DicomObject<D>,
        id: NodeId,
        node: &Node,
    ) -> Result<(), WriteError>
    where
        D: DataDictionary,
    {
        match node {
            Node::Element(elem) => {
                let header = DataElementHeader::new(elem.tag(), elem.vr(), Length(elem.len()));
                self.write_header(stream, header)?;
                if self.endianness == Endianness::Big {
                    let mut bytes = elem.bin().to_vec();
                    swap_byte_order(&mut bytes, elem.vr());
                    stream.write_bytes(&bytes);
                } else {
                    stream.write_bytes(elem.bin());
                }
            }
            Node::Sequence(seq) if seq.is_encapsulated() => {
                self.write_header(stream, DataElementHeader::new(seq.tag(), seq.vr(), Length::UNDEFINED))?;
                for item in obj.children(id) {
                    let fragment = obj
                        .node(item)
                        .and_then(Node::as_item)
                        .and_then(|i| i.fragment_bytes())
                        .unwrap_or_default();
                    self.write_header(
                        stream,
                        DataElementHeader::structural(Tag::ITEM, Length(fragment.len() as u32)),
                    )?;
                    stream.write_bytes(fragment);
                }
                self.write_header(
                    stream,
                    DataElementHeader::structural(Tag::SEQUENCE_DELIMITER, Length(0)),
                )?;
            }
            Node::Sequence(seq) => {
                let mut content = Stream::new(self.endianness);
                for item in obj.children(id) {
                    if let Some(node) = obj.node(item) {
                        self.write_node(&mut content, obj, item, node)?;
                    }
                }
                self.write_delimited(stream, seq.tag(), Some(VR::SQ), seq.len(), content, Tag::SEQUENCE_DELIMITER)?;
            }
            Node::Item(item) => {
                if let Some(fragment) = item.fragment_bytes() {
                    self.write_header(
                        stream,
                        DataElementHeader::structural(Tag::ITEM, Length(fragment.len() as u32)),
                    )?;
                    stream.write_bytes(fragment);
                    return Ok(());
                }
                let mut content = Stream::new(self.endianness);
                self.write_children(&mut content, obj, Parent::Node(id), &|_| true)?;
                self.write_delimited(stream, Tag::ITEM, None, item.len(), content, Tag::ITEM_DELIMITER)?;
            }
        }
        Ok(())
    }

    /// Write a sequence or item header and its encoded content,
    /// either with the content's length or closed by a delimiter.
    fn write_delimited(
        &self,
        stream: &mut Stream,
        tag: Tag,
        vr: Option<VR>,
        len: Length,
        content: Stream,
        delimiter: Tag,
    ) -> Result<(), WriteError> {
        let content = content.into_inner();
        let len = if len.is_undefined() {
            Length::UNDEFINED
        } else {
            Length(content.len() as u32)
        };
        self.write_header(stream, DataElementHeader { tag, vr, len })?;
        stream.write_bytes(&content);
        if len.is_undefined() {
            self.write_header(stream, DataElementHeader::structural(delimiter, Length(0)))?;
        }
        Ok(())
    }
}

impl<D> DicomObject<D>
where
    D: DataDictionary,
{
    /// Encode the data set, without the file meta group,
    /// in the given transfer syntax.
    pub fn encode_dataset(&self, ts: &TransferSyntax) -> Result<Vec<u8>, WriteError> {
        ensure!(
            !matches!(ts.codec(), Codec::Deflated),
            WriteUnsupportedTransferSyntaxSnafu { uid: ts.uid() }
        );
        Encoder::new(ts).encode_children(self, Parent::Root, &|tag: Tag| tag.group() != 0x0002)
    }

    /// Encode the data set and split it into chunks of at most `max_size` bytes,
    /// to be sent over the network.
    pub fn encode_segments(
        &self,
        max_size: usize,
        ts: &TransferSyntax,
    ) -> Result<Vec<Vec<u8>>, WriteError> {
        ensure!(max_size > 0, ZeroSegmentSizeSnafu);
        let bytes = self.encode_dataset(ts)?;
        Ok(bytes.chunks(max_size).map(<[u8]>::to_vec).collect())
    }

    /// Write the data set, without preamble nor file meta group,
    /// in the given transfer syntax.
    pub fn write_dataset_with_ts<W>(&self, mut to: W, ts: &TransferSyntax) -> Result<(), WriteError>
    where
        W: Write,
    {
        let bytes = self.encode_dataset(ts)?;
        to.write_all(&bytes).context(WriteOutputSnafu)
    }

    /// Write the whole file: preamble, magic code,
    /// file meta group and the data set in the object's transfer syntax.
    ///
    /// Missing file meta elements are filled in first.
    /// The outcome is recorded in
    /// [`write_success`](DicomObject::write_success).
    pub fn write_all<W>(&mut self, mut to: W) -> Result<(), WriteError>
    where
        W: Write,
    {
        self.clear_messages();
        let result = self
            .encode_file()
            .and_then(|bytes| to.write_all(&bytes).context(WriteOutputSnafu));
        self.record_write(result)
    }

    /// Write the whole file to the given path.
    ///
    /// Relative paths are resolved against the directory
    /// of the file this object was read from, if any.
    pub fn write_to_file(&mut self, path: impl AsRef<Path>) -> Result<(), WriteError> {
        self.clear_messages();
        let path = self.resolve_path(path.as_ref());
        debug!("Writing DICOM file to {}", path.display());
        let result = self.encode_file().and_then(|bytes| {
            std::fs::write(&path, bytes).context(WriteFileSnafu { filename: &path })
        });
        self.record_write(result)
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        match self.source().and_then(Path::parent) {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn encode_file(&mut self) -> Result<Vec<u8>, WriteError> {
        let uid = self.transfer_syntax().to_string();
        let ts = dcm_transfer_syntax_registry::get(&uid)
            .context(WriteUnsupportedTransferSyntaxSnafu { uid: uid.as_str() })?;
        self.prepare_meta(ts.uid()).context(PrepareMetaSnafu)?;

        let mut out = vec![0; PREAMBLE_LEN];
        out.extend_from_slice(b"DICM");
        out.extend(self.encode_meta()?);
        out.extend(self.encode_dataset(ts)?);
        Ok(out)
    }

    fn record_write(&mut self, result: Result<(), WriteError>) -> Result<(), WriteError> {
        self.set_write_success(result.is_ok());
        if let Err(e) = &result {
            let message = error_chain(e);
            warn!("Failed to write DICOM object: {}", message);
            self.push_message(message);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use crate::mem::{DicomObject, Element, Item, Parent, Sequence};
    use crate::WriteError;
    use dcm_core::{Length, Tag, VR};
    use dcm_dictionary_std::tags;
    use dcm_transfer_syntax_registry::entries::{
        DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN, EXPLICIT_VR_BIG_ENDIAN, EXPLICIT_VR_LITTLE_ENDIAN,
        IMPLICIT_VR_LITTLE_ENDIAN,
    };
    use matches::assert_matches;

    #[test]
    fn element_in_three_encodings() {
        let mut obj = DicomObject::new();
        obj.set_value(tags::ROWS, 512_u16).unwrap();

        #[rustfmt::skip]
        let implicit: &[u8] = &[0x28, 0x00, 0x10, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x02];
        #[rustfmt::skip]
        let explicit: &[u8] = &[0x28, 0x00, 0x10, 0x00, b'U', b'S', 0x02, 0x00, 0x00, 0x02];
        #[rustfmt::skip]
        let big: &[u8] = &[0x00, 0x28, 0x00, 0x10, b'U', b'S', 0x00, 0x02, 0x02, 0x00];

        assert_eq!(obj.encode_dataset(&IMPLICIT_VR_LITTLE_ENDIAN).unwrap(), implicit);
        assert_eq!(obj.encode_dataset(&EXPLICIT_VR_LITTLE_ENDIAN).unwrap(), explicit);
        assert_eq!(obj.encode_dataset(&EXPLICIT_VR_BIG_ENDIAN).unwrap(), big);
    }

    #[test]
    fn undefined_length_sequence_uses_delimiters() {
        let mut obj = DicomObject::new();
        let seq = obj
            .add(Parent::Root, Sequence::new(tags::REFERENCED_IMAGE_SEQUENCE))
            .unwrap();
        obj.add_item(seq, None, None).unwrap();

        #[rustfmt::skip]
        let expected: &[u8] = &[
            0x08, 0x00, 0x40, 0x11, b'S', b'Q', 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
            0xFE, 0xFF, 0x00, 0xE0, 0xFF, 0xFF, 0xFF, 0xFF,
            0xFE, 0xFF, 0x0D, 0xE0, 0x00, 0x00, 0x00, 0x00,
            0xFE, 0xFF, 0xDD, 0xE0, 0x00, 0x00, 0x00, 0x00,
        ];
        assert_eq!(obj.encode_dataset(&EXPLICIT_VR_LITTLE_ENDIAN).unwrap(), expected);
    }

    #[test]
    fn defined_lengths_are_recomputed() {
        let mut obj = DicomObject::new();
        let seq = obj
            .add(
                Parent::Root,
                Sequence::new(tags::REFERENCED_IMAGE_SEQUENCE).with_length(Length(0)),
            )
            .unwrap();
        let item = obj
            .add_item(seq, Some(Item::new().with_length(Length(0))), None)
            .unwrap();
        obj.add(item, Element::new(tags::REFERENCED_SOP_INSTANCE_UID, VR::UI, "1.2").unwrap())
            .unwrap();

        #[rustfmt::skip]
        let expected: &[u8] = &[
            0x08, 0x00, 0x40, 0x11, 0x14, 0x00, 0x00, 0x00,
            0xFE, 0xFF, 0x00, 0xE0, 0x0C, 0x00, 0x00, 0x00,
            0x08, 0x00, 0x55, 0x11, 0x04, 0x00, 0x00, 0x00, b'1', b'.', b'2', 0x00,
        ];
        assert_eq!(obj.encode_dataset(&IMPLICIT_VR_LITTLE_ENDIAN).unwrap(), expected);
    }

    #[test]
    fn group_length_is_recomputed() {
        let mut obj = DicomObject::new();
        obj.set_value(Tag(0x0010, 0x0000), 999_u32).unwrap();
        obj.set_value(tags::PATIENT_ID, "ID42").unwrap();
        let bytes = obj.encode_dataset(&IMPLICIT_VR_LITTLE_ENDIAN).unwrap();
        assert_eq!(&bytes[..12], &[0x10, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 12, 0, 0, 0]);
    }

    #[test]
    fn segments() {
        let mut obj = DicomObject::new();
        obj.set_value(tags::PATIENT_ID, "ID42").unwrap();
        obj.set_value(tags::PATIENT_NAME, "Doe^John").unwrap();
        let whole = obj.encode_dataset(&IMPLICIT_VR_LITTLE_ENDIAN).unwrap();
        let segments = obj.encode_segments(10, &IMPLICIT_VR_LITTLE_ENDIAN).unwrap();
        assert_eq!(segments.len(), 3);
        assert!(segments.iter().all(|s| s.len() <= 10));
        assert_eq!(segments.concat(), whole);
        assert_matches!(
            obj.encode_segments(0, &IMPLICIT_VR_LITTLE_ENDIAN),
            Err(WriteError::ZeroSegmentSize { .. })
        );
        assert_matches!(
            obj.encode_dataset(&DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN),
            Err(WriteError::WriteUnsupportedTransferSyntax { .. })
        );
    }

    #[test]
    fn unknown_transfer_syntax_fails_write() {
        let mut obj = DicomObject::new();
        obj.set_transfer_syntax("1.2.3.4");
        let mut out = Vec::new();
        assert!(obj.write_all(&mut out).is_err());
        assert!(!obj.write_success());
        assert_eq!(obj.messages().len(), 1);
        assert!(out.is_empty());
    }
}
