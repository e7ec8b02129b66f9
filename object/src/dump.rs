//! Dumping the contents of DICOM objects in a human readable way.
//!
//! ```
//! use dcm_dictionary_std::tags;
//! use dcm_object::{dump_object_to, DicomObject};
//!
//! let mut obj = DicomObject::new();
//! obj.set_value(tags::PATIENT_NAME, "Doe^John")?;
//! let mut out = Vec::new();
//! dump_object_to(&mut out, &obj)?;
//! let text = String::from_utf8(out)?;
//! assert!(text.contains("(0010,0010) PatientName"));
//! # Result::<(), Box<dyn std::error::Error>>::Ok(())
//! ```
use crate::mem::{DicomObject, Element, Node, NodeId, Parent};
use dcm_core::dictionary::DataDictionary;
use dcm_core::{Tag, Value, VR};
use std::io::{stdout, Result as IoResult, Write};

/// Options for dumping an object.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    /// the maximum line width, used to cut long values
    width: u32,
    /// print values in full
    no_limit: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        DumpOptions {
            width: 120,
            no_limit: false,
        }
    }
}

impl DumpOptions {
    pub fn new() -> Self {
        DumpOptions::default()
    }

    /// Set the maximum line width.
    pub fn width(&mut self, width: u32) -> &mut Self {
        self.width = width;
        self
    }

    /// Print values in full, regardless of the width.
    pub fn no_limit(&mut self, no_limit: bool) -> &mut Self {
        self.no_limit = no_limit;
        self
    }

    /// Dump the object to standard output.
    pub fn dump_object<D>(&self, obj: &DicomObject<D>) -> IoResult<()>
    where
        D: DataDictionary,
    {
        let stdout = stdout();
        let mut to = stdout.lock();
        self.dump_object_to(&mut to, obj)
    }

    /// Dump the object to the given writer,
    /// one line per node, nested nodes indented.
    pub fn dump_object_to<W, D>(&self, mut to: W, obj: &DicomObject<D>) -> IoResult<()>
    where
        W: Write,
        D: DataDictionary,
    {
        writeln!(to, "# Transfer syntax: {}", obj.transfer_syntax())?;
        writeln!(to, "{:-<58}", "")?;
        self.dump_children(&mut to, obj, Parent::Root, 0)
    }

    fn dump_children<W, D>(
        &self,
        to: &mut W,
        obj: &DicomObject<D>,
        parent: Parent,
        depth: u32,
    ) -> IoResult<()>
    where
        W: Write,
        D: DataDictionary,
    {
        for id in obj.children(parent) {
            self.dump_node(to, obj, id, depth)?;
        }
        Ok(())
    }

    fn dump_node<W, D>(&self, to: &mut W, obj: &DicomObject<D>, id: NodeId, depth: u32) -> IoResult<()>
    where
        W: Write,
        D: DataDictionary,
    {
        let Some(node) = obj.node(id) else {
            return Ok(());
        };
        let indent = "  ".repeat(depth as usize);
        let name = obj.name_of(id).unwrap_or_default();
        match node {
            Node::Element(elem) => {
                let value = self.value_summary(elem, depth);
                writeln!(
                    to,
                    "{}{} {:28} {} ({:>3} bytes): {}",
                    indent,
                    tag_num(elem.tag()),
                    name,
                    elem.vr(),
                    elem.len(),
                    value
                )?;
            }
            Node::Sequence(seq) => {
                let n = seq.items().len();
                let kind = if seq.is_encapsulated() {
                    "PixelSequence, "
                } else {
                    ""
                };
                writeln!(
                    to,
                    "{}{} {:28} {} ({}{} Item{})",
                    indent,
                    tag_num(seq.tag()),
                    name,
                    seq.vr(),
                    kind,
                    n,
                    if n == 1 { "" } else { "s" },
                )?;
                self.dump_children(to, obj, Parent::Node(id), depth + 1)?;
                if !seq.is_encapsulated() {
                    writeln!(
                        to,
                        "{}{} SequenceDelimitationItem",
                        indent,
                        tag_num(Tag::SEQUENCE_DELIMITER)
                    )?;
                }
            }
            Node::Item(item) => {
                if let Some(fragment) = item.fragment_bytes() {
                    writeln!(
                        to,
                        "{}{} pi ({:>3} bytes)",
                        indent,
                        tag_num(Tag::ITEM),
                        fragment.len()
                    )?;
                    return Ok(());
                }
                writeln!(to, "{}{} na Item", indent, tag_num(Tag::ITEM))?;
                self.dump_children(to, obj, Parent::Node(id), depth + 1)?;
                writeln!(
                    to,
                    "{}{} ItemDelimitationItem",
                    indent,
                    tag_num(Tag::ITEM_DELIMITER)
                )?;
            }
        }
        Ok(())
    }

    fn value_summary(&self, elem: &Element, depth: u32) -> String {
        let text = match elem.value() {
            Ok(Value::Bytes(bytes)) => format!("[{} bytes]", bytes.len()),
            Ok(Value::Empty) => String::from("(no value)"),
            Ok(value) if matches!(elem.vr(), VR::OB | VR::OW | VR::UN) => {
                format!("[{}]", value.to_str().replace('\\', ", "))
            }
            Ok(value) => format!("[{}]", value.to_str()),
            Err(e) => format!("<{}>", e),
        };
        let max = self.width.saturating_sub(63 + depth * 2) as usize;
        if self.no_limit || text.chars().count() <= max {
            return text;
        }
        let mut cut: String = text.chars().take(max.saturating_sub(3)).collect();
        cut.push_str("...");
        cut
    }
}

fn tag_num(tag: Tag) -> String {
    format!("({})", tag)
}

/// Dump the contents of an object to standard output.
pub fn dump_object<D>(obj: &DicomObject<D>) -> IoResult<()>
where
    D: DataDictionary,
{
    DumpOptions::new().dump_object(obj)
}

/// Dump the contents of an object to the given writer.
pub fn dump_object_to<W, D>(to: W, obj: &DicomObject<D>) -> IoResult<()>
where
    W: Write,
    D: DataDictionary,
{
    DumpOptions::new().dump_object_to(to, obj)
}
