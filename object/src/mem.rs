//! The in-memory tree of a DICOM object.
//!
//! All nodes live in an arena owned by the [`DicomObject`].
//! Parents own the handles of their children:
//! the root and items map tags to nodes,
//! sequences keep their items in order.
//! Every node records its parent, which is never an owning edge.
//! Deleting a node frees its whole subtree,
//! after which any stale [`NodeId`] resolves to nothing.
//!
//! Element values are kept in their encoded form,
//! in little endian regardless of the transfer syntax,
//! and decoded on demand.
use crate::{
    AccessByNameError, AccessError, DecodeValueSnafu, EncodeValueSnafu, FragmentItemSnafu,
    ItemIndexOutOfBoundsSnafu, ItemOutsideSequenceSnafu, ModifyError, NoSuchAttributeNameSnafu,
    NoSuchDataElementTagSnafu, NoSuchParentSnafu, NotAParentSnafu, NotAnElementSnafu,
    NotAnItemSnafu, SetNonElementSnafu,
};
use dcm_core::dictionary::DataDictionary;
use dcm_core::header::GroupNumber;
use dcm_core::{Length, Tag, Value, VR};
use dcm_dictionary_std::StandardDataDictionary;
use dcm_encoding::decode::primitive_value as decode_pv;
use dcm_encoding::encode::primitive_value as encode_pv;
use dcm_encoding::{decode_value, encode_value, Endianness};
use itertools::Either;
use snafu::{OptionExt, ResultExt};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A handle to a node of a [`DicomObject`].
///
/// Handles are generational:
/// once a node is deleted, its handle is never valid again,
/// even if the slot is reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// A node which may hold children:
/// the root of the object, a sequence, or an item.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Parent {
    /// The root of the object
    Root,
    /// A sequence or item node
    Node(NodeId),
}

impl From<NodeId> for Parent {
    fn from(id: NodeId) -> Self {
        Parent::Node(id)
    }
}

/// The key of a child within its parent:
/// a tag for the root and items, an index for sequences.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Tag(Tag),
    Index(usize),
}

impl From<Tag> for Key {
    fn from(tag: Tag) -> Self {
        Key::Tag(tag)
    }
}

impl From<(u16, u16)> for Key {
    fn from(tag: (u16, u16)) -> Self {
        Key::Tag(tag.into())
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

/// A leaf node: a data element with a primitive value.
///
/// The value is held in its binary form,
/// always of even length.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: Tag,
    vr: VR,
    bin: Vec<u8>,
    name: Option<Cow<'static, str>>,
}

impl Element {
    /// Create an element from a value,
    /// which is converted to the kind expected by the VR.
    ///
    /// ```
    /// # use dcm_core::{Tag, VR};
    /// # use dcm_object::Element;
    /// let elem = Element::new(Tag(0x0010, 0x0010), VR::PN, "OddName")?;
    /// assert_eq!(elem.len(), 8);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(
        tag: impl Into<Tag>,
        vr: VR,
        value: impl Into<Value>,
    ) -> Result<Self, encode_pv::Error> {
        let bin = encode_value(&value.into(), vr, Endianness::Little)?;
        Ok(Element {
            tag: tag.into(),
            vr,
            bin,
            name: None,
        })
    }

    /// Create an element from its encoded value, in little endian.
    ///
    /// Odd-length values are padded as the VR prescribes.
    pub fn from_bin(tag: impl Into<Tag>, vr: VR, mut bin: Vec<u8>) -> Self {
        if bin.len() % 2 == 1 {
            bin.push(vr.padding());
        }
        Element {
            tag: tag.into(),
            vr,
            bin,
            name: None,
        }
    }

    /// Override the name which the dictionary would give this element.
    pub fn with_name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn vr(&self) -> VR {
        self.vr
    }

    /// The byte length of the encoded value.
    pub fn len(&self) -> u32 {
        self.bin.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.bin.is_empty()
    }

    /// The encoded value, in little endian.
    pub fn bin(&self) -> &[u8] {
        &self.bin
    }

    /// The name given to this element, if it overrides the dictionary.
    pub fn name_override(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Decode the value of this element.
    pub fn value(&self) -> Result<Value, decode_pv::Error> {
        decode_value(&self.bin, self.vr, Endianness::Little)
    }

    /// Decode the value of this element as text.
    pub fn to_str(&self) -> Result<String, decode_pv::Error> {
        self.value().map(|v| v.to_str().into_owned())
    }

    /// Replace the value of this element,
    /// converting it to the kind expected by the VR.
    ///
    /// On failure, the element is left untouched.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<(), encode_pv::Error> {
        self.bin = encode_value(&value.into(), self.vr, Endianness::Little)?;
        Ok(())
    }

    /// Replace the encoded value of this element, in little endian.
    pub fn set_bin(&mut self, mut bin: Vec<u8>) {
        if bin.len() % 2 == 1 {
            bin.push(self.vr.padding());
        }
        self.bin = bin;
    }
}

/// A parent node holding an ordered list of items.
///
/// Encapsulated pixel data is a sequence too,
/// with the VR OB and items which carry fragments.
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    tag: Tag,
    vr: VR,
    len: Length,
    items: Vec<NodeId>,
}

impl Sequence {
    /// Create an empty sequence of undefined length.
    pub fn new(tag: impl Into<Tag>) -> Self {
        Sequence {
            tag: tag.into(),
            vr: VR::SQ,
            len: Length::UNDEFINED,
            items: Vec::new(),
        }
    }

    /// Create an empty encapsulated pixel data sequence.
    pub fn encapsulated() -> Self {
        Sequence {
            tag: Tag::PIXEL_DATA,
            vr: VR::OB,
            len: Length::UNDEFINED,
            items: Vec::new(),
        }
    }

    /// Set whether the sequence is written with an explicit length
    /// (computed when writing) or with a delimiter.
    pub fn with_length(mut self, len: Length) -> Self {
        self.len = len;
        self
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn vr(&self) -> VR {
        self.vr
    }

    /// The length as last read, or undefined.
    pub fn len(&self) -> Length {
        self.len
    }

    pub fn is_encapsulated(&self) -> bool {
        self.vr != VR::SQ
    }

    /// The items of this sequence, in order.
    pub fn items(&self) -> &[NodeId] {
        &self.items
    }
}

/// A parent node within a sequence.
///
/// Items of encapsulated pixel data carry a fragment instead of children.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    len: Length,
    children: BTreeMap<Tag, NodeId>,
    fragment: Option<Vec<u8>>,
}

impl Default for Item {
    fn default() -> Self {
        Item::new()
    }
}

impl Item {
    /// Create an empty item of undefined length.
    pub fn new() -> Self {
        Item {
            len: Length::UNDEFINED,
            children: BTreeMap::new(),
            fragment: None,
        }
    }

    /// Create a pixel data fragment item.
    pub fn fragment(mut bytes: Vec<u8>) -> Self {
        if bytes.len() % 2 == 1 {
            bytes.push(0);
        }
        Item {
            len: Length(bytes.len() as u32),
            children: BTreeMap::new(),
            fragment: Some(bytes),
        }
    }

    /// Set whether the item is written with an explicit length
    /// (computed when writing) or with a delimiter.
    pub fn with_length(mut self, len: Length) -> Self {
        self.len = len;
        self
    }

    pub fn len(&self) -> Length {
        self.len
    }

    /// The fragment bytes, for items of encapsulated pixel data.
    pub fn fragment_bytes(&self) -> Option<&[u8]> {
        self.fragment.as_deref()
    }

    pub fn is_fragment(&self) -> bool {
        self.fragment.is_some()
    }
}

/// Any node of the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Sequence(Sequence),
    Item(Item),
}

impl Node {
    /// The tag of the node. Items have the item tag.
    pub fn tag(&self) -> Tag {
        match self {
            Node::Element(e) => e.tag,
            Node::Sequence(s) => s.tag,
            Node::Item(_) => Tag::ITEM,
        }
    }

    /// The value representation of the node.
    /// Items have none.
    pub fn vr(&self) -> Option<VR> {
        match self {
            Node::Element(e) => Some(e.vr),
            Node::Sequence(s) => Some(s.vr),
            Node::Item(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Element(_) => "element",
            Node::Sequence(_) => "sequence",
            Node::Item(_) => "item",
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Node::Sequence(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Node::Item(i) => Some(i),
            _ => None,
        }
    }

    /// Drop any child handles, so that the node enters the tree empty.
    fn clear_children(&mut self) {
        match self {
            Node::Sequence(s) => s.items.clear(),
            Node::Item(i) => i.children.clear(),
            Node::Element(_) => {}
        }
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl From<Sequence> for Node {
    fn from(s: Sequence) -> Self {
        Node::Sequence(s)
    }
}

impl From<Item> for Node {
    fn from(i: Item) -> Self {
        Node::Item(i)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    parent: Parent,
    node: Node,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// A DICOM object: the root of a tree of elements, sequences and items.
///
/// Besides the tree, the object keeps the outcome of the last read and write,
/// the transfer syntax of its data set and the path it was read from.
/// The data dictionary `D` names elements and provides
/// value representations for new elements and implicit VR data.
#[derive(Debug, Clone)]
pub struct DicomObject<D = StandardDataDictionary> {
    dict: D,
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: BTreeMap<Tag, NodeId>,
    transfer_syntax: String,
    read_success: bool,
    write_success: bool,
    source: Option<PathBuf>,
    messages: Vec<String>,
}

impl DicomObject<StandardDataDictionary> {
    /// Create an empty object using the standard data dictionary.
    pub fn new() -> Self {
        DicomObject::new_with_dict(StandardDataDictionary)
    }
}

impl Default for DicomObject<StandardDataDictionary> {
    fn default() -> Self {
        DicomObject::new()
    }
}

impl<D> DicomObject<D>
where
    D: DataDictionary,
{
    /// Create an empty object with the given data dictionary.
    ///
    /// The transfer syntax defaults to implicit VR little endian.
    pub fn new_with_dict(dict: D) -> Self {
        DicomObject {
            dict,
            slots: Vec::new(),
            free: Vec::new(),
            root: BTreeMap::new(),
            transfer_syntax: dcm_transfer_syntax_registry::default().uid().to_string(),
            read_success: false,
            write_success: false,
            source: None,
            messages: Vec::new(),
        }
    }

    pub fn dictionary(&self) -> &D {
        &self.dict
    }

    /// Whether the last read completed without errors.
    pub fn read_success(&self) -> bool {
        self.read_success
    }

    /// Whether the last write completed without errors.
    pub fn write_success(&self) -> bool {
        self.write_success
    }

    /// The UID of the transfer syntax of the data set.
    pub fn transfer_syntax(&self) -> &str {
        &self.transfer_syntax
    }

    /// Set the transfer syntax to write the data set with.
    pub fn set_transfer_syntax(&mut self, uid: impl Into<String>) {
        self.transfer_syntax = uid.into();
    }

    /// The file this object was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Warnings and errors recorded by the last read or write.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub(crate) fn set_source(&mut self, path: Option<PathBuf>) {
        self.source = path;
    }

    pub(crate) fn set_read_success(&mut self, success: bool) {
        self.read_success = success;
    }

    pub(crate) fn set_write_success(&mut self, success: bool) {
        self.write_success = success;
    }

    pub(crate) fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub(crate) fn clear_messages(&mut self) {
        self.messages.clear();
    }

    // -- arena --

    fn entry(&self, id: NodeId) -> Option<&Entry> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut Entry> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    /// Place a node in the arena without attaching it to its parent.
    pub(crate) fn alloc(&mut self, parent: Parent, node: Node) -> NodeId {
        let entry = Some(Entry { parent, node });
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = entry;
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                entry,
            });
            NodeId {
                index: (self.slots.len() - 1) as u32,
                generation: 0,
            }
        }
    }

    /// Free a node and all of its descendants.
    /// The node must already be detached from its parent.
    pub(crate) fn free_subtree(&mut self, id: NodeId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let Some(slot) = self
                .slots
                .get_mut(id.index as usize)
                .filter(|slot| slot.generation == id.generation)
            else {
                continue;
            };
            if let Some(entry) = slot.entry.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                match entry.node {
                    Node::Sequence(s) => pending.extend(s.items),
                    Node::Item(i) => pending.extend(i.children.into_values()),
                    Node::Element(_) => {}
                }
            }
        }
    }

    /// Attach an allocated node to the map of its tag-keyed parent,
    /// returning the node it displaced.
    pub(crate) fn link_tagged(&mut self, parent: Parent, tag: Tag, id: NodeId) -> Option<NodeId> {
        match parent {
            Parent::Root => self.root.insert(tag, id),
            Parent::Node(pid) => match self.entry_mut(pid).map(|e| &mut e.node) {
                Some(Node::Item(item)) => item.children.insert(tag, id),
                _ => None,
            },
        }
    }

    /// Attach an allocated item to a sequence.
    pub(crate) fn link_item(&mut self, seq: NodeId, index: Option<usize>, id: NodeId) {
        if let Some(Node::Sequence(s)) = self.entry_mut(seq).map(|e| &mut e.node) {
            match index {
                Some(i) if i <= s.items.len() => s.items.insert(i, id),
                _ => s.items.push(id),
            }
        }
    }

    fn unlink(&mut self, id: NodeId) {
        let Some(entry) = self.entry(id) else {
            return;
        };
        let tag = entry.node.tag();
        match entry.parent {
            Parent::Root => {
                if self.root.get(&tag) == Some(&id) {
                    self.root.remove(&tag);
                }
            }
            Parent::Node(pid) => match self.entry_mut(pid).map(|e| &mut e.node) {
                Some(Node::Sequence(s)) => s.items.retain(|i| *i != id),
                Some(Node::Item(item)) => {
                    if item.children.get(&tag) == Some(&id) {
                        item.children.remove(&tag);
                    }
                }
                _ => {}
            },
        }
    }

    fn tagged_children(&self, parent: Parent) -> Option<&BTreeMap<Tag, NodeId>> {
        match parent {
            Parent::Root => Some(&self.root),
            Parent::Node(id) => match &self.entry(id)?.node {
                Node::Item(item) => Some(&item.children),
                _ => None,
            },
        }
    }

    // -- node access --

    /// Fetch a node by its handle.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.entry(id).map(|e| &e.node)
    }

    /// Fetch an element node by its handle.
    pub fn element_at(&self, id: NodeId) -> Option<&Element> {
        self.node(id).and_then(Node::as_element)
    }

    /// Fetch an element node by its handle, for modification.
    pub fn element_at_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.entry_mut(id).map(|e| &mut e.node) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// The tag of a node.
    pub fn tag_of(&self, id: NodeId) -> Option<Tag> {
        self.node(id).map(Node::tag)
    }

    /// The name of a node: its override,
    /// or the dictionary name of its tag.
    pub fn name_of(&self, id: NodeId) -> Option<Cow<'_, str>> {
        let node = self.node(id)?;
        if let Node::Element(Element {
            name: Some(name), ..
        }) = node
        {
            return Some(Cow::Borrowed(name.as_ref()));
        }
        match node {
            Node::Item(_) => Some(Cow::Borrowed("Item")),
            _ => Some(self.dict.lookup(node.tag()).name),
        }
    }

    /// The position of an item within its sequence.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let Parent::Node(seq) = self.entry(id)?.parent else {
            return None;
        };
        self.node(seq)?
            .as_sequence()?
            .items
            .iter()
            .position(|i| *i == id)
    }

    /// Fetch the child of a parent by tag or, for sequences, by index.
    pub fn get(&self, parent: impl Into<Parent>, key: impl Into<Key>) -> Option<NodeId> {
        let parent = parent.into();
        match key.into() {
            Key::Tag(tag) => self.tagged_children(parent)?.get(&tag).copied(),
            Key::Index(index) => match parent {
                Parent::Root => None,
                Parent::Node(id) => self.node(id)?.as_sequence()?.items.get(index).copied(),
            },
        }
    }

    /// Iterate over the children of a parent:
    /// in tag order for the root and items, in index order for sequences.
    pub fn children(&self, parent: impl Into<Parent>) -> impl Iterator<Item = NodeId> + '_ {
        let parent = parent.into();
        if let Some(map) = self.tagged_children(parent) {
            return Either::Left(map.values().copied());
        }
        let items: &[NodeId] = match parent {
            Parent::Node(id) => self
                .node(id)
                .and_then(Node::as_sequence)
                .map(|s| s.items.as_slice())
                .unwrap_or_default(),
            Parent::Root => &[],
        };
        Either::Right(items.iter().copied())
    }

    /// The number of direct children of a parent.
    pub fn count(&self, parent: impl Into<Parent>) -> usize {
        self.children(parent).count()
    }

    /// The number of nodes below a parent, at any depth.
    pub fn count_all(&self, parent: impl Into<Parent>) -> usize {
        self.children(parent)
            .map(|id| 1 + self.count_all(id))
            .sum()
    }

    /// Whether the parent holds a child with this tag.
    pub fn exists(&self, parent: impl Into<Parent>, tag: Tag) -> bool {
        self.get(parent, tag).is_some()
    }

    /// The children of a parent in the given group.
    pub fn group(&self, parent: impl Into<Parent>, group: GroupNumber) -> Vec<NodeId> {
        self.tagged_children(parent.into())
            .map(|map| {
                map.range(Tag(group, 0)..=Tag(group, 0xFFFF))
                    .map(|(_, id)| *id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<Parent> {
        self.entry(id).map(|e| e.parent)
    }

    /// The chain of parents of a node, nearest first,
    /// ending with the root.
    pub fn parents(&self, id: NodeId) -> Vec<Parent> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            out.push(parent);
            current = match parent {
                Parent::Root => None,
                Parent::Node(pid) => self.parent(pid),
            };
        }
        out
    }

    /// The top of the chain of parents of a node,
    /// which is the root for any node in the tree.
    pub fn top_parent(&self, id: NodeId) -> Option<Parent> {
        self.parents(id).last().copied()
    }

    // -- modification --

    /// Add a child to a parent.
    ///
    /// Elements and sequences go to the root or items,
    /// replacing any existing child with the same tag.
    /// Items go to the end of sequences, and only there.
    pub fn add(
        &mut self,
        parent: impl Into<Parent>,
        child: impl Into<Node>,
    ) -> Result<NodeId, ModifyError> {
        let parent = parent.into();
        let mut node = child.into();
        node.clear_children();

        if let Parent::Node(pid) = parent {
            let sequence = match self.node(pid).context(NoSuchParentSnafu)? {
                Node::Element(e) => return NotAParentSnafu { tag: e.tag }.fail(),
                Node::Item(item) if item.is_fragment() => return FragmentItemSnafu.fail(),
                Node::Sequence(s) => Some(s.tag),
                Node::Item(_) => None,
            };
            if let Some(sequence) = sequence {
                return match node {
                    Node::Item(item) => self.add_item(pid, Some(item), None),
                    other => NotAnItemSnafu {
                        sequence,
                        tag: other.tag(),
                    }
                    .fail(),
                };
            }
        }
        if let Node::Item(_) = node {
            return ItemOutsideSequenceSnafu.fail();
        }

        let tag = node.tag();
        let id = self.alloc(parent, node);
        if let Some(old) = self.link_tagged(parent, tag, id) {
            self.free_subtree(old);
        }
        Ok(id)
    }

    /// Insert an item into a sequence.
    ///
    /// Without an index, the item goes to the end.
    /// Inserting at an occupied index shifts that item
    /// and all following ones up by one.
    /// Without an item, an empty one is created.
    pub fn add_item(
        &mut self,
        seq: NodeId,
        item: Option<Item>,
        index: Option<usize>,
    ) -> Result<NodeId, ModifyError> {
        let len = match self.node(seq).context(NoSuchParentSnafu)? {
            Node::Sequence(s) => s.items.len(),
            other => {
                return NotAParentSnafu { tag: other.tag() }.fail();
            }
        };
        if let Some(index) = index {
            snafu::ensure!(index <= len, ItemIndexOutOfBoundsSnafu { index, len });
        }
        let mut node = Node::Item(item.unwrap_or_default());
        node.clear_children();
        let id = self.alloc(Parent::Node(seq), node);
        self.link_item(seq, index, id);
        Ok(id)
    }

    /// Delete the child of a parent by tag or, for sequences, by index,
    /// together with its subtree.
    ///
    /// Returns whether a child was deleted.
    pub fn delete(&mut self, parent: impl Into<Parent>, key: impl Into<Key>) -> bool {
        match self.get(parent, key) {
            Some(id) => self.delete_node(id),
            None => false,
        }
    }

    /// Delete a node and its subtree.
    ///
    /// Returns whether the node existed.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        if self.entry(id).is_none() {
            return false;
        }
        self.unlink(id);
        self.free_subtree(id);
        true
    }

    /// Delete all children of a parent.
    pub fn delete_children(&mut self, parent: impl Into<Parent>) {
        let children: Vec<_> = self.children(parent).collect();
        for id in children {
            self.delete_node(id);
        }
    }

    /// Delete the children of a parent in the given group.
    ///
    /// Returns the number of children deleted.
    pub fn delete_group(&mut self, parent: impl Into<Parent>, group: GroupNumber) -> usize {
        let ids = self.group(parent, group);
        ids.into_iter().filter(|id| self.delete_node(*id)).count()
    }

    /// Delete all private elements and sequences
    /// below a parent, at any depth.
    ///
    /// Returns the number of nodes deleted at the top of each removed subtree.
    pub fn delete_private(&mut self, parent: impl Into<Parent>) -> usize {
        self.delete_where(parent.into(), &|_, tag| tag.is_private())
    }

    /// Delete all elements and sequences which the dictionary
    /// knows to be retired, below a parent, at any depth.
    pub fn delete_retired(&mut self, parent: impl Into<Parent>) -> usize {
        self.delete_where(parent.into(), &|dict, tag| dict.is_retired(tag))
    }

    fn delete_where(&mut self, parent: Parent, pred: &dyn Fn(&D, Tag) -> bool) -> usize {
        let mut deleted = 0;
        let children: Vec<_> = self.children(parent).collect();
        for id in children {
            let Some(node) = self.node(id) else {
                continue;
            };
            let is_item = matches!(node, Node::Item(_));
            if !is_item && pred(&self.dict, node.tag()) {
                self.delete_node(id);
                deleted += 1;
            } else {
                deleted += self.delete_where(Parent::Node(id), pred);
            }
        }
        deleted
    }

    // -- values --

    /// Fetch a top-level element by tag.
    pub fn element(&self, tag: Tag) -> Result<&Element, AccessError> {
        self.element_in(Parent::Root, tag)
    }

    /// Fetch an element of a parent by tag.
    pub fn element_in(&self, parent: impl Into<Parent>, tag: Tag) -> Result<&Element, AccessError> {
        let id = self
            .get(parent, tag)
            .context(NoSuchDataElementTagSnafu { tag })?;
        match self.node(id) {
            Some(Node::Element(e)) => Ok(e),
            Some(other) => NotAnElementSnafu {
                tag,
                kind: other.kind(),
            }
            .fail(),
            None => NoSuchDataElementTagSnafu { tag }.fail(),
        }
    }

    /// Fetch a top-level element by tag, for modification.
    pub fn element_mut(&mut self, tag: Tag) -> Result<&mut Element, AccessError> {
        let id = self
            .get(Parent::Root, tag)
            .context(NoSuchDataElementTagSnafu { tag })?;
        let kind = match self.node(id) {
            Some(node) => node.kind(),
            None => return NoSuchDataElementTagSnafu { tag }.fail(),
        };
        self.element_at_mut(id)
            .context(NotAnElementSnafu { tag, kind })
    }

    /// Fetch a top-level element by its dictionary name, such as `PatientName`.
    pub fn element_by_name(&self, name: &str) -> Result<&Element, AccessByNameError> {
        let tag = self
            .dict
            .by_name(name)
            .map(|entry| entry.tag.inner())
            .context(NoSuchAttributeNameSnafu { name })?;
        self.element(tag).map_err(|e| e.into_access_by_name(name))
    }

    /// Decode the value of a top-level element.
    ///
    /// Fails if the tag is missing or refers to a sequence.
    pub fn value(&self, tag: Tag) -> Result<Value, AccessError> {
        self.value_in(Parent::Root, tag)
    }

    /// Decode the value of an element of a parent.
    pub fn value_in(&self, parent: impl Into<Parent>, tag: Tag) -> Result<Value, AccessError> {
        self.element_in(parent, tag)?
            .value()
            .context(DecodeValueSnafu { tag })
    }

    /// Set the value of a top-level element,
    /// creating it with the dictionary VR if it does not exist.
    pub fn set_value(&mut self, tag: Tag, value: impl Into<Value>) -> Result<NodeId, ModifyError> {
        self.set_value_in(Parent::Root, tag, value)
    }

    /// Set the value of an element of a parent,
    /// creating it with the dictionary VR if it does not exist.
    ///
    /// The value is converted to the kind expected by the element's VR.
    pub fn set_value_in(
        &mut self,
        parent: impl Into<Parent>,
        tag: Tag,
        value: impl Into<Value>,
    ) -> Result<NodeId, ModifyError> {
        let parent = parent.into();
        let value = value.into();
        if let Some(id) = self.get(parent, tag) {
            let kind = self.node(id).map(Node::kind).unwrap_or("node");
            let elem = self
                .element_at_mut(id)
                .context(SetNonElementSnafu { tag, kind })?;
            elem.set_value(value).context(EncodeValueSnafu { tag })?;
            return Ok(id);
        }
        let vr = self.dict.lookup(tag).vr();
        let elem = Element::new(tag, vr, value).context(EncodeValueSnafu { tag })?;
        self.add(parent, elem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModifyError;
    use dcm_dictionary_std::tags;
    use matches::assert_matches;

    fn sequence_with_items(obj: &mut DicomObject, n: usize) -> NodeId {
        let seq = obj
            .add(Parent::Root, Sequence::new(tags::REFERENCED_IMAGE_SEQUENCE))
            .unwrap();
        for i in 0..n {
            let item = obj.add_item(seq, None, None).unwrap();
            obj.set_value_in(item, tags::REFERENCED_SOP_INSTANCE_UID, format!("1.2.{}", i))
                .unwrap();
        }
        seq
    }

    fn uid_of_item(obj: &DicomObject, item: NodeId) -> String {
        obj.value_in(item, tags::REFERENCED_SOP_INSTANCE_UID)
            .unwrap()
            .to_str()
            .into_owned()
    }

    #[test]
    fn odd_string_is_padded() {
        let mut obj = DicomObject::new();
        let id = obj.set_value(tags::PATIENT_NAME, "OddName").unwrap();
        let elem = obj.element_at(id).unwrap();
        assert_eq!(elem.vr(), VR::PN);
        assert_eq!(elem.len(), 8);
        assert_eq!(elem.bin(), b"OddName ");
        assert_eq!(obj.value(tags::PATIENT_NAME).unwrap(), Value::from("OddName"));
    }

    #[test]
    fn dictionary_driven_defaulting() {
        let mut obj = DicomObject::new();
        obj.set_value(tags::ROWS, "512").unwrap();
        let rows = obj.element(tags::ROWS).unwrap();
        assert_eq!(rows.vr(), VR::US);
        assert_eq!(rows.bin(), &[0x00, 0x02]);
        assert_eq!(obj.value(tags::ROWS).unwrap().to_int::<u16>().unwrap(), 512);

        // replacing keeps the node
        let id = obj.get(Parent::Root, tags::ROWS).unwrap();
        assert_eq!(obj.set_value(tags::ROWS, 256_u16).unwrap(), id);
    }

    #[test]
    fn item_insertion_shifts_indices() {
        let mut obj = DicomObject::new();
        let seq = sequence_with_items(&mut obj, 2);
        let old_second = obj.get(seq, 1_usize).unwrap();

        let new = obj.add_item(seq, None, Some(1)).unwrap();
        assert_eq!(obj.count(seq), 3);
        assert_eq!(obj.index_of(new), Some(1));
        assert_eq!(obj.index_of(old_second), Some(2));
        assert_eq!(uid_of_item(&obj, old_second), "1.2.1");

        // indices stay dense after deletion
        assert!(obj.delete(seq, 0_usize));
        assert_eq!(obj.index_of(new), Some(0));
        assert_eq!(obj.index_of(old_second), Some(1));

        assert_matches!(
            obj.add_item(seq, None, Some(5)),
            Err(ModifyError::ItemIndexOutOfBounds { index: 5, len: 2, .. })
        );
    }

    #[test]
    fn type_checked_add() {
        let mut obj = DicomObject::new();
        let seq = sequence_with_items(&mut obj, 1);
        let item = obj.get(seq, 0_usize).unwrap();

        assert_matches!(
            obj.add(seq, Element::new(tags::PATIENT_ID, VR::LO, "X").unwrap()),
            Err(ModifyError::NotAnItem { .. })
        );
        assert_matches!(
            obj.add(
                seq,
                Element::from_bin(tags::DATA_SET_TRAILING_PADDING, VR::OB, vec![0; 4])
            ),
            Err(ModifyError::NotAnItem { .. })
        );
        assert_matches!(
            obj.add(Parent::Root, Item::new()),
            Err(ModifyError::ItemOutsideSequence { .. })
        );
        let elem = obj.get(item, tags::REFERENCED_SOP_INSTANCE_UID).unwrap();
        assert_matches!(
            obj.add(elem, Item::new()),
            Err(ModifyError::NotAParent { .. })
        );

        // items can be added through `add` as well
        let second = obj.add(seq, Item::new()).unwrap();
        assert_eq!(obj.index_of(second), Some(1));

        // trailing padding may go to items and the root
        obj.add(
            item,
            Element::from_bin(tags::DATA_SET_TRAILING_PADDING, VR::OB, vec![0; 4]),
        )
        .unwrap();
    }

    #[test]
    fn parents_chain() {
        let mut obj = DicomObject::new();
        let seq = sequence_with_items(&mut obj, 1);
        let item = obj.get(seq, 0_usize).unwrap();
        let elem = obj.get(item, tags::REFERENCED_SOP_INSTANCE_UID).unwrap();

        assert_eq!(obj.parent(elem), Some(Parent::Node(item)));
        assert_eq!(
            obj.parents(elem),
            vec![Parent::Node(item), Parent::Node(seq), Parent::Root]
        );
        assert_eq!(obj.top_parent(elem), Some(Parent::Root));
        assert_eq!(obj.parent(seq), Some(Parent::Root));
    }

    #[test]
    fn delete_frees_subtree() {
        let mut obj = DicomObject::new();
        let seq = sequence_with_items(&mut obj, 2);
        let item = obj.get(seq, 0_usize).unwrap();
        assert_eq!(obj.count_all(Parent::Root), 5);

        assert!(obj.delete(Parent::Root, tags::REFERENCED_IMAGE_SEQUENCE));
        assert!(obj.node(seq).is_none());
        assert!(obj.node(item).is_none());
        assert_eq!(obj.parent(item), None);
        assert_eq!(obj.count_all(Parent::Root), 0);
        assert!(!obj.delete_node(seq));

        // reused slots do not revive stale handles
        let id = obj.set_value(tags::PATIENT_ID, "ID").unwrap();
        assert!(obj.node(id).is_some());
        assert!(obj.node(seq).is_none());
    }

    #[test]
    fn value_of_sequence_is_an_error() {
        let mut obj = DicomObject::new();
        sequence_with_items(&mut obj, 1);
        assert_matches!(
            obj.value(tags::REFERENCED_IMAGE_SEQUENCE),
            Err(AccessError::NotAnElement { kind: "sequence", .. })
        );
        assert_matches!(
            obj.value(tags::PATIENT_NAME),
            Err(AccessError::NoSuchDataElementTag { .. })
        );
    }

    #[test]
    fn groups_private_and_retired() {
        let mut obj = DicomObject::new();
        obj.set_value(tags::PATIENT_NAME, "A^B").unwrap();
        obj.set_value(tags::PATIENT_ID, "1").unwrap();
        obj.set_value(tags::MODALITY, "CT").unwrap();
        obj.set_value(tags::RECOGNITION_CODE, "X").unwrap();
        obj.set_value(Tag(0x0009, 0x0010), "ACME").unwrap();
        obj.set_value(Tag(0x0009, 0x1001), vec![1_u8, 2]).unwrap();
        let seq = sequence_with_items(&mut obj, 1);
        let item = obj.get(seq, 0_usize).unwrap();
        obj.set_value_in(item, Tag(0x0011, 0x0010), "ACME").unwrap();

        assert_eq!(obj.group(Parent::Root, 0x0010).len(), 2);
        assert!(obj.exists(Parent::Root, tags::PATIENT_ID));

        assert_eq!(obj.delete_private(Parent::Root), 3);
        assert!(!obj.exists(Parent::Root, Tag(0x0009, 0x0010)));
        assert!(!obj.exists(item, Tag(0x0011, 0x0010)));

        assert_eq!(obj.delete_retired(Parent::Root), 1);
        assert!(!obj.exists(Parent::Root, tags::RECOGNITION_CODE));

        assert_eq!(obj.delete_group(Parent::Root, 0x0010), 2);
        assert_eq!(obj.count(Parent::Root), 2);

        obj.delete_children(Parent::Root);
        assert_eq!(obj.count_all(Parent::Root), 0);
    }

    #[test]
    fn names_from_dictionary_or_override() {
        let mut obj = DicomObject::new();
        let id = obj.set_value(tags::PATIENT_NAME, "A").unwrap();
        assert_eq!(obj.name_of(id).unwrap(), "PatientName");
        let id = obj
            .add(
                Parent::Root,
                Element::new(Tag(0x0009, 0x1001), VR::LO, "v")
                    .unwrap()
                    .with_name("Vendor Thing"),
            )
            .unwrap();
        assert_eq!(obj.name_of(id).unwrap(), "Vendor Thing");
        let id = obj.set_value(Tag(0x0009, 0x1002), "w").unwrap();
        assert_eq!(obj.name_of(id).unwrap(), "Private");
        assert_eq!(obj.element_by_name("PatientName").unwrap().tag(), tags::PATIENT_NAME);
        assert!(obj.element_by_name("NoSuchThing").is_err());
    }
}
