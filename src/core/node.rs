//! XMP node types
//!
//! This module defines the node types used in the XMP data model:
//! - SimpleNode: A simple value node
//! - ArrayNode: An array of nodes (ordered, unordered, or alternative)
//! - StructureNode: A structure containing named fields
//!
//! Every node can carry qualifiers, which are nodes themselves. A node's name
//! is held by its owner (the structure's field table or the qualifier
//! table); array items are anonymous and addressed by 1-based position.
//! Removing a node hands back the owned subtree with no link to its former
//! owner.

use crate::core::error::{XmpError, XmpResult};
use crate::types::qname::QName;
use crate::types::value::ValueHint;

/// Language tag of the default item in a language alternative
pub const X_DEFAULT: &str = "x-default";

/// Type of array node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ArrayType {
    /// Ordered array (rdf:Seq)
    Ordered,
    /// Unordered array (rdf:Bag)
    Unordered,
    /// Alternative array (rdf:Alt)
    Alternative,
}

impl ArrayType {
    /// Get the RDF type name for this array type
    pub fn rdf_type(&self) -> &'static str {
        match self {
            ArrayType::Ordered => "Seq",
            ArrayType::Unordered => "Bag",
            ArrayType::Alternative => "Alt",
        }
    }

    /// Map an RDF container name to an array type
    pub fn from_rdf_type(name: &str) -> Option<Self> {
        match name {
            "Seq" => Some(ArrayType::Ordered),
            "Bag" => Some(ArrayType::Unordered),
            "Alt" => Some(ArrayType::Alternative),
            _ => None,
        }
    }
}

/// The kind of node to create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// An empty simple node
    Simple,
    /// An empty structure
    Structure,
    /// An empty array of the given form
    Array(ArrayType),
}

/// Where to insert a new array item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemPosition {
    /// At a 1-based index; `len + 1` appends
    At(usize),
    /// After the last item
    Append,
}

/// Which fallback step selected a localized text item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LangMatch {
    /// Exact match on the specific language
    Specific,
    /// Prefix match on the generic language
    Generic,
    /// The `x-default` item
    Default,
    /// The first item
    First,
}

/// Ordered table of named nodes, unique by name
///
/// Used for structure fields and for qualifiers. Insertion order is kept.
#[derive(Debug, Clone, Default)]
pub struct NamedNodes {
    entries: Vec<(QName, Node)>,
}

impl NamedNodes {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, name: &QName) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    /// Get a node by name
    pub fn get(&self, name: &QName) -> Option<&Node> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, node)| node)
    }

    /// Get a mutable node by name
    pub fn get_mut(&mut self, name: &QName) -> Option<&mut Node> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Check if a name is present
    pub fn contains(&self, name: &QName) -> bool {
        self.position(name).is_some()
    }

    /// Add a new entry, failing if the name is taken
    pub fn insert(&mut self, name: QName, node: Node) -> XmpResult<&mut Node> {
        if self.contains(&name) {
            return Err(XmpError::DuplicateName(name.to_string()));
        }
        self.entries.push((name, node));
        let last = self.entries.len() - 1;
        Ok(&mut self.entries[last].1)
    }

    /// Add or replace an entry, returning the replaced node
    ///
    /// A replaced entry keeps its position.
    pub fn set(&mut self, name: QName, node: Node) -> Option<Node> {
        match self.position(&name) {
            Some(pos) => Some(std::mem::replace(&mut self.entries[pos].1, node)),
            None => {
                self.entries.push((name, node));
                None
            }
        }
    }

    /// Get an entry, inserting the result of `make` when missing
    pub fn get_or_insert_with(&mut self, name: QName, make: impl FnOnce() -> Node) -> &mut Node {
        let pos = match self.position(&name) {
            Some(pos) => pos,
            None => {
                self.entries.push((name, make()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[pos].1
    }

    /// Remove an entry, returning the detached node
    pub fn remove(&mut self, name: &QName) -> Option<Node> {
        self.position(name).map(|pos| self.entries.remove(pos).1)
    }

    /// Keep only the entries for which `keep` returns `true`
    pub fn retain(&mut self, mut keep: impl FnMut(&QName, &Node) -> bool) {
        self.entries.retain(|(name, node)| keep(name, node));
    }

    /// Iterate over entries in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&QName, &Node)> {
        self.entries.iter().map(|(name, node)| (name, node))
    }

    /// Iterate mutably over entries in insertion order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&QName, &mut Node)> {
        self.entries.iter_mut().map(|(name, node)| (&*name, node))
    }

    /// Names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &QName> {
        self.entries.iter().map(|(name, _)| name)
    }

    /// Order-insensitive comparison of names and nodes
    pub fn semantic_eq(&self, other: &NamedNodes) -> bool {
        self.len() == other.len()
            && self.iter().all(|(name, node)| {
                other
                    .get(name)
                    .map(|o| node.semantic_eq(o))
                    .unwrap_or(false)
            })
    }
}

impl IntoIterator for NamedNodes {
    type Item = (QName, Node);
    type IntoIter = std::vec::IntoIter<(QName, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A simple value node
#[derive(Debug, Clone, Default)]
pub struct SimpleNode {
    /// The value of the node
    pub value: String,
    /// Optional semantic hint for the value
    pub hint: Option<ValueHint>,
    /// Qualifiers attached to this node
    pub qualifiers: NamedNodes,
}

impl SimpleNode {
    /// Create a new simple node
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            hint: None,
            qualifiers: NamedNodes::new(),
        }
    }

    /// Check if the value is a URI reference
    pub fn is_uri(&self) -> bool {
        self.hint == Some(ValueHint::Uri)
    }
}

/// An array node containing anonymous items
#[derive(Debug, Clone)]
pub struct ArrayNode {
    /// The items in the array
    pub items: Vec<Node>,
    /// The type of array
    pub array_type: ArrayType,
    /// Qualifiers attached to this node
    pub qualifiers: NamedNodes,
}

impl ArrayNode {
    /// Create a new array node
    pub fn new(array_type: ArrayType) -> Self {
        Self {
            items: Vec::new(),
            array_type,
            qualifiers: NamedNodes::new(),
        }
    }

    /// Get the number of items in the array
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the array is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get an item by 1-based index
    pub fn get(&self, index: usize) -> Option<&Node> {
        index.checked_sub(1).and_then(|i| self.items.get(i))
    }

    /// Get a mutable item by 1-based index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        index.checked_sub(1).and_then(move |i| self.items.get_mut(i))
    }

    /// Append an item to the array
    pub fn append(&mut self, node: Node) {
        self.items.push(node);
    }

    /// Insert an item at a 1-based index (`len + 1` appends)
    pub fn insert(&mut self, index: usize, node: Node) -> XmpResult<()> {
        if index == 0 || index > self.items.len() + 1 {
            return Err(XmpError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        self.items.insert(index - 1, node);
        Ok(())
    }

    /// Remove the item at a 1-based index
    pub fn remove(&mut self, index: usize) -> XmpResult<Node> {
        if index == 0 || index > self.items.len() {
            return Err(XmpError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index - 1))
    }

    /// Check if this is a language alternative
    ///
    /// An Alt array whose items all carry `xml:lang`. An empty Alt counts.
    pub fn is_lang_alt(&self) -> bool {
        self.array_type == ArrayType::Alternative && self.items.iter().all(|i| i.lang().is_some())
    }

    /// 1-based index of the item tagged with `lang` (ASCII case-insensitive)
    pub fn find_lang(&self, lang: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.lang().is_some_and(|l| l.eq_ignore_ascii_case(lang)))
            .map(|i| i + 1)
    }

    /// Select the best item of a language alternative
    ///
    /// Tries, in order: the exact `specific_lang`; an item whose language is
    /// `generic_lang` or starts with `generic_lang` followed by `-`; the
    /// `x-default` item; the first item. Returns the 1-based index, the item
    /// and the step that matched, or `None` for an empty array.
    pub fn resolve_localized_text(
        &self,
        generic_lang: &str,
        specific_lang: &str,
    ) -> Option<(usize, &Node, LangMatch)> {
        if !specific_lang.is_empty() {
            if let Some(index) = self.find_lang(specific_lang) {
                return Some((index, &self.items[index - 1], LangMatch::Specific));
            }
        }

        if !generic_lang.is_empty() {
            let generic = self.items.iter().position(|item| {
                item.lang()
                    .is_some_and(|lang| lang_has_prefix(lang, generic_lang))
            });
            if let Some(pos) = generic {
                return Some((pos + 1, &self.items[pos], LangMatch::Generic));
            }
        }

        if let Some(index) = self.find_lang(X_DEFAULT) {
            return Some((index, &self.items[index - 1], LangMatch::Default));
        }

        self.items.first().map(|item| (1, item, LangMatch::First))
    }
}

pub(crate) fn lang_has_prefix(lang: &str, generic: &str) -> bool {
    if lang.len() < generic.len() || !lang.is_char_boundary(generic.len()) {
        return false;
    }
    let (head, tail) = lang.split_at(generic.len());
    head.eq_ignore_ascii_case(generic) && (tail.is_empty() || tail.starts_with('-'))
}

/// A structure node containing named fields
#[derive(Debug, Clone, Default)]
pub struct StructureNode {
    /// The fields in the structure, in insertion order
    pub fields: NamedNodes,
    /// Qualifiers attached to this node
    pub qualifiers: NamedNodes,
}

impl StructureNode {
    /// Create a new structure node
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field by name
    pub fn get_field(&self, name: &QName) -> Option<&Node> {
        self.fields.get(name)
    }

    /// Get a mutable reference to a field by name
    pub fn get_field_mut(&mut self, name: &QName) -> Option<&mut Node> {
        self.fields.get_mut(name)
    }

    /// Set a field, replacing any existing field of that name
    pub fn set_field(&mut self, name: QName, node: Node) -> Option<Node> {
        self.fields.set(name, node)
    }

    /// Add a field, failing with `DuplicateName` if it exists
    pub fn insert_field(&mut self, name: QName, node: Node) -> XmpResult<&mut Node> {
        self.fields.insert(name, node)
    }

    /// Remove a field
    pub fn remove_field(&mut self, name: &QName) -> Option<Node> {
        self.fields.remove(name)
    }

    /// Check if a field exists
    pub fn has_field(&self, name: &QName) -> bool {
        self.fields.contains(name)
    }

    /// Get all field names
    pub fn field_names(&self) -> impl Iterator<Item = &QName> {
        self.fields.names()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the structure has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A node in the XMP data model
#[derive(Debug, Clone)]
pub enum Node {
    /// A simple value node
    Simple(SimpleNode),
    /// An array node
    Array(ArrayNode),
    /// A structure node
    Structure(StructureNode),
}

impl Default for Node {
    fn default() -> Self {
        Node::simple("")
    }
}

impl Node {
    /// Create a new simple node
    pub fn simple(value: impl Into<String>) -> Self {
        Node::Simple(SimpleNode::new(value))
    }

    /// Create a simple node with a semantic hint
    pub fn simple_with_hint(value: impl Into<String>, hint: Option<ValueHint>) -> Self {
        let mut node = SimpleNode::new(value);
        node.hint = hint;
        Node::Simple(node)
    }

    /// Create a new array node
    pub fn array(array_type: ArrayType) -> Self {
        Node::Array(ArrayNode::new(array_type))
    }

    /// Create a new structure node
    pub fn structure() -> Self {
        Node::Structure(StructureNode::new())
    }

    /// Create an empty node of the given kind
    pub fn from_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Simple => Node::simple(""),
            NodeKind::Structure => Node::structure(),
            NodeKind::Array(array_type) => Node::array(array_type),
        }
    }

    /// The kind of this node
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Simple(_) => NodeKind::Simple,
            Node::Structure(_) => NodeKind::Structure,
            Node::Array(array) => NodeKind::Array(array.array_type),
        }
    }

    /// Human readable kind name, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Simple(_) => "simple",
            Node::Array(_) => "array",
            Node::Structure(_) => "structure",
        }
    }

    /// Check if this is a simple node
    pub fn is_simple(&self) -> bool {
        matches!(self, Node::Simple(_))
    }

    /// Check if this is an array node
    pub fn is_array(&self) -> bool {
        matches!(self, Node::Array(_))
    }

    /// Check if this is a structure node
    pub fn is_structure(&self) -> bool {
        matches!(self, Node::Structure(_))
    }

    /// Get the simple node, if this is a simple node
    pub fn as_simple(&self) -> Option<&SimpleNode> {
        match self {
            Node::Simple(node) => Some(node),
            _ => None,
        }
    }

    /// Get the array node, if this is an array node
    pub fn as_array(&self) -> Option<&ArrayNode> {
        match self {
            Node::Array(node) => Some(node),
            _ => None,
        }
    }

    /// Get the structure node, if this is a structure node
    pub fn as_structure(&self) -> Option<&StructureNode> {
        match self {
            Node::Structure(node) => Some(node),
            _ => None,
        }
    }

    /// Get a mutable reference to the simple node, if this is a simple node
    pub fn as_simple_mut(&mut self) -> Option<&mut SimpleNode> {
        match self {
            Node::Simple(node) => Some(node),
            _ => None,
        }
    }

    /// Get a mutable reference to the array node, if this is an array node
    pub fn as_array_mut(&mut self) -> Option<&mut ArrayNode> {
        match self {
            Node::Array(node) => Some(node),
            _ => None,
        }
    }

    /// Get a mutable reference to the structure node, if this is a structure node
    pub fn as_structure_mut(&mut self) -> Option<&mut StructureNode> {
        match self {
            Node::Structure(node) => Some(node),
            _ => None,
        }
    }

    /// The text value, for simple nodes
    pub fn value(&self) -> Option<&str> {
        self.as_simple().map(|s| s.value.as_str())
    }

    /// The node's qualifiers
    pub fn qualifiers(&self) -> &NamedNodes {
        match self {
            Node::Simple(node) => &node.qualifiers,
            Node::Array(node) => &node.qualifiers,
            Node::Structure(node) => &node.qualifiers,
        }
    }

    fn qualifiers_mut(&mut self) -> &mut NamedNodes {
        match self {
            Node::Simple(node) => &mut node.qualifiers,
            Node::Array(node) => &mut node.qualifiers,
            Node::Structure(node) => &mut node.qualifiers,
        }
    }

    /// Check if the node has any qualifiers
    pub fn has_qualifiers(&self) -> bool {
        !self.qualifiers().is_empty()
    }

    /// Levels of qualification below this node (0 when unqualified)
    pub fn qualifier_depth(&self) -> usize {
        self.qualifiers()
            .iter()
            .map(|(_, q)| 1 + q.qualifier_depth())
            .max()
            .unwrap_or(0)
    }

    /// Copy the subtree, leaving out empty nodes
    ///
    /// A simple node with an empty value, a structure without fields and an
    /// array without items are empty; containers are judged after their own
    /// children were filtered. An empty node that still has qualifiers is
    /// kept unless `drop_qualified` is set. Returns `None` when `self` is
    /// left out.
    pub fn clone_ignoring_empty(&self, drop_qualified: bool) -> Option<Node> {
        let mut qualifiers = NamedNodes::new();
        for (name, qualifier) in self.qualifiers().iter() {
            if let Some(kept) = qualifier.clone_ignoring_empty(drop_qualified) {
                qualifiers.entries.push((name.clone(), kept));
            }
        }
        let keep_empty = !drop_qualified && !qualifiers.is_empty();

        let copy = match self {
            Node::Simple(simple) => {
                if simple.value.is_empty() && !keep_empty {
                    return None;
                }
                Node::Simple(SimpleNode {
                    value: simple.value.clone(),
                    hint: simple.hint,
                    qualifiers,
                })
            }
            Node::Structure(structure) => {
                let mut fields = NamedNodes::new();
                for (name, field) in structure.fields.iter() {
                    if let Some(kept) = field.clone_ignoring_empty(drop_qualified) {
                        fields.entries.push((name.clone(), kept));
                    }
                }
                if fields.is_empty() && !keep_empty {
                    return None;
                }
                Node::Structure(StructureNode { fields, qualifiers })
            }
            Node::Array(array) => {
                let items: Vec<Node> = array
                    .items
                    .iter()
                    .filter_map(|item| item.clone_ignoring_empty(drop_qualified))
                    .collect();
                if items.is_empty() && !keep_empty {
                    return None;
                }
                Node::Array(ArrayNode {
                    items,
                    array_type: array.array_type,
                    qualifiers,
                })
            }
        };
        Some(copy)
    }

    fn check_qualifier(name: &QName, qualifier: &Node) -> XmpResult<()> {
        if qualifier.qualifier_depth() > 1 {
            return Err(XmpError::QualifierTooDeep(format!(
                "qualifier {} carries more than one level of qualification",
                name
            )));
        }
        Ok(())
    }

    /// Attach a new qualifier
    ///
    /// Fails with `DuplicateName` if the qualifier exists and with
    /// `QualifierTooDeep` if `qualifier` has qualified qualifiers.
    pub fn add_qualifier(&mut self, name: QName, qualifier: Node) -> XmpResult<&mut Node> {
        Self::check_qualifier(&name, &qualifier)?;
        self.qualifiers_mut().insert(name, qualifier)
    }

    /// Attach or replace a qualifier, returning the replaced one
    pub fn set_qualifier(&mut self, name: QName, qualifier: Node) -> XmpResult<Option<Node>> {
        Self::check_qualifier(&name, &qualifier)?;
        Ok(self.qualifiers_mut().set(name, qualifier))
    }

    /// Get a qualifier by name
    pub fn get_qualifier(&self, name: &QName) -> Option<&Node> {
        self.qualifiers().get(name)
    }

    /// Get a mutable qualifier by name
    pub fn get_qualifier_mut(&mut self, name: &QName) -> Option<&mut Node> {
        self.qualifiers_mut().get_mut(name)
    }

    /// Get a qualifier, creating an empty node of `kind` when missing
    pub(crate) fn qualifier_or_insert(&mut self, name: QName, kind: NodeKind) -> &mut Node {
        self.qualifiers_mut()
            .get_or_insert_with(name, || Node::from_kind(kind))
    }

    /// Detach a qualifier and its subtree
    pub fn remove_qualifier(&mut self, name: &QName) -> Option<Node> {
        self.qualifiers_mut().remove(name)
    }

    /// The `xml:lang` qualifier value, if any
    pub fn lang(&self) -> Option<&str> {
        self.qualifiers()
            .iter()
            .find(|(name, _)| name.is_xml_lang())
            .and_then(|(_, q)| q.value())
    }

    fn kind_mismatch(&self, expected: &'static str) -> XmpError {
        XmpError::KindMismatch {
            expected,
            found: self.kind_name(),
        }
    }

    /// Create a named child of a structure
    pub fn create_child(&mut self, name: QName, kind: NodeKind) -> XmpResult<&mut Node> {
        match self {
            Node::Structure(structure) => structure.insert_field(name, Node::from_kind(kind)),
            _ => Err(self.kind_mismatch("structure")),
        }
    }

    /// Insert a new item into an array
    pub fn insert_array_item(
        &mut self,
        position: ItemPosition,
        kind: NodeKind,
    ) -> XmpResult<&mut Node> {
        let Node::Array(array) = self else {
            return Err(self.kind_mismatch("array"));
        };
        let index = match position {
            ItemPosition::At(index) => index,
            ItemPosition::Append => array.len() + 1,
        };
        array.insert(index, Node::from_kind(kind))?;
        Ok(&mut array.items[index - 1])
    }

    /// Get a named child of a structure
    pub fn get_child(&self, name: &QName) -> XmpResult<Option<&Node>> {
        match self {
            Node::Structure(structure) => Ok(structure.get_field(name)),
            _ => Err(self.kind_mismatch("structure")),
        }
    }

    /// Get a mutable named child of a structure
    pub fn get_child_mut(&mut self, name: &QName) -> XmpResult<Option<&mut Node>> {
        match self {
            Node::Structure(structure) => Ok(structure.get_field_mut(name)),
            _ => Err(self.kind_mismatch("structure")),
        }
    }

    /// Get an array item by 1-based index
    pub fn get_item(&self, index: usize) -> XmpResult<Option<&Node>> {
        match self {
            Node::Array(array) => Ok(array.get(index)),
            _ => Err(self.kind_mismatch("array")),
        }
    }

    /// Get a mutable array item by 1-based index
    pub fn get_item_mut(&mut self, index: usize) -> XmpResult<Option<&mut Node>> {
        match self {
            Node::Array(array) => Ok(array.get_mut(index)),
            _ => Err(self.kind_mismatch("array")),
        }
    }

    /// Detach a named child of a structure
    pub fn remove_child(&mut self, name: &QName) -> XmpResult<Option<Node>> {
        match self {
            Node::Structure(structure) => Ok(structure.remove_field(name)),
            _ => Err(self.kind_mismatch("structure")),
        }
    }

    /// Detach an array item by 1-based index
    pub fn remove_item(&mut self, index: usize) -> XmpResult<Node> {
        match self {
            Node::Array(array) => array.remove(index),
            _ => Err(self.kind_mismatch("array")),
        }
    }

    /// Number of fields or items (0 for simple nodes)
    pub fn child_count(&self) -> usize {
        match self {
            Node::Simple(_) => 0,
            Node::Array(array) => array.len(),
            Node::Structure(structure) => structure.len(),
        }
    }

    /// Compare two subtrees for semantic equality
    ///
    /// Field and qualifier order is ignored; unordered arrays are compared as
    /// multisets, ordered and alternative arrays item by item. Of the value
    /// hints only the URI marker is significant.
    pub fn semantic_eq(&self, other: &Node) -> bool {
        if !self.qualifiers().semantic_eq(other.qualifiers()) {
            return false;
        }
        match (self, other) {
            (Node::Simple(a), Node::Simple(b)) => a.value == b.value && a.is_uri() == b.is_uri(),
            (Node::Structure(a), Node::Structure(b)) => a.fields.semantic_eq(&b.fields),
            (Node::Array(a), Node::Array(b)) => {
                if a.array_type != b.array_type || a.len() != b.len() {
                    return false;
                }
                if a.array_type != ArrayType::Unordered {
                    return a.items.iter().zip(&b.items).all(|(x, y)| x.semantic_eq(y));
                }
                let mut used = vec![false; b.len()];
                a.items.iter().all(|x| {
                    let found = b
                        .items
                        .iter()
                        .enumerate()
                        .position(|(i, y)| !used[i] && x.semantic_eq(y));
                    match found {
                        Some(i) => {
                            used[i] = true;
                            true
                        }
                        None => false,
                    }
                })
            }
            _ => false,
        }
    }
}
