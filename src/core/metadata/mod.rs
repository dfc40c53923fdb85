//! XMP Metadata
//!
//! This module provides the main [`XmpMeta`] struct for working with XMP
//! metadata. Properties are addressed with path expressions resolved against
//! the object's own namespace map:
//!
//! - `xmp:CreatorTool` a top-level property
//! - `dc:creator[2]`, `dc:creator[last()]` array items
//! - `exif:Flash/exif:Fired` structure fields
//! - `dc:title[@xml:lang='en-US']` an item selected by qualifier
//! - `xmpMM:History[stEvt:action='saved']` an item selected by field
//! - `dc:source/@xmp:note` a qualifier

use crate::core::error::{XmpError, XmpResult};
use crate::core::iterator::{IterOptions, NodeIter};
use crate::core::namespace::NamespaceMap;
use crate::core::node::{
    lang_has_prefix, ArrayNode, ArrayType, ItemPosition, LangMatch, NamedNodes, Node, NodeKind,
    StructureNode, X_DEFAULT,
};
use crate::core::parser::{ParseOptions, ParseWarning, ParsedPacket, RdfParser};
use crate::core::serializer::{SerializeOptions, XmpSerializer};
use crate::core::xml::decode_packet_bytes;
use crate::core::xpath::{PathSegment, PropertyOptions, XmpPath};
use crate::types::qname::QName;
use crate::types::value::{parse_bool, ValueHint, XmpValue};
use std::str::FromStr;

mod shared;

pub use shared::SharedMeta;

/// An incremental parse in progress
///
/// Created by [`XmpMeta::begin_incremental`]; chunks are fed through
/// [`XmpMeta::parse_chunk`].
#[derive(Debug)]
pub struct IncrementalParse {
    parser: RdfParser,
    chunks: usize,
    bytes: usize,
}

impl IncrementalParse {
    /// Number of chunks fed so far
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Number of bytes fed so far
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

/// Where [`XmpMeta::parse_into`] puts the parsed top-level properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseAction {
    /// Add them to the target structure (failing on a name already
    /// present) or append them as items of the target array
    AppendAsChildren,
    /// Replace the same-named fields of the target structure, each of
    /// which must exist, or all items of the target array
    ReplaceChildren,
    /// Replace same-named fields and add the others; an array target
    /// behaves as with `ReplaceChildren`
    AppendOrReplaceChildren,
    /// Insert them as items before the target array item
    InsertBefore,
    /// Insert them as items after the target array item
    InsertAfter,
    /// Replace the target node with the single parsed property, keeping
    /// the target's name; an empty path replaces every property
    Replace,
}

/// Main structure for working with XMP metadata
#[derive(Debug)]
pub struct XmpMeta {
    /// Root structure node containing all properties
    root: Node,
    /// Namespace map
    namespaces: NamespaceMap,
    /// About URI (typically empty string for main metadata)
    about_uri: Option<String>,
    /// Recoveries made by the last permissive parse
    warnings: Vec<ParseWarning>,
    incremental: Option<IncrementalParse>,
}

impl XmpMeta {
    /// Create a new empty XMP metadata object
    pub fn new() -> Self {
        Self {
            root: Node::structure(),
            namespaces: NamespaceMap::new(),
            about_uri: None,
            warnings: Vec::new(),
            incremental: None,
        }
    }

    /// Parse XMP metadata from a string
    ///
    /// The string should contain a complete XMP Packet (with or without
    /// the `<?xpacket>` wrapper). The parse is strict; use
    /// [`XmpMeta::parse_with`] for permissive parsing.
    pub fn parse(s: &str) -> XmpResult<Self> {
        Self::parse_with(s, ParseOptions::default())
    }

    /// Parse XMP metadata from a string with explicit options
    pub fn parse_with(s: &str, options: ParseOptions) -> XmpResult<Self> {
        let packet = RdfParser::parse(s, &options)?;
        let mut meta = Self::new();
        meta.commit(packet);
        Ok(meta)
    }

    /// Parse an encoded packet (UTF-8, or UTF-16 with or without a BOM)
    pub fn parse_bytes(bytes: &[u8], options: ParseOptions) -> XmpResult<Self> {
        let text = decode_packet_bytes(bytes)?;
        Self::parse_with(&text, options)
    }

    /// Start parsing a packet delivered in chunks
    ///
    /// Any incremental parse already in progress is abandoned. The current
    /// properties stay in place until the final chunk parses successfully.
    pub fn begin_incremental(&mut self, options: ParseOptions) {
        if self.incremental.is_some() {
            tracing::debug!("abandoning unfinished incremental parse");
        }
        self.incremental = Some(IncrementalParse {
            parser: RdfParser::new(options),
            chunks: 0,
            bytes: 0,
        });
    }

    /// The incremental parse in progress, if any
    pub fn incremental(&self) -> Option<&IncrementalParse> {
        self.incremental.as_ref()
    }

    /// Feed the next chunk of an incremental parse
    ///
    /// Returns `true` once the chunk marked final has been parsed and its
    /// properties have replaced the current ones. On error the parse is
    /// abandoned and the current properties are left untouched.
    pub fn parse_chunk(&mut self, chunk: &str, is_final: bool) -> XmpResult<bool> {
        let Some(mut pending) = self.incremental.take() else {
            return Err(XmpError::BadParam(
                "No incremental parse in progress".to_string(),
            ));
        };
        pending.chunks += 1;
        pending.bytes += chunk.len();

        match pending.parser.parse_chunk(chunk, is_final)? {
            Some(packet) => {
                tracing::debug!(
                    chunks = pending.chunks,
                    bytes = pending.bytes,
                    "incremental parse finished"
                );
                self.commit(packet);
                Ok(true)
            }
            None => {
                self.incremental = Some(pending);
                Ok(false)
            }
        }
    }

    fn commit(&mut self, packet: ParsedPacket) {
        self.adopt_namespaces(&packet.namespaces);
        self.root = packet.root;
        self.about_uri = packet.about;
        self.warnings = packet.warnings;
    }

    fn adopt_namespaces(&mut self, declared: &[(String, String)]) {
        for (prefix, uri) in declared {
            if let Err(e) = self.namespaces.register(uri, prefix) {
                tracing::debug!(prefix = %prefix, uri = %uri, error = %e, "namespace not registered");
            }
        }
    }

    /// Parse a packet and graft its properties onto the node at `path`
    ///
    /// An empty `path` addresses the root structure. See [`ParseAction`]
    /// for where the parsed top-level properties go. The tree is left
    /// unchanged when parsing or grafting fails.
    ///
    /// # Example
    ///
    /// ```rust
    /// use xmpdom::{ParseAction, ParseOptions, XmpMeta};
    ///
    /// let mut meta = XmpMeta::new();
    /// meta.set_property("xmp:Rating", "3").unwrap();
    ///
    /// let extra = r#"<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    ///   <rdf:Description rdf:about="" xmlns:xmp="http://ns.adobe.com/xap/1.0/"
    ///     xmp:Label="Red"/>
    /// </rdf:RDF>"#;
    /// meta.parse_into("", extra, ParseOptions::default(), ParseAction::AppendAsChildren)
    ///     .unwrap();
    /// assert!(meta.has_property("xmp:Label"));
    /// assert!(meta.has_property("xmp:Rating"));
    /// ```
    pub fn parse_into(
        &mut self,
        path: &str,
        xml: &str,
        options: ParseOptions,
        action: ParseAction,
    ) -> XmpResult<()> {
        let target = if path.is_empty() {
            XmpPath::default()
        } else {
            self.path(path)?
        };
        let ParsedPacket {
            root: parsed,
            namespaces,
            warnings,
            ..
        } = RdfParser::parse(xml, &options)?;
        let Node::Structure(parsed) = parsed else {
            return Err(XmpError::InternalError(
                "parsed root is not a structure".to_string(),
            ));
        };

        let mut root = self.root.clone();
        graft(&mut root, &target, parsed.fields, action)?;
        self.adopt_namespaces(&namespaces);
        self.root = root;
        self.warnings = warnings;
        tracing::debug!(?action, path, "grafted parsed properties");
        Ok(())
    }

    /// Copy the metadata without empty values, structures or arrays
    ///
    /// Empty nodes that carry qualifiers are kept unless `drop_qualified`
    /// is set. See [`Node::clone_ignoring_empty`].
    pub fn clone_ignoring_empty(&self, drop_qualified: bool) -> XmpMeta {
        Self {
            root: self
                .root
                .clone_ignoring_empty(drop_qualified)
                .unwrap_or_else(Node::structure),
            namespaces: self.namespaces.clone(),
            about_uri: self.about_uri.clone(),
            warnings: self.warnings.clone(),
            incremental: None,
        }
    }

    fn path(&self, path: &str) -> XmpResult<XmpPath> {
        XmpPath::parse(path, &self.namespaces)
    }

    /// Get the node a path addresses
    ///
    /// Returns `Ok(None)` when the node does not exist.
    pub fn get_node(&self, path: &str) -> XmpResult<Option<&Node>> {
        let path = self.path(path)?;
        match path.resolve(&self.root) {
            Ok(node) => Ok(Some(node)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Check if a property exists
    ///
    /// Malformed paths and unknown prefixes count as missing.
    pub fn has_property(&self, path: &str) -> bool {
        matches!(self.get_node(path), Ok(Some(_)))
    }

    fn get_text(&self, path: &str) -> XmpResult<Option<(&str, Option<ValueHint>)>> {
        match self.get_node(path)? {
            None => Ok(None),
            Some(Node::Simple(simple)) => Ok(Some((&simple.value, simple.hint))),
            Some(other) => Err(XmpError::KindMismatch {
                expected: "simple",
                found: other.kind_name(),
            }),
        }
    }

    /// Get a property value
    ///
    /// The value variant follows the hint recorded when the value was set;
    /// parsed values are strings (or URIs for `rdf:resource`). Arrays and
    /// structures have no value and fail with `KindMismatch`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use xmpdom::{XmpMeta, XmpValue};
    ///
    /// let mut meta = XmpMeta::new();
    /// meta.set_property("xmp:Rating", 5i64).unwrap();
    /// assert_eq!(meta.get_property("xmp:Rating").unwrap(), Some(XmpValue::Integer(5)));
    /// assert_eq!(meta.get_property("xmp:Label").unwrap(), None);
    /// ```
    pub fn get_property(&self, path: &str) -> XmpResult<Option<XmpValue>> {
        let Some((text, hint)) = self.get_text(path)? else {
            return Ok(None);
        };
        let value = match hint {
            Some(ValueHint::Uri) => XmpValue::Uri(text.to_string()),
            Some(ValueHint::Date) => XmpValue::DateTime(text.to_string()),
            Some(ValueHint::Boolean) => match parse_bool(text) {
                Some(b) => XmpValue::Boolean(b),
                None => XmpValue::String(text.to_string()),
            },
            Some(ValueHint::Integer) => match text.trim().parse() {
                Ok(i) => XmpValue::Integer(i),
                Err(_) => XmpValue::String(text.to_string()),
            },
            None => XmpValue::String(text.to_string()),
        };
        Ok(Some(value))
    }

    /// Get a property as a boolean
    ///
    /// Accepts `True`/`False` in any case and `1`/`0`; other text fails with
    /// `BadParam`.
    pub fn get_property_bool(&self, path: &str) -> XmpResult<Option<bool>> {
        let Some((text, _)) = self.get_text(path)? else {
            return Ok(None);
        };
        parse_bool(text)
            .map(Some)
            .ok_or_else(|| XmpError::BadParam(format!("'{}' is not a boolean", text)))
    }

    /// Get a property as an integer
    pub fn get_property_i64(&self, path: &str) -> XmpResult<Option<i64>> {
        let Some((text, _)) = self.get_text(path)? else {
            return Ok(None);
        };
        text.trim()
            .parse()
            .map(Some)
            .map_err(|_| XmpError::BadParam(format!("'{}' is not an integer", text)))
    }

    /// Set a property value
    ///
    /// Missing nodes on the path are created; arrays created on the way are
    /// ordered unless they are selected by `xml:lang`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use xmpdom::XmpMeta;
    ///
    /// let mut meta = XmpMeta::new();
    /// meta.set_property("dc:creator[2]", "Jane").unwrap();
    /// assert_eq!(meta.count_array_items("dc:creator").unwrap(), 2);
    /// ```
    pub fn set_property(&mut self, path: &str, value: impl Into<XmpValue>) -> XmpResult<()> {
        self.set_property_with(path, value, &PropertyOptions::default())
    }

    /// Set a property value, choosing the form of created nodes
    ///
    /// The existing qualifiers of the target node are kept.
    pub fn set_property_with(
        &mut self,
        path: &str,
        value: impl Into<XmpValue>,
        options: &PropertyOptions,
    ) -> XmpResult<()> {
        if !matches!(options.leaf_kind, None | Some(NodeKind::Simple)) {
            return Err(XmpError::BadParam(
                "A property value needs a simple leaf".to_string(),
            ));
        }
        let path = self.path(path)?;
        let kind = path.kind_after_create(&self.root, options)?;
        if kind != NodeKind::Simple {
            return Err(XmpError::KindMismatch {
                expected: "simple",
                found: Node::from_kind(kind).kind_name(),
            });
        }
        let (text, hint) = XmpValue::into_text(value.into());
        match path.resolve_or_create(&mut self.root, options)? {
            Node::Simple(simple) => {
                simple.value = text;
                simple.hint = hint;
                Ok(())
            }
            other => Err(XmpError::KindMismatch {
                expected: "simple",
                found: other.kind_name(),
            }),
        }
    }

    /// Delete a property, array item or qualifier and everything below it
    ///
    /// Deleting something that does not exist is not an error.
    pub fn delete_property(&mut self, path: &str) -> XmpResult<()> {
        let path = self.path(path)?;
        if path.remove(&mut self.root)?.is_some() {
            tracing::trace!(path = %path, "deleted");
        }
        Ok(())
    }

    /// Get a qualifier value
    ///
    /// `qualifier` is a prefixed name such as `xml:lang`.
    pub fn get_qualifier(&self, path: &str, qualifier: &str) -> XmpResult<Option<XmpValue>> {
        self.get_property(&format!("{}/@{}", path, qualifier))
    }

    /// Set a qualifier on an existing node
    ///
    /// Fails with `NotFound` when the qualified node does not exist.
    pub fn set_qualifier(
        &mut self,
        path: &str,
        qualifier: &str,
        value: impl Into<XmpValue>,
    ) -> XmpResult<()> {
        if self.get_node(path)?.is_none() {
            return Err(XmpError::NotFound(path.to_string()));
        }
        self.set_property(&format!("{}/@{}", path, qualifier), value)
    }

    /// Delete a qualifier
    pub fn delete_qualifier(&mut self, path: &str, qualifier: &str) -> XmpResult<()> {
        self.delete_property(&format!("{}/@{}", path, qualifier))
    }

    /// Number of items in an array, 0 when the array does not exist
    pub fn count_array_items(&self, path: &str) -> XmpResult<usize> {
        match self.get_node(path)? {
            None => Ok(0),
            Some(Node::Array(array)) => Ok(array.len()),
            Some(other) => Err(XmpError::KindMismatch {
                expected: "array",
                found: other.kind_name(),
            }),
        }
    }

    fn array_mut(&mut self, path: &str) -> XmpResult<&mut Node> {
        let parsed = self.path(path)?;
        let node = parsed.resolve_mut(&mut self.root)?;
        if !node.is_array() {
            return Err(XmpError::KindMismatch {
                expected: "array",
                found: node.kind_name(),
            });
        }
        Ok(node)
    }

    /// Append an item to an array, creating the array with `array_type` if
    /// it is missing
    ///
    /// Returns the 1-based index of the new item.
    pub fn append_array_item(
        &mut self,
        path: &str,
        array_type: ArrayType,
        value: impl Into<XmpValue>,
    ) -> XmpResult<usize> {
        let parsed = self.path(path)?;
        let options = PropertyOptions::default().array(array_type);
        let kind = parsed.kind_after_create(&self.root, &options)?;
        if !matches!(kind, NodeKind::Array(_)) {
            return Err(XmpError::KindMismatch {
                expected: "array",
                found: Node::from_kind(kind).kind_name(),
            });
        }
        let Node::Array(array) = parsed.resolve_or_create(&mut self.root, &options)? else {
            return Err(XmpError::InternalError(
                "append target is not an array".to_string(),
            ));
        };
        let (text, hint) = XmpValue::into_text(value.into());
        array.append(Node::simple_with_hint(text, hint));
        Ok(array.len())
    }

    /// Insert an item into an existing array at a 1-based index
    ///
    /// `index` may be one past the end to append.
    pub fn insert_array_item(
        &mut self,
        path: &str,
        index: usize,
        value: impl Into<XmpValue>,
    ) -> XmpResult<()> {
        let (text, hint) = XmpValue::into_text(value.into());
        let item = self
            .array_mut(path)?
            .insert_array_item(ItemPosition::At(index), NodeKind::Simple)?;
        *item = Node::simple_with_hint(text, hint);
        Ok(())
    }

    /// Delete the item at a 1-based index of an existing array
    pub fn delete_array_item(&mut self, path: &str, index: usize) -> XmpResult<()> {
        self.array_mut(path)?.remove_item(index)?;
        Ok(())
    }

    /// Get a localized text value
    ///
    /// Selects an item of the language alternative at `path`: the item for
    /// `specific_lang`, else the first item whose language is `generic_lang`
    /// or a subtag of it, else `x-default`, else the first item. Returns the
    /// value and the language of the selected item.
    ///
    /// # Example
    ///
    /// ```rust
    /// use xmpdom::XmpMeta;
    ///
    /// let mut meta = XmpMeta::new();
    /// meta.set_localized_text("dc:title", "", "en-US", "Colour").unwrap();
    ///
    /// let (value, lang) = meta
    ///     .get_localized_text("dc:title", "en", "en-GB")
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(value, "Colour");
    /// assert_eq!(lang, "en-US");
    /// ```
    pub fn get_localized_text(
        &self,
        path: &str,
        generic_lang: &str,
        specific_lang: &str,
    ) -> XmpResult<Option<(String, String)>> {
        let array = match self.get_node(path)? {
            None => return Ok(None),
            Some(Node::Array(array)) if array.array_type == ArrayType::Alternative => array,
            Some(other) => {
                return Err(XmpError::KindMismatch {
                    expected: "alternative array",
                    found: other.kind_name(),
                })
            }
        };
        let Some((_, item, matched)) = array.resolve_localized_text(generic_lang, specific_lang)
        else {
            return Ok(None);
        };
        tracing::trace!(?matched, "localized text selected");
        let value = item.value().unwrap_or_default().to_string();
        let lang = item.lang().unwrap_or_default().to_string();
        Ok(Some((value, lang)))
    }

    /// Set a localized text value
    ///
    /// The item to update is chosen like [`XmpMeta::get_localized_text`]
    /// does, then:
    ///
    /// - an exact `specific_lang` match is updated, and so is `x-default`
    ///   when it held the same text; setting `x-default` itself updates every
    ///   item that held the old default text
    /// - a generic match is updated the same way when it is the only item
    ///   with that generic language; with several, a `specific_lang` item is
    ///   appended
    /// - when only `x-default` matched, a `specific_lang` item is appended and
    ///   `x-default` is updated if it was the only item
    /// - when nothing matched, a `specific_lang` item is appended
    ///
    /// An empty alternative gets an `x-default` item first. An `x-default`
    /// item is added when the alternative ends up with a single item and
    /// none was present.
    pub fn set_localized_text(
        &mut self,
        path: &str,
        generic_lang: &str,
        specific_lang: &str,
        value: &str,
    ) -> XmpResult<()> {
        if specific_lang.is_empty() {
            return Err(XmpError::BadParam("Empty specific language".to_string()));
        }
        let parsed = self.path(path)?;
        let options = PropertyOptions::default().array(ArrayType::Alternative);
        let kind = parsed.kind_after_create(&self.root, &options)?;
        if kind != NodeKind::Array(ArrayType::Alternative) {
            return Err(XmpError::KindMismatch {
                expected: "alternative array",
                found: Node::from_kind(kind).kind_name(),
            });
        }
        if let Some(Node::Array(array)) = self.get_node(path)? {
            if let Some(other) = array.items.iter().find(|item| !item.is_simple()) {
                return Err(XmpError::KindMismatch {
                    expected: "simple",
                    found: other.kind_name(),
                });
            }
            if !array.is_lang_alt() {
                return Err(XmpError::BadParam(format!(
                    "'{}' has items without xml:lang",
                    path
                )));
            }
        }

        let Node::Array(array) = parsed.resolve_or_create(&mut self.root, &options)? else {
            return Err(XmpError::InternalError(
                "localized text target is not an array".to_string(),
            ));
        };

        let specific_default = specific_lang.eq_ignore_ascii_case(X_DEFAULT);
        let default_index = array.find_lang(X_DEFAULT);
        let mut have_default = default_index.is_some();
        let generic_count = if generic_lang.is_empty() {
            0
        } else {
            array
                .items
                .iter()
                .filter(|item| item.lang().is_some_and(|l| lang_has_prefix(l, generic_lang)))
                .count()
        };
        let chosen = array
            .resolve_localized_text(generic_lang, specific_lang)
            .map(|(index, _, matched)| (index, matched));
        tracing::trace!(
            generic = generic_lang,
            specific = specific_lang,
            ?chosen,
            "set localized text"
        );

        match chosen {
            None => {
                add_lang_item(array, X_DEFAULT, value)?;
                have_default = true;
                if !specific_default {
                    add_lang_item(array, specific_lang, value)?;
                }
            }
            Some((_, LangMatch::Specific)) if specific_default => {
                let old = default_index.and_then(|i| text_of(&array.items[i - 1]));
                for item in array.items.iter_mut() {
                    if text_of(item) == old {
                        set_text(item, value);
                    }
                }
            }
            Some((index, LangMatch::Specific)) => {
                update_lang_item(array, index, default_index, value);
            }
            Some((index, LangMatch::Generic)) if generic_count == 1 => {
                update_lang_item(array, index, default_index, value);
            }
            Some((_, LangMatch::Default)) => {
                if array.len() == 1 {
                    if let Some(index) = default_index {
                        set_text(&mut array.items[index - 1], value);
                    }
                }
                add_lang_item(array, specific_lang, value)?;
            }
            Some((_, LangMatch::Generic | LangMatch::First)) => {
                add_lang_item(array, specific_lang, value)?;
                have_default |= specific_default;
            }
        }

        if !have_default && array.len() == 1 {
            add_lang_item(array, X_DEFAULT, value)?;
        }
        Ok(())
    }

    /// Iterate over every node in the tree
    pub fn iter(&self) -> NodeIter<'_> {
        NodeIter::new(&self.root, IterOptions::default())
    }

    /// Iterate over the tree with explicit options
    pub fn iter_with(&self, options: IterOptions) -> NodeIter<'_> {
        NodeIter::new(&self.root, options)
    }

    /// Iterate over the node at `path` and everything below it
    ///
    /// Returns `Ok(None)` when the node does not exist.
    pub fn iter_subtree(&self, path: &str, options: IterOptions) -> XmpResult<Option<NodeIter<'_>>> {
        let path = self.path(path)?;
        match path.resolve(&self.root) {
            Ok(node) => Ok(Some(NodeIter::subtree(node, path, options))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize to RDF/XML string, without the packet wrapper
    pub fn serialize(&self) -> XmpResult<String> {
        self.serialize_with(&SerializeOptions::default().omit_packet_wrapper())
    }

    /// Serialize to XMP Packet format
    pub fn serialize_packet(&self) -> XmpResult<String> {
        self.serialize_with(&SerializeOptions::default())
    }

    /// Serialize with explicit options
    ///
    /// Namespaces without a registered prefix get one in the output (see
    /// [`XmpSerializer::serialize`]); this object's map is not changed.
    pub fn serialize_with(&self, options: &SerializeOptions) -> XmpResult<String> {
        let mut namespaces = self.namespaces.clone();
        XmpSerializer::new(options.clone()).serialize(
            &self.root,
            self.about_uri.as_deref(),
            &mut namespaces,
        )
    }

    /// Register a namespace, returning the prefix bound to it
    pub fn register_namespace(&mut self, uri: &str, suggested_prefix: &str) -> XmpResult<String> {
        self.namespaces.register(uri, suggested_prefix)
    }

    /// The namespace map used to resolve paths
    pub fn namespaces(&self) -> &NamespaceMap {
        &self.namespaces
    }

    /// Get the about URI
    pub fn about_uri(&self) -> Option<&str> {
        self.about_uri.as_deref()
    }

    /// Set the about URI
    pub fn set_about_uri(&mut self, uri: impl Into<String>) {
        self.about_uri = Some(uri.into());
    }

    /// The root structure
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Mutable access to the root structure
    ///
    /// The root must stay a structure; serialization fails otherwise.
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Recoveries made by the last permissive parse
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }
}

/// Whether the last segment selects an array item
fn is_item_segment(segment: Option<&PathSegment>) -> bool {
    matches!(
        segment,
        Some(
            PathSegment::Index(_)
                | PathSegment::Last
                | PathSegment::QualifierSelector(..)
                | PathSegment::FieldSelector(..)
        )
    )
}

/// Place parsed top-level properties relative to the node at `target`
fn graft(
    root: &mut Node,
    target: &XmpPath,
    parsed: NamedNodes,
    action: ParseAction,
) -> XmpResult<()> {
    match action {
        ParseAction::InsertBefore | ParseAction::InsertAfter => {
            let array_path = target
                .parent()
                .filter(|_| is_item_segment(target.last()))
                .ok_or_else(|| {
                    XmpError::BadParam("Insertion target must be an array item".to_string())
                })?;
            let item: *const Node = target.resolve(root)?;
            let Node::Array(array) = array_path.resolve_mut(root)? else {
                return Err(XmpError::InternalError(
                    "array item outside an array".to_string(),
                ));
            };
            let position = array
                .items
                .iter()
                .position(|candidate| std::ptr::eq(candidate, item))
                .ok_or_else(|| XmpError::InternalError("array item not found".to_string()))?;
            let mut index = match action {
                ParseAction::InsertBefore => position + 1,
                _ => position + 2,
            };
            for (_, node) in parsed {
                array.insert(index, node)?;
                index += 1;
            }
        }
        ParseAction::Replace if target.is_empty() => {
            *root = Node::Structure(StructureNode {
                fields: parsed,
                qualifiers: NamedNodes::new(),
            });
        }
        ParseAction::Replace => {
            let mut nodes = parsed.into_iter();
            let (Some((_, node)), None) = (nodes.next(), nodes.next()) else {
                return Err(XmpError::BadParam(
                    "Replacing a node needs exactly one parsed property".to_string(),
                ));
            };
            let existing = target.resolve_mut(root)?;
            if is_item_segment(target.last()) && existing.kind() != node.kind() {
                return Err(XmpError::KindMismatch {
                    expected: existing.kind_name(),
                    found: node.kind_name(),
                });
            }
            *existing = node;
        }
        ParseAction::AppendAsChildren
        | ParseAction::ReplaceChildren
        | ParseAction::AppendOrReplaceChildren => match target.resolve_mut(root)? {
            Node::Structure(structure) => {
                for (name, node) in parsed {
                    match action {
                        ParseAction::AppendAsChildren => {
                            structure.fields.insert(name, node)?;
                        }
                        ParseAction::ReplaceChildren if !structure.fields.contains(&name) => {
                            return Err(XmpError::NotFound(name.to_string()));
                        }
                        _ => {
                            structure.fields.set(name, node);
                        }
                    }
                }
            }
            Node::Array(array) => {
                if action != ParseAction::AppendAsChildren {
                    array.items.clear();
                }
                for (_, node) in parsed {
                    array.append(node);
                }
            }
            other => {
                return Err(XmpError::KindMismatch {
                    expected: "structure or array",
                    found: other.kind_name(),
                })
            }
        },
    }
    Ok(())
}

fn text_of(item: &Node) -> Option<String> {
    item.value().map(str::to_string)
}

fn set_text(item: &mut Node, value: &str) {
    if let Node::Simple(simple) = item {
        simple.value = value.to_string();
    }
}

/// Append a language item; `x-default` goes first
fn add_lang_item(array: &mut ArrayNode, lang: &str, value: &str) -> XmpResult<()> {
    let mut item = Node::simple(value);
    item.set_qualifier(QName::xml_lang(), Node::simple(lang))?;
    if lang.eq_ignore_ascii_case(X_DEFAULT) {
        array.insert(1, item)
    } else {
        array.append(item);
        Ok(())
    }
}

/// Update one item, carrying `x-default` along when it held the same text
fn update_lang_item(array: &mut ArrayNode, index: usize, default_index: Option<usize>, value: &str) {
    if let Some(default) = default_index.filter(|d| *d != index) {
        if text_of(&array.items[default - 1]) == text_of(&array.items[index - 1]) {
            set_text(&mut array.items[default - 1], value);
        }
    }
    set_text(&mut array.items[index - 1], value);
}

/// An unfinished incremental parse is not cloned
impl Clone for XmpMeta {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            namespaces: self.namespaces.clone(),
            about_uri: self.about_uri.clone(),
            warnings: self.warnings.clone(),
            incremental: None,
        }
    }
}

impl Default for XmpMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for XmpMeta {
    type Err = XmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
