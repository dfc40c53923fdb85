//! XPath path handling for XMP
//!
//! This module parses the path expressions used to address properties and
//! evaluates them against a node tree, either read-only or creating missing
//! nodes on the way.
//!
//! Supported forms:
//! - `xmp:CreatorTool` - simple property
//! - `dc:creator[1]`, `dc:creator[last()]` - array item by 1-based index
//! - `exif:Flash/exif:Fired` - structure field
//! - `dc:title[@xml:lang='en-US']` - array item selected by qualifier value
//! - `xmpMM:History[stEvt:action="saved"]` - array item selected by field value
//! - `dc:title[1]/@xml:lang` - qualifier
//!
//! Quotes may be `'` or `"`; a doubled quote inside a value stands for one
//! quote character.

use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::{default_namespaces, NamespaceMap};
use crate::core::node::{ArrayNode, ArrayType, Node, NodeKind};
use crate::types::qname::QName;
use std::fmt;

/// One step of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named child of a structure (or top-level property)
    Property(QName),
    /// Array item by 1-based index
    Index(usize),
    /// Last array item
    Last,
    /// Qualifier of the current node
    Qualifier(QName),
    /// First array item carrying a qualifier with the given value
    QualifierSelector(QName, String),
    /// First array item whose structure field has the given value
    FieldSelector(QName, String),
}

impl PathSegment {
    fn is_array_step(&self) -> bool {
        matches!(
            self,
            PathSegment::Index(_)
                | PathSegment::Last
                | PathSegment::QualifierSelector(..)
                | PathSegment::FieldSelector(..)
        )
    }
}

/// Options used when a path creates missing nodes
#[derive(Default, Clone, Copy, Debug)]
pub struct PropertyOptions {
    /// Form of arrays created on the way (default: ordered)
    pub array_form: Option<ArrayType>,
    /// Kind of the node created for the last segment (default: simple)
    pub leaf_kind: Option<NodeKind>,
}

impl PropertyOptions {
    /// Create arrays of the given form.
    pub fn array_form(mut self, array_type: ArrayType) -> Self {
        self.array_form = Some(array_type);
        self
    }

    /// Create the addressed node with the given kind.
    pub fn leaf_kind(mut self, kind: NodeKind) -> Self {
        self.leaf_kind = Some(kind);
        self
    }

    /// Create the addressed node as an array of the given form.
    pub fn array(self, array_type: ArrayType) -> Self {
        self.leaf_kind(NodeKind::Array(array_type))
    }

    /// Create the addressed node as a structure.
    pub fn structure(self) -> Self {
        self.leaf_kind(NodeKind::Structure)
    }
}

/// A parsed path expression with resolved namespaces
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmpPath {
    segments: Vec<PathSegment>,
}

impl XmpPath {
    /// Parse a path expression, resolving prefixes with `namespaces`
    ///
    /// Syntax is checked first (`PathSyntax` carrying the byte offset of the
    /// offending character, or the input length at end of input); prefixes
    /// are resolved afterwards (`BadSchema` for an unknown or missing prefix).
    pub fn parse(expr: &str, namespaces: &NamespaceMap) -> XmpResult<Self> {
        let raw = Scanner::new(expr).path()?;
        let segments = raw
            .into_iter()
            .map(|segment| segment.resolve(namespaces))
            .collect::<XmpResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    /// Build a path from segments
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// A one-segment path naming a top-level property
    pub fn property(name: QName) -> Self {
        Self::from_segments(vec![PathSegment::Property(name)])
    }

    /// The segments of this path
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the path has no segments (addresses the start node)
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The last segment
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Append a segment
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    /// A new path with `segment` appended
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    /// The path of the owning node, `None` for the empty path
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Render the path in expression syntax
    ///
    /// Fails with `BadSchema` if a namespace has no prefix in `namespaces`.
    pub fn to_string_with(&self, namespaces: &NamespaceMap) -> XmpResult<String> {
        let mut out = String::new();
        self.render(&mut out, |uri| namespaces.get_prefix(uri))
            .map_err(|uri| XmpError::BadSchema(format!("No prefix registered for '{}'", uri)))?;
        Ok(out)
    }

    fn render<'a>(
        &self,
        out: &mut String,
        prefix_of: impl Fn(&str) -> Option<&'a str>,
    ) -> Result<(), String> {
        let qname = |name: &QName| -> Result<String, String> {
            match prefix_of(&name.namespace) {
                Some(prefix) => Ok(format!("{}:{}", prefix, name.name)),
                None => Err(name.namespace.clone()),
            }
        };
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Property(name) => {
                    if i > 0 {
                        out.push('/');
                    }
                    out.push_str(&qname(name)?);
                }
                PathSegment::Index(index) => out.push_str(&format!("[{}]", index)),
                PathSegment::Last => out.push_str("[last()]"),
                PathSegment::Qualifier(name) => {
                    out.push_str("/@");
                    out.push_str(&qname(name)?);
                }
                PathSegment::QualifierSelector(name, value) => {
                    out.push_str(&format!("[@{}='{}']", qname(name)?, value.replace('\'', "''")));
                }
                PathSegment::FieldSelector(name, value) => {
                    out.push_str(&format!("[{}='{}']", qname(name)?, value.replace('\'', "''")));
                }
            }
        }
        Ok(())
    }

    /// Find the addressed node, failing with `NotFound` at the first missing step
    pub fn resolve<'a>(&self, start: &'a Node) -> XmpResult<&'a Node> {
        let mut current = start;
        for (i, segment) in self.segments.iter().enumerate() {
            current = match step(current, segment)? {
                Some(node) => node,
                None => return Err(self.not_found(i)),
            };
        }
        Ok(current)
    }

    /// Mutable variant of [`XmpPath::resolve`]
    pub fn resolve_mut<'a>(&self, start: &'a mut Node) -> XmpResult<&'a mut Node> {
        let mut current = start;
        for (i, segment) in self.segments.iter().enumerate() {
            current = match step_mut(current, segment)? {
                Some(node) => node,
                None => return Err(self.not_found(i)),
            };
        }
        Ok(current)
    }

    /// Find the addressed node, creating missing nodes on the way
    ///
    /// A missing node becomes a structure when the next segment names a
    /// property, an array when it addresses an item (alternative for
    /// `xml:lang` selectors, otherwise `options.array_form` or ordered), and
    /// `options.leaf_kind` (or simple) for the last segment.
    pub fn resolve_or_create<'a>(
        &self,
        start: &'a mut Node,
        options: &PropertyOptions,
    ) -> XmpResult<&'a mut Node> {
        self.kind_after_create(start, options)?;

        let mut current = start;
        for (i, segment) in self.segments.iter().enumerate() {
            let kind = kind_for(self.segments.get(i + 1), options);
            current = step_or_create(current, segment, kind)?;
        }
        Ok(current)
    }

    /// Kind of the node [`XmpPath::resolve_or_create`] would return
    ///
    /// The tree is not modified. Any error `resolve_or_create` could hit is
    /// reported here, so a failed creation never leaves nodes behind.
    pub fn kind_after_create(&self, start: &Node, options: &PropertyOptions) -> XmpResult<NodeKind> {
        let mut qualifier_run = 0;
        for segment in &self.segments {
            if matches!(segment, PathSegment::Qualifier(_)) {
                qualifier_run += 1;
                if qualifier_run > 2 {
                    return Err(XmpError::QualifierTooDeep(self.to_string()));
                }
            } else {
                qualifier_run = 0;
            }
        }

        let mut current = Planned::Existing(start);
        for (i, segment) in self.segments.iter().enumerate() {
            let kind = kind_for(self.segments.get(i + 1), options);
            current = plan_step(current, segment, kind)?;
        }
        Ok(match current {
            Planned::Existing(node) => node.kind(),
            Planned::Created(kind) => kind,
        })
    }

    /// Detach the addressed node from its owner
    ///
    /// Returns `Ok(None)` when the node, or any node on the way to it, does
    /// not exist.
    pub fn remove(&self, start: &mut Node) -> XmpResult<Option<Node>> {
        let Some((last, init)) = self.segments.split_last() else {
            return Err(XmpError::BadParam("Cannot remove the root".to_string()));
        };
        let owner_path = Self {
            segments: init.to_vec(),
        };
        let owner = match owner_path.resolve_mut(start) {
            Ok(owner) => owner,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        match last {
            PathSegment::Property(name) => owner.remove_child(name),
            PathSegment::Qualifier(name) => Ok(owner.remove_qualifier(name)),
            _ => {
                let array = array_of_mut(owner)?;
                Ok(select(array, last).map(|i| array.items.remove(i)))
            }
        }
    }

    fn not_found(&self, failed: usize) -> XmpError {
        let partial = Self {
            segments: self.segments[..=failed].to_vec(),
        };
        XmpError::NotFound(partial.to_string())
    }
}

/// Renders with the well-known prefixes, falling back to `{uri}name`
impl fmt::Display for XmpPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        if self
            .render(&mut out, |uri| default_namespaces().get_prefix(uri))
            .is_err()
        {
            out.clear();
            for segment in &self.segments {
                match segment {
                    PathSegment::Property(name) => out.push_str(&format!("/{}", name)),
                    PathSegment::Index(index) => out.push_str(&format!("[{}]", index)),
                    PathSegment::Last => out.push_str("[last()]"),
                    PathSegment::Qualifier(name) => out.push_str(&format!("/@{}", name)),
                    PathSegment::QualifierSelector(name, value) => {
                        out.push_str(&format!("[@{}='{}']", name, value))
                    }
                    PathSegment::FieldSelector(name, value) => {
                        out.push_str(&format!("[{}='{}']", name, value))
                    }
                }
            }
        }
        write!(f, "{}", out)
    }
}

fn kind_for(next: Option<&PathSegment>, options: &PropertyOptions) -> NodeKind {
    match next {
        None => options.leaf_kind.unwrap_or(NodeKind::Simple),
        Some(PathSegment::Property(_)) => NodeKind::Structure,
        Some(PathSegment::Qualifier(_)) => NodeKind::Simple,
        Some(PathSegment::QualifierSelector(name, _)) if name.is_xml_lang() => {
            NodeKind::Array(ArrayType::Alternative)
        }
        Some(segment) if segment.is_array_step() => {
            NodeKind::Array(options.array_form.unwrap_or(ArrayType::Ordered))
        }
        Some(_) => NodeKind::Simple,
    }
}

fn mismatch(expected: &'static str, node: &Node) -> XmpError {
    XmpError::KindMismatch {
        expected,
        found: node.kind_name(),
    }
}

fn array_of(node: &Node) -> XmpResult<&ArrayNode> {
    match node {
        Node::Array(array) => Ok(array),
        other => Err(mismatch("array", other)),
    }
}

fn array_of_mut(node: &mut Node) -> XmpResult<&mut ArrayNode> {
    match node {
        Node::Array(array) => Ok(array),
        other => Err(mismatch("array", other)),
    }
}

fn qualifier_matches(item: &Node, name: &QName, value: &str) -> bool {
    match item.get_qualifier(name).and_then(|q| q.value()) {
        Some(v) if name.is_xml_lang() => v.eq_ignore_ascii_case(value),
        Some(v) => v == value,
        None => false,
    }
}

fn field_matches(item: &Node, name: &QName, value: &str) -> bool {
    item.as_structure()
        .and_then(|s| s.get_field(name))
        .and_then(|f| f.value())
        == Some(value)
}

/// 0-based position of the item a segment selects
fn select(array: &ArrayNode, segment: &PathSegment) -> Option<usize> {
    match segment {
        PathSegment::Index(index) => index.checked_sub(1).filter(|i| *i < array.len()),
        PathSegment::Last => array.len().checked_sub(1),
        PathSegment::QualifierSelector(name, value) => array
            .items
            .iter()
            .position(|item| qualifier_matches(item, name, value)),
        PathSegment::FieldSelector(name, value) => array
            .items
            .iter()
            .position(|item| field_matches(item, name, value)),
        PathSegment::Property(_) | PathSegment::Qualifier(_) => None,
    }
}

fn step<'a>(node: &'a Node, segment: &PathSegment) -> XmpResult<Option<&'a Node>> {
    match segment {
        PathSegment::Property(name) => node.get_child(name),
        PathSegment::Qualifier(name) => Ok(node.get_qualifier(name)),
        _ => {
            let array = array_of(node)?;
            Ok(select(array, segment).map(|i| &array.items[i]))
        }
    }
}

fn step_mut<'a>(node: &'a mut Node, segment: &PathSegment) -> XmpResult<Option<&'a mut Node>> {
    match segment {
        PathSegment::Property(name) => node.get_child_mut(name),
        PathSegment::Qualifier(name) => Ok(node.get_qualifier_mut(name)),
        _ => {
            let array = array_of_mut(node)?;
            Ok(select(array, segment).map(move |i| &mut array.items[i]))
        }
    }
}

/// Most default items a single creating index may pad an array with
pub const MAX_INDEX_PADDING: usize = 4096;

/// A node on a creating path, either present or about to be created
enum Planned<'a> {
    Existing(&'a Node),
    Created(NodeKind),
}

fn check_padding(index: usize, len: usize) -> XmpResult<()> {
    if index > len + 1 + MAX_INDEX_PADDING {
        return Err(XmpError::IndexOutOfRange { index, len });
    }
    Ok(())
}

fn plan_step<'a>(
    current: Planned<'a>,
    segment: &PathSegment,
    kind: NodeKind,
) -> XmpResult<Planned<'a>> {
    let created = match segment {
        PathSegment::FieldSelector(..) => NodeKind::Structure,
        _ => kind,
    };
    let node = match current {
        Planned::Existing(node) => node,
        Planned::Created(own) => {
            match (segment, own) {
                (PathSegment::Property(_), NodeKind::Structure) => {}
                (PathSegment::Property(_), _) => {
                    return Err(XmpError::KindMismatch {
                        expected: "structure",
                        found: Node::from_kind(own).kind_name(),
                    })
                }
                (PathSegment::Qualifier(_), _) => {}
                (PathSegment::Index(index), NodeKind::Array(_)) => check_padding(*index, 0)?,
                (_, NodeKind::Array(_)) => {}
                (_, _) => {
                    return Err(XmpError::KindMismatch {
                        expected: "array",
                        found: Node::from_kind(own).kind_name(),
                    })
                }
            }
            return Ok(Planned::Created(created));
        }
    };
    let next = match segment {
        PathSegment::Property(name) => match node {
            Node::Structure(structure) => structure.get_field(name),
            other => return Err(mismatch("structure", other)),
        },
        PathSegment::Qualifier(name) => node.get_qualifier(name),
        PathSegment::Index(index) => {
            let array = array_of(node)?;
            check_padding(*index, array.len())?;
            select(array, segment).map(|i| &array.items[i])
        }
        _ => {
            let array = array_of(node)?;
            select(array, segment).map(|i| &array.items[i])
        }
    };
    Ok(match next {
        Some(node) => Planned::Existing(node),
        None => Planned::Created(created),
    })
}

fn step_or_create<'a>(
    node: &'a mut Node,
    segment: &PathSegment,
    kind: NodeKind,
) -> XmpResult<&'a mut Node> {
    match segment {
        PathSegment::Property(name) => match node {
            Node::Structure(structure) => Ok(structure
                .fields
                .get_or_insert_with(name.clone(), || Node::from_kind(kind))),
            other => Err(mismatch("structure", other)),
        },
        PathSegment::Qualifier(name) => Ok(node.qualifier_or_insert(name.clone(), kind)),
        PathSegment::Index(index) => {
            let array = array_of_mut(node)?;
            check_padding(*index, array.len())?;
            while array.len() + 1 < *index {
                array.append(Node::default());
            }
            if array.len() < *index {
                array.append(Node::from_kind(kind));
            }
            Ok(&mut array.items[index - 1])
        }
        PathSegment::Last => {
            let array = array_of_mut(node)?;
            if array.is_empty() {
                array.append(Node::from_kind(kind));
            }
            let last = array.len() - 1;
            Ok(&mut array.items[last])
        }
        PathSegment::QualifierSelector(name, value) => {
            let array = array_of_mut(node)?;
            let position = match select(array, segment) {
                Some(position) => position,
                None => {
                    let mut item = Node::from_kind(kind);
                    item.set_qualifier(name.clone(), Node::simple(value.clone()))?;
                    array.append(item);
                    array.len() - 1
                }
            };
            Ok(&mut array.items[position])
        }
        PathSegment::FieldSelector(name, value) => {
            let array = array_of_mut(node)?;
            let position = match select(array, segment) {
                Some(position) => position,
                None => {
                    let mut item = Node::structure();
                    item.create_child(name.clone(), NodeKind::Simple)
                        .map(|field| *field = Node::simple(value.clone()))?;
                    array.append(item);
                    array.len() - 1
                }
            };
            Ok(&mut array.items[position])
        }
    }
}

/// A name as written, before prefix resolution
#[derive(Debug)]
struct RawName<'a> {
    prefix: Option<&'a str>,
    local: &'a str,
}

impl RawName<'_> {
    fn resolve(&self, namespaces: &NamespaceMap) -> XmpResult<QName> {
        let Some(prefix) = self.prefix else {
            return Err(XmpError::BadSchema(format!(
                "Missing namespace prefix on '{}'",
                self.local
            )));
        };
        let uri = namespaces
            .get_uri(prefix)
            .ok_or_else(|| XmpError::BadSchema(format!("Unknown namespace prefix '{}'", prefix)))?;
        Ok(QName::new(uri, self.local))
    }
}

#[derive(Debug)]
enum RawSegment<'a> {
    Property(RawName<'a>),
    Index(usize),
    Last,
    Qualifier(RawName<'a>),
    QualifierSelector(RawName<'a>, String),
    FieldSelector(RawName<'a>, String),
}

impl RawSegment<'_> {
    fn resolve(self, namespaces: &NamespaceMap) -> XmpResult<PathSegment> {
        Ok(match self {
            RawSegment::Property(name) => PathSegment::Property(name.resolve(namespaces)?),
            RawSegment::Index(index) => PathSegment::Index(index),
            RawSegment::Last => PathSegment::Last,
            RawSegment::Qualifier(name) => PathSegment::Qualifier(name.resolve(namespaces)?),
            RawSegment::QualifierSelector(name, value) => {
                PathSegment::QualifierSelector(name.resolve(namespaces)?, value)
            }
            RawSegment::FieldSelector(name, value) => {
                PathSegment::FieldSelector(name.resolve(namespaces)?, value)
            }
        })
    }
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> XmpError {
        XmpError::PathSyntax {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: char) -> XmpResult<()> {
        if self.eat(expected) {
            Ok(())
        } else if self.peek().is_none() {
            Err(self.error(format!("Expected '{}' before end of path", expected)))
        } else {
            Err(self.error(format!("Expected '{}'", expected)))
        }
    }

    fn path(mut self) -> XmpResult<Vec<RawSegment<'a>>> {
        if self.src.is_empty() {
            return Err(self.error("Empty path"));
        }
        let mut segments = vec![RawSegment::Property(self.name()?)];
        while let Some(c) = self.peek() {
            match c {
                '/' => {
                    self.bump();
                    if self.eat('@') {
                        segments.push(RawSegment::Qualifier(self.name()?));
                    } else {
                        segments.push(RawSegment::Property(self.name()?));
                    }
                }
                '[' => {
                    self.bump();
                    segments.push(self.selector()?);
                    self.expect(']')?;
                }
                _ => return Err(self.error(format!("Unexpected character '{}'", c))),
            }
        }
        Ok(segments)
    }

    fn ncname(&mut self) -> XmpResult<&'a str> {
        let start = self.pos;
        match self.peek() {
            Some(c) if c.is_alphabetic() || c == '_' => {
                self.bump();
            }
            Some(_) => return Err(self.error("Expected a name")),
            None => return Err(self.error("Expected a name before end of path")),
        }
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.') {
                self.bump();
            } else {
                break;
            }
        }
        Ok(&self.src[start..self.pos])
    }

    fn name(&mut self) -> XmpResult<RawName<'a>> {
        let first = self.ncname()?;
        if self.eat(':') {
            let local = self.ncname()?;
            Ok(RawName {
                prefix: Some(first),
                local,
            })
        } else {
            Ok(RawName {
                prefix: None,
                local: first,
            })
        }
    }

    fn selector(&mut self) -> XmpResult<RawSegment<'a>> {
        match self.peek() {
            Some(c) if c.is_ascii_digit() => {
                let start = self.pos;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                }
                let digits = &self.src[start..self.pos];
                match digits.parse::<usize>() {
                    Ok(index) if index >= 1 => Ok(RawSegment::Index(index)),
                    _ => Err(XmpError::PathSyntax {
                        offset: start,
                        message: format!("Invalid array index '{}'", digits),
                    }),
                }
            }
            Some('@') => {
                self.bump();
                let name = self.name()?;
                self.expect('=')?;
                Ok(RawSegment::QualifierSelector(name, self.quoted()?))
            }
            Some(_) => {
                if self.src[self.pos..].starts_with("last()") {
                    self.pos += "last()".len();
                    return Ok(RawSegment::Last);
                }
                let name = self.name()?;
                self.expect('=')?;
                Ok(RawSegment::FieldSelector(name, self.quoted()?))
            }
            None => Err(self.error("Unclosed bracket")),
        }
    }

    fn quoted(&mut self) -> XmpResult<String> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            Some(_) => return Err(self.error("Expected a quoted value")),
            None => return Err(self.error("Expected a quoted value before end of path")),
        };
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => {
                    if self.eat(quote) {
                        value.push(quote);
                    } else {
                        return Ok(value);
                    }
                }
                Some(c) => value.push(c),
                None => return Err(self.error("Missing closing quote")),
            }
        }
    }
}
