//! XMP RDF/XML parser
//!
//! This module builds a node tree from the XML event stream of an XMP
//! packet. The supported profile is the one XMP writers produce:
//! `rdf:Description` (top level and nested), `rdf:Bag`/`rdf:Seq`/`rdf:Alt`
//! containers with `rdf:li` items, `rdf:parseType="Resource"`,
//! `rdf:resource`, `rdf:value` and property attributes.
//!
//! Element nesting is tracked with an explicit frame stack bounded by
//! [`ParseOptions::max_depth`], so input can be fed in chunks and deep
//! documents cannot exhaust the call stack.

use crate::core::error::{XmpError, XmpResult};
use crate::core::namespace::{default_namespaces, ns, NamespaceScope};
use crate::core::node::{ArrayNode, ArrayType, NamedNodes, Node, StructureNode};
use crate::core::xml::{XmlEvent, XmlTokenizer};
use crate::types::qname::QName;
use crate::types::value::ValueHint;
use std::fmt;

const XML_WHITESPACE: &[char] = &[' ', '\t', '\n', '\r'];

fn is_xml_whitespace(text: &str) -> bool {
    text.chars().all(|c| XML_WHITESPACE.contains(&c))
}

/// How properties from several top-level `rdf:Description` elements combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// The first definition of a property is kept
    FirstWins,
    /// A later definition replaces an earlier one
    #[default]
    LastWins,
}

/// Parser configuration
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Fail on constructs outside the supported profile and on redefined
    /// properties (default: true)
    pub strict: bool,
    /// Merge policy for repeated top-level properties (default: last wins)
    pub merge_policy: MergePolicy,
    /// Maximum element nesting depth (default: 256)
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: true,
            merge_policy: MergePolicy::default(),
            max_depth: 256,
        }
    }
}

impl ParseOptions {
    /// Reject anything outside the supported profile.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Skip unsupported constructs and let later duplicates win.
    ///
    /// Every recovery is recorded as a [`ParseWarning`].
    pub fn permissive(mut self) -> Self {
        self.strict = false;
        self
    }

    /// Set the merge policy for repeated top-level properties.
    pub fn merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Set the maximum element nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// A recovery made by a permissive parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// Byte offset of the offending construct
    pub offset: usize,
    /// What was skipped or overwritten
    pub detail: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset {}: {}", self.offset, self.detail)
    }
}

/// The result of a successful parse
#[derive(Debug, Clone)]
pub struct ParsedPacket {
    /// Root structure holding the top-level properties
    pub root: Node,
    /// The `rdf:about` value, if any
    pub about: Option<String>,
    /// Namespace declarations as (prefix, uri), in document order
    pub namespaces: Vec<(String, String)>,
    /// Recoveries made in permissive mode
    pub warnings: Vec<ParseWarning>,
}

/// Content of a property element
#[derive(Debug)]
enum Body {
    /// Nothing but (possibly) text so far
    Empty,
    /// A container or nested description is open
    Pending,
    /// `rdf:parseType="Resource"` fields and optional `rdf:value`
    Fields {
        fields: NamedNodes,
        value: Option<Node>,
    },
    /// A finished container or nested description
    Node(Node),
}

#[derive(Debug)]
struct PropertyFrame {
    /// `None` for `rdf:li`
    name: Option<QName>,
    raw_name: String,
    offset: usize,
    qualifiers: NamedNodes,
    attrs: Vec<(QName, String, String)>,
    resource: Option<String>,
    preserve: bool,
    text: String,
    body: Body,
}

#[derive(Debug)]
struct DescriptionFrame {
    fields: NamedNodes,
    value: Option<Node>,
    top: bool,
}

#[derive(Debug)]
enum Frame {
    /// `x:xmpmeta` and other elements around `rdf:RDF`
    Wrapper,
    Rdf,
    Description(DescriptionFrame),
    Property(PropertyFrame),
    Container(ArrayNode),
    /// An ignored subtree (permissive mode)
    Skip,
}

/// What the innermost open element accepts as a child
enum Parent {
    Outside,
    Rdf,
    TopFields,
    Fields,
    ValueSlot { free: bool, resource: bool, text: bool },
    Container,
    Skip,
}

#[derive(Debug)]
struct Diagnostics {
    strict: bool,
    warnings: Vec<ParseWarning>,
}

impl Diagnostics {
    fn warn(&mut self, offset: usize, detail: String) {
        tracing::warn!(offset, "{}", detail);
        self.warnings.push(ParseWarning { offset, detail });
    }

    /// Fail in strict mode, record a warning otherwise
    fn unsupported(&mut self, offset: usize, detail: String) -> XmpResult<()> {
        if self.strict {
            return Err(XmpError::RdfSyntax { offset, detail });
        }
        self.warn(offset, detail);
        Ok(())
    }

    fn insert_field(
        &mut self,
        fields: &mut NamedNodes,
        name: QName,
        node: Node,
        raw_name: &str,
        offset: usize,
    ) -> XmpResult<()> {
        if fields.contains(&name) {
            if self.strict {
                return Err(XmpError::RedefinedProperty {
                    name: raw_name.to_string(),
                    offset,
                });
            }
            self.warn(
                offset,
                format!("Property '{}' redefined, keeping the later value", raw_name),
            );
        }
        fields.set(name, node);
        Ok(())
    }

    fn set_value(&mut self, slot: &mut Option<Node>, node: Node, offset: usize) -> XmpResult<()> {
        if slot.is_some() {
            if self.strict {
                return Err(XmpError::RedefinedProperty {
                    name: "rdf:value".to_string(),
                    offset,
                });
            }
            self.warn(offset, "rdf:value redefined, keeping the later value".to_string());
        }
        *slot = Some(node);
        Ok(())
    }
}

#[derive(Debug)]
struct State {
    options: ParseOptions,
    tokenizer: XmlTokenizer,
    scope: NamespaceScope,
    preserve: Vec<bool>,
    frames: Vec<Frame>,
    root: StructureNode,
    about: Option<String>,
    declared: Vec<(String, String)>,
    diag: Diagnostics,
    seen_rdf: bool,
    end_offset: usize,
}

/// Incremental RDF/XML parser
///
/// Events (or raw text chunks) are fed until a call marked final returns the
/// [`ParsedPacket`]. The parser is released after the final call or after the
/// first error; feeding it again fails with `BadParam`.
#[derive(Debug)]
pub struct RdfParser {
    state: Option<State>,
}

impl RdfParser {
    /// Create a parser
    pub fn new(options: ParseOptions) -> Self {
        Self {
            state: Some(State {
                options,
                tokenizer: XmlTokenizer::new(),
                scope: NamespaceScope::new(),
                preserve: Vec::new(),
                frames: Vec::new(),
                root: StructureNode::new(),
                about: None,
                declared: Vec::new(),
                diag: Diagnostics {
                    strict: options.strict,
                    warnings: Vec::new(),
                },
                seen_rdf: false,
                end_offset: 0,
            }),
        }
    }

    /// Parse a complete packet
    pub fn parse(xml: &str, options: &ParseOptions) -> XmpResult<ParsedPacket> {
        let mut parser = Self::new(*options);
        parser
            .parse_chunk(xml, true)?
            .ok_or_else(|| XmpError::InternalError("final parse produced no packet".to_string()))
    }

    /// Check if the parser can still be fed
    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    /// Feed a chunk of packet text
    pub fn parse_chunk(&mut self, chunk: &str, is_final: bool) -> XmpResult<Option<ParsedPacket>> {
        let state = self.active()?;
        let events = match state.tokenizer.push(chunk, is_final) {
            Ok(events) => events,
            Err(e) => {
                self.state = None;
                return Err(e);
            }
        };
        self.feed(events, is_final)
    }

    /// Feed already tokenized events
    pub fn feed(
        &mut self,
        events: impl IntoIterator<Item = XmlEvent>,
        is_final: bool,
    ) -> XmpResult<Option<ParsedPacket>> {
        let state = self.active()?;
        if let Err(e) = events.into_iter().try_for_each(|event| state.event(event)) {
            self.state = None;
            return Err(e);
        }
        if !is_final {
            return Ok(None);
        }
        match self.state.take() {
            Some(state) => state.finish().map(Some),
            None => Err(XmpError::InternalError("parser state lost".to_string())),
        }
    }

    fn active(&mut self) -> XmpResult<&mut State> {
        self.state
            .as_mut()
            .ok_or_else(|| XmpError::BadParam("Parser already finished".to_string()))
    }
}

impl State {
    fn event(&mut self, event: XmlEvent) -> XmpResult<()> {
        self.end_offset = event.offset();
        match event {
            XmlEvent::Start {
                name,
                attributes,
                offset,
            } => self.start(name, attributes, offset),
            XmlEvent::Text { text, offset } => self.text(text, offset),
            XmlEvent::End { offset, .. } => self.end(offset),
        }
    }

    fn start(
        &mut self,
        name: String,
        attributes: Vec<(String, String)>,
        offset: usize,
    ) -> XmpResult<()> {
        if self.frames.len() >= self.options.max_depth {
            return Err(XmpError::RdfSyntax {
                offset,
                detail: format!("Elements nested deeper than {}", self.options.max_depth),
            });
        }

        let mut decls = Vec::new();
        let mut attrs = Vec::new();
        for (key, value) in attributes {
            if key == "xmlns" {
                decls.push((String::new(), value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                if !self.declared.iter().any(|(_, uri)| *uri == value) {
                    self.declared.push((prefix.to_string(), value.clone()));
                }
                decls.push((prefix.to_string(), value));
            } else {
                attrs.push((key, value));
            }
        }
        self.scope.push(decls);

        let inherited = self.preserve.last().copied().unwrap_or(false);
        let preserve = attrs
            .iter()
            .find(|(key, _)| key == "xml:space")
            .map(|(_, value)| value == "preserve")
            .unwrap_or(inherited);
        self.preserve.push(preserve);

        let frame = self.open(&name, attrs, offset, preserve)?;
        self.frames.push(frame);
        Ok(())
    }

    fn parent(&self) -> Parent {
        match self.frames.last() {
            None | Some(Frame::Wrapper) => Parent::Outside,
            Some(Frame::Rdf) => Parent::Rdf,
            Some(Frame::Description(desc)) if desc.top => Parent::TopFields,
            Some(Frame::Description(_)) => Parent::Fields,
            Some(Frame::Property(prop)) => match prop.body {
                Body::Fields { .. } => Parent::Fields,
                _ => Parent::ValueSlot {
                    free: matches!(prop.body, Body::Empty),
                    resource: prop.resource.is_some(),
                    text: !is_xml_whitespace(&prop.text),
                },
            },
            Some(Frame::Container(_)) => Parent::Container,
            Some(Frame::Skip) => Parent::Skip,
        }
    }

    fn skip(&mut self, offset: usize, detail: String) -> XmpResult<Frame> {
        self.diag.unsupported(offset, detail)?;
        Ok(Frame::Skip)
    }

    fn open(
        &mut self,
        raw: &str,
        attrs: Vec<(String, String)>,
        offset: usize,
        preserve: bool,
    ) -> XmpResult<Frame> {
        let parent = self.parent();
        if matches!(parent, Parent::Skip) {
            return Ok(Frame::Skip);
        }
        let Some(name) = self.resolve(raw, offset, false)? else {
            return Ok(Frame::Skip);
        };

        match parent {
            Parent::Outside => {
                if name.is(ns::RDF, "RDF") {
                    self.seen_rdf = true;
                    Ok(Frame::Rdf)
                } else if name.is(ns::X, "xmpmeta") || name.is(ns::X, "xapmeta") {
                    Ok(Frame::Wrapper)
                } else {
                    self.diag
                        .unsupported(offset, format!("Unexpected element <{}> outside rdf:RDF", raw))?;
                    Ok(Frame::Wrapper)
                }
            }
            Parent::Rdf => {
                if name.is(ns::RDF, "Description") {
                    self.open_description(attrs, offset, true)
                } else {
                    self.skip(offset, format!("Unsupported element <{}> in rdf:RDF", raw))
                }
            }
            Parent::TopFields | Parent::Fields if name.is(ns::RDF, "li") => {
                self.skip(offset, format!("<{}> outside a container", raw))
            }
            Parent::TopFields => self.open_property(name, raw, attrs, offset, preserve, false),
            Parent::Fields => self.open_property(name, raw, attrs, offset, preserve, true),
            Parent::Container => {
                if name.is(ns::RDF, "li") {
                    self.open_property(name, raw, attrs, offset, preserve, false)
                } else {
                    self.skip(offset, format!("Expected rdf:li in container, found <{}>", raw))
                }
            }
            Parent::ValueSlot {
                free,
                resource,
                text,
            } => {
                if !free {
                    return self.skip(offset, format!("Second value element <{}>", raw));
                }
                if resource {
                    return self.skip(offset, format!("Element <{}> inside rdf:resource property", raw));
                }
                if text {
                    return self.skip(offset, format!("Mixed content around <{}>", raw));
                }
                let frame = if name.namespace == ns::RDF {
                    if let Some(array_type) = ArrayType::from_rdf_type(&name.name) {
                        Frame::Container(ArrayNode::new(array_type))
                    } else if name.name == "Description" {
                        self.open_description(attrs, offset, false)?
                    } else {
                        return self.skip(offset, format!("Unsupported element <{}>", raw));
                    }
                } else {
                    return self.skip(offset, format!("Unsupported typed node <{}>", raw));
                };
                if !matches!(frame, Frame::Skip) {
                    if let Some(Frame::Property(prop)) = self.frames.last_mut() {
                        prop.body = Body::Pending;
                    }
                }
                Ok(frame)
            }
            Parent::Skip => Ok(Frame::Skip),
        }
    }

    /// Resolve a raw `prefix:local` name against the scope stack
    ///
    /// `Ok(None)` means the name was skipped in permissive mode.
    fn resolve(&mut self, raw: &str, offset: usize, attribute: bool) -> XmpResult<Option<QName>> {
        let (prefix, local) = match raw.split_once(':') {
            Some((prefix, local)) => (prefix, local),
            None if attribute => {
                self.diag
                    .unsupported(offset, format!("Unqualified attribute '{}'", raw))?;
                return Ok(None);
            }
            None => ("", raw),
        };
        if let Some(uri) = self.scope.resolve(prefix) {
            return Ok(Some(QName::new(uri, local)));
        }
        let detail = format!("Undeclared namespace prefix in '{}'", raw);
        if self.diag.strict {
            return Err(XmpError::RdfSyntax { offset, detail });
        }
        match default_namespaces().get_uri(prefix) {
            Some(uri) => {
                self.diag.warn(offset, format!("{}, assuming {}", detail, uri));
                Ok(Some(QName::new(uri, local)))
            }
            None => {
                self.diag.warn(offset, detail);
                Ok(None)
            }
        }
    }

    fn open_description(
        &mut self,
        attrs: Vec<(String, String)>,
        offset: usize,
        top: bool,
    ) -> XmpResult<Frame> {
        let mut fields = NamedNodes::new();
        for (key, value) in attrs {
            let Some(name) = self.resolve(&key, offset, true)? else {
                continue;
            };
            if name.namespace == ns::RDF {
                if name.name != "about" {
                    return self.skip(offset, format!("Unsupported attribute {} on rdf:Description", key));
                }
                if top {
                    self.check_about(value, offset)?;
                }
            } else if name.namespace != ns::XML {
                self.diag
                    .insert_field(&mut fields, name, Node::simple(value), &key, offset)?;
            }
        }
        Ok(Frame::Description(DescriptionFrame {
            fields,
            value: None,
            top,
        }))
    }

    fn check_about(&mut self, about: String, offset: usize) -> XmpResult<()> {
        match &self.about {
            Some(existing) if !existing.is_empty() && !about.is_empty() && *existing != about => {
                self.diag.unsupported(
                    offset,
                    format!("Conflicting rdf:about '{}' (was '{}')", about, existing),
                )
            }
            Some(existing) if !existing.is_empty() => Ok(()),
            _ => {
                self.about = Some(about);
                Ok(())
            }
        }
    }

    fn open_property(
        &mut self,
        name: QName,
        raw: &str,
        attrs: Vec<(String, String)>,
        offset: usize,
        preserve: bool,
        allow_value: bool,
    ) -> XmpResult<Frame> {
        let is_item = name.is(ns::RDF, "li");
        if name.namespace == ns::RDF && !is_item && !(allow_value && name.name == "value") {
            return self.skip(offset, format!("Unsupported property element <{}>", raw));
        }

        let mut frame = PropertyFrame {
            name: if is_item { None } else { Some(name) },
            raw_name: raw.to_string(),
            offset,
            qualifiers: NamedNodes::new(),
            attrs: Vec::new(),
            resource: None,
            preserve,
            text: String::new(),
            body: Body::Empty,
        };
        let mut parse_resource = false;
        for (key, value) in attrs {
            let Some(attr) = self.resolve(&key, offset, true)? else {
                continue;
            };
            if attr.namespace == ns::XML {
                if attr.name == "lang" {
                    frame.qualifiers.set(attr, Node::simple(value));
                }
            } else if attr.namespace == ns::RDF {
                match attr.name.as_str() {
                    "resource" => frame.resource = Some(value),
                    "parseType" if value == "Resource" => parse_resource = true,
                    "parseType" => {
                        return self.skip(offset, format!("Unsupported rdf:parseType=\"{}\"", value))
                    }
                    _ => return self.skip(offset, format!("Unsupported attribute {}", key)),
                }
            } else {
                frame.attrs.push((attr, key, value));
            }
        }

        if parse_resource {
            if frame.resource.is_some() {
                return self.skip(offset, "rdf:resource combined with rdf:parseType".to_string());
            }
            frame.body = Body::Fields {
                fields: NamedNodes::new(),
                value: None,
            };
        }
        Ok(Frame::Property(frame))
    }

    fn text(&mut self, text: String, offset: usize) -> XmpResult<()> {
        let diag = &mut self.diag;
        match self.frames.last_mut() {
            None | Some(Frame::Skip) => Ok(()),
            Some(Frame::Property(prop)) if matches!(prop.body, Body::Empty) => {
                prop.text.push_str(&text);
                Ok(())
            }
            Some(_) if is_xml_whitespace(&text) => Ok(()),
            Some(Frame::Property(prop)) => diag.unsupported(
                offset,
                format!("Mixed content in <{}>", prop.raw_name),
            ),
            Some(_) => diag.unsupported(offset, "Unexpected text".to_string()),
        }
    }

    fn end(&mut self, offset: usize) -> XmpResult<()> {
        let Some(frame) = self.frames.pop() else {
            return Err(XmpError::RdfSyntax {
                offset,
                detail: "Unbalanced end tag".to_string(),
            });
        };
        self.scope.pop();
        self.preserve.pop();

        match frame {
            Frame::Wrapper | Frame::Rdf | Frame::Skip => Ok(()),
            Frame::Description(desc) if desc.top => {
                self.merge(desc.fields);
                Ok(())
            }
            Frame::Description(desc) => {
                let node = valued_or_structure(desc.fields, desc.value)?;
                self.set_parent_body(node)
            }
            Frame::Container(array) => self.set_parent_body(Node::Array(array)),
            Frame::Property(prop) => {
                let name = prop.name.clone();
                let raw_name = prop.raw_name.clone();
                let start = prop.offset;
                let node = self.finish_property(prop)?;
                self.attach(name, &raw_name, node, start)
            }
        }
    }

    fn set_parent_body(&mut self, node: Node) -> XmpResult<()> {
        match self.frames.last_mut() {
            Some(Frame::Property(prop)) => {
                prop.body = Body::Node(node);
                Ok(())
            }
            _ => Err(XmpError::InternalError(
                "value element without property".to_string(),
            )),
        }
    }

    fn attach(
        &mut self,
        name: Option<QName>,
        raw_name: &str,
        node: Node,
        offset: usize,
    ) -> XmpResult<()> {
        let diag = &mut self.diag;
        let (fields, value) = match self.frames.last_mut() {
            Some(Frame::Container(array)) => {
                array.append(node);
                return Ok(());
            }
            Some(Frame::Description(desc)) => (&mut desc.fields, &mut desc.value),
            Some(Frame::Property(PropertyFrame {
                body: Body::Fields { fields, value },
                ..
            })) => (fields, value),
            _ => {
                return Err(XmpError::InternalError(
                    "property element without owner".to_string(),
                ))
            }
        };
        match name {
            Some(name) if name.is(ns::RDF, "value") => diag.set_value(value, node, offset),
            Some(name) => diag.insert_field(fields, name, node, raw_name, offset),
            None => Err(XmpError::InternalError("rdf:li outside container".to_string())),
        }
    }

    fn finish_property(&mut self, prop: PropertyFrame) -> XmpResult<Node> {
        let PropertyFrame {
            raw_name,
            offset,
            qualifiers,
            attrs,
            resource,
            preserve,
            text,
            body,
            ..
        } = prop;
        let has_text = !is_xml_whitespace(&text);

        let mut node = match body {
            Body::Pending => {
                return Err(XmpError::InternalError(format!(
                    "value of <{}> was never closed",
                    raw_name
                )))
            }
            Body::Node(mut node) => {
                if has_text {
                    self.diag
                        .unsupported(offset, format!("Mixed content in <{}>", raw_name))?;
                }
                for (name, _, value) in attrs {
                    node.set_qualifier(name, Node::simple(value))?;
                }
                node
            }
            Body::Fields { mut fields, value } => {
                for (name, key, value) in attrs {
                    self.diag
                        .insert_field(&mut fields, name, Node::simple(value), &key, offset)?;
                }
                valued_or_structure(fields, value)?
            }
            Body::Empty => {
                let value = if preserve {
                    text
                } else {
                    text.trim_matches(XML_WHITESPACE).to_string()
                };
                match resource {
                    Some(uri) => {
                        if has_text {
                            self.diag.unsupported(
                                offset,
                                format!("Text in rdf:resource property <{}>", raw_name),
                            )?;
                        }
                        let mut node = Node::simple_with_hint(uri, Some(ValueHint::Uri));
                        for (name, _, value) in attrs {
                            node.set_qualifier(name, Node::simple(value))?;
                        }
                        node
                    }
                    None if value.is_empty() && !attrs.is_empty() => {
                        let mut fields = NamedNodes::new();
                        for (name, key, value) in attrs {
                            self.diag
                                .insert_field(&mut fields, name, Node::simple(value), &key, offset)?;
                        }
                        Node::Structure(StructureNode {
                            fields,
                            qualifiers: NamedNodes::new(),
                        })
                    }
                    None => {
                        let mut node = Node::simple(value);
                        for (name, _, value) in attrs {
                            node.set_qualifier(name, Node::simple(value))?;
                        }
                        node
                    }
                }
            }
        };

        for (name, qualifier) in qualifiers {
            node.set_qualifier(name, qualifier)?;
        }
        Ok(node)
    }

    fn merge(&mut self, fields: NamedNodes) {
        for (name, node) in fields {
            if self.root.has_field(&name) && self.options.merge_policy == MergePolicy::FirstWins {
                tracing::debug!(property = %name, "keeping first definition");
                continue;
            }
            self.root.set_field(name, node);
        }
    }

    fn finish(mut self) -> XmpResult<ParsedPacket> {
        if !self.frames.is_empty() {
            return Err(XmpError::RdfSyntax {
                offset: self.end_offset,
                detail: "Unexpected end of input".to_string(),
            });
        }
        if !self.seen_rdf {
            self.diag
                .unsupported(self.end_offset, "No rdf:RDF element found".to_string())?;
        }
        tracing::debug!(
            properties = self.root.len(),
            warnings = self.diag.warnings.len(),
            "parsed RDF packet"
        );
        Ok(ParsedPacket {
            root: Node::Structure(self.root),
            about: self.about,
            namespaces: self.declared,
            warnings: self.diag.warnings,
        })
    }
}

/// A body with `rdf:value` becomes that value qualified by the other fields
fn valued_or_structure(fields: NamedNodes, value: Option<Node>) -> XmpResult<Node> {
    match value {
        Some(mut node) => {
            for (name, qualifier) in fields {
                node.set_qualifier(name, qualifier)?;
            }
            Ok(node)
        }
        None => Ok(Node::Structure(StructureNode {
            fields,
            qualifiers: NamedNodes::new(),
        })),
    }
}
