//! XMP XML/RDF serializer
//!
//! This module renders a node tree as an XMP packet. The output is a stable
//! normal form: namespace declarations are sorted by prefix, top-level simple
//! properties come first as attributes of the single `rdf:Description`, and
//! every other node uses the most compact element form that parses back to
//! the same tree.

use crate::core::error::{XmpError, XmpResult};
use crate::core::iterator::{IterOptions, NodeIter};
use crate::core::namespace::{is_ncname, ns, NamespaceMap};
use crate::core::node::{NamedNodes, Node};
use crate::core::xpath::PathSegment;
use crate::types::qname::QName;
use quick_xml::escape::{escape, partial_escape};
use std::collections::BTreeSet;

/// The `id` attribute of the packet header
pub const PACKET_ID: &str = "W5M0MpCehiHzreSzNTczkc9d";

const MAX_PADDING_LINE: usize = 100;

/// Serializer configuration
#[derive(Clone, Debug)]
pub struct SerializeOptions {
    /// Indentation unit (default: two spaces)
    pub indent: String,
    /// Newline sequence (default: `\n`)
    pub newline: String,
    /// Indentation levels added to every line
    pub base_indent: usize,
    /// Padding bytes before the packet trailer (default: 2048)
    pub padding: usize,
    /// Emit only the `x:xmpmeta` element, without header, padding or trailer
    pub omit_packet_wrapper: bool,
    /// Mark the packet read-only (`end="r"`)
    pub read_only: bool,
    /// Size the padding so the whole packet has this many bytes
    pub exact_packet_length: Option<usize>,
    /// Start at `rdf:RDF` instead of `x:xmpmeta`
    pub omit_xmpmeta: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            newline: "\n".to_string(),
            base_indent: 0,
            padding: 2048,
            omit_packet_wrapper: false,
            read_only: false,
            exact_packet_length: None,
            omit_xmpmeta: false,
        }
    }
}

impl SerializeOptions {
    /// Set the indentation unit.
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Set the newline sequence.
    pub fn newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    /// Indent every line by `levels` extra units.
    pub fn base_indent(mut self, levels: usize) -> Self {
        self.base_indent = levels;
        self
    }

    /// Reserve `bytes` of padding.
    pub fn padding(mut self, bytes: usize) -> Self {
        self.padding = bytes;
        self
    }

    /// Omit the `<?xpacket?>` wrapper and padding.
    pub fn omit_packet_wrapper(mut self) -> Self {
        self.omit_packet_wrapper = true;
        self
    }

    /// Mark the packet read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Pad the packet to exactly `bytes` bytes.
    pub fn exact_packet_length(mut self, bytes: usize) -> Self {
        self.exact_packet_length = Some(bytes);
        self
    }

    /// Omit the `x:xmpmeta` element.
    pub fn omit_xmpmeta(mut self) -> Self {
        self.omit_xmpmeta = true;
        self
    }

    fn validate(&self) -> XmpResult<()> {
        if !matches!(self.newline.as_str(), "\n" | "\r" | "\r\n") {
            return Err(XmpError::BadParam(format!(
                "Unsupported newline sequence {:?}",
                self.newline
            )));
        }
        if !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(XmpError::BadParam(format!(
                "Indent must be spaces or tabs, got {:?}",
                self.indent
            )));
        }
        if self.omit_packet_wrapper && self.exact_packet_length.is_some() {
            return Err(XmpError::BadParam(
                "An exact packet length needs the packet wrapper".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serializer for XMP Packets
#[derive(Debug, Default)]
pub struct XmpSerializer {
    options: SerializeOptions,
}

impl XmpSerializer {
    /// Create a new XMP serializer
    pub fn new(options: SerializeOptions) -> Self {
        Self { options }
    }

    /// The serializer's options
    pub fn options(&self) -> &SerializeOptions {
        &self.options
    }

    /// Serialize a root structure
    ///
    /// Namespaces used in the tree but missing from `namespaces` are
    /// registered there (suggested prefix `ns`) before anything is written.
    pub fn serialize(
        &self,
        root: &Node,
        about: Option<&str>,
        namespaces: &mut NamespaceMap,
    ) -> XmpResult<String> {
        self.options.validate()?;
        let Node::Structure(structure) = root else {
            return Err(XmpError::KindMismatch {
                expected: "structure",
                found: root.kind_name(),
            });
        };
        let about = about.unwrap_or("");
        check_text(about)?;

        let used = collect_namespaces(root, namespaces)?;
        let mut emitter = Emitter {
            out: String::new(),
            options: &self.options,
            namespaces,
        };

        let wrapper = !self.options.omit_packet_wrapper;
        if wrapper {
            emitter.line(
                0,
                &format!("<?xpacket begin=\"\u{FEFF}\" id=\"{}\"?>", PACKET_ID),
            );
        }
        let mut depth = 0;
        if !self.options.omit_xmpmeta {
            emitter.line(0, &format!("<x:xmpmeta xmlns:x=\"{}\">", ns::X));
            depth = 1;
        }
        emitter.line(depth, &format!("<rdf:RDF xmlns:rdf=\"{}\">", ns::RDF));
        emitter.description(&structure.fields, about, &used, depth + 1)?;
        emitter.line(depth, "</rdf:RDF>");
        if !self.options.omit_xmpmeta {
            emitter.line(0, "</x:xmpmeta>");
        }

        let mut out = emitter.out;
        if wrapper {
            let trailer = format!(
                "<?xpacket end=\"{}\"?>",
                if self.options.read_only { "r" } else { "w" }
            );
            let padding = match self.options.exact_packet_length {
                Some(length) => {
                    let needed = out.len() + trailer.len();
                    length.checked_sub(needed).ok_or_else(|| {
                        XmpError::BadParam(format!(
                            "Packet needs {} bytes, exact length {} requested",
                            needed, length
                        ))
                    })?
                }
                None => self.options.padding,
            };
            push_padding(&mut out, padding, &self.options.newline);
            out.push_str(&trailer);
        }

        tracing::debug!(
            bytes = out.len(),
            properties = structure.len(),
            "serialized XMP packet"
        );
        Ok(out)
    }
}

/// Append `bytes` of padding in lines of at most 100 bytes
fn push_padding(out: &mut String, bytes: usize, newline: &str) {
    let mut remaining = bytes;
    while remaining > 0 {
        let line = remaining.min(MAX_PADDING_LINE);
        if line >= newline.len() {
            out.extend(std::iter::repeat(' ').take(line - newline.len()));
            out.push_str(newline);
        } else {
            out.extend(std::iter::repeat(' ').take(line));
        }
        remaining -= line;
    }
}

/// Register every namespace the tree uses and return the set of URIs
fn collect_namespaces(root: &Node, namespaces: &mut NamespaceMap) -> XmpResult<BTreeSet<String>> {
    let mut used = BTreeSet::new();
    for item in NodeIter::new(root, IterOptions::default()) {
        let name = match item.path.last() {
            Some(PathSegment::Property(name)) | Some(PathSegment::Qualifier(name)) => name,
            _ => {
                if let Some(simple) = item.node.as_simple() {
                    check_text(&simple.value)?;
                }
                continue;
            }
        };
        if !is_ncname(&name.name) {
            return Err(XmpError::UnrepresentableValue(format!(
                "'{}' is not a valid XML name",
                name.name
            )));
        }
        if name.namespace == ns::RDF {
            return Err(XmpError::UnrepresentableValue(format!(
                "rdf:{} cannot name a property",
                name.name
            )));
        }
        if let Some(simple) = item.node.as_simple() {
            check_text(&simple.value)?;
        }
        if name.namespace == ns::XML || used.contains(&name.namespace) {
            continue;
        }
        if !namespaces.has_uri(&name.namespace) {
            namespaces.register(&name.namespace, "ns")?;
        }
        used.insert(name.namespace.clone());
    }
    Ok(used)
}

/// Reject characters XML 1.0 cannot carry
fn check_text(text: &str) -> XmpResult<()> {
    let bad = text.chars().find(|&c| {
        (c < ' ' && !matches!(c, '\t' | '\n' | '\r')) || c == '\u{FFFE}' || c == '\u{FFFF}'
    });
    match bad {
        Some(c) => Err(XmpError::UnrepresentableValue(format!(
            "character U+{:04X} in {:?}",
            c as u32, text
        ))),
        None => Ok(()),
    }
}

fn escape_attr(value: &str) -> String {
    escape(value)
        .replace('\t', "&#x9;")
        .replace('\n', "&#xA;")
        .replace('\r', "&#xD;")
}

fn escape_text(value: &str) -> String {
    partial_escape(value).replace('\r', "&#xD;")
}

fn has_edge_whitespace(value: &str) -> bool {
    let ws = |c: char| matches!(c, ' ' | '\t' | '\n' | '\r');
    value.starts_with(ws) || value.ends_with(ws)
}

/// A simple, unqualified, non-URI node that fits in an attribute
fn is_attribute_value(node: &Node) -> bool {
    match node {
        Node::Simple(simple) => {
            !simple.is_uri()
                && simple.qualifiers.is_empty()
                && !simple.value.contains(['\t', '\n', '\r'])
        }
        _ => false,
    }
}

/// Whether the qualifiers must be written as `rdf:value` siblings
fn needs_value_form(node: &Node, qualifiers: &NamedNodes) -> bool {
    if qualifiers
        .iter()
        .all(|(name, q)| name.is_xml_lang() && is_attribute_value(q))
    {
        return false;
    }
    if !qualifiers.iter().all(|(_, q)| is_attribute_value(q)) {
        return true;
    }
    match node {
        Node::Simple(simple) => !simple.is_uri() && simple.value.is_empty(),
        Node::Structure(_) => true,
        Node::Array(_) => false,
    }
}

/// Pending emitter work, popped last in first out
enum Step<'n> {
    Open {
        tag: String,
        node: &'n Node,
        depth: usize,
        with_qualifiers: bool,
    },
    Close {
        depth: usize,
        text: String,
    },
}

struct Emitter<'a> {
    out: String,
    options: &'a SerializeOptions,
    namespaces: &'a NamespaceMap,
}

impl Emitter<'_> {
    fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..self.options.base_indent + depth {
            self.out.push_str(&self.options.indent);
        }
        self.out.push_str(text);
        self.out.push_str(&self.options.newline);
    }

    fn name(&self, name: &QName) -> XmpResult<String> {
        if name.namespace == ns::XML {
            return Ok(format!("xml:{}", name.name));
        }
        self.namespaces
            .get_prefix(&name.namespace)
            .map(|prefix| format!("{}:{}", prefix, name.name))
            .ok_or_else(|| {
                XmpError::InternalError(format!("no prefix for namespace {}", name.namespace))
            })
    }

    fn description(
        &mut self,
        fields: &NamedNodes,
        about: &str,
        used: &BTreeSet<String>,
        depth: usize,
    ) -> XmpResult<()> {
        let mut head = vec![format!("<rdf:Description rdf:about=\"{}\"", escape_attr(about))];

        let mut decls: Vec<(&str, &str)> = used
            .iter()
            .filter_map(|uri| {
                self.namespaces
                    .get_prefix(uri)
                    .map(|prefix| (prefix, uri.as_str()))
            })
            .collect();
        decls.sort();
        for (prefix, uri) in decls {
            head.push(format!("xmlns:{}=\"{}\"", prefix, escape_attr(uri)));
        }

        let mut elements = Vec::new();
        for (name, node) in fields.iter() {
            if is_attribute_value(node) && name.namespace != ns::XML {
                let value = node.value().unwrap_or_default();
                head.push(format!("{}=\"{}\"", self.name(name)?, escape_attr(value)));
            } else {
                elements.push((name, node));
            }
        }

        let last = head.len() - 1;
        for (i, text) in head.iter().enumerate() {
            let close = match (i == last, elements.is_empty()) {
                (false, _) => "",
                (true, true) => "/>",
                (true, false) => ">",
            };
            let indent = if i == 0 { depth } else { depth + 1 };
            self.line(indent, &format!("{}{}", text, close));
        }
        if elements.is_empty() {
            return Ok(());
        }
        let mut stack = vec![Step::Close {
            depth,
            text: "</rdf:Description>".to_string(),
        }];
        for (name, node) in elements.into_iter().rev() {
            stack.push(Step::Open {
                tag: self.name(name)?,
                node,
                depth: depth + 1,
                with_qualifiers: true,
            });
        }
        self.run(stack)
    }

    /// Emit pending steps until the stack is empty
    fn run<'n>(&mut self, mut stack: Vec<Step<'n>>) -> XmpResult<()> {
        while let Some(step) = stack.pop() {
            match step {
                Step::Close { depth, text } => self.line(depth, &text),
                Step::Open {
                    tag,
                    node,
                    depth,
                    with_qualifiers,
                } => self.property(&tag, node, depth, with_qualifiers, &mut stack)?,
            }
        }
        Ok(())
    }

    /// Qualifier attributes, `xml:lang` first
    fn qualifier_attrs(&self, qualifiers: &NamedNodes) -> XmpResult<String> {
        let mut attrs = String::new();
        let lang = qualifiers.iter().filter(|(name, _)| name.is_xml_lang());
        let others = qualifiers.iter().filter(|(name, _)| !name.is_xml_lang());
        for (name, qualifier) in lang.chain(others) {
            let value = qualifier.value().unwrap_or_default();
            attrs.push_str(&format!(" {}=\"{}\"", self.name(name)?, escape_attr(value)));
        }
        Ok(attrs)
    }

    /// Write the opening of one property and schedule its contents
    fn property<'n>(
        &mut self,
        tag: &str,
        node: &'n Node,
        depth: usize,
        with_qualifiers: bool,
        stack: &mut Vec<Step<'n>>,
    ) -> XmpResult<()> {
        let qualifiers = Some(node.qualifiers()).filter(|q| with_qualifiers && !q.is_empty());
        if let Some(qualifiers) = qualifiers {
            if needs_value_form(node, qualifiers) {
                return self.value_form(tag, node, qualifiers, depth, stack);
            }
        }
        let attrs = match qualifiers {
            Some(qualifiers) => self.qualifier_attrs(qualifiers)?,
            None => String::new(),
        };

        match node {
            Node::Simple(simple) if simple.is_uri() => self.line(
                depth,
                &format!(
                    "<{} rdf:resource=\"{}\"{}/>",
                    tag,
                    escape_attr(&simple.value),
                    attrs
                ),
            ),
            Node::Simple(simple) if simple.value.is_empty() => {
                self.line(depth, &format!("<{}{}/>", tag, attrs))
            }
            Node::Simple(simple) => {
                let space = if has_edge_whitespace(&simple.value) {
                    " xml:space=\"preserve\""
                } else {
                    ""
                };
                self.line(
                    depth,
                    &format!(
                        "<{}{}{}>{}</{}>",
                        tag,
                        space,
                        attrs,
                        escape_text(&simple.value),
                        tag
                    ),
                );
            }
            Node::Structure(structure) if structure.is_empty() => self.line(
                depth,
                &format!("<{} rdf:parseType=\"Resource\"{}/>", tag, attrs),
            ),
            Node::Structure(structure)
                if structure
                    .fields
                    .iter()
                    .all(|(name, field)| is_attribute_value(field) && name.namespace != ns::XML) =>
            {
                let mut text = format!("<{}{}", tag, attrs);
                for (name, field) in structure.fields.iter() {
                    let value = field.value().unwrap_or_default();
                    text.push_str(&format!(" {}=\"{}\"", self.name(name)?, escape_attr(value)));
                }
                text.push_str("/>");
                self.line(depth, &text);
            }
            Node::Structure(structure) => {
                self.line(depth, &format!("<{} rdf:parseType=\"Resource\"{}>", tag, attrs));
                stack.push(Step::Close {
                    depth,
                    text: format!("</{}>", tag),
                });
                for (name, field) in structure.fields.iter().rev() {
                    stack.push(Step::Open {
                        tag: self.name(name)?,
                        node: field,
                        depth: depth + 1,
                        with_qualifiers: true,
                    });
                }
            }
            Node::Array(array) => {
                let container = format!("rdf:{}", array.array_type.rdf_type());
                self.line(depth, &format!("<{}{}>", tag, attrs));
                if array.is_empty() {
                    self.line(depth + 1, &format!("<{}/>", container));
                    self.line(depth, &format!("</{}>", tag));
                } else {
                    self.line(depth + 1, &format!("<{}>", container));
                    stack.push(Step::Close {
                        depth,
                        text: format!("</{}>", tag),
                    });
                    stack.push(Step::Close {
                        depth: depth + 1,
                        text: format!("</{}>", container),
                    });
                    for item in array.items.iter().rev() {
                        stack.push(Step::Open {
                            tag: "rdf:li".to_string(),
                            node: item,
                            depth: depth + 2,
                            with_qualifiers: true,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// `<tag rdf:parseType="Resource"><rdf:value>..</rdf:value>qualifiers</tag>`
    fn value_form<'n>(
        &mut self,
        tag: &str,
        node: &'n Node,
        qualifiers: &'n NamedNodes,
        depth: usize,
        stack: &mut Vec<Step<'n>>,
    ) -> XmpResult<()> {
        let mut lang_attr = String::new();
        for (name, qualifier) in qualifiers.iter() {
            if name.is_xml_lang() && is_attribute_value(qualifier) {
                lang_attr = format!(
                    " xml:lang=\"{}\"",
                    escape_attr(qualifier.value().unwrap_or_default())
                );
            }
        }
        self.line(
            depth,
            &format!("<{} rdf:parseType=\"Resource\"{}>", tag, lang_attr),
        );
        stack.push(Step::Close {
            depth,
            text: format!("</{}>", tag),
        });
        for (name, qualifier) in qualifiers.iter().rev() {
            if name.is_xml_lang() && is_attribute_value(qualifier) {
                continue;
            }
            stack.push(Step::Open {
                tag: self.name(name)?,
                node: qualifier,
                depth: depth + 1,
                with_qualifiers: true,
            });
        }
        stack.push(Step::Open {
            tag: "rdf:value".to_string(),
            node,
            depth: depth + 1,
            with_qualifiers: false,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::{ArrayType, ItemPosition, NodeKind};
    use crate::core::parser::{ParseOptions, RdfParser};
    use crate::types::value::ValueHint;
    use pretty_assertions::assert_eq;

    fn sample() -> Node {
        let mut root = Node::structure();
        *root
            .create_child(QName::new(ns::DC, "format"), NodeKind::Simple)
            .unwrap() = Node::simple("image/jpeg");
        let title = root
            .create_child(QName::new(ns::DC, "title"), NodeKind::Array(ArrayType::Alternative))
            .unwrap();
        let item = title
            .insert_array_item(ItemPosition::Append, NodeKind::Simple)
            .unwrap();
        *item = Node::simple("Hello");
        item.add_qualifier(QName::xml_lang(), Node::simple("x-default"))
            .unwrap();
        *root
            .create_child(QName::new(ns::XMP, "Rating"), NodeKind::Simple)
            .unwrap() = Node::simple("5");
        let flash = root
            .create_child(QName::new(ns::EXIF, "Flash"), NodeKind::Structure)
            .unwrap();
        *flash
            .create_child(QName::new(ns::EXIF, "Fired"), NodeKind::Simple)
            .unwrap() = Node::simple("True");
        *flash
            .create_child(QName::new(ns::EXIF, "Mode"), NodeKind::Simple)
            .unwrap() = Node::simple("1");
        root
    }

    fn serialize(root: &Node, options: SerializeOptions) -> XmpResult<String> {
        XmpSerializer::new(options).serialize(root, None, &mut NamespaceMap::new())
    }

    fn reparse(xml: &str) -> Node {
        RdfParser::parse(xml, &ParseOptions::default()).unwrap().root
    }

    #[test]
    fn test_serialize_rdf() {
        let xml = serialize(&sample(), SerializeOptions::default().omit_packet_wrapper()).unwrap();
        let expected = r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
      xmlns:dc="http://purl.org/dc/elements/1.1/"
      xmlns:exif="http://ns.adobe.com/exif/1.0/"
      xmlns:xmp="http://ns.adobe.com/xap/1.0/"
      dc:format="image/jpeg"
      xmp:Rating="5">
      <dc:title>
        <rdf:Alt>
          <rdf:li xml:lang="x-default">Hello</rdf:li>
        </rdf:Alt>
      </dc:title>
      <exif:Flash exif:Fired="True" exif:Mode="1"/>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
"#;
        assert_eq!(xml, expected);
    }

    #[test]
    fn test_serialize_packet() {
        let packet = serialize(&sample(), SerializeOptions::default()).unwrap();
        assert!(packet.starts_with("<?xpacket begin=\"\u{FEFF}\" id=\"W5M0MpCehiHzreSzNTczkc9d\"?>\n"));
        assert!(packet.ends_with("<?xpacket end=\"w\"?>"));

        let bare = serialize(&sample(), SerializeOptions::default().padding(0)).unwrap();
        assert_eq!(packet.len() - bare.len(), 2048);

        let read_only = serialize(&sample(), SerializeOptions::default().read_only()).unwrap();
        assert!(read_only.ends_with("<?xpacket end=\"r\"?>"));

        // Padded packets parse to the same tree
        assert!(reparse(&packet).semantic_eq(&sample()));
    }

    #[test]
    fn test_padding_lines() {
        let mut out = String::new();
        push_padding(&mut out, 250, "\n");
        assert_eq!(out.len(), 250);
        assert!(out.split_inclusive('\n').all(|line| line.len() <= 100));

        let mut out = String::new();
        push_padding(&mut out, 201, "\r\n");
        assert_eq!(out.len(), 201);
    }

    #[test]
    fn test_exact_packet_length() {
        let packet = serialize(&sample(), SerializeOptions::default().exact_packet_length(4096)).unwrap();
        assert_eq!(packet.len(), 4096);

        assert!(matches!(
            serialize(&sample(), SerializeOptions::default().exact_packet_length(100)),
            Err(XmpError::BadParam(_))
        ));
    }

    #[test]
    fn test_layout_options() {
        let options = SerializeOptions::default()
            .omit_packet_wrapper()
            .omit_xmpmeta()
            .indent("\t")
            .newline("\r\n")
            .base_indent(1);
        let xml = serialize(&sample(), options).unwrap();
        assert!(xml.starts_with("\t<rdf:RDF "));
        assert!(xml.ends_with("\t</rdf:RDF>\r\n"));
        assert!(!xml.contains("xmpmeta"));

        assert!(matches!(
            serialize(&sample(), SerializeOptions::default().newline("--")),
            Err(XmpError::BadParam(_))
        ));
    }

    #[test]
    fn test_unrepresentable_value() {
        let mut root = Node::structure();
        *root
            .create_child(QName::new(ns::DC, "format"), NodeKind::Simple)
            .unwrap() = Node::simple("bad\u{1}value");
        assert!(matches!(
            serialize(&root, SerializeOptions::default()),
            Err(XmpError::UnrepresentableValue(_))
        ));
    }

    #[test]
    fn test_auto_registers_namespace() {
        let mut root = Node::structure();
        *root
            .create_child(QName::new("http://example.com/unknown/", "thing"), NodeKind::Simple)
            .unwrap() = Node::simple("v");
        let mut namespaces = NamespaceMap::new();
        let xml = XmpSerializer::default()
            .serialize(&root, None, &mut namespaces)
            .unwrap();
        assert_eq!(namespaces.get_prefix("http://example.com/unknown/"), Some("ns"));
        assert!(xml.contains("xmlns:ns=\"http://example.com/unknown/\""));
        assert!(xml.contains("ns:thing=\"v\""));
    }

    #[test]
    fn test_element_forms_round_trip() {
        let ex = "http://ns.adobe.com/xap/1.0/";
        let mut root = Node::structure();

        // Qualified simple value with a line break
        let note = root
            .create_child(QName::new(ex, "Note"), NodeKind::Simple)
            .unwrap();
        *note = Node::simple("two\nlines");
        note.add_qualifier(QName::new(ex, "q"), Node::simple("x"))
            .unwrap();

        // Empty value with a qualifier needs rdf:value
        let empty = root
            .create_child(QName::new(ex, "Empty"), NodeKind::Simple)
            .unwrap();
        empty
            .add_qualifier(QName::new(ex, "q"), Node::simple("y"))
            .unwrap();

        // Qualified structure
        let info = root
            .create_child(QName::new(ex, "Info"), NodeKind::Structure)
            .unwrap();
        *info
            .create_child(QName::new(ex, "Field"), NodeKind::Simple)
            .unwrap() = Node::simple(" padded ");
        info.add_qualifier(QName::new(ex, "q"), Node::simple("z"))
            .unwrap();

        // URI with a qualified qualifier
        let mut qualifier = Node::simple("q-value");
        qualifier
            .add_qualifier(QName::new(ex, "inner"), Node::simple("i"))
            .unwrap();
        let link = root
            .create_child(QName::new(ex, "Link"), NodeKind::Simple)
            .unwrap();
        *link = Node::simple_with_hint("http://example.com/?a=1&b=2", Some(ValueHint::Uri));
        link.add_qualifier(QName::new(ex, "q"), qualifier).unwrap();

        // Empty containers and nested arrays
        root.create_child(QName::new(ex, "Bag"), NodeKind::Array(ArrayType::Unordered))
            .unwrap();
        let seq = root
            .create_child(QName::new(ex, "Seq"), NodeKind::Array(ArrayType::Ordered))
            .unwrap();
        let inner = seq
            .insert_array_item(ItemPosition::Append, NodeKind::Array(ArrayType::Alternative))
            .unwrap();
        inner
            .insert_array_item(ItemPosition::Append, NodeKind::Structure)
            .unwrap();

        let xml = serialize(&root, SerializeOptions::default()).unwrap();
        let parsed = reparse(&xml);
        assert!(parsed.semantic_eq(&root), "{}", xml);

        let again = serialize(&parsed, SerializeOptions::default()).unwrap();
        assert_eq!(again, xml);
    }

    #[test]
    fn test_deeply_nested_structure() {
        const DEPTH: usize = 1500;
        let mut node = Node::simple("leaf");
        for _ in 0..DEPTH {
            let mut outer = Node::structure();
            *outer
                .create_child(QName::new(ns::EXIF, "Nested"), NodeKind::Simple)
                .unwrap() = node;
            node = outer;
        }
        let mut root = Node::structure();
        *root
            .create_child(QName::new(ns::XMP, "Deep"), NodeKind::Simple)
            .unwrap() = node;

        let xml = serialize(&root, SerializeOptions::default().omit_packet_wrapper()).unwrap();
        assert_eq!(xml.matches("<exif:Nested").count(), DEPTH - 1);
        assert_eq!(xml.matches("</exif:Nested>").count(), DEPTH - 2);
        assert!(xml.contains("<exif:Nested exif:Nested=\"leaf\"/>"));
        assert!(xml.contains("</xmp:Deep>\n    </rdf:Description>"));
    }

    #[test]
    fn test_root_must_be_structure() {
        assert!(matches!(
            serialize(&Node::simple("x"), SerializeOptions::default()),
            Err(XmpError::KindMismatch { .. })
        ));
    }
}
