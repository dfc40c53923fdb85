//! Namespace management for XMP
//!
//! This module handles the bidirectional URI ↔ prefix mapping used when
//! resolving path expressions and when writing RDF/XML, plus the scoped
//! `xmlns` stack the parser uses while reading a document.
//!
//! The well-known namespaces form an immutable table built once per process.
//! Every [`NamespaceMap`] starts as a copy of that table; registrations made
//! afterwards only affect the map they are made on.

use crate::core::error::{XmpError, XmpResult};
use std::collections::HashMap;
use std::sync::OnceLock;

static DEFAULT_NAMESPACES: OnceLock<NamespaceMap> = OnceLock::new();

/// Built-in XMP namespaces
pub mod ns {
    /// XMP Basic namespace
    pub const XMP: &str = "http://ns.adobe.com/xap/1.0/";
    /// Dublin Core namespace
    pub const DC: &str = "http://purl.org/dc/elements/1.1/";
    /// EXIF namespace
    pub const EXIF: &str = "http://ns.adobe.com/exif/1.0/";
    /// EXIF Aux namespace
    pub const EXIF_AUX: &str = "http://ns.adobe.com/exif/1.0/aux/";
    /// IPTC Core namespace
    pub const IPTC_CORE: &str = "http://iptc.org/std/Iptc4xmpCore/1.0/xmlns/";
    /// IPTC Extension namespace
    pub const IPTC_EXT: &str = "http://iptc.org/std/Iptc4xmpExt/2008-02-29/";
    /// Photoshop namespace
    pub const PHOTOSHOP: &str = "http://ns.adobe.com/photoshop/1.0/";
    /// Camera Raw namespace
    pub const CAMERA_RAW: &str = "http://ns.adobe.com/camera-raw-settings/1.0/";
    /// XMP Rights namespace
    pub const XMP_RIGHTS: &str = "http://ns.adobe.com/xap/1.0/rights/";
    /// XMP Media Management namespace
    pub const XMP_MM: &str = "http://ns.adobe.com/xap/1.0/mm/";
    /// XMP Basic Job Ticket namespace
    pub const XMP_BJ: &str = "http://ns.adobe.com/xap/1.0/bj/";
    /// TIFF namespace
    pub const TIFF: &str = "http://ns.adobe.com/tiff/1.0/";
    /// PDF namespace
    pub const PDF: &str = "http://ns.adobe.com/pdf/1.3/";
    /// XMP Dynamic Media namespace
    pub const XMP_DM: &str = "http://ns.adobe.com/xmp/1.0/DynamicMedia/";
    /// RDF namespace
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// XML namespace (for xml:lang, etc.)
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    /// Namespace of the `x:xmpmeta` wrapper element
    pub const X: &str = "adobe:ns:meta/";

    /// (uri, preferred prefix) of every well-known namespace
    pub(crate) const WELL_KNOWN: &[(&str, &str)] = &[
        (XMP, "xmp"),
        (DC, "dc"),
        (EXIF, "exif"),
        (EXIF_AUX, "aux"),
        (IPTC_CORE, "Iptc4xmpCore"),
        (IPTC_EXT, "Iptc4xmpExt"),
        (PHOTOSHOP, "photoshop"),
        (CAMERA_RAW, "crs"),
        (XMP_RIGHTS, "xmpRights"),
        (XMP_MM, "xmpMM"),
        (XMP_BJ, "xmpBJ"),
        (TIFF, "tiff"),
        (PDF, "pdf"),
        (XMP_DM, "xmpDM"),
        (RDF, "rdf"),
        (XML, "xml"),
        (X, "x"),
    ];
}

/// Map of namespace URI to prefix
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    uri_to_prefix: HashMap<String, String>,
    prefix_to_uri: HashMap<String, String>,
}

impl NamespaceMap {
    /// Create a new namespace map with the well-known namespaces registered
    pub fn new() -> Self {
        default_namespaces().clone()
    }

    /// Create a map without any entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a namespace URI with a suggested prefix
    ///
    /// Returns the prefix actually bound to `uri`:
    /// - the existing prefix if `uri` is already registered;
    /// - `suggested_prefix` if it is free;
    /// - otherwise `suggested_prefix` followed by the smallest free number.
    ///
    /// A trailing `:` on the suggestion is ignored.
    pub fn register(&mut self, uri: &str, suggested_prefix: &str) -> XmpResult<String> {
        if uri.is_empty() {
            return Err(XmpError::BadParam("URI cannot be empty".to_string()));
        }
        if let Some(existing) = self.uri_to_prefix.get(uri) {
            return Ok(existing.clone());
        }

        let suggested = suggested_prefix.strip_suffix(':').unwrap_or(suggested_prefix);
        if !is_valid_prefix(suggested) {
            return Err(XmpError::BadParam(format!(
                "'{}' is not a valid namespace prefix",
                suggested_prefix
            )));
        }

        let mut prefix = suggested.to_string();
        let mut suffix = 1;
        while self.prefix_to_uri.contains_key(&prefix) {
            prefix = format!("{}{}", suggested, suffix);
            suffix += 1;
        }

        self.uri_to_prefix.insert(uri.to_string(), prefix.clone());
        self.prefix_to_uri.insert(prefix.clone(), uri.to_string());
        tracing::trace!(uri, prefix = %prefix, "registered namespace");
        Ok(prefix)
    }

    /// Get the prefix for a namespace URI
    pub fn get_prefix(&self, uri: &str) -> Option<&str> {
        self.uri_to_prefix.get(uri).map(|s| s.as_str())
    }

    /// Get the URI for a namespace prefix
    pub fn get_uri(&self, prefix: &str) -> Option<&str> {
        self.prefix_to_uri.get(prefix).map(|s| s.as_str())
    }

    /// Check if a namespace URI is registered
    pub fn has_uri(&self, uri: &str) -> bool {
        self.uri_to_prefix.contains_key(uri)
    }

    /// Check if a namespace prefix is registered
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefix_to_uri.contains_key(prefix)
    }

    /// Number of registered namespaces
    pub fn len(&self) -> usize {
        self.uri_to_prefix.len()
    }

    /// Check if the map has no entries
    pub fn is_empty(&self) -> bool {
        self.uri_to_prefix.is_empty()
    }

    /// All registered namespaces as (uri, prefix) tuples, sorted by prefix
    pub fn namespaces(&self) -> Vec<(String, String)> {
        let mut all: Vec<(String, String)> = self
            .uri_to_prefix
            .iter()
            .map(|(uri, prefix)| (uri.clone(), prefix.clone()))
            .collect();
        all.sort_by(|a, b| a.1.cmp(&b.1));
        all
    }
}

/// The immutable table of well-known namespaces
///
/// Built on first use and shared by the whole process.
pub fn default_namespaces() -> &'static NamespaceMap {
    DEFAULT_NAMESPACES.get_or_init(|| {
        let mut map = NamespaceMap::empty();
        for (uri, prefix) in ns::WELL_KNOWN {
            map.uri_to_prefix.insert(uri.to_string(), prefix.to_string());
            map.prefix_to_uri.insert(prefix.to_string(), uri.to_string());
        }
        map
    })
}

/// Check whether `prefix` can be bound to a namespace
///
/// The prefix must be an NCName, and `xmlns` is reserved for declarations.
pub fn is_valid_prefix(prefix: &str) -> bool {
    is_ncname(prefix) && !prefix.eq_ignore_ascii_case("xmlns")
}

/// Check whether `name` is a valid XML NCName
pub fn is_ncname(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

/// Scoped `xmlns` declarations seen while parsing a document
///
/// Each element pushes one frame (possibly empty); the frame is popped when
/// the element ends, so an inner declaration shadows outer ones only for the
/// element's subtree.
#[derive(Debug, Clone, Default)]
pub struct NamespaceScope {
    frames: Vec<Vec<(String, String)>>,
}

impl NamespaceScope {
    /// Create an empty scope stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter an element declaring `decls` as (prefix, uri) pairs
    pub fn push(&mut self, decls: Vec<(String, String)>) {
        self.frames.push(decls);
    }

    /// Leave the innermost element
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Resolve a prefix against the innermost visible declaration
    ///
    /// The `xml` prefix is always bound.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(ns::XML);
        }
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
