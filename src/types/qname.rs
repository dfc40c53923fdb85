//! Qualified names for XMP
//!
//! Properties, structure fields and qualifiers are all named by a namespace
//! URI plus a local name. Prefixes are a serialization concern and live in
//! the namespace registry, never in the tree.

use crate::core::namespace::ns;
use std::fmt;

/// A namespace-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QName {
    /// The namespace URI
    pub namespace: String,
    /// The local name
    pub name: String,
}

impl QName {
    /// Create a new qualified name
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// The `xml:lang` qualifier name
    pub fn xml_lang() -> Self {
        Self::new(ns::XML, "lang")
    }

    /// Check namespace and local name without allocating
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }

    /// Check if this is `xml:lang`
    pub fn is_xml_lang(&self) -> bool {
        self.is(ns::XML, "lang")
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.name)
    }
}
