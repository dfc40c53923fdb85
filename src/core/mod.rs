//! XMP Core module
//!
//! This module contains the core functionality for XMP metadata processing:
//! the node tree, path addressing, namespace handling, RDF/XML parsing and
//! serialization, and the [`XmpMeta`] facade tying them together.

pub mod error;
pub mod iterator;
pub mod metadata;
pub mod namespace;
pub mod node;
pub mod parser;
pub mod serializer;
pub mod xml;
pub mod xpath;

pub use error::{ErrorKind, Severity, XmpError, XmpResult};
pub use iterator::{IterItem, IterOptions, NodeIter, VisitKind};
pub use metadata::{IncrementalParse, ParseAction, SharedMeta, XmpMeta};
pub use namespace::{default_namespaces, ns, NamespaceMap};
pub use node::{
    ArrayNode, ArrayType, ItemPosition, LangMatch, NamedNodes, Node, NodeKind, SimpleNode,
    StructureNode, X_DEFAULT,
};
pub use parser::{MergePolicy, ParseOptions, ParseWarning, ParsedPacket, RdfParser};
pub use serializer::{SerializeOptions, XmpSerializer};
pub use xpath::{PathSegment, PropertyOptions, XmpPath};
