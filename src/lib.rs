//! # xmpdom
//!
//! A pure Rust XMP data model.
//!
//! The crate keeps XMP metadata as an owned tree of simple values, arrays and
//! structures, addresses nodes with compact path expressions such as
//! `dc:title[@xml:lang='en']` or `xmpMM:History[2]/stEvt:action`, and reads
//! and writes the RDF/XML packets XMP is stored in.
//!
//! ## Example
//!
//! ```rust
//! use xmpdom::{XmpMeta, XmpValue};
//!
//! let mut meta = XmpMeta::new();
//! meta.set_property("xmp:CreatorTool", XmpValue::from("xmpdom")).unwrap();
//! meta.set_localized_text("dc:title", "", "en-US", "A Title").unwrap();
//!
//! let packet = meta.serialize_packet().unwrap();
//! let parsed: XmpMeta = packet.parse().unwrap();
//! assert_eq!(
//!     parsed.get_property("xmp:CreatorTool").unwrap(),
//!     Some(XmpValue::from("xmpdom"))
//! );
//! ```

pub mod core;
pub mod types;
pub mod utils;

pub use core::error::{ErrorKind, Severity, XmpError, XmpResult};
pub use core::iterator::{IterItem, IterOptions, NodeIter, VisitKind};
pub use core::metadata::{IncrementalParse, ParseAction, SharedMeta, XmpMeta};
pub use core::namespace::{ns, NamespaceMap};
pub use core::node::{ArrayType, ItemPosition, LangMatch, Node, NodeKind};
pub use core::parser::{MergePolicy, ParseOptions, ParseWarning};
pub use core::serializer::SerializeOptions;
pub use core::xpath::{PathSegment, PropertyOptions, XmpPath};
pub use types::{QName, ValueHint, XmpValue};
