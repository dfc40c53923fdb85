//! XMP value and name types
//!
//! This module defines the qualified names and the scalar values used in XMP
//! properties.

pub mod qname;
pub mod value;

pub use qname::QName;
pub use value::{ValueHint, XmpValue};
