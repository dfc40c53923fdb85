//! Helpers built on top of [`XmpMeta`](crate::XmpMeta)
//!
//! - [`array`]: join array items into one line and split them back
//! - [`properties`]: templates, bulk removal and subtree copies

pub mod array;
pub mod properties;

pub use array::{catenate_array_items, separate_array_items};
pub use properties::{
    apply_template, duplicate_subtree, is_internal_property, remove_properties, RemoveTarget,
    TemplateActions,
};
