//! Whole-property helpers: templates, bulk removal and subtree copies
//!
//! Top-level properties are split into internal ones, which applications
//! maintain themselves (`xmp:ModifyDate`, most of `exif:`), and external
//! ones a user edits (`dc:title`, `xmp:Rating`). [`apply_template`] and
//! [`remove_properties`] leave internal properties alone unless asked.

use crate::core::error::{XmpError, XmpResult};
use crate::core::metadata::XmpMeta;
use crate::core::namespace::ns;
use crate::core::node::{NamedNodes, Node};
use crate::core::xpath::{PathSegment, PropertyOptions, XmpPath};
use crate::types::QName;

const SCRIPT: &str = "http://ns.adobe.com/xmp/1.0/Script/";
const BWF: &str = "http://ns.adobe.com/bwf/bext/1.0/";
const STOCK_PHOTO: &str = "http://ns.adobe.com/StockPhoto/1.0/";
const XMP_TEXT: &str = "http://ns.adobe.com/xap/1.0/t/";
const XMP_PAGED_FILE: &str = "http://ns.adobe.com/xap/1.0/t/pg/";
const XMP_GRAPHICS: &str = "http://ns.adobe.com/xap/1.0/g/";
const XMP_IMAGE: &str = "http://ns.adobe.com/xap/1.0/g/img/";
const XMP_FONT: &str = "http://ns.adobe.com/xap/1.0/sType/Font#";

/// Sorted
const EXTERNAL_DYNAMIC_MEDIA: &[&str] = &[
    "album",
    "altTapeName",
    "altTimecode",
    "artist",
    "cameraAngle",
    "cameraLabel",
    "cameraModel",
    "cameraMove",
    "client",
    "comment",
    "composer",
    "director",
    "directorPhotography",
    "engineer",
    "genre",
    "good",
    "instrument",
    "logComment",
    "projectName",
    "releaseDate",
    "scene",
    "shotDate",
    "shotDay",
    "shotLocation",
    "shotName",
    "shotNumber",
    "shotSize",
    "speakerPlacement",
    "takeNumber",
    "tapeName",
    "trackNumber",
    "videoAlphaMode",
    "videoAlphaPremultipleColor",
];

/// Check if a top-level property is maintained by applications rather
/// than edited by users
///
/// Properties of unknown namespaces are external.
pub fn is_internal_property(namespace: &str, name: &str) -> bool {
    match namespace {
        ns::DC => matches!(name, "format" | "language"),
        ns::XMP => matches!(
            name,
            "BaseURL" | "CreatorTool" | "Format" | "Locale" | "MetadataDate" | "ModifyDate"
        ),
        ns::PDF => matches!(
            name,
            "BaseURL" | "Creator" | "ModDate" | "PDFVersion" | "Producer"
        ),
        ns::TIFF => !matches!(name, "ImageDescription" | "Artist" | "Copyright"),
        ns::EXIF => name != "UserComment",
        ns::PHOTOSHOP => matches!(name, "ICCProfile" | "TextLayers"),
        ns::XMP_DM => EXTERNAL_DYNAMIC_MEDIA.binary_search(&name).is_err(),
        SCRIPT => !matches!(
            name,
            "action" | "character" | "dialog" | "sceneSetting" | "sceneTimeOfDay"
        ),
        BWF => name == "version",
        ns::EXIF_AUX | ns::CAMERA_RAW | ns::XMP_MM | STOCK_PHOTO | XMP_TEXT | XMP_PAGED_FILE
        | XMP_GRAPHICS | XMP_IMAGE | XMP_FONT => true,
        _ => false,
    }
}

fn is_internal(name: &QName) -> bool {
    is_internal_property(&name.namespace, &name.name)
}

fn top_level(meta: &XmpMeta) -> XmpResult<&NamedNodes> {
    meta.root()
        .as_structure()
        .map(|root| &root.fields)
        .ok_or_else(|| XmpError::InternalError("root is not a structure".to_string()))
}

fn top_level_mut(meta: &mut XmpMeta) -> XmpResult<&mut NamedNodes> {
    meta.root_mut()
        .as_structure_mut()
        .map(|root| &mut root.fields)
        .ok_or_else(|| XmpError::InternalError("root is not a structure".to_string()))
}

/// Register in `dest` the namespaces of `source` it does not know yet
fn adopt_namespaces(dest: &mut XmpMeta, source: &XmpMeta) -> XmpResult<()> {
    for (uri, prefix) in source.namespaces().namespaces() {
        if !dest.namespaces().has_uri(&uri) {
            dest.register_namespace(&uri, &prefix)?;
        }
    }
    Ok(())
}

/// What [`apply_template`] does with the working metadata
///
/// With no action set the template is ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemplateActions {
    /// Delete working properties the template does not have
    pub clear_unnamed: bool,
    /// Add template properties the working metadata lacks, and merge into
    /// existing arrays and structures
    pub add_new: bool,
    /// Overwrite existing properties with the template's
    pub replace_existing: bool,
    /// Like `replace_existing`, and delete working properties the template
    /// has with an empty value. Ignored for deletion with `clear_unnamed`.
    pub delete_empty: bool,
    /// Also act on internal properties
    pub include_internal: bool,
}

impl TemplateActions {
    /// Delete working properties the template does not have
    pub fn clear_unnamed(mut self) -> Self {
        self.clear_unnamed = true;
        self
    }

    /// Add missing template properties
    pub fn add_new(mut self) -> Self {
        self.add_new = true;
        self
    }

    /// Overwrite existing properties
    pub fn replace_existing(mut self) -> Self {
        self.replace_existing = true;
        self
    }

    /// Overwrite existing properties and delete those the template empties
    pub fn delete_empty(mut self) -> Self {
        self.delete_empty = true;
        self
    }

    /// Act on internal properties too
    pub fn include_internal(mut self) -> Self {
        self.include_internal = true;
        self
    }
}

/// Update `working` from the top-level properties of `template`
///
/// Actions run in this order:
///
/// 1. `clear_unnamed` deletes working properties missing from the template.
/// 2. `add_new` and `replace_existing` copy template properties over.
///
/// A template property with an empty value (an empty string, or a container
/// without children) is skipped, or deletes its working counterpart under
/// `delete_empty`. A missing property is copied without its empty
/// descendants. An existing simple property is overwritten only under
/// `replace_existing`. With `add_new`, existing arrays and structures are
/// merged instead of overwritten:
///
/// - structure fields merge one by one,
/// - language alternatives merge by `xml:lang`, keeping `x-default` first,
/// - other arrays gain the template items they do not already hold.
///
/// # Example
///
/// ```rust
/// use xmpdom::utils::{apply_template, TemplateActions};
/// use xmpdom::{XmpMeta, XmpValue};
///
/// let mut working = XmpMeta::new();
/// working.set_property("xmp:Rating", "1").unwrap();
/// working.set_property("xmp:Label", "Red").unwrap();
///
/// let mut template = XmpMeta::new();
/// template.set_property("xmp:Rating", "5").unwrap();
///
/// let actions = TemplateActions::default().clear_unnamed().replace_existing();
/// apply_template(&mut working, &template, actions).unwrap();
/// assert_eq!(working.get_property("xmp:Rating").unwrap(), Some(XmpValue::from("5")));
/// assert!(!working.has_property("xmp:Label"));
/// ```
pub fn apply_template(
    working: &mut XmpMeta,
    template: &XmpMeta,
    actions: TemplateActions,
) -> XmpResult<()> {
    let replace = actions.replace_existing || actions.delete_empty;
    let delete_empty = actions.delete_empty && !actions.clear_unnamed;
    let include_internal = actions.include_internal;

    let template_props = top_level(template)?;
    if actions.add_new || replace {
        adopt_namespaces(working, template)?;
    }
    let working_props = top_level_mut(working)?;

    if actions.clear_unnamed {
        working_props.retain(|name, _| {
            template_props.contains(name) || (!include_internal && is_internal(name))
        });
    }

    if actions.add_new || replace {
        for (name, prop) in template_props.iter() {
            if include_internal || !is_internal(name) {
                append_subtree(name, prop, working_props, actions.add_new, replace, delete_empty);
            }
        }
    }
    tracing::debug!(?actions, properties = working_props.len(), "applied template");
    Ok(())
}

fn is_empty_value(node: &Node) -> bool {
    match node {
        Node::Simple(simple) => simple.value.is_empty(),
        _ => node.child_count() == 0,
    }
}

/// Merge `source` into the same-named child of `dest_parent`
fn append_subtree(
    name: &QName,
    source: &Node,
    dest_parent: &mut NamedNodes,
    merge_compound: bool,
    replace_old: bool,
    delete_empty: bool,
) {
    if is_empty_value(source) {
        if delete_empty {
            dest_parent.remove(name);
        }
        return;
    }

    let Some(dest) = dest_parent.get_mut(name) else {
        if let Some(copy) = source.clone_ignoring_empty(true) {
            dest_parent.set(name.clone(), copy);
        }
        return;
    };

    let replace_this = replace_old && !(merge_compound && !source.is_simple());
    if replace_this {
        match source.clone_ignoring_empty(true) {
            Some(copy) => *dest = copy,
            None => {
                dest_parent.remove(name);
            }
        }
        return;
    }

    if source.is_simple() || source.kind() != dest.kind() {
        return;
    }

    let drop_dest = match (source, dest) {
        (Node::Structure(source), Node::Structure(dest)) => {
            for (field_name, field) in source.fields.iter() {
                append_subtree(
                    field_name,
                    field,
                    &mut dest.fields,
                    merge_compound,
                    replace_old,
                    delete_empty,
                );
                if delete_empty && dest.fields.is_empty() {
                    break;
                }
            }
            delete_empty && dest.fields.is_empty()
        }
        (Node::Array(source), Node::Array(dest)) if source.is_lang_alt() => {
            for item in &source.items {
                let Some(lang) = item.lang() else {
                    continue;
                };
                let found = dest.find_lang(lang);
                if item.value().is_some_and(str::is_empty) {
                    if let (true, Some(index)) = (delete_empty, found) {
                        dest.items.remove(index - 1);
                        if dest.items.is_empty() {
                            break;
                        }
                    }
                } else if let Some(index) = found {
                    if replace_old {
                        if let (Some(target), Some(value)) =
                            (dest.items[index - 1].as_simple_mut(), item.value())
                        {
                            target.value = value.to_string();
                        }
                    }
                } else if let Some(copy) = item.clone_ignoring_empty(true) {
                    if lang.eq_ignore_ascii_case("x-default") && !dest.items.is_empty() {
                        dest.items.insert(0, copy);
                    } else {
                        dest.items.push(copy);
                    }
                }
            }
            delete_empty && dest.items.is_empty()
        }
        (Node::Array(source), Node::Array(dest)) => {
            for item in &source.items {
                if dest.items.iter().any(|existing| item_values_match(item, existing)) {
                    continue;
                }
                if let Some(copy) = item.clone_ignoring_empty(true) {
                    dest.items.push(copy);
                }
            }
            false
        }
        _ => false,
    };
    if drop_dest {
        dest_parent.remove(name);
    }
}

/// Whether `right` already holds what `left` says
///
/// Simple nodes compare value and `xml:lang`. Structures need the same
/// fields with matching values. Arrays match when every item of `left` has
/// a match in `right`, in any order.
fn item_values_match(left: &Node, right: &Node) -> bool {
    match (left, right) {
        (Node::Simple(l), Node::Simple(r)) => l.value == r.value && left.lang() == right.lang(),
        (Node::Structure(l), Node::Structure(r)) => {
            l.len() == r.len()
                && l.fields.iter().all(|(name, field)| {
                    r.get_field(name)
                        .is_some_and(|other| item_values_match(field, other))
                })
        }
        (Node::Array(l), Node::Array(r)) => {
            l.array_type == r.array_type
                && l
                    .items
                    .iter()
                    .all(|item| r.items.iter().any(|other| item_values_match(item, other)))
        }
        _ => false,
    }
}

/// Which properties [`remove_properties`] deletes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveTarget<'a> {
    /// The node at a path; its top-level property decides internality
    Property(&'a str),
    /// Every top-level property in a namespace URI
    Namespace(&'a str),
    /// Every top-level property
    All,
}

/// Delete external properties, or all of them with `include_internal`
///
/// Returns the number of removed nodes. Missing targets are not an error.
pub fn remove_properties(
    meta: &mut XmpMeta,
    target: RemoveTarget<'_>,
    include_internal: bool,
) -> XmpResult<usize> {
    let removable = |name: &QName| include_internal || !is_internal(name);

    let removed = match target {
        RemoveTarget::Property(path) => {
            let xpath = XmpPath::parse(path, meta.namespaces())?;
            let Some(PathSegment::Property(root_name)) = xpath.segments().first() else {
                return Err(XmpError::BadParam(format!(
                    "'{}' does not start with a property name",
                    path
                )));
            };
            if !removable(root_name) {
                0
            } else {
                usize::from(xpath.remove(meta.root_mut())?.is_some())
            }
        }
        RemoveTarget::Namespace(uri) => {
            let props = top_level_mut(meta)?;
            let before = props.len();
            props.retain(|name, _| name.namespace != uri || !removable(name));
            before - props.len()
        }
        RemoveTarget::All => {
            let props = top_level_mut(meta)?;
            let before = props.len();
            props.retain(|name, _| !removable(name));
            before - props.len()
        }
    };
    tracing::trace!(?target, include_internal, removed, "removed properties");
    Ok(removed)
}

/// Copy the subtree at `source_path` in `source` to `dest_path` in `dest`
///
/// `dest_path` is created the way [`XmpMeta::set_property`] creates paths
/// and must not exist yet. An empty `dest_path` reuses `source_path`.
/// Namespaces known to `source` are registered in `dest` as needed. To
/// copy within one tree, pass a clone as `source`.
pub fn duplicate_subtree(
    source: &XmpMeta,
    dest: &mut XmpMeta,
    source_path: &str,
    dest_path: &str,
) -> XmpResult<()> {
    let dest_path = if dest_path.is_empty() { source_path } else { dest_path };
    let subtree = source
        .get_node(source_path)?
        .ok_or_else(|| XmpError::NotFound(source_path.to_string()))?;

    adopt_namespaces(dest, source)?;
    let xpath = XmpPath::parse(dest_path, dest.namespaces())?;
    if xpath.is_empty() {
        return Err(XmpError::BadParam("Cannot duplicate onto the root".to_string()));
    }
    if dest.get_node(dest_path)?.is_some() {
        return Err(XmpError::DuplicateName(dest_path.to_string()));
    }
    if matches!(xpath.last(), Some(PathSegment::Qualifier(_))) && subtree.qualifier_depth() > 1 {
        return Err(XmpError::QualifierTooDeep(dest_path.to_string()));
    }

    let options = PropertyOptions::default().leaf_kind(subtree.kind());
    let slot = xpath.resolve_or_create(dest.root_mut(), &options)?;
    *slot = subtree.clone();
    tracing::trace!(source = source_path, dest = dest_path, "duplicated subtree");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::node::ArrayType;
    use crate::types::XmpValue;
    use pretty_assertions::assert_eq;

    fn value(meta: &XmpMeta, path: &str) -> Option<String> {
        meta.get_property(path)
            .unwrap()
            .map(|v| XmpValue::into_text(v).0)
    }

    fn bag(meta: &mut XmpMeta, path: &str, values: &[&str]) {
        for v in values {
            meta.append_array_item(path, ArrayType::Unordered, *v).unwrap();
        }
    }

    #[test]
    fn test_internal_properties() {
        assert!(is_internal_property(ns::XMP, "ModifyDate"));
        assert!(!is_internal_property(ns::XMP, "Rating"));
        assert!(is_internal_property(ns::TIFF, "Orientation"));
        assert!(!is_internal_property(ns::TIFF, "Artist"));
        assert!(is_internal_property(ns::EXIF, "FNumber"));
        assert!(!is_internal_property(ns::EXIF, "UserComment"));
        assert!(is_internal_property(ns::XMP_MM, "DocumentID"));
        assert!(!is_internal_property(ns::XMP_DM, "album"));
        assert!(is_internal_property(ns::XMP_DM, "duration"));
        assert!(!is_internal_property(ns::DC, "title"));
        assert!(!is_internal_property("http://example.com/ns/", "anything"));
        assert!(EXTERNAL_DYNAMIC_MEDIA.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_template_clear_keeps_internal() {
        let mut working = XmpMeta::new();
        working.set_property("xmp:Label", "Red").unwrap();
        working.set_property("xmp:ModifyDate", "2024-01-01").unwrap();
        working.set_property("dc:source", "scan").unwrap();
        let mut template = XmpMeta::new();
        template.set_property("dc:source", "").unwrap();

        apply_template(&mut working, &template, TemplateActions::default().clear_unnamed())
            .unwrap();
        assert!(!working.has_property("xmp:Label"));
        assert!(working.has_property("xmp:ModifyDate"));
        assert_eq!(value(&working, "dc:source"), Some("scan".into()));

        let actions = TemplateActions::default().clear_unnamed().include_internal();
        apply_template(&mut working, &template, actions).unwrap();
        assert!(!working.has_property("xmp:ModifyDate"));
    }

    #[test]
    fn test_template_add_and_replace() {
        let mut working = XmpMeta::new();
        working.set_property("xmp:Rating", "1").unwrap();
        let mut template = XmpMeta::new();
        template.set_property("xmp:Rating", "4").unwrap();
        template.set_property("xmp:Label", "Blue").unwrap();
        template.set_property("xmp:Nickname", "").unwrap();
        template.set_property("xmp:CreatorTool", "tool").unwrap();

        apply_template(&mut working, &template, TemplateActions::default().add_new()).unwrap();
        assert_eq!(value(&working, "xmp:Rating"), Some("1".into()));
        assert_eq!(value(&working, "xmp:Label"), Some("Blue".into()));
        assert!(!working.has_property("xmp:Nickname"));
        assert!(!working.has_property("xmp:CreatorTool"));

        apply_template(&mut working, &template, TemplateActions::default().replace_existing())
            .unwrap();
        assert_eq!(value(&working, "xmp:Rating"), Some("4".into()));
    }

    #[test]
    fn test_template_delete_empty() {
        let mut working = XmpMeta::new();
        working.set_property("xmp:Label", "Red").unwrap();
        working.set_property("xmp:Rating", "2").unwrap();
        let mut template = XmpMeta::new();
        template.set_property("xmp:Label", "").unwrap();

        apply_template(&mut working, &template, TemplateActions::default().delete_empty())
            .unwrap();
        assert!(!working.has_property("xmp:Label"));
        assert!(working.has_property("xmp:Rating"));
    }

    #[test]
    fn test_template_merges_arrays() {
        let mut working = XmpMeta::new();
        bag(&mut working, "dc:subject", &["sea", "sky"]);
        working.set_localized_text("dc:title", "", "en", "Hello").unwrap();

        let mut template = XmpMeta::new();
        bag(&mut template, "dc:subject", &["sky", "sand"]);
        template.set_localized_text("dc:title", "", "fr", "Bonjour").unwrap();
        template.set_localized_text("dc:title", "", "en", "Hi").unwrap();

        apply_template(&mut working, &template, TemplateActions::default().add_new()).unwrap();
        assert_eq!(working.count_array_items("dc:subject").unwrap(), 3);
        assert_eq!(value(&working, "dc:subject[3]"), Some("sand".into()));
        assert_eq!(value(&working, "dc:title[@xml:lang='fr']"), Some("Bonjour".into()));
        assert_eq!(value(&working, "dc:title[@xml:lang='en']"), Some("Hello".into()));

        let actions = TemplateActions::default().add_new().replace_existing();
        apply_template(&mut working, &template, actions).unwrap();
        assert_eq!(value(&working, "dc:title[@xml:lang='en']"), Some("Hi".into()));
        assert_eq!(
            working.get_node("dc:title[1]").unwrap().and_then(Node::lang),
            Some("x-default")
        );
    }

    #[test]
    fn test_template_merges_structure_fields() {
        let mut working = XmpMeta::new();
        working.set_property("exif:Flash/exif:Fired", "True").unwrap();
        let mut template = XmpMeta::new();
        template.set_property("exif:Flash/exif:Fired", "False").unwrap();
        template.set_property("exif:Flash/exif:Mode", "2").unwrap();

        let actions = TemplateActions::default().add_new().include_internal();
        apply_template(&mut working, &template, actions).unwrap();
        assert_eq!(value(&working, "exif:Flash/exif:Fired"), Some("True".into()));
        assert_eq!(value(&working, "exif:Flash/exif:Mode"), Some("2".into()));
    }

    #[test]
    fn test_remove_properties() {
        let mut meta = XmpMeta::new();
        meta.set_property("xmp:Label", "Red").unwrap();
        meta.set_property("xmp:ModifyDate", "2024-01-01").unwrap();
        meta.set_property("dc:source", "scan").unwrap();
        meta.set_property("exif:FNumber", "4").unwrap();

        let modify_date = RemoveTarget::Property("xmp:ModifyDate");
        assert_eq!(remove_properties(&mut meta, modify_date, false).unwrap(), 0);
        let xmp = RemoveTarget::Namespace(ns::XMP);
        assert_eq!(remove_properties(&mut meta, xmp, false).unwrap(), 1);
        assert!(meta.has_property("xmp:ModifyDate"));
        assert!(!meta.has_property("xmp:Label"));

        assert_eq!(remove_properties(&mut meta, RemoveTarget::All, false).unwrap(), 1);
        assert!(meta.has_property("exif:FNumber"));
        assert_eq!(remove_properties(&mut meta, RemoveTarget::All, true).unwrap(), 2);
        assert_eq!(meta.iter().count(), 0);

        assert!(matches!(
            remove_properties(&mut meta, RemoveTarget::Property("dc:creator[1]"), false),
            Ok(0)
        ));
    }

    #[test]
    fn test_duplicate_subtree() {
        let mut source = XmpMeta::new();
        source.register_namespace("http://example.com/ns/", "ex").unwrap();
        source.set_property("ex:Box/ex:Width", "10").unwrap();
        source.set_qualifier("ex:Box", "ex:unit", "px").unwrap();

        let mut dest = XmpMeta::new();
        duplicate_subtree(&source, &mut dest, "ex:Box", "").unwrap();
        duplicate_subtree(&source, &mut dest, "ex:Box/ex:Width", "dc:format[2]").unwrap();
        assert_eq!(value(&dest, "ex:Box/ex:Width"), Some("10".into()));
        assert_eq!(value(&dest, "ex:Box/@ex:unit"), Some("px".into()));
        assert_eq!(value(&dest, "dc:format[2]"), Some("10".into()));
        assert_eq!(dest.count_array_items("dc:format").unwrap(), 2);

        assert!(matches!(
            duplicate_subtree(&source, &mut dest, "ex:Box", ""),
            Err(XmpError::DuplicateName(_))
        ));
        assert!(matches!(
            duplicate_subtree(&source, &mut dest, "ex:Missing", "ex:Other"),
            Err(XmpError::NotFound(_))
        ));
    }
}
