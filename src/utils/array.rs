//! Joining array items into one string and splitting them back
//!
//! [`catenate_array_items`] writes the items of an unordered or ordered
//! array as one line, quoting items that contain separators.
//! [`separate_array_items`] reverses that and is tolerant of hand-typed
//! input: items may be split by semicolons, runs of spaces, control
//! characters or (unless commas are allowed) commas, in their ASCII, CJK
//! and other Unicode forms.

use crate::core::error::{XmpError, XmpResult};
use crate::core::metadata::XmpMeta;
use crate::core::node::{ArrayType, Node};
use crate::core::xpath::{PropertyOptions, XmpPath};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharKind {
    Normal,
    Space,
    Comma,
    Semicolon,
    Quote,
    Control,
}

fn classify(c: char) -> CharKind {
    match c {
        '"' => CharKind::Quote,
        ' ' => CharKind::Space,
        ',' | '\u{FF0C}' | '\u{FF64}' | '\u{FE50}' | '\u{FE51}' | '\u{3001}' | '\u{060C}'
        | '\u{055D}' => CharKind::Comma,
        ';' | '\u{FF1B}' | '\u{FE54}' | '\u{061B}' | '\u{037E}' => CharKind::Semicolon,
        '\u{0}'..='\u{1F}' | '\u{2028}' | '\u{2029}' => CharKind::Control,
        '\u{3000}' | '\u{303F}' | '\u{2000}'..='\u{200B}' => CharKind::Space,
        '\u{00AB}' | '\u{00BB}' | '\u{2015}' | '\u{2018}'..='\u{201F}' | '\u{2039}'
        | '\u{203A}' | '\u{3008}'..='\u{300F}' | '\u{301D}'..='\u{301F}' => CharKind::Quote,
        _ => CharKind::Normal,
    }
}

/// The quote that closes `open`, if `open` starts a quoted item
fn closing_quote(open: char) -> Option<char> {
    Some(match open {
        '"' => '"',
        '\u{00AB}' => '\u{00BB}',
        '\u{00BB}' => '\u{00AB}',
        '\u{2015}' => '\u{2015}',
        '\u{2018}' => '\u{2019}',
        '\u{201A}' => '\u{201B}',
        '\u{201C}' => '\u{201D}',
        '\u{201E}' => '\u{201F}',
        '\u{2039}' => '\u{203A}',
        '\u{203A}' => '\u{2039}',
        '\u{3008}' => '\u{3009}',
        '\u{300A}' => '\u{300B}',
        '\u{300C}' => '\u{300D}',
        '\u{300E}' => '\u{300F}',
        // U+301E closes it as well
        '\u{301D}' => '\u{301F}',
        _ => return None,
    })
}

fn is_closing_quote(c: char, open: char, close: Option<char>) -> bool {
    Some(c) == close || (open == '\u{301D}' && matches!(c, '\u{301E}' | '\u{301F}'))
}

fn is_surrounding_quote(c: char, open: char, close: Option<char>) -> bool {
    c == open || is_closing_quote(c, open, close)
}

/// Quote `item` if splitting would not give it back unchanged
fn apply_quotes(item: &str, open: char, close: char, allow_commas: bool) -> String {
    let starts_quoted = item.chars().next().is_some_and(|c| classify(c) == CharKind::Quote);
    let mut prev_space = false;
    let needs_quotes = starts_quoted
        || item.chars().any(|c| match classify(c) {
            CharKind::Space => std::mem::replace(&mut prev_space, true),
            kind => {
                prev_space = false;
                matches!(kind, CharKind::Semicolon | CharKind::Control)
                    || (kind == CharKind::Comma && !allow_commas)
            }
        });
    if !needs_quotes {
        return item.to_string();
    }

    let mut quoted = String::with_capacity(item.len() + 2);
    quoted.push(open);
    for c in item.chars() {
        quoted.push(c);
        if classify(c) == CharKind::Quote && is_surrounding_quote(c, open, Some(close)) {
            quoted.push(c);
        }
    }
    quoted.push(close);
    quoted
}

/// Check that `separator` is one semicolon with optional spaces around it
fn check_separator(separator: &str) -> XmpResult<()> {
    let mut semicolons = 0;
    for c in separator.chars() {
        match classify(c) {
            CharKind::Semicolon => semicolons += 1,
            CharKind::Space => {}
            _ => {
                return Err(XmpError::BadParam(
                    "Separator can have only spaces and one semicolon".to_string(),
                ))
            }
        }
    }
    if semicolons != 1 {
        return Err(XmpError::BadParam(
            "Separator must have exactly one semicolon".to_string(),
        ));
    }
    Ok(())
}

/// Parse the open and close quote pair, a single quote standing for both
fn quote_pair(quotes: &str) -> XmpResult<(char, char)> {
    let mut chars = quotes.chars();
    let (Some(open), close, None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(XmpError::BadParam(format!("Invalid quotes '{}'", quotes)));
    };
    let close = close.unwrap_or(open);
    if classify(open) != CharKind::Quote || classify(close) != CharKind::Quote {
        return Err(XmpError::BadParam("Invalid quoting character".to_string()));
    }
    if !is_closing_quote(close, open, closing_quote(open)) {
        return Err(XmpError::BadParam("Mismatched quote pair".to_string()));
    }
    Ok((open, close))
}

/// Join the items of an array into one string
///
/// `separator` must be a single semicolon, optionally surrounded by
/// spaces. `quotes` holds the opening and closing quote (one character when
/// both are the same, usually `"`). Items that contain separators, or that
/// start with a quote, are quoted and their inner matching quotes doubled.
/// With `allow_commas` commas do not force quoting.
///
/// A missing array gives an empty string. The array must not be an
/// alternative and all its items must be simple.
///
/// # Example
///
/// ```rust
/// use xmpdom::utils::catenate_array_items;
/// use xmpdom::{ArrayType, XmpMeta};
///
/// let mut meta = XmpMeta::new();
/// meta.append_array_item("dc:subject", ArrayType::Unordered, "sea").unwrap();
/// meta.append_array_item("dc:subject", ArrayType::Unordered, "salt; pepper").unwrap();
///
/// let line = catenate_array_items(&meta, "dc:subject", "; ", "\"", false).unwrap();
/// assert_eq!(line, "sea; \"salt; pepper\"");
/// ```
pub fn catenate_array_items(
    meta: &XmpMeta,
    path: &str,
    separator: &str,
    quotes: &str,
    allow_commas: bool,
) -> XmpResult<String> {
    check_separator(separator)?;
    let (open, close) = quote_pair(quotes)?;

    let array = match meta.get_node(path)? {
        None => return Ok(String::new()),
        Some(Node::Array(array)) if array.array_type != ArrayType::Alternative => array,
        Some(_) => {
            return Err(XmpError::BadParam(
                "Named property must be a non-alternate array".to_string(),
            ))
        }
    };

    let mut line = String::new();
    for (i, item) in array.items.iter().enumerate() {
        let Node::Simple(simple) = item else {
            return Err(XmpError::BadParam("Array items must be simple".to_string()));
        };
        if i > 0 {
            line.push_str(separator);
        }
        line.push_str(&apply_quotes(&simple.value, open, close, allow_commas));
    }
    Ok(line)
}

/// Split `text` into items
fn split_items(text: &str, allow_commas: bool) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let keeps_item = |kind: CharKind| {
        matches!(kind, CharKind::Normal | CharKind::Quote)
            || (kind == CharKind::Comma && allow_commas)
    };

    let mut items = Vec::new();
    let mut pos = 0;
    while pos < chars.len() {
        // commas between items are always skipped
        let Some(start) = (pos..chars.len())
            .find(|&i| matches!(classify(chars[i]), CharKind::Normal | CharKind::Quote))
        else {
            break;
        };

        let open = chars[start];
        if classify(open) != CharKind::Quote {
            let mut end = start;
            while end < chars.len() {
                let kind = classify(chars[end]);
                if keeps_item(kind) {
                    end += 1;
                    continue;
                }
                // a single space inside an item is kept
                if kind == CharKind::Space
                    && chars.get(end + 1).is_some_and(|&next| keeps_item(classify(next)))
                {
                    end += 1;
                    continue;
                }
                break;
            }
            items.push(chars[start..end].iter().collect());
            pos = end;
            continue;
        }

        let close = closing_quote(open);
        let mut value = String::new();
        let mut end = start + 1;
        while end < chars.len() {
            let c = chars[end];
            end += 1;
            if classify(c) != CharKind::Quote || !is_surrounding_quote(c, open, close) {
                value.push(c);
            } else if chars.get(end) == Some(&c) {
                // doubled quote
                value.push(c);
                end += 1;
            } else if !is_closing_quote(c, open, close) {
                value.push(c);
            } else {
                break;
            }
        }
        items.push(value);
        pos = end;
    }
    items
}

/// Replace the items of an array with the items found in `text`
///
/// The inverse of [`catenate_array_items`]. Leading separators, spaces
/// and commas are skipped; quoted items may contain anything, with the
/// closing quote doubled. Existing items whose value reappears are kept
/// with their qualifiers.
///
/// A missing array is created with `array_type` (unordered when `None`).
/// An existing array must not be an alternative, and must match
/// `array_type` when one is given.
pub fn separate_array_items(
    meta: &mut XmpMeta,
    path: &str,
    array_type: Option<ArrayType>,
    allow_commas: bool,
    text: &str,
) -> XmpResult<()> {
    if array_type == Some(ArrayType::Alternative) {
        return Err(XmpError::BadParam(
            "Items cannot be separated into an alternative array".to_string(),
        ));
    }
    let xpath = XmpPath::parse(path, meta.namespaces())?;
    match meta.get_node(path)? {
        Some(Node::Array(array)) => {
            if array.array_type == ArrayType::Alternative {
                return Err(XmpError::BadParam(
                    "Named property must be a non-alternate array".to_string(),
                ));
            }
            if array_type.is_some_and(|t| t != array.array_type) {
                return Err(XmpError::BadParam(
                    "Mismatch of specified and existing array form".to_string(),
                ));
            }
        }
        Some(other) => {
            return Err(XmpError::KindMismatch {
                expected: "array",
                found: other.kind_name(),
            })
        }
        None => {}
    }

    let options =
        PropertyOptions::default().array(array_type.unwrap_or(ArrayType::Unordered));
    let Node::Array(array) = xpath.resolve_or_create(meta.root_mut(), &options)? else {
        return Err(XmpError::InternalError(
            "separated items target is not an array".to_string(),
        ));
    };

    let mut old: Vec<Option<Node>> = std::mem::take(&mut array.items)
        .into_iter()
        .map(Some)
        .collect();
    for value in split_items(text, allow_commas) {
        let reused = old
            .iter_mut()
            .find(|slot| slot.as_ref().and_then(Node::value) == Some(value.as_str()))
            .and_then(Option::take);
        array.append(reused.unwrap_or_else(|| Node::simple(value)));
    }
    tracing::trace!(path, items = array.len(), "separated array items");
    Ok(())
}
