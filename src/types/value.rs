//! XMP value types
//!
//! This module defines the scalar values that can be stored in simple XMP
//! properties and the semantic hints they leave on the node.

use std::fmt;

/// Semantic hint attached to a simple node's text value
///
/// Only [`ValueHint::Uri`] changes the serialized form (`rdf:resource`);
/// the others record how the value was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ValueHint {
    /// "True" / "False"
    Boolean,
    /// Decimal integer
    Integer,
    /// ISO 8601 date/time
    Date,
    /// A URI reference (serialized as `rdf:resource`)
    Uri,
}

/// XMP property value types
#[derive(Debug, Clone, PartialEq)]
pub enum XmpValue {
    /// String value
    String(String),
    /// Integer value
    Integer(i64),
    /// Boolean value
    Boolean(bool),
    /// Date/time value (ISO 8601 format)
    DateTime(String),
    /// URI value
    Uri(String),
}

impl XmpValue {
    /// Get the value as a string, if it is a string type
    pub fn as_str(&self) -> Option<&str> {
        match self {
            XmpValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer, if it is an integer type
    pub fn as_int(&self) -> Option<i64> {
        match self {
            XmpValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a boolean, if it is a boolean type
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            XmpValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The text stored in the tree for this value, and its hint
    pub fn into_text(self) -> (String, Option<ValueHint>) {
        match self {
            XmpValue::String(s) => (s, None),
            XmpValue::Integer(i) => (i.to_string(), Some(ValueHint::Integer)),
            XmpValue::Boolean(b) => (
                if b { "True" } else { "False" }.to_string(),
                Some(ValueHint::Boolean),
            ),
            XmpValue::DateTime(dt) => (dt, Some(ValueHint::Date)),
            XmpValue::Uri(uri) => (uri, Some(ValueHint::Uri)),
        }
    }
}

/// Parse XMP boolean text ("True"/"False", case-insensitive, also "1"/"0")
pub fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") || text == "1" {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") || text == "0" {
        Some(false)
    } else {
        None
    }
}

impl fmt::Display for XmpValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmpValue::String(s) => write!(f, "{}", s),
            XmpValue::Integer(i) => write!(f, "{}", i),
            XmpValue::Boolean(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            XmpValue::DateTime(dt) => write!(f, "{}", dt),
            XmpValue::Uri(uri) => write!(f, "{}", uri),
        }
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Serialize for XmpValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        match self {
            XmpValue::String(s) => serializer.serialize_str(s),
            XmpValue::Integer(i) => serializer.serialize_i64(*i),
            XmpValue::Boolean(b) => serializer.serialize_bool(*b),
            XmpValue::DateTime(dt) => serializer.serialize_str(dt),
            XmpValue::Uri(uri) => serializer.serialize_str(uri),
        }
    }
}

impl From<String> for XmpValue {
    fn from(s: String) -> Self {
        XmpValue::String(s)
    }
}

impl From<&str> for XmpValue {
    fn from(s: &str) -> Self {
        XmpValue::String(s.to_string())
    }
}

impl From<i64> for XmpValue {
    fn from(i: i64) -> Self {
        XmpValue::Integer(i)
    }
}

impl From<bool> for XmpValue {
    fn from(b: bool) -> Self {
        XmpValue::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xmp_value_string() {
        let value = XmpValue::String("test".to_string());
        assert_eq!(value.as_str(), Some("test"));
        assert_eq!(value.to_string(), "test");
    }

    #[test]
    fn test_xmp_value_from() {
        let value: XmpValue = "test".into();
        assert_eq!(value.as_str(), Some("test"));

        let value: XmpValue = 42.into();
        assert_eq!(value.as_int(), Some(42));

        let value: XmpValue = true.into();
        assert_eq!(value.as_bool(), Some(true));
    }

    #[test]
    fn test_into_text() {
        assert_eq!(
            XmpValue::Boolean(false).into_text(),
            ("False".to_string(), Some(ValueHint::Boolean))
        );
        assert_eq!(
            XmpValue::Integer(-7).into_text(),
            ("-7".to_string(), Some(ValueHint::Integer))
        );
        assert_eq!(
            XmpValue::Uri("http://example.com/".to_string()).into_text(),
            ("http://example.com/".to_string(), Some(ValueHint::Uri))
        );
        assert_eq!(XmpValue::from("plain").into_text(), ("plain".to_string(), None));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("True"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("yes"), None);
    }
}
