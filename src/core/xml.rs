//! XML event source for the RDF parser
//!
//! [`XmlTokenizer`] turns (possibly chunked) XML text into a flat stream of
//! [`XmlEvent`]s using `quick-xml`. Only complete markup is handed to the
//! reader; an unfinished tail is kept until the next chunk arrives. Names are
//! reported raw (`prefix:local`); namespace resolution is left to the parser.

use crate::core::error::{XmpError, XmpResult};
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One XML event with its byte offset in the whole stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    /// Element start (empty elements produce a `Start` followed by an `End`)
    Start {
        /// Raw qualified name
        name: String,
        /// Raw attribute names with decoded values, in document order
        attributes: Vec<(String, String)>,
        /// Byte offset of the tag
        offset: usize,
    },
    /// Decoded character data (CDATA sections included)
    Text {
        /// The text
        text: String,
        /// Byte offset of the text
        offset: usize,
    },
    /// Element end
    End {
        /// Raw qualified name
        name: String,
        /// Byte offset of the tag
        offset: usize,
    },
}

impl XmlEvent {
    /// Byte offset of the event
    pub fn offset(&self) -> usize {
        match self {
            XmlEvent::Start { offset, .. }
            | XmlEvent::Text { offset, .. }
            | XmlEvent::End { offset, .. } => *offset,
        }
    }
}

/// Chunked XML tokenizer
#[derive(Debug, Default)]
pub struct XmlTokenizer {
    pending: String,
    base: usize,
    open: Vec<String>,
    started: bool,
    finished: bool,
}

impl XmlTokenizer {
    /// Create a tokenizer at the start of a stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenize a complete document
    pub fn tokenize(xml: &str) -> XmpResult<Vec<XmlEvent>> {
        Self::new().push(xml, true)
    }

    /// Feed the next chunk
    ///
    /// Returns the events of all markup completed so far. With `is_final`
    /// the whole remaining input is consumed and unclosed elements are an
    /// error; further pushes fail with `BadParam`.
    pub fn push(&mut self, chunk: &str, is_final: bool) -> XmpResult<Vec<XmlEvent>> {
        if self.finished {
            return Err(XmpError::BadParam(
                "XML stream already finished".to_string(),
            ));
        }
        if !self.started {
            self.started = true;
            if let Some(rest) = chunk.strip_prefix('\u{FEFF}') {
                self.base = '\u{FEFF}'.len_utf8();
                self.pending.push_str(rest);
            } else {
                self.pending.push_str(chunk);
            }
        } else {
            self.pending.push_str(chunk);
        }

        let cut = if is_final {
            self.pending.len()
        } else {
            safe_boundary(&self.pending)
        };
        let rest = self.pending.split_off(cut);
        let ready = std::mem::replace(&mut self.pending, rest);

        let result = self.read(&ready);
        self.base += ready.len();

        if is_final {
            self.finished = true;
            let events = result?;
            if let Some(name) = self.open.last() {
                return Err(XmpError::RdfSyntax {
                    offset: self.base,
                    detail: format!("Element '{}' is not closed", name),
                });
            }
            return Ok(events);
        }
        if result.is_err() {
            self.finished = true;
        }
        result
    }

    fn read(&mut self, text: &str) -> XmpResult<Vec<XmlEvent>> {
        let mut events = Vec::new();
        if text.is_empty() {
            return Ok(events);
        }

        let mut reader = Reader::from_str(text);
        let config = reader.config_mut();
        config.trim_text(false);
        config.check_end_names = false;

        loop {
            let offset = self.base + reader.buffer_position() as usize;
            let event = reader.read_event().map_err(|e| XmpError::RdfSyntax {
                offset: self.base + reader.error_position() as usize,
                detail: format!("Malformed XML: {}", e),
            })?;
            match event {
                Event::Start(e) => {
                    let (name, attributes) = start_parts(&e, offset)?;
                    self.open.push(name.clone());
                    events.push(XmlEvent::Start {
                        name,
                        attributes,
                        offset,
                    });
                }
                Event::Empty(e) => {
                    let (name, attributes) = start_parts(&e, offset)?;
                    events.push(XmlEvent::Start {
                        name: name.clone(),
                        attributes,
                        offset,
                    });
                    events.push(XmlEvent::End { name, offset });
                }
                Event::End(e) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match self.open.pop() {
                        Some(open) if open == name => {}
                        Some(open) => {
                            return Err(XmpError::RdfSyntax {
                                offset,
                                detail: format!("Expected </{}>, found </{}>", open, name),
                            })
                        }
                        None => {
                            return Err(XmpError::RdfSyntax {
                                offset,
                                detail: format!("Unexpected </{}>", name),
                            })
                        }
                    }
                    events.push(XmlEvent::End { name, offset });
                }
                Event::Text(e) => {
                    let raw = String::from_utf8_lossy(e.as_ref());
                    let text = unescape(&raw).map_err(|err| XmpError::RdfSyntax {
                        offset,
                        detail: format!("Bad character reference: {}", err),
                    })?;
                    push_text(&mut events, text.into_owned(), offset);
                }
                Event::GeneralRef(e) => {
                    let reference = format!("&{};", String::from_utf8_lossy(e.as_ref()));
                    let text = unescape(&reference).map_err(|err| XmpError::RdfSyntax {
                        offset,
                        detail: format!("Bad entity reference {}: {}", reference, err),
                    })?;
                    push_text(&mut events, text.into_owned(), offset);
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    push_text(&mut events, text, offset);
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and DOCTYPE
                // carry no metadata.
                _ => {}
            }
        }
        Ok(events)
    }
}

/// Join adjacent text events (references arrive as separate reader events)
fn push_text(events: &mut Vec<XmlEvent>, text: String, offset: usize) {
    if let Some(XmlEvent::Text { text: last, .. }) = events.last_mut() {
        last.push_str(&text);
        return;
    }
    events.push(XmlEvent::Text { text, offset });
}

fn start_parts(e: &BytesStart<'_>, offset: usize) -> XmpResult<(String, Vec<(String, String)>)> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| XmpError::RdfSyntax {
            offset,
            detail: format!("Bad attribute on <{}>: {}", name, err),
        })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw).map_err(|err| XmpError::RdfSyntax {
            offset,
            detail: format!("Bad value for attribute '{}': {}", key, err),
        })?;
        attributes.push((key, value.into_owned()));
    }
    Ok((name, attributes))
}

#[derive(Clone, Copy)]
enum ScanState {
    Text,
    Tag(Option<u8>),
    Comment,
    CData,
    Pi,
}

/// Byte length of the prefix of `buf` that ends after complete markup
///
/// Text following the last complete tag is held back, so references and
/// multi-byte characters are never split.
fn safe_boundary(buf: &str) -> usize {
    let bytes = buf.as_bytes();
    let mut state = ScanState::Text;
    let mut safe = 0;
    let mut i = 0;
    while i < bytes.len() {
        match state {
            ScanState::Text => {
                if bytes[i] == b'<' {
                    let rest = &bytes[i..];
                    if rest.len() < 9 && (b"<!--".starts_with(rest) || b"<![CDATA[".starts_with(rest)) {
                        break;
                    }
                    if rest.starts_with(b"<!--") {
                        state = ScanState::Comment;
                        i += 4;
                        continue;
                    } else if rest.starts_with(b"<![CDATA[") {
                        state = ScanState::CData;
                        i += 9;
                        continue;
                    } else if rest.starts_with(b"<?") {
                        state = ScanState::Pi;
                        i += 2;
                        continue;
                    }
                    state = ScanState::Tag(None);
                }
            }
            ScanState::Tag(quote) => match (quote, bytes[i]) {
                (None, b'"' | b'\'') => state = ScanState::Tag(Some(bytes[i])),
                (Some(q), b) if q == b => state = ScanState::Tag(None),
                (None, b'>') => {
                    state = ScanState::Text;
                    safe = i + 1;
                }
                _ => {}
            },
            ScanState::Comment => {
                if bytes[i..].starts_with(b"-->") {
                    state = ScanState::Text;
                    i += 3;
                    safe = i;
                    continue;
                }
            }
            ScanState::CData => {
                if bytes[i..].starts_with(b"]]>") {
                    state = ScanState::Text;
                    i += 3;
                    safe = i;
                    continue;
                }
            }
            ScanState::Pi => {
                if bytes[i..].starts_with(b"?>") {
                    state = ScanState::Text;
                    i += 2;
                    safe = i;
                    continue;
                }
            }
        }
        i += 1;
    }
    safe
}

/// Decode raw packet bytes to text
///
/// Honors a UTF-8, UTF-16LE or UTF-16BE byte order mark; without one, a
/// zero byte in the first two positions selects the UTF-16 byte order.
pub fn decode_packet_bytes(bytes: &[u8]) -> XmpResult<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return decode_utf8(rest, 3);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        return decode_utf16(rest, false);
    }
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        return decode_utf16(rest, true);
    }
    match bytes {
        [0, b, ..] if *b != 0 => decode_utf16(bytes, true),
        [b, 0, ..] if *b != 0 => decode_utf16(bytes, false),
        _ => decode_utf8(bytes, 0),
    }
}

fn decode_utf8(bytes: &[u8], skipped: usize) -> XmpResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| XmpError::RdfSyntax {
            offset: skipped + e.valid_up_to(),
            detail: "Invalid UTF-8".to_string(),
        })
}

fn decode_utf16(bytes: &[u8], big_endian: bool) -> XmpResult<String> {
    if bytes.len() % 2 != 0 {
        return Err(XmpError::RdfSyntax {
            offset: bytes.len(),
            detail: "Truncated UTF-16 input".to_string(),
        });
    }
    let units = bytes.chunks_exact(2).map(|pair| {
        if big_endian {
            u16::from_be_bytes([pair[0], pair[1]])
        } else {
            u16::from_le_bytes([pair[0], pair[1]])
        }
    });
    let mut out = String::with_capacity(bytes.len() / 2);
    for (i, unit) in char::decode_utf16(units).enumerate() {
        match unit {
            Ok(c) => out.push(c),
            Err(_) => {
                return Err(XmpError::RdfSyntax {
                    offset: i * 2,
                    detail: "Invalid UTF-16".to_string(),
                })
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn start(name: &str, attributes: &[(&str, &str)], offset: usize) -> XmlEvent {
        XmlEvent::Start {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            offset,
        }
    }

    #[test]
    fn test_tokenize_document() {
        let events = XmlTokenizer::tokenize(r#"<a x="1 &amp; 2"><b/>t&lt;x</a>"#).unwrap();
        assert_eq!(
            events,
            vec![
                start("a", &[("x", "1 & 2")], 0),
                start("b", &[], 17),
                XmlEvent::End {
                    name: "b".to_string(),
                    offset: 17
                },
                XmlEvent::Text {
                    text: "t<x".to_string(),
                    offset: 21
                },
                XmlEvent::End {
                    name: "a".to_string(),
                    offset: 27
                },
            ]
        );
    }

    #[test]
    fn test_chunked_matches_whole() {
        let doc = r#"<?xml version="1.0"?><r:a xmlns:r="urn:x"><!-- c --><r:b q='>'>caf&#xE9; &amp; more</r:b><![CDATA[<raw>]]></r:a>"#;
        let whole = XmlTokenizer::tokenize(doc).unwrap();
        for size in [1, 2, 3, 7, 16] {
            let mut tokenizer = XmlTokenizer::new();
            let mut events = Vec::new();
            let chars: Vec<char> = doc.chars().collect();
            let pieces: Vec<String> = chars.chunks(size).map(|c| c.iter().collect()).collect();
            for (i, piece) in pieces.iter().enumerate() {
                events.extend(tokenizer.push(piece, i + 1 == pieces.len()).unwrap());
            }
            assert_eq!(events, whole, "chunk size {}", size);
        }
    }

    #[test]
    fn test_balance_errors() {
        assert!(matches!(
            XmlTokenizer::tokenize("<a><b></a>"),
            Err(XmpError::RdfSyntax { offset: 6, .. })
        ));
        assert!(matches!(
            XmlTokenizer::tokenize("<a><b></b>"),
            Err(XmpError::RdfSyntax { offset: 10, .. })
        ));

        let mut tokenizer = XmlTokenizer::new();
        tokenizer.push("<a/>", true).unwrap();
        assert!(matches!(
            tokenizer.push("<b/>", true),
            Err(XmpError::BadParam(_))
        ));
    }

    #[test]
    fn test_leading_bom_is_skipped() {
        let events = XmlTokenizer::tokenize("\u{FEFF}<a/>").unwrap();
        assert_eq!(events[0], start("a", &[], 3));
    }

    #[test]
    fn test_decode_packet_bytes() {
        assert_eq!(decode_packet_bytes(b"\xEF\xBB\xBF<a/>").unwrap(), "<a/>");
        assert_eq!(decode_packet_bytes(b"<a/>").unwrap(), "<a/>");

        let le: Vec<u8> = [0xFF, 0xFE]
            .into_iter()
            .chain("<é/>".encode_utf16().flat_map(|u| u.to_le_bytes()))
            .collect();
        assert_eq!(decode_packet_bytes(&le).unwrap(), "<é/>");

        let be: Vec<u8> = "<a/>".encode_utf16().flat_map(|u| u.to_be_bytes()).collect();
        assert_eq!(decode_packet_bytes(&be).unwrap(), "<a/>");

        assert!(decode_packet_bytes(b"<a>\xFF</a>").is_err());
    }
}
