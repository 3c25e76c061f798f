//! Marker sidecar document codec
//!
//! The sidecar sits next to the audio file (`<audio path>.easymarkers`) and
//! is a small XML document:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//!
//! <Markers>
//!   <Marker Time="12.5" Title="Intro" Desc="*No Comment*"/>
//! </Markers>
//! ```
//!
//! Children appear in marker insertion order. On read, only `Marker`
//! elements directly under the `Markers` root are considered; anything else
//! is skipped.

use std::borrow::Cow;

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::Marker;
use crate::error::ParseError;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\n";
const ROOT_TAG: &[u8] = b"Markers";
const MARKER_TAG: &[u8] = b"Marker";

const ATTR_TIME: &str = "Time";
const ATTR_TITLE: &str = "Title";
const ATTR_DESC: &str = "Desc";

/// Render markers as a sidecar document
pub fn encode<'a, I>(markers: I) -> String
where
    I: IntoIterator<Item = &'a Marker>,
{
    let mut out = String::from(XML_DECLARATION);
    let mut body = String::new();

    for marker in markers {
        body.push_str("  <Marker ");
        push_attribute(&mut body, ATTR_TIME, &format_time(marker.time));
        body.push(' ');
        push_attribute(&mut body, ATTR_TITLE, &marker.title);
        body.push(' ');
        push_attribute(&mut body, ATTR_DESC, &marker.description);
        body.push_str("/>\n");
    }

    if body.is_empty() {
        out.push_str("<Markers/>\n");
    } else {
        out.push_str("<Markers>\n");
        out.push_str(&body);
        out.push_str("</Markers>\n");
    }
    out
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_attribute(value));
    out.push('"');
}

/// XML-escape an attribute value, including whitespace control characters
/// that attribute normalisation would otherwise flatten to spaces
fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }
    Cow::Owned(
        escaped
            .replace('\n', "&#10;")
            .replace('\r', "&#13;")
            .replace('\t', "&#9;"),
    )
}

/// Shortest round-trip decimal text, keeping a `.0` on integral values
fn format_time(time: f64) -> String {
    if time.fract() == 0.0 && time.abs() < 1e15 {
        format!("{:.1}", time)
    } else {
        format!("{}", time)
    }
}

/// Parse a sidecar document into markers, in document order
pub fn decode(source: &[u8]) -> Result<Vec<Marker>, ParseError> {
    let text =
        std::str::from_utf8(source).map_err(|e| ParseError::InvalidUtf8(e.to_string()))?;

    let mut reader = Reader::from_str(text);
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut markers = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| ParseError::Xml {
            position: reader.buffer_position() as u64,
            message: e.to_string(),
        })?;

        match event {
            Event::Start(element) => {
                let position = reader.buffer_position() as u64;
                open_element(&element, depth, position, &mut saw_root, &mut markers)?;
                depth += 1;
            }
            Event::Empty(element) => {
                let position = reader.buffer_position() as u64;
                open_element(&element, depth, position, &mut saw_root, &mut markers)?;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(ParseError::MissingRoot);
    }
    if depth > 0 {
        return Err(ParseError::Xml {
            position: reader.buffer_position() as u64,
            message: String::from("unexpected end of document"),
        });
    }

    Ok(markers)
}

fn open_element(
    element: &BytesStart<'_>,
    depth: usize,
    position: u64,
    saw_root: &mut bool,
    markers: &mut Vec<Marker>,
) -> Result<(), ParseError> {
    let name = element.name();

    if depth == 0 {
        if *saw_root || name.as_ref() != ROOT_TAG {
            return Err(ParseError::UnexpectedRoot(
                String::from_utf8_lossy(name.as_ref()).into_owned(),
            ));
        }
        *saw_root = true;
        return Ok(());
    }

    if depth == 1 && name.as_ref() == MARKER_TAG {
        let marker = parse_marker(element, markers.len(), position)?;
        markers.push(marker);
    }
    Ok(())
}

/// `position` is the reader offset just past the element, used for error reports
fn parse_marker(
    element: &BytesStart<'_>,
    index: usize,
    position: u64,
) -> Result<Marker, ParseError> {
    let mut time = None;
    let mut title = String::new();
    let mut description = String::new();

    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| ParseError::Xml {
            position,
            message: e.to_string(),
        })?;
        let value = attribute.unescape_value().map_err(|e| ParseError::Xml {
            position,
            message: e.to_string(),
        })?;

        match attribute.key.as_ref() {
            b"Time" => time = Some(value.into_owned()),
            b"Title" => title = value.into_owned(),
            b"Desc" => description = value.into_owned(),
            _ => {}
        }
    }

    let raw_time = time.ok_or(ParseError::MissingAttribute {
        index,
        attribute: ATTR_TIME,
    })?;
    let time = raw_time
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite() && *t >= 0.0)
        .ok_or_else(|| ParseError::InvalidTime {
            index,
            value: raw_time.clone(),
        })?;

    Ok(Marker {
        time,
        title,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(time: f64, title: &str, description: &str) -> Marker {
        Marker {
            time,
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_encode_layout() {
        let markers = vec![
            marker(12.5, "Intro", "*No Comment*"),
            marker(90.0, "Drop", ""),
        ];
        let expected = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\n\
                        <Markers>\n\
                        \x20\x20<Marker Time=\"12.5\" Title=\"Intro\" Desc=\"*No Comment*\"/>\n\
                        \x20\x20<Marker Time=\"90.0\" Title=\"Drop\" Desc=\"\"/>\n\
                        </Markers>\n";
        assert_eq!(encode(&markers), expected);
    }

    #[test]
    fn test_encode_empty() {
        let markers: Vec<Marker> = Vec::new();
        assert_eq!(
            encode(&markers),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\n<Markers/>\n"
        );
    }

    #[test]
    fn test_escaping_round_trip() {
        let markers = vec![marker(1.25, "Tom & \"Jerry\" <live>", "line one\nline two\t'x'")];
        let text = encode(&markers);
        assert!(text.contains("Tom &amp; &quot;Jerry&quot; &lt;live&gt;"));
        assert!(text.contains("&#10;"));

        let decoded = decode(text.as_bytes()).unwrap();
        assert_eq!(decoded, markers);
    }

    #[test]
    fn test_decode_preserves_order() {
        let text = r#"<Markers>
            <Marker Time="90" Title="B" Desc="second"/>
            <Marker Time="10.5" Title="A" Desc="first"/>
        </Markers>"#;
        let decoded = decode(text.as_bytes()).unwrap();
        assert_eq!(
            decoded,
            vec![marker(90.0, "B", "second"), marker(10.5, "A", "first")]
        );
    }

    #[test]
    fn test_decode_skips_unknown_elements_and_attributes() {
        let text = r#"<?xml version="1.0"?>
            <Markers>
              <Region Start="1" End="2"/>
              <Marker Time="3" Title="keep" Desc="" Colour="ff0"/>
              <Group><Marker Time="4" Title="nested" Desc=""/></Group>
            </Markers>"#;
        let decoded = decode(text.as_bytes()).unwrap();
        assert_eq!(decoded, vec![marker(3.0, "keep", "")]);
    }

    #[test]
    fn test_decode_missing_title_and_desc_default_empty() {
        let decoded = decode(br#"<Markers><Marker Time="7"/></Markers>"#).unwrap();
        assert_eq!(decoded, vec![marker(7.0, "", "")]);
    }

    #[test]
    fn test_decode_empty_root() {
        assert!(decode(b"<Markers/>").unwrap().is_empty());
    }

    #[test]
    fn test_decode_rejects_missing_time() {
        let err = decode(br#"<Markers><Marker Title="x" Desc=""/></Markers>"#).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingAttribute {
                index: 0,
                attribute: "Time"
            }
        );
    }

    #[test]
    fn test_decode_rejects_bad_time() {
        for bad in ["abc", "-1", "inf", "NaN"] {
            let text = format!(r#"<Markers><Marker Time="{}"/></Markers>"#, bad);
            assert!(
                matches!(decode(text.as_bytes()), Err(ParseError::InvalidTime { .. })),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn test_decode_rejects_wrong_root() {
        assert_eq!(
            decode(b"<Cues/>").unwrap_err(),
            ParseError::UnexpectedRoot("Cues".to_string())
        );
    }

    #[test]
    fn test_decode_rejects_empty_and_malformed() {
        assert_eq!(decode(b"").unwrap_err(), ParseError::MissingRoot);
        assert!(decode(b"<Markers><Marker Time=\"1\"></Markers>").is_err());
        assert!(decode(b"<Markers>").is_err());
        assert!(matches!(
            decode(&[0x3c, 0xff, 0xfe]),
            Err(ParseError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_bad_attribute_reports_element_position() {
        let text = r#"<Markers><Marker Time="1" Title="a &bogus; b"/></Markers>"#;
        let marker_start = text.find("<Marker ").unwrap() as u64;
        let marker_end = text.find("/>").unwrap() as u64 + 2;

        match decode(text.as_bytes()) {
            Err(ParseError::Xml { position, .. }) => {
                assert!(position > marker_start, "{}", position);
                assert!(position <= marker_end, "{}", position);
            }
            other => panic!("expected Xml error, got {:?}", other),
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0.0");
        assert_eq!(format_time(10.0), "10.0");
        assert_eq!(format_time(12.5), "12.5");
        assert_eq!(format_time(0.1 + 0.2), "0.30000000000000004");
    }
}
