//! [`Document`] → XML Serialisierung.
//!
//! Schreibt den Baum unverändert zurück: Namespace-Deklarationen stehen dort,
//! wo sie im Baum hinterlegt sind, Whitespace-Knoten bleiben erhalten.
//! Elemente ohne Kinder werden als `<x/>` geschrieben.

use std::io::Write;

use crate::dom::{Document, Element, NodeId, NodeKind};
use crate::error::Error;
use crate::Result;

/// Serialisiert ein Dokument als XML-String.
pub fn to_xml_string(doc: &Document) -> Result<String> {
    let mut buf = Vec::new();
    write_document(doc, &mut buf)?;
    String::from_utf8(buf).map_err(|_| Error::IoError("XML output is not valid UTF-8".into()))
}

/// Serialisiert ein Dokument direkt in einen Writer (mit XML-Declaration).
pub fn write_document(doc: &Document, mut writer: impl Write) -> Result<()> {
    w(&mut writer, "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n")?;
    let children = doc.children(doc.document_node());
    for (i, &child) in children.iter().enumerate() {
        write_node(doc, child, &mut writer)?;
        // Prolog-Knoten (Kommentare, PIs) stehen jeweils auf einer eigenen Zeile
        if i + 1 < children.len() {
            w(&mut writer, "\n")?;
        }
    }
    w(&mut writer, "\n")?;
    writer.flush().map_err(io_err)
}

/// Serialisiert einen einzelnen Teilbaum (ohne XML-Declaration).
pub fn node_to_string(doc: &Document, node: NodeId) -> Result<String> {
    let mut buf = Vec::new();
    write_node(doc, node, &mut buf)?;
    String::from_utf8(buf).map_err(|_| Error::IoError("XML output is not valid UTF-8".into()))
}

fn write_node(doc: &Document, node: NodeId, writer: &mut impl Write) -> Result<()> {
    match doc.kind(node) {
        NodeKind::Document => {
            for &child in doc.children(node) {
                write_node(doc, child, writer)?;
            }
            Ok(())
        }
        NodeKind::Element(element) => write_element(doc, node, element, writer),
        NodeKind::Text(text) => write_escaped_text(writer, text),
        NodeKind::Comment(text) => {
            w(writer, "<!--")?;
            w(writer, text)?;
            w(writer, "-->")
        }
        NodeKind::ProcessingInstruction { target, value } => {
            w(writer, "<?")?;
            w(writer, target)?;
            if let Some(value) = value {
                w(writer, " ")?;
                w(writer, value)?;
            }
            w(writer, "?>")
        }
    }
}

fn write_element(
    doc: &Document,
    node: NodeId,
    element: &Element,
    writer: &mut impl Write,
) -> Result<()> {
    let qname = element.name.qualified();
    w(writer, "<")?;
    w(writer, &qname)?;

    for decl in &element.namespaces {
        match &decl.prefix {
            Some(prefix) => {
                w(writer, " xmlns:")?;
                w(writer, prefix)?;
            }
            None => w(writer, " xmlns")?,
        }
        w(writer, "=\"")?;
        write_escaped_attr(writer, &decl.uri)?;
        w(writer, "\"")?;
    }

    for attr in &element.attributes {
        w(writer, " ")?;
        w(writer, &attr.name.qualified())?;
        w(writer, "=\"")?;
        write_escaped_attr(writer, &attr.value)?;
        w(writer, "\"")?;
    }

    let children = doc.children(node);
    if children.is_empty() {
        return w(writer, "/>");
    }

    w(writer, ">")?;
    for &child in children {
        write_node(doc, child, writer)?;
    }
    w(writer, "</")?;
    w(writer, &qname)?;
    w(writer, ">")
}

fn io_err(e: std::io::Error) -> Error {
    Error::IoError(e.to_string())
}

fn w(writer: &mut impl Write, s: &str) -> Result<()> {
    writer.write_all(s.as_bytes()).map_err(io_err)
}

/// XML-Escaping mit memchr3-SIMD: Sucht drei Zeichen gleichzeitig und ersetzt sie.
/// Grosse Bloecke ohne Escape-Zeichen werden in einem Stueck geschrieben.
fn write_escaped_memchr3(
    w: &mut impl Write,
    s: &str,
    needle: [u8; 3],
    replacement: [&[u8]; 3],
) -> Result<()> {
    let bytes = s.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        match memchr::memchr3(needle[0], needle[1], needle[2], &bytes[start..]) {
            Some(offset) => {
                let pos = start + offset;
                if start < pos {
                    w.write_all(&bytes[start..pos]).map_err(io_err)?;
                }
                let idx = if bytes[pos] == needle[0] {
                    0
                } else if bytes[pos] == needle[1] {
                    1
                } else {
                    2
                };
                w.write_all(replacement[idx]).map_err(io_err)?;
                start = pos + 1;
            }
            None => {
                w.write_all(&bytes[start..]).map_err(io_err)?;
                break;
            }
        }
    }
    Ok(())
}

/// XML-Escaping fuer Text-Inhalt: & < > → &amp; &lt; &gt;
fn write_escaped_text(w: &mut impl Write, s: &str) -> Result<()> {
    write_escaped_memchr3(w, s, [b'&', b'<', b'>'], [b"&amp;", b"&lt;", b"&gt;"])
}

/// XML-Escaping fuer Attribut-Werte: & < " → &amp; &lt; &quot;
fn write_escaped_attr(w: &mut impl Write, s: &str) -> Result<()> {
    write_escaped_memchr3(w, s, [b'&', b'<', b'"'], [b"&amp;", b"&lt;", b"&quot;"])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(xml: &str) -> String {
        let doc = Document::parse(xml).expect("parse");
        let root = doc.root_element().expect("root");
        node_to_string(&doc, root).expect("serialize")
    }

    #[test]
    fn escape_text_ampersand() {
        assert_eq!(roundtrip("<a>x &amp; y</a>"), "<a>x &amp; y</a>");
    }

    #[test]
    fn escape_text_lt_gt() {
        assert_eq!(roundtrip("<a>1 &lt; 2 &gt; 0</a>"), "<a>1 &lt; 2 &gt; 0</a>");
    }

    #[test]
    fn escape_attr_quote() {
        assert_eq!(roundtrip(r#"<a b='say "hi"'/>"#), r#"<a b="say &quot;hi&quot;"/>"#);
    }

    #[test]
    fn cdata_is_written_as_escaped_text() {
        assert_eq!(roundtrip("<a><![CDATA[<b>]]></a>"), "<a>&lt;b&gt;</a>");
    }

    #[test]
    fn namespaces_and_prefixes_are_preserved() {
        let xml = r#"<w:definitions xmlns:w="http://schemas.xmlsoap.org/wsdl/" xmlns="urn:d"><w:types/><msg/></w:definitions>"#;
        assert_eq!(roundtrip(xml), xml);
    }

    #[test]
    fn comments_and_pis_are_written() {
        let xml = "<a><!-- c --><?target data?></a>";
        assert_eq!(roundtrip(xml), xml);
    }

    #[test]
    fn document_starts_with_declaration() {
        let doc = Document::parse("<!-- head --><a/>").unwrap();
        let out = to_xml_string(&doc).unwrap();
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"), "{out}");
        assert!(out.contains("<!-- head -->\n<a/>"), "{out}");
    }

    #[test]
    fn serialized_output_parses_again() {
        let xml = r#"<s:schema xmlns:s="http://www.w3.org/2001/XMLSchema" xmlns:t="urn:t"><s:element name="e" type="t:T"/></s:schema>"#;
        let first = roundtrip(xml);
        let second = roundtrip(&first);
        assert_eq!(first, second);
    }
}
