//! DOCX text extraction.
//!
//! A DOCX file is a ZIP archive; the document body lives in
//! `word/document.xml` as Open XML. Paragraph text is the concatenation of
//! every `<w:t>` run inside each `<w:p>`, in document order. We stream the
//! XML with quick-xml rather than building a DOM — the only thing this
//! service needs from a Word file is its flat text.

use super::{ExtractedDocument, PageText};
use crate::error::ExtractError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};
use tracing::{debug, warn};
use zip::ZipArchive;

/// Extract paragraph-ordered text from DOCX bytes.
///
/// Paragraphs are joined with `\n`; empty paragraphs contribute empty
/// lines. An unreadable archive (or one with no `word/document.xml`) yields
/// a single [`ExtractError::Container`] entry with empty text.
pub fn extract(bytes: &[u8]) -> ExtractedDocument {
    match parse_paragraphs(bytes) {
        Ok(paragraphs) => {
            debug!(paragraphs = paragraphs.len(), "extracted DOCX text");
            ExtractedDocument::from_text(paragraphs.join("\n"))
        }
        Err(detail) => {
            warn!("failed to read DOCX container: {detail}");
            ExtractedDocument {
                pages: vec![PageText::failed(1, ExtractError::Container { detail })],
            }
        }
    }
}

/// Pull the ordered paragraph texts out of the archive.
fn parse_paragraphs(bytes: &[u8]) -> Result<Vec<String>, String> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("not a DOCX archive: {e}"))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| format!("missing word/document.xml: {e}"))?
        .read_to_string(&mut xml)
        .map_err(|e| format!("unreadable word/document.xml: {e}"))?;

    // No trim_text here: run text like `<w:t>Hello </w:t>` carries
    // significant trailing spaces, and inter-element whitespace never
    // reaches us anyway (we only collect text inside <w:t>).
    let mut reader = Reader::from_str(&xml);

    let mut buf = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = false;
                    paragraphs.push(std::mem::take(&mut current));
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                // Self-closing <w:p/> is an empty paragraph.
                b"p" => paragraphs.push(String::new()),
                b"br" if in_paragraph => current.push('\n'),
                b"tab" if in_paragraph => current.push('\t'),
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_text && in_paragraph {
                    current.push_str(&e.unescape().unwrap_or_default());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {e}")),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}
