//! Plain-text extraction from document inputs.
//!
//! Output is a list of paragraphs, which is exactly what the layout engine
//! takes: the extractors decide where paragraph boundaries are, the layout
//! engine never re-splits. TXT splits on newlines, DOCX yields one
//! paragraph per `w:p` element, PDF splits lopdf's extracted text on
//! newlines.

use crate::error::MorphError;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Extract paragraphs from a document at `path`, dispatched on `extension`
/// (already lowercased by input resolution).
pub fn extract_paragraphs(path: &Path, extension: &str) -> Result<Vec<String>, MorphError> {
    let paragraphs = match extension {
        "txt" => extract_txt(path)?,
        "docx" => extract_docx(path)?,
        "pdf" => extract_pdf(path)?,
        other => {
            return Err(MorphError::Internal(format!(
                "no text extractor for extension {other:?}"
            )))
        }
    };
    debug!(
        "Extracted {} paragraph(s) from {}",
        paragraphs.len(),
        path.display()
    );
    Ok(paragraphs)
}

/// Read a text file, replacing invalid UTF-8 rather than failing on it.
fn extract_txt(path: &Path) -> Result<Vec<String>, MorphError> {
    let bytes = std::fs::read(path).map_err(|e| MorphError::ExtractionFailed {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(split_lines(&text))
}

/// One paragraph per line; trailing `\r` stripped so CRLF files behave.
fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(|l| l.trim_end_matches('\r').to_string()).collect()
}

/// Pull paragraphs out of `word/document.xml` inside the DOCX zip.
///
/// Streams the XML rather than building a tree: text runs (`w:t`) within a
/// paragraph (`w:p`) are concatenated, everything else (formatting, tables,
/// drawings) is ignored.
fn extract_docx(path: &Path) -> Result<Vec<String>, MorphError> {
    let fail = |detail: String| MorphError::ExtractionFailed {
        path: path.to_path_buf(),
        detail,
    };

    let file = std::fs::File::open(path).map_err(|e| fail(e.to_string()))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| fail(e.to_string()))?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|_| fail("missing word/document.xml".to_string()))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| fail(e.to_string()))?;

    parse_docx_xml(&xml).map_err(fail)
}

fn parse_docx_xml(xml: &str) -> Result<Vec<String>, String> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        match reader.read_event().map_err(|e| e.to_string())? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    in_paragraph = true;
                    current.clear();
                }
                b"t" => in_text = in_paragraph,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    if in_paragraph {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    in_paragraph = false;
                }
                b"t" => in_text = false,
                _ => {}
            },
            // Self-closing <w:p/> is an empty paragraph, a deliberate break.
            Event::Empty(e) => {
                if e.local_name().as_ref() == b"p" {
                    paragraphs.push(String::new());
                }
            }
            Event::Text(t) => {
                if in_text {
                    current.push_str(&t.unescape().map_err(|e| e.to_string())?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

/// Text extraction via lopdf, all pages in document order.
fn extract_pdf(path: &Path) -> Result<Vec<String>, MorphError> {
    let fail = |detail: String| MorphError::ExtractionFailed {
        path: path.to_path_buf(),
        detail,
    };

    let doc = lopdf::Document::load(path).map_err(|e| fail(e.to_string()))?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let text = doc
        .extract_text(&page_numbers)
        .map_err(|e| fail(e.to_string()))?;

    Ok(split_lines(&text))
}
