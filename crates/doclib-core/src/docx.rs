//! `.docx` paragraph extraction (zip container + WordprocessingML body).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::traits::RichTextDecoder;

const BODY_PART: &str = "word/document.xml";

#[derive(Debug, Default, Clone, Copy)]
pub struct DocxDecoder;

impl RichTextDecoder for DocxDecoder {
    fn paragraphs(&self, path: &Path) -> crate::Result<Vec<String>> {
        let file = File::open(path).map_err(|e| crate::Error::io(path, e))?;
        let mut archive = zip::ZipArchive::new(file).map_err(|e| crate::Error::decode(path, e))?;
        let mut part = archive.by_name(BODY_PART).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => {
                crate::Error::NotFound(format!("{BODY_PART} in {}", path.display()))
            }
            other => crate::Error::decode(path, other),
        })?;
        let mut xml = String::new();
        part.read_to_string(&mut xml).map_err(|e| crate::Error::io(path, e))?;
        body_paragraphs(&xml).map_err(|e| crate::Error::parse(path, e))
    }
}

/// Text of every `w:p` in document order; runs are concatenated, `w:tab`
/// becomes a tab and `w:br`/`w:cr` a newline.
pub fn body_paragraphs(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => current = Some(String::new()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match (e.name().as_ref(), current.as_mut()) {
                (b"w:p", _) => paragraphs.push(String::new()),
                (b"w:tab", Some(text)) => text.push('\t'),
                (b"w:br" | b"w:cr", Some(text)) => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.extend(current.take()),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(paragraphs)
}
