//! PDF text and hyperlink extraction.
//!
//! Pages are visited in page-number order. Each page contributes one line of
//! text (its text runs joined by single spaces) and every URI-action
//! annotation it carries, in annotation order.

use lopdf::{Dictionary, Document, ObjectId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a readable PDF: {0}")]
    Load(#[source] lopdf::Error),

    #[error("page {page} could not be decoded: {source}")]
    Page {
        page: u32,
        #[source]
        source: lopdf::Error,
    },
}

/// Text and links pulled out of one resume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedContent {
    pub text: String,
    /// Annotation targets; duplicates are kept.
    pub links: Vec<String>,
    pub pages: usize,
}

pub fn extract(bytes: &[u8]) -> Result<ExtractedContent, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(ExtractError::Load)?;
    let mut content = ExtractedContent::default();

    // get_pages is keyed by page number, so iteration is in document order
    for (page_number, page_id) in doc.get_pages() {
        let raw = doc
            .extract_text(&[page_number])
            .map_err(|source| ExtractError::Page {
                page: page_number,
                source,
            })?;
        let runs: Vec<&str> = raw.split_whitespace().collect();
        content.text.push_str(&runs.join(" "));
        content.text.push('\n');

        let links = page_links(&doc, page_id).map_err(|source| ExtractError::Page {
            page: page_number,
            source,
        })?;
        content.links.extend(links);
        content.pages += 1;
    }

    Ok(content)
}

fn page_links(doc: &Document, page_id: ObjectId) -> lopdf::Result<Vec<String>> {
    let page = doc.get_dictionary(page_id)?;
    let Ok(annots) = page.get(b"Annots") else {
        return Ok(Vec::new());
    };
    let (_, annots) = doc.dereference(annots)?;

    let mut links = Vec::new();
    for annot in annots.as_array()? {
        let Ok((_, annot)) = doc.dereference(annot) else {
            continue;
        };
        let Ok(annot) = annot.as_dict() else {
            continue;
        };
        if let Some(url) = uri_target(doc, annot) {
            links.push(url);
        }
    }
    Ok(links)
}

/// URL of an annotation whose action is `/S /URI`, if any.
fn uri_target(doc: &Document, annot: &Dictionary) -> Option<String> {
    let (_, action) = doc.dereference(annot.get(b"A").ok()?).ok()?;
    let action = action.as_dict().ok()?;
    if action.get(b"S").ok()?.as_name().ok()? != b"URI" {
        return None;
    }
    let (_, uri) = doc.dereference(action.get(b"URI").ok()?).ok()?;
    let uri = String::from_utf8_lossy(uri.as_str().ok()?).trim().to_string();
    (!uri.is_empty()).then_some(uri)
}
