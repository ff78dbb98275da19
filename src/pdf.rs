// src/pdf.rs

use crate::document::{DocumentText, PageContent};
use lopdf::Document;
use tracing::{info, warn};

/// Result of attempting to read text out of a PDF.
#[derive(Debug)]
pub enum PdfContent {
    /// The PDF contains extractable page text.
    Pages(Vec<String>),
    /// The PDF appears to be scanned / image-only — needs OCR, which this
    /// pipeline does not perform.
    ScannedImage,
    /// Something went wrong during extraction.
    Error(String),
}

/// Minimum number of non-whitespace characters we expect from a
/// "real" text PDF. Below this threshold we treat it as scanned.
const MIN_TEXT_CHARS: usize = 30;

/// Read a bill document from raw PDF bytes.
///
/// Scanned and unparsable input is a document-acquisition failure; the
/// pipeline boundary turns it into an error record.
pub fn read_document(pdf_bytes: &[u8]) -> Result<DocumentText, Box<dyn std::error::Error>> {
    match classify_pdf(pdf_bytes) {
        PdfContent::Pages(pages) => Ok(DocumentText {
            pages: pages.into_iter().map(PageContent::from_text).collect(),
        }),
        PdfContent::ScannedImage => {
            Err("PDF is scanned/image-only — cannot extract bill text".into())
        }
        PdfContent::Error(e) => Err(e.into()),
    }
}

/// Structural check plus text extraction.
pub fn classify_pdf(pdf_bytes: &[u8]) -> PdfContent {
    // --- Phase 1: structural check with lopdf ---
    let doc = match Document::load_mem(pdf_bytes) {
        Ok(d) => d,
        Err(e) => return PdfContent::Error(format!("Failed to parse PDF: {e}")),
    };

    if looks_like_scanned(&doc) {
        info!("PDF structural check: likely scanned / image-only");
        return PdfContent::ScannedImage;
    }

    // --- Phase 2: attempt per-page text extraction ---
    match pdf_extract::extract_text_from_mem_by_pages(pdf_bytes) {
        Ok(pages) => {
            let meaningful: usize = pages
                .iter()
                .flat_map(|p| p.chars())
                .filter(|c| !c.is_whitespace())
                .count();
            if meaningful < MIN_TEXT_CHARS {
                info!(
                    chars = meaningful,
                    "Extracted text too short — treating as scanned"
                );
                PdfContent::ScannedImage
            } else {
                info!(pages = pages.len(), chars = meaningful, "Text extracted successfully");
                PdfContent::Pages(pages)
            }
        }
        Err(e) => {
            warn!(error = %e, "pdf-extract failed — may be scanned or corrupted");
            PdfContent::ScannedImage
        }
    }
}

/// Heuristic: inspect the PDF object tree for signs that every page
/// is just a single image with no text operators.
///
/// We look at each page's `Resources` dictionary. If a page has
/// XObject images but **no** Font resources, it's almost certainly
/// a scanned page.
fn looks_like_scanned(doc: &Document) -> bool {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return false; // Can't tell — let text extraction try
    }

    let mut image_only_pages = 0;

    for (_page_num, object_id) in &pages {
        let Ok(page_obj) = doc.get_object(*object_id) else {
            continue;
        };
        let Ok(page_dict) = page_obj.as_dict() else {
            continue;
        };

        let has_fonts = resource_dict_nonempty(doc, page_dict, b"Font");
        let has_images = resource_dict_nonempty(doc, page_dict, b"XObject");

        if has_images && !has_fonts {
            image_only_pages += 1;
        }
    }

    let total = pages.len();
    let ratio = image_only_pages as f64 / total as f64;
    info!(
        total_pages = total,
        image_only = image_only_pages,
        ratio = format!("{ratio:.2}"),
        "Scanned-page analysis"
    );

    // If ≥80% of pages are image-only, treat the whole PDF as scanned
    ratio >= 0.8
}

/// Whether the page's Resources carry a non-empty dictionary under `key`.
fn resource_dict_nonempty(doc: &Document, page_dict: &lopdf::Dictionary, key: &[u8]) -> bool {
    page_dict
        .get(b"Resources")
        .ok()
        .and_then(|r| doc.dereference(r).ok())
        .and_then(|(_, resolved)| resolved.as_dict().ok())
        .and_then(|res| res.get(key).ok())
        .and_then(|entry| doc.dereference(entry).ok())
        .and_then(|(_, resolved)| resolved.as_dict().ok())
        .is_some_and(|dict| !dict.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_an_error() {
        let result = classify_pdf(b"this is not a pdf");
        assert!(matches!(result, PdfContent::Error(_)));
    }

    #[test]
    fn garbage_bytes_fail_document_acquisition() {
        assert!(read_document(b"this is not a pdf").is_err());
    }
}
