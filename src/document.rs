// src/document.rs

/// One raw table as delivered by the document collaborator: ordered rows of
/// nullable cells. Row 0 is treated as the header row downstream.
pub type Table = Vec<Vec<Option<String>>>;

/// Text and raw tables for a single page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub text: String,
    pub tables: Vec<Table>,
}

impl PageContent {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tables: Vec::new(),
        }
    }
}

/// The raw document as produced once by the document collaborator.
/// Immutable for the duration of extraction.
#[derive(Debug, Clone, Default)]
pub struct DocumentText {
    pub pages: Vec<PageContent>,
}

impl DocumentText {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            pages: vec![PageContent::from_text(text)],
        }
    }

    /// All page texts joined with newlines, the form the field patterns and
    /// the model prompt run over.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        for page in &self.pages {
            if page.text.is_empty() {
                continue;
            }
            out.push_str(&page.text);
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_text_joins_pages() {
        let doc = DocumentText {
            pages: vec![
                PageContent::from_text("page one"),
                PageContent::default(),
                PageContent::from_text("page two"),
            ],
        };
        assert_eq!(doc.full_text(), "page one\npage two\n");
    }
}
