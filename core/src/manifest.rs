//! # Document Splitter
//!
//! Splits a multi-document manifest on `---` boundary lines while keeping
//! every byte, so that joining the pieces back reproduces the input exactly.

use std::borrow::Cow;
use std::fmt;

/// The document boundary marker.
pub const DOCUMENT_MARKER: &str = "---";

/// A manifest split into documents and the boundary lines between them.
///
/// There is always exactly one more document than there are boundaries.
/// Leading, trailing and consecutive boundaries yield empty documents, which
/// are kept in place rather than dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest<'a> {
    documents: Vec<Cow<'a, str>>,
    boundaries: Vec<&'a str>,
}

impl<'a> Manifest<'a> {
    /// Splits `content` into documents.
    pub fn split(content: &'a str) -> Self {
        let mut documents = Vec::new();
        let mut boundaries = Vec::new();
        let mut doc_start = 0;
        let mut offset = 0;

        for line in content.split_inclusive('\n') {
            let line_end = offset + line.len();
            if is_boundary(line) {
                documents.push(Cow::Borrowed(&content[doc_start..offset]));
                boundaries.push(&content[offset..line_end]);
                doc_start = line_end;
            }
            offset = line_end;
        }
        documents.push(Cow::Borrowed(&content[doc_start..]));

        Self {
            documents,
            boundaries,
        }
    }

    /// Number of documents, blank ones included.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always false: even empty input holds one (empty) document.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document text at `index`.
    pub fn document(&self, index: usize) -> Option<&str> {
        self.documents.get(index).map(|doc| doc.as_ref())
    }

    /// Iterates documents in file order.
    pub fn documents(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|doc| doc.as_ref())
    }

    /// Replaces the text of document `index`. Out of range indices are ignored.
    pub fn replace(&mut self, index: usize, text: String) {
        if let Some(slot) = self.documents.get_mut(index) {
            *slot = Cow::Owned(text);
        }
    }

    /// True if document `index` has been replaced.
    pub fn is_replaced(&self, index: usize) -> bool {
        matches!(self.documents.get(index), Some(Cow::Owned(_)))
    }
}

impl fmt::Display for Manifest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, doc) in self.documents.iter().enumerate() {
            f.write_str(doc)?;
            if let Some(boundary) = self.boundaries.get(idx) {
                f.write_str(boundary)?;
            }
        }
        Ok(())
    }
}

/// True when the document holds nothing but whitespace.
pub fn is_blank(document: &str) -> bool {
    document.trim().is_empty()
}

/// A boundary starts at column 0 and carries nothing after the marker but whitespace.
fn is_boundary(line: &str) -> bool {
    line.strip_prefix(DOCUMENT_MARKER)
        .is_some_and(|rest| rest.trim().is_empty())
}
