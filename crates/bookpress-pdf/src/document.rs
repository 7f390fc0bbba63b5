//! Moving documents on and off disk
//!
//! lopdf's load and save are blocking, and the documents this crate
//! handles are whole rendered books, so both hops off disk happen on the
//! blocking pool rather than the async runtime.

use crate::types::{PdfError, Result};
use lopdf::Document;
use std::path::Path;

/// Load a PDF from disk
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let doc = tokio::task::spawn_blocking(move || Document::load(&path)).await??;
    Ok(doc)
}

/// Write a finished document to its artifact path
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    tokio::task::spawn_blocking(move || {
        doc.save(&path)?;
        Ok::<_, PdfError>(())
    })
    .await??;
    Ok(())
}

/// Number of pages in a document
pub fn page_count(doc: &Document) -> usize {
    doc.get_pages().len()
}
