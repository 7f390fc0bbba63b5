//! Front-matter assembly
//!
//! Title page, copyright page, and table of contents, rendered in that
//! fixed order as one document. The rendered page count is checked
//! against the pagination plan — never the other way around.

use crate::error::{PipelineError, Result};
use crate::package::{BookMeta, html_escape};
use crate::plan::PaginationPlan;
use crate::render::{HtmlRenderer, RenderRequest};
use bookpress_pdf::{BoxSize, page_count};
use lopdf::Document;
use std::path::Path;

/// Title page markup from book metadata
pub fn title_html(meta: &BookMeta) -> String {
    let byline = if meta.author.is_empty() {
        String::new()
    } else {
        format!("<p class=\"author\">{}</p>\n", html_escape(&meta.author))
    };
    format!(
        "<div class=\"title-page\">\n<h1 class=\"book-title\">{}</h1>\n{byline}</div>\n\
         <div style=\"page-break-after: always\"></div>\n",
        html_escape(&meta.title)
    )
}

/// Copyright/colophon page markup
pub fn copyright_html(meta: &BookMeta) -> String {
    let license = match &meta.license {
        Some(license) => format!("<p class=\"license\">{}</p>\n", html_escape(license)),
        None => String::new(),
    };
    format!(
        "<div class=\"copyright-page\">\n<p>{}</p>\n{license}</div>\n\
         <div style=\"page-break-after: always\"></div>\n",
        html_escape(&meta.title)
    )
}

/// Render title + copyright + TOC as one front-matter document and check
/// its page count against the plan.
///
/// A mismatch means the TOC printed numbers computed against a length the
/// document does not have; correcting silently would re-open the
/// length/number cycle, so it is surfaced as a defect instead.
pub async fn assemble<R: HtmlRenderer>(
    renderer: &R,
    meta: &BookMeta,
    toc: &str,
    plan: &PaginationPlan,
    page: BoxSize,
    scratch: &Path,
) -> Result<Document> {
    // Splice the title and copyright sections ahead of the TOC's body so
    // all three share one document, one stylesheet, and one direction.
    let (head, tail) = toc.split_once("<body>").ok_or_else(|| PipelineError::Render {
        message: "contents markup has no body".to_string(),
    })?;

    let html = format!(
        "{head}<body>\n{}{}{tail}",
        title_html(meta),
        copyright_html(meta)
    );

    let doc = renderer
        .render(
            RenderRequest {
                html: &html,
                page,
                label: "front-matter",
            },
            scratch,
        )
        .await?;

    let rendered = page_count(&doc);
    if rendered != plan.front_pages {
        return Err(PipelineError::NumberingMismatch {
            expected: plan.front_pages,
            rendered,
        });
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::TextDirection;

    fn meta() -> BookMeta {
        BookMeta {
            title: "Example & Sons".into(),
            author: "A. Writer".into(),
            language: "en".into(),
            direction: Some(TextDirection::Ltr),
            license: Some("CC-BY-SA".into()),
        }
    }

    #[test]
    fn title_page_breaks_after_itself() {
        let html = title_html(&meta());
        assert!(html.contains("Example &amp; Sons"));
        assert!(html.contains("A. Writer"));
        assert!(html.contains("page-break-after"));
    }

    #[test]
    fn anonymous_books_skip_the_byline() {
        let mut m = meta();
        m.author.clear();
        assert!(!title_html(&m).contains("class=\"author\""));
    }

    #[test]
    fn copyright_carries_the_license() {
        let html = copyright_html(&meta());
        assert!(html.contains("CC-BY-SA"));
    }
}
