//! Table-of-contents generation
//!
//! The TOC is rendered as part of the front matter, but the page numbers
//! it prints depend on where headings landed in the already-rendered
//! body. The layout uses a fixed line height so the TOC's own length is
//! known from the entry count alone, before rendering.

use crate::package::{TextDirection, html_escape};
use crate::plan::PaginationPlan;
use bookpress_pdf::OutlineEntry;

/// Indentation levels deeper than this are clamped; a contents page with
/// four levels of nesting stops being a contents page.
pub const TOC_DEPTH_MAX: u32 = 2;

/// Build the TOC as a standalone HTML document.
///
/// One fixed-height row per entry, indented by outline depth, with the
/// printed body page number right-aligned (left-aligned for RTL books,
/// where the whole row mirrors).
pub fn toc_html(
    entries: &[OutlineEntry],
    plan: &PaginationPlan,
    direction: TextDirection,
    header: &str,
) -> String {
    let dir = direction.html_attr();
    let number_edge = match direction {
        TextDirection::Ltr => "right",
        TextDirection::Rtl => "left",
    };

    let mut html = format!(
        "<!DOCTYPE html>\n<html dir=\"{dir}\">\n<head>\n<meta charset=\"utf-8\">\n<style>\n\
         body {{ margin: 0; }}\n\
         h1.contents {{ height: 2.6em; margin: 0; }}\n\
         ol.contents {{ list-style: none; margin: 0; padding: 0; }}\n\
         ol.contents li {{ height: 1.5em; overflow: hidden; line-height: 1.5em; }}\n\
         ol.contents .page {{ float: {number_edge}; }}\n\
         ol.contents .depth-1 {{ padding-inline-start: 1.5em; }}\n\
         ol.contents .depth-2 {{ padding-inline-start: 3em; }}\n\
         </style>\n</head>\n<body>\n<h1 class=\"contents\">{}</h1>\n<ol class=\"contents\">\n",
        html_escape(header)
    );

    for entry in entries {
        let depth = entry.depth.min(TOC_DEPTH_MAX);
        let number = plan.printed_page_number(entry.page_index);
        html.push_str(&format!(
            "<li class=\"depth-{depth}\"><span class=\"page\">{number}</span>{}</li>\n",
            html_escape(&entry.title)
        ));
    }

    html.push_str("</ol>\n</body>\n</html>\n");
    html
}
