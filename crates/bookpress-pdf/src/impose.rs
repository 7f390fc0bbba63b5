//! N-up imposition
//!
//! Places consecutive source pages onto larger output sheets in a
//! row-major grid. This is the newspaper path: many tall, narrow column
//! pages become a handful of broadsheet-sized sheets.

use crate::carry::DocumentPort;
use crate::constants::SHEET_MARGIN_PT;
use crate::types::{BoxSize, Grid, PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Impose `grid.pages_per_sheet()` consecutive pages per output sheet.
///
/// Output page count is `ceil(input / pages_per_sheet)`. The last sheet
/// keeps any leftover cells empty. Each source page is scaled to fit its
/// cell, preserving aspect ratio.
pub fn n_up(source: &Document, grid: Grid, sheet: BoxSize) -> Result<Document> {
    let per_sheet = grid.pages_per_sheet();
    if per_sheet == 0 {
        return Err(PdfError::Grid("zero pages per sheet".to_string()));
    }

    let page_ids: Vec<ObjectId> = source.get_pages().values().copied().collect();
    if page_ids.is_empty() {
        return Err(PdfError::NoPages);
    }

    let mut output = Document::with_version("1.7");
    let pages_id = output.new_object_id();
    let mut port = DocumentPort::new(source);
    let mut sheet_refs = Vec::new();

    for chunk in page_ids.chunks(per_sheet) {
        let sheet_id = imposed_sheet(&mut output, &mut port, chunk, grid, sheet, pages_id)?;
        sheet_refs.push(Object::Reference(sheet_id));
    }

    let count = sheet_refs.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(sheet_refs)),
        ("Count", Object::Integer(count)),
    ]);
    output
        .objects
        .insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = output.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    output.trailer.set("Root", catalog_id);

    Ok(output)
}

/// Build one output sheet carrying up to `grid.pages_per_sheet()` pages.
fn imposed_sheet(
    output: &mut Document,
    port: &mut DocumentPort<'_>,
    chunk: &[ObjectId],
    grid: Grid,
    sheet: BoxSize,
    parent_pages_id: ObjectId,
) -> Result<ObjectId> {
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(sheet.width_pt),
            Object::Real(sheet.height_pt),
        ]),
    );

    let content_width = sheet.width_pt - 2.0 * SHEET_MARGIN_PT;
    let content_height = sheet.height_pt - 2.0 * SHEET_MARGIN_PT;
    let cell_width = content_width / grid.cols as f32;
    let cell_height = content_height / grid.rows as f32;

    let mut content_ops = Vec::new();
    let mut xobjects = Dictionary::new();

    for (pos, source_page_id) in chunk.iter().enumerate() {
        let (src_width, src_height) = port.page_extent(*source_page_id)?;

        // Row-major placement, row 0 at the top of the sheet.
        let col = pos % grid.cols;
        let row = pos / grid.cols;
        let cell_x = SHEET_MARGIN_PT + col as f32 * cell_width;
        let cell_y = SHEET_MARGIN_PT + (grid.rows - row - 1) as f32 * cell_height;

        let scale = (cell_width / src_width).min(cell_height / src_height);
        let scaled_width = src_width * scale;
        let scaled_height = src_height * scale;

        let x_pos = cell_x + (cell_width - scaled_width) / 2.0;
        let y_pos = cell_y + (cell_height - scaled_height) / 2.0;

        let xobject_name = format!("P{pos}");
        let xobject_id = port.page_form(output, *source_page_id)?;
        xobjects.set(xobject_name.as_bytes(), Object::Reference(xobject_id));

        content_ops.push(format!(
            "q {scale} 0 0 {scale} {x_pos} {y_pos} cm /{xobject_name} Do Q\n"
        ));
    }

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let content = content_ops.join("");
    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    Ok(output.add_object(page_dict))
}

/// Sheets needed to impose `pages` source pages at `per_sheet` per sheet
pub fn sheet_count(pages: usize, per_sheet: usize) -> usize {
    pages.div_ceil(per_sheet.max(1))
}
