//! Page geometry: trimming and binding gutters
//!
//! Rendered pages come out oversized; `crop_to_trim` centres the final cut
//! size on each page. For bound output, `shift_for_binding` translates
//! page content toward the spine so the inner margin survives binding.

use crate::types::{BoxSize, PdfError, Result};
use lopdf::{Dictionary, Document, Object, Stream};

/// Centre a trim box of the given size on every page, writing it as both
/// `/CropBox` and `/TrimBox`.
///
/// Fails if any page is smaller than the trim box; that is a caller input
/// defect, not something to paper over by scaling.
pub fn crop_to_trim(doc: &mut Document, trim: BoxSize) -> Result<()> {
    let page_ids: Vec<_> = doc.get_pages().values().copied().collect();

    for (i, page_id) in page_ids.iter().enumerate() {
        let (x0, y0, x1, y1) = media_box(doc, *page_id)?;
        let (pw, ph) = (x1 - x0, y1 - y0);

        if trim.width_pt > pw + 0.01 || trim.height_pt > ph + 0.01 {
            return Err(PdfError::TrimTooLarge {
                page: i,
                trim_width: trim.width_pt,
                trim_height: trim.height_pt,
                page_width: pw,
                page_height: ph,
            });
        }

        let cx0 = x0 + (pw - trim.width_pt) / 2.0;
        let cy0 = y0 + (ph - trim.height_pt) / 2.0;
        let crop = Object::Array(vec![
            Object::Real(cx0),
            Object::Real(cy0),
            Object::Real(cx0 + trim.width_pt),
            Object::Real(cy0 + trim.height_pt),
        ]);

        let page = doc.get_object_mut(*page_id)?.as_dict_mut()?;
        page.set("CropBox", crop.clone());
        page.set("TrimBox", crop);
    }

    Ok(())
}

/// Shift page content horizontally to open a binding gutter.
///
/// Recto pages (even zero-based index in the FINAL merged document) move
/// by `+offset_pt`, verso pages by `-offset_pt`. `first_final_index` is
/// the final-document index of this document's first page, so parity
/// stays continuous when front matter and body are shifted separately and
/// merged afterwards. Pass a negative offset to bind on the other edge.
///
/// The existing content streams are bracketed with `q <matrix> cm` / `Q`
/// streams rather than rewritten, so anything stamped later lands in
/// unshifted coordinates.
pub fn shift_for_binding(doc: &mut Document, offset_pt: f32, first_final_index: usize) -> Result<()> {
    if offset_pt == 0.0 {
        return Ok(());
    }

    let recto_id = translate_stream(doc, offset_pt);
    let verso_id = translate_stream(doc, -offset_pt);
    let restore_id = doc.add_object(Stream::new(Dictionary::new(), b"Q".to_vec()));

    let page_ids: Vec<_> = doc.get_pages().values().copied().collect();

    for (i, page_id) in page_ids.iter().enumerate() {
        let recto = (first_final_index + i) % 2 == 0;
        let shift_id = if recto { recto_id } else { verso_id };

        let existing = doc.get_dictionary(*page_id)?.get(b"Contents").ok().cloned();

        let mut contents = vec![Object::Reference(shift_id)];
        match existing {
            Some(Object::Reference(id)) => contents.push(Object::Reference(id)),
            Some(Object::Array(arr)) => contents.extend(arr),
            _ => {}
        }
        contents.push(Object::Reference(restore_id));

        let page = doc.get_object_mut(*page_id)?.as_dict_mut()?;
        page.set("Contents", Object::Array(contents));
    }

    Ok(())
}

fn translate_stream(doc: &mut Document, dx: f32) -> lopdf::ObjectId {
    let ops = format!("q 1 0 0 1 {dx:.3} 0 cm\n");
    doc.add_object(Stream::new(Dictionary::new(), ops.into_bytes()))
}

/// Page media box as (x0, y0, x1, y1), defaulting to US Letter when absent.
pub(crate) fn media_box(doc: &Document, page_id: lopdf::ObjectId) -> Result<(f32, f32, f32, f32)> {
    let page = doc.get_dictionary(page_id)?;
    if let Ok(mb) = page.get(b"MediaBox").and_then(|obj| obj.as_array()) {
        if mb.len() >= 4 {
            return Ok((
                number(&mb[0]).unwrap_or(0.0),
                number(&mb[1]).unwrap_or(0.0),
                number(&mb[2]).unwrap_or(crate::constants::DEFAULT_PAGE_WIDTH_PT),
                number(&mb[3]).unwrap_or(crate::constants::DEFAULT_PAGE_HEIGHT_PT),
            ));
        }
    }
    Ok((
        0.0,
        0.0,
        crate::constants::DEFAULT_PAGE_WIDTH_PT,
        crate::constants::DEFAULT_PAGE_HEIGHT_PT,
    ))
}

/// Numeric value of a PDF object, if it has one
pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
