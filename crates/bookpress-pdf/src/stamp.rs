//! Page label stamping
//!
//! Draws a numeral at the bottom-centre of each page. Labels are appended
//! as fresh content streams, so page order and geometry are untouched, and
//! because they are appended after any gutter bracket they sit at a fixed
//! margin position regardless of content shift.

use crate::constants::{
    HELVETICA_CHAR_WIDTH_RATIO, PAGE_LABEL_BASELINE, PAGE_LABEL_FONT_NAME, PAGE_LABEL_FONT_SIZE,
};
use crate::geometry::number;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Stamp `labels[i]` onto page `i`. `None` entries are left unstamped.
///
/// `labels` shorter than the document leaves the tail unstamped; longer is
/// silently truncated.
pub fn stamp_page_labels(doc: &mut Document, labels: &[Option<String>]) -> Result<()> {
    let page_ids: Vec<_> = doc.get_pages().values().copied().collect();

    let font_id = add_label_font(doc);

    for (page_id, label) in page_ids.iter().zip(labels.iter()) {
        let Some(label) = label else { continue };

        let (x0, y0, x1) = box_origin(doc, *page_id)?;
        let width = x1 - x0;
        let text_width =
            label.chars().count() as f32 * PAGE_LABEL_FONT_SIZE * HELVETICA_CHAR_WIDTH_RATIO;
        let tx = x0 + (width - text_width) / 2.0;
        let ty = y0 + PAGE_LABEL_BASELINE;

        let ops = format!(
            "BT /{PAGE_LABEL_FONT_NAME} {PAGE_LABEL_FONT_SIZE} Tf {tx:.2} {ty:.2} Td ({}) Tj ET\n",
            escape_pdf_string(label)
        );
        let stamp_id = doc.add_object(Stream::new(Dictionary::new(), ops.into_bytes()));

        append_content(doc, *page_id, stamp_id)?;
        register_font(doc, *page_id, font_id)?;
    }

    Ok(())
}

fn add_label_font(doc: &mut Document) -> ObjectId {
    doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]))
}

fn append_content(doc: &mut Document, page_id: ObjectId, stamp_id: ObjectId) -> Result<()> {
    let existing = doc.get_dictionary(page_id)?.get(b"Contents").ok().cloned();

    let mut contents = match existing {
        Some(Object::Reference(id)) => vec![Object::Reference(id)],
        Some(Object::Array(arr)) => arr,
        _ => Vec::new(),
    };
    contents.push(Object::Reference(stamp_id));

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Contents", Object::Array(contents));
    Ok(())
}

/// Make the label font reachable from the page's resource dictionary.
///
/// Resources may live inline in the page dictionary or behind a reference
/// shared between pages; both shapes are handled, and re-registering the
/// same font name is idempotent.
fn register_font(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> Result<()> {
    let resources = doc.get_dictionary(page_id)?.get(b"Resources").ok().cloned();

    match resources {
        Some(Object::Reference(res_id)) => {
            // The font dictionary itself may be shared behind a reference.
            let font_ref = doc
                .get_dictionary(res_id)?
                .get(b"Font")
                .ok()
                .and_then(|f| f.as_reference().ok());
            if let Some(fonts_id) = font_ref {
                let fonts = doc.get_object_mut(fonts_id)?.as_dict_mut()?;
                fonts.set(PAGE_LABEL_FONT_NAME, Object::Reference(font_id));
            } else {
                let res = doc.get_object_mut(res_id)?.as_dict_mut()?;
                set_font_entry(res, font_id);
            }
        }
        Some(Object::Dictionary(mut res)) => {
            if let Some(fonts_id) = res.get(b"Font").ok().and_then(|f| f.as_reference().ok()) {
                let fonts = doc.get_object_mut(fonts_id)?.as_dict_mut()?;
                fonts.set(PAGE_LABEL_FONT_NAME, Object::Reference(font_id));
            } else {
                set_font_entry(&mut res, font_id);
                let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
                page.set("Resources", Object::Dictionary(res));
            }
        }
        _ => {
            let mut res = Dictionary::new();
            set_font_entry(&mut res, font_id);
            let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
            page.set("Resources", Object::Dictionary(res));
        }
    }

    Ok(())
}

fn set_font_entry(resources: &mut Dictionary, font_id: ObjectId) {
    let mut fonts = match resources.get(b"Font") {
        Ok(Object::Dictionary(d)) => d.clone(),
        _ => Dictionary::new(),
    };
    fonts.set(PAGE_LABEL_FONT_NAME, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));
}

fn box_origin(doc: &Document, page_id: ObjectId) -> Result<(f32, f32, f32)> {
    let page = doc.get_dictionary(page_id)?;
    // Prefer the crop box so labels track the trimmed page, not the raw sheet.
    for key in [b"CropBox".as_slice(), b"MediaBox".as_slice()] {
        if let Ok(bx) = page.get(key).and_then(|obj| obj.as_array()) {
            if bx.len() >= 4 {
                let x0 = number(&bx[0]).unwrap_or(0.0);
                let y0 = number(&bx[1]).unwrap_or(0.0);
                let x1 = number(&bx[2]).unwrap_or(crate::constants::DEFAULT_PAGE_WIDTH_PT);
                return Ok((x0, y0, x1));
            }
        }
    }
    Ok((0.0, 0.0, crate::constants::DEFAULT_PAGE_WIDTH_PT))
}

fn escape_pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
