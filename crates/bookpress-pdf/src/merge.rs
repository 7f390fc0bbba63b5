//! Document concatenation and whole-document rotation

use crate::carry::DocumentPort;
use crate::types::{PdfError, Result};
use lopdf::{Dictionary, Document, Object};

/// Concatenate documents into one, pages in input order.
///
/// Every page is carried into the output with its geometry boxes,
/// rotation, and content intact; the output page count is exactly the sum
/// of the inputs. Each part gets its own port, so shared resources inside
/// a part cross once but ids never collide across parts.
pub fn concat(parts: &[Document]) -> Result<Document> {
    if parts.is_empty() {
        return Err(PdfError::NoPages);
    }

    let mut output = Document::with_version("1.7");
    let pages_id = output.new_object_id();
    let mut kids = Vec::new();

    for part in parts {
        let mut port = DocumentPort::new(part);
        for (page_id, reserved) in port.reserve_pages(&mut output) {
            port.fill_page(&mut output, page_id, reserved, pages_id)?;
            kids.push(Object::Reference(reserved));
        }
    }

    if kids.is_empty() {
        return Err(PdfError::NoPages);
    }

    let count = kids.len() as i64;
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
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

/// Rotate every page of the document by 180°.
///
/// Page order is unchanged; only each page's `/Rotate` flips. Applying
/// this twice restores the original orientation.
pub fn rotate_180(doc: &mut Document) -> Result<()> {
    let page_ids: Vec<_> = doc.get_pages().values().copied().collect();

    for page_id in page_ids {
        let current = doc
            .get_dictionary(page_id)?
            .get(b"Rotate")
            .ok()
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0);

        let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
        page.set("Rotate", Object::Integer((current + 180).rem_euclid(360)));
    }

    Ok(())
}
