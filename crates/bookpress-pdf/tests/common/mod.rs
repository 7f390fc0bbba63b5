// Not every test binary uses every helper.
#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Build a synthetic document with `num_pages` empty pages of the given size.
pub fn create_test_pdf(num_pages: usize, width: f32, height: f32) -> Document {
    let mut doc = Document::with_version("1.7");

    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(width),
                    Object::Real(height),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));

    doc.trailer.set("Root", catalog_id);

    doc
}

/// Attach a bookmark outline to `doc`.
///
/// `headings` are (title, page_index, depth); depth may only increase by
/// one step at a time, mirroring how real renderers nest h1/h2.
pub fn add_outline(doc: &mut Document, headings: &[(&str, usize, u32)]) {
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();

    let outlines_id = doc.new_object_id();

    // Create one dict per heading up front so sibling/child links can refer
    // forward.
    let item_ids: Vec<ObjectId> = headings.iter().map(|_| doc.new_object_id()).collect();

    for (i, (title, page, depth)) in headings.iter().enumerate() {
        let mut item = Dictionary::new();
        item.set(
            "Title",
            Object::String(title.as_bytes().to_vec(), StringFormat::Literal),
        );
        item.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(page_ids[*page]),
                Object::Name(b"XYZ".to_vec()),
                Object::Null,
                Object::Null,
                Object::Null,
            ]),
        );

        // Next sibling: the next heading at the same depth, unless a
        // shallower heading intervenes.
        for (j, (_, _, d)) in headings.iter().enumerate().skip(i + 1) {
            if *d < *depth {
                break;
            }
            if *d == *depth {
                item.set("Next", Object::Reference(item_ids[j]));
                break;
            }
        }

        // First child: the immediately following heading one level deeper.
        if let Some((_, _, d)) = headings.get(i + 1) {
            if *d == depth + 1 {
                item.set("First", Object::Reference(item_ids[i + 1]));
            }
        }

        item.set("Parent", Object::Reference(outlines_id));
        doc.objects.insert(item_ids[i], Object::Dictionary(item));
    }

    let mut outlines = Dictionary::new();
    outlines.set("Type", Object::Name(b"Outlines".to_vec()));
    if let Some(first) = headings.iter().position(|(_, _, d)| *d == 0) {
        outlines.set("First", Object::Reference(item_ids[first]));
    }
    doc.objects.insert(outlines_id, Object::Dictionary(outlines));

    let catalog_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let catalog = doc
        .get_object_mut(catalog_id)
        .unwrap()
        .as_dict_mut()
        .unwrap();
    catalog.set("Outlines", Object::Reference(outlines_id));
}

/// Decompressed content of the `idx`-th stream in a page's contents array.
pub fn content_text(doc: &Document, page_index: usize, idx: usize) -> String {
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    let page = doc.get_dictionary(page_ids[page_index]).unwrap();

    let refs: Vec<ObjectId> = match page.get(b"Contents").unwrap() {
        Object::Reference(id) => vec![*id],
        Object::Array(arr) => arr.iter().map(|o| o.as_reference().unwrap()).collect(),
        _ => panic!("unexpected contents shape"),
    };

    let stream = doc.get_object(refs[idx]).unwrap().as_stream().unwrap();
    String::from_utf8_lossy(&stream.content).into_owned()
}

/// Number of content streams attached to a page.
pub fn content_stream_count(doc: &Document, page_index: usize) -> usize {
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    let page = doc.get_dictionary(page_ids[page_index]).unwrap();
    match page.get(b"Contents").unwrap() {
        Object::Reference(_) => 1,
        Object::Array(arr) => arr.len(),
        _ => 0,
    }
}
