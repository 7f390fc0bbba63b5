mod common;

use bookpress_pdf::{concat, page_count, rotate_180, stamp_page_labels};
use common::{content_text, create_test_pdf};
use lopdf::Object;

fn rotation(doc: &lopdf::Document, page_index: usize) -> i64 {
    let page_ids: Vec<_> = doc.get_pages().values().copied().collect();
    let page = doc.get_dictionary(page_ids[page_index]).unwrap();
    page.get(b"Rotate")
        .ok()
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0)
}

#[test]
fn concat_page_count_is_exact_sum() {
    let front = create_test_pdf(3, 500.0, 700.0);
    let body = create_test_pdf(10, 500.0, 700.0);

    let merged = concat(&[front, body]).unwrap();
    assert_eq!(page_count(&merged), 13);
}

#[test]
fn concat_preserves_page_order_and_content() {
    let mut front = create_test_pdf(2, 500.0, 700.0);
    let mut body = create_test_pdf(2, 500.0, 700.0);
    stamp_page_labels(&mut front, &[Some("i".into()), Some("ii".into())]).unwrap();
    stamp_page_labels(&mut body, &[Some("1".into()), Some("2".into())]).unwrap();

    let merged = concat(&[front, body]).unwrap();

    assert!(content_text(&merged, 0, 1).contains("(i) Tj"));
    assert!(content_text(&merged, 1, 1).contains("(ii) Tj"));
    assert!(content_text(&merged, 2, 1).contains("(1) Tj"));
    assert!(content_text(&merged, 3, 1).contains("(2) Tj"));
}

#[test]
fn concat_of_nothing_is_an_error() {
    assert!(concat(&[]).is_err());
}

#[test]
fn rotate_flips_every_page() {
    let front = create_test_pdf(2, 500.0, 700.0);
    let body = create_test_pdf(3, 500.0, 700.0);
    let mut merged = concat(&[front, body]).unwrap();

    rotate_180(&mut merged).unwrap();
    for page in 0..5 {
        assert_eq!(rotation(&merged, page), 180);
    }
}

#[test]
fn rotating_back_restores_orientation() {
    let mut doc = create_test_pdf(4, 500.0, 700.0);
    rotate_180(&mut doc).unwrap();
    rotate_180(&mut doc).unwrap();

    for page in 0..4 {
        assert_eq!(rotation(&doc, page), 0);
    }
    assert_eq!(page_count(&doc), 4);
}

#[test]
fn rotate_composes_with_existing_rotation() {
    let mut doc = create_test_pdf(1, 500.0, 700.0);
    let page_ids: Vec<_> = doc.get_pages().values().copied().collect();
    doc.get_object_mut(page_ids[0])
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set("Rotate", Object::Integer(270));

    rotate_180(&mut doc).unwrap();
    assert_eq!(rotation(&doc, 0), 90);
}
