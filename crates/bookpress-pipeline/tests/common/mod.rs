use bookpress_pipeline::{BookMeta, BookPackage, Chapter, HtmlRenderer, RenderRequest, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Synthetic document with `num_pages` empty pages of the given size.
pub fn make_pdf(num_pages: usize, width: f32, height: f32) -> Document {
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

/// Attach a flat bookmark outline: (title, page_index) per heading.
pub fn add_outline(doc: &mut Document, headings: &[(&str, usize)]) {
    if headings.is_empty() {
        return;
    }
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();

    let outlines_id = doc.new_object_id();
    let item_ids: Vec<ObjectId> = headings.iter().map(|_| doc.new_object_id()).collect();

    for (i, (title, page)) in headings.iter().enumerate() {
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
        if let Some(next) = item_ids.get(i + 1) {
            item.set("Next", Object::Reference(*next));
        }
        item.set("Parent", Object::Reference(outlines_id));
        doc.objects.insert(item_ids[i], Object::Dictionary(item));
    }

    let mut outlines = Dictionary::new();
    outlines.set("Type", Object::Name(b"Outlines".to_vec()));
    outlines.set("First", Object::Reference(item_ids[0]));
    doc.objects.insert(outlines_id, Object::Dictionary(outlines));

    let catalog_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    doc.get_object_mut(catalog_id)
        .unwrap()
        .as_dict_mut()
        .unwrap()
        .set("Outlines", Object::Reference(outlines_id));
}

/// Renderer double: hands back synthetic documents with configured page
/// counts and records every request for inspection.
pub type RequestLog = Arc<Mutex<Vec<(String, String)>>>;

#[derive(Debug)]
pub struct FakeRenderer {
    pub body_pages: usize,
    pub headings: Vec<(&'static str, usize)>,
    pub front_pages: usize,
    pub requests: RequestLog,
}

impl FakeRenderer {
    pub fn new(body_pages: usize, headings: Vec<(&'static str, usize)>, front_pages: usize) -> Self {
        Self {
            body_pages,
            headings,
            front_pages,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared handle to the request log, usable after the renderer has
    /// been moved into a pipeline.
    pub fn request_log(&self) -> RequestLog {
        Arc::clone(&self.requests)
    }
}

/// HTML of the first recorded request with the given label.
pub fn logged_html(log: &RequestLog, label: &str) -> Option<String> {
    log.lock()
        .unwrap()
        .iter()
        .find(|(l, _)| l == label)
        .map(|(_, html)| html.clone())
}

impl HtmlRenderer for FakeRenderer {
    async fn render(&self, request: RenderRequest<'_>, _scratch: &Path) -> Result<Document> {
        self.requests
            .lock()
            .unwrap()
            .push((request.label.to_string(), request.html.to_string()));

        if request.label == "body" {
            let mut doc = make_pdf(self.body_pages, request.page.width_pt, request.page.height_pt);
            add_outline(&mut doc, &self.headings);
            Ok(doc)
        } else {
            Ok(make_pdf(
                self.front_pages,
                request.page.width_pt,
                request.page.height_pt,
            ))
        }
    }
}

/// Minimal single-chapter package for pipeline tests.
pub fn make_package(language: &str) -> BookPackage {
    BookPackage {
        meta: BookMeta {
            title: "Test Book".into(),
            author: "A. Writer".into(),
            language: language.into(),
            direction: None,
            license: Some("CC-BY-SA".into()),
        },
        chapters: vec![Chapter {
            id: "ch1".into(),
            title: "Chapter One".into(),
            html: "<h1>Chapter One</h1><p>Text.</p>".into(),
        }],
        images: Vec::new(),
        root: None,
    }
}

/// The stamped label of each page, in page order, read back from content
/// streams (`(label) Tj`). Pages without a stamp yield `None`.
pub fn stamped_labels(doc: &Document) -> Vec<Option<String>> {
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    page_ids
        .iter()
        .map(|page_id| {
            let page = doc.get_dictionary(*page_id).unwrap();
            let refs: Vec<ObjectId> = match page.get(b"Contents") {
                Ok(Object::Reference(id)) => vec![*id],
                Ok(Object::Array(arr)) => {
                    arr.iter().filter_map(|o| o.as_reference().ok()).collect()
                }
                _ => Vec::new(),
            };
            let mut text = String::new();
            for id in refs {
                if let Ok(stream) = doc.get_object(id).and_then(|o| o.as_stream()) {
                    let content = stream
                        .decompressed_content()
                        .unwrap_or_else(|_| stream.content.clone());
                    text.push_str(&String::from_utf8_lossy(&content));
                }
            }
            let end = text.find(") Tj")?;
            let start = text[..end].rfind('(')?;
            Some(text[start + 1..end].to_string())
        })
        .collect()
}

/// Each page's effective `/Rotate` value.
pub fn rotations(doc: &Document) -> Vec<i64> {
    doc.get_pages()
        .values()
        .map(|page_id| {
            doc.get_dictionary(*page_id)
                .unwrap()
                .get(b"Rotate")
                .ok()
                .and_then(|o| o.as_i64().ok())
                .unwrap_or(0)
        })
        .collect()
}
