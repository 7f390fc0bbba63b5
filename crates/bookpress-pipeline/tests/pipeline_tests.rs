mod common;

use bookpress_pipeline::{
    JobOptions, OutputMode, Pipeline, PipelineError, Stage, TrimSize, toc_page_count,
};
use common::{FakeRenderer, logged_html, make_package, rotations, stamped_labels};
use lopdf::Document;
use tempfile::TempDir;

fn book_options() -> JobOptions {
    JobOptions {
        mode: OutputMode::Book,
        trim: TrimSize::ComicBook,
        ..Default::default()
    }
}

/// 3 headings fit one contents page, so front matter is title +
/// copyright + contents = 3 pages.
fn example_renderer() -> FakeRenderer {
    FakeRenderer::new(
        10,
        vec![("Intro", 0), ("Middle", 3), ("End", 7)],
        2 + toc_page_count(3),
    )
}

#[tokio::test]
async fn worked_example_counts_and_labels() {
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("book.pdf");

    let pipeline = Pipeline::new(example_renderer(), book_options()).unwrap();
    let artifact = pipeline.run(&make_package("en"), &out).await.unwrap();

    // 3 front pages + 10 body pages
    assert_eq!(artifact.pages, 13);

    let doc = Document::load(&out).unwrap();
    let labels = stamped_labels(&doc);
    let expect: Vec<Option<String>> = ["i", "ii", "iii", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]
        .iter()
        .map(|s| Some(s.to_string()))
        .collect();
    assert_eq!(labels, expect);
}

#[tokio::test]
async fn toc_lists_headings_at_their_body_labels() {
    let out_dir = TempDir::new().unwrap();
    let renderer = example_renderer();
    let log = renderer.request_log();
    let pipeline = Pipeline::new(renderer, book_options()).unwrap();
    pipeline
        .run(&make_package("en"), &out_dir.path().join("book.pdf"))
        .await
        .unwrap();

    let front_html = logged_html(&log, "front-matter").unwrap();
    assert!(front_html.contains("<span class=\"page\">1</span>Intro"));
    assert!(front_html.contains("<span class=\"page\">4</span>Middle"));
    assert!(front_html.contains("<span class=\"page\">8</span>End"));
    // Fixed order: title, then copyright, then contents.
    let title = front_html.find("book-title").unwrap();
    let copyright = front_html.find("copyright-page").unwrap();
    let contents = front_html.find("ol class=\"contents\"").unwrap();
    assert!(title < copyright && copyright < contents);
}

#[tokio::test]
async fn front_matter_length_disagreement_is_fatal() {
    let out_dir = TempDir::new().unwrap();
    // Plan expects 3 front pages; the renderer hands back 4.
    let renderer = FakeRenderer::new(10, vec![("Intro", 0)], 4);
    let pipeline = Pipeline::new(renderer, book_options()).unwrap();

    let err = pipeline
        .run(&make_package("en"), &out_dir.path().join("book.pdf"))
        .await
        .unwrap_err();

    assert_eq!(err.stage, Stage::RenderPreliminary);
    assert!(matches!(
        err.source,
        PipelineError::NumberingMismatch {
            expected: 3,
            rendered: 4
        }
    ));
}

#[tokio::test]
async fn booklet_gutter_alternates_across_the_section_boundary() {
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("booklet.pdf");

    let options = JobOptions {
        mode: OutputMode::Booklet,
        gutter_pt: Some(12.0),
        ..book_options()
    };
    let pipeline = Pipeline::new(example_renderer(), options).unwrap();
    let artifact = pipeline.run(&make_package("en"), &out).await.unwrap();
    assert_eq!(artifact.pages, 13);

    let doc = Document::load(&out).unwrap();
    let shifts = page_shifts(&doc);
    // Front matter occupies final pages 0..3; the body's first page lands
    // at final index 3 and must continue the parity, not restart it.
    assert_eq!(shifts[0], Some(12.0));
    assert_eq!(shifts[1], Some(-12.0));
    assert_eq!(shifts[2], Some(12.0));
    assert_eq!(shifts[3], Some(-12.0)); // body page "1"
    assert_eq!(shifts[4], Some(12.0));
    for (i, shift) in shifts.iter().enumerate() {
        let expected = if i % 2 == 0 { 12.0 } else { -12.0 };
        assert_eq!(*shift, Some(expected), "page {i}");
    }
}

#[tokio::test]
async fn newspaper_imposes_ceil_of_columns_over_n() {
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("paper.pdf");

    let options = JobOptions {
        mode: OutputMode::Newspaper,
        trim: TrimSize::Custom {
            width_pt: 320.0,
            height_pt: 1500.0,
        },
        columns_per_sheet: 4,
        ..Default::default()
    };
    let pipeline = Pipeline::new(example_renderer(), options).unwrap();
    let artifact = pipeline.run(&make_package("en"), &out).await.unwrap();

    // ceil(10 / 4) = 3 sheets, after 3 front-matter pages.
    assert_eq!(artifact.pages, 3 + 3);

    let doc = Document::load(&out).unwrap();
    let labels = stamped_labels(&doc);
    assert_eq!(labels[3], Some("1".to_string()));
    assert_eq!(labels[5], Some("3".to_string()));
}

#[tokio::test]
async fn reversed_binding_rotates_every_page_and_nothing_else() {
    let plain_dir = TempDir::new().unwrap();
    let reversed_dir = TempDir::new().unwrap();
    let plain_out = plain_dir.path().join("book.pdf");
    let reversed_out = reversed_dir.path().join("book.pdf");

    let plain = Pipeline::new(example_renderer(), book_options()).unwrap();
    plain.run(&make_package("fa"), &plain_out).await.unwrap();

    let options = JobOptions {
        reversed: true,
        ..book_options()
    };
    let reversed = Pipeline::new(example_renderer(), options).unwrap();
    reversed
        .run(&make_package("fa"), &reversed_out)
        .await
        .unwrap();

    let plain_doc = Document::load(&plain_out).unwrap();
    let reversed_doc = Document::load(&reversed_out).unwrap();

    assert_eq!(rotations(&plain_doc), vec![0; 13]);
    assert_eq!(rotations(&reversed_doc), vec![180; 13]);
    // Page order and labels are identical; only orientation flips.
    assert_eq!(stamped_labels(&plain_doc), stamped_labels(&reversed_doc));
}

#[tokio::test]
async fn empty_outline_still_gets_a_contents_page() {
    let out_dir = TempDir::new().unwrap();
    let out = out_dir.path().join("book.pdf");

    let renderer = FakeRenderer::new(5, vec![], 2 + toc_page_count(0));
    let pipeline = Pipeline::new(renderer, book_options()).unwrap();
    let artifact = pipeline.run(&make_package("en"), &out).await.unwrap();

    // title + copyright + one (empty) contents page + 5 body pages
    assert_eq!(artifact.pages, 8);
}

#[tokio::test]
async fn rerunning_the_same_job_reproduces_the_numbering() {
    let out_dir = TempDir::new().unwrap();
    let first_out = out_dir.path().join("first.pdf");
    let second_out = out_dir.path().join("second.pdf");

    let first = Pipeline::new(example_renderer(), book_options()).unwrap();
    let a = first.run(&make_package("en"), &first_out).await.unwrap();

    let second = Pipeline::new(example_renderer(), book_options()).unwrap();
    let b = second.run(&make_package("en"), &second_out).await.unwrap();

    assert_eq!(a.pages, b.pages);
    let first_doc = Document::load(&first_out).unwrap();
    let second_doc = Document::load(&second_out).unwrap();
    assert_eq!(stamped_labels(&first_doc), stamped_labels(&second_doc));
}

#[tokio::test]
async fn invalid_geometry_never_starts_a_job() {
    let options = JobOptions {
        trim: TrimSize::Custom {
            width_pt: 1.0,
            height_pt: 1.0,
        },
        ..Default::default()
    };
    let err = Pipeline::new(example_renderer(), options).unwrap_err();
    assert!(matches!(err, PipelineError::Geometry { .. }));
}

/// Horizontal translation applied to each page's content, read from the
/// gutter bracket stream; `None` when the page is unshifted.
fn page_shifts(doc: &Document) -> Vec<Option<f32>> {
    doc.get_pages()
        .values()
        .map(|page_id| {
            let page = doc.get_dictionary(*page_id).unwrap();
            let refs: Vec<lopdf::ObjectId> = match page.get(b"Contents") {
                Ok(lopdf::Object::Reference(id)) => vec![*id],
                Ok(lopdf::Object::Array(arr)) => {
                    arr.iter().filter_map(|o| o.as_reference().ok()).collect()
                }
                _ => Vec::new(),
            };
            for id in refs {
                if let Ok(stream) = doc.get_object(id).and_then(|o| o.as_stream()) {
                    let content = stream
                        .decompressed_content()
                        .unwrap_or_else(|_| stream.content.clone());
                    let text = String::from_utf8_lossy(&content);
                    if let Some(rest) = text.strip_prefix("q 1 0 0 1 ") {
                        if let Some(dx) = rest.split_whitespace().next() {
                            return dx.parse::<f32>().ok();
                        }
                    }
                }
            }
            None
        })
        .collect()
}
