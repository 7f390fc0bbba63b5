//! Job orchestration
//!
//! One conversion job is one linear walk through the stages below, with a
//! single branch: newspaper mode imposes the body instead of trimming it.
//! A failing stage aborts the job with the stage recorded; nothing is
//! retried, because external-tool failures are overwhelmingly
//! deterministic and retrying identical input reproduces them. Scratch
//! space and the renderer's display handle are owned by the job and die
//! with it on every exit path.

use crate::error::{PipelineError, Result};
use crate::options::{JobOptions, OutputMode};
use crate::package::BookPackage;
use crate::plan::PaginationPlan;
use crate::render::{HtmlRenderer, RenderRequest};
use crate::sizes::render_size;
use crate::{front_matter, toc};
use bookpress_pdf::{
    BoxSize, Grid, NumberStyle, concat, crop_to_trim, label_run, n_up, page_count, read_outline,
    rotate_180, save_pdf, shift_for_binding, stamp_page_labels,
};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;
use tracing::{info, warn};

/// Stages of the conversion state machine, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    RenderBody,
    ExtractOutline,
    BuildToc,
    RenderPreliminary,
    GeometryBody,
    Impose,
    GeometryFront,
    NumberFront,
    NumberBody,
    Merge,
    Rotate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::RenderBody => "render-body",
            Stage::ExtractOutline => "extract-outline",
            Stage::BuildToc => "build-toc",
            Stage::RenderPreliminary => "render-preliminary",
            Stage::GeometryBody => "geometry-body",
            Stage::Impose => "impose",
            Stage::GeometryFront => "geometry-front",
            Stage::NumberFront => "number-front",
            Stage::NumberBody => "number-body",
            Stage::Merge => "merge",
            Stage::Rotate => "rotate",
        };
        f.write_str(name)
    }
}

/// A job failure, tagged with the stage that produced it.
#[derive(Error, Debug)]
#[error("stage {stage} failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: PipelineError,
}

/// What a finished job hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub format: ArtifactFormat,
    pub pages: usize,
}

/// Output formats the service knows about. The PDF variants are produced
/// here; office documents and e-books come from sibling converters that
/// share this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    BookPdf,
    BookletPdf,
    NewspaperPdf,
    OpenDocument,
    Epub,
}

fn at<T>(stage: Stage, result: Result<T>) -> std::result::Result<T, StageError> {
    result.map_err(|source| StageError { stage, source })
}

/// One conversion pipeline, parameterised over the rendering contract so
/// tests can drive it with synthetic documents.
#[derive(Debug)]
pub struct Pipeline<R: HtmlRenderer> {
    renderer: R,
    options: JobOptions,
}

impl<R: HtmlRenderer> Pipeline<R> {
    /// Validates the options up front; invalid geometry never starts a job.
    pub fn new(renderer: R, options: JobOptions) -> Result<Pipeline<R>> {
        options.validate()?;
        Ok(Self { renderer, options })
    }

    pub fn options(&self) -> &JobOptions {
        &self.options
    }

    /// Run one conversion job to completion.
    pub async fn run(
        &self,
        package: &BookPackage,
        out_path: &Path,
    ) -> std::result::Result<Artifact, StageError> {
        let opt = &self.options;
        let trim = opt.trim.dimensions();
        let sheet = opt.sheet.dimensions();

        let scratch = at(Stage::RenderBody, TempDir::new().map_err(Into::into))?;

        // RENDER_BODY: newspaper bodies render at column size, everything
        // else at the oversized pre-trim page.
        let body_page = match opt.mode {
            OutputMode::Newspaper => BoxSize::new(trim.width_pt, sheet.height_pt),
            _ => render_size(trim),
        };
        info!(stage = %Stage::RenderBody, title = %package.meta.title, "rendering body");
        let raw_body = at(
            Stage::RenderBody,
            self.renderer
                .render(
                    RenderRequest {
                        html: &package.body_html(),
                        page: body_page,
                        label: "body",
                    },
                    scratch.path(),
                )
                .await,
        )?;
        let body_pages = page_count(&raw_body);
        info!(pages = body_pages, "body rendered");

        // EXTRACT_OUTLINE: an unreadable outline degrades the contents,
        // it does not fail the job.
        let outline = match read_outline(&raw_body) {
            Ok(scan) => {
                if scan.dropped > 0 {
                    warn!(
                        dropped = scan.dropped,
                        "headings without resolvable pages left out of the contents"
                    );
                }
                scan.entries
            }
            Err(e) => {
                warn!(error = %e, "could not read outline, contents will be empty");
                Vec::new()
            }
        };

        let gutter = match opt.mode {
            OutputMode::Booklet => opt.gutter(),
            _ => 0.0,
        };
        let plan = PaginationPlan::new(outline.len(), body_pages, gutter, trim, opt.reversed);
        info!(
            front_pages = plan.front_pages,
            entries = outline.len(),
            "pagination fixed"
        );

        // BUILD_TOC
        let contents = toc::toc_html(&outline, &plan, package.meta.direction(), &opt.toc_header);

        // RENDER_PRELIMINARY: newspaper front matter renders at sheet
        // size; bound modes reuse the body's pre-trim page.
        let front_page = match opt.mode {
            OutputMode::Newspaper => sheet,
            _ => render_size(trim),
        };
        let mut front = at(
            Stage::RenderPreliminary,
            front_matter::assemble(
                &self.renderer,
                &package.meta,
                &contents,
                &plan,
                front_page,
                scratch.path(),
            )
            .await,
        )?;

        // GEOMETRY(body) — or IMPOSE in newspaper mode.
        let mut body = raw_body;
        match opt.mode {
            OutputMode::Book => {
                at(Stage::GeometryBody, crop_to_trim(&mut body, trim).map_err(Into::into))?;
            }
            OutputMode::Booklet => {
                at(Stage::GeometryBody, crop_to_trim(&mut body, trim).map_err(Into::into))?;
                at(
                    Stage::GeometryBody,
                    shift_for_binding(&mut body, plan.gutter_pt, plan.final_index(0))
                        .map_err(Into::into),
                )?;
            }
            OutputMode::Newspaper => {
                let grid = Grid::new(opt.columns_per_sheet, 1);
                body = at(Stage::Impose, n_up(&body, grid, sheet).map_err(Into::into))?;
                info!(sheets = page_count(&body), "body imposed");
            }
        }
        let final_body_pages = page_count(&body);

        // GEOMETRY(front): front matter is never imposed; in newspaper
        // mode it is already at sheet size and passes through untouched.
        match opt.mode {
            OutputMode::Book => {
                at(Stage::GeometryFront, crop_to_trim(&mut front, trim).map_err(Into::into))?;
            }
            OutputMode::Booklet => {
                at(Stage::GeometryFront, crop_to_trim(&mut front, trim).map_err(Into::into))?;
                at(
                    Stage::GeometryFront,
                    shift_for_binding(&mut front, plan.gutter_pt, 0).map_err(Into::into),
                )?;
            }
            OutputMode::Newspaper => {}
        }

        // NUMBER(front): lowercase roman from i.
        let front_labels = label_run(
            NumberStyle::RomanLower,
            1,
            plan.front_pages,
            &BTreeMap::new(),
        );
        at(
            Stage::NumberFront,
            stamp_page_labels(&mut front, &front_labels).map_err(Into::into),
        )?;

        // NUMBER(body): arabic restarting at 1, whatever the front length.
        let body_labels = label_run(NumberStyle::Arabic, 1, final_body_pages, &BTreeMap::new());
        at(
            Stage::NumberBody,
            stamp_page_labels(&mut body, &body_labels).map_err(Into::into),
        )?;

        // MERGE
        let mut merged = at(Stage::Merge, concat(&[front, body]).map_err(Into::into))?;
        let total = page_count(&merged);
        debug_assert_eq!(total, plan.front_pages + final_body_pages);

        // ROTATE: flips orientation only; page order is untouched.
        if plan.reversed {
            at(Stage::Rotate, rotate_180(&mut merged).map_err(Into::into))?;
        }

        at(
            Stage::Merge,
            save_pdf(merged, out_path).await.map_err(Into::into),
        )?;

        let format = match opt.mode {
            OutputMode::Book => ArtifactFormat::BookPdf,
            OutputMode::Booklet => ArtifactFormat::BookletPdf,
            OutputMode::Newspaper => ArtifactFormat::NewspaperPdf,
        };
        info!(pages = total, path = %out_path.display(), "job done");

        Ok(Artifact {
            path: out_path.to_owned(),
            format,
            pages: total,
        })
    }
}
