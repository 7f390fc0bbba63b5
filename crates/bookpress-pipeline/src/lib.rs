mod error;
mod front_matter;
mod options;
mod package;
mod pipeline;
mod plan;
mod render;
mod sizes;
mod toc;

pub use bookpress_pdf::BoxSize;
pub use bookpress_pdf::constants::{mm_to_pt, pt_to_mm};
pub use error::{PipelineError, Result};
pub use front_matter::{copyright_html, title_html};
pub use options::{JobOptions, OutputMode};
pub use package::{BookMeta, BookPackage, Chapter, ImageAsset, TextDirection};
pub use pipeline::{Artifact, ArtifactFormat, Pipeline, Stage, StageError};
pub use plan::{PaginationPlan, TOC_ROWS_PER_PAGE, toc_page_count};
pub use render::{HtmlRenderer, RenderConfig, RenderRequest, VirtualDisplay, WkRenderer};
pub use sizes::{SheetSize, TrimSize, default_gutter_pt, page_margin_pt, render_size};
pub use toc::toc_html;
