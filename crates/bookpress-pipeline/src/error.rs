//! Job error taxonomy
//!
//! Every fatal condition a conversion job can hit maps to one variant
//! here. Outline-extraction trouble is deliberately absent: a missing or
//! unreadable outline degrades the table of contents and is logged, it
//! does not fail the job.

use bookpress_pdf::PdfError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The external HTML renderer failed on its input: bad markup,
    /// missing fonts, unreachable resources.
    #[error("render failed: {message}")]
    Render { message: String },

    /// Caller input defect in page geometry: trim box larger than the
    /// rendered page, gutter or size outside the accepted range.
    #[error("invalid page geometry: {message}")]
    Geometry { message: String },

    /// The rendered front matter disagrees with the page count the TOC
    /// numbering was computed against. This must surface, not be patched:
    /// recomputing would reopen the TOC-length/page-number cycle.
    #[error("front matter rendered {rendered} pages but numbering assumed {expected}")]
    NumberingMismatch { expected: usize, rendered: usize },

    /// An external tool exited non-zero, timed out, or produced output we
    /// could not work with.
    #[error("tool failed: {message}")]
    Tool { message: String },

    /// The package directory could not be loaded: unreadable or
    /// malformed manifest, missing chapter files.
    #[error("invalid book package: {message}")]
    Package { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<PdfError> for PipelineError {
    fn from(err: PdfError) -> Self {
        match err {
            PdfError::TrimTooLarge { .. } => PipelineError::Geometry {
                message: err.to_string(),
            },
            other => PipelineError::Tool {
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
