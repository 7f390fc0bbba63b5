//! Per-job configuration
//!
//! Everything a conversion job needs is carried in an explicit
//! `JobOptions` value handed to the pipeline at job start. Concurrent
//! jobs with different parameters share nothing.

use crate::error::{PipelineError, Result};
use crate::sizes::{SheetSize, TrimSize, default_gutter_pt, extrema, min_column_width_pt};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which artifact the job produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Plain print PDF: trimmed, numbered, no gutter shift
    #[default]
    Book,
    /// Bound booklet: trimmed, gutter-shifted, numbered
    Booklet,
    /// N-up newspaper sheets
    Newspaper,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOptions {
    pub mode: OutputMode,

    /// Final cut size of a bound page. In newspaper mode this is the
    /// column size instead, and the output sheet is `sheet`.
    pub trim: TrimSize,

    /// Binding gutter width in points; derived from the trim width when
    /// not set. Negative values bind on the opposite edge.
    pub gutter_pt: Option<f32>,

    /// Rotate the merged document 180° so a right-to-left book prints
    /// correctly on a left-to-right print path.
    pub reversed: bool,

    /// Newspaper mode: columns placed side by side on one sheet.
    pub columns_per_sheet: usize,

    /// Newspaper mode: the output sheet size.
    pub sheet: SheetSize,

    /// Heading printed above the table of contents.
    pub toc_header: String,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            mode: OutputMode::Book,
            trim: TrimSize::default(),
            gutter_pt: None,
            reversed: false,
            columns_per_sheet: 4,
            sheet: SheetSize::default(),
            toc_header: "Table of Contents".to_string(),
        }
    }
}

impl JobOptions {
    /// Load options from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes).map_err(|e| PipelineError::Package {
            message: format!("failed to parse options: {e}"),
        })?;
        Ok(options)
    }

    /// Save options to a JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| PipelineError::Package {
            message: format!("failed to serialize options: {e}"),
        })?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Effective gutter width for this job
    pub fn gutter(&self) -> f32 {
        self.gutter_pt
            .unwrap_or_else(|| default_gutter_pt(self.trim.dimensions()))
    }

    /// Reject caller input defects before any external tool runs.
    pub fn validate(&self) -> Result<()> {
        let trim = self.trim.dimensions();

        let (min_w, max_w) = extrema::page_width();
        if trim.width_pt < min_w || trim.width_pt > max_w {
            return Err(PipelineError::Geometry {
                message: format!("page width {}pt out of range", trim.width_pt),
            });
        }
        let (min_h, max_h) = extrema::page_height();
        if trim.height_pt < min_h || trim.height_pt > max_h {
            return Err(PipelineError::Geometry {
                message: format!("page height {}pt out of range", trim.height_pt),
            });
        }

        let (min_g, max_g) = extrema::gutter();
        let gutter = self.gutter();
        if gutter < min_g || gutter > max_g {
            return Err(PipelineError::Geometry {
                message: format!("gutter {gutter}pt out of range"),
            });
        }

        if self.mode == OutputMode::Newspaper {
            if self.columns_per_sheet == 0 {
                return Err(PipelineError::Geometry {
                    message: "newspaper mode needs at least one column per sheet".to_string(),
                });
            }
            if trim.width_pt < min_column_width_pt() {
                return Err(PipelineError::Geometry {
                    message: format!(
                        "column width {}pt narrower than the {}pt minimum",
                        trim.width_pt,
                        min_column_width_pt()
                    ),
                });
            }
            let sheet = self.sheet.dimensions();
            if sheet.width_pt < trim.width_pt {
                return Err(PipelineError::Geometry {
                    message: "sheet narrower than one column".to_string(),
                });
            }
        }

        Ok(())
    }
}
