//! Trim sizes, sheets, and derived print geometry
//!
//! Named sizes cover the print-on-demand formats the service historically
//! produced plus the newspaper sheets used by the imposed layout. Margins
//! and the default binding gutter are derived from the trim dimensions
//! rather than fixed, so small formats keep proportionally sane margins.

use bookpress_pdf::{BoxSize, constants::mm_to_pt};
use serde::{Deserialize, Serialize};

const INCH_TO_PT: f32 = 72.0;

/// Base margin added to every edge (points)
pub const BASE_MARGIN_PT: f32 = 22.0;
/// Margin fraction of the smaller trim dimension
pub const PROPORTIONAL_MARGIN: f32 = 0.04;
/// Base binding gutter (points)
pub const BASE_GUTTER_PT: f32 = 15.0;
/// Gutter fraction of the trim width
pub const PROPORTIONAL_GUTTER: f32 = 0.011;

/// Narrowest column the newspaper layout will accept
pub fn min_column_width_pt() -> f32 {
    mm_to_pt(110.0)
}

/// Named trim sizes for bound output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrimSize {
    /// 6.625" × 10.25" — the historical default
    ComicBook,
    /// 4.25" × 6.875"
    Pocket,
    /// 8.5" × 11"
    UsLetter,
    /// 6" × 9"
    UsTrade,
    /// 5.5" × 8.5"
    Digest,
    /// 148mm × 210mm
    A5,
    /// 210mm × 297mm
    A4,
    Custom { width_pt: f32, height_pt: f32 },
}

impl Default for TrimSize {
    fn default() -> Self {
        TrimSize::ComicBook
    }
}

impl TrimSize {
    pub fn dimensions(self) -> BoxSize {
        let (w, h) = match self {
            TrimSize::ComicBook => (6.625 * INCH_TO_PT, 10.25 * INCH_TO_PT),
            TrimSize::Pocket => (4.25 * INCH_TO_PT, 6.875 * INCH_TO_PT),
            TrimSize::UsLetter => (8.5 * INCH_TO_PT, 11.0 * INCH_TO_PT),
            TrimSize::UsTrade => (6.0 * INCH_TO_PT, 9.0 * INCH_TO_PT),
            TrimSize::Digest => (5.5 * INCH_TO_PT, 8.5 * INCH_TO_PT),
            TrimSize::A5 => (mm_to_pt(148.0), mm_to_pt(210.0)),
            TrimSize::A4 => (mm_to_pt(210.0), mm_to_pt(297.0)),
            TrimSize::Custom {
                width_pt,
                height_pt,
            } => (width_pt, height_pt),
        };
        BoxSize::new(w, h)
    }
}

/// Output sheets for the newspaper layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SheetSize {
    /// 297mm × 420mm
    A3Tabloid,
    /// 420mm × 594mm
    A2Broadsheet,
    /// 315mm × 470mm
    Berliner,
    Custom { width_pt: f32, height_pt: f32 },
}

impl Default for SheetSize {
    fn default() -> Self {
        SheetSize::A2Broadsheet
    }
}

impl SheetSize {
    pub fn dimensions(self) -> BoxSize {
        let (w, h) = match self {
            SheetSize::A3Tabloid => (mm_to_pt(297.0), mm_to_pt(420.0)),
            SheetSize::A2Broadsheet => (mm_to_pt(420.0), mm_to_pt(594.0)),
            SheetSize::Berliner => (mm_to_pt(315.0), mm_to_pt(470.0)),
            SheetSize::Custom {
                width_pt,
                height_pt,
            } => (width_pt, height_pt),
        };
        BoxSize::new(w, h)
    }
}

/// Page margin derived from the trim size:
/// `BASE_MARGIN + PROPORTIONAL_MARGIN × min(width, height)`
pub fn page_margin_pt(trim: BoxSize) -> f32 {
    BASE_MARGIN_PT + PROPORTIONAL_MARGIN * trim.width_pt.min(trim.height_pt)
}

/// Default binding gutter for a trim width:
/// `BASE_GUTTER + PROPORTIONAL_GUTTER × width`
pub fn default_gutter_pt(trim: BoxSize) -> f32 {
    BASE_GUTTER_PT + PROPORTIONAL_GUTTER * trim.width_pt
}

/// The size a page is rendered at before trimming: trim plus margins on
/// every edge. The trim box is later centred inside this.
pub fn render_size(trim: BoxSize) -> BoxSize {
    let margin = page_margin_pt(trim);
    BoxSize::new(trim.width_pt + 2.0 * margin, trim.height_pt + 2.0 * margin)
}

/// Accepted extremes, in points. Sizes above B0 paper are rejected as
/// caller input defects before any rendering starts.
pub mod extrema {
    use super::mm_to_pt;

    pub fn page_width() -> (f32, f32) {
        (mm_to_pt(1.0), mm_to_pt(1000.0))
    }
    pub fn page_height() -> (f32, f32) {
        (mm_to_pt(1.0), mm_to_pt(1414.0))
    }
    pub fn gutter() -> (f32, f32) {
        (mm_to_pt(-1000.0), mm_to_pt(1000.0))
    }
}
