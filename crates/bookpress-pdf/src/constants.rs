//! Shared constants for page operations
//!
//! This module centralizes unit conversions and the metrics used when
//! stamping page labels.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4; // ≈ 2.83465

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

/// Convert points to millimeters
#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Page Labels
// =============================================================================

/// Font size for stamped page labels (points)
pub const PAGE_LABEL_FONT_SIZE: f32 = 9.0;

/// Baseline distance of a page label from the bottom of the page box (points)
pub const PAGE_LABEL_BASELINE: f32 = 24.0;

/// Approximate character width ratio for Helvetica, used to center labels
pub const HELVETICA_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Resource name under which the label font is registered on each page
pub const PAGE_LABEL_FONT_NAME: &str = "BPnum";

// =============================================================================
// Imposition
// =============================================================================

/// Printer-safe margin around an imposed sheet (points)
pub const SHEET_MARGIN_PT: f32 = 18.0;
