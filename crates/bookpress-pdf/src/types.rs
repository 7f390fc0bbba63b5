use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("trim box {trim_width}x{trim_height}pt does not fit page {page} ({page_width}x{page_height}pt)")]
    TrimTooLarge {
        page: usize,
        trim_width: f32,
        trim_height: f32,
        page_width: f32,
        page_height: f32,
    },
    #[error("invalid grid: {0}")]
    Grid(String),
    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("document has no pages")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// A page box expressed as width × height in points.
///
/// Used both for trim boxes (the final cut size of a bound page) and for
/// imposition sheets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl BoxSize {
    pub fn new(width_pt: f32, height_pt: f32) -> Self {
        Self {
            width_pt,
            height_pt,
        }
    }
}

/// Grid shape for N-up imposition: `cols × rows` source pages per sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub cols: usize,
    pub rows: usize,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows }
    }

    /// Source pages placed on one output sheet
    pub fn pages_per_sheet(self) -> usize {
        self.cols * self.rows
    }

    /// Pick a grid for `n` pages per sheet, preferring wider layouts
    pub fn for_count(n: usize) -> Self {
        match n {
            0 | 1 => Self::new(1, 1),
            2 => Self::new(2, 1),
            4 => Self::new(2, 2),
            8 => Self::new(4, 2),
            _ => {
                let cols = if n >= 8 { 4 } else { 2 };
                Self::new(cols, n.div_ceil(cols))
            }
        }
    }
}

/// An entry in a document's bookmark outline.
///
/// `page_index` is the zero-based index of the destination page in the
/// source document; `depth` is the nesting level, 0 for top-level entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineEntry {
    pub title: String,
    pub depth: u32,
    pub page_index: usize,
}

/// Result of an outline walk: the resolvable entries in document order,
/// plus a count of entries that had to be skipped because their
/// destination could not be mapped to a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineScan {
    pub entries: Vec<OutlineEntry>,
    pub dropped: usize,
}
