mod carry;
pub mod constants;
mod document;
mod geometry;
mod impose;
mod labels;
mod merge;
mod outline;
mod stamp;
mod types;

pub use document::{load_pdf, page_count, save_pdf};
pub use geometry::{crop_to_trim, shift_for_binding};
pub use impose::{n_up, sheet_count};
pub use labels::{NumberStyle, label_run, roman_lower};
pub use merge::{concat, rotate_180};
pub use outline::read_outline;
pub use stamp::stamp_page_labels;
pub use types::*;
