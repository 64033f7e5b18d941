//! External detector output: per-month detection tables.
//!
//! Tables are produced by the species detector and are only ever read here.

mod layout;
mod primary;
mod table;

pub use layout::DetectionLayout;
pub use primary::PrimaryFrameResolver;
pub use table::{DetectionRow, DetectionTable, referenced_folders};
