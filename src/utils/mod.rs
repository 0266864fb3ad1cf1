//! Utility modules shared by the query pipeline and the web layer
//!
//! - Text: case-insensitive containment, lenient integer parsing
//! - Display names: human-readable labels for dataset identifiers

pub mod text;
pub mod display_name;

// Re-export commonly used helpers
pub use text::{contains_ci, parse_leading_int};
pub use display_name::get_display_name;
