//! Utility modules.

pub mod id;
pub mod text;

pub use id::{calculate_checksum, short_suffix};
pub use text::{has_meaningful_content, normalize_whitespace};
