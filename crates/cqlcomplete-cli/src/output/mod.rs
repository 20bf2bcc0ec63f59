//! Output formatting modules.

pub mod json;
pub mod text;

pub use json::{format_completions_json, format_json, Description};
pub use text::{format_completions, format_description};
