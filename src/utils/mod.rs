//! Utility functions

pub mod cover_art;
mod sanitize;

pub use sanitize::{sanitize_filename, truncate_name, MAX_NAME_BYTES};
