//! Utility functions

pub mod fs;
pub mod path;

pub use fs::{list_files_with_suffix, list_subdirs, move_file};
pub use path::{display_relative, expand_tilde, file_name_str, normalize_path};
