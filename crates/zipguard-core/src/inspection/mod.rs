//! Archive inspection without extraction.

pub mod list;

pub use list::list_entries;
pub use list::list_file;
