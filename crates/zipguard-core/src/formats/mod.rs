//! Zip container format support.

pub mod compression;
pub mod entry;
mod name;
mod records;
pub mod zip;

// Re-export main types for convenience
pub use compression::CompressionMethod;
pub use entry::Entry;
pub use zip::ZipArchive;
