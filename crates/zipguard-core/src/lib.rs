//! Safe zip extraction with explicit integrity and containment checks.
//!
//! `zipguard-core` extracts zip archives under a destination root, refusing
//! entries whose paths would escape it, verifying the size and CRC-32 of
//! every written file, and reporting the outcome of each entry.
//!
//! # Examples
//!
//! ```no_run
//! use zipguard_core::ExtractOptions;
//! use zipguard_core::extract_file;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let report = extract_file("archive.zip", "/output/dir", &ExtractOptions::default())?;
//! println!("Extracted {} files", report.files_written);
//! for (name, err) in report.failures() {
//!     eprintln!("{name}: {err}");
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod inspection;
pub mod report;
pub mod security;
pub mod test_utils;
pub mod types;

// Re-export main API types
pub use api::extract;
pub use api::extract_file;
pub use config::ExtractOptions;
pub use error::ExtractionError;
pub use error::FailureKind;
pub use error::IntegrityMismatch;
pub use error::PathViolation;
pub use error::Result;
pub use formats::Entry;
pub use formats::ZipArchive;
pub use inspection::list_entries;
pub use report::EntryOutcome;
pub use report::EntryStatus;
pub use report::ExtractionReport;

// Re-export types module for easier access
pub use types::DestDir;
pub use types::EntryType;
pub use types::SafePath;
