//! Type-safe wrappers for archive extraction operations.
//!
//! This module provides newtypes that enforce containment at the type level.
//! A [`SafePath`] can only be obtained by validating an entry name against a
//! [`DestDir`], and only a `SafePath` can be joined onto a `DestDir`.

pub mod dest_dir;
pub mod entry_type;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use entry_type::EntryType;
pub use safe_path::SafePath;
