//! Security policy helpers.
//!
//! Path containment lives in [`SafePath`](crate::types::SafePath); this
//! module holds the checks applied to entry metadata.

pub mod permissions;

pub use permissions::DEFAULT_FILE_MODE;
pub use permissions::effective_mode;
pub use permissions::sanitize_mode;
