//! Extraction options.

/// Options controlling how entries are materialized on disk.
///
/// The defaults are fail-closed: nothing already on disk is replaced and the
/// first failing entry stops the extraction.
///
/// # Examples
///
/// ```
/// use zipguard_core::ExtractOptions;
///
/// // Use secure defaults
/// let options = ExtractOptions::default();
/// assert!(!options.overwrite_existing);
///
/// // Keep going past failures and report all of them at the end
/// let options = ExtractOptions::default().with_continue_on_error(true);
/// assert!(options.continue_on_error);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Replace files that already exist at a target path.
    pub overwrite_existing: bool,

    /// Create missing parent directories of file entries.
    pub create_missing_directories: bool,

    /// Process every entry instead of stopping at the first failure.
    pub continue_on_error: bool,

    /// Apply Unix permission bits recorded in the archive.
    pub preserve_permissions: bool,
}

impl Default for ExtractOptions {
    /// Creates `ExtractOptions` with secure default settings.
    ///
    /// Default values:
    /// - `overwrite_existing`: false
    /// - `create_missing_directories`: true
    /// - `continue_on_error`: false
    /// - `preserve_permissions`: false
    fn default() -> Self {
        Self {
            overwrite_existing: false,
            create_missing_directories: true,
            continue_on_error: false,
            preserve_permissions: false,
        }
    }
}

impl ExtractOptions {
    /// Options for archives from a trusted source.
    ///
    /// Existing files are replaced. Path containment and integrity checks
    /// still apply.
    #[must_use]
    pub fn trusted() -> Self {
        Self {
            overwrite_existing: true,
            ..Default::default()
        }
    }

    /// Sets whether existing files are replaced.
    #[must_use]
    pub fn with_overwrite_existing(mut self, overwrite: bool) -> Self {
        self.overwrite_existing = overwrite;
        self
    }

    /// Sets whether missing parent directories are created.
    #[must_use]
    pub fn with_create_missing_directories(mut self, create: bool) -> Self {
        self.create_missing_directories = create;
        self
    }

    /// Sets whether extraction continues past failing entries.
    #[must_use]
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Sets whether archived permission bits are applied.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert!(!options.overwrite_existing);
        assert!(options.create_missing_directories);
        assert!(!options.continue_on_error);
        assert!(!options.preserve_permissions);
    }

    #[test]
    fn test_trusted_options() {
        let options = ExtractOptions::trusted();
        assert!(options.overwrite_existing);
        assert!(!options.continue_on_error);
    }

    #[test]
    fn test_builder_methods() {
        let options = ExtractOptions::default()
            .with_overwrite_existing(true)
            .with_create_missing_directories(false)
            .with_continue_on_error(true)
            .with_preserve_permissions(true);
        assert!(options.overwrite_existing);
        assert!(!options.create_missing_directories);
        assert!(options.continue_on_error);
        assert!(options.preserve_permissions);
    }
}
