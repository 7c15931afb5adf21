//! Pipeline configuration.
//!
//! One `Config` is built up front and passed by reference to every stage
//! (builder, layout state, mount state, component tree). There are no global
//! toggles.
//!
//! # Example
//!
//! ```
//! use spark_mount::Config;
//!
//! let config = Config::default()
//!     .with_incremental_mount(false)
//!     .with_strict_mode(true);
//! assert!(!config.incremental_mount_enabled);
//! ```

/// Recognized pipeline options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Release superseded in-flight layout futures so their tree resolution
    /// stops at the next checkpoint.
    pub use_cancelable_layout_futures: bool,

    /// Reuse unchanged subtrees of the previous layout instead of re-rendering.
    pub is_reconciliation_enabled: bool,

    /// Mount only outputs intersecting the visible rect.
    pub incremental_mount_enabled: bool,

    /// Reuse measurements taken during the same layout computation.
    pub use_measured_result_cache: bool,

    /// Turn configuration problems (e.g. incompatible scroll containers)
    /// into errors instead of warnings. Defaults to debug builds.
    pub strict_mode: bool,

    /// Name given to the background layout thread.
    pub layout_thread_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            use_cancelable_layout_futures: true,
            is_reconciliation_enabled: true,
            incremental_mount_enabled: true,
            use_measured_result_cache: true,
            strict_mode: cfg!(debug_assertions),
            layout_thread_name: "spark-layout".to_string(),
        }
    }
}

impl Config {
    pub fn with_cancelable_layout_futures(mut self, enabled: bool) -> Self {
        self.use_cancelable_layout_futures = enabled;
        self
    }

    pub fn with_reconciliation(mut self, enabled: bool) -> Self {
        self.is_reconciliation_enabled = enabled;
        self
    }

    pub fn with_incremental_mount(mut self, enabled: bool) -> Self {
        self.incremental_mount_enabled = enabled;
        self
    }

    pub fn with_measured_result_cache(mut self, enabled: bool) -> Self {
        self.use_measured_result_cache = enabled;
        self
    }

    pub fn with_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    pub fn with_layout_thread_name(mut self, name: impl Into<String>) -> Self {
        self.layout_thread_name = name.into();
        self
    }
}
