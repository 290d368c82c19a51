//! Settings for a generation run.

use std::time::Duration;

/// Settings that control probing and code generation behavior.
#[derive(Debug, Clone)]
pub struct GenerateSettings {
    /// When true, every async route also gets a synchronous twin method.
    ///
    /// **Default: false.**
    pub generate_async_and_sync: bool,

    /// When true, JSON keys become `snake_case` field names. When false, keys are kept
    /// as-is apart from characters that cannot appear in an identifier.
    ///
    /// **Default: true.**
    pub follow_naming_conventions: bool,

    /// Timeout applied to every network probe.
    ///
    /// **Default: 30 seconds.**
    pub probe_timeout: Duration,

    /// Upper bound on probes in flight at once. Zero is treated as one.
    ///
    /// **Default: 8.**
    pub max_concurrent_probes: usize,
}

impl GenerateSettings {
    /// `max_concurrent_probes`, never below one.
    #[must_use]
    pub fn probe_concurrency(&self) -> usize {
        self.max_concurrent_probes.max(1)
    }
}

impl Default for GenerateSettings {
    fn default() -> Self {
        Self {
            generate_async_and_sync: false,
            follow_naming_conventions: true,
            probe_timeout: Duration::from_secs(30),
            max_concurrent_probes: 8,
        }
    }
}
