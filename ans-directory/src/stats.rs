//! Directory statistics.

/// Snapshot of the directory's contents.
///
/// Served by the registry's health endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryStats {
    /// Number of registered agents.
    pub total_registrations: usize,
    /// Number of distinct providers.
    pub unique_providers: usize,
    /// Number of distinct capability names across all agents.
    pub unique_capabilities: usize,
    /// Number of active event subscribers.
    pub subscribers: usize,
}

impl DirectoryStats {
    /// Returns the total registrations.
    #[must_use]
    pub const fn total_registrations(&self) -> usize {
        self.total_registrations
    }

    /// Returns the distinct provider count.
    #[must_use]
    pub const fn unique_providers(&self) -> usize {
        self.unique_providers
    }

    /// Returns the distinct capability count.
    #[must_use]
    pub const fn unique_capabilities(&self) -> usize {
        self.unique_capabilities
    }
}
