//! Configuration for the in-memory directory.

/// Configuration for [`InMemoryDirectory`](crate::InMemoryDirectory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryConfig {
    /// Capacity of the event channel.
    ///
    /// Receivers that fall further behind than this lose the oldest events.
    /// Default: 256
    pub event_capacity: usize,

    /// Maximum number of registrations.
    ///
    /// Only new names count against the limit; overwriting an existing name
    /// always succeeds. `None` means unlimited.
    /// Default: None
    pub max_registrations: Option<usize>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
            max_registrations: None,
        }
    }
}

impl DirectoryConfig {
    /// Default capacity of the event channel.
    pub const DEFAULT_EVENT_CAPACITY: usize = 256;

    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the event channel capacity. Zero is raised to one.
    #[must_use]
    pub const fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = if capacity == 0 { 1 } else { capacity };
        self
    }

    /// Limits the number of registrations.
    #[must_use]
    pub const fn with_max_registrations(mut self, max: usize) -> Self {
        self.max_registrations = Some(max);
        self
    }
}
