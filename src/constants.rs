//! Constants for agent name validation.

/// Separator between the protocol and the dotted name body.
pub const SCHEME_SEPARATOR: &str = "://";

/// Prefix that marks the version segment.
pub const VERSION_PREFIX: &str = "v";

/// Separator between name segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// Protocol used when a client registers without naming one.
pub const DEFAULT_PROTOCOL: &str = "a2a";

/// Capability segment used for agents that declare no capabilities.
pub const DEFAULT_CAPABILITY: &str = "general";
