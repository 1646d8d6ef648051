//! Error types for agent name parsing.

use std::fmt;

/// Errors that can occur when parsing or constructing an agent name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The input that failed to parse
    pub input: String,
    /// The specific error that occurred
    pub kind: ParseErrorKind,
}

/// Specific parsing error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Name is empty
    Empty,
    /// No `://` separator after the protocol
    MissingScheme,
    /// Protocol before `://` is empty
    EmptyProtocol,
    /// A mandatory dotted segment is absent or empty
    MissingComponent {
        /// Name of the missing component
        component: &'static str,
    },
    /// The fourth segment does not start with `v`
    MissingVersionPrefix {
        /// The segment that was found instead
        found: String,
    },
    /// A trailing dot with nothing after it
    EmptyExtension,
    /// A character that the component cannot carry
    InvalidChar {
        /// The invalid character
        char: char,
        /// Component in which it appeared
        component: &'static str,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid agent name format '{}': {}", self.input, self.kind)
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "input is empty"),
            Self::MissingScheme => {
                write!(f, "expected 'protocol://' at the start of the name")
            }
            Self::EmptyProtocol => write!(f, "protocol cannot be empty"),
            Self::MissingComponent { component } => {
                write!(
                    f,
                    "missing {component}; expected protocol://agentId.capability.provider.vVersion[.extension]"
                )
            }
            Self::MissingVersionPrefix { found } => {
                write!(f, "version segment '{found}' must start with 'v'")
            }
            Self::EmptyExtension => {
                write!(f, "extension cannot be empty; drop the trailing '.'")
            }
            Self::InvalidChar { char, component } => {
                write!(f, "character {char:?} is not allowed in the {component}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_input() {
        let err = ParseError {
            input: "bogus".to_string(),
            kind: ParseErrorKind::MissingScheme,
        };
        let message = err.to_string();
        assert!(message.contains("bogus"));
        assert!(message.contains("protocol://"));
    }

    #[test]
    fn missing_component_names_the_component() {
        let err = ParseError {
            input: "a2a://x.y".to_string(),
            kind: ParseErrorKind::MissingComponent {
                component: "provider",
            },
        };
        assert!(err.to_string().contains("missing provider"));
    }
}
