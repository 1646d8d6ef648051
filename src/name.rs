//! Main agent name type.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::constants::{SCHEME_SEPARATOR, SEGMENT_SEPARATOR, VERSION_PREFIX};
use crate::error::{ParseError, ParseErrorKind};

/// A parsed and validated agent name.
///
/// Agent names identify an agent together with the capability it is named
/// after, the provider operating it and its version.
///
/// # Structure
///
/// ```text
/// protocol://agentId.capability.provider.vVersion[.extension]
/// ```
///
/// The first four dotted segments cannot contain dots. The extension takes
/// everything after the fourth dot and may contain further dots.
///
/// # Examples
///
/// ```
/// use ans_name::AnsName;
///
/// let name = AnsName::parse("a2a://model1.ml-inference.acme.v1.prod").unwrap();
/// assert_eq!(name.protocol(), "a2a");
/// assert_eq!(name.agent_id(), "model1");
/// assert_eq!(name.capability(), "ml-inference");
/// assert_eq!(name.provider(), "acme");
/// assert_eq!(name.version(), "1");
/// assert_eq!(name.extension(), Some("prod"));
///
/// // Generation is the exact inverse of parsing
/// assert_eq!(name.generate(), "a2a://model1.ml-inference.acme.v1.prod");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnsName {
    protocol: String,
    agent_id: String,
    capability: String,
    provider: String,
    version: String,
    extension: Option<String>,
}

impl AnsName {
    /// Parses an agent name from a string.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if:
    /// - The name is empty
    /// - There is no non-empty protocol followed by `://`
    /// - Agent ID, capability, provider or version is missing or empty
    /// - The version segment does not start with `v`
    /// - A trailing extension is empty or contains a line terminator
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        Self::parse_inner(input).map_err(|kind| ParseError {
            input: input.to_string(),
            kind,
        })
    }

    /// Returns true if `input` is a well-formed agent name.
    #[must_use]
    pub fn is_valid(input: &str) -> bool {
        Self::parse_inner(input).is_ok()
    }

    /// Creates a new agent name from its components.
    ///
    /// The version is given without its `v` prefix.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if any component could not survive a
    /// generate/parse round trip: empty mandatory components, a `:` in the
    /// protocol, a `.` in a dotted segment, or an empty extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use ans_name::AnsName;
    ///
    /// let name = AnsName::new("a2a", "model1", "ml-inference", "acme", "1", Some("prod")).unwrap();
    /// assert_eq!(name.to_string(), "a2a://model1.ml-inference.acme.v1.prod");
    ///
    /// assert!(AnsName::new("a2a", "model.1", "ml", "acme", "1", None::<&str>).is_err());
    /// ```
    pub fn new(
        protocol: impl Into<String>,
        agent_id: impl Into<String>,
        capability: impl Into<String>,
        provider: impl Into<String>,
        version: impl Into<String>,
        extension: Option<impl Into<String>>,
    ) -> Result<Self, ParseError> {
        let name = Self {
            protocol: protocol.into(),
            agent_id: agent_id.into(),
            capability: capability.into(),
            provider: provider.into(),
            version: version.into(),
            extension: extension.map(Into::into),
        };

        name.validate_components().map_err(|kind| ParseError {
            input: name.generate(),
            kind,
        })?;

        Ok(name)
    }

    /// Returns the protocol (for example `a2a`).
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Returns the agent ID.
    #[must_use]
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Returns the capability the agent is named after.
    #[must_use]
    pub fn capability(&self) -> &str {
        &self.capability
    }

    /// Returns the provider.
    #[must_use]
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Returns the version, without the `v` prefix.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the extension, if present.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Returns the canonical string form.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut result = self.canonical();
        if let Some(extension) = &self.extension {
            result.push(SEGMENT_SEPARATOR);
            result.push_str(extension);
        }
        result
    }

    /// Returns the name without its extension.
    #[must_use]
    pub fn canonical(&self) -> String {
        format!(
            "{}{SCHEME_SEPARATOR}{}.{}.{}.{VERSION_PREFIX}{}",
            self.protocol, self.agent_id, self.capability, self.provider, self.version
        )
    }

    /// Returns a copy of this name with a different extension.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the extension is empty or contains a line
    /// terminator.
    pub fn with_extension(&self, extension: impl Into<String>) -> Result<Self, ParseError> {
        Self::new(
            self.protocol.clone(),
            self.agent_id.clone(),
            self.capability.clone(),
            self.provider.clone(),
            self.version.clone(),
            Some(extension.into()),
        )
    }

    /// Returns a copy of this name without an extension.
    #[must_use]
    pub fn without_extension(&self) -> Self {
        Self {
            extension: None,
            ..self.clone()
        }
    }

    fn parse_inner(input: &str) -> Result<Self, ParseErrorKind> {
        if input.is_empty() {
            return Err(ParseErrorKind::Empty);
        }

        // The protocol ends at the first ':' and must be followed by "://"
        let colon_idx = input.find(':').ok_or(ParseErrorKind::MissingScheme)?;
        let protocol = &input[..colon_idx];
        let body = input[colon_idx..]
            .strip_prefix(SCHEME_SEPARATOR)
            .ok_or(ParseErrorKind::MissingScheme)?;
        if protocol.is_empty() {
            return Err(ParseErrorKind::EmptyProtocol);
        }

        let mut segments = body.splitn(5, SEGMENT_SEPARATOR);
        let agent_id = Self::required_segment(segments.next(), "agent ID")?;
        let capability = Self::required_segment(segments.next(), "capability")?;
        let provider = Self::required_segment(segments.next(), "provider")?;
        let version_segment = Self::required_segment(segments.next(), "version")?;

        let version = version_segment.strip_prefix(VERSION_PREFIX).ok_or_else(|| {
            ParseErrorKind::MissingVersionPrefix {
                found: version_segment.to_string(),
            }
        })?;
        if version.is_empty() {
            return Err(ParseErrorKind::MissingComponent {
                component: "version",
            });
        }

        let extension = match segments.next() {
            None => None,
            Some(extension) => {
                Self::check_extension(extension)?;
                Some(extension.to_string())
            }
        };

        Ok(Self {
            protocol: protocol.to_string(),
            agent_id: agent_id.to_string(),
            capability: capability.to_string(),
            provider: provider.to_string(),
            version: version.to_string(),
            extension,
        })
    }

    fn required_segment<'a>(
        segment: Option<&'a str>,
        component: &'static str,
    ) -> Result<&'a str, ParseErrorKind> {
        match segment {
            Some(s) if !s.is_empty() => Ok(s),
            _ => Err(ParseErrorKind::MissingComponent { component }),
        }
    }

    fn check_extension(extension: &str) -> Result<(), ParseErrorKind> {
        if extension.is_empty() {
            return Err(ParseErrorKind::EmptyExtension);
        }
        if let Some(c) = extension.chars().find(|c| is_line_terminator(*c)) {
            return Err(ParseErrorKind::InvalidChar {
                char: c,
                component: "extension",
            });
        }
        Ok(())
    }

    fn validate_components(&self) -> Result<(), ParseErrorKind> {
        if self.protocol.is_empty() {
            return Err(ParseErrorKind::EmptyProtocol);
        }
        if self.protocol.contains(':') {
            return Err(ParseErrorKind::InvalidChar {
                char: ':',
                component: "protocol",
            });
        }

        for (value, component) in [
            (&self.agent_id, "agent ID"),
            (&self.capability, "capability"),
            (&self.provider, "provider"),
            (&self.version, "version"),
        ] {
            if value.is_empty() {
                return Err(ParseErrorKind::MissingComponent { component });
            }
            if value.contains(SEGMENT_SEPARATOR) {
                return Err(ParseErrorKind::InvalidChar {
                    char: SEGMENT_SEPARATOR,
                    component,
                });
            }
        }

        if let Some(extension) = &self.extension {
            Self::check_extension(extension)?;
        }

        Ok(())
    }
}

/// Line terminators cannot appear in the extension.
const fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

impl fmt::Display for AnsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.generate())
    }
}

impl FromStr for AnsName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for AnsName {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl PartialOrd for AnsName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AnsName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.generate().cmp(&other.generate())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for AnsName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.generate())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for AnsName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_name() {
        let name = AnsName::parse("a2a://model1.ml-inference.acme.v1.prod").unwrap();

        assert_eq!(name.protocol(), "a2a");
        assert_eq!(name.agent_id(), "model1");
        assert_eq!(name.capability(), "ml-inference");
        assert_eq!(name.provider(), "acme");
        assert_eq!(name.version(), "1");
        assert_eq!(name.extension(), Some("prod"));
    }

    #[test]
    fn parse_without_extension() {
        let name = AnsName::parse("a2a://model1.ml-inference.acme.v2").unwrap();
        assert_eq!(name.version(), "2");
        assert!(name.extension().is_none());
    }

    #[test]
    fn extension_may_contain_dots() {
        let name = AnsName::parse("a2a://m.cap.acme.v1.eu.west.prod").unwrap();
        assert_eq!(name.extension(), Some("eu.west.prod"));
        assert_eq!(name.generate(), "a2a://m.cap.acme.v1.eu.west.prod");
    }

    #[test]
    fn dotted_version_spills_into_extension() {
        // The version segment ends at the next dot, so "v1.0.0" yields version "1"
        let name = AnsName::parse("a2a://m.cap.acme.v1.0.0").unwrap();
        assert_eq!(name.version(), "1");
        assert_eq!(name.extension(), Some("0.0"));
    }

    #[test]
    fn protocol_is_not_restricted_to_a2a() {
        let name = AnsName::parse("mcp://tool.search.acme.v3").unwrap();
        assert_eq!(name.protocol(), "mcp");
    }

    #[test]
    fn parse_empty_returns_error() {
        let result = AnsName::parse("");
        assert!(matches!(
            result,
            Err(ParseError {
                kind: ParseErrorKind::Empty,
                ..
            })
        ));
    }

    #[test]
    fn parse_long_name_round_trips() {
        let input = format!("a2a://agent.cap.acme.v1.{}", "e".repeat(600));
        let name = AnsName::parse(&input).unwrap();
        assert_eq!(name.extension().map(str::len), Some(600));
        assert_eq!(name.generate(), input);
    }

    #[test]
    fn parse_without_scheme_returns_error() {
        for input in ["model1.ml-inference.acme.v1", "a2a:/model1.cap.acme.v1"] {
            let result = AnsName::parse(input);
            assert!(
                matches!(
                    result,
                    Err(ParseError {
                        kind: ParseErrorKind::MissingScheme,
                        ..
                    })
                ),
                "{input} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn parse_empty_protocol_returns_error() {
        let result = AnsName::parse("://model1.cap.acme.v1");
        assert!(matches!(
            result,
            Err(ParseError {
                kind: ParseErrorKind::EmptyProtocol,
                ..
            })
        ));
    }

    #[test]
    fn parse_missing_segments_returns_error() {
        let result = AnsName::parse("a2a://model1.ml-inference.acme");
        assert!(matches!(
            result,
            Err(ParseError {
                kind: ParseErrorKind::MissingComponent {
                    component: "version"
                },
                ..
            })
        ));

        let result = AnsName::parse("a2a://model1..acme.v1");
        assert!(matches!(
            result,
            Err(ParseError {
                kind: ParseErrorKind::MissingComponent {
                    component: "capability"
                },
                ..
            })
        ));
    }

    #[test]
    fn parse_version_without_prefix_returns_error() {
        let result = AnsName::parse("a2a://model1.cap.acme.1");
        assert!(matches!(
            result,
            Err(ParseError {
                kind: ParseErrorKind::MissingVersionPrefix { .. },
                ..
            })
        ));
    }

    #[test]
    fn parse_bare_version_prefix_returns_error() {
        assert!(AnsName::parse("a2a://model1.cap.acme.v").is_err());
        assert!(AnsName::parse("a2a://model1.cap.acme.v.prod").is_err());
    }

    #[test]
    fn parse_trailing_dot_returns_error() {
        let result = AnsName::parse("a2a://model1.cap.acme.v1.");
        assert!(matches!(
            result,
            Err(ParseError {
                kind: ParseErrorKind::EmptyExtension,
                ..
            })
        ));
    }

    #[test]
    fn extension_rejects_newline() {
        assert!(AnsName::parse("a2a://model1.cap.acme.v1.pr\nod").is_err());
    }

    #[test]
    fn display_roundtrip() {
        let input = "a2a://model1.ml-inference.acme.v1.prod";
        let name = AnsName::parse(input).unwrap();
        assert_eq!(name.to_string(), input);
    }

    #[test]
    fn canonical_strips_extension() {
        let name = AnsName::parse("a2a://model1.ml-inference.acme.v1.prod").unwrap();
        assert_eq!(name.canonical(), "a2a://model1.ml-inference.acme.v1");
        assert_eq!(name.without_extension().generate(), name.canonical());
    }

    #[test]
    fn new_rejects_dots_in_segments() {
        let result = AnsName::new("a2a", "model1", "ml.inference", "acme", "1", None::<String>);
        assert!(matches!(
            result,
            Err(ParseError {
                kind: ParseErrorKind::InvalidChar {
                    char: '.',
                    component: "capability"
                },
                ..
            })
        ));
    }

    #[test]
    fn new_rejects_colon_in_protocol() {
        assert!(AnsName::new("a2a:x", "m", "c", "p", "1", None::<String>).is_err());
    }

    #[test]
    fn new_roundtrips_through_parse() {
        let name = AnsName::new("a2a", "model1", "ml-inference", "acme", "1", Some("prod")).unwrap();
        assert_eq!(AnsName::parse(&name.generate()).unwrap(), name);
    }

    #[test]
    fn with_extension_replaces_extension() {
        let name = AnsName::parse("a2a://model1.cap.acme.v1.dev").unwrap();
        let updated = name.with_extension("prod").unwrap();
        assert_eq!(updated.extension(), Some("prod"));
        assert!(name.with_extension("").is_err());
    }

    #[test]
    fn is_valid_matches_parse() {
        assert!(AnsName::is_valid("a2a://a.b.c.v1"));
        assert!(!AnsName::is_valid("a2a://a.b.c"));
    }
}
