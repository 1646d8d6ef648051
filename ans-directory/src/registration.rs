//! Registration records submitted to the directory.

use serde::{Deserialize, Serialize};

use crate::AgentMetadata;

/// A registration request and the record the directory keeps for it.
///
/// `ans_name` stays a string on the wire so that malformed names reach the
/// directory and are rejected there with a proper error.
///
/// `private_key` exists only for compatibility with older clients. The
/// directory drops it on receipt and it never appears in stored records.
///
/// # Examples
///
/// ```
/// use ans_directory::{AgentMetadata, AgentRegistration};
///
/// let registration = AgentRegistration::new(
///     "a2a://model1.ml-inference.acme.v1.prod",
///     AgentMetadata::new("Model 1", "1", "acme"),
///     "-----BEGIN CERTIFICATE-----\n...",
///     "-----BEGIN PUBLIC KEY-----\n...",
/// );
/// assert!(registration.private_key.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRegistration {
    /// The agent's name in canonical string form
    pub ans_name: String,
    /// Descriptive metadata
    pub metadata: AgentMetadata,
    /// Certificate PEM, issued by the directory's authority
    pub certificate: String,
    /// Public key PEM used to check capability proofs
    pub public_key: String,
    /// Legacy private key field; never stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl AgentRegistration {
    /// Creates a registration without a private key.
    #[must_use]
    pub fn new(
        ans_name: impl Into<String>,
        metadata: AgentMetadata,
        certificate: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Self {
        Self {
            ans_name: ans_name.into(),
            metadata,
            certificate: certificate.into(),
            public_key: public_key.into(),
            private_key: None,
        }
    }

    /// Attaches a private key, for registries that still expect one.
    #[must_use]
    pub fn with_private_key(mut self, private_key: impl Into<String>) -> Self {
        self.private_key = Some(private_key.into());
        self
    }

    /// Returns true if a private key was submitted.
    #[must_use]
    pub const fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// Returns this registration with the private key removed.
    #[must_use]
    pub fn without_private_key(mut self) -> Self {
        self.private_key = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> AgentRegistration {
        AgentRegistration::new("a2a://a.b.c.v1", AgentMetadata::new("a", "1", "c"), "cert", "key")
    }

    #[test]
    fn private_key_is_omitted_from_json() {
        let json = serde_json::to_value(registration()).unwrap();
        assert!(json.get("privateKey").is_none());
        assert_eq!(json["ansName"], "a2a://a.b.c.v1");
        assert_eq!(json["publicKey"], "key");
    }

    #[test]
    fn private_key_is_accepted_and_stripped() {
        let with_key = registration().with_private_key("secret");
        let json = serde_json::to_string(&with_key).unwrap();
        assert!(json.contains("privateKey"));

        let parsed: AgentRegistration = serde_json::from_str(&json).unwrap();
        assert!(parsed.has_private_key());
        assert!(!parsed.without_private_key().has_private_key());
    }
}
