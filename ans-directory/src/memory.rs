//! In-memory directory implementation.

use std::collections::HashSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use ans_name::AnsName;
use ans_trust::{CapabilityProof, TrustAuthority, TrustError, VerifyingKey};
use indexmap::IndexMap;
use tokio::sync::broadcast;

use crate::{
    AgentMetadata, AgentRegistration, Directory, DirectoryConfig, DirectoryError, DirectoryEvent,
    DirectoryStats,
};

type Registrations = IndexMap<String, AgentRegistration>;

/// In-memory directory.
///
/// Registrations live in an insertion-ordered map keyed by the exact name
/// string. Overwriting a name keeps its original position.
///
/// # Thread Safety
///
/// Uses `RwLock` for interior mutability, allowing concurrent reads
/// and exclusive writes. A poisoned lock surfaces as
/// `DirectoryError::Internal` rather than a panic.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use ans_directory::{AgentCapability, AgentMetadata, AgentRegistration, Directory, InMemoryDirectory};
/// use ans_trust::{KeyPair, TrustAuthority};
///
/// let authority = Arc::new(TrustAuthority::generate().unwrap());
/// let directory = InMemoryDirectory::new(Arc::clone(&authority));
///
/// let key_pair = KeyPair::generate();
/// let public_key = key_pair.public_key_pem().unwrap();
/// let name = "a2a://model1.ml-inference.acme.v1.prod";
/// let certificate = authority.issue_certificate(name, &public_key).unwrap();
///
/// let metadata = AgentMetadata::new("Model 1", "1", "acme")
///     .with_capability(AgentCapability::new("ml-inference", "1.0"));
/// directory
///     .register(AgentRegistration::new(name, metadata, certificate, public_key))
///     .unwrap();
///
/// assert_eq!(directory.discover("ml-inference", None).unwrap().len(), 1);
/// ```
pub struct InMemoryDirectory {
    registrations: RwLock<Registrations>,
    authority: Arc<TrustAuthority>,
    events: broadcast::Sender<DirectoryEvent>,
    config: DirectoryConfig,
}

impl InMemoryDirectory {
    /// Creates an empty directory with default configuration.
    #[must_use]
    pub fn new(authority: Arc<TrustAuthority>) -> Self {
        Self::with_config(authority, DirectoryConfig::default())
    }

    /// Creates an empty directory with the given configuration.
    #[must_use]
    pub fn with_config(authority: Arc<TrustAuthority>, config: DirectoryConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            registrations: RwLock::new(IndexMap::new()),
            authority,
            events,
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Returns the authority that vouches for registered certificates.
    #[must_use]
    pub fn authority(&self) -> &Arc<TrustAuthority> {
        &self.authority
    }

    /// Subscribes to registration and removal events.
    ///
    /// Only events published after this call are received.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DirectoryEvent> {
        self.events.subscribe()
    }

    /// Returns the number of registered agents.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Internal` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, DirectoryError> {
        Ok(self.read()?.len())
    }

    /// Returns true if no agents are registered.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Internal` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, DirectoryError> {
        Ok(self.read()?.is_empty())
    }

    /// Returns the stored registration, without its private key.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::NotFound` if the agent is not registered.
    pub fn get(&self, ans_name: &str) -> Result<AgentRegistration, DirectoryError> {
        self.read()?
            .get(ans_name)
            .cloned()
            .ok_or_else(|| DirectoryError::not_found(ans_name))
    }

    /// The certificate must chain to the CA, must not be the CA itself, and
    /// must carry the registration's public key.
    fn check_binding(&self, registration: &AgentRegistration) -> Result<(), TrustError> {
        let certificate = self.authority.check_certificate(&registration.certificate)?;

        if certificate.subject_common_name() == self.authority.ca_common_name() {
            return Err(TrustError::UntrustedCertificate {
                reason: "the CA certificate cannot identify an agent".to_string(),
            });
        }

        let public_key = VerifyingKey::from_public_key_pem(&registration.public_key)?;
        if certificate.public_key()? != public_key {
            return Err(TrustError::KeyMismatch);
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Registrations>, DirectoryError> {
        self.registrations
            .read()
            .map_err(|_| DirectoryError::internal("registration lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Registrations>, DirectoryError> {
        self.registrations
            .write()
            .map_err(|_| DirectoryError::internal("registration lock poisoned"))
    }

    fn publish(&self, event: DirectoryEvent) {
        if let Err(broadcast::error::SendError(event)) = self.events.send(event) {
            tracing::debug!(ans_name = event.ans_name(), "no directory event subscribers");
        }
    }
}

impl Directory for InMemoryDirectory {
    fn register(&self, registration: AgentRegistration) -> Result<AnsName, DirectoryError> {
        let name = AnsName::parse(&registration.ans_name)
            .map_err(|e| DirectoryError::invalid_name(&e))?;

        self.check_binding(&registration)
            .map_err(|e| DirectoryError::untrusted(&registration.ans_name, &e))?;

        if registration.has_private_key() {
            tracing::warn!(
                ans_name = %registration.ans_name,
                "registration carried a private key; it was discarded"
            );
        }
        let registration = registration.without_private_key();
        let ans_name = registration.ans_name.clone();
        let metadata = registration.metadata.clone();

        {
            let mut registrations = self.write()?;
            if let Some(max) = self.config.max_registrations
                && !registrations.contains_key(&ans_name)
                && registrations.len() >= max
            {
                return Err(DirectoryError::CapacityExceeded { max });
            }
            // Overwrite keeps the original index
            registrations.insert(ans_name.clone(), registration);
        }

        tracing::info!(ans_name = %ans_name, "agent registered");
        self.publish(DirectoryEvent::Registered { ans_name, metadata });

        Ok(name)
    }

    fn resolve(&self, ans_name: &str) -> Result<AgentMetadata, DirectoryError> {
        self.read()?
            .get(ans_name)
            .map(|r| r.metadata.clone())
            .ok_or_else(|| DirectoryError::not_found(ans_name))
    }

    fn discover(
        &self,
        capability: &str,
        provider: Option<&str>,
    ) -> Result<Vec<AgentMetadata>, DirectoryError> {
        let registrations = self.read()?;
        Ok(registrations
            .values()
            .map(|r| &r.metadata)
            .filter(|m| m.has_capability(capability))
            .filter(|m| provider.is_none_or(|p| m.provider == p))
            .cloned()
            .collect())
    }

    fn verify_capability(
        &self,
        ans_name: &str,
        capability: &str,
        proof: &str,
    ) -> Result<bool, DirectoryError> {
        let registration = self.get(ans_name)?;

        if !registration.metadata.has_capability(capability) {
            return Ok(false);
        }

        Ok(CapabilityProof::verify_with_pem(
            capability,
            proof,
            &registration.public_key,
        ))
    }

    fn list_agents(&self) -> Result<Vec<AgentMetadata>, DirectoryError> {
        Ok(self
            .read()?
            .values()
            .map(|r| r.metadata.clone())
            .collect())
    }

    fn remove(&self, ans_name: &str) -> Result<bool, DirectoryError> {
        let removed = self.write()?.shift_remove(ans_name).is_some();

        if removed {
            tracing::info!(ans_name = %ans_name, "agent removed");
            self.publish(DirectoryEvent::Removed {
                ans_name: ans_name.to_string(),
            });
        }
        Ok(removed)
    }

    fn issue_certificate(
        &self,
        agent_name: &str,
        public_key_pem: &str,
    ) -> Result<String, DirectoryError> {
        let certificate = self.authority.issue_certificate(agent_name, public_key_pem)?;
        tracing::info!(agent_name = %agent_name, "certificate issued");
        Ok(certificate)
    }

    fn stats(&self) -> Result<DirectoryStats, DirectoryError> {
        let registrations = self.read()?;

        let providers: HashSet<&str> = registrations
            .values()
            .map(|r| r.metadata.provider.as_str())
            .collect();
        let capabilities: HashSet<&str> = registrations
            .values()
            .flat_map(|r| r.metadata.capabilities.iter().map(|c| c.name.as_str()))
            .collect();

        Ok(DirectoryStats {
            total_registrations: registrations.len(),
            unique_providers: providers.len(),
            unique_capabilities: capabilities.len(),
            subscribers: self.events.receiver_count(),
        })
    }

    fn ca_certificate(&self) -> String {
        self.authority.ca_certificate_pem().to_string()
    }
}

impl std::fmt::Debug for InMemoryDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDirectory")
            .field("config", &self.config)
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ans_trust::KeyPair;

    use super::*;
    use crate::AgentCapability;

    struct Fixture {
        authority: Arc<TrustAuthority>,
        directory: InMemoryDirectory,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_config(DirectoryConfig::default())
        }

        fn with_config(config: DirectoryConfig) -> Self {
            let authority = Arc::new(TrustAuthority::generate().unwrap());
            let directory = InMemoryDirectory::with_config(Arc::clone(&authority), config);
            Self {
                authority,
                directory,
            }
        }

        fn registration(
            &self,
            name: &str,
            capabilities: &[&str],
            provider: &str,
        ) -> (AgentRegistration, KeyPair) {
            let key_pair = KeyPair::generate();
            let public_key = key_pair.public_key_pem().unwrap();
            let certificate = self.authority.issue_certificate(name, &public_key).unwrap();
            let metadata = capabilities.iter().fold(
                AgentMetadata::new(name, "1", provider),
                |m, c| m.with_capability(AgentCapability::new(*c, "1.0")),
            );
            (
                AgentRegistration::new(name, metadata, certificate, public_key),
                key_pair,
            )
        }
    }

    #[test]
    fn register_and_resolve() {
        let fx = Fixture::new();
        let (registration, _) = fx.registration("a2a://a.chat.acme.v1", &["chat"], "acme");

        let name = fx.directory.register(registration.clone()).unwrap();

        assert_eq!(name.agent_id(), "a");
        assert_eq!(
            fx.directory.resolve("a2a://a.chat.acme.v1").unwrap(),
            registration.metadata
        );
        assert_eq!(fx.directory.len().unwrap(), 1);
    }

    #[test]
    fn invalid_name_is_rejected() {
        let fx = Fixture::new();
        let (mut registration, _) = fx.registration("a2a://a.chat.acme.v1", &["chat"], "acme");
        registration.ans_name = "invalid-name".to_string();

        let err = fx.directory.register(registration).unwrap_err();

        assert!(matches!(err, DirectoryError::InvalidName { .. }));
        assert!(fx.directory.is_empty().unwrap());
    }

    #[test]
    fn untrusted_certificate_is_rejected() {
        let fx = Fixture::new();
        let (mut registration, _) = fx.registration("a2a://a.chat.acme.v1", &["chat"], "acme");
        registration.certificate = "invalid-cert".to_string();

        let err = fx.directory.register(registration).unwrap_err();

        assert!(matches!(err, DirectoryError::UntrustedCertificate { .. }));
        assert!(fx.directory.is_empty().unwrap());
    }

    #[test]
    fn ca_certificate_cannot_be_registered() {
        let fx = Fixture::new();
        let intruder = KeyPair::generate();
        let (mut registration, _) = fx.registration("a2a://a.chat.acme.v1", &["chat"], "acme");
        registration.certificate = fx.authority.ca_certificate_pem().to_string();
        registration.public_key = intruder.public_key_pem().unwrap();

        let err = fx.directory.register(registration).unwrap_err();

        assert!(matches!(err, DirectoryError::UntrustedCertificate { .. }));
        assert!(fx.directory.is_empty().unwrap());
    }

    #[test]
    fn public_key_must_match_certificate() {
        let fx = Fixture::new();
        let (mut registration, _) = fx.registration("a2a://a.chat.acme.v1", &["chat"], "acme");
        let other = KeyPair::generate();
        registration.public_key = other.public_key_pem().unwrap();

        let err = fx.directory.register(registration).unwrap_err();

        assert!(matches!(err, DirectoryError::UntrustedCertificate { .. }));
        assert!(err.to_string().contains("a2a://a.chat.acme.v1"));

        let proof = CapabilityProof::generate("chat", &other).unwrap();
        assert!(matches!(
            fx.directory.verify_capability("a2a://a.chat.acme.v1", "chat", &proof),
            Err(DirectoryError::NotFound { .. })
        ));
    }

    #[test]
    fn malformed_public_key_is_untrusted() {
        let fx = Fixture::new();
        let (mut registration, _) = fx.registration("a2a://a.chat.acme.v1", &["chat"], "acme");
        registration.public_key = "not a key".to_string();

        assert!(matches!(
            fx.directory.register(registration),
            Err(DirectoryError::UntrustedCertificate { .. })
        ));
    }

    #[test]
    fn private_key_is_never_stored() {
        let fx = Fixture::new();
        let (registration, _) = fx.registration("a2a://a.chat.acme.v1", &["chat"], "acme");

        fx.directory
            .register(registration.with_private_key("secret"))
            .unwrap();

        assert!(
            !fx.directory
                .get("a2a://a.chat.acme.v1")
                .unwrap()
                .has_private_key()
        );
    }

    #[test]
    fn overwrite_keeps_position() {
        let fx = Fixture::new();
        for name in ["a2a://a.chat.acme.v1", "a2a://b.chat.acme.v1"] {
            let (registration, _) = fx.registration(name, &["chat"], "acme");
            fx.directory.register(registration).unwrap();
        }

        let (mut replacement, _) = fx.registration("a2a://a.chat.acme.v1", &["chat"], "acme");
        replacement.metadata.version = "2".to_string();
        fx.directory.register(replacement).unwrap();

        let listed = fx.directory.list_agents().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "a2a://a.chat.acme.v1");
        assert_eq!(listed[0].version, "2");
    }

    #[test]
    fn resolve_unknown_is_not_found() {
        let fx = Fixture::new();
        let err = fx.directory.resolve("a2a://missing.x.y.v1").unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("a2a://missing.x.y.v1"));
    }

    #[test]
    fn discover_filters_by_capability_and_provider() {
        let fx = Fixture::new();
        for (name, caps, provider) in [
            ("a2a://a.chat.acme.v1", &["chat"][..], "acme"),
            ("a2a://b.vision.acme.v1", &["vision", "chat"][..], "acme"),
            ("a2a://c.chat.other.v1", &["chat"][..], "other"),
        ] {
            let (registration, _) = fx.registration(name, caps, provider);
            fx.directory.register(registration).unwrap();
        }

        let chat = fx.directory.discover("chat", None).unwrap();
        assert_eq!(chat.len(), 3);

        let acme_chat = fx.directory.discover("chat", Some("acme")).unwrap();
        let names: Vec<_> = acme_chat.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["a2a://a.chat.acme.v1", "a2a://b.vision.acme.v1"]);

        assert!(fx.directory.discover("Chat", None).unwrap().is_empty());
        assert!(fx.directory.discover("chat", Some("nobody")).unwrap().is_empty());
    }

    #[test]
    fn verify_capability_paths() {
        let fx = Fixture::new();
        let (registration, key_pair) =
            fx.registration("a2a://a.chat.acme.v1", &["chat"], "acme");
        fx.directory.register(registration).unwrap();

        let good = CapabilityProof::generate("chat", &key_pair).unwrap();
        let foreign = CapabilityProof::generate("chat", &KeyPair::generate()).unwrap();
        let undeclared = CapabilityProof::generate("vision", &key_pair).unwrap();

        let verify = |cap, proof| {
            fx.directory
                .verify_capability("a2a://a.chat.acme.v1", cap, proof)
                .unwrap()
        };
        assert!(verify("chat", &good));
        assert!(!verify("chat", &foreign));
        assert!(!verify("vision", &undeclared));
        assert!(!verify("chat", "invalid-proof"));

        assert!(
            fx.directory
                .verify_capability("a2a://missing.x.y.v1", "chat", &good)
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn remove_reports_existence() {
        let fx = Fixture::new();
        let (registration, _) = fx.registration("a2a://a.chat.acme.v1", &["chat"], "acme");
        fx.directory.register(registration).unwrap();

        assert!(fx.directory.remove("a2a://a.chat.acme.v1").unwrap());
        assert!(!fx.directory.remove("a2a://a.chat.acme.v1").unwrap());
        assert!(fx.directory.resolve("a2a://a.chat.acme.v1").is_err());
    }

    #[test]
    fn capacity_applies_to_new_names_only() {
        let fx = Fixture::with_config(DirectoryConfig::new().with_max_registrations(1));
        let (first, _) = fx.registration("a2a://a.chat.acme.v1", &["chat"], "acme");
        let (second, _) = fx.registration("a2a://b.chat.acme.v1", &["chat"], "acme");

        fx.directory.register(first.clone()).unwrap();
        assert_eq!(
            fx.directory.register(second).unwrap_err(),
            DirectoryError::CapacityExceeded { max: 1 }
        );
        assert!(fx.directory.register(first).is_ok());
    }

    #[test]
    fn events_are_published() {
        let fx = Fixture::new();
        let mut events = fx.directory.subscribe();
        let (registration, _) = fx.registration("a2a://a.chat.acme.v1", &["chat"], "acme");

        fx.directory.register(registration.clone()).unwrap();
        fx.directory.remove("a2a://a.chat.acme.v1").unwrap();
        fx.directory.remove("a2a://a.chat.acme.v1").unwrap();

        assert_eq!(
            events.try_recv().unwrap(),
            DirectoryEvent::Registered {
                ans_name: "a2a://a.chat.acme.v1".to_string(),
                metadata: registration.metadata,
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            DirectoryEvent::Removed {
                ans_name: "a2a://a.chat.acme.v1".to_string(),
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn issue_certificate_delegates_to_authority() {
        let fx = Fixture::new();
        let public_key = KeyPair::generate().public_key_pem().unwrap();

        let pem = fx.directory.issue_certificate("agent-1", &public_key).unwrap();

        assert!(fx.authority.verify_certificate(&pem));
        assert!(matches!(
            fx.directory.issue_certificate("agent-1", "not a key"),
            Err(DirectoryError::InvalidKey { .. })
        ));
    }

    #[test]
    fn stats_counts_distinct_values() {
        let fx = Fixture::new();
        for (name, caps, provider) in [
            ("a2a://a.chat.acme.v1", &["chat"][..], "acme"),
            ("a2a://b.vision.acme.v1", &["vision", "chat"][..], "acme"),
            ("a2a://c.chat.other.v1", &["chat"][..], "other"),
        ] {
            let (registration, _) = fx.registration(name, caps, provider);
            fx.directory.register(registration).unwrap();
        }
        let _rx = fx.directory.subscribe();

        let stats = fx.directory.stats().unwrap();
        assert_eq!(stats.total_registrations(), 3);
        assert_eq!(stats.unique_providers(), 2);
        assert_eq!(stats.unique_capabilities(), 2);
        assert_eq!(stats.subscribers, 1);
    }
}
