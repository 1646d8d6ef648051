//! Registry client.

use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use ans_directory::{AgentMetadata, AgentRegistration};
use ans_name::{AnsName, DEFAULT_CAPABILITY, DEFAULT_PROTOCOL, SCHEME_SEPARATOR, VERSION_PREFIX};
use ans_trust::{CapabilityProof, Certificate, KeyPair, TokenIssuer, TrustError};

use crate::{ClientConfig, ClientError, ClientEvent};

/// Common name of the self-signed certificate a fresh client creates.
pub const SELF_SIGNED_COMMON_NAME: &str = "ans-agent";

const EVENT_CAPACITY: usize = 64;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct ResolveBody {
    metadata: AgentMetadata,
}

#[derive(Deserialize)]
struct AgentsBody {
    agents: Vec<AgentMetadata>,
}

#[derive(Deserialize)]
struct VerifyBody {
    verified: bool,
}

#[derive(Deserialize)]
struct CertificateBody {
    certificate: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest<'a> {
    ans_name: &'a str,
    capability: &'a str,
    proof: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CertificateRequest<'a> {
    agent_name: &'a str,
    public_key: &'a str,
}

/// Client for an Agent Name Service registry.
///
/// Holds the agent's key pair and certificate, signs a fresh bearer token
/// for every call, and publishes [`ClientEvent`]s.
///
/// # Examples
///
/// ```no_run
/// use ans_client::{AgentClient, ClientConfig};
/// use ans_directory::{AgentCapability, AgentMetadata};
///
/// # async fn run() -> Result<(), ans_client::ClientError> {
/// let mut client = AgentClient::new(ClientConfig::new("http://localhost:3000"))?;
/// client.enroll("model1").await?;
///
/// let metadata = AgentMetadata::new("model1", "1", "acme")
///     .with_capability(AgentCapability::new("ml-inference", "1.0"))
///     .with_environment("prod");
/// let registration = client.register_agent("model1", metadata).await?;
/// assert_eq!(registration.ans_name, "a2a://model1.ml-inference.acme.v1.prod");
/// # Ok(())
/// # }
/// ```
pub struct AgentClient {
    config: ClientConfig,
    http: Client,
    registry_url: Url,
    key_pair: KeyPair,
    issuer: TokenIssuer,
    events: broadcast::Sender<ClientEvent>,
}

impl AgentClient {
    /// Creates a client.
    ///
    /// Loads the identity from the configuration when both certificate and
    /// key are given; otherwise generates a key pair and a self-signed
    /// certificate.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` for an unusable registry URL,
    /// `ClientError::Trust` if the configured identity cannot be loaded or
    /// its key does not match its certificate, or `ClientError::Transport`
    /// if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let registry_url = Url::parse(&config.registry_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ClientError::InvalidUrl(config.registry_url.clone()))?;

        let (key_pair, certificate) = Self::load_identity(&config)?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Transport)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            issuer: TokenIssuer::new(key_pair.clone(), certificate),
            key_pair,
            config,
            http,
            registry_url,
            events,
        })
    }

    fn load_identity(config: &ClientConfig) -> Result<(KeyPair, Certificate), ClientError> {
        match (&config.agent_cert, &config.agent_key) {
            (Some(cert_pem), Some(key_pem)) => {
                let key_pair = KeyPair::from_private_key_pem(key_pem)?;
                let certificate = Certificate::from_pem(cert_pem)?;
                if certificate.public_key()? != key_pair.verifying_key() {
                    return Err(TrustError::KeyMismatch.into());
                }
                Ok((key_pair, certificate))
            }
            (cert, key) => {
                if cert.is_some() || key.is_some() {
                    tracing::warn!("agent certificate and key must both be set; generating a new identity");
                }
                let key_pair = KeyPair::generate();
                let certificate = Certificate::self_signed(&key_pair, SELF_SIGNED_COMMON_NAME)?;
                Ok((key_pair, certificate))
            }
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the agent's certificate PEM.
    #[must_use]
    pub fn certificate_pem(&self) -> &str {
        self.issuer.certificate().to_pem()
    }

    /// Returns the agent's public key PEM.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Trust` if encoding fails.
    pub fn public_key_pem(&self) -> Result<String, ClientError> {
        Ok(self.key_pair.public_key_pem()?)
    }

    /// Subscribes to client events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }

    /// Builds the name an agent would register under.
    ///
    /// The components are joined as
    /// `a2a://<agent_id>.<capability>.<provider>.v<version>[.<environment>]`
    /// and the result is parsed. The capability is the first declared one,
    /// or `general`. A dotted version spills into the extension, so version
    /// `2.1.0` in `prod` parses as version `2` with extension `1.0.prod`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Name` if the joined string is not a valid name,
    /// e.g. an empty provider or a dot in the agent ID.
    pub fn ans_name_for(agent_id: &str, metadata: &AgentMetadata) -> Result<AnsName, ClientError> {
        let capability = metadata
            .primary_capability()
            .map_or(DEFAULT_CAPABILITY, |c| c.name.as_str());

        let mut name = format!(
            "{DEFAULT_PROTOCOL}{SCHEME_SEPARATOR}{agent_id}.{capability}.{}.{VERSION_PREFIX}{}",
            metadata.provider, metadata.version
        );
        if !metadata.environment.is_empty() {
            name.push('.');
            name.push_str(&metadata.environment);
        }

        Ok(AnsName::parse(&name)?)
    }

    /// Registers this agent.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Operation` wrapping the cause. A
    /// [`ClientEvent::Error`] is published as well.
    pub async fn register_agent(
        &self,
        agent_id: &str,
        metadata: AgentMetadata,
    ) -> Result<AgentRegistration, ClientError> {
        let result = self.try_register(agent_id, metadata).await;
        match &result {
            Ok(registration) => {
                tracing::info!(ans_name = %registration.ans_name, "agent registered");
                self.publish(ClientEvent::Registered {
                    ans_name: registration.ans_name.clone(),
                    metadata: registration.metadata.clone(),
                });
            }
            Err(error) => self.publish_error("register", error),
        }
        result.map_err(|e| e.during("register", agent_id))
    }

    async fn try_register(
        &self,
        agent_id: &str,
        metadata: AgentMetadata,
    ) -> Result<AgentRegistration, ClientError> {
        let ans_name = Self::ans_name_for(agent_id, &metadata)?;
        let mut registration = AgentRegistration::new(
            ans_name.to_string(),
            metadata,
            self.certificate_pem(),
            self.public_key_pem()?,
        );
        if self.config.include_private_key {
            registration = registration.with_private_key(self.key_pair.private_key_pem()?);
        }

        let url = self.endpoint(&["api", "v1", "agents"])?;
        let request = self.http.post(url).json(&registration);
        let response = self.send(request).await?;
        Self::check(response).await?;

        Ok(registration.without_private_key())
    }

    /// Resolves an agent by exact name.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Operation`; the inner error is a 404 status for
    /// unknown agents.
    pub async fn resolve_agent(&self, ans_name: &str) -> Result<AgentMetadata, ClientError> {
        let result = self.fetch_metadata(ans_name).await;
        self.observe("resolve", ans_name, result)
    }

    async fn fetch_metadata(&self, ans_name: &str) -> Result<AgentMetadata, ClientError> {
        let url = self.endpoint(&["api", "v1", "agents", ans_name])?;
        let body: ResolveBody = self.get_json(url).await?;
        Ok(body.metadata)
    }

    /// Finds agents that declare `capability`, optionally from one provider.
    ///
    /// Returns an empty vector when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Operation` wrapping the cause.
    pub async fn discover_agents(
        &self,
        capability: &str,
        provider: Option<&str>,
    ) -> Result<Vec<AgentMetadata>, ClientError> {
        let result = self.fetch_agents(Some(capability), provider).await;
        self.observe("discover", capability, result)
    }

    /// Lists every registered agent.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Operation` wrapping the cause.
    pub async fn list_agents(&self) -> Result<Vec<AgentMetadata>, ClientError> {
        let result = self.fetch_agents(None, None).await;
        self.observe("list", "agents", result)
    }

    async fn fetch_agents(
        &self,
        capability: Option<&str>,
        provider: Option<&str>,
    ) -> Result<Vec<AgentMetadata>, ClientError> {
        let mut url = self.endpoint(&["api", "v1", "agents"])?;
        if let Some(capability) = capability {
            let mut query = url.query_pairs_mut();
            query.append_pair("capability", capability);
            if let Some(provider) = provider {
                query.append_pair("provider", provider);
            }
        }
        let body: AgentsBody = self.get_json(url).await?;
        Ok(body.agents)
    }

    /// Removes a registration. Returns false if the agent was unknown.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Operation` for any failure other than 404.
    pub async fn remove_agent(&self, ans_name: &str) -> Result<bool, ClientError> {
        let result = self.try_remove(ans_name).await;
        self.observe("remove", ans_name, result)
    }

    async fn try_remove(&self, ans_name: &str) -> Result<bool, ClientError> {
        let url = self.endpoint(&["api", "v1", "agents", ans_name])?;
        let response = self.send(self.http.delete(url)).await?;
        match Self::check(response).await {
            Ok(_) => Ok(true),
            Err(error) if error.is_not_found() => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Checks whether `ans_name` holds `capability`, backed by a proof
    /// signed with this client's key.
    ///
    /// Returns false on any failure. Transport failures are logged as
    /// warnings, everything else at debug level.
    pub async fn verify_capability(&self, ans_name: &str, capability: &str) -> bool {
        match self.try_verify(ans_name, capability).await {
            Ok(verified) => verified,
            Err(error) if error.is_transport() => {
                tracing::warn!(
                    ans_name = %ans_name,
                    capability = %capability,
                    error = %error,
                    "capability verification failed: registry unreachable"
                );
                false
            }
            Err(error) => {
                tracing::debug!(
                    ans_name = %ans_name,
                    capability = %capability,
                    error = %error,
                    "capability not verified"
                );
                false
            }
        }
    }

    async fn try_verify(&self, ans_name: &str, capability: &str) -> Result<bool, ClientError> {
        let metadata = self.fetch_metadata(ans_name).await?;
        if !metadata.has_capability(capability) {
            return Ok(false);
        }

        let proof = CapabilityProof::generate(capability, &self.key_pair)?;
        let url = self.endpoint(&["api", "v1", "verify"])?;
        let request = self.http.post(url).json(&VerifyRequest {
            ans_name,
            capability,
            proof: &proof,
        });
        let response = self.send(request).await?;
        let body: VerifyBody = Self::decode(Self::check(response).await?).await?;
        Ok(body.verified)
    }

    /// Obtains a CA-issued certificate for this client's key and adopts it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Operation` if the request fails or the returned
    /// certificate does not carry this client's key. With a configured CA,
    /// the certificate must also name it as issuer and carry its signature.
    pub async fn enroll(&mut self, agent_name: &str) -> Result<Certificate, ClientError> {
        let result = self.try_enroll(agent_name).await;
        let certificate = self.observe("enroll", agent_name, result)?;

        self.issuer = TokenIssuer::new(self.key_pair.clone(), certificate.clone());
        tracing::info!(
            agent_name = %agent_name,
            issuer = %certificate.issuer_common_name(),
            "enrolled with registry CA"
        );
        Ok(certificate)
    }

    async fn try_enroll(&self, agent_name: &str) -> Result<Certificate, ClientError> {
        let public_key = self.public_key_pem()?;
        let url = self.endpoint(&["api", "v1", "certificates"])?;
        let request = self.http.post(url).json(&CertificateRequest {
            agent_name,
            public_key: &public_key,
        });
        let response = self.send(request).await?;
        let body: CertificateBody = Self::decode(Self::check(response).await?).await?;

        let certificate = Certificate::from_pem(&body.certificate)?;
        if certificate.public_key()? != self.key_pair.verifying_key() {
            return Err(TrustError::KeyMismatch.into());
        }
        if let Some(ca_pem) = &self.config.ca_cert {
            let ca = Certificate::from_pem(ca_pem)?;
            if certificate.issuer_common_name() != ca.subject_common_name() {
                return Err(TrustError::UntrustedCertificate {
                    reason: format!(
                        "issued by '{}', expected '{}'",
                        certificate.issuer_common_name(),
                        ca.subject_common_name()
                    ),
                }
                .into());
            }
            certificate.verify_signed_by(&ca)?;
        }
        Ok(certificate)
    }

    /// Fetches the registry's CA certificate PEM. No token is sent.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Operation` wrapping the cause.
    pub async fn fetch_ca_certificate(&self) -> Result<String, ClientError> {
        let result = self.try_fetch_ca().await;
        self.observe("fetch", "CA certificate", result)
    }

    async fn try_fetch_ca(&self) -> Result<String, ClientError> {
        let url = self.endpoint(&["api", "v1", "ca"])?;
        let response = self.http.get(url).send().await?;
        let body: CertificateBody = Self::decode(Self::check(response).await?).await?;
        Ok(body.certificate)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.registry_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.config.registry_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ClientError> {
        let token = self.issuer.issue()?;
        Ok(request.bearer_auth(token).send().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        let response = self.send(self.http.get(url)).await?;
        Self::decode(Self::check(response).await?).await
    }

    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .unwrap_or(text);
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    fn observe<T>(
        &self,
        operation: &'static str,
        target: &str,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        result.map_err(|error| {
            self.publish_error(operation, &error);
            error.during(operation, target)
        })
    }

    fn publish_error(&self, operation: &'static str, error: &ClientError) {
        tracing::debug!(operation, error = %error, "registry operation failed");
        self.publish(ClientEvent::Error {
            operation,
            message: error.to_string(),
        });
    }

    fn publish(&self, event: ClientEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for AgentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentClient")
            .field("registry_url", &self.registry_url.as_str())
            .field("certificate", &self.issuer.certificate().subject_common_name())
            .finish_non_exhaustive()
    }
}
