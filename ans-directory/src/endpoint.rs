//! Network endpoint type for agent discovery.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Network endpoint for contacting an agent.
///
/// Endpoints are carried as submitted; the directory does not validate them.
///
/// # Examples
///
/// ```
/// use ans_directory::AgentEndpoint;
///
/// let https = AgentEndpoint::https("agent.example.com").with_port(8443).with_path("/v1");
/// assert_eq!(https.to_uri(), "https://agent.example.com:8443/v1");
///
/// let grpc = AgentEndpoint::grpc("agent.example.com");
/// assert_eq!(grpc.to_uri(), "grpc://agent.example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentEndpoint {
    /// Transport protocol (https, grpc, ws, etc.)
    pub protocol: String,
    /// Host name or IP address
    pub address: String,
    /// Optional port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Optional path prefix for routing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl AgentEndpoint {
    /// Creates a new endpoint with no port or path.
    #[must_use]
    pub fn new(protocol: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            address: address.into(),
            port: None,
            path: None,
        }
    }

    /// Creates an HTTPS endpoint.
    #[must_use]
    pub fn https(address: impl Into<String>) -> Self {
        Self::new("https", address)
    }

    /// Creates a gRPC endpoint.
    #[must_use]
    pub fn grpc(address: impl Into<String>) -> Self {
        Self::new("grpc", address)
    }

    /// Creates a WebSocket endpoint.
    #[must_use]
    pub fn websocket(address: impl Into<String>) -> Self {
        Self::new("ws", address)
    }

    /// Sets the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the path prefix.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the full URI representation.
    #[must_use]
    pub fn to_uri(&self) -> String {
        let mut uri = format!("{}://{}", self.protocol, self.address);
        if let Some(port) = self.port {
            uri.push(':');
            uri.push_str(&port.to_string());
        }
        if let Some(path) = &self.path {
            uri.push_str(path);
        }
        uri
    }
}

impl fmt::Display for AgentEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_protocol() {
        assert_eq!(AgentEndpoint::https("a").protocol, "https");
        assert_eq!(AgentEndpoint::grpc("a").protocol, "grpc");
        assert_eq!(AgentEndpoint::websocket("a").protocol, "ws");
    }

    #[test]
    fn to_uri_variants() {
        let bare = AgentEndpoint::https("example.com");
        assert_eq!(bare.to_uri(), "https://example.com");
        assert_eq!(bare.to_string(), bare.to_uri());

        let with_path = AgentEndpoint::https("example.com").with_path("/api");
        assert_eq!(with_path.to_uri(), "https://example.com/api");

        let with_port = AgentEndpoint::grpc("10.0.0.1").with_port(50051);
        assert_eq!(with_port.to_uri(), "grpc://10.0.0.1:50051");
    }

    #[test]
    fn serde_omits_absent_fields() {
        let json = serde_json::to_value(AgentEndpoint::https("example.com")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"protocol": "https", "address": "example.com"})
        );

        let parsed: AgentEndpoint = serde_json::from_str(
            r#"{"protocol":"https","address":"example.com","port":443,"path":"/v1"}"#,
        )
        .unwrap();
        assert_eq!(parsed.port, Some(443));
        assert_eq!(parsed.path.as_deref(), Some("/v1"));
    }
}
