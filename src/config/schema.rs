//! Configuration schema definitions.
//!
//! This module defines the server settings an application hands to the
//! launcher. All types derive Serde traits for deserialization from
//! `nightframe.toml` or the `[settings]` table of `app.toml`.

use serde::{Deserialize, Serialize};

/// Settings the server is started with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host or IP address to bind (e.g., "127.0.0.1").
    pub host: String,

    /// TCP port to bind; 0 picks an ephemeral port.
    pub port: u16,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Request timeout (total time to produce a response) in seconds.
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Time allowed for in-flight requests to drain on shutdown, in seconds.
    pub shutdown_timeout_secs: u64,

    /// Bind address of the Prometheus metrics endpoint; disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            tls: None,
            request_timeout_secs: 30,
            max_body_bytes: 2 * 1024 * 1024, // 2MB
            shutdown_timeout_secs: 10,
            metrics_address: None,
        }
    }
}

impl ServerSettings {
    /// Address string used for binding and logging.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply command line overrides on top of file-based settings.
    pub fn apply_overrides(&mut self, host: Option<&str>, port: Option<u16>) {
        if let Some(host) = host {
            self.host = host.to_string();
        }
        if let Some(port) = port {
            self.port = port;
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}
