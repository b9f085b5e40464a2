//! Transport settings for reaching a Kafka Connect cluster

use secrecy::SecretString;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Connection settings handed to [`crate::ConnectClient::new`]
#[derive(Debug)]
pub struct ClientConfig {
    /// Base URL of the Kafka Connect REST API, e.g. `http://localhost:8083`
    pub url: String,
    pub basic_auth: Option<BasicAuth>,
    pub tls: TlsConfig,
    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

#[derive(Debug)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

#[derive(Debug, Default)]
pub struct TlsConfig {
    /// PEM bundle of additional trusted roots
    pub root_ca_file: Option<PathBuf>,
    /// PEM client certificate, used together with `client_key_file`
    pub client_cert_file: Option<PathBuf>,
    pub client_key_file: Option<PathBuf>,
    /// Skip server certificate verification
    pub insecure: bool,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            basic_auth: None,
            tls: TlsConfig::default(),
            headers: BTreeMap::new(),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_basic_auth(mut self, username: impl Into<String>, password: SecretString) -> Self {
        self.basic_auth = Some(BasicAuth {
            username: username.into(),
            password,
        });
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
