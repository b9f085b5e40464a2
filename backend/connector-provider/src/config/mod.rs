use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use connect_client::{BasicAuth, ClientConfig, TlsConfig};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, Result};

pub const ENV_PREFIX: &str = "KAFKA_CONNECT";

const INSECURE_ENV: &str = "KAFKA_CONNECT_TLS_AUTH_IS_INSECURE";
/// Older name for `INSECURE_ENV`, still honoured when the new one is unset
const LEGACY_INSECURE_ENV: &str = "KAFKA_CONNECT_TLS_IS_INSECURE";

/// Transport settings for reaching the Kafka Connect cluster
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    // Cluster endpoint
    #[serde(default)]
    pub url: String,

    // Basic auth, applied only when both are non-empty
    #[serde(default)]
    pub basic_auth_username: Option<String>,
    #[serde(default)]
    pub basic_auth_password: Option<SecretString>,

    // TLS
    #[serde(default)]
    pub tls_root_ca_file: Option<PathBuf>,
    #[serde(default)]
    pub tls_auth_crt: Option<PathBuf>,
    #[serde(default)]
    pub tls_auth_key: Option<PathBuf>,
    pub tls_auth_is_insecure: bool,

    /// Static headers sent with every request (file only)
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    pub request_timeout_secs: u64,
}

impl ProviderConfig {
    /// Load defaults, then `path` if given, then `KAFKA_CONNECT_*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder()
            .set_default("request_timeout_secs", 30)?
            .set_default("tls_auth_is_insecure", false)?;

        if let Some(path) = path {
            debug!(path = %path.display(), "Reading provider configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));

        if std::env::var_os(INSECURE_ENV).is_none() {
            if let Ok(legacy) = std::env::var(LEGACY_INSECURE_ENV) {
                if !legacy.is_empty() {
                    debug!("Using {} for tls_auth_is_insecure", LEGACY_INSECURE_ENV);
                    builder = builder.set_override("tls_auth_is_insecure", legacy)?;
                }
            }
        }

        let config: Self = builder.build()?.try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(ProviderError::Config(format!(
                "url is required (set {}_URL)",
                ENV_PREFIX
            )));
        }

        let parsed = url::Url::parse(&self.url)
            .map_err(|e| ProviderError::Config(format!("invalid url {:?}: {}", self.url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProviderError::Config(format!(
                "url must use http or https, got {}",
                parsed.scheme()
            )));
        }

        if self.tls_auth_crt.is_some() != self.tls_auth_key.is_some() {
            return Err(ProviderError::Config(
                "tls_auth_crt and tls_auth_key must be set together".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ProviderError::Config(
                "request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// `url` with any userinfo password removed, for logging
    pub fn display_url(&self) -> String {
        match url::Url::parse(&self.url) {
            Ok(mut parsed) => {
                if parsed.password().is_some() && parsed.set_password(None).is_err() {
                    return "<redacted>".to_string();
                }
                parsed.to_string()
            }
            Err(_) => "<invalid url>".to_string(),
        }
    }

    pub fn into_client_config(self) -> ClientConfig {
        let basic_auth = match (self.basic_auth_username, self.basic_auth_password) {
            (Some(username), Some(password))
                if !username.is_empty() && !password.expose_secret().is_empty() =>
            {
                Some(BasicAuth { username, password })
            }
            _ => None,
        };

        ClientConfig {
            url: self.url,
            basic_auth,
            tls: TlsConfig {
                root_ca_file: self.tls_root_ca_file,
                client_cert_file: self.tls_auth_crt,
                client_key_file: self.tls_auth_key,
                insecure: self.tls_auth_is_insecure,
            },
            headers: self.headers,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
