use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::{ConnectError, Result};
use crate::models::*;

/// Operations the connector lifecycle needs from a Kafka Connect cluster.
///
/// Every method issues exactly one HTTP request. Lookups return `Ok(None)`
/// when the cluster answers 404.
#[async_trait]
pub trait ConnectApi: Send + Sync {
    /// GET /connectors
    async fn list_connectors(&self) -> Result<Vec<String>>;

    /// GET /connectors/{name}
    async fn get_connector(&self, name: &str) -> Result<Option<ConnectorInfo>>;

    /// POST /connectors with the full configuration
    async fn create_connector(&self, name: &str, config: &ConnectorConfig)
        -> Result<ConnectorInfo>;

    /// PUT /connectors/{name}/config, replacing the whole configuration
    async fn update_connector(&self, name: &str, config: &ConnectorConfig)
        -> Result<ConnectorInfo>;

    /// DELETE /connectors/{name}
    async fn delete_connector(&self, name: &str) -> Result<()>;

    /// GET /connectors/{name}/config
    async fn get_connector_config(&self, name: &str) -> Result<Option<ConnectorConfig>>;

    /// GET /connectors/{name}/status
    async fn get_connector_status(&self, name: &str) -> Result<Option<ConnectorStatus>>;

    /// True when the remote config equals `config` with `name` forced to the
    /// connector name. An absent connector is never up to date.
    async fn is_up_to_date(&self, name: &str, config: &ConnectorConfig) -> Result<bool>;
}

/// Kafka Connect REST client
///
/// Holds one pooled `reqwest::Client` configured with the cluster's TLS and
/// header settings.
pub struct ConnectClient {
    http_client: reqwest::Client,
    base_url: String,
    basic_auth: Option<(String, SecretString)>,
}

impl ConnectClient {
    /// Build a client from transport settings.
    ///
    /// Fails with [`ConnectError::Config`] when the URL, headers or TLS
    /// material are unusable.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = normalize_base_url(&config.url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ConnectError::Config(format!("invalid header name {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ConnectError::Config(format!("invalid value for header {}: {}", name.as_str(), e))
            })?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .timeout(config.request_timeout);

        if let Some(path) = &config.tls.root_ca_file {
            let pem = read_pem(path)?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                ConnectError::Config(format!("invalid root CA {}: {}", path.display(), e))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        if let (Some(cert_path), Some(key_path)) =
            (&config.tls.client_cert_file, &config.tls.client_key_file)
        {
            let mut pem = read_pem(cert_path)?;
            pem.push(b'\n');
            pem.extend(read_pem(key_path)?);
            let identity = reqwest::Identity::from_pem(&pem).map_err(|e| {
                ConnectError::Config(format!("failed to load client certificate: {}", e))
            })?;
            builder = builder.identity(identity);
        }

        if config.tls.insecure {
            debug!("TLS certificate verification disabled for Kafka Connect client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http_client = builder
            .build()
            .map_err(|e| ConnectError::Config(format!("failed to build HTTP client: {}", e)))?;

        let basic_auth = config.basic_auth.as_ref().and_then(|auth| {
            let password = auth.password.expose_secret();
            if auth.username.is_empty() || password.is_empty() {
                None
            } else {
                Some((auth.username.clone(), SecretString::from(password.to_string())))
            }
        });

        Ok(Self {
            http_client,
            base_url,
            basic_auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "Kafka Connect request");
        let builder = self.http_client.request(method, url);
        match &self.basic_auth {
            Some((username, password)) => {
                builder.basic_auth(username, Some(password.expose_secret()))
            }
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        builder.send().await.map_err(ConnectError::from)
    }
}

#[async_trait]
impl ConnectApi for ConnectClient {
    async fn list_connectors(&self) -> Result<Vec<String>> {
        let response = self.send(self.request(Method::GET, "/connectors")).await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        decode(response).await
    }

    async fn get_connector(&self, name: &str) -> Result<Option<ConnectorInfo>> {
        let response = self
            .send(self.request(Method::GET, &connector_path(name, "")))
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => decode(response).await.map(Some),
            _ => Err(error_from_response(response).await),
        }
    }

    async fn create_connector(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> Result<ConnectorInfo> {
        let body = CreateConnectorRequest { name, config };
        let response = self
            .send(self.request(Method::POST, "/connectors").json(&body))
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        decode(response).await
    }

    async fn update_connector(
        &self,
        name: &str,
        config: &ConnectorConfig,
    ) -> Result<ConnectorInfo> {
        let response = self
            .send(
                self.request(Method::PUT, &connector_path(name, "/config"))
                    .json(config),
            )
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        decode(response).await
    }

    async fn delete_connector(&self, name: &str) -> Result<()> {
        let response = self
            .send(self.request(Method::DELETE, &connector_path(name, "")))
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    async fn get_connector_config(&self, name: &str) -> Result<Option<ConnectorConfig>> {
        let response = self
            .send(self.request(Method::GET, &connector_path(name, "/config")))
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => decode(response).await.map(Some),
            _ => Err(error_from_response(response).await),
        }
    }

    async fn get_connector_status(&self, name: &str) -> Result<Option<ConnectorStatus>> {
        let response = self
            .send(self.request(Method::GET, &connector_path(name, "/status")))
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => decode(response).await.map(Some),
            _ => Err(error_from_response(response).await),
        }
    }

    async fn is_up_to_date(&self, name: &str, config: &ConnectorConfig) -> Result<bool> {
        let remote = match self.get_connector_config(name).await? {
            Some(remote) => remote,
            None => return Ok(false),
        };
        Ok(matches_desired(name, config, &remote))
    }
}

/// Compare a remote config with the desired one, treating `name` as always
/// equal to the connector name.
pub fn matches_desired(
    name: &str,
    desired: &ConnectorConfig,
    remote: &ConnectorConfig,
) -> bool {
    let mut desired = desired.clone();
    desired.insert("name".to_string(), name.to_string());
    desired == *remote
}

fn connector_path(name: &str, suffix: &str) -> String {
    format!("/connectors/{}{}", urlencoding::encode(name), suffix)
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| ConnectError::Config(format!("invalid Kafka Connect URL {:?}: {}", raw, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConnectError::Config(format!(
            "unsupported URL scheme {:?}, expected http or https",
            parsed.scheme()
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

fn read_pem(path: &std::path::Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| ConnectError::Config(format!("failed to read {}: {}", path.display(), e)))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ConnectError::Decode(e.to_string()))
}

/// Turn a non-2xx response into a typed error. Structured Kafka Connect error
/// bodies become [`ConnectError::Api`]; anything else keeps the raw status.
async fn error_from_response(response: Response) -> ConnectError {
    let status = response.status().as_u16();
    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => return ConnectError::Transport(e.to_string()),
    };

    match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(err) => ConnectError::Api {
            code: if err.error_code == 0 {
                status
            } else {
                err.error_code
            },
            message: err.message,
        },
        Err(_) => ConnectError::UnexpectedStatus { status, body },
    }
}
