// Integration tests for the Kafka Connect client against a mock REST server

use connect_client::{ClientConfig, ConnectApi, ConnectClient, ConnectError, ConnectorConfig};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sink_config(tasks_max: &str) -> ConnectorConfig {
    [
        ("name", "sqlite-sink"),
        ("connector.class", "io.confluent.connect.jdbc.JdbcSinkConnector"),
        ("tasks.max", tasks_max),
        ("topics", "orders"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn connector_body(config: &ConnectorConfig) -> serde_json::Value {
    json!({
        "name": "sqlite-sink",
        "config": config,
        "tasks": [{"connector": "sqlite-sink", "task": 0}],
        "type": "sink"
    })
}

async fn client_for(server: &MockServer) -> ConnectClient {
    ConnectClient::new(&ClientConfig::new(server.uri())).unwrap()
}

#[tokio::test]
async fn test_get_connector_found() {
    let server = MockServer::start().await;
    let config = sink_config("2");

    Mock::given(method("GET"))
        .and(path("/connectors/sqlite-sink"))
        .respond_with(ResponseTemplate::new(200).set_body_json(connector_body(&config)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let info = client.get_connector("sqlite-sink").await.unwrap().unwrap();

    assert_eq!(info.name, "sqlite-sink");
    assert_eq!(info.config, config);
    assert_eq!(info.tasks.len(), 1);
}

#[tokio::test]
async fn test_get_connector_not_found_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/connectors/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error_code": 404,
            "message": "Connector missing not found"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(client.get_connector("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_connector_posts_name_and_config() {
    let server = MockServer::start().await;
    let config = sink_config("2");

    Mock::given(method("POST"))
        .and(path("/connectors"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "sqlite-sink", "config": config})))
        .respond_with(ResponseTemplate::new(201).set_body_json(connector_body(&config)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let info = client
        .create_connector("sqlite-sink", &config)
        .await
        .unwrap();

    assert_eq!(info.config.get("tasks.max").map(String::as_str), Some("2"));
}

#[tokio::test]
async fn test_update_connector_puts_full_config() {
    let server = MockServer::start().await;
    let config = sink_config("1");

    Mock::given(method("PUT"))
        .and(path("/connectors/sqlite-sink/config"))
        .and(body_json(json!(config)))
        .respond_with(ResponseTemplate::new(200).set_body_json(connector_body(&config)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let info = client
        .update_connector("sqlite-sink", &config)
        .await
        .unwrap();

    assert_eq!(info.config.get("tasks.max").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn test_delete_connector() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/connectors/sqlite-sink"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    client.delete_connector("sqlite-sink").await.unwrap();
}

#[tokio::test]
async fn test_delete_missing_connector_reports_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/connectors/sqlite-sink"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error_code": 404,
            "message": "Connector sqlite-sink not found"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.delete_connector("sqlite-sink").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_rebalance_conflict_surfaces_as_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/connectors"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error_code": 409,
            "message": "Cannot complete request because of a conflicting operation (e.g. worker rebalance)"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .create_connector("sqlite-sink", &sink_config("2"))
        .await
        .unwrap_err();

    match &err {
        ConnectError::Api { code, message } => {
            assert_eq!(*code, 409);
            assert!(message.contains("conflicting operation"));
        }
        other => panic!("expected api error, got {:?}", other),
    }
    // Rendered message keeps the status for rebalance classification
    assert!(err.to_string().contains("409"));
}

#[tokio::test]
async fn test_unparseable_error_body_keeps_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/connectors/sqlite-sink"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.get_connector("sqlite-sink").await.unwrap_err();

    assert!(matches!(
        err,
        ConnectError::UnexpectedStatus { status: 502, .. }
    ));
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/connectors"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert!(matches!(
        client.list_connectors().await,
        Err(ConnectError::Decode(_))
    ));
}

#[tokio::test]
async fn test_list_connectors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/connectors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["a", "b"])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.list_connectors().await.unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_get_connector_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/connectors/sqlite-sink/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "sqlite-sink",
            "connector": {"state": "RUNNING", "worker_id": "connect:8083"},
            "tasks": [{"id": 0, "state": "RUNNING", "worker_id": "connect:8083"}],
            "type": "sink"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let status = client
        .get_connector_status("sqlite-sink")
        .await
        .unwrap()
        .unwrap();

    assert!(status.is_running());
    assert_eq!(status.tasks.len(), 1);
}

#[tokio::test]
async fn test_is_up_to_date() {
    let server = MockServer::start().await;
    let remote = sink_config("2");

    Mock::given(method("GET"))
        .and(path("/connectors/sqlite-sink/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(remote)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/connectors/missing/config"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error_code": 404,
            "message": "Connector missing not found"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    let mut desired = sink_config("2");
    desired.remove("name");
    assert!(client.is_up_to_date("sqlite-sink", &desired).await.unwrap());
    assert!(!client
        .is_up_to_date("sqlite-sink", &sink_config("1"))
        .await
        .unwrap());

    let mut extra = sink_config("2");
    extra.insert("auto.create".to_string(), "true".to_string());
    assert!(!client.is_up_to_date("sqlite-sink", &extra).await.unwrap());

    assert!(!client.is_up_to_date("missing", &desired).await.unwrap());
}

#[tokio::test]
async fn test_basic_auth_and_custom_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/connectors"))
        .and(header("authorization", "Basic dXNlcjpwYXNz"))
        .and(header("x-tenant", "analytics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let config = ClientConfig::new(server.uri())
        .with_basic_auth("user", SecretString::from("pass".to_string()))
        .with_header("X-Tenant", "analytics");
    let client = ConnectClient::new(&config).unwrap();

    assert!(client.list_connectors().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on port 9 on loopback in the test environment
    let client = ConnectClient::new(&ClientConfig::new("http://127.0.0.1:9")).unwrap();
    let err = client.get_connector("anything").await.unwrap_err();
    assert!(matches!(err, ConnectError::Transport(_)));
}

#[tokio::test]
async fn test_unreadable_client_certificate_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let cert = dir.path().join("client.crt");
    let key = dir.path().join("client.key");
    std::fs::write(&cert, "not a certificate").unwrap();
    std::fs::write(&key, "not a key").unwrap();

    let mut config = ClientConfig::new("https://localhost:8083");
    config.tls.client_cert_file = Some(cert);
    config.tls.client_key_file = Some(key);

    assert!(matches!(
        ConnectClient::new(&config),
        Err(ConnectError::Config(_))
    ));
}
