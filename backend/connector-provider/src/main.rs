use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use connect_client::ConnectClient;
use kafka_connect_provider::resource::connector_schema;
use kafka_connect_provider::{ConnectorReconciler, ProviderConfig, ResourceData};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "kafka-connect-provider")]
#[command(about = "Reconcile Kafka Connect connectors", long_about = None)]
#[command(version)]
struct Cli {
    /// Provider configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the connector described by RESOURCE
    Create { resource: String },
    /// Refresh RESOURCE from the cluster
    Read { resource: String },
    /// Push the configuration in RESOURCE to the cluster
    Update { resource: String },
    /// Delete the connector named in RESOURCE
    Delete { resource: String },
    /// Adopt an existing connector by name
    Import {
        #[arg(long)]
        id: String,
    },
    /// Print the resource schema
    Schema,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    if let Command::Schema = cli.command {
        println!("{}", serde_json::to_string_pretty(&connector_schema())?);
        return Ok(());
    }

    let config = ProviderConfig::load(cli.config.as_deref())
        .context("Failed to load provider configuration")?;
    info!(url = %config.display_url(), "Configuration loaded and validated");

    let client = ConnectClient::new(&config.into_client_config())
        .context("Failed to create Kafka Connect client")?;
    let reconciler = ConnectorReconciler::new(Arc::new(client));

    let data = match cli.command {
        Command::Create { resource } => {
            let mut data = parse_resource(&resource)?;
            reconciler.create(&mut data).await.context("Create failed")?;
            data
        }
        Command::Read { resource } => {
            let mut data = parse_resource(&resource)?;
            reconciler.read(&mut data).await.context("Read failed")?;
            data
        }
        Command::Update { resource } => {
            let mut data = parse_resource(&resource)?;
            reconciler.update(&mut data).await.context("Update failed")?;
            data
        }
        Command::Delete { resource } => {
            let mut data = parse_resource(&resource)?;
            reconciler.delete(&mut data).await.context("Delete failed")?;
            data
        }
        Command::Import { id } => {
            let mut data = reconciler.import(&id)?;
            reconciler.read(&mut data).await.context("Import failed")?;
            data
        }
        Command::Schema => return Ok(()),
    };

    println!("{}", serde_json::to_string_pretty(&data.to_redacted_json())?);
    Ok(())
}

/// RESOURCE is either inline JSON or `@path` to a JSON file.
fn parse_resource(resource: &str) -> Result<ResourceData> {
    let raw = match resource.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read resource file {}", path))?,
        None => resource.to_string(),
    };
    let value: serde_json::Value =
        serde_json::from_str(&raw).context("Resource is not valid JSON")?;
    Ok(ResourceData::from_json(&value)?)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,kafka_connect_provider=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").map(|v| v == "json").unwrap_or(false) {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
