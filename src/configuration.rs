//! src/configuration.rs
use secrecy::SecretBox;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub storage: StorageSettings,
    pub rpc: RpcSettings,
    pub pipeline: PipelineSettings,
    pub telemetry: TelemetrySettings,
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Memory,
}

#[derive(serde::Deserialize, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub aws_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_key: SecretBox<str>,
    pub aws_endpoint_url: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct RpcSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

impl RpcSettings {
    pub fn address(&self) -> Result<SocketAddr, anyhow::Error> {
        let host = IpAddr::from_str(&self.host)
            .map_err(|e| anyhow::anyhow!("Invalid rpc host {}: {e}", self.host))?;
        Ok(SocketAddr::new(host, self.port))
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct PipelineSettings {
    pub max_chunk_count: usize,
    #[serde(default)]
    pub run_id_seed: Option<u64>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub request_timeout_secs: u64,
}

impl PipelineSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct TelemetrySettings {
    pub otlp: bool,
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {e}"))
    })?;
    let config_dir = base_path.join("configuration");

    let settings = config::Config::builder()
        .add_source(config::File::from(config_dir.join("base.yaml")))
        .add_source(
            config::Environment::with_prefix("MINI_MAPREDUCE")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::{StorageBackend, get_configuration};
    use secrecy::ExposeSecret;

    #[test]
    fn should_get_base_dot_yaml() {
        let settings = get_configuration().expect("Failed to get configuration");

        assert_eq!(settings.storage.aws_secret_key.expose_secret(), "test");
        assert_eq!(settings.storage.backend, StorageBackend::S3);
        assert_eq!(settings.pipeline.max_chunk_count, 1024);
        assert!(settings.pipeline.run_id_seed.is_none());
    }

    #[test]
    fn rpc_address_accepts_ipv4_and_ipv6_hosts() {
        let mut settings = get_configuration().expect("Failed to get configuration");
        settings.rpc.host = "127.0.0.1".into();
        settings.rpc.port = 9001;
        assert_eq!(settings.rpc.address().unwrap().to_string(), "127.0.0.1:9001");

        settings.rpc.host = "::1".into();
        assert_eq!(settings.rpc.address().unwrap().to_string(), "[::1]:9001");

        settings.rpc.host = "localhost".into();
        assert!(settings.rpc.address().is_err());
    }
}
