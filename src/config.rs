use serde::Deserialize;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

#[derive(Clone)]
pub struct AppConfig {
    pub listen: SocketAddr,
    /// Origin of the web app; notification deep links are built from it.
    pub web_base_url: String,
    pub store: StoreBackend,
    pub push: PushBackend,
    pub google: Option<GoogleConfig>,
    pub payments: Option<PaymentsConfig>,
    pub auth: Option<AuthConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory { seed: Option<PathBuf> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PushBackend {
    Fcm,
    DryRun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StoreKind {
    Firestore,
    Memory,
}

#[derive(Clone)]
pub struct GoogleConfig {
    pub project_id: Option<String>,
    pub service_account: Option<PathBuf>,
    /// Fixed bearer token used instead of a service account (emulators).
    pub access_token: Option<String>,
    pub firestore_url: String,
    pub fcm_url: String,
}

#[derive(Clone)]
pub struct PaymentsConfig {
    pub stripe_secret_key: String,
    pub stripe_url: String,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub key: String,
}

/// Optional TOML file; every value can also be given on the command line or
/// through the environment, which take precedence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub listen: Option<SocketAddr>,
    pub web_base_url: Option<String>,
    pub store: Option<StoreKind>,
    pub seed: Option<PathBuf>,
    pub push: Option<PushBackend>,
    #[serde(default)]
    pub google: FileGoogleConfig,
    #[serde(default)]
    pub stripe: FileStripeConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileGoogleConfig {
    pub project_id: Option<String>,
    pub service_account: Option<PathBuf>,
    pub access_token: Option<String>,
    pub firestore_url: Option<String>,
    pub fcm_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileStripeConfig {
    pub secret_key: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileAuthConfig {
    pub key: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.parse().expect("default listen address"),
            web_base_url: "http://localhost:5173".to_string(),
            store: StoreBackend::Memory { seed: None },
            push: PushBackend::DryRun,
            google: None,
            payments: None,
            auth: None,
        }
    }
}
