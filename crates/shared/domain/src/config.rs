use crate::constants::{CUSTOMER_OFFER, CUSTOMER_OFFER_PROCEDURE};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub log: LogConfig,
    pub domains: DomainsConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Document store connection settings.
///
/// `url` selects the engine: `mongodb://` / `mongodb+srv://` or `mem://`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: String,
    pub connect_retries: u32,
}

/// Logging output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level directive; `RUST_LOG` still takes precedence.
    pub level: String,
    /// Directory for rolling log files. Console only when unset.
    pub directory: Option<PathBuf>,
    pub json: bool,
    /// How often the rolling file is cut.
    pub rotation: LogRotation,
    /// Rolled files kept in `directory`.
    pub max_files: usize,
}

/// Rolling file period for [`LogConfig`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

/// Service domains keyed by the `{domain}` path segment.
pub type DomainsConfig = BTreeMap<String, DomainConfig>;

/// One service domain as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainConfig {
    /// The `{record}` path segment.
    pub record: String,
    /// JSON key stem for record identifiers. Defaults to `record` in lower camel case.
    #[serde(default)]
    pub property: Option<String>,
    /// Backing collection. Defaults to `record`.
    #[serde(default)]
    pub collection: Option<String>,
    /// Business qualifier names, in listing order.
    #[serde(default)]
    pub qualifiers: Vec<String>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 8000, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_owned(),
            name: "servicedomains".to_owned(),
            connect_retries: 3,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            directory: None,
            json: false,
            rotation: LogRotation::default(),
            max_files: 10,
        }
    }
}

/// The built-in registry content: the customer offer domain.
#[must_use]
pub fn default_domains() -> DomainsConfig {
    let mut domains = DomainsConfig::new();
    domains.insert(
        CUSTOMER_OFFER.to_owned(),
        DomainConfig {
            record: CUSTOMER_OFFER_PROCEDURE.to_owned(),
            property: None,
            collection: None,
            qualifiers: vec!["customer".to_owned(), "product".to_owned()],
        },
    );
    domains
}

impl Default for ApiConfigInner {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            log: LogConfig::default(),
            domains: default_domains(),
        }
    }
}
