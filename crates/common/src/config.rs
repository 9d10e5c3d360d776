//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Outgoing email configuration. Email is disabled when absent.
    #[serde(default)]
    pub email: Option<EmailSettings>,
    /// Media CDN configuration. Image uploads are disabled when absent.
    #[serde(default)]
    pub media: Option<MediaSettings>,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Email configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    /// Sender address.
    pub from_address: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Reply-to address.
    #[serde(default)]
    pub reply_to: Option<String>,
    /// Provider used for account and status notifications.
    pub transactional: EmailProviderSettings,
    /// Provider used for newsletters.
    pub marketing: EmailProviderSettings,
}

/// One email provider slot.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailProviderSettings {
    /// Provider kind.
    pub provider: EmailProviderKind,
    /// API key.
    pub api_key: String,
    /// Sending domain (Mailgun only).
    #[serde(default)]
    pub domain: Option<String>,
    /// Use the EU API region (Mailgun only).
    #[serde(default)]
    pub eu_region: bool,
    /// Maximum messages per UTC day.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
}

/// Supported email providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailProviderKind {
    /// `SendGrid` v3 mail API.
    Sendgrid,
    /// Mailgun messages API.
    Mailgun,
}

/// Media CDN configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    /// CDN cloud name.
    pub cloud_name: String,
    /// CDN API key.
    pub api_key: String,
    /// CDN API secret used to sign uploads.
    pub api_secret: String,
    /// Folder all uploads are placed under.
    #[serde(default = "default_upload_folder")]
    pub upload_folder: String,
    /// Lifetime of a signed upload, in seconds.
    #[serde(default = "default_upload_ttl")]
    pub upload_ttl_secs: i64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_from_name() -> String {
    "TaiwanStay".to_string()
}

const fn default_daily_limit() -> u32 {
    300
}

fn default_upload_folder() -> String {
    "taiwanstay".to_string()
}

const fn default_upload_ttl() -> i64 {
    3600
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `TAIWANSTAY_ENV`)
    /// 3. Environment variables with `TAIWANSTAY__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        // A missing .env file is normal outside development.
        dotenvy::dotenv().ok();

        let env = std::env::var("TAIWANSTAY_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TAIWANSTAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TAIWANSTAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
