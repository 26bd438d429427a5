//! Application configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Token signing configuration.
    pub auth: AuthConfig,
    /// One-time password configuration.
    #[serde(default)]
    pub otp: OtpConfig,
    /// Transactional mail configuration.
    #[serde(default)]
    pub mail: MailConfig,
    /// Uploaded document storage.
    #[serde(default)]
    pub uploads: UploadConfig,
    /// Referral fallbacks.
    #[serde(default)]
    pub referral: ReferralConfig,
    /// Front-end client settings used when building links.
    #[serde(default)]
    pub client: ClientConfig,
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
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
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

/// JWT signing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for HS256 tokens.
    pub jwt_secret: String,
    /// Seller token lifetime in hours.
    #[serde(default = "default_week_hours")]
    pub seller_token_hours: i64,
    /// Customer token lifetime in hours.
    #[serde(default = "default_week_hours")]
    pub customer_token_hours: i64,
    /// Admin token lifetime in hours.
    #[serde(default = "default_day_hours")]
    pub admin_token_hours: i64,
}

/// Where OTP records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OtpBackend {
    /// Process-local map. Lost on restart and not shared between replicas.
    #[default]
    Memory,
    /// Redis with key expiry.
    Redis,
}

/// One-time password configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OtpConfig {
    /// Code lifetime in seconds.
    #[serde(default = "default_otp_ttl")]
    pub ttl_secs: u64,
    /// Storage backend.
    #[serde(default)]
    pub backend: OtpBackend,
    /// Redis URL, required when `backend = "redis"`.
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Key prefix for Redis records.
    #[serde(default = "default_otp_prefix")]
    pub key_prefix: String,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_otp_ttl(),
            backend: OtpBackend::default(),
            redis_url: None,
            key_prefix: default_otp_prefix(),
        }
    }
}

/// Transactional mail (Brevo) configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Brevo API key. Mail is disabled when absent.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Brevo endpoint.
    #[serde(default = "default_mail_api_url")]
    pub api_url: String,
    /// Sender address.
    #[serde(default)]
    pub sender_email: Option<String>,
    /// Sender display name.
    #[serde(default = "default_sender_name")]
    pub sender_name: String,
    /// Recipient of contact-form notices.
    #[serde(default)]
    pub admin_email: Option<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_mail_api_url(),
            sender_email: None,
            sender_name: default_sender_name(),
            admin_email: None,
        }
    }
}

/// Uploaded document storage.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory on disk.
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,
    /// URL prefix the directory is served under.
    #[serde(default = "default_upload_base_url")]
    pub base_url: String,
    /// Per-file size limit in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            base_url: default_upload_base_url(),
            max_file_size: default_max_file_size(),
        }
    }
}

/// Referral codes used when a registrant supplies none and no admin exists.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferralConfig {
    /// Fallback for sellers.
    #[serde(default = "default_seller_referral")]
    pub seller_fallback_code: String,
    /// Fallback for customers.
    #[serde(default = "default_customer_referral")]
    pub customer_fallback_code: String,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            seller_fallback_code: default_seller_referral(),
            customer_fallback_code: default_customer_referral(),
        }
    }
}

/// Front-end client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the storefront, used in password reset links.
    #[serde(default = "default_client_url")]
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_client_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    5000
}

const fn default_max_connections() -> u32 {
    20
}

const fn default_min_connections() -> u32 {
    2
}

const fn default_week_hours() -> i64 {
    24 * 7
}

const fn default_day_hours() -> i64 {
    24
}

const fn default_otp_ttl() -> u64 {
    600
}

fn default_otp_prefix() -> String {
    "marketplace:otp".to_string()
}

fn default_mail_api_url() -> String {
    "https://api.brevo.com/v3/smtp/email".to_string()
}

fn default_sender_name() -> String {
    "Marketplace".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_upload_base_url() -> String {
    "/uploads".to_string()
}

const fn default_max_file_size() -> usize {
    10 * 1024 * 1024
}

fn default_seller_referral() -> String {
    "ADMIN-REF-1001".to_string()
}

fn default_customer_referral() -> String {
    "ADMIN123".to_string()
}

fn default_client_url() -> String {
    "http://localhost:3000".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `MARKETPLACE_ENV`)
    /// 4. Environment variables with `MARKETPLACE__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let env = std::env::var("MARKETPLACE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("MARKETPLACE")
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
                config::Environment::with_prefix("MARKETPLACE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
