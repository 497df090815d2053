//! Application configuration module
//!
//! `AppConfig` carries every setting the backend needs: token secrets and
//! lifetimes, OTP policy, SMTP and reCAPTCHA credentials, the database URL and
//! the upload directory. It is built once at startup and handed to the
//! services that need it; business logic never reads the environment.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file named by `DAYPLANNER_CONFIG`
//! 3. Environment variables (`JWT_SECRET_KEY`, `SMTP_HOST`, ...)

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an optional TOML config file
pub const CONFIG_FILE_ENV: &str = "DAYPLANNER_CONFIG";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ISSUER: &str = "mydayplanner";
const DEFAULT_ACCESS_TTL_SECS: i64 = 60 * 60;
const DEFAULT_REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_BCRYPT_COST: u32 = 10;
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_RECAPTCHA_BASE_URL: &str = "https://recaptchaenterprise.googleapis.com";
const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// JWT settings
#[derive(Debug, Clone)]
pub struct TokenSettings {
    /// HMAC secret for access tokens
    pub access_secret: String,
    /// HMAC secret for refresh tokens (must differ from the access secret)
    pub refresh_secret: String,
    /// `iss` claim written into and required from every token
    pub issuer: String,
    /// Access token lifetime in seconds
    pub access_ttl_secs: i64,
    /// Refresh token lifetime in seconds
    pub refresh_ttl_secs: i64,
}

/// OTP issuing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpSettings {
    /// Digits in a generated OTP
    pub code_length: usize,
    /// Characters in a generated reference
    pub reference_length: usize,
    /// How long an OTP record stays valid
    pub ttl_secs: i64,
    /// How long an email stays blocked once the limit is hit
    pub block_secs: i64,
    /// Non-expired records that trigger a block
    pub request_limit: i64,
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            code_length: 6,
            reference_length: 10,
            ttl_secs: 15 * 60,
            block_secs: 10 * 60,
            request_limit: 3,
        }
    }
}

/// Outgoing mail server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address; falls back to the username when unset
    pub from: String,
}

/// reCAPTCHA Enterprise assessment endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecaptchaSettings {
    pub project_id: String,
    pub site_key: String,
    pub api_key: String,
    pub base_url: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server binds to
    pub server_port: u16,
    /// PostgreSQL URL; the in-memory store is used when unset
    pub database_url: Option<String>,
    /// JWT settings
    pub tokens: TokenSettings,
    /// bcrypt work factor for password and refresh-token hashes
    pub bcrypt_cost: u32,
    /// OTP issuing policy
    pub otp: OtpSettings,
    /// Mail server; email sending fails when unset
    pub smtp: Option<SmtpSettings>,
    /// reCAPTCHA settings; the captcha endpoint fails when unset
    pub recaptcha: Option<RecaptchaSettings>,
    /// Directory uploaded files are written to
    pub upload_dir: PathBuf,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load configuration from the optional TOML file and the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let file = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => Some(
                std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::Io(format!("{}: {}", path, e)))?,
            ),
            Err(_) => None,
        };
        Self::from_sources(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build configuration from TOML text and an environment lookup.
    ///
    /// Environment values win over file values.
    pub fn from_sources<F>(toml_text: Option<&str>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file: FileConfig = match toml_text {
            Some(text) => toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?,
            None => FileConfig::default(),
        };

        let pick = |key: &str, fallback: Option<String>| env(key).or(fallback);
        let parse_num = |key: &'static str, raw: Option<String>| -> Result<Option<i64>, ConfigError> {
            raw.map(|v| v.parse::<i64>().map_err(|_| ConfigError::InvalidNumber(key, v)))
                .transpose()
        };

        let mut builder = AppConfig::builder();

        if let Some(port) = parse_num("SERVER_PORT", pick("SERVER_PORT", file.server.port.map(|p| p.to_string())))? {
            builder = builder.server_port(
                u16::try_from(port).map_err(|_| ConfigError::InvalidNumber("SERVER_PORT", port.to_string()))?,
            );
        }
        if let Some(url) = pick("DATABASE_URL", file.database.url) {
            builder = builder.database_url(url);
        }
        if let Some(secret) = pick("JWT_SECRET_KEY", file.jwt.secret) {
            builder = builder.access_secret(secret);
        }
        if let Some(secret) = pick("JWT_REFRESH_SECRET_KEY", file.jwt.refresh_secret) {
            builder = builder.refresh_secret(secret);
        }
        if let Some(issuer) = pick("JWT_ISSUER", file.jwt.issuer) {
            builder = builder.issuer(issuer);
        }
        if let Some(cost) = parse_num("BCRYPT_COST", pick("BCRYPT_COST", file.bcrypt_cost.map(|c| c.to_string())))? {
            builder = builder.bcrypt_cost(
                u32::try_from(cost).map_err(|_| ConfigError::InvalidNumber("BCRYPT_COST", cost.to_string()))?,
            );
        }
        if let Some(dir) = pick("UPLOAD_DIR", file.upload_dir) {
            builder = builder.upload_dir(dir);
        }

        if let Some(host) = pick("SMTP_HOST", file.smtp.host) {
            let port = match parse_num("SMTP_PORT", pick("SMTP_PORT", file.smtp.port.map(|p| p.to_string())))? {
                Some(p) => u16::try_from(p).map_err(|_| ConfigError::InvalidNumber("SMTP_PORT", p.to_string()))?,
                None => DEFAULT_SMTP_PORT,
            };
            let username = pick("SMTP_USERNAME", file.smtp.username);
            let from = pick("SMTP_FROM", file.smtp.from)
                .or_else(|| username.clone())
                .ok_or(ConfigError::MissingValue("SMTP_FROM"))?;
            builder = builder.smtp(SmtpSettings {
                host,
                port,
                username,
                password: pick("SMTP_PASSWORD", file.smtp.password),
                from,
            });
        }

        if let Some(project_id) = pick("GOOGLE_CLOUD_PROJECT_ID", file.recaptcha.project_id) {
            builder = builder.recaptcha(RecaptchaSettings {
                project_id,
                site_key: pick("RECAPTCHA_SITE_KEY", file.recaptcha.site_key)
                    .ok_or(ConfigError::MissingValue("RECAPTCHA_SITE_KEY"))?,
                api_key: pick("RECAPTCHA_API_KEY", file.recaptcha.api_key)
                    .ok_or(ConfigError::MissingValue("RECAPTCHA_API_KEY"))?,
                base_url: pick("RECAPTCHA_BASE_URL", file.recaptcha.base_url)
                    .unwrap_or_else(|| DEFAULT_RECAPTCHA_BASE_URL.to_string()),
            });
        }

        builder.build()
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    server_port: Option<u16>,
    database_url: Option<String>,
    access_secret: Option<String>,
    refresh_secret: Option<String>,
    issuer: Option<String>,
    access_ttl_secs: Option<i64>,
    refresh_ttl_secs: Option<i64>,
    bcrypt_cost: Option<u32>,
    otp: Option<OtpSettings>,
    smtp: Option<SmtpSettings>,
    recaptcha: Option<RecaptchaSettings>,
    upload_dir: Option<PathBuf>,
}

impl AppConfigBuilder {
    pub fn server_port(mut self, port: u16) -> Self {
        self.server_port = Some(port);
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Set the access token secret
    pub fn access_secret(mut self, secret: impl Into<String>) -> Self {
        self.access_secret = Some(secret.into());
        self
    }

    /// Set the refresh token secret
    pub fn refresh_secret(mut self, secret: impl Into<String>) -> Self {
        self.refresh_secret = Some(secret.into());
        self
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn access_ttl_secs(mut self, secs: i64) -> Self {
        self.access_ttl_secs = Some(secs);
        self
    }

    pub fn refresh_ttl_secs(mut self, secs: i64) -> Self {
        self.refresh_ttl_secs = Some(secs);
        self
    }

    /// Set the bcrypt cost (tests use the minimum of 4)
    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = Some(cost);
        self
    }

    pub fn otp(mut self, otp: OtpSettings) -> Self {
        self.otp = Some(otp);
        self
    }

    pub fn smtp(mut self, smtp: SmtpSettings) -> Self {
        self.smtp = Some(smtp);
        self
    }

    pub fn recaptcha(mut self, recaptcha: RecaptchaSettings) -> Self {
        self.recaptcha = Some(recaptcha);
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let access_secret = self
            .access_secret
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingValue("JWT_SECRET_KEY"))?;
        let refresh_secret = self
            .refresh_secret
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingValue("JWT_REFRESH_SECRET_KEY"))?;
        if access_secret == refresh_secret {
            return Err(ConfigError::Invalid(
                "access and refresh token secrets must differ".to_string(),
            ));
        }

        let bcrypt_cost = self.bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST);
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid(format!(
                "bcrypt cost must be between 4 and 31, got {}",
                bcrypt_cost
            )));
        }

        let otp = self.otp.unwrap_or_default();
        if otp.code_length == 0 || otp.reference_length == 0 {
            return Err(ConfigError::Invalid(
                "OTP and reference lengths must be positive".to_string(),
            ));
        }

        Ok(AppConfig {
            server_port: self.server_port.unwrap_or(DEFAULT_PORT),
            database_url: self.database_url,
            tokens: TokenSettings {
                access_secret,
                refresh_secret,
                issuer: self.issuer.unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
                access_ttl_secs: self.access_ttl_secs.unwrap_or(DEFAULT_ACCESS_TTL_SECS),
                refresh_ttl_secs: self.refresh_ttl_secs.unwrap_or(DEFAULT_REFRESH_TTL_SECS),
            },
            bcrypt_cost,
            otp,
            smtp: self.smtp,
            recaptcha: self.recaptcha,
            upload_dir: self.upload_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
        })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid number for {0}: {1}")]
    InvalidNumber(&'static str, String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("failed to read config file {0}")]
    Io(String),
    #[error("failed to parse config file: {0}")]
    Parse(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    server: FileServer,
    database: FileDatabase,
    jwt: FileJwt,
    smtp: FileSmtp,
    recaptcha: FileRecaptcha,
    bcrypt_cost: Option<u32>,
    upload_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileServer {
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileDatabase {
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileJwt {
    secret: Option<String>,
    refresh_secret: Option<String>,
    issuer: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileSmtp {
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    from: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileRecaptcha {
    project_id: Option<String>,
    site_key: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_builder_defaults() {
        let config = AppConfig::builder()
            .access_secret("access")
            .refresh_secret("refresh")
            .build()
            .unwrap();

        assert_eq!(config.server_port, 3000);
        assert_eq!(config.tokens.issuer, "mydayplanner");
        assert_eq!(config.tokens.access_ttl_secs, 3600);
        assert_eq!(config.tokens.refresh_ttl_secs, 7 * 24 * 3600);
        assert_eq!(config.otp, OtpSettings::default());
        assert_eq!(config.otp.ttl_secs, 900);
        assert_eq!(config.otp.block_secs, 600);
        assert!(config.smtp.is_none());
        assert_eq!(config.upload_dir, PathBuf::from("./uploads"));
    }

    #[test]
    fn test_builder_requires_secrets() {
        let err = AppConfig::builder().refresh_secret("r").build().unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue("JWT_SECRET_KEY")));

        let err = AppConfig::builder().access_secret("a").build().unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue("JWT_REFRESH_SECRET_KEY")));
    }

    #[test]
    fn test_builder_rejects_shared_secret() {
        let err = AppConfig::builder()
            .access_secret("same")
            .refresh_secret("same")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_builder_rejects_bad_bcrypt_cost() {
        let err = AppConfig::builder()
            .access_secret("a")
            .refresh_secret("r")
            .bcrypt_cost(2)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_env_only() {
        let env = env_of(&[
            ("JWT_SECRET_KEY", "a"),
            ("JWT_REFRESH_SECRET_KEY", "r"),
            ("SERVER_PORT", "8080"),
            ("SMTP_HOST", "smtp.gmail.com"),
            ("SMTP_USERNAME", "planner@gmail.com"),
            ("SMTP_PASSWORD", "pw"),
        ]);
        let config = AppConfig::from_sources(None, env).unwrap();

        assert_eq!(config.server_port, 8080);
        let smtp = config.smtp.unwrap();
        assert_eq!(smtp.port, 587);
        assert_eq!(smtp.from, "planner@gmail.com");
        assert!(config.recaptcha.is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = r#"
            bcrypt_cost = 6

            [jwt]
            secret = "file-access"
            refresh_secret = "file-refresh"
            issuer = "file-issuer"

            [recaptcha]
            project_id = "planner-project"
            site_key = "site"
            api_key = "key"
        "#;
        let env = env_of(&[("JWT_ISSUER", "env-issuer")]);
        let config = AppConfig::from_sources(Some(file), env).unwrap();

        assert_eq!(config.tokens.access_secret, "file-access");
        assert_eq!(config.tokens.issuer, "env-issuer");
        assert_eq!(config.bcrypt_cost, 6);
        let recaptcha = config.recaptcha.unwrap();
        assert_eq!(recaptcha.project_id, "planner-project");
        assert_eq!(recaptcha.base_url, "https://recaptchaenterprise.googleapis.com");
    }

    #[test]
    fn test_invalid_port() {
        let env = env_of(&[
            ("JWT_SECRET_KEY", "a"),
            ("JWT_REFRESH_SECRET_KEY", "r"),
            ("SERVER_PORT", "not-a-port"),
        ]);
        let err = AppConfig::from_sources(None, env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber("SERVER_PORT", _)));
    }

    #[test]
    fn test_malformed_file() {
        let err = AppConfig::from_sources(Some("jwt = ["), env_of(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_recaptcha_requires_keys() {
        let env = env_of(&[
            ("JWT_SECRET_KEY", "a"),
            ("JWT_REFRESH_SECRET_KEY", "r"),
            ("GOOGLE_CLOUD_PROJECT_ID", "p"),
        ]);
        let err = AppConfig::from_sources(None, env).unwrap_err();
        assert!(matches!(err, ConfigError::MissingValue("RECAPTCHA_SITE_KEY")));
    }
}
