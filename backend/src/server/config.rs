//! Application settings and the HTTP server configuration object.
//!
//! [`AppSettings`] is loaded via OrthoConfig from CLI flags, `EDUQUEST_*`
//! environment variables and configuration files. Optional values fall back
//! to the defaults documented on each accessor.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use eduquest::domain::{Currency, SigningSecret};
use eduquest::outbound::persistence::DbPool;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const DEFAULT_GATEWAY_BASE_URL: &str = "https://api.razorpay.com";
const DEFAULT_GATEWAY_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_CURRENCY: &str = "INR";
const DEFAULT_MAIL_FROM: &str = "EduQuest <no-reply@eduquest.com>";
const DEFAULT_MAIL_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Settings rejected while building the server configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address {value:?}")]
    BindAddr { value: String },
    #[error("same_site must be Strict, Lax or None, got {value:?}")]
    SameSite { value: String },
    #[error("{field} is not a valid URL: {value:?}")]
    Url { field: &'static str, value: String },
    #[error("currency must be a three letter ISO code, got {value:?}")]
    Currency { value: String },
    #[error("gateway_key_id and gateway_key_secret must be set together")]
    PartialGatewayCredentials,
    #[error("mail_api_url and mail_api_token must be set together")]
    PartialMailCredentials,
}

/// Process configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EDUQUEST")]
pub struct AppSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL. Without it the server runs on the in-memory store.
    pub database_url: Option<String>,
    /// File holding the session cookie key material.
    pub session_key_file: Option<PathBuf>,
    /// Allow a generated session key in release builds.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// `SameSite` policy for the session cookie.
    pub same_site: Option<String>,
    pub gateway_base_url: Option<String>,
    pub gateway_key_id: Option<String>,
    pub gateway_key_secret: Option<String>,
    pub gateway_timeout_ms: Option<u64>,
    /// ISO currency charged for every order.
    pub currency: Option<String>,
    pub mail_api_url: Option<String>,
    pub mail_api_token: Option<String>,
    pub mail_from: Option<String>,
    pub mail_timeout_ms: Option<u64>,
    pub notification_queue_capacity: Option<usize>,
}

impl AppSettings {
    /// Parsed bind address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|_| ConfigError::BindAddr {
            value: value.to_owned(),
        })
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Cookie `SameSite` policy, defaulting to `Lax`.
    pub fn same_site(&self) -> Result<SameSite, ConfigError> {
        match self.same_site.as_deref() {
            None => Ok(SameSite::Lax),
            Some(value) if value.eq_ignore_ascii_case("lax") => Ok(SameSite::Lax),
            Some(value) if value.eq_ignore_ascii_case("strict") => Ok(SameSite::Strict),
            Some(value) if value.eq_ignore_ascii_case("none") => Ok(SameSite::None),
            Some(value) => Err(ConfigError::SameSite {
                value: value.to_owned(),
            }),
        }
    }

    /// Resolve gateway, mail and queue settings.
    pub fn integrations(&self) -> Result<IntegrationConfig, ConfigError> {
        let gateway = match (&self.gateway_key_id, &self.gateway_key_secret) {
            (Some(key_id), Some(key_secret)) => Some(GatewayConfig {
                base_url: parse_url(
                    "gateway_base_url",
                    self.gateway_base_url
                        .as_deref()
                        .unwrap_or(DEFAULT_GATEWAY_BASE_URL),
                )?,
                key_id: key_id.clone(),
                key_secret: SigningSecret::new(key_secret.clone()),
                timeout: Duration::from_millis(
                    self.gateway_timeout_ms.unwrap_or(DEFAULT_GATEWAY_TIMEOUT_MS),
                ),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialGatewayCredentials),
        };
        let mail = match (&self.mail_api_url, &self.mail_api_token) {
            (Some(url), Some(token)) => Some(MailConfig {
                endpoint: parse_url("mail_api_url", url)?,
                token: token.clone(),
            }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialMailCredentials),
        };
        let currency_code = self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY);
        let currency = Currency::new(currency_code).map_err(|_| ConfigError::Currency {
            value: currency_code.to_owned(),
        })?;
        Ok(IntegrationConfig {
            gateway,
            currency,
            mail,
            mail_from: self
                .mail_from
                .clone()
                .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_owned()),
            mail_timeout: Duration::from_millis(
                self.mail_timeout_ms.unwrap_or(DEFAULT_MAIL_TIMEOUT_MS),
            ),
            queue_capacity: self
                .notification_queue_capacity
                .unwrap_or(DEFAULT_QUEUE_CAPACITY),
        })
    }
}

fn parse_url(field: &'static str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::Url {
        field,
        value: value.to_owned(),
    })
}

/// Payment gateway account. The key secret also signs payment callbacks.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: Url,
    pub key_id: String,
    pub key_secret: SigningSecret,
    pub timeout: Duration,
}

/// Transactional mail API endpoint.
#[derive(Clone)]
pub struct MailConfig {
    pub endpoint: Url,
    pub token: String,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

/// External collaborators of the payment flow.
///
/// A missing gateway selects the fixture gateway; missing mail settings
/// select the logging mail sender.
#[derive(Debug, Clone)]
pub struct IntegrationConfig {
    pub gateway: Option<GatewayConfig>,
    pub currency: Currency,
    pub mail: Option<MailConfig>,
    pub mail_from: String,
    pub mail_timeout: Duration,
    pub queue_capacity: usize,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            gateway: None,
            currency: Currency::inr(),
            mail: None,
            mail_from: DEFAULT_MAIL_FROM.to_owned(),
            mail_timeout: Duration::from_millis(DEFAULT_MAIL_TIMEOUT_MS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) integrations: IntegrationConfig,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
            integrations: IntegrationConfig::default(),
        }
    }

    /// Attach a database connection pool; repositories switch from the
    /// in-memory store to Diesel.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_integrations(mut self, integrations: IntegrationConfig) -> Self {
        self.integrations = integrations;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 8] = [
        "EDUQUEST_BIND_ADDR",
        "EDUQUEST_COOKIE_SECURE",
        "EDUQUEST_SAME_SITE",
        "EDUQUEST_GATEWAY_KEY_ID",
        "EDUQUEST_GATEWAY_KEY_SECRET",
        "EDUQUEST_CURRENCY",
        "EDUQUEST_MAIL_API_URL",
        "EDUQUEST_MAIL_API_TOKEN",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("eduquest")]).expect("config should load")
    }

    fn cleared_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared_with(&[]));

        let settings = load_from_empty_args();
        let integrations = settings.integrations().expect("integrations");

        assert_eq!(
            settings.bind_addr().expect("addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("literal")
        );
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site().expect("same site"), SameSite::Lax);
        assert!(integrations.gateway.is_none());
        assert!(integrations.mail.is_none());
        assert_eq!(integrations.currency, Currency::inr());
        assert_eq!(integrations.queue_capacity, 256);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_with(&[
            ("EDUQUEST_BIND_ADDR", "127.0.0.1:9000"),
            ("EDUQUEST_COOKIE_SECURE", "false"),
            ("EDUQUEST_SAME_SITE", "Strict"),
            ("EDUQUEST_GATEWAY_KEY_ID", "rzp_test_key"),
            ("EDUQUEST_GATEWAY_KEY_SECRET", "shh"),
        ]));

        let settings = load_from_empty_args();
        let gateway = settings
            .integrations()
            .expect("integrations")
            .gateway
            .expect("gateway configured");

        assert_eq!(settings.bind_addr().expect("addr").port(), 9000);
        assert!(!settings.cookie_secure);
        assert_eq!(settings.same_site().expect("same site"), SameSite::Strict);
        assert_eq!(gateway.key_id, "rzp_test_key");
        assert_eq!(gateway.key_secret.expose(), "shh");
        assert_eq!(gateway.base_url.as_str(), "https://api.razorpay.com/");
    }

    #[rstest]
    #[case(&[("EDUQUEST_GATEWAY_KEY_ID", "only-id")], ConfigError::PartialGatewayCredentials)]
    #[case(&[("EDUQUEST_MAIL_API_TOKEN", "only-token")], ConfigError::PartialMailCredentials)]
    #[case(&[("EDUQUEST_CURRENCY", "rupees")], ConfigError::Currency { value: "rupees".to_owned() })]
    fn inconsistent_integrations_are_rejected(
        #[case] overrides: &[(&str, &str)],
        #[case] expected: ConfigError,
    ) {
        let _guard = lock_env(cleared_with(overrides));

        let settings = load_from_empty_args();

        assert_eq!(settings.integrations().expect_err("rejected"), expected);
    }

    #[rstest]
    fn unknown_same_site_is_rejected() {
        let _guard = lock_env(cleared_with(&[("EDUQUEST_SAME_SITE", "sometimes")]));

        let settings = load_from_empty_args();

        assert!(matches!(
            settings.same_site(),
            Err(ConfigError::SameSite { .. })
        ));
    }
}
