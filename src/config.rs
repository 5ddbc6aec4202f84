use anyhow::{anyhow, Context, Result};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{NoxError, NoxResult};
use crate::observability::LogFormat;

pub const CHECKOUT_BASE_URL: &str = "https://checkoutdev.noxpay.io";
pub const PAYMENT_LINK_BASE_URL: &str = "https://paglink.noxpay.io";
pub const V2_BASE_URL: &str = "https://api2.noxpay.io";

/// An API token or signing secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(Arc<str>);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Arc::from(value.into()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<String> for Credential {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Credential {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Transport settings shared by every backend client.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Skip TLS certificate verification toward the backend
    pub accept_invalid_certs: bool,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            accept_invalid_certs: false,
            user_agent: format!("noxpay-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            timeout_secs: env::var("NOXPAY_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            accept_invalid_certs: env_flag("NOXPAY_HTTP_ACCEPT_INVALID_CERTS").unwrap_or(false),
            user_agent: defaults.user_agent,
        }
    }
}

/// Checkout API configuration
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub token: Credential,
    pub base_url: String,
    pub http: HttpSettings,
}

impl CheckoutConfig {
    pub fn new(token: impl Into<Credential>) -> Self {
        Self {
            token: token.into(),
            base_url: CHECKOUT_BASE_URL.to_string(),
            http: HttpSettings::default(),
        }
    }

    pub fn from_env() -> NoxResult<Self> {
        let token = required_env("NOXPAY_CHECKOUT_TOKEN")?;
        Ok(Self {
            token: token.into(),
            base_url: env::var("NOXPAY_CHECKOUT_BASE_URL")
                .unwrap_or_else(|_| CHECKOUT_BASE_URL.to_string()),
            http: HttpSettings::from_env(),
        })
    }
}

/// Payment-link API configuration
#[derive(Debug, Clone)]
pub struct PaymentLinkConfig {
    pub api_key: Credential,
    pub base_url: String,
    pub http: HttpSettings,
}

impl PaymentLinkConfig {
    pub fn new(api_key: impl Into<Credential>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: PAYMENT_LINK_BASE_URL.to_string(),
            http: HttpSettings::default(),
        }
    }

    pub fn from_env() -> NoxResult<Self> {
        let api_key = required_env("NOXPAY_PAYMENT_LINK_KEY")?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: env::var("NOXPAY_PAYMENT_LINK_BASE_URL")
                .unwrap_or_else(|_| PAYMENT_LINK_BASE_URL.to_string()),
            http: HttpSettings::from_env(),
        })
    }
}

/// V2 payment/account API configuration
#[derive(Debug, Clone)]
pub struct V2Config {
    pub api_token: Credential,
    /// Used only to verify inbound webhook signatures
    pub secret_key: Credential,
    pub base_url: String,
    pub http: HttpSettings,
}

impl V2Config {
    pub fn new(api_token: impl Into<Credential>, secret_key: impl Into<Credential>) -> Self {
        Self {
            api_token: api_token.into(),
            secret_key: secret_key.into(),
            base_url: V2_BASE_URL.to_string(),
            http: HttpSettings::default(),
        }
    }

    pub fn from_env() -> NoxResult<Self> {
        let api_token = required_env("NOXPAY_API_TOKEN")?;
        let secret_key = required_env("NOXPAY_SECRET_KEY")?;
        Ok(Self {
            api_token: api_token.into(),
            secret_key: secret_key.into(),
            base_url: env::var("NOXPAY_V2_BASE_URL").unwrap_or_else(|_| V2_BASE_URL.to_string()),
            http: HttpSettings::from_env(),
        })
    }
}

/// TLS materials for the webhook listener.
///
/// TLS is only enabled when both `cert` and `key` are present.
#[derive(Debug, Clone)]
pub struct TlsOptions {
    pub cert: Option<PathBuf>,
    pub key: Option<PathBuf>,
    /// CA bundle used to verify client certificates when `verify_peer` is set
    pub client_ca: Option<PathBuf>,
    pub allow_self_signed: bool,
    pub verify_peer: bool,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            cert: None,
            key: None,
            client_ca: None,
            allow_self_signed: false,
            verify_peer: true,
        }
    }
}

impl TlsOptions {
    pub fn new(cert: impl Into<PathBuf>, key: impl Into<PathBuf>) -> Self {
        Self {
            cert: Some(cert.into()),
            key: Some(key.into()),
            ..Default::default()
        }
    }

    /// Certificate and key paths, when both are configured.
    pub fn identity(&self) -> Option<(&PathBuf, &PathBuf)> {
        match (&self.cert, &self.key) {
            (Some(cert), Some(key))
                if !cert.as_os_str().is_empty() && !key.as_os_str().is_empty() =>
            {
                Some((cert, key))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub host: String,
    pub port: u16,
    pub secret_key: Credential,
    pub tls: Option<TlsOptions>,
    pub shutdown_grace: Duration,
}

/// Configuration of the `noxpay-webhook` binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub webhook: WebhookConfig,
    /// Present when `NOXPAY_API_TOKEN` is set; shares the webhook signing secret
    pub v2: Option<V2Config>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = env::var("WEBHOOK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("WEBHOOK_PORT")
            .context("WEBHOOK_PORT not set")?
            .parse()
            .context("WEBHOOK_PORT must be a valid number")?;
        let secret_key: Credential = env::var("NOXPAY_SECRET_KEY")
            .context("NOXPAY_SECRET_KEY not set")?
            .into();

        let tls_cert = env::var("WEBHOOK_TLS_CERT").ok().map(PathBuf::from);
        let tls_key = env::var("WEBHOOK_TLS_KEY").ok().map(PathBuf::from);
        let tls = if tls_cert.is_some() || tls_key.is_some() {
            Some(TlsOptions {
                cert: tls_cert,
                key: tls_key,
                client_ca: env::var("WEBHOOK_TLS_CLIENT_CA").ok().map(PathBuf::from),
                allow_self_signed: env_flag("WEBHOOK_TLS_ALLOW_SELF_SIGNED").unwrap_or(false),
                verify_peer: env_flag("WEBHOOK_TLS_VERIFY_PEER").unwrap_or(true),
            })
        } else {
            None
        };

        let shutdown_grace = Duration::from_secs(
            env::var("WEBHOOK_SHUTDOWN_GRACE_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("WEBHOOK_SHUTDOWN_GRACE_SECS must be a valid number")?,
        );

        let v2 = match env::var("NOXPAY_API_TOKEN") {
            Ok(token) if !token.trim().is_empty() => Some(V2Config::from_env()?),
            _ => None,
        };

        let log_format = env::var("LOG_FORMAT")
            .ok()
            .map(|s| s.parse::<LogFormat>())
            .transpose()
            .map_err(|e| anyhow!(e))?
            .unwrap_or_default();

        let config = Config {
            webhook: WebhookConfig {
                host,
                port,
                secret_key,
                tls,
                shutdown_grace,
            },
            v2,
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.webhook.host.trim().is_empty() {
            return Err(anyhow!("WEBHOOK_HOST cannot be empty"));
        }

        if self.webhook.port == 0 {
            return Err(anyhow!("WEBHOOK_PORT must be greater than 0"));
        }

        if self.webhook.secret_key.is_empty() {
            return Err(anyhow!("NOXPAY_SECRET_KEY cannot be empty"));
        }

        if let Some(tls) = &self.webhook.tls {
            if tls.identity().is_none() {
                return Err(anyhow!(
                    "WEBHOOK_TLS_CERT and WEBHOOK_TLS_KEY must be set together"
                ));
            }
        }

        Ok(())
    }
}

fn required_env(name: &str) -> NoxResult<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(NoxError::config(format!(
            "{} environment variable is required",
            name
        ))),
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
