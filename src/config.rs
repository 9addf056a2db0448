use std::env;

use crate::auth::{
    error::ConfigError, matcher::PatternKind, redirect::RedirectStrategyKind,
    redirect_url::FlagStyle, Protocol,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

/// Settings of the authentication gate itself.
///
/// Immutable once the gate is built; shared read-only across requests.
#[derive(Debug, Clone)]
pub struct GateConfig {
    pub login_url: String,
    pub protocol: Protocol,
    // Parameter names fall back to the protocol's when unset
    pub service_parameter_name: Option<String>,
    pub ticket_parameter_name: Option<String>,
    pub renew: bool,
    pub gateway: bool,
    pub method: Option<String>,
    pub ignore_pattern: Option<String>,
    pub ignore_pattern_kind: PatternKind,
    pub gateway_marker: Option<String>,
    pub flag_style: FlagStyle,

    // Service URL construction
    pub service: Option<String>,
    pub server_name: Option<String>,

    pub redirect_strategy: RedirectStrategyKind,
}

impl GateConfig {
    /// Defaults for everything but the login URL
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
            protocol: Protocol::default(),
            service_parameter_name: None,
            ticket_parameter_name: None,
            renew: false,
            gateway: false,
            method: None,
            ignore_pattern: None,
            ignore_pattern_kind: PatternKind::default(),
            gateway_marker: None,
            flag_style: FlagStyle::default(),
            service: None,
            server_name: None,
            redirect_strategy: RedirectStrategyKind::default(),
        }
    }

    pub fn service_parameter_name(&self) -> &str {
        self.service_parameter_name
            .as_deref()
            .unwrap_or_else(|| self.protocol.service_parameter_name())
    }

    pub fn ticket_parameter_name(&self) -> &str {
        self.ticket_parameter_name
            .as_deref()
            .unwrap_or_else(|| self.protocol.artifact_parameter_name())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.login_url.trim().is_empty() {
            return Err(ConfigError::MissingLoginUrl);
        }

        match url::Url::parse(&self.login_url) {
            Ok(parsed) if !parsed.cannot_be_a_base() => {}
            _ => return Err(ConfigError::InvalidLoginUrl(self.login_url.clone())),
        }

        if self.renew && self.gateway {
            return Err(ConfigError::RenewAndGateway);
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Environment configuration
    pub environment: Environment,

    // Server configuration
    pub server_host: String,
    pub server_port: u16,

    // Idle time after which a session (and its gateway records) is dropped
    pub session_ttl_secs: u64,

    pub gate: GateConfig,
}

fn parse_bool(value: Option<String>) -> bool {
    value
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
        .unwrap_or(false)
}

impl Config {
    /// Load configuration from environment variables using std::env::var
    pub fn load() -> anyhow::Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_source<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Treat empty values as unset
        let var = |key: &str| var(key).filter(|s| !s.trim().is_empty());

        let environment = match var("ENVIRONMENT")
            .unwrap_or_else(|| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        // Required variables
        let login_url = var("CAS_SERVER_LOGIN_URL").ok_or_else(|| {
            anyhow::anyhow!("CAS_SERVER_LOGIN_URL environment variable is required")
        })?;

        // Optional variables with defaults
        let server_host = var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let server_port = var("SERVER_PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        let session_ttl_secs = var("SESSION_TTL_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1800);

        let protocol = var("CAS_PROTOCOL")
            .map(|s| s.parse::<Protocol>())
            .transpose()?
            .unwrap_or_default();

        let ignore_pattern_kind = var("CAS_IGNORE_PATTERN_TYPE")
            .map(|s| s.parse::<PatternKind>())
            .transpose()?
            .unwrap_or_default();

        let redirect_strategy = var("CAS_REDIRECT_STRATEGY")
            .map(|s| s.parse::<RedirectStrategyKind>())
            .transpose()?
            .unwrap_or_default();

        let flag_style = if parse_bool(var("CAS_EXPLICIT_FALSE_FLAGS")) {
            FlagStyle::Explicit
        } else {
            FlagStyle::OmitFalse
        };

        let gate = GateConfig {
            login_url,
            protocol,
            service_parameter_name: var("CAS_SERVICE_PARAMETER"),
            ticket_parameter_name: var("CAS_TICKET_PARAMETER"),
            renew: parse_bool(var("CAS_RENEW")),
            gateway: parse_bool(var("CAS_GATEWAY")),
            method: var("CAS_METHOD"),
            ignore_pattern: var("CAS_IGNORE_PATTERN"),
            ignore_pattern_kind,
            gateway_marker: var("CAS_GATEWAY_MARKER"),
            flag_style,
            service: var("CAS_SERVICE"),
            server_name: var("CAS_SERVER_NAME"),
            redirect_strategy,
        };

        gate.validate()?;

        Ok(Config {
            environment,
            server_host,
            server_port,
            session_ttl_secs,
            gate,
        })
    }

    /// Check if running in production mode
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get bind address for server
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
