//! Error types for the authentication gate

/// Startup-time configuration errors.
///
/// Any of these prevents the gate from being constructed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CAS server login URL is required")]
    MissingLoginUrl,

    #[error("CAS server login URL is not an absolute URL: {0}")]
    InvalidLoginUrl(String),

    /// `renew` forces an interactive login while `gateway` forbids one.
    #[error("renew and gateway cannot both be enabled")]
    RenewAndGateway,

    #[error("invalid ignore pattern {pattern:?}: {reason}")]
    InvalidIgnorePattern { pattern: String, reason: String },

    #[error("unknown ignore pattern type: {0}")]
    UnknownPatternType(String),

    #[error("unknown CAS protocol: {0}")]
    UnknownProtocol(String),

    #[error("unknown redirect strategy: {0}")]
    UnknownRedirectStrategy(String),
}

/// Per-request failures. These abort the request with an error response.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("failed to construct service URL: {0}")]
    ServiceUrl(String),
}
