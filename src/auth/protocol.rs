//! CAS protocol variants
//!
//! Each variant fixes the query-parameter names used when talking to the
//! CAS server. The names can still be overridden in configuration.

use std::fmt;
use std::str::FromStr;

use super::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    Cas1,
    #[default]
    Cas2,
    Cas3,
    Saml11,
}

impl Protocol {
    /// Name of the parameter carrying the callback URL
    pub fn service_parameter_name(&self) -> &'static str {
        match self {
            Protocol::Cas1 | Protocol::Cas2 | Protocol::Cas3 => "service",
            Protocol::Saml11 => "TARGET",
        }
    }

    /// Name of the parameter carrying the ticket (artifact)
    pub fn artifact_parameter_name(&self) -> &'static str {
        match self {
            Protocol::Cas1 | Protocol::Cas2 | Protocol::Cas3 => "ticket",
            Protocol::Saml11 => "SAMLart",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Protocol::Cas1 => "CAS1",
            Protocol::Cas2 => "CAS2",
            Protocol::Cas3 => "CAS3",
            Protocol::Saml11 => "SAML11",
        };
        f.write_str(name)
    }
}

impl FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CAS1" => Ok(Protocol::Cas1),
            "CAS2" => Ok(Protocol::Cas2),
            "CAS3" => Ok(Protocol::Cas3),
            "SAML11" | "SAML" => Ok(Protocol::Saml11),
            other => Err(ConfigError::UnknownProtocol(other.to_string())),
        }
    }
}
