//! Gateway (silent authentication) bookkeeping
//!
//! In gateway mode the CAS server is asked to authenticate without showing
//! a login form. If it cannot, it sends the browser back to the service URL
//! without a ticket. The resolver remembers that an attempt was made so the
//! returning request is let through instead of looping back to CAS.

use serde_json::Value;

use super::helpers::append_query_parameter;
use super::request::RequestContext;

/// Prefix of the session keys holding gateway attempts
pub const GATEWAY_SESSION_KEY_PREFIX: &str = "_const_cas_gateway_";

pub trait GatewayResolver: Send + Sync {
    /// Whether an attempt for exactly `service_url` was recorded. Consumes it.
    fn has_already_attempted(&self, ctx: &RequestContext, service_url: &str) -> bool;

    /// Record an attempt and return the service URL to send to CAS
    fn record_attempt(&self, ctx: &mut RequestContext, service_url: &str) -> String;
}

/// Stores gateway attempts in the caller's session.
///
/// With a marker configured, `<marker>=true` is appended to the service URL
/// before recording, so the URL CAS echoes back is recognisably one we
/// produced.
#[derive(Debug, Clone, Default)]
pub struct SessionGatewayResolver {
    marker: Option<String>,
}

impl SessionGatewayResolver {
    pub fn new(marker: Option<String>) -> Self {
        Self {
            marker: marker.filter(|m| !m.trim().is_empty()),
        }
    }

    fn rewrite(&self, service_url: &str) -> String {
        match &self.marker {
            Some(marker) if !has_query_parameter(service_url, marker) => {
                append_query_parameter(service_url, marker, "true")
            }
            _ => service_url.to_string(),
        }
    }
}

/// Session key for a given service URL
pub fn gateway_session_key(service_url: &str) -> String {
    format!("{}:{}", GATEWAY_SESSION_KEY_PREFIX, service_url)
}

fn has_query_parameter(url: &str, name: &str) -> bool {
    url::Url::parse(url)
        .map(|parsed| parsed.query_pairs().any(|(k, _)| k == name))
        .unwrap_or(false)
}

impl GatewayResolver for SessionGatewayResolver {
    fn has_already_attempted(&self, ctx: &RequestContext, service_url: &str) -> bool {
        let Some(session) = ctx.session() else {
            return false;
        };

        let attempted = session
            .remove_attribute(&gateway_session_key(service_url))
            .is_some_and(|v| !v.is_null());

        if attempted {
            tracing::debug!(
                event = "gateway_attempt_consumed",
                service_url = %service_url,
                "Gateway attempt already made for this service URL"
            );
        }
        attempted
    }

    fn record_attempt(&self, ctx: &mut RequestContext, service_url: &str) -> String {
        let rewritten = self.rewrite(service_url);
        let session = ctx.session_or_create();

        let previous = session.set_attribute(gateway_session_key(&rewritten), Value::Bool(true));
        if previous.is_some() {
            // Two requests in the same session raced to the CAS server.
            tracing::warn!(
                event = "gateway_duplicate_attempt",
                service_url = %rewritten,
                "Gateway attempt recorded twice; a duplicate redirect may follow"
            );
        }

        tracing::debug!(
            event = "gateway_attempt_recorded",
            service_url = %rewritten,
            rewritten = rewritten != service_url,
            "Recorded gateway attempt"
        );
        rewritten
    }
}
