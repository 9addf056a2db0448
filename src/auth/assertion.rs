//! Assertion and ticket lookups
//!
//! Both checks are read-only: looking for an assertion never creates a
//! session, and ticket extraction only reads the query parameters.

use super::request::RequestContext;

/// Session key under which downstream ticket validation stores the assertion
pub const ASSERTION_SESSION_KEY: &str = "_const_cas_assertion_";

/// True when the caller's existing session carries a non-null assertion
pub fn has_assertion(ctx: &RequestContext) -> bool {
    ctx.session()
        .and_then(|session| session.attribute(ASSERTION_SESSION_KEY))
        .is_some()
}

/// Reads the ticket parameter. Empty values count as missing.
#[derive(Debug, Clone)]
pub struct TicketExtractor {
    parameter_name: String,
}

impl TicketExtractor {
    pub fn new(parameter_name: impl Into<String>) -> Self {
        Self {
            parameter_name: parameter_name.into(),
        }
    }

    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    pub fn extract_ticket(&self, ctx: &RequestContext) -> Option<String> {
        ctx.parameter(&self.parameter_name)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    }
}

impl Default for TicketExtractor {
    fn default() -> Self {
        Self::new("ticket")
    }
}
