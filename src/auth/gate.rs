//! The authentication gate
//!
//! For every request the gate decides, in order:
//!
//! 1. excluded URL → proceed
//! 2. session already holds an assertion → proceed
//! 3. a ticket is present → proceed (validation happens downstream)
//! 4. gateway mode and an attempt was already made → proceed
//! 5. otherwise → redirect to the CAS login URL
//!
//! The first matching rule wins. Failing to build the service URL is an
//! error, never a silent proceed.

use std::sync::Arc;

use super::assertion::{has_assertion, TicketExtractor};
use super::error::{ConfigError, GateError};
use super::gateway::{GatewayResolver, SessionGatewayResolver};
use super::matcher::{build_matcher, url_with_query, UrlPatternMatcher};
use super::redirect_url::{build_login_redirect_url, LoginRedirect};
use super::request::RequestContext;
use super::service_url::{DefaultServiceUrlBuilder, ServiceUrlBuilder};
use crate::config::GateConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    RedirectTo(String),
}

pub struct AuthenticationGate {
    config: GateConfig,
    ignore_matcher: Option<Box<dyn UrlPatternMatcher>>,
    ticket_extractor: TicketExtractor,
    gateway_resolver: Arc<dyn GatewayResolver>,
    service_url_builder: Arc<dyn ServiceUrlBuilder>,
}

impl AuthenticationGate {
    /// Build a gate with the default collaborators derived from `config`
    pub fn new(config: GateConfig) -> Result<Self, ConfigError> {
        let gateway_resolver = Arc::new(SessionGatewayResolver::new(config.gateway_marker.clone()));
        let service_url_builder = Arc::new(DefaultServiceUrlBuilder::new(
            config.service.clone(),
            config.server_name.clone(),
            config.ticket_parameter_name(),
            config.service_parameter_name(),
        ));
        Self::with_collaborators(config, gateway_resolver, service_url_builder)
    }

    /// Build a gate with explicitly supplied collaborators
    pub fn with_collaborators(
        config: GateConfig,
        gateway_resolver: Arc<dyn GatewayResolver>,
        service_url_builder: Arc<dyn ServiceUrlBuilder>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let ignore_matcher = match config.ignore_pattern.as_deref() {
            Some(pattern) => Some(build_matcher(config.ignore_pattern_kind, pattern)?),
            None => None,
        };
        let ticket_extractor = TicketExtractor::new(config.ticket_parameter_name());

        tracing::info!(
            login_url = %config.login_url,
            protocol = %config.protocol,
            renew = config.renew,
            gateway = config.gateway,
            method = ?config.method,
            ignore_pattern = ?config.ignore_pattern,
            "Authentication gate initialized"
        );

        Ok(Self {
            config,
            ignore_matcher,
            ticket_extractor,
            gateway_resolver,
            service_url_builder,
        })
    }

    /// Replace the URL exclusion matcher (e.g. with a custom strategy)
    pub fn with_ignore_matcher(mut self, matcher: Box<dyn UrlPatternMatcher>) -> Self {
        self.ignore_matcher = Some(matcher);
        self
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    fn is_request_url_excluded(&self, ctx: &RequestContext) -> bool {
        self.ignore_matcher.as_ref().is_some_and(|matcher| {
            matcher.matches(&url_with_query(&ctx.request_url(), ctx.query()))
        })
    }

    /// Decide what to do with one request
    pub fn decide(&self, ctx: &mut RequestContext) -> Result<Decision, GateError> {
        if self.is_request_url_excluded(ctx) {
            tracing::debug!(
                event = "gate_excluded",
                path = %ctx.path(),
                "Request URL excluded from authentication"
            );
            return Ok(Decision::Proceed);
        }

        if has_assertion(ctx) {
            tracing::debug!(
                event = "gate_assertion_present",
                path = %ctx.path(),
                "Session already authenticated"
            );
            return Ok(Decision::Proceed);
        }

        if self.ticket_extractor.extract_ticket(ctx).is_some() {
            tracing::debug!(
                event = "gate_ticket_present",
                path = %ctx.path(),
                "Ticket present; deferring to ticket validation"
            );
            return Ok(Decision::Proceed);
        }

        let service_url = self.service_url_builder.build(ctx)?;

        if self.config.gateway
            && self
                .gateway_resolver
                .has_already_attempted(ctx, &service_url)
        {
            tracing::debug!(
                event = "gate_gatewayed_already",
                service_url = %service_url,
                "Gateway attempt already made; proceeding unauthenticated"
            );
            return Ok(Decision::Proceed);
        }

        let service_url = if self.config.gateway {
            self.gateway_resolver.record_attempt(ctx, &service_url)
        } else {
            service_url
        };

        let url = build_login_redirect_url(&LoginRedirect {
            login_url: &self.config.login_url,
            service_parameter_name: self.config.service_parameter_name(),
            service_url: &service_url,
            renew: self.config.renew,
            gateway: self.config.gateway,
            method: self.config.method.as_deref(),
            flag_style: self.config.flag_style,
        });

        tracing::info!(
            event = "gate_redirect",
            path = %ctx.path(),
            service_url = %service_url,
            gateway = self.config.gateway,
            "Redirecting to CAS login"
        );
        Ok(Decision::RedirectTo(url))
    }
}
