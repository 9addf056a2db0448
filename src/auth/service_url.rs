//! Service (callback) URL construction
//!
//! The service URL is where CAS sends the browser back after login. The gate
//! only depends on the [`ServiceUrlBuilder`] trait; [`DefaultServiceUrlBuilder`]
//! is the implementation wired up by the binary.

use super::error::GateError;
use super::helpers::strip_query_parameters;
use super::request::RequestContext;

pub trait ServiceUrlBuilder: Send + Sync {
    fn build(&self, ctx: &RequestContext) -> Result<String, GateError>;
}

/// Reconstructs the callback URL from the request.
///
/// Resolution order:
/// 1. a fixed `service` URL, used verbatim;
/// 2. a configured server name (`https://` is assumed without a scheme);
/// 3. the request's own scheme and host.
///
/// The request path is appended, then the query string with the ticket and
/// service parameters removed so CAS never sees a stale ticket echoed back.
#[derive(Debug, Clone)]
pub struct DefaultServiceUrlBuilder {
    service: Option<String>,
    server_name: Option<String>,
    ticket_parameter_name: String,
    service_parameter_name: String,
}

impl DefaultServiceUrlBuilder {
    pub fn new(
        service: Option<String>,
        server_name: Option<String>,
        ticket_parameter_name: impl Into<String>,
        service_parameter_name: impl Into<String>,
    ) -> Self {
        Self {
            service: service.filter(|s| !s.trim().is_empty()),
            server_name: server_name
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty()),
            ticket_parameter_name: ticket_parameter_name.into(),
            service_parameter_name: service_parameter_name.into(),
        }
    }

    fn origin(&self, ctx: &RequestContext) -> Result<String, GateError> {
        if let Some(server_name) = &self.server_name {
            return Ok(if server_name.contains("://") {
                server_name.clone()
            } else {
                format!("https://{}", server_name)
            });
        }

        ctx.host()
            .map(|host| format!("{}://{}", ctx.scheme(), host))
            .ok_or_else(|| {
                GateError::ServiceUrl(
                    "request has no Host and no server name is configured".to_string(),
                )
            })
    }
}

impl ServiceUrlBuilder for DefaultServiceUrlBuilder {
    fn build(&self, ctx: &RequestContext) -> Result<String, GateError> {
        if let Some(service) = &self.service {
            return Ok(service.clone());
        }

        let mut url = self.origin(ctx)?;
        url.push_str(ctx.path());

        let stripped = ctx.query().and_then(|q| {
            strip_query_parameters(
                q,
                &[
                    self.ticket_parameter_name.as_str(),
                    self.service_parameter_name.as_str(),
                ],
            )
        });
        if let Some(query) = stripped {
            url.push('?');
            url.push_str(&query);
        }

        Ok(url)
    }
}
