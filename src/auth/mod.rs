//! CAS authentication gate
//!
//! ## Structure
//!
//! - `matcher`: URL exclusion strategies (contains, regex, exact)
//! - `assertion`: assertion lookup and ticket extraction
//! - `gateway`: gateway (silent authentication) bookkeeping
//! - `redirect_url`: CAS login URL construction
//! - `service_url`: callback URL construction
//! - `gate`: the ordered pass/redirect decision
//! - `redirect`: redirect response strategies
//! - `middleware`: axum middleware wiring the gate into a router
//!
//! ## Request Flow
//!
//! 1. Excluded URL, existing assertion or ticket → request proceeds
//! 2. Gateway mode and an attempt already made → request proceeds
//! 3. Otherwise → redirect to `<login_url>?service=<callback>[&renew=true][&gateway=true][&method=…]`

pub mod assertion;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod helpers;
pub mod matcher;
pub mod middleware;
pub mod protocol;
pub mod redirect;
pub mod redirect_url;
pub mod request;
pub mod service_url;

pub use assertion::{has_assertion, TicketExtractor, ASSERTION_SESSION_KEY};
pub use error::{ConfigError, GateError};
pub use gate::{AuthenticationGate, Decision};
pub use gateway::{GatewayResolver, SessionGatewayResolver};
pub use matcher::{ContainsMatcher, ExactMatcher, PatternKind, RegexMatcher, UrlPatternMatcher};
pub use middleware::authentication_gate;
pub use protocol::Protocol;
pub use redirect::{AjaxAwareRedirectStrategy, DefaultRedirectStrategy, RedirectStrategy};
pub use redirect_url::{build_login_redirect_url, FlagStyle, LoginRedirect};
pub use request::RequestContext;
pub use service_url::{DefaultServiceUrlBuilder, ServiceUrlBuilder};
