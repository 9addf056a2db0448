//! CAS single-sign-on gate
//!
//! Provides an authentication gate that either lets a request through or
//! redirects the caller to a CAS server, plus the axum wiring around it.

#![deny(dead_code)]

pub mod auth;
pub mod config;
pub mod session;
pub mod web;

use auth::{redirect::RedirectStrategy, AuthenticationGate};
use config::Config;
use session::InMemorySessionStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AuthenticationGate>,
    pub sessions: Arc<InMemorySessionStore>,
    pub redirect_strategy: Arc<dyn RedirectStrategy>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the shared state; fails if the gate configuration is invalid
    pub fn new(config: Config) -> Result<Self, auth::ConfigError> {
        let gate = AuthenticationGate::new(config.gate.clone())?;
        let sessions = InMemorySessionStore::new(std::time::Duration::from_secs(
            config.session_ttl_secs,
        ));
        let redirect_strategy = auth::redirect::build_redirect_strategy(config.gate.redirect_strategy);

        Ok(Self {
            gate: Arc::new(gate),
            sessions: Arc::new(sessions),
            redirect_strategy,
            config: Arc::new(config),
        })
    }
}
