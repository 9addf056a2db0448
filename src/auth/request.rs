//! Per-request view used by the gate
//!
//! `RequestContext` captures what the gate needs from an inbound request:
//! the absolute request URL, the raw query string, decoded query parameters
//! and the caller's session (if the session cookie names a live one).

use axum::http::{header, request::Parts};
use std::collections::HashMap;
use std::sync::Arc;

use super::helpers::extract_cookie;
use crate::session::{InMemorySessionStore, Session, SESSION_COOKIE_NAME};

pub struct RequestContext {
    scheme: String,
    host: Option<String>,
    path: String,
    query: Option<String>,
    params: HashMap<String, String>,
    sessions: Arc<InMemorySessionStore>,
    session: Option<Session>,
    session_created: bool,
}

impl RequestContext {
    /// Build a context from an absolute URL such as `http://client/app?x=1`.
    ///
    /// Used where no HTTP request is at hand; the URL is split into its
    /// parts the same way an inbound request would be.
    pub fn from_url(url: &str, sessions: Arc<InMemorySessionStore>) -> Self {
        let (base, query) = match url.split_once('?') {
            Some((base, query)) => (base, Some(query.to_string())),
            None => (url, None),
        };

        let (scheme, rest) = base.split_once("://").unwrap_or(("http", base));
        let (host, path) = match rest.find('/') {
            Some(idx) => (&rest[..idx], &rest[idx..]),
            None => (rest, "/"),
        };

        Self::assemble(
            scheme.to_string(),
            Some(host.to_string()).filter(|h| !h.is_empty()),
            path.to_string(),
            query,
            sessions,
            None,
        )
    }

    /// Build a context from axum request parts.
    ///
    /// The scheme honours `X-Forwarded-Proto` (proxies terminate TLS in
    /// front of us); the host comes from the URI authority or `Host`.
    pub fn from_parts(parts: &Parts, sessions: Arc<InMemorySessionStore>) -> Self {
        let scheme = parts
            .headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .or_else(|| parts.uri.scheme_str().map(str::to_string))
            .unwrap_or_else(|| "http".to_string());

        let host = parts
            .uri
            .authority()
            .map(|a| a.as_str().to_string())
            .or_else(|| {
                parts
                    .headers
                    .get(header::HOST)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            })
            .filter(|h| !h.is_empty());

        let session = extract_cookie(&parts.headers, SESSION_COOKIE_NAME)
            .and_then(|id| sessions.get(&id));

        Self::assemble(
            scheme,
            host,
            parts.uri.path().to_string(),
            parts.uri.query().map(str::to_string),
            sessions,
            session,
        )
    }

    fn assemble(
        scheme: String,
        host: Option<String>,
        path: String,
        query: Option<String>,
        sessions: Arc<InMemorySessionStore>,
        session: Option<Session>,
    ) -> Self {
        let mut params = HashMap::new();
        if let Some(q) = query.as_deref() {
            for (name, value) in url::form_urlencoded::parse(q.as_bytes()) {
                params
                    .entry(name.into_owned())
                    .or_insert_with(|| value.into_owned());
            }
        }

        Self {
            scheme,
            host,
            path,
            query: query.filter(|q| !q.is_empty()),
            params,
            sessions,
            session,
            session_created: false,
        }
    }

    /// Attach an existing session (the cookie lookup already happened)
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// `scheme://host/path`, or just the path when the host is unknown
    pub fn request_url(&self) -> String {
        match &self.host {
            Some(host) => format!("{}://{}{}", self.scheme, host, self.path),
            None => self.path.clone(),
        }
    }

    /// First decoded value of a query parameter
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Existing session, if any. Never creates one.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Existing session, or a new one registered in the store
    pub fn session_or_create(&mut self) -> &Session {
        if self.session.is_none() {
            self.session_created = true;
        }
        let sessions = &self.sessions;
        self.session.get_or_insert_with(|| sessions.create())
    }

    /// Id of the session created while handling this request, if any
    pub fn created_session_id(&self) -> Option<&str> {
        if self.session_created {
            self.session.as_ref().map(Session::id)
        } else {
            None
        }
    }
}
