use super::handlers::{healthz_handler, protected_handler};
use crate::{auth::authentication_gate, AppState};
use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn create_router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/", get(protected_handler))
        .route("/app", get(protected_handler))
        .route("/app/{*rest}", get(protected_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_gate,
        ));

    Router::new()
        .route("/healthz", get(healthz_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ASSERTION_SESSION_KEY;
    use crate::config::{Config, Environment, GateConfig};
    use crate::session::SESSION_COOKIE_NAME;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::json;
    use tower::ServiceExt;

    fn config(gate: GateConfig) -> Config {
        Config {
            environment: Environment::Development,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            session_ttl_secs: 60,
            gate,
        }
    }

    fn app(gate: GateConfig) -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(config(gate)).unwrap());
        (create_router(state.clone()), state)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(header::HOST, "client")
            .body(Body::empty())
            .unwrap()
    }

    fn location(response: &axum::response::Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .expect("Missing location header")
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_unauthenticated_request_is_redirected() {
        let (app, _) = app(GateConfig::new("https://cas.test/login"));

        let response = app.oneshot(get_request("/app/home")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            location(&response),
            "https://cas.test/login?service=http%3A%2F%2Fclient%2Fapp%2Fhome"
        );
        assert!(response.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn test_healthz_is_not_gated() {
        let (app, _) = app(GateConfig::new("https://cas.test/login"));

        let response = app.oneshot(get_request("/healthz")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_ticket_passes_through() {
        let (app, _) = app(GateConfig::new("https://cas.test/login"));

        let response = app
            .oneshot(get_request("/app/home?ticket=ST-1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["path"], "/app/home");
    }

    #[tokio::test]
    async fn test_excluded_path_passes_through() {
        let (app, _) = app(GateConfig {
            ignore_pattern: Some("/app/public".to_string()),
            ..GateConfig::new("https://cas.test/login")
        });

        let response = app.oneshot(get_request("/app/public/info")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_session_with_assertion_passes_through() {
        let (app, state) = app(GateConfig::new("https://cas.test/login"));
        let session = state.sessions.create();
        session.set_attribute(ASSERTION_SESSION_KEY, json!({"principal": "alice"}));

        let request = Request::builder()
            .uri("/app/home")
            .header(header::HOST, "client")
            .header(
                header::COOKIE,
                format!("{}={}", SESSION_COOKIE_NAME, session.id()),
            )
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_gateway_round_trip() {
        let (app, _) = app(GateConfig {
            gateway: true,
            ..GateConfig::new("https://cas.test/login")
        });

        let first = app.clone().oneshot(get_request("/app")).await.unwrap();
        assert_eq!(first.status(), StatusCode::FOUND);
        assert_eq!(
            location(&first),
            "https://cas.test/login?service=http%3A%2F%2Fclient%2Fapp&gateway=true"
        );

        let cookie = first
            .headers()
            .get(header::SET_COOKIE)
            .expect("gateway attempt should create a session")
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with(SESSION_COOKIE_NAME));

        // CAS sends the browser back without a ticket
        let request = Request::builder()
            .uri("/app")
            .header(header::HOST, "client")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let second = app.oneshot(request).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_host_is_an_error_not_a_pass() {
        let (app, _) = app(GateConfig::new("https://cas.test/login"));

        let request = Request::builder()
            .uri("/app/home")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "SERVICE_URL_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_ajax_strategy_returns_401_for_xhr() {
        let (app, _) = app(GateConfig {
            redirect_strategy: crate::auth::redirect::RedirectStrategyKind::Ajax,
            ..GateConfig::new("https://cas.test/login")
        });

        let request = Request::builder()
            .uri("/app/home")
            .header(header::HOST, "client")
            .header("x-requested-with", "XMLHttpRequest")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["login_url"],
            "https://cas.test/login?service=http%3A%2F%2Fclient%2Fapp%2Fhome"
        );
    }
}
