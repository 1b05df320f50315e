//! Bearer token lifecycle against an in-process upstream.

mod common;

use adnet_adapters::token::TokenState;
use adnet_adapters::{EntityKind, Network};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};

use common::{ALL_CREDENTIALS, Hits, jwt_with_exp, payload, registry, spawn_upstream};

#[derive(Clone, Default)]
struct Upstream {
    auth: Hits,
    api: Hits,
}

fn far_future_jwt() -> String {
    jwt_with_exp(Utc::now().timestamp() + 86_400)
}

async fn ironsource_auth(State(up): State<Upstream>, headers: HeaderMap) -> (StatusCode, String) {
    if headers.get("secretkey").and_then(|v| v.to_str().ok()) != Some("is-secret")
        || headers.get("refreshtoken").and_then(|v| v.to_str().ok()) != Some("is-refresh")
    {
        return (StatusCode::UNAUTHORIZED, String::new());
    }
    up.auth.hit();
    (StatusCode::OK, format!("\"{}\"", far_future_jwt()))
}

#[tokio::test]
async fn ironsource_retries_once_after_unauthorized() {
    async fn apps(State(up): State<Upstream>) -> (StatusCode, Json<Value>) {
        if up.api.hit() == 1 {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "expired"})));
        }
        (
            StatusCode::OK,
            Json(json!([{"appKey": "k1", "appName": "Demo", "platform": "Android"}])),
        )
    }

    let upstream = Upstream::default();
    let app = Router::new()
        .route("/partners/publisher/auth", get(ironsource_auth))
        .route("/partners/publisher/applications/v6", get(apps))
        .with_state(upstream.clone());
    let base = spawn_upstream(app).await;
    let registry = registry(&base, "/partners/publisher/auth", ALL_CREDENTIALS);

    let apps = registry.list_apps(Network::IronSource, None).await;
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0].primary_id, "k1");
    assert_eq!(apps[0].entity_kind, EntityKind::App);
    assert_eq!(apps[0].secondary("platform"), Some("Android"));

    assert_eq!(upstream.auth.count(), 2);
    assert_eq!(upstream.api.count(), 2);
}

#[tokio::test]
async fn ironsource_token_is_reused_until_near_expiry() {
    async fn apps(State(up): State<Upstream>, headers: HeaderMap) -> Json<Value> {
        up.api.hit();
        assert!(headers["authorization"].to_str().unwrap().starts_with("Bearer "));
        Json(json!([]))
    }

    let upstream = Upstream::default();
    let app = Router::new()
        .route("/partners/publisher/auth", get(ironsource_auth))
        .route("/partners/publisher/applications/v6", get(apps))
        .with_state(upstream.clone());
    let base = spawn_upstream(app).await;
    let registry = registry(&base, "/partners/publisher/auth", ALL_CREDENTIALS);

    for _ in 0..3 {
        registry.list_apps(Network::IronSource, None).await;
    }
    assert_eq!(upstream.api.count(), 3);
    assert_eq!(upstream.auth.count(), 1);
}

#[tokio::test]
async fn ironsource_persistent_unauthorized_surfaces_failure() {
    async fn create(State(up): State<Upstream>) -> (StatusCode, Json<Value>) {
        up.api.hit();
        (StatusCode::UNAUTHORIZED, Json(json!({"message": "no access"})))
    }

    let upstream = Upstream::default();
    let app = Router::new()
        .route("/partners/publisher/auth", get(ironsource_auth))
        .route("/partners/publisher/applications/v6", post(create))
        .with_state(upstream.clone());
    let base = spawn_upstream(app).await;
    let registry = registry(&base, "/partners/publisher/auth", ALL_CREDENTIALS);

    let result = registry
        .create_app(Network::IronSource, payload(json!({"appName": "Demo"})))
        .await;
    assert!(!result.is_success());
    assert_eq!(result.message, "no access");
    // One original attempt and exactly one retry.
    assert_eq!(upstream.api.count(), 2);
    assert_eq!(upstream.auth.count(), 2);
}

#[tokio::test]
async fn vungle_auth_rejection_is_auth_error() {
    async fn auth(State(up): State<Upstream>) -> Json<Value> {
        up.auth.hit();
        Json(json!({"messages": ["invalid secret token"]}))
    }
    async fn apps(State(up): State<Upstream>) -> Json<Value> {
        up.api.hit();
        Json(json!([]))
    }

    let upstream = Upstream::default();
    let app = Router::new()
        .route("/auth", get(auth))
        .route("/api/v1/applications", post(apps))
        .with_state(upstream.clone());
    let base = spawn_upstream(app).await;
    let registry = registry(&base, "/auth", ALL_CREDENTIALS);

    let result = registry
        .create_app(Network::Vungle, payload(json!({"name": "Demo"})))
        .await;
    assert!(result.code.is("AUTH_ERROR"));
    assert!(result.message.contains("invalid secret token"), "{}", result.message);
    assert_eq!(upstream.api.count(), 0);
}

#[tokio::test]
async fn vungle_token_is_sent_with_version_header() {
    async fn auth(headers: HeaderMap) -> Json<Value> {
        assert_eq!(headers["x-api-key"], "vg-secret");
        Json(json!({"token": "vg-token", "expiresIn": 3600}))
    }
    async fn placements(State(up): State<Upstream>, headers: HeaderMap) -> Json<Value> {
        up.api.hit();
        assert_eq!(headers["authorization"], "Bearer vg-token");
        assert_eq!(headers["vungle-version"], "1");
        Json(json!([{"referenceID": "PLACE-1", "name": "Rewarded"}]))
    }

    let upstream = Upstream::default();
    let app = Router::new()
        .route("/auth", get(auth))
        .route("/api/v1/placements", get(placements))
        .with_state(upstream.clone());
    let base = spawn_upstream(app).await;
    let registry = registry(&base, "/auth", ALL_CREDENTIALS);

    let units = registry.list_units(Network::Vungle, "app-1").await;
    assert_eq!(units[0].primary_id, "PLACE-1");
    assert_eq!(upstream.api.count(), 1);
}

async fn fyber_run(token: Value) -> (usize, usize) {
    async fn apps(State(up): State<Upstream>) -> Json<Value> {
        up.api.hit();
        Json(json!([]))
    }

    let upstream = Upstream::default();
    let auth_upstream = upstream.clone();
    let app = Router::new()
        .route(
            "/auth",
            post(move || {
                let token = token.clone();
                let up = auth_upstream.clone();
                async move {
                    up.auth.hit();
                    Json(token)
                }
            }),
        )
        .route("/api/management/v1/app", get(apps))
        .with_state(upstream.clone());
    let base = spawn_upstream(app).await;
    let registry = registry(&base, "/auth", ALL_CREDENTIALS);

    for _ in 0..3 {
        registry.list_apps(Network::Fyber, None).await;
    }
    (upstream.auth.count(), upstream.api.count())
}

#[tokio::test]
async fn fyber_token_without_expiry_is_fetched_per_call() {
    let (auth, api) = fyber_run(json!({"accessToken": "fy-token"})).await;
    assert_eq!(api, 3);
    assert_eq!(auth, 3);
}

#[tokio::test]
async fn fyber_token_with_expiry_is_cached() {
    let (auth, api) = fyber_run(json!({"accessToken": "fy-token", "expiresIn": 3600})).await;
    assert_eq!(api, 3);
    assert_eq!(auth, 1);
}

#[tokio::test]
async fn fyber_out_of_range_expiry_is_not_cached() {
    for expires_in in [json!(10_000_000_000_000_i64), json!(i64::MAX)] {
        let (auth, api) =
            fyber_run(json!({"accessToken": "fy-token", "expiresIn": expires_in})).await;
        assert_eq!(api, 3);
        assert_eq!(auth, 3);
    }
}

#[tokio::test]
async fn vungle_out_of_range_expiry_still_serves_the_call() {
    async fn auth(State(up): State<Upstream>) -> Json<Value> {
        up.auth.hit();
        Json(json!({"token": "vg-token", "expiresIn": 10_000_000_000_000_i64}))
    }
    async fn placements(State(up): State<Upstream>) -> Json<Value> {
        up.api.hit();
        Json(json!([{"referenceID": "PLACE-1", "name": "Rewarded"}]))
    }

    let upstream = Upstream::default();
    let app = Router::new()
        .route("/auth", get(auth))
        .route("/api/v1/placements", get(placements))
        .with_state(upstream.clone());
    let base = spawn_upstream(app).await;
    let registry = registry(&base, "/auth", ALL_CREDENTIALS);

    for _ in 0..2 {
        let units = registry.list_units(Network::Vungle, "app-1").await;
        assert_eq!(units[0].primary_id, "PLACE-1");
    }
    assert_eq!(upstream.api.count(), 2);
    assert_eq!(upstream.auth.count(), 2);
}

#[tokio::test]
async fn token_state_is_observable_through_adapter() {
    let upstream = Upstream::default();
    let app = Router::new()
        .route("/partners/publisher/auth", get(ironsource_auth))
        .route(
            "/partners/publisher/applications/v6",
            get(|| async { Json(json!([])) }),
        )
        .with_state(upstream.clone());
    let base = spawn_upstream(app).await;
    let registry = registry(&base, "/partners/publisher/auth", ALL_CREDENTIALS);

    let adapter = adnet_adapters::networks::IronSourceAdapter::new(registry.context());
    assert_eq!(adapter.tokens().state(), TokenState::Absent);

    let credential = registry.context().credential(Network::IronSource).unwrap();
    adapter.tokens().bearer(&credential).await.unwrap();
    assert_eq!(adapter.tokens().state(), TokenState::Valid);
    assert_eq!(adapter.tokens().failure_count(), 0);
}
