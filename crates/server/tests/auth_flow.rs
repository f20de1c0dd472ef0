use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use configs::AppConfig;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;

use service::auth::domain::{AuthUser, Claims};

struct TestApp {
    app: Router,
    state: server::routes::auth::ServerState,
    _uploads: tempfile::TempDir,
}

async fn build_app() -> anyhow::Result<TestApp> {
    let uploads = tempfile::tempdir()?;
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = "test-secret".into();
    cfg.storage.upload_dir = uploads.path().to_string_lossy().into_owned();
    cfg.geo.nominatim_url = "http://127.0.0.1:9".into();
    cfg.geo.overpass_url = "http://127.0.0.1:9".into();
    // Routes under test reject the request before any query runs
    let state = server::build_state(DatabaseConnection::Disconnected, cfg).await?;
    let app = server::build_app(state.clone());
    Ok(TestApp { app, state, _uploads: uploads })
}

fn user(id: i64, roles: &[&str]) -> AuthUser {
    AuthUser {
        id,
        username: format!("user{id}"),
        email: None,
        full_name: "Test".into(),
        position: None,
        department: None,
        roles: roles.iter().map(|r| r.to_string()).collect(),
        is_active: true,
    }
}

async fn body_json(resp: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(resp.into_body(), 1 << 20).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    let t = build_app().await?;
    let resp = t.app.oneshot(Request::get("/health").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await?["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn api_without_token_is_401_json() -> anyhow::Result<()> {
    let t = build_app().await?;
    let resp = t.app.oneshot(Request::get("/api/tasks").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await?;
    assert_eq!(body["status"], 401);
    assert_eq!(body["error"], "Unauthorized");
    Ok(())
}

#[tokio::test]
async fn garbage_and_expired_tokens_are_rejected() -> anyhow::Result<()> {
    let t = build_app().await?;
    let req = Request::get("/api/auth/me").header("authorization", "Bearer not-a-jwt").body(Body::empty())?;
    assert_eq!(t.app.clone().oneshot(req).await?.status(), StatusCode::UNAUTHORIZED);

    let req = Request::get("/api/auth/me").header("authorization", "Basic dXNlcjpwYXNz").body(Body::empty())?;
    assert_eq!(t.app.clone().oneshot(req).await?.status(), StatusCode::UNAUTHORIZED);

    let expired = Claims { sub: "admin".into(), uid: 1, roles: vec!["ADMIN".into()], exp: 1_000 };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &expired,
        &jsonwebtoken::EncodingKey::from_secret(b"test-secret"),
    )?;
    let req = Request::get("/api/auth/me").header("authorization", format!("Bearer {token}")).body(Body::empty())?;
    assert_eq!(t.app.oneshot(req).await?.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() -> anyhow::Result<()> {
    let t = build_app().await?;
    let claims = Claims { sub: "admin".into(), uid: 1, roles: vec!["ADMIN".into()], exp: 4_102_444_800 };
    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(b"someone-else"),
    )?;
    let req = Request::get("/api/tasks").header("authorization", format!("Bearer {token}")).body(Body::empty())?;
    assert_eq!(t.app.oneshot(req).await?.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn non_admin_cannot_delete_reference_data() -> anyhow::Result<()> {
    let t = build_app().await?;
    let token = t.state.auth.issue_token(&user(5, &["MANAGER"]))?;
    for uri in ["/api/references/stores/1", "/api/regions/1"] {
        let req = Request::delete(uri).header("authorization", format!("Bearer {token}")).body(Body::empty())?;
        let resp = t.app.clone().oneshot(req).await?;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body_json(resp).await?["status"], 403);
    }
    let req = Request::post("/api/admin/renewal/run").header("authorization", format!("Bearer {token}")).body(Body::empty())?;
    assert_eq!(t.app.oneshot(req).await?.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn validation_errors_are_400() -> anyhow::Result<()> {
    let t = build_app().await?;
    let token = t.state.auth.issue_token(&user(1, &["ADMIN"]))?;
    let req = Request::get("/api/geo/stores/1/nearby?radius=0")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())?;
    let resp = t.app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await?["error"], "Validation Error");
    Ok(())
}

#[tokio::test]
async fn malformed_input_is_json_400() -> anyhow::Result<()> {
    let t = build_app().await?;
    let token = t.state.auth.issue_token(&user(1, &["ADMIN"]))?;
    let bearer = format!("Bearer {token}");

    let bodies = [
        ("/api/tasks", r#"{"title":"t","licenseType":"BEER","actionType":"NEW"}"#),
        ("/api/payments", r#"{"amount":"abc"}"#),
        ("/api/tasks", r#"{"title":"#),
    ];
    for (uri, body) in bodies {
        let req = Request::post(uri)
            .header("authorization", &bearer)
            .header("content-type", "application/json")
            .body(Body::from(body))?;
        let resp = t.app.clone().oneshot(req).await?;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri} {body}");
        let json = body_json(resp).await?;
        assert_eq!(json["status"], 400);
        assert_eq!(json["error"], "Validation Error");
        assert!(json["message"].is_string());
    }

    for uri in ["/api/tasks/1/status?status=BOGUS", "/api/tasks/abc/status?status=DONE"] {
        let req = Request::put(uri).header("authorization", &bearer).body(Body::empty())?;
        let resp = t.app.clone().oneshot(req).await?;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(resp).await?["error"], "Validation Error");
    }

    let req = Request::post("/api/tasks")
        .header("authorization", &bearer)
        .body(Body::from(r#"{"title":"t"}"#))?;
    let resp = t.app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body_json(resp).await?["status"], 415);
    Ok(())
}

#[tokio::test]
async fn email_send_without_smtp_fails() -> anyhow::Result<()> {
    let t = build_app().await?;
    let token = t.state.auth.issue_token(&user(1, &["MANAGER"]))?;
    let req = Request::post("/api/email/send")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(r#"{"to":"a@b.ru","subject":"s","text":"t"}"#))?;
    let resp = t.app.oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(resp).await?;
    assert!(body["message"].as_str().unwrap_or_default().contains("not configured"));
    Ok(())
}

#[tokio::test]
async fn openapi_and_metrics_are_public() -> anyhow::Result<()> {
    let t = build_app().await?;
    let resp = t.app.clone().oneshot(Request::get("/api-docs/openapi.json").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let doc = body_json(resp).await?;
    assert!(doc["paths"]["/api/tasks"].is_object());
    assert!(doc["paths"]["/api/dev/projects/{id}/gantt"].is_object());

    let _ = t.app.clone().oneshot(Request::get("/health").body(Body::empty())?).await?;
    let resp = t.app.oneshot(Request::get("/metrics").body(Body::empty())?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(to_bytes(resp.into_body(), 1 << 20).await?.to_vec())?;
    assert!(text.contains("licensing_requests_total"));
    Ok(())
}

#[tokio::test]
async fn preflight_skips_auth() -> anyhow::Result<()> {
    let t = build_app().await?;
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/api/tasks")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "GET")
        .body(Body::empty())?;
    let resp = t.app.oneshot(req).await?;
    assert_ne!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
