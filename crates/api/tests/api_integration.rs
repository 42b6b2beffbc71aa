//! API integration tests.
//!
//! The router runs against an in-memory database with every migration applied.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
    middleware::from_fn_with_state,
};
use finboard_api::{AppState, middleware::auth_middleware, router as api_router};
use finboard_common::config::{
    AuthConfig, Config, CronConfig, DatabaseConfig, SchedulerSettings, ServerConfig,
};
use finboard_core::hash_password;
use finboard_db::{
    entities::user::{self, UserRole},
    repositories::UserRepository,
    test_utils::TestDatabase,
};
use sea_orm::Set;
use serde_json::{Value, json};
use tower::ServiceExt;

const CRON_SECRET: &str = "cron-secret";
const PASSWORD: &str = "correct horse";

fn create_test_config(live_suspension_check: bool) -> Config {
    Config {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
        },
        auth: AuthConfig {
            session_secret: "test-session-secret".to_string(),
            session_ttl_days: 30,
            verification_ttl_hours: 24,
            live_suspension_check,
            suspension_cache_ttl_secs: 60,
        },
        cron: CronConfig {
            secret: CRON_SECRET.to_string(),
        },
        push: None,
        scheduler: SchedulerSettings::default(),
    }
}

struct TestApp {
    _db: TestDatabase,
    users: UserRepository,
    app: Router,
}

impl TestApp {
    async fn new(live_suspension_check: bool) -> Self {
        let db = TestDatabase::in_memory().await.unwrap();
        let state = AppState::new(
            &db.connection(),
            &create_test_config(live_suspension_check),
            None,
        );

        let app = Router::new()
            .nest("/api", api_router(&state))
            .layer(from_fn_with_state(state.clone(), auth_middleware))
            .with_state(state);

        Self {
            users: UserRepository::new(db.connection()),
            _db: db,
            app,
        }
    }

    async fn seed_user(&self, id: &str, role: UserRole) {
        let now = chrono::Utc::now();
        self.users
            .create(user::ActiveModel {
                id: Set(id.to_string()),
                email: Set(format!("{id}@example.com")),
                nickname: Set(id.to_string()),
                password_hash: Set(hash_password(PASSWORD).unwrap()),
                role: Set(role),
                email_verified: Set(Some(now.into())),
                two_factor_enabled: Set(false),
                notifications_enabled: Set(false),
                suspended: Set(false),
                suspended_reason: Set(None),
                suspended_appeal: Set(None),
                deleted_at: Set(None),
                reactivated_at: Set(None),
                created_at: Set(now.into()),
                updated_at: Set(None),
            })
            .await
            .unwrap();
    }

    async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri).method(method);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    async fn sign_in(&self, id: &str) -> String {
        let (status, body) = self
            .send(
                "POST",
                "/api/auth/sign-in",
                None,
                Some(json!({ "email": format!("{id}@example.com"), "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "sign-in failed: {body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(false).await;
    let (status, body) = app.send("GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_cron_requires_shared_secret() {
    let app = TestApp::new(false).await;

    let (status, _) = app.send("GET", "/api/cron/cleanup", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("GET", "/api/cron/cleanup", Some("wrong"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send("GET", "/api/cron/cleanup", Some(CRON_SECRET), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["data"]["accountsDeleted"], 0);

    let (status, body) = app
        .send("GET", "/api/cron/notifications", Some(CRON_SECRET), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["skipped"], true);
}

#[tokio::test]
async fn test_register_then_unverified_sign_in_fails() {
    let app = TestApp::new(false).await;

    let (status, body) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "Fresh@Example.com", "nickname": "fresh", "password": "long enough" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "fresh@example.com");
    assert!(body["data"].get("verificationToken").is_none());

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "fresh@example.com", "nickname": "other", "password": "long enough" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .send(
            "POST",
            "/api/auth/sign-in",
            None,
            Some(json!({ "email": "fresh@example.com", "password": "long enough" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_anonymous_caller_is_rejected() {
    let app = TestApp::new(false).await;

    let (status, body) = app.send("GET", "/api/account/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = app
        .send("GET", "/api/account/me", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_check_live_role() {
    let app = TestApp::new(false).await;
    app.seed_user("alice", UserRole::User).await;
    let token = app.sign_in("alice").await;

    let (status, _) = app
        .send("GET", "/api/admin/appeals", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_snapshot_gate_is_stale_until_refresh() {
    let app = TestApp::new(false).await;
    app.seed_user("admin", UserRole::Admin).await;
    app.seed_user("alice", UserRole::User).await;
    let admin = app.sign_in("admin").await;
    let alice = app.sign_in("alice").await;

    let (status, _) = app
        .send(
            "POST",
            "/api/admin/users/suspend",
            Some(&admin),
            Some(json!({ "userId": "alice", "reason": "spam" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The old token still says "not suspended"
    let post = json!({ "title": "hello", "content": "first post" });
    let (status, _) = app
        .send("POST", "/api/posts", Some(&alice), Some(post.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send("POST", "/api/auth/refresh", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let refreshed = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = app
        .send("POST", "/api/posts", Some(&refreshed), Some(post))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["error"].as_str().unwrap().contains("spam"));

    // Self-service routes stay open
    let (status, body) = app
        .send("GET", "/api/account/me", Some(&refreshed), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "suspended");

    let (status, _) = app
        .send(
            "POST",
            "/api/account/appeal",
            Some(&refreshed),
            Some(json!({ "appeal": "please review" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send("GET", "/api/admin/appeals", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["appeal"], "please review");

    // Reading the board needs no gate
    let (status, _) = app.send("GET", "/api/posts", Some(&refreshed), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_live_gate_sees_suspension_immediately() {
    let app = TestApp::new(true).await;
    app.seed_user("admin", UserRole::Admin).await;
    app.seed_user("alice", UserRole::User).await;
    let admin = app.sign_in("admin").await;
    let alice = app.sign_in("alice").await;

    let flow = json!({ "title": "Rent", "amount": -700000, "dayOfMonth": 25 });
    let (status, _) = app
        .send("POST", "/api/cash-flows", Some(&alice), Some(flow.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            "POST",
            "/api/admin/users/suspend",
            Some(&admin),
            Some(json!({ "userId": "alice", "reason": "chargeback fraud" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send("POST", "/api/cash-flows", Some(&alice), Some(flow.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            "POST",
            "/api/admin/users/unsuspend",
            Some(&admin),
            Some(json!({ "userId": "alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send("POST", "/api/cash-flows", Some(&alice), Some(flow))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_report_flow_over_http() {
    let app = TestApp::new(false).await;
    app.seed_user("admin", UserRole::Admin).await;
    app.seed_user("author", UserRole::User).await;
    app.seed_user("reader", UserRole::User).await;
    let admin = app.sign_in("admin").await;
    let author = app.sign_in("author").await;
    let reader = app.sign_in("reader").await;

    let (_, body) = app
        .send(
            "POST",
            "/api/posts",
            Some(&author),
            Some(json!({ "title": "Tips", "content": "spend less" })),
        )
        .await;
    let post_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            "POST",
            "/api/reports",
            Some(&reader),
            Some(json!({ "target": { "kind": "post", "id": post_id }, "reason": "욕설" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let report_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send("GET", "/api/admin/reports?status=pending", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["reason"], "욕설");
    assert_eq!(body["data"][0]["targetAuthor"]["id"], "author");

    let resolve = json!({ "reportId": report_id });
    let (status, body) = app
        .send("POST", "/api/admin/reports/resolve", Some(&admin), Some(resolve.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "resolved");

    let (status, _) = app
        .send("POST", "/api/admin/reports/reject", Some(&admin), Some(resolve))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_soft_delete_over_http() {
    let app = TestApp::new(false).await;
    app.seed_user("alice", UserRole::User).await;
    let alice = app.sign_in("alice").await;

    let (status, body) = app
        .send("POST", "/api/account/delete", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "softDeletePending");
    assert!(body["data"]["deletionScheduledFor"].is_string());

    let (status, body) = app
        .send("POST", "/api/account/delete/cancel", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["state"], "active");
    assert!(body["data"]["reactivatedAt"].is_string());

    let (status, body) = app
        .send(
            "POST",
            "/api/account/reactivation-notice/clear",
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["reactivatedAt"].is_null());
}

#[tokio::test]
async fn test_inquiry_desk_over_http() {
    let app = TestApp::new(false).await;
    app.seed_user("admin", UserRole::Admin).await;
    app.seed_user("alice", UserRole::User).await;
    let admin = app.sign_in("admin").await;
    let alice = app.sign_in("alice").await;

    let (_, body) = app
        .send(
            "POST",
            "/api/inquiries",
            Some(&alice),
            Some(json!({ "title": "Help", "content": "how do I export?" })),
        )
        .await;
    let inquiry_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .send(
            "POST",
            "/api/admin/inquiries/answer",
            Some(&admin),
            Some(json!({ "inquiryId": inquiry_id, "content": "settings, then export" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "answered");

    let (status, body) = app
        .send("GET", &format!("/api/inquiries/{inquiry_id}"), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["answers"].as_array().unwrap().len(), 1);

    let (_, body) = app
        .send("GET", "/api/admin/inquiries/stats", Some(&admin), None)
        .await;
    assert_eq!(body["data"]["answered"], 1);
    assert_eq!(body["data"]["pending"], 0);
}
