use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use hd_core::types::{AccountId, NewSpecialist, NewUser, Specialist, User};
use hd_serve::auth::issue_token;
use hd_serve::{app, build_helpdesk, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct Harness {
    _dir: TempDir,
    state: AppState,
    admin: User,
    alice: User,
    x: Specialist,
    y: Specialist,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("helpdesk.db");
        let state = AppState::new(db_path.to_string_lossy(), b"test-secret", false);
        let helpdesk = build_helpdesk(&state).unwrap();
        let user = |name: &str, is_admin: bool| {
            helpdesk
                .directory()
                .add_user(NewUser {
                    username: name.to_string(),
                    email: format!("{name}@example.com"),
                    phone_number: "01000000000".to_string(),
                    is_admin,
                })
                .unwrap()
        };
        let admin = user("root", true);
        let alice = user("alice", false);
        let specialist = |name: &str| {
            helpdesk
                .directory()
                .add_specialist(NewSpecialist {
                    name: name.to_string(),
                    email: format!("{name}@support.example.com"),
                    phone_number: "01100000000".to_string(),
                    specialization: None,
                })
                .unwrap()
        };
        let x = specialist("xena");
        let y = specialist("yusuf");
        Self {
            _dir: dir,
            state,
            admin,
            alice,
            x,
            y,
        }
    }

    fn router(&self) -> Router {
        app(self.state.clone())
    }

    fn token(&self, account: AccountId) -> String {
        issue_token(&self.state.keys, &account, chrono::Duration::hours(1)).unwrap()
    }

    fn user_token(&self, user: &User) -> String {
        self.token(AccountId::User(user.id.clone()))
    }

    fn specialist_token(&self, specialist: &Specialist) -> String {
        self.token(AccountId::Specialist(specialist.id.clone()))
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

fn create_body(reference: u64) -> Value {
    json!({
        "steps": "restarted the router",
        "description": "no internet since morning",
        "image_url": "https://img.example.com/1.png",
        "instapay_reference": reference,
    })
}

#[tokio::test]
async fn health_and_openapi_are_public() {
    let harness = Harness::new();
    let (status, body) = harness.send(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = harness
        .send(Method::GET, "/api/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/help-sessions"].is_object());
}

#[tokio::test]
async fn missing_or_bad_credentials_are_unauthorized() {
    let harness = Harness::new();
    let (status, body) = harness
        .send(Method::GET, "/api/help-sessions", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "unauthorized");

    let (status, _) = harness
        .send(Method::GET, "/api/help-sessions", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_creates_and_reads_a_session() {
    let harness = Harness::new();
    let token = harness.user_token(&harness.alice);
    let (status, body) = harness
        .send(
            Method::POST,
            "/api/help-sessions",
            Some(&token),
            Some(create_body(510000000001)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["type"], "");
    assert_eq!(body["data"]["user"]["username"], "alice");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = harness
        .send(Method::GET, &format!("/api/help-sessions/{id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["instapay_reference"], 510000000001u64);

    let (status, body) = harness
        .send(
            Method::POST,
            "/api/help-sessions",
            Some(&token),
            Some(create_body(510000000001)),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "conflict");
}

#[tokio::test]
async fn role_gate_runs_before_payload_checks() {
    let harness = Harness::new();
    let admin = harness.user_token(&harness.admin);
    let (status, _) = harness
        .send(
            Method::POST,
            "/api/help-sessions",
            Some(&admin),
            Some(create_body(510000000002)),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = harness
        .send(
            Method::POST,
            "/api/help-sessions",
            Some(&admin),
            Some(json!({ "instapay_reference": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let alice = harness.user_token(&harness.alice);
    let (status, body) = harness
        .send(
            Method::POST,
            "/api/help-sessions",
            Some(&alice),
            Some(json!({ "instapay_reference": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");
}

#[tokio::test]
async fn claim_and_status_flow_over_http() {
    let harness = Harness::new();
    let alice = harness.user_token(&harness.alice);
    let (_, body) = harness
        .send(
            Method::POST,
            "/api/help-sessions",
            Some(&alice),
            Some(create_body(510000000003)),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/help-sessions/{id}");

    let x = harness.specialist_token(&harness.x);
    let (status, body) = harness
        .send(Method::PATCH, &uri, Some(&x), Some(json!({ "status": "bogus" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_input");

    let (status, body) = harness
        .send(Method::PATCH, &uri, Some(&x), Some(json!({ "status": "active" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "active");
    assert_eq!(body["data"]["specialist"]["id"], harness.x.id.to_string());

    let y = harness.specialist_token(&harness.y);
    let (status, body) = harness
        .send(Method::PATCH, &uri, Some(&y), Some(json!({ "status": "completed" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, body) = harness
        .send(
            Method::PATCH,
            &format!("/api/help-sessions/technician/{id}/status"),
            Some(&y),
            Some(json!({ "status": "accepted" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "accepted");
    assert_eq!(body["data"]["specialist"]["id"], harness.y.id.to_string());

    let (status, body) = harness
        .send(Method::GET, "/api/events?limit=10", Some(&x), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let kinds: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|event| event["body"]["type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds.first(), Some(&"SessionCreated"));
    assert!(kinds.contains(&"SessionClaimed"));
}

#[tokio::test]
async fn listings_are_paginated_and_restricted() {
    let harness = Harness::new();
    let alice = harness.user_token(&harness.alice);
    for reference in [510000000010u64, 510000000011, 510000000012] {
        let (status, _) = harness
            .send(
                Method::POST,
                "/api/help-sessions",
                Some(&alice),
                Some(create_body(reference)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = harness
        .send(Method::GET, "/api/help-sessions", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = harness.user_token(&harness.admin);
    let (status, body) = harness
        .send(Method::GET, "/api/help-sessions?page=2&limit=2", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["pages"], 2);

    let (status, body) = harness
        .send(
            Method::GET,
            "/api/help-sessions/search?search=0011",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_requests"], 1);

    let (status, body) = harness
        .send(Method::GET, "/api/help-sessions/dashboard", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 3);
}

#[tokio::test]
async fn huge_page_numbers_return_an_empty_page() {
    let harness = Harness::new();
    let alice = harness.user_token(&harness.alice);
    let (status, _) = harness
        .send(
            Method::POST,
            "/api/help-sessions",
            Some(&alice),
            Some(create_body(510000000030)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let admin = harness.user_token(&harness.admin);
    for uri in [
        "/api/help-sessions?page=9223372036854775807&limit=100",
        "/api/help-sessions/all?page=9223372036854775807",
        "/api/help-sessions/search?page=9223372036854775807&limit=100",
    ] {
        let (status, body) = harness.send(Method::GET, uri, Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["success"], true, "{uri}");
    }

    let (_, body) = harness
        .send(
            Method::GET,
            "/api/help-sessions?page=9223372036854775807&limit=100",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["total"], 1);
}

#[tokio::test]
async fn delete_is_admin_only() {
    let harness = Harness::new();
    let alice = harness.user_token(&harness.alice);
    let (_, body) = harness
        .send(
            Method::POST,
            "/api/help-sessions",
            Some(&alice),
            Some(create_body(510000000020)),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/help-sessions/{id}");

    let (status, _) = harness.send(Method::DELETE, &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = harness.user_token(&harness.admin);
    let (status, body) = harness.send(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id);

    let (status, _) = harness.send(Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn correlation_id_is_echoed_or_minted() {
    let harness = Harness::new();
    let request = Request::builder()
        .uri("/api/health")
        .header("x-correlation-id", "corr-test-1")
        .body(Body::empty())
        .unwrap();
    let response = harness.router().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-correlation-id"], "corr-test-1");

    let request = Request::builder()
        .uri("/api/help-sessions")
        .body(Body::empty())
        .unwrap();
    let response = harness.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let minted = response.headers()["x-correlation-id"].to_str().unwrap();
    assert!(minted.starts_with("corr_"));
}
