//! Integration tests for the REST client against a mock HTTP server

use agency_client::{
    ApiClient, AuthContext, AuthGateway, ClientError, Credentials, EntityService,
    HttpAuthGateway, LOGIN_PATH, RecordingNavigator, Resource, SessionHolder,
};
use agency_core::{Config, Record, Session, User};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::{sync::Arc, time::Duration};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

fn admin_session() -> Session {
    Session {
        token: "tok-123".to_string(),
        user: User {
            id: "u1".to_string(),
            email: "admin@example.com".to_string(),
            name: None,
            role: None,
        },
    }
}

struct Harness {
    server: MockServer,
    api: ApiClient,
    session: SessionHolder,
    navigator: Arc<RecordingNavigator>,
}

async fn harness(signed_in: bool) -> Harness {
    let server = MockServer::start().await;
    let session = SessionHolder::in_memory();
    if signed_in {
        session.set(&admin_session()).unwrap();
    }
    let navigator = Arc::new(RecordingNavigator::new());
    let api = ApiClient::new(
        format!("{}/api/v1", server.uri()),
        session.clone(),
        navigator.clone(),
    );
    Harness {
        server,
        api,
        session,
        navigator,
    }
}

#[tokio::test]
async fn test_get_all_unwraps_envelope_and_bare_array_identically() {
    let h = harness(true).await;
    let items = json!([
        {"_id": "p1", "name": "Kit", "pricing": 49.99},
        {"_id": "p2", "name": "Theme", "pricing": 19.0}
    ]);

    Mock::given(method("GET"))
        .and(path("/api/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items.clone()))
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/services"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": items})),
        )
        .mount(&h.server)
        .await;

    let bare = h.api.resource(Resource::Products).get_all().await.unwrap();
    let wrapped = h.api.resource(Resource::Services).get_all().await.unwrap();

    assert_eq!(bare, wrapped);
    assert_eq!(bare.len(), 2);
    assert_eq!(bare[0].id().as_deref(), Some("p1"));
    assert_eq!(bare[1].text("name"), Some("Theme"));
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/careers"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    let records = h.api.resource(Resource::Careers).get_all().await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_missing_token_sends_no_authorization_header() {
    let h = harness(false).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/blogs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;

    h.api.resource(Resource::Blogs).get_all().await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects_once() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/portfolio"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;

    let result = h.api.resource(Resource::Portfolio).get_all().await;

    assert!(matches!(result, Err(ClientError::Unauthorized)));
    assert!(!h.session.is_authenticated());
    assert!(h.session.token().is_none());
    assert_eq!(h.navigator.count(LOGIN_PATH), 1);
}

#[tokio::test]
async fn test_unauthorized_from_any_resource_call() {
    let h = harness(true).await;

    Mock::given(method("DELETE"))
        .and(path("/api/v1/reviews/r1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&h.server)
        .await;

    let result = h.api.resource(Resource::Reviews).delete("r1").await;

    assert!(result.unwrap_err().is_unauthorized());
    assert!(h.session.session().is_none());
    assert_eq!(h.navigator.visits(), vec![LOGIN_PATH.to_string()]);
}

#[tokio::test]
async fn test_other_failures_propagate_without_touching_session() {
    let h = harness(true).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/products"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "database offline"})),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let result = h
        .api
        .resource(Resource::Products)
        .create(&Record::new().with("name", "Kit"))
        .await;

    let Err(ClientError::Status { status, message }) = result else {
        panic!("expected a status error");
    };
    assert_eq!(status, 500);
    assert_eq!(message, "database offline");
    assert!(h.session.is_authenticated());
    assert!(h.navigator.visits().is_empty());
}

#[tokio::test]
async fn test_create_returns_normalized_record() {
    let h = harness(true).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/products"))
        .and(body_json(json!({"name": "Kit", "pricing": 49.99})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": {"_id": "p9", "name": "Kit", "pricing": 49.99}
        })))
        .mount(&h.server)
        .await;

    let created = h
        .api
        .resource(Resource::Products)
        .create(&Record::new().with("name", "Kit").with("pricing", 49.99))
        .await
        .unwrap();

    assert_eq!(created.id().as_deref(), Some("p9"));
    assert_eq!(created.value("pricing").as_f64(), Some(49.99));
}

#[tokio::test]
async fn test_update_without_capability_sends_nothing() {
    let h = harness(true).await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.server)
        .await;

    let result = h
        .api
        .resource(Resource::CaseStudies)
        .update("c1", &Record::new().with("title", "New"))
        .await;

    assert!(matches!(result, Err(ClientError::Unsupported { .. })));
}

#[tokio::test]
async fn test_update_encodes_identifier_and_keeps_id() {
    let h = harness(true).await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/services/a%20b"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    let updated = h
        .api
        .resource(Resource::Services)
        .update("a b", &Record::new().with("title", "SEO"))
        .await
        .unwrap();

    assert_eq!(updated.id().as_deref(), Some("a b"));
    assert_eq!(updated.text("title"), Some("SEO"));
}

#[tokio::test]
async fn test_rejected_envelope_is_an_error() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/blogs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "maintenance"})),
        )
        .mount(&h.server)
        .await;

    let result = h.api.resource(Resource::Blogs).list().await;
    let Err(ClientError::Rejected { message }) = result else {
        panic!("expected a rejected envelope");
    };
    assert_eq!(message, "maintenance");
}

#[tokio::test]
async fn test_non_array_list_is_unexpected_shape() {
    let h = harness(true).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/reviews"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "r1"})))
        .mount(&h.server)
        .await;

    let result = h.api.resource(Resource::Reviews).get_all().await;
    assert!(matches!(result, Err(ClientError::UnexpectedShape { .. })));
}

#[tokio::test]
async fn test_http_login_persists_session() {
    let server = MockServer::start().await;
    let session = SessionHolder::in_memory();

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .and(body_json(json!({"email": "admin@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"token": "fresh", "user": {"_id": "u1", "email": "admin@example.com"}}
        })))
        .mount(&server)
        .await;

    let gateway = HttpAuthGateway::new(format!("{}/api/v1/auth/login", server.uri()), session.clone());
    let auth = AuthContext::new(Arc::new(gateway.clone()), session.clone());

    assert!(auth.login("admin@example.com", "pw").await);
    assert_eq!(session.token().as_deref(), Some("fresh"));
    assert_eq!(gateway.current_session().map(|s| s.user.id), Some("u1".to_string()));
}

#[tokio::test]
async fn test_http_login_rejection_does_not_redirect() {
    let server = MockServer::start().await;
    let session = SessionHolder::in_memory();

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let gateway = HttpAuthGateway::new(format!("{}/auth/login", server.uri()), session.clone());
    let result = gateway
        .login(&Credentials::new("admin@example.com", "bad"))
        .await;

    assert!(matches!(result, Err(ClientError::InvalidCredentials(_))));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_invalid_credentials_never_reach_the_server() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = HttpAuthGateway::new(server.uri(), SessionHolder::in_memory());
    let result = gateway.login(&Credentials::new("nope", "")).await;

    assert!(matches!(result, Err(ClientError::InvalidCredentials(_))));
}

#[tokio::test]
async fn test_configured_login_honors_timeout() {
    let server = MockServer::start().await;
    let session = SessionHolder::in_memory();

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "late", "user": {"_id": "u1", "email": "a@b.co"}}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.api.base_url = server.uri();
    config.api.timeout_seconds = Some(1);
    let gateway = HttpAuthGateway::from_config(&config, session.clone()).unwrap();

    let result = gateway
        .login(&Credentials::new("admin@example.com", "pw"))
        .await;

    assert!(matches!(result, Err(ClientError::Http(ref e)) if e.is_timeout()));
    assert!(!session.is_authenticated());
}
