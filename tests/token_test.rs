use chrono::Utc;
use serde_json::json;
use sporldl::{
    error::AuthError,
    management::{TokenManager, basic_auth_header},
    types::{Credential, Session},
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

fn token_url(server: &MockServer) -> String {
    format!("{}/api/token", server.uri())
}

#[test]
fn test_basic_auth_header_encodes_id_and_secret() {
    // base64("id:secret")
    assert_eq!(basic_auth_header("id", "secret"), "Basic aWQ6c2VjcmV0");
}

#[test]
fn test_credential_validity_uses_expiry_margin() {
    let credential = Credential::from_response(
        serde_json::from_value(json!({"access_token": "abc", "expires_in": 3600})).unwrap(),
        1_000,
    )
    .unwrap();

    assert_eq!(credential.expires_at, 1_000 + 3600 - 30);
    assert!(credential.is_valid_at(1_000 + 3569));
    assert!(!credential.is_valid_at(1_000 + 3570));
}

#[tokio::test]
async fn test_warm_cache_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let manager = TokenManager::new(&token_url(&server), "id", "secret").with_credential(Credential {
        access_token: "cached".to_string(),
        expires_at: Utc::now().timestamp() + 600,
    });

    assert_eq!(manager.get_token().await.unwrap(), "cached");
    assert_eq!(manager.get_token().await.unwrap(), "cached");
}

#[tokio::test]
async fn test_expired_cache_refreshes_exactly_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(header("authorization", basic_auth_header("id", "secret").as_str()))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh", "expires_in": 3600})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = TokenManager::new(&token_url(&server), "id", "secret").with_credential(Credential {
        access_token: "stale".to_string(),
        expires_at: Utc::now().timestamp() - 1,
    });

    assert_eq!(manager.get_token().await.unwrap(), "fresh");
    // second call is served from the refreshed cache
    assert_eq!(manager.get_token().await.unwrap(), "fresh");

    let cached = manager.current_credential().await.unwrap();
    let now = Utc::now().timestamp();
    assert!(cached.expires_at <= now + 3600 - 30);
    assert!(cached.expires_at > now + 3500);
}

#[tokio::test]
async fn test_empty_cache_fetches_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "first", "expires_in": 3600, "token_type": "Bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = TokenManager::new(&token_url(&server), "id", "secret");
    assert_eq!(manager.get_token().await.unwrap(), "first");
}

#[tokio::test]
async fn test_rejected_refresh_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "invalid_client"})))
        .expect(1)
        .mount(&server)
        .await;

    let manager = TokenManager::new(&token_url(&server), "id", "wrong");
    let err = manager.get_token().await.unwrap_err();

    match err {
        AuthError::Rejected { status, .. } => assert_eq!(status.as_u16(), 401),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_token_payload_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "nope"})))
        .mount(&server)
        .await;

    let manager = TokenManager::new(&token_url(&server), "id", "secret");
    assert!(matches!(
        manager.get_token().await,
        Err(AuthError::Malformed(_))
    ));
}

#[test]
fn test_unusable_lifetime_yields_no_credential() {
    for expires_in in [0, -5, i64::MAX] {
        let response = serde_json::from_value(json!({"access_token": "t", "expires_in": expires_in}))
            .unwrap();
        assert!(Credential::from_response(response, 1_000).is_none());
    }
}

#[tokio::test]
async fn test_overflowing_lifetime_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "t", "expires_in": i64::MAX})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let manager = TokenManager::new(&token_url(&server), "id", "secret");
    assert!(matches!(
        manager.get_token().await,
        Err(AuthError::Malformed(_))
    ));
    assert!(manager.current_credential().await.is_none());
}

#[tokio::test]
async fn test_from_session_reuses_session_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let session = Session {
        username: "me".to_string(),
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        credential: Some(Credential {
            access_token: "from-login".to_string(),
            expires_at: Utc::now().timestamp() + 600,
        }),
    };

    let manager = TokenManager::from_session(&session, &token_url(&server));
    assert_eq!(manager.get_token().await.unwrap(), "from-login");
}
