//! HTTP tests against a mocked DUPR API

use super::*;
use crate::cli::types::{ClubId, PlayerId};
use tempfile::TempDir;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn creds() -> Credentials {
    Credentials {
        username: "me@example.com".to_string(),
        password: "secret".to_string(),
    }
}

fn login_response(token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "status": "SUCCESS",
        "result": {"accessToken": token, "refreshToken": "unused"}
    }))
}

async fn client_for(server: &MockServer) -> DuprClient {
    DuprClient::new(server.uri(), "v1.0").unwrap()
}

#[tokio::test]
async fn test_authenticate_logs_in_and_saves_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1.0/login/"))
        .and(body_partial_json(json!({"email": "me@example.com", "password": "secret"})))
        .respond_with(login_response("fresh-token"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let token_file = dir.path().join("token.json");
    let mut client = client_for(&server).await.with_token_path(token_file.clone());

    client.authenticate(&creds()).await.unwrap();

    assert!(client.has_token());
    assert_eq!(cache::load_token(&token_file).as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn test_authenticate_reuses_saved_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1.0/login/"))
        .respond_with(login_response("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let token_file = dir.path().join("token.json");
    cache::save_token(&token_file, "saved-token").unwrap();

    let mut client = client_for(&server).await.with_token_path(token_file);
    client.authenticate(&creds()).await.unwrap();
    assert!(client.has_token());
}

#[tokio::test]
async fn test_login_failure_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1.0/login/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut client = client_for(&server).await;
    let err = client.authenticate(&creds()).await.unwrap_err();
    assert!(matches!(err, DuprError::LoginFailed { status: 401 }));
}

#[tokio::test]
async fn test_fetch_single_player() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player/v1.0/42"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "SUCCESS",
            "result": {"id": 42, "fullName": "Forty Two", "singles": "3.5"}
        })))
        .mount(&server)
        .await;

    let mut client = client_for(&server).await.with_token("tok");
    let player = client
        .fetch_single(&Endpoint::Player(PlayerId::new(42)))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(player["fullName"], "Forty Two");
}

#[tokio::test]
async fn test_fetch_single_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player/v1.0/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut client = client_for(&server).await.with_token("tok");
    let result = client
        .fetch_single(&Endpoint::Player(PlayerId::new(404)))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_fetch_page_posts_window() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/club/7/members/v1.0/all"))
        .and(body_partial_json(json!({"offset": 20, "limit": 20, "query": "*"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "SUCCESS",
            "result": {
                "offset": 20,
                "limit": 20,
                "total": 21,
                "hits": [{"id": 21, "fullName": "Last Member"}]
            }
        })))
        .mount(&server)
        .await;

    let mut client = client_for(&server).await.with_token("tok");
    let page = client
        .fetch_page(&Endpoint::ClubMembers(ClubId::new(7)), 20, 20)
        .await
        .unwrap();

    assert_eq!(page.total, 21);
    assert_eq!(page.hits.len(), 1);
    assert_eq!(page.next_offset(), None);
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/player/v1.0/1/history"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut client = client_for(&server).await.with_token("tok");
    let err = client
        .fetch_page(&Endpoint::MatchHistory(PlayerId::new(1)), 0, 20)
        .await
        .unwrap_err();

    match err {
        DuprError::Transport { status, endpoint } => {
            assert_eq!(status, 500);
            assert_eq!(endpoint, "/player/v1.0/1/history");
        }
        other => panic!("Expected Transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_forbidden_triggers_single_relogin_and_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player/v1.0/42"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1.0/login/"))
        .respond_with(login_response("renewed"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/player/v1.0/42"))
        .and(header("authorization", "Bearer renewed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"id": 42, "fullName": "Forty Two"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await.with_token("stale");
    client.authenticate(&creds()).await.unwrap();

    let player = client
        .fetch_single(&Endpoint::Player(PlayerId::new(42)))
        .await
        .unwrap();
    assert!(player.is_some());
}

#[tokio::test]
async fn test_retry_happens_only_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player/v1.0/42"))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/v1.0/login/"))
        .respond_with(login_response("still-bad"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await.with_token("stale");
    client.authenticate(&creds()).await.unwrap();

    let err = client
        .fetch_single(&Endpoint::Player(PlayerId::new(42)))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn test_forbidden_without_credentials_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/player/v1.0/42"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server).await.with_token("stale");
    let err = client
        .fetch_single(&Endpoint::Player(PlayerId::new(42)))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(403));
}

#[tokio::test]
async fn test_request_without_token_fails_fast() {
    let server = MockServer::start().await;
    let mut client = client_for(&server).await;

    let err = client.get_profile().await.unwrap_err();
    assert!(matches!(err, DuprError::NotAuthenticated));
}
