//! Integration tests using WireMock
//!
//! These tests run the reqwest transport and the assembled client against a
//! mock Graph server, covering headers, the error envelope and retries.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use teams_client::transport::{HttpTransport, ReqwestTransport, TransportRequest};
use teams_client::{
    ErrorKind, SearchMessagesOptions, StaticTokenProvider, TeamsClient, TeamsClientImpl,
    TeamsConfigBuilder, TeamsError,
};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEAM_ID: &str = "3f2504e0-4f89-11d3-9a0c-0305e82c3301";

fn client_for(server: &MockServer, max_retries: u32) -> TeamsClientImpl {
    let config = TeamsConfigBuilder::new()
        .base_url(&format!("{}/v1.0", server.uri()))
        .unwrap()
        .max_retries(max_retries)
        .retry_delay(Duration::from_millis(5))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    TeamsClientImpl::with_transport(
        config,
        Arc::new(ReqwestTransport::new(Duration::from_secs(5)).unwrap()),
        Arc::new(StaticTokenProvider::new("test-token")),
    )
}

#[tokio::test]
async fn test_transport_sends_headers_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/joinedTeams"))
        .and(query_param("$top", "5"))
        .and(header("Authorization", "Bearer test-token"))
        .and(header_exists("client-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": []})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let mut headers = http::HeaderMap::new();
    headers.insert("Authorization", "Bearer test-token".parse().unwrap());

    let body = transport
        .send(
            TransportRequest::get(format!("{}/v1.0/me/joinedTeams", server.uri()), headers)
                .query("$top", "5"),
        )
        .await
        .unwrap();

    assert_eq!(body, json!({"value": []}));
}

#[tokio::test]
async fn test_transport_decodes_error_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/teams/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "NotFound", "message": "No team found with Group Id missing"}
        })))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let err = transport
        .send(TransportRequest::get(
            format!("{}/v1.0/teams/missing", server.uri()),
            http::HeaderMap::new(),
        ))
        .await
        .unwrap_err();

    let api = err.api_error().unwrap();
    assert_eq!(api.code, "NotFound");
    assert_eq!(api.message, "No team found with Group Id missing");
    assert_eq!(api.status, Some(404));
}

#[tokio::test]
async fn test_empty_success_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1.0/anything"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let body = transport
        .send(TransportRequest::post(
            format!("{}/v1.0/anything", server.uri()),
            http::HeaderMap::new(),
            json!({}),
        ))
        .await
        .unwrap();

    assert!(body.is_null());
}

#[tokio::test]
async fn test_client_retries_then_classifies() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1.0/teams/{TEAM_ID}")))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": "AccessDenied", "message": "Caller is not a member"}
        })))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let err = client
        .teams()
        .get(TEAM_ID, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is_kind(ErrorKind::Forbidden));
    assert!(err.to_string().contains(TEAM_ID));
    assert_eq!(client.metrics().snapshot().attempts, 3);
}

#[tokio::test]
async fn test_search_and_enrich_end_to_end() {
    let server = MockServer::start().await;
    let channel_id = "19:general@thread.tacv2";

    Mock::given(method("POST"))
        .and(path("/v1.0/search/query"))
        .and(body_partial_json(json!({
            "requests": [{"entityTypes": ["chatMessage"], "from": 0, "size": 2}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{
                "hitsContainers": [{
                    "hits": [
                        {"resource": {"id": "m1", "channelIdentity": {"teamId": TEAM_ID, "channelId": channel_id}}},
                        {"resource": {"id": "m2", "channelIdentity": {"teamId": TEAM_ID, "channelId": channel_id}}}
                    ]
                }]
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1.0/teams/{TEAM_ID}/channels/{channel_id}/messages/m1")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "NotFound", "message": "Message deleted"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1.0/teams/{TEAM_ID}/channels/{channel_id}/messages/m2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "m2",
            "createdDateTime": "2024-03-01T09:00:00Z",
            "body": {"contentType": "text", "content": "deploy finished"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let page = client
        .search()
        .search_messages(
            &SearchMessagesOptions::new("deploy").top(2),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(page.messages.len(), 2);
    assert!(page.messages[0].is_none());
    let found = page.messages[1].as_ref().unwrap();
    assert_eq!(found.message.content(), "deploy finished");
    assert_eq!(found.channel_id.as_deref(), Some(channel_id));
    assert_eq!(page.next_page_token.as_deref(), Some("2"));
}

#[tokio::test]
async fn test_ambiguous_team_name_lists_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1.0/me/joinedTeams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"id": "t1", "displayName": "Engineering"},
                {"id": "t2", "displayName": "Engineering"}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, 1);
    let err = client
        .resolver()
        .resolve_team("Engineering", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TeamsError::Ambiguous { .. }));
    let text = err.to_string();
    assert!(text.contains("Engineering (t1)"));
    assert!(text.contains("Engineering (t2)"));
}
