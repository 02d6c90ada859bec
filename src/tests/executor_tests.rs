//! Request executor tests, both standalone and through the services.

use super::client_with;
use crate::client::TeamsClient;
use crate::errors::{ApiError, ErrorKind, TeamsError, TeamsResult, PARSING_ERROR_CODE};
use crate::fixtures::{list_response, team};
use crate::mocks::{MockHttpTransport, MockResponse};
use crate::resilience::{execute, AttemptConfig};
use serde_json::json;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use test_case::test_case;
use tokio_util::sync::CancellationToken;

#[test_case(1, 1 ; "first attempt of one")]
#[test_case(3, 1 ; "first attempt of three")]
#[test_case(3, 2 ; "second attempt of three")]
#[test_case(3, 3 ; "last attempt of three")]
#[test_case(5, 4 ; "fourth attempt of five")]
#[tokio::test]
async fn test_success_on_attempt_k_runs_exactly_k_times(max_retries: u32, k: u32) {
    let calls = Arc::new(AtomicU32::new(0));
    let cancel = CancellationToken::new();
    let config = AttemptConfig::new()
        .max_retries(max_retries)
        .retry_delay(Duration::from_millis(1));

    let result = execute(&config, &cancel, |_| {
        let calls = calls.clone();
        async move {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < k {
                Err(TeamsError::Api(ApiError::new("ServiceUnavailable", "busy").with_status(503)))
            } else {
                Ok(n)
            }
        }
    })
    .await;

    assert_eq!(tokio_test::assert_ok!(result), k);
    assert_eq!(calls.load(Ordering::SeqCst), k);
}

#[tokio::test]
async fn test_service_call_retries_transient_failure() {
    let mock = Arc::new(
        MockHttpTransport::new()
            .on("/me/joinedTeams", MockResponse::network_error("connection reset"))
            .on(
                "/me/joinedTeams",
                MockResponse::value(list_response(&[team("t1", "Engineering")])),
            ),
    );
    let client = client_with(&mock, 3);
    let cancel = CancellationToken::new();

    let teams = client.teams().list_joined(&cancel).await.unwrap();

    assert_eq!(teams.len(), 1);
    assert_eq!(mock.request_count("/me/joinedTeams"), 2);
    let metrics = client.metrics().snapshot();
    assert_eq!(metrics.attempts, 2);
    assert_eq!(metrics.retries, 1);
}

#[tokio::test]
async fn test_malformed_body_becomes_parsing_error() {
    let mock = Arc::new(
        MockHttpTransport::new().on("/me/joinedTeams", MockResponse::value(json!({"value": "nope"}))),
    );
    let client = client_with(&mock, 2);
    let cancel = CancellationToken::new();

    let err = client.teams().list_joined(&cancel).await.unwrap_err();

    assert!(err.is_kind(ErrorKind::Unknown));
    assert_eq!(err.error_code(), PARSING_ERROR_CODE);
    assert_eq!(mock.request_count("/me/joinedTeams"), 2);
}

#[tokio::test]
async fn test_exhausted_remote_error_is_classified() {
    let mock = Arc::new(MockHttpTransport::new().on("/teams/t-404", MockResponse::not_found()));
    let client = client_with(&mock, 2);
    let cancel = CancellationToken::new();

    let err = client.teams().get("t-404", &cancel).await.unwrap_err();

    match &err {
        TeamsError::NotFound { refs, source } => {
            assert_eq!(refs.get(crate::errors::ResourceKind::Team), ["t-404"]);
            assert_eq!(source.code, "NotFound");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(client.metrics().endpoint_failures("teams.get"), 1);
}

#[tokio::test]
async fn test_caller_cancellation_stops_service_call() {
    let mock = Arc::new(MockHttpTransport::new().on(
        "/me/joinedTeams",
        MockResponse::value(list_response(&[team("t1", "Engineering")]))
            .with_delay(Duration::from_secs(60)),
    ));
    let client = client_with(&mock, 3);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result: TeamsResult<_> = client.teams().list_joined(&cancel).await;

    assert!(result.unwrap_err().is_cancelled());
    assert_eq!(mock.request_count("/me/joinedTeams"), 1);
}
