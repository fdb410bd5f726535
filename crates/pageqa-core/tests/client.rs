use std::sync::Once;

use pageqa_core::service::{GENERIC_FAILURE_MESSAGE, UNREACHABLE_MESSAGE};
use pageqa_core::{QaClient, QaOutcome, QaService, TransportError};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(pageqa_core::logging::initialize_for_tests);
}

async fn server_replying(status: u16, body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    server
}

/// A base address nothing is listening on.
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

#[tokio::test]
async fn client_posts_url_and_question_and_returns_answer() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot"))
        .and(body_json(json!({
            "url": "https://example.edu",
            "question": "What courses are offered?"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "We offer X, Y, Z."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = QaClient::new(&server.uri());
    let outcome = client
        .ask("https://example.edu", "What courses are offered?")
        .await;

    assert_eq!(outcome, QaOutcome::Answer("We offer X, Y, Z.".to_string()));
}

#[tokio::test]
async fn client_reports_error_field_on_success_status_as_remote() {
    init_logging();
    let server = server_replying(200, json!({ "error": "URL could not be fetched" })).await;

    let outcome = QaClient::new(&server.uri()).ask("bad", "q").await;

    assert_eq!(outcome, QaOutcome::Remote("URL could not be fetched".to_string()));
}

#[tokio::test]
async fn client_prefers_error_over_answer() {
    init_logging();
    let server = server_replying(200, json!({ "error": "nope", "answer": "yes" })).await;

    let outcome = QaClient::new(&server.uri()).ask("u", "q").await;

    assert_eq!(outcome, QaOutcome::Remote("nope".to_string()));
}

#[tokio::test]
async fn client_uses_error_body_of_failed_status() {
    init_logging();
    let server = server_replying(
        400,
        json!({ "error": "Error fetching webpage: 404 Client Error" }),
    )
    .await;

    let outcome = QaClient::new(&server.uri()).ask("https://gone.example", "q").await;

    assert_eq!(
        outcome,
        QaOutcome::Transport(TransportError::Other(Some(
            "Error fetching webpage: 404 Client Error".to_string()
        )))
    );
}

#[tokio::test]
async fn client_falls_back_to_generic_text_without_error_body() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chatbot"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let outcome = QaClient::new(&server.uri()).ask("u", "q").await;

    assert_eq!(outcome, QaOutcome::Transport(TransportError::Other(None)));
    if let QaOutcome::Transport(err) = outcome {
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
    }
}

#[tokio::test]
async fn client_treats_body_without_answer_as_failure() {
    init_logging();
    let server = server_replying(200, json!({ "message": "Server Running" })).await;

    let outcome = QaClient::new(&server.uri()).ask("u", "q").await;

    assert_eq!(outcome, QaOutcome::Transport(TransportError::Other(None)));
}

#[tokio::test]
async fn client_reports_refused_connection_as_unreachable() {
    init_logging();
    let client = QaClient::new(&closed_port_url());

    let outcome = client.ask("https://example.edu", "q").await;

    assert_eq!(outcome, QaOutcome::Transport(TransportError::NetworkUnreachable));
    if let QaOutcome::Transport(err) = outcome {
        assert_eq!(err.to_string(), UNREACHABLE_MESSAGE);
    }
}

#[tokio::test]
async fn ping_reflects_root_route() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Server Running"
        })))
        .mount(&server)
        .await;

    assert!(QaClient::new(&server.uri()).ping().await);
    assert!(!QaClient::new(&closed_port_url()).ping().await);
}
