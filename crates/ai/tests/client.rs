use httpmock::prelude::*;
use serde_json::json;

use quillgrid_ai::{AiError, Assistant, ChatClient, RewriteAction, SelectionError};
use quillgrid_config::{AIProvider, AISettings, KeyLookup, KeySource, ResolvedAIConfig};

fn config(server: &MockServer) -> ResolvedAIConfig {
    let settings = AISettings {
        provider: AIProvider::Mistral,
        endpoint: Some(server.url("/v1/chat/completions")),
        max_text_length: 20,
        context_chars: 5,
        ..AISettings::default()
    };
    let lookup = KeyLookup {
        key: Some("test-key".to_string()),
        source: KeySource::Environment,
    };
    ResolvedAIConfig::with_key(&settings, lookup)
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "cmpl-1",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content } }
        ]
    })
}

#[test]
fn test_complete_returns_first_choice() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1/chat/completions")
            .header("Authorization", "Bearer test-key")
            .header("content-type", "application/json");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(completion("The cat sat."));
    });

    let client = ChatClient::new(&config(&server)).unwrap();
    let request = RewriteAction::Improve.build("teh cat sat", "", 500);
    assert_eq!(client.complete(&request).unwrap(), "The cat sat.");
    mock.assert();
}

#[test]
fn test_empty_choices_yield_placeholder() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "choices": [] }));
    });

    let client = ChatClient::new(&config(&server)).unwrap();
    let request = RewriteAction::Expand.build("short", "", 500);
    assert_eq!(client.complete(&request).unwrap(), "No response received");
}

fn error_kind(err: &AiError) -> &'static str {
    match err {
        AiError::InvalidKey(_) => "invalid_key",
        AiError::InvalidRequest => "invalid_request",
        AiError::RateLimited => "rate_limited",
        AiError::Api { .. } => "api",
        _ => "other",
    }
}

#[test]
fn test_http_status_mapping() {
    let cases = [
        (401, "invalid_key"),
        (422, "invalid_request"),
        (429, "rate_limited"),
        (500, "api"),
    ];

    for (status, expected) in cases {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(status)
                .header("content-type", "application/json")
                .json_body(json!({ "message": "nope" }));
        });

        let client = ChatClient::new(&config(&server)).unwrap();
        let err = client
            .complete(&RewriteAction::Improve.build("text", "", 500))
            .unwrap_err();
        assert_eq!(error_kind(&err), expected, "status {} gave {:?}", status, err);
        if status == 500 {
            assert_eq!(err.to_string(), "API request failed: 500 nope");
        }
    }
}

#[test]
fn test_invalid_json_is_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).body("not json");
    });

    let client = ChatClient::new(&config(&server)).unwrap();
    let err = client
        .complete(&RewriteAction::Improve.build("text", "", 500))
        .unwrap_err();
    assert!(matches!(err, AiError::Parse(_)));
}

#[test]
fn test_assistant_run_and_apply() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(completion("a fine day"));
    });

    let mut assistant = Assistant::new(&config(&server)).unwrap();
    let suggestion = assistant
        .run(&RewriteAction::Improve, "a nice day", "<p>It was a nice day.</p>")
        .unwrap()
        .to_string();
    assert_eq!(suggestion, "a fine day");
    assert_eq!(assistant.last_action(), Some("improve"));

    // Selection gone: suggestion is kept
    assert_eq!(assistant.apply("<p>Other text</p>", "a nice day"), None);
    assert_eq!(assistant.suggestion(), Some("a fine day"));

    let updated = assistant.apply("<p>It was a nice day.</p>", "a nice day").unwrap();
    assert_eq!(updated, "<p>It was a fine day.</p>");
    assert!(assistant.suggestion().is_none());
}

#[test]
fn test_assistant_rejects_selection_without_request() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(completion("unused"));
    });

    let mut assistant = Assistant::new(&config(&server)).unwrap();
    let err = assistant
        .run(&RewriteAction::Improve, "this selection is far too long", "")
        .unwrap_err();
    assert!(matches!(err, AiError::Selection(SelectionError::TooLong { max: 20 })));
    assert_eq!(assistant.error(), Some("Selected text is too long (max 20 characters)"));
    assert!(assistant.suggestion().is_none());
    mock.assert_hits(0);
}

#[test]
fn test_assistant_records_api_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(429);
    });

    let mut assistant = Assistant::new(&config(&server)).unwrap();
    assert!(assistant.run(&RewriteAction::Summarize { max_words: 10 }, "some text", "").is_err());
    assert_eq!(assistant.error(), Some("Rate limit exceeded. Please try again later."));
}
