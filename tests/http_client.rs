// tests/http_client.rs
//! The HTTP client against a mock generation service.

use httpmock::MockServer;
use lesson2deck::{
    ApiKey, AppError, BackoffPolicy, ClientConfig, DeckClient, DeckGenerator, ExportFormat,
    GenerationApi, GenerationId, GenerationOptions, GenerationRequest, GammaHttpClient,
    RetryPolicy, ValidatedUrl,
};
use std::time::Duration;

const KEY: &str = "sk-gamma-test-key";

fn config(server: &MockServer, poll_attempts: u32) -> ClientConfig {
    let quick = RetryPolicy {
        max_attempts: poll_attempts,
        interval: Duration::from_millis(10),
        backoff: BackoffPolicy {
            base: Duration::from_millis(10),
            cap: Duration::from_millis(20),
            max_jitter: Duration::ZERO,
        },
    };
    ClientConfig {
        api_base: ValidatedUrl::parse(&server.url("/v0.2")).unwrap(),
        request_timeout: Duration::from_secs(5),
        submit_policy: RetryPolicy {
            max_attempts: 2,
            ..quick
        },
        poll_policy: quick,
        ..ClientConfig::for_key(ApiKey::new(KEY).unwrap())
    }
}

#[tokio::test]
async fn generates_a_deck_over_http() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method("POST")
            .path("/v0.2/generations")
            .header("x-api-key", KEY)
            .json_body_includes(
                r##"{"inputText":"# Loops","format":"presentation","themeName":"Oasis","exportAs":"pdf"}"##,
            );
        then.status(201)
            .header("content-type", "application/json")
            .body(r#"{"generationId":"gen_1"}"#);
    });
    let status = server.mock(|when, then| {
        when.method("GET")
            .path("/v0.2/generations/gen_1")
            .header("x-api-key", KEY);
        then.status(200)
            .header("content-type", "application/json")
            .body(
                r#"{"status":"completed","gammaUrl":"https://gamma.app/docs/gen_1",
                    "exportUrl":"https://files.example.com/gen_1.pdf"}"#,
            );
    });

    let client = DeckClient::connect(&config(&server, 3)).unwrap();
    let options = GenerationOptions {
        export_as: Some(ExportFormat::Pdf),
        ..GenerationOptions::default()
    };
    let request = GenerationRequest::new("# Loops", "Loops", &options).unwrap();

    let deck = client.generate(&request).await.unwrap();

    create.assert();
    status.assert();
    assert_eq!(deck.job.id().as_str(), "gen_1");
    assert_eq!(
        deck.links.share_url.as_deref(),
        Some("https://gamma.app/docs/gen_1")
    );
    assert_eq!(
        deck.links.file_url.as_deref(),
        Some("https://files.example.com/gen_1.pdf")
    );
}

#[tokio::test]
async fn retry_after_header_is_captured() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/v0.2/generations/gen_1");
        then.status(429).header("retry-after", "12").body("");
    });

    let http = GammaHttpClient::new(&config(&server, 3)).unwrap();
    let response = http
        .fetch_generation(&GenerationId::new("gen_1").unwrap())
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 429);
    assert_eq!(response.retry_after, Some(Duration::from_secs(12)));
}

#[tokio::test]
async fn throttled_polling_gives_up_after_max_attempts() {
    let server = MockServer::start();
    let status = server.mock(|when, then| {
        when.method("GET").path("/v0.2/generations/gen_1");
        then.status(429).header("retry-after", "0");
    });

    let client = DeckClient::connect(&config(&server, 3)).unwrap();
    let err = client
        .poller()
        .poll_until_terminal(&GenerationId::new("gen_1").unwrap())
        .await
        .unwrap_err();

    status.assert_hits(3);
    assert!(matches!(
        err,
        AppError::PollTimeout {
            attempts: 3,
            throttled: true,
            ..
        }
    ));
}

#[tokio::test]
async fn rejected_submission_reports_status_and_body() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method("POST").path("/v0.2/generations");
        then.status(401)
            .header("content-type", "application/json")
            .body(r#"{"message":"Invalid API key"}"#);
    });

    let client = DeckClient::connect(&config(&server, 3)).unwrap();
    let err = client
        .submitter()
        .submit("text", "Intro", &GenerationOptions::default())
        .await
        .unwrap_err();

    create.assert_hits(1);
    match err {
        AppError::Submission { status, body } => {
            assert_eq!(status.as_u16(), 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_on_submission_are_retried() {
    let server = MockServer::start();
    let create = server.mock(|when, then| {
        when.method("POST").path("/v0.2/generations");
        then.status(503).body("unavailable");
    });

    let client = DeckClient::connect(&config(&server, 3)).unwrap();
    let err = client
        .submitter()
        .submit("text", "Intro", &GenerationOptions::default())
        .await
        .unwrap_err();

    create.assert_hits(2);
    assert!(matches!(err, AppError::RateLimited { attempts: 2 }));
}
