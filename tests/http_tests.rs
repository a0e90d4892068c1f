// End-to-end tests for the REST control surface
//
// A stub webhook and the real service router both run in-process; requests
// go over loopback HTTP.

use axum::routing::post;
use axum::{Json, Router};
use job_discovery::config::{
    Config, HttpConfig, PlaybackConfig, ServiceConfig, SpeechConfig, WebhookConfig,
};
use job_discovery::{create_router, AppState};
use serde_json::{json, Value};

async fn serve(router: Router) -> anyhow::Result<String> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://{}", addr))
}

/// Stand up the stub webhook plus the service pointed at it; returns the
/// service base URL.
async fn service() -> anyhow::Result<String> {
    let stub = Router::new().route(
        "/webhook",
        post(|| async {
            Json(json!({
                "text_response": "One opening matches.",
                "matching_job_openings": [{ "job_title": "Rust Engineer" }]
            }))
        }),
    );
    let webhook_base = serve(stub).await?;

    let config = Config {
        service: ServiceConfig {
            name: "job-discovery-test".to_string(),
            http: HttpConfig {
                bind: "127.0.0.1".to_string(),
                port: 0,
            },
        },
        webhook: WebhookConfig {
            url: format!("{webhook_base}/webhook"),
            timeout_secs: 5,
        },
        speech: SpeechConfig::default(),
        playback: PlaybackConfig::default(),
    };

    serve(create_router(AppState::new(config))).await
}

async fn create_conversation(client: &reqwest::Client, base: &str) -> anyhow::Result<String> {
    let body: Value = client
        .post(format!("{base}/conversations"))
        .json(&json!({}))
        .send()
        .await?
        .json()
        .await?;
    Ok(body["conversation_id"]
        .as_str()
        .expect("conversation_id in response")
        .to_string())
}

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let base = service().await?;
    let response = reqwest::get(format!("{base}/health")).await?;
    assert_eq!(response.status(), 200);
    Ok(())
}

#[tokio::test]
async fn test_conversation_round_trip() -> anyhow::Result<()> {
    let base = service().await?;
    let client = reqwest::Client::new();
    let id = create_conversation(&client, &base).await?;

    // Send a message and get the assistant reply back.
    let response = client
        .post(format!("{base}/conversations/{id}/messages"))
        .json(&json!({ "input": "rust jobs please" }))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let reply: Value = response.json().await?;
    assert_eq!(reply["role"], "assistant");
    assert_eq!(reply["content"], "One opening matches.");
    assert_eq!(reply["jobs"][0]["job_title"], "Rust Engineer");

    // The log holds both sides of the exchange.
    let messages: Value = client
        .get(format!("{base}/conversations/{id}/messages"))
        .send()
        .await?
        .json()
        .await?;
    let messages = messages.as_array().expect("message array");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");

    // Status reflects the successful request.
    let status: Value = client
        .get(format!("{base}/conversations/{id}/status"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(status["state"], "success");
    assert_eq!(status["message_count"], 2);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_conversation_id_conflicts() -> anyhow::Result<()> {
    let base = service().await?;
    let client = reqwest::Client::new();

    let body = json!({ "conversation_id": "conversation-dup" });
    let first = client
        .post(format!("{base}/conversations"))
        .json(&body)
        .send()
        .await?;
    assert_eq!(first.status(), 200);

    let second = client
        .post(format!("{base}/conversations"))
        .json(&body)
        .send()
        .await?;
    assert_eq!(second.status(), 409);

    Ok(())
}

#[tokio::test]
async fn test_empty_input_is_unprocessable() -> anyhow::Result<()> {
    let base = service().await?;
    let client = reqwest::Client::new();
    let id = create_conversation(&client, &base).await?;

    let response = client
        .post(format!("{base}/conversations/{id}/messages"))
        .json(&json!({ "input": "   " }))
        .send()
        .await?;
    assert_eq!(response.status(), 422);

    Ok(())
}

#[tokio::test]
async fn test_unknown_conversation_is_not_found() -> anyhow::Result<()> {
    let base = service().await?;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base}/conversations/missing/status"))
        .send()
        .await?;
    assert_eq!(response.status(), 404);

    Ok(())
}

#[tokio::test]
async fn test_reset_tears_the_conversation_down() -> anyhow::Result<()> {
    let base = service().await?;
    let client = reqwest::Client::new();
    let id = create_conversation(&client, &base).await?;

    client
        .post(format!("{base}/conversations/{id}/messages"))
        .json(&json!({ "input": "hello" }))
        .send()
        .await?;

    let response = client
        .post(format!("{base}/conversations/{id}/reset"))
        .send()
        .await?;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await?;
    assert_eq!(body["status"], "reset");
    assert_eq!(body["stats"]["message_count"], 2);

    // The conversation is gone afterwards.
    let status = client
        .get(format!("{base}/conversations/{id}/status"))
        .send()
        .await?;
    assert_eq!(status.status(), 404);

    Ok(())
}

#[tokio::test]
async fn test_webhook_failure_maps_to_bad_gateway() -> anyhow::Result<()> {
    let stub = Router::new().route(
        "/webhook",
        post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let webhook_base = serve(stub).await?;

    let config = Config {
        service: ServiceConfig {
            name: "job-discovery-test".to_string(),
            http: HttpConfig {
                bind: "127.0.0.1".to_string(),
                port: 0,
            },
        },
        webhook: WebhookConfig {
            url: format!("{webhook_base}/webhook"),
            timeout_secs: 5,
        },
        speech: SpeechConfig::default(),
        playback: PlaybackConfig::default(),
    };
    let base = serve(create_router(AppState::new(config))).await?;

    let client = reqwest::Client::new();
    let id = create_conversation(&client, &base).await?;

    let response = client
        .post(format!("{base}/conversations/{id}/messages"))
        .json(&json!({ "input": "hello" }))
        .send()
        .await?;
    assert_eq!(response.status(), 502);

    Ok(())
}
