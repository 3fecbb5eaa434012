mod common;

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use autoarch::config::{ApiKey, AppConfig, ProviderConfig};
use autoarch::error::Error;
use autoarch::history::{display_name, DesignRecord, HistoryBackend};
use autoarch::providers::{CompletionClient, GroqClient};
use autoarch::request::GenerationResult;
use autoarch::{ArtifactKind, DetailLevel, GenerationRequest, Orchestrator};

use common::EchoClient;

fn provider_config(server: &MockServer) -> ProviderConfig
{   ProviderConfig
    {   api_key: Some(ApiKey::new("test-key"))
      , api_base: server.uri()
      , timeout_secs: 5
      , ..ProviderConfig::default()
    }
}

fn completion_body(content: Value) -> Value
{   json!({
      "id": "chatcmpl-test",
      "object": "chat.completion",
      "model": "llama-3.3-70b-versatile",
      "choices": [{
        "index": 0,
        "message": { "role": "assistant", "content": content },
        "finish_reason": "stop"
      }]
    })
}

// ===== GroqClient =====

#[tokio::test]
async fn test_groq_send_prompt()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .and(header("authorization", "Bearer test-key"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(completion_body(json!("graph TD\n A --> B")))
      )
      .expect(1)
      .mount(&server)
      .await;

    let client = assert_ok!(GroqClient::new(&provider_config(&server)));
    let text = assert_ok!(client.complete("sys", "user").await);
    assert_eq!(text, "graph TD\n A --> B");

    let requests = server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["model"], "llama-3.3-70b-versatile");
    assert_eq!(sent["max_tokens"], 2048);
    assert_eq!(sent["stream"], false);
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(sent["messages"][0]["content"], "sys");
    assert_eq!(sent["messages"][1]["role"], "user");
    assert_eq!(sent["messages"][1]["content"], "user");
}

#[tokio::test]
async fn test_groq_error_status_carries_provider_message()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(
        ResponseTemplate::new(401).set_body_json(json!({
          "error": {
            "message": "Invalid API Key",
            "type": "invalid_request_error"
          }
        }))
      )
      .expect(1)
      .mount(&server)
      .await;

    let client = assert_ok!(GroqClient::new(&provider_config(&server)));
    let err = assert_err!(client.complete("sys", "user").await);
    assert_eq!(err, Error::UpstreamService("Invalid API Key".to_string()));
    assert_eq!(err.to_string(), "Groq API error: Invalid API Key");
}

#[tokio::test]
async fn test_groq_error_status_without_body_uses_reason()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(ResponseTemplate::new(503))
      .mount(&server)
      .await;

    let client = assert_ok!(GroqClient::new(&provider_config(&server)));
    let err = assert_err!(client.complete("sys", "user").await);
    assert_eq!(
      err,
      Error::UpstreamService("Service Unavailable".to_string())
    );
}

#[tokio::test]
async fn test_groq_does_not_retry()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
      .expect(1)
      .mount(&server)
      .await;

    let client = assert_ok!(GroqClient::new(&provider_config(&server)));
    let err = assert_err!(client.complete("sys", "user").await);
    assert_eq!(err, Error::UpstreamService("boom".to_string()));
}

#[tokio::test]
async fn test_groq_empty_content()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(
        ResponseTemplate::new(200).set_body_json(completion_body(Value::Null))
      )
      .mount(&server)
      .await;

    let client = assert_ok!(GroqClient::new(&provider_config(&server)));
    let err = assert_err!(client.complete("sys", "user").await);
    assert_eq!(err, Error::EmptyCompletion);
    assert_eq!(
      err.to_string(),
      "Groq API error: No response from Groq API"
    );
}

#[tokio::test]
async fn test_groq_missing_api_key_never_calls_upstream()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .respond_with(ResponseTemplate::new(200))
      .expect(0)
      .mount(&server)
      .await;

    let config = ProviderConfig
    {   api_key: None
      , ..provider_config(&server)
    };
    let client = assert_ok!(GroqClient::new(&config));
    let err = assert_err!(client.complete("sys", "user").await);
    assert_eq!(err, Error::MissingApiKey("Groq".to_string()));
}

#[tokio::test]
async fn test_groq_timeout()
{   let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/chat/completions"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_json(completion_body(json!("late")))
          .set_delay(Duration::from_secs(3))
      )
      .mount(&server)
      .await;

    let config = ProviderConfig
    {   timeout_secs: 1
      , ..provider_config(&server)
    };
    let client = assert_ok!(GroqClient::new(&config));
    let err = assert_err!(client.complete("sys", "user").await);
    assert_eq!(err, Error::Timeout);
}

#[test]
fn test_api_key_is_redacted_in_debug()
{   let config = ProviderConfig
    {   api_key: Some(ApiKey::new("gsk_secret"))
      , ..ProviderConfig::default()
    };
    let printed = format!("{:?}", config);
    assert!(!printed.contains("gsk_secret"));
    assert!(printed.contains("ApiKey(***)"));
}

// ===== Orchestrator =====

#[tokio::test]
async fn test_orchestrator_maps_each_kind_to_its_field()
{   let client = EchoClient::new();
    let orchestrator = Orchestrator::new(client.clone());
    let request = assert_ok!(
      GenerationRequest::new("Design Netflix", DetailLevel::Detailed)
    );

    let result = assert_ok!(orchestrator.generate(&request).await);
    assert_eq!(result, GenerationResult
    {   architecture: "architecture:Design Netflix:detailed".to_string()
      , db_schema: "schema:Design Netflix:detailed".to_string()
      , scaling_plan: "scaling:Design Netflix:detailed".to_string()
      , api_structure: "api:Design Netflix:detailed".to_string()
    });
    assert_eq!(client.call_count(), 4);
}

#[tokio::test]
async fn test_orchestrator_fails_whole_result_on_one_error()
{   for kind in ArtifactKind::ALL
    {   let client = EchoClient::failing_on(kind);
        let orchestrator = Orchestrator::new(client);
        let request = assert_ok!(
          GenerationRequest::new("a chat app", DetailLevel::Balanced)
        );
        let err = assert_err!(orchestrator.generate(&request).await);
        assert_eq!(err, Error::UpstreamService("rate limited".to_string()));
    }
}

#[tokio::test]
async fn test_blank_description_is_rejected_before_dispatch()
{   for description in ["", "   ", "\n\t", "\u{FEFF} ", "\u{FEFF}"]
    {   let err = assert_err!(
          GenerationRequest::new(description, DetailLevel::Balanced)
        );
        assert_eq!(
          err,
          Error::Validation("System description is required".to_string())
        );
    }
}

/// Every call waits until all four are in flight
struct RendezvousClient
{   barrier: Barrier
}

#[async_trait]
impl CompletionClient for RendezvousClient
{   async fn complete(
      &self
    , _system: &str
    , _user: &str
    ) -> Result<String, Error>
    {   self.barrier.wait().await;
        Ok("done".to_string())
    }
}

#[tokio::test]
async fn test_orchestrator_dispatches_all_four_concurrently()
{   let orchestrator = Orchestrator::new(Arc::new(RendezvousClient
    {   barrier: Barrier::new(4)
    }));
    let request = assert_ok!(
      GenerationRequest::new("a chat app", DetailLevel::Concise)
    );

    let result = tokio::time::timeout(
      Duration::from_secs(5),
      orchestrator.generate(&request)
    ).await;
    let result = assert_ok!(assert_ok!(result));
    assert_eq!(result.get(ArtifactKind::Api), "done");
}

/// Schema fails at once; every other kind never finishes
struct StallingClient;

#[async_trait]
impl CompletionClient for StallingClient
{   async fn complete(
      &self
    , system: &str
    , user: &str
    ) -> Result<String, Error>
    {   let (kind, _, _) = common::decode_prompt(system, user);
        if kind == ArtifactKind::Schema
        {   return Err(Error::EmptyCompletion);
        }
        std::future::pending::<()>().await;
        unreachable!()
    }
}

#[tokio::test]
async fn test_orchestrator_fails_fast_without_waiting_for_siblings()
{   let orchestrator = Orchestrator::new(Arc::new(StallingClient));
    let request = assert_ok!(
      GenerationRequest::new("a chat app", DetailLevel::Balanced)
    );

    let result = tokio::time::timeout(
      Duration::from_secs(5),
      orchestrator.generate(&request)
    ).await;
    let err = assert_err!(assert_ok!(result));
    assert_eq!(err, Error::EmptyCompletion);
}

// ===== HistoryBackend =====

fn sample_record(description: &str) -> DesignRecord
{   let request = GenerationRequest::new(description, DetailLevel::Balanced)
      .unwrap();
    DesignRecord::new(&request, GenerationResult
    {   architecture: "graph TD".to_string()
      , db_schema: "CREATE TABLE t ();".to_string()
      , scaling_plan: "shard".to_string()
      , api_structure: "{}".to_string()
    })
}

#[tokio::test]
async fn test_backend_initialization()
{   let backend = HistoryBackend::new(10);
    let designs = assert_ok!(backend.list().await);
    assert!(designs.is_empty());
    assert_ok!(backend.shutdown().await);
}

#[tokio::test]
async fn test_history_newest_first_and_evicts_oldest()
{   let backend = HistoryBackend::new(10);
    for i in 0..11
    {   assert_ok!(backend.record(sample_record(&format!("design {}", i))).await);
    }

    let designs = assert_ok!(backend.list().await);
    assert_eq!(designs.len(), 10);
    assert_eq!(designs[0].name, "design 10");
    assert_eq!(designs[9].name, "design 1");
    assert!(designs.iter().all(|d| d.name != "design 0"));

    let _ = backend.shutdown().await;
}

#[tokio::test]
async fn test_history_get_by_id()
{   let backend = HistoryBackend::new(10);
    let record = sample_record("a chat app");
    let id = record.id.clone();
    assert_ok!(backend.record(record.clone()).await);

    let fetched = assert_ok!(backend.get(id).await);
    assert_eq!(fetched, record);

    let err = assert_err!(backend.get("missing".to_string()).await);
    assert_eq!(err, Error::NotFound("Design not found: missing".to_string()));

    let _ = backend.shutdown().await;
}

#[tokio::test]
async fn test_history_calls_fail_after_shutdown()
{   let backend = HistoryBackend::new(10);
    assert_ok!(backend.shutdown().await);
    tokio::task::yield_now().await;
    assert_err!(backend.list().await);
}

#[test]
fn test_display_name_truncates_at_fifty_chars()
{   assert_eq!(display_name("short"), "short");
    let long = "x".repeat(51);
    assert_eq!(display_name(&long), format!("{}...", "x".repeat(50)));
    assert_eq!(display_name(&"y".repeat(50)), "y".repeat(50));
    // multi-byte characters are counted, not bytes
    let dashes = "–".repeat(60);
    assert_eq!(display_name(&dashes).chars().count(), 53);
}

// ===== AppConfig =====

#[test]
fn test_config_defaults()
{   let config = assert_ok!(AppConfig::from_lookup(|_| None));
    assert!(config.provider.api_key.is_none());
    assert_eq!(config.provider.model, "llama-3.3-70b-versatile");
    assert_eq!(config.provider.max_tokens, 2048);
    assert_eq!(config.provider.api_base, "https://api.groq.com/openai/v1");
    assert_eq!(config.history.capacity, 10);
    assert_eq!(config.server.bind_addr(), "127.0.0.1:3000");
}

#[test]
fn test_config_overrides_from_environment()
{   let config = assert_ok!(AppConfig::from_lookup(|name| {
      match name
      {   "GROQ_API_KEY" => Some("gsk_test".to_string())
        , "AUTOARCH_API_BASE" => Some("http://localhost:9000/v1/".to_string())
        , "AUTOARCH_MAX_TOKENS" => Some("512".to_string())
        , "AUTOARCH_PORT" => Some("8080".to_string())
        , "AUTOARCH_HISTORY_CAPACITY" => Some("3".to_string())
        , "AUTOARCH_MODEL" => Some("  ".to_string())
        , _ => None
      }
    }));
    assert_eq!(
      config.provider.api_key.as_ref().map(ApiKey::expose),
      Some("gsk_test")
    );
    assert_eq!(config.provider.api_base, "http://localhost:9000/v1");
    assert_eq!(config.provider.max_tokens, 512);
    assert_eq!(config.provider.model, "llama-3.3-70b-versatile");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.history.capacity, 3);
}

#[test]
fn test_config_rejects_bad_numbers()
{   let err = assert_err!(AppConfig::from_lookup(|name| {
      (name == "AUTOARCH_PORT").then(|| "eighty".to_string())
    }));
    assert!(matches!(err, Error::InvalidConfiguration(_)));

    let err = assert_err!(AppConfig::from_lookup(|name| {
      (name == "AUTOARCH_WORKERS").then(|| "0".to_string())
    }));
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}
