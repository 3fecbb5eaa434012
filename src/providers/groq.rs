use async_trait::async_trait;
use log::{debug, error, trace};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{ApiKey, ProviderConfig};
use crate::error::Error;

// ===== Message Types =====

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqChatRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroqChatResponse
{   #[serde(default)]
    pub choices: Vec<Choice>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   #[serde(default)]
    pub message: Option<ResponseMessage>
  , pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub content: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
struct GroqErrorEnvelope
{   error: GroqErrorDetail
}

#[derive(Debug, Clone, Deserialize)]
struct GroqErrorDetail
{   message: String
}

// ===== Groq Client =====

/// Chat-completion client for Groq's OpenAI-compatible API.
///
/// One round trip per call: no retry, no streaming. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GroqClient
{   api_key: Option<ApiKey>
  , api_base: String
  , model: String
  , max_tokens: usize
  , http_client: reqwest::Client
}

impl GroqClient
{   /// Build a client from provider configuration
    pub fn new(config: &ProviderConfig) -> Result<Self, Error>
    {   debug!(
          "Creating GroqClient for model {} at {}",
          config.model, config.api_base
        );
        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;

        Ok(GroqClient
        {   api_key: config.api_key.clone()
          , api_base: config.api_base.trim_end_matches('/').to_string()
          , model: config.model.clone()
          , max_tokens: config.max_tokens
          , http_client
        })
    }

    fn get_api_key(&self) -> Result<&ApiKey, Error>
    {   self.api_key.as_ref().ok_or_else(|| {
          error!("No API key configured for Groq");
          Error::MissingApiKey("Groq".to_string())
        })
    }

    async fn send_chat(
      &self
    , system: &str
    , user: &str
    ) -> Result<String, Error>
    {   let api_key = self.get_api_key()?;

        let request = GroqChatRequest
        {   model: self.model.clone()
          , messages: vec![
              ChatMessage
              {   role: "system".to_string()
                , content: system.to_string()
              }
            , ChatMessage
              {   role: "user".to_string()
                , content: user.to_string()
              }
            ]
          , max_tokens: Some(self.max_tokens)
          , stream: Some(false)
        };

        trace!("Groq request: {:?}", request);

        let response = self.http_client
          .post(format!("{}/chat/completions", self.api_base))
          .bearer_auth(api_key.expose())
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            if e.is_timeout()
            {   Error::Timeout
            } else
            {   Error::UpstreamService(e.to_string())
            }
          })?;

        let status = response.status();
        trace!("Groq response status: {}", status);

        if !status.is_success()
        {   let body = match response.text().await
            {   Ok(body) => body
              , Err(e) => {
                  debug!("Could not read Groq error body: {}", e);
                  String::new()
                }
            };
            let message = provider_message(&body).unwrap_or_else(|| {
              status.canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
            });
            error!("Groq API error ({}): {}", status, message);
            return Err(Error::UpstreamService(message));
        }

        let chat_response: GroqChatResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            if e.is_timeout()
            {   Error::Timeout
            } else
            {   Error::UpstreamService(e.to_string())
            }
          })?;

        extract_text(chat_response)
    }
}

#[async_trait]
impl super::CompletionClient for GroqClient
{   async fn complete(
      &self
    , system: &str
    , user: &str
    ) -> Result<String, Error>
    {   debug!("Sending completion to {}", self.model);
        self.send_chat(system, user).await
    }
}

/// Provider message from an error body: `error.message` when the body is
/// the usual JSON envelope, otherwise the raw text
fn provider_message(body: &str) -> Option<String>
{   if let Ok(envelope) = serde_json::from_str::<GroqErrorEnvelope>(body)
    {   return Some(envelope.error.message);
    }
    let trimmed = body.trim();
    if trimmed.is_empty()
    {   None
    } else
    {   Some(trimmed.to_string())
    }
}

/// First choice's text; absent, null or blank content is an empty response
fn extract_text(response: GroqChatResponse) -> Result<String, Error>
{   response.choices
      .into_iter()
      .next()
      .and_then(|c| {
        trace!("Groq finish_reason: {:?}", c.finish_reason);
        c.message
      })
      .and_then(|m| m.content)
      .filter(|text| !text.trim().is_empty())
      .ok_or_else(|| {
        error!("No usable content in Groq response");
        Error::EmptyCompletion
      })
}
