//! Configuration for the completion provider, HTTP server and history

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_MAX_TOKENS: usize = 2048;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Secret provider credential; never printed
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey
{   pub fn new(key: impl Into<String>) -> Self
    {   ApiKey(key.into())
    }

    pub fn expose(&self) -> &str
    {   &self.0
    }
}

impl fmt::Debug for ApiKey
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   f.write_str("ApiKey(***)")
    }
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// Credential, read from the environment only
    #[serde(skip)]
    pub api_key: Option<ApiKey>
  , /// Chat-completion API base URL
    pub api_base: String
  , /// Model identifier sent with every call
    pub model: String
  , /// Upper bound on generated tokens per call
    pub max_tokens: usize
  , /// Per-call timeout in seconds
    pub timeout_secs: u64
}

impl Default for ProviderConfig
{   fn default() -> Self
    {   ProviderConfig
        {   api_key: None
          , api_base: DEFAULT_API_BASE.to_string()
          , model: DEFAULT_MODEL.to_string()
          , max_tokens: DEFAULT_MAX_TOKENS
          , timeout_secs: DEFAULT_TIMEOUT_SECS
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig
{   pub host: String
  , pub port: u16
  , /// Number of actix workers
    pub workers: usize
}

impl Default for ServerConfig
{   fn default() -> Self
    {   ServerConfig
        {   host: "127.0.0.1".to_string()
          , port: 3000
          , workers: 4
        }
    }
}

impl ServerConfig
{   pub fn bind_addr(&self) -> String
    {   format!("{}:{}", self.host, self.port)
    }
}

/// History configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig
{   /// Records kept before the oldest is evicted
    pub capacity: usize
}

impl Default for HistoryConfig
{   fn default() -> Self
    {   HistoryConfig
        {   capacity: DEFAULT_HISTORY_CAPACITY
        }
    }
}

/// AutoArch configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig
{   pub provider: ProviderConfig
  , pub server: ServerConfig
  , pub history: HistoryConfig
}

impl AppConfig
{   /// Defaults overridden from the process environment
    pub fn from_env() -> Result<Self, Error>
    {   Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each
    /// variable; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where F: Fn(&str) -> Option<String>
    {   let get = |name: &str| {
          lookup(name).filter(|v| !v.trim().is_empty())
        };
        let mut config = AppConfig::default();

        config.provider.api_key = get("GROQ_API_KEY").map(ApiKey::new);
        if let Some(base) = get("AUTOARCH_API_BASE")
        {   config.provider.api_base
              = base.trim_end_matches('/').to_string();
        }
        if let Some(model) = get("AUTOARCH_MODEL")
        {   config.provider.model = model;
        }
        if let Some(raw) = get("AUTOARCH_MAX_TOKENS")
        {   config.provider.max_tokens
              = parse_var("AUTOARCH_MAX_TOKENS", &raw)?;
        }
        if let Some(raw) = get("AUTOARCH_TIMEOUT_SECS")
        {   config.provider.timeout_secs
              = parse_var("AUTOARCH_TIMEOUT_SECS", &raw)?;
        }
        if let Some(host) = get("AUTOARCH_HOST")
        {   config.server.host = host;
        }
        if let Some(raw) = get("AUTOARCH_PORT")
        {   config.server.port = parse_var("AUTOARCH_PORT", &raw)?;
        }
        if let Some(raw) = get("AUTOARCH_WORKERS")
        {   config.server.workers
              = parse_var("AUTOARCH_WORKERS", &raw)?;
            if config.server.workers == 0
            {   return Err(Error::InvalidConfiguration(
                  "AUTOARCH_WORKERS must be at least 1".to_string()
                ));
            }
        }
        if let Some(raw) = get("AUTOARCH_HISTORY_CAPACITY")
        {   config.history.capacity
              = parse_var("AUTOARCH_HISTORY_CAPACITY", &raw)?;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T, Error>
{   raw.trim().parse::<T>().map_err(|_| {
      Error::InvalidConfiguration(
        format!("{} has an invalid value: {}", name, raw)
      )
    })
}
