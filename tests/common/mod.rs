#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use autoarch::error::Error;
use autoarch::prompt::{task, template};
use autoarch::providers::CompletionClient;
use autoarch::{ArtifactKind, DetailLevel};

/// Recover (kind, description, level) from a prompt pair built by
/// `autoarch::prompt`
pub fn decode_prompt(
  system: &str
, user: &str
) -> (ArtifactKind, String, DetailLevel)
{   let kind = ArtifactKind::ALL
      .into_iter()
      .find(|k| system.starts_with(template(*k)))
      .expect("system message starts with a known template");
    let level = [
        DetailLevel::Concise
      , DetailLevel::Balanced
      , DetailLevel::Detailed
    ]
      .into_iter()
      .find(|l| system.ends_with(l.modifier()))
      .expect("system message ends with a detail modifier");
    let description = user
      .strip_prefix(task(kind))
      .and_then(|rest| rest.strip_prefix(' '))
      .expect("user message starts with the task line")
      .to_string();
    (kind, description, level)
}

/// Answers every prompt with "<kind>:<description>:<level>"
#[derive(Default)]
pub struct EchoClient
{   pub calls: AtomicUsize
  , pub fail_kind: Option<ArtifactKind>
}

impl EchoClient
{   pub fn new() -> Arc<Self>
    {   Arc::new(EchoClient::default())
    }

    /// Echoes like `new`, but `kind` fails with an upstream error
    pub fn failing_on(kind: ArtifactKind) -> Arc<Self>
    {   Arc::new(EchoClient
        {   calls: AtomicUsize::new(0)
          , fail_kind: Some(kind)
        })
    }

    pub fn call_count(&self) -> usize
    {   self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for EchoClient
{   async fn complete(
      &self
    , system: &str
    , user: &str
    ) -> Result<String, Error>
    {   self.calls.fetch_add(1, Ordering::SeqCst);
        let (kind, description, level) = decode_prompt(system, user);
        if self.fail_kind == Some(kind)
        {   return Err(Error::UpstreamService("rate limited".to_string()));
        }
        Ok(format!("{}:{}:{}", kind, description, level))
    }
}
