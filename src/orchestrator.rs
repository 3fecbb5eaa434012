//! Validation, parallel dispatch and result assembly for one design

use log::{debug, error, info};
use std::sync::Arc;

use crate::error::Error;
use crate::prompt::{build_prompts, PromptSpec};
use crate::providers::CompletionClient;
use crate::request::{GenerateBody, GenerationRequest, GenerationResult};

/// Fans a request out to four concurrent completions and joins them.
///
/// Either all four artifacts come back or the first failure does; a
/// partial result is never produced.
#[derive(Clone)]
pub struct Orchestrator
{   client: Arc<dyn CompletionClient>
}

impl Orchestrator
{   pub fn new(client: Arc<dyn CompletionClient>) -> Self
    {   Orchestrator { client }
    }

    /// Validate a raw body, then generate
    pub async fn handle(
      &self
    , body: &GenerateBody
    ) -> Result<(GenerationRequest, GenerationResult), Error>
    {   let request = GenerationRequest::try_from(body).map_err(|e| {
          debug!("Rejected generation request: {}", e);
          e
        })?;
        let result = self.generate(&request).await?;
        Ok((request, result))
    }

    /// Run the four completions for an already validated request
    pub async fn generate(
      &self
    , request: &GenerationRequest
    ) -> Result<GenerationResult, Error>
    {   info!(
          "Generating design ({}): {} chars",
          request.detail_level,
          request.description.len()
        );
        let [architecture, schema, scaling, api]
          = build_prompts(&request.description, request.detail_level);

        // try_join! drops the remaining calls as soon as one fails
        let joined = tokio::try_join!(
          self.run(&architecture),
          self.run(&schema),
          self.run(&scaling),
          self.run(&api),
        );

        match joined
        {   Ok((architecture, db_schema, scaling_plan, api_structure)) => {
              debug!("All four artifacts generated");
              Ok(GenerationResult
              {   architecture
                , db_schema
                , scaling_plan
                , api_structure
              })
            }
          , Err(e) => {
              error!("Design generation failed: {}", e);
              Err(e)
            }
        }
    }

    async fn run(&self, spec: &PromptSpec) -> Result<String, Error>
    {   debug!("Dispatching {} prompt", spec.kind);
        let text = self.client
          .complete(&spec.system_message(), &spec.user_message())
          .await
          .map_err(|e| {
            error!("{} generation failed: {}", spec.kind, e);
            e
          })?;
        debug!("{} prompt returned {} chars", spec.kind, text.len());
        Ok(text)
    }
}
