//! Fixed prompt templates, one per artifact kind

use crate::{ArtifactKind, DetailLevel};

const ARCHITECTURE_TEMPLATE: &str
  = r#"Generate ONLY a Mermaid flowchart diagram. No explanations, no markdown, just the diagram code.

Rules:
1. Start with "graph TD" or "graph LR"
2. Use short node names: Frontend, API, Service1, DB, Cache, Queue
3. Connect nodes with -->
4. Use quotes for labels with spaces: ["My Service"]
5. Keep it simple with 6-8 nodes max

Example:
graph TD
    A["Web Frontend"]
    B["API Gateway"]
    C["Auth Service"]
    D["Database"]
    E["Cache"]
    A --> B
    B --> C
    B --> D
    D --> E"#;

const SCHEMA_TEMPLATE: &str
  = "You are an expert database designer. Generate a normalized SQL database schema with:
- 6-10 core tables relevant to the system
- Primary keys, foreign keys, and indexes
- Data types and constraints
- Relationships between tables
Return ONLY valid SQL DDL statements (CREATE TABLE, CREATE INDEX).";

const SCALING_TEMPLATE: &str
  = "You are a scaling and DevOps expert. Generate a detailed scaling plan with:
- Load balancing strategy (horizontal/vertical)
- Database replication and sharding approach
- Caching strategy
- CDN distribution plan
- Potential bottlenecks and mitigation
- Cost optimization tips
Keep it concise but comprehensive.";

const API_TEMPLATE: &str
  = "You are a REST API designer. Generate a JSON structure representing OpenAPI 3.0 endpoints for the system. Include:
- 8-12 core endpoints (GET, POST, PUT, DELETE)
- Request and response schemas
- Authentication method (Bearer token)
- Rate limiting info
- Error codes
Return valid JSON formatted as a simple API spec (not full OpenAPI, but structured endpoint list).";

/// Fixed instruction text for a kind
pub fn template(kind: ArtifactKind) -> &'static str
{   match kind
    {   ArtifactKind::Architecture => ARCHITECTURE_TEMPLATE
      , ArtifactKind::Schema => SCHEMA_TEMPLATE
      , ArtifactKind::Scaling => SCALING_TEMPLATE
      , ArtifactKind::Api => API_TEMPLATE
    }
}

/// Task line that precedes the description in the user message
pub fn task(kind: ArtifactKind) -> &'static str
{   match kind
    {   ArtifactKind::Architecture =>
          "Create a Mermaid architecture diagram for:"
      , ArtifactKind::Schema => "Design the database schema for:"
      , ArtifactKind::Scaling => "Create a scaling plan for:"
      , ArtifactKind::Api => "Design the API structure for:"
    }
}

/// One prompt pair, ready to send to a completion client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec
{   pub kind: ArtifactKind
  , pub system_instruction: &'static str
  , pub detail_modifier: &'static str
  , pub description: String
}

impl PromptSpec
{   pub fn new(
      kind: ArtifactKind
    , description: &str
    , detail_level: DetailLevel
    ) -> Self
    {   PromptSpec
        {   kind
          , system_instruction: template(kind)
          , detail_modifier: detail_level.modifier()
          , description: description.to_string()
        }
    }

    /// Template followed by the detail modifier
    pub fn system_message(&self) -> String
    {   format!("{}\n\n{}", self.system_instruction, self.detail_modifier)
    }

    pub fn user_message(&self) -> String
    {   format!("{} {}", task(self.kind), self.description)
    }
}

/// Exactly one spec per artifact kind, in `ArtifactKind::ALL` order
pub fn build_prompts(
  description: &str
, detail_level: DetailLevel
) -> [PromptSpec; 4]
{   ArtifactKind::ALL.map(|kind| {
      PromptSpec::new(kind, description, detail_level)
    })
}
