//! Inbound request and outbound result types for AutoArch

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::{ArtifactKind, DetailLevel};

/// Message returned whenever the description is missing or blank
pub const DESCRIPTION_REQUIRED: &str = "System description is required";

/// Raw `POST /api/generate` body, before validation
///
/// Fields are kept as loose JSON so that a wrongly typed value is a
/// validation problem rather than a deserialization one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateBody
{   /// Free-text system description
    #[serde(rename = "systemDescription", default)]
    pub system_description: Option<Value>
  , /// One of "concise", "balanced", "detailed"
    #[serde(rename = "detailLevel", default)]
    pub detail_level: Option<Value>
}

impl GenerateBody
{   /// Parse a request body; anything that is not a JSON object fails
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Error>
    {   let value: Value = serde_json::from_slice(bytes)
          .map_err(|e| Error::InvalidBody(e.to_string()))?;
        if !value.is_object()
        {   return Err(Error::InvalidBody(
              "expected a JSON object".to_string()
            ));
        }
        serde_json::from_value(value)
          .map_err(|e| Error::InvalidBody(e.to_string()))
    }

    /// Description if it was supplied as a string
    pub fn description(&self) -> Option<&str>
    {   self.system_description.as_ref().and_then(Value::as_str)
    }

    /// Detail level, `Balanced` when absent or unrecognised
    pub fn detail_level(&self) -> DetailLevel
    {   self.detail_level
          .as_ref()
          .and_then(Value::as_str)
          .map(DetailLevel::parse_or_default)
          .unwrap_or_default()
    }
}

/// True when only whitespace or byte-order marks remain
pub fn is_blank(text: &str) -> bool
{   text.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
      .is_empty()
}

/// Validated generation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest
{   /// Description, passed upstream verbatim
    pub description: String
  , /// Requested verbosity
    pub detail_level: DetailLevel
}

impl GenerationRequest
{   /// Build a request, rejecting blank descriptions
    pub fn new(
      description: impl Into<String>
    , detail_level: DetailLevel
    ) -> Result<Self, Error>
    {   let description = description.into();
        if is_blank(&description)
        {   return Err(Error::Validation(
              DESCRIPTION_REQUIRED.to_string()
            ));
        }
        Ok(GenerationRequest
        {   description
          , detail_level
        })
    }
}

impl TryFrom<&GenerateBody> for GenerationRequest
{   type Error = Error;

    fn try_from(body: &GenerateBody) -> Result<Self, Self::Error>
    {   let description = body.description()
          .ok_or_else(|| {
            Error::Validation(DESCRIPTION_REQUIRED.to_string())
          })?;
        GenerationRequest::new(description, body.detail_level())
    }
}

/// The four generated artifacts, always present together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult
{   /// Mermaid flowchart
    pub architecture: String
  , /// SQL DDL
    pub db_schema: String
  , /// Scaling narrative
    pub scaling_plan: String
  , /// API endpoint listing, usually JSON
    pub api_structure: String
}

impl GenerationResult
{   /// Artifact text for one kind
    pub fn get(&self, kind: ArtifactKind) -> &str
    {   match kind
        {   ArtifactKind::Architecture => &self.architecture
          , ArtifactKind::Schema => &self.db_schema
          , ArtifactKind::Scaling => &self.scaling_plan
          , ArtifactKind::Api => &self.api_structure
        }
    }
}
