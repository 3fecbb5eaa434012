pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod prompt;
pub mod orchestrator;
pub mod history;
pub mod server;

pub use error::Error;
pub use history::HistoryBackend;
pub use orchestrator::Orchestrator;
pub use providers::{CompletionClient, GroqClient};
pub use request::{GenerationRequest, GenerationResult};

use serde::{Deserialize, Serialize};

/*

autoarch turns one free-text system description into four design
artifacts by fanning it out to a hosted chat-completion API:

  POST /api/generate
    -> orchestrator   validate, build prompts, join four calls
    -> prompt         fixed templates per artifact kind
    -> providers      CompletionClient trait, Groq implementation
    -> history        last N successful designs, in memory only

*/

/// AUTOARCH HISTORY INTERFACE:

// ===== RecordDesign =====

pub type RecordDesignReply = Result<(), crate::error::Error>;
pub type RecordDesignReplySender
  = tokio::sync::mpsc::UnboundedSender<RecordDesignReply>;

pub struct RecordDesignArgs
{   pub record: crate::history::DesignRecord
  , pub reply: RecordDesignReplySender
}

// ===== ListDesigns =====

pub type ListDesignsReply
  = Result<Vec<crate::history::DesignSummary>, crate::error::Error>;
pub type ListDesignsReplySender
  = tokio::sync::mpsc::UnboundedSender<ListDesignsReply>;

pub struct ListDesignsArgs
{   pub reply: ListDesignsReplySender
}

// ===== GetDesign =====

pub type GetDesignReply
  = Result<crate::history::DesignRecord, crate::error::Error>;
pub type GetDesignReplySender
  = tokio::sync::mpsc::UnboundedSender<GetDesignReply>;

pub struct GetDesignArgs
{   pub id: String
  , pub reply: GetDesignReplySender
}

// ===== KillProcess =====

pub type KillProcessReply = Result<(), crate::error::Error>;
pub type KillProcessReplySender
  = tokio::sync::mpsc::UnboundedSender<KillProcessReply>;

pub struct KillProcessArgs
{   pub reply: KillProcessReplySender
}

// ===== HistoryHand (sender side) =====

#[derive(Clone)]
pub struct HistoryHand
{   pub record_design_tx
      : tokio::sync::mpsc::UnboundedSender<RecordDesignArgs>
  , pub list_designs_tx
      : tokio::sync::mpsc::UnboundedSender<ListDesignsArgs>
  , pub get_design_tx
      : tokio::sync::mpsc::UnboundedSender<GetDesignArgs>
  , pub kill_process_tx
      : tokio::sync::mpsc::UnboundedSender<KillProcessArgs>
}

// ===== HistoryFoot (receiver side) =====

pub struct HistoryFoot
{   pub record_design_rx
      : tokio::sync::mpsc::UnboundedReceiver<RecordDesignArgs>
  , pub list_designs_rx
      : tokio::sync::mpsc::UnboundedReceiver<ListDesignsArgs>
  , pub get_design_rx
      : tokio::sync::mpsc::UnboundedReceiver<GetDesignArgs>
  , pub kill_process_rx
      : tokio::sync::mpsc::UnboundedReceiver<KillProcessArgs>
}

/// AUTOARCH STRUCTURES:

/// The four artifacts produced for every design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind
{   /// Mermaid flowchart of the components
    Architecture
  , /// SQL DDL for the data model
    Schema
  , /// Narrative plan for scaling the system
    Scaling
  , /// JSON listing of the public endpoints
    Api
}

impl ArtifactKind
{   /// All kinds, in the order prompts are built
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Architecture
      , ArtifactKind::Schema
      , ArtifactKind::Scaling
      , ArtifactKind::Api
    ];

    pub fn as_str(&self) -> &'static str
    {   match self
        {   ArtifactKind::Architecture => "architecture"
          , ArtifactKind::Schema => "schema"
          , ArtifactKind::Scaling => "scaling"
          , ArtifactKind::Api => "api"
        }
    }
}

impl std::fmt::Display for ArtifactKind
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.write_str(self.as_str())
    }
}

/// Requested verbosity of the generated artifacts.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize
)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel
{   /// Roughly half the usual length
    Concise
  , /// Default when nothing (or nothing recognised) is supplied
    #[default]
    Balanced
  , /// Exhaustive coverage
    Detailed
}

impl DetailLevel
{   /// Total parse: anything unrecognised is `Balanced`
    pub fn parse_or_default(raw: &str) -> Self
    {   match raw
        {   "concise" => DetailLevel::Concise
          , "detailed" => DetailLevel::Detailed
          , _ => DetailLevel::Balanced
        }
    }

    pub fn as_str(&self) -> &'static str
    {   match self
        {   DetailLevel::Concise => "concise"
          , DetailLevel::Balanced => "balanced"
          , DetailLevel::Detailed => "detailed"
        }
    }

    /// Instruction appended to every prompt at this level
    pub fn modifier(&self) -> &'static str
    {   match self
        {   DetailLevel::Concise =>
              "Keep response concise and brief (50% shorter)."
          , DetailLevel::Balanced =>
              "Provide a balanced, comprehensive response."
          , DetailLevel::Detailed =>
              "Provide a detailed, comprehensive response with all nuances."
        }
    }
}

impl std::fmt::Display for DetailLevel
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {   f.write_str(self.as_str())
    }
}
