use chrono::{DateTime, Utc};
use log::{debug, error, info, trace};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tokio::sync::mpsc;

use crate::request::{GenerationRequest, GenerationResult};
use crate::{DetailLevel, HistoryFoot};

/// Characters of the input kept in a record's display name
const NAME_LEN: usize = 50;

/// A successful generation kept for later recall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRecord
{   pub id: String
  , pub name: String
  , pub input: String
  , pub detail_level: DetailLevel
  , pub output: GenerationResult
  , pub timestamp: DateTime<Utc>
}

impl DesignRecord
{   pub fn new(
      request: &GenerationRequest
    , output: GenerationResult
    ) -> Self
    {   DesignRecord
        {   id: uuid::Uuid::new_v4().to_string()
          , name: display_name(&request.description)
          , input: request.description.clone()
          , detail_level: request.detail_level
          , output
          , timestamp: Utc::now()
        }
    }

    pub fn summary(&self) -> DesignSummary
    {   DesignSummary
        {   id: self.id.clone()
          , name: self.name.clone()
          , timestamp: self.timestamp
        }
    }
}

/// List entry for a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignSummary
{   pub id: String
  , pub name: String
  , pub timestamp: DateTime<Utc>
}

/// First 50 characters, with "..." when the input was longer
pub fn display_name(input: &str) -> String
{   let mut chars = input.chars();
    let head: String = chars.by_ref().take(NAME_LEN).collect();
    if chars.next().is_some()
    {   format!("{}...", head)
    } else
    {   head
    }
}

/// Backend state: newest record at the front
pub struct HistoryBackendState
{   pub records: VecDeque<DesignRecord>
  , pub capacity: usize
}

impl HistoryBackendState
{   pub fn new(capacity: usize) -> Self
    {   debug!("Initializing HistoryBackendState (capacity {})", capacity);
        HistoryBackendState
        {   records: VecDeque::with_capacity(capacity)
          , capacity
        }
    }

    /// Push to the front, evicting the oldest past capacity
    pub fn record(&mut self, record: DesignRecord)
    {   trace!("Recording design {}", record.id);
        self.records.push_front(record);
        while self.records.len() > self.capacity
        {   if let Some(evicted) = self.records.pop_back()
            {   debug!("Evicted design {}", evicted.id);
            }
        }
    }

    pub fn list(&self) -> Vec<DesignSummary>
    {   self.records.iter().map(DesignRecord::summary).collect()
    }

    pub fn get(&self, id: &str) -> Result<DesignRecord, crate::error::Error>
    {   self.records
          .iter()
          .find(|r| r.id == id)
          .cloned()
          .ok_or_else(|| {
            crate::error::Error::NotFound(
              format!("Design not found: {}", id)
            )
          })
    }
}

/// Public API for the history backend - owns the task
pub struct HistoryBackend
{   hand: crate::HistoryHand
  , _task_handle: tokio::task::JoinHandle<()>
}

impl HistoryBackend
{   /// Create and spawn a new history backend
    /// Returns immediately - spawns background task
    pub fn new(capacity: usize) -> Self
    {   debug!("Creating HistoryBackend with task ownership");

        let (record_design_tx, record_design_rx)
          = mpsc::unbounded_channel();
        let (list_designs_tx, list_designs_rx)
          = mpsc::unbounded_channel();
        let (get_design_tx, get_design_rx)
          = mpsc::unbounded_channel();
        let (kill_process_tx, kill_process_rx)
          = mpsc::unbounded_channel();

        let hand = crate::HistoryHand
        {   record_design_tx
          , list_designs_tx
          , get_design_tx
          , kill_process_tx
        };

        let foot = crate::HistoryFoot
        {   record_design_rx
          , list_designs_rx
          , get_design_rx
          , kill_process_rx
        };

        let _task_handle = tokio::spawn(async move {
          run_history_loop(foot, capacity).await
        });

        HistoryBackend
        {   hand
          , _task_handle
        }
    }

    /// Store a record, waiting for the backend to accept it
    pub async fn record(
      &self
    , record: DesignRecord
    ) -> Result<(), crate::error::Error>
    {   debug!("record queuing design {}", record.id);
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        self.hand.record_design_tx
          .send(crate::RecordDesignArgs
          {   record
            , reply: reply_tx
          })
          .map_err(|_| disconnected())?;

        await_reply(reply_rx).await
    }

    /// Summaries of stored records, newest first
    pub async fn list(
      &self
    ) -> Result<Vec<DesignSummary>, crate::error::Error>
    {   debug!("list queuing command");
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        self.hand.list_designs_tx
          .send(crate::ListDesignsArgs { reply: reply_tx })
          .map_err(|_| disconnected())?;

        await_reply(reply_rx).await
    }

    /// Full record by id
    pub async fn get(
      &self
    , id: String
    ) -> Result<DesignRecord, crate::error::Error>
    {   debug!("get queuing command for {}", id);
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        self.hand.get_design_tx
          .send(crate::GetDesignArgs
          {   id
            , reply: reply_tx
          })
          .map_err(|_| disconnected())?;

        await_reply(reply_rx).await
    }

    /// Gracefully shutdown the backend
    pub async fn shutdown(&self) -> Result<(), crate::error::Error>
    {   debug!("Shutting down HistoryBackend");
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();

        self.hand.kill_process_tx
          .send(crate::KillProcessArgs { reply: reply_tx })
          .map_err(|_| {
            error!("Backend channel already closed");
            crate::error::Error::unexpected("History backend already shutdown")
          })?;

        await_reply(reply_rx).await
    }
}

fn disconnected() -> crate::error::Error
{   error!("History backend channel closed");
    crate::error::Error::unexpected("History backend disconnected")
}

async fn await_reply<T>(
  mut reply_rx: mpsc::UnboundedReceiver<Result<T, crate::error::Error>>
) -> Result<T, crate::error::Error>
{   match reply_rx.recv().await
    {   Some(result) => result
      , None => Err(disconnected())
    }
}

/// Main history event loop
///
/// Owns the records; every access goes through a command channel.
async fn run_history_loop(foot: HistoryFoot, capacity: usize)
{   debug!("Starting HistoryBackend event loop");
    let mut state = HistoryBackendState::new(capacity);
    let HistoryFoot
    {   mut record_design_rx
      , mut list_designs_rx
      , mut get_design_rx
      , mut kill_process_rx
    } = foot;

    loop
    { tokio::select!
      { Some(cmd) = record_design_rx.recv() => {
          debug!("Received RecordDesign {}", cmd.record.id);
          state.record(cmd.record);
          let _ = cmd.reply.send(Ok(()));
        }
      , Some(cmd) = list_designs_rx.recv() => {
          debug!("Received ListDesigns");
          let _ = cmd.reply.send(Ok(state.list()));
        }
      , Some(cmd) = get_design_rx.recv() => {
          debug!("Received GetDesign {}", cmd.id);
          let _ = cmd.reply.send(state.get(&cmd.id));
        }
      , Some(cmd) = kill_process_rx.recv() => {
          debug!("Received KillProcess");
          let _ = cmd.reply.send(Ok(()));
          info!("HistoryBackend shutting down");
          break;
        }
      , else => {
          debug!("All history channels closed");
          break;
        }
      }
    }
}
