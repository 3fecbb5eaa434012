use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use futures_util::StreamExt;
use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Error;
use crate::history::{DesignRecord, HistoryBackend};
use crate::orchestrator::Orchestrator;
use crate::providers::{CompletionClient, GroqClient};
use crate::request::GenerateBody;

/// Canned descriptions offered to first-time users
pub const EXAMPLES: [&str; 5] = [
    "Design Netflix – a streaming platform with millions of concurrent users, personalized recommendations, multi-device playback, user profiles, ratings, and search."
  , "Build an e-commerce platform like Amazon with product catalog, shopping cart, payments, inventory management, order tracking, and reviews."
  , "Create a real-time collaborative document editor like Google Docs with concurrent editing, comments, and version history."
  , "Design a Twitter-like social network with posts, likes, comments, trending topics, and user feeds."
  , "Build a video conferencing platform like Zoom with real-time video/audio, screen sharing, and recording."
];

/// Largest accepted `POST /api/generate` body
pub const MAX_BODY_BYTES: usize = 256 * 1024;

pub struct AppState
{   pub orchestrator: Orchestrator
  , pub history: HistoryBackend
}

impl AppState
{   /// Must be called inside a tokio runtime (spawns the history task)
    pub fn new(
      client: Arc<dyn CompletionClient>
    , history_capacity: usize
    ) -> Self
    {   AppState
        {   orchestrator: Orchestrator::new(client)
          , history: HistoryBackend::new(history_capacity)
        }
    }
}

/// Collect the request body, failing once it passes `MAX_BODY_BYTES`
async fn read_body(
  mut payload: web::Payload
) -> Result<web::BytesMut, Error>
{   let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await
    {   let chunk = chunk.map_err(|e| Error::InvalidBody(e.to_string()))?;
        if body.len() + chunk.len() > MAX_BODY_BYTES
        {   debug!("Rejected request body over {} bytes", MAX_BODY_BYTES);
            return Err(Error::PayloadTooLarge(MAX_BODY_BYTES));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

async fn generate(
  state: web::Data<AppState>
, payload: web::Payload
) -> Result<HttpResponse, Error>
{   let body = read_body(payload).await?;
    let body = GenerateBody::from_slice(&body)?;
    let (request, result) = state.orchestrator.handle(&body).await?;

    let record = DesignRecord::new(&request, result.clone());
    if let Err(e) = state.history.record(record).await
    {   warn!("Design generated but not recorded: {}", e);
    }

    Ok(HttpResponse::Ok().json(result))
}

async fn list_history(
  state: web::Data<AppState>
) -> Result<HttpResponse, Error>
{   let summaries = state.history.list().await?;
    Ok(HttpResponse::Ok().json(summaries))
}

async fn get_history(
  state: web::Data<AppState>
, path: web::Path<String>
) -> Result<HttpResponse, Error>
{   let record = state.history.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

async fn list_examples() -> impl Responder
{   HttpResponse::Ok().json(EXAMPLES)
}

async fn health_check() -> impl Responder
{   HttpResponse::Ok().body("OK")
}

async fn not_found(req: HttpRequest) -> Result<HttpResponse, Error>
{   Err(Error::NotFound(
      format!("No route for {} {}", req.method(), req.path())
    ))
}

pub fn app_config(cfg: &mut web::ServiceConfig)
{   cfg.service(
        web::scope("/api")
          .route("/generate", web::post().to(generate))
          .route("/history", web::get().to(list_history))
          .route("/history/{id}", web::get().to(get_history))
          .route("/examples", web::get().to(list_examples))
      )
      .route("/health", web::get().to(health_check))
      .default_service(web::route().to(not_found));
}

/// Build the production state and serve until shutdown
pub async fn run(config: AppConfig) -> Result<(), Error>
{   if config.provider.api_key.is_none()
    {   warn!("GROQ_API_KEY is not set; generation requests will fail");
    }

    let client: Arc<dyn CompletionClient>
      = Arc::new(GroqClient::new(&config.provider)?);
    let app_state = web::Data::new(
      AppState::new(client, config.history.capacity)
    );

    let bind_addr = config.server.bind_addr();
    let server = HttpServer::new(move || {
        App::new()
          .app_data(app_state.clone())
          .configure(app_config)
      })
      .workers(config.server.workers)
      .bind(&bind_addr)
      .map_err(|e| {
        error!("Failed to bind {}: {}", bind_addr, e);
        Error::unexpected(format!("Failed to bind {}: {}", bind_addr, e))
      })?
      .run();

    info!(
      "AutoArch listening on http://{} (model {})",
      bind_addr, config.provider.model
    );

    server.await.map_err(|e| {
      error!("Web server error: {}", e);
      Error::unexpected(format!("Web server error: {}", e))
    })
}
