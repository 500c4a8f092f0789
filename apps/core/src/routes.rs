use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{get, post, web, HttpResponse};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info_span, Instrument};
use uuid::Uuid;

use crate::actors::supervisor::TherapySupervisor;
use crate::actors::traits::LlmActor;
use crate::error::AppError;
use crate::models::InferenceRequest;

/// Maximum accepted request body, in bytes.
pub const BODY_LIMIT: usize = 131_072;

pub type SharedSupervisor = Arc<TherapySupervisor<dyn LlmActor>>;

/// Shared state handed to every handler.
pub struct AppState {
    pub supervisor: SharedSupervisor,
}

impl AppState {
    pub fn new(supervisor: SharedSupervisor) -> web::Data<Self> {
        web::Data::new(Self { supervisor })
    }
}

#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    match state.supervisor.status().await {
        Ok(status) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "model": state.supervisor.model_name(),
            "model_status": status,
            "timestamp": Utc::now().timestamp(),
        })),
        Err(e) => {
            error!("Health check error: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Health check failed"
            }))
        }
    }
}

#[post("/inference")]
pub async fn inference(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("inference", %request_id);

    async move {
        let request = InferenceRequest::from_json(&body)?;
        let response = state.supervisor.infer(request).await?;
        Ok(HttpResponse::Ok().json(response))
    }
    .instrument(span)
    .await
}

pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({ "error": "Not found" }))
}

/// Any origin may call the service; only the public verbs are allowed.
pub fn build_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600)
}

/// Registers every route. Shared by the binary and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::default().limit(BODY_LIMIT))
        .service(health)
        .service(inference)
        .default_service(web::to(not_found));
}
