// TCC inference server entry point

use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use tcc_core::actors::llm::LlmActorHandle;
use tcc_core::actors::supervisor::TherapySupervisor;
use tcc_core::actors::traits::LlmActor;
use tcc_core::config::AppConfig;
use tcc_core::routes::{self, AppState, SharedSupervisor};
use tcc_core::telemetry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    telemetry::init(config.log_format);
    config.warn_missing();

    info!(
        model = %config.model_name,
        ollama_url = %config.ollama_url,
        demo_mode = config.demo_mode,
        match_mode = ?config.match_mode,
        "Starting tcc-server"
    );

    let llm: Arc<dyn LlmActor> = Arc::new(LlmActorHandle::new(config.llm_config()));
    let supervisor: SharedSupervisor = Arc::new(TherapySupervisor::from_config(&config, llm));
    supervisor.warmup().await;

    let state = AppState::new(supervisor.clone());
    let bind_addr = ("0.0.0.0", config.port);
    info!("Listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(routes::build_cors())
            .app_data(state.clone())
            .app_data(web::JsonConfig::default().limit(routes::BODY_LIMIT))
            .configure(routes::configure)
    })
    .bind(bind_addr)
    .with_context(|| format!("Failed to bind port {}", config.port))?
    .run()
    .await?;

    info!("Server stopped, releasing model");
    supervisor.shutdown().await;
    Ok(())
}
