use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use std::io;

use crate::error::ApiError;
use crate::handlers;
use crate::state::AppState;

const JSON_BODY_LIMIT: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub llm_base_url: String,
    pub model: String,
    pub api_key: String,
}

/// Registers every `/api` route.
pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/chat", web::post().to(handlers::chat::handler))
            .route(
                "/chat/tool-call-approvals",
                web::post().to(handlers::approvals::handler),
            )
            .route("/mcp/tools", web::post().to(handlers::mcp::list_tools))
            .route("/doc", web::get().to(handlers::doc::handler)),
    );
}

/// JSON extractor settings; malformed bodies become `400 {"error": ...}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req| {
            log::warn!("Rejected request body: {}", err);
            ApiError::BadRequest(err.to_string()).into()
        })
}

pub async fn run_server(config: ServerConfig) -> io::Result<()> {
    log::info!(
        "Initializing server with base URL: {}, model: {}",
        config.llm_base_url,
        config.model
    );
    let state = web::Data::new(AppState::from_config(&config));

    log::info!("Listening on {}:{}", config.host, config.port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(json_config())
            .wrap(Cors::permissive())
            .configure(app_config)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
