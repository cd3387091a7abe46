use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tokio::signal;

use arenax_brackets::config::Config;
use arenax_brackets::http::bracket_handler::{self, AppState};
use arenax_brackets::middleware::cors_middleware;
use arenax_brackets::service::BracketService;
use arenax_brackets::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> io::Result<()> {
    // Load configuration
    let config = Config::from_env()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    // Initialize telemetry
    init_telemetry(&config.server.rust_log);

    let bracket_service = Arc::new(BracketService::new(config.bracket.generate_options()));
    let state = web::Data::new(AppState { bracket_service });

    tracing::info!(
        match_number_offset = config.bracket.match_number_offset,
        grand_final_reset = config.bracket.grand_final_reset,
        "Starting ArenaX bracket service on {}:{}",
        config.server.host,
        config.server.port
    );

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(cors_middleware())
            .wrap(actix_web::middleware::Logger::default())
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(arenax_brackets::http::health::health_check))
                    .configure(bracket_handler::configure),
            )
    })
    .bind((config.server.host.clone(), config.server.port))?
    .run();

    // Graceful shutdown
    let server_handle = server.handle();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        tracing::info!("Shutdown signal received, stopping server...");
        server_handle.stop(true).await;
    });

    server.await
}
