use crate::api_error::ApiError;
use crate::models::{GenerateBracketRequest, MatchResultRequest};
use crate::service::BracketService;
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Application state containing the Bracket Service
pub struct AppState {
    pub bracket_service: Arc<BracketService>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/tournaments/{id}/bracket",
        web::post().to(generate_bracket),
    )
    .route("/tournaments/{id}/bracket", web::get().to(get_bracket))
    .route("/tournaments/{id}/bracket", web::delete().to(teardown_bracket))
    .route("/matches/{id}", web::get().to(get_match))
    .route("/matches/{id}/result", web::post().to(submit_result));
}

// =============================================================================
// GENERATE BRACKET
// =============================================================================

/// POST /api/tournaments/:id/bracket
pub async fn generate_bracket(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<GenerateBracketRequest>,
) -> Result<impl Responder, ApiError> {
    let tournament_id = path.into_inner();

    info!(
        tournament_id = %tournament_id,
        format = %req.format,
        participants = req.participants.len(),
        "Received generate bracket request"
    );

    let bracket = state
        .bracket_service
        .generate_bracket(tournament_id, req.into_inner())
        .await?;

    Ok(HttpResponse::Created().json(bracket))
}

/// GET /api/tournaments/:id/bracket
pub async fn get_bracket(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let bracket = state.bracket_service.get_bracket(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(bracket))
}

/// DELETE /api/tournaments/:id/bracket
pub async fn teardown_bracket(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let tournament_id = path.into_inner();
    info!(tournament_id = %tournament_id, "Received bracket teardown request");
    state.bracket_service.teardown(tournament_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

// =============================================================================
// MATCHES
// =============================================================================

/// GET /api/matches/:id
pub async fn get_match(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, ApiError> {
    let result = state.bracket_service.get_match(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[derive(Debug, Serialize)]
pub struct MatchResultResponse {
    pub match_id: Uuid,
    pub newly_playable: Vec<crate::models::Match>,
}

/// POST /api/matches/:id/result
/// Record the winner and loser of a completed match
pub async fn submit_result(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<MatchResultRequest>,
) -> Result<impl Responder, ApiError> {
    let match_id = path.into_inner();

    info!(
        match_id = %match_id,
        winner_id = %req.winner_id,
        loser_id = %req.loser_id,
        "Received match result"
    );

    let newly_playable = state
        .bracket_service
        .advance_match(match_id, req.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(MatchResultResponse {
        match_id,
        newly_playable,
    }))
}
