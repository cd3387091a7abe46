use actix_web::{HttpResponse, Result};
use crate::api_error::ApiError;

pub async fn health_check() -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "arenax-brackets",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
