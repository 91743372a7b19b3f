//! HTTP handler functions for the gridstats API.

use actix_web::{HttpResponse, web};
use gridstats_server_models::{ApiHealth, ApiVersion, CellStatsRequest};

use crate::export::response_to_csv;
use crate::pipeline::{CellStatsError, Collaborators, compute_cell_stats};

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/version`
pub async fn version() -> HttpResponse {
    HttpResponse::Ok().json(ApiVersion {
        version: env!("CARGO_PKG_VERSION").to_string(),
        api_version: "v1".to_string(),
    })
}

/// `POST /api/cell_stats`
///
/// Computes area-weighted statistics for a square cell around the
/// requested location.
pub async fn cell_stats(
    collab: web::Data<Collaborators>,
    request: web::Json<CellStatsRequest>,
) -> HttpResponse {
    match compute_cell_stats(collab.as_ref(), &request).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => error_response(&e),
    }
}

/// `POST /api/cell_stats.csv`
///
/// Same computation as `cell_stats`, rendered as a vertical
/// `Field,Value` CSV attachment.
pub async fn cell_stats_csv(
    collab: web::Data<Collaborators>,
    request: web::Json<CellStatsRequest>,
) -> HttpResponse {
    let response = match compute_cell_stats(collab.as_ref(), &request).await {
        Ok(response) => response,
        Err(e) => return error_response(&e),
    };

    match response_to_csv(&response) {
        Ok(csv) => HttpResponse::Ok()
            .content_type("text/csv")
            .insert_header((
                "Content-Disposition",
                "attachment; filename=cell_stats.csv",
            ))
            .body(csv),
        Err(e) => {
            log::error!("failed to render CSV export: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to render CSV export"
            }))
        }
    }
}

/// Maps pipeline errors onto HTTP statuses: client mistakes are 400s,
/// collaborator outages are 502, invariant violations are 500.
fn error_response(error: &CellStatsError) -> HttpResponse {
    match error {
        CellStatsError::InvalidRequest { message } => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
        }
        CellStatsError::Geocode(e) => {
            log::warn!("geocoding failed: {e}");
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("geocoding failed: {e}")
            }))
        }
        CellStatsError::AreaLookup(e) => {
            log::error!("area lookup failed: {e}");
            HttpResponse::BadGateway().json(serde_json::json!({
                "error": "spatial area lookup unavailable"
            }))
        }
        CellStatsError::Projection(e) => {
            log::error!("projection failure: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal projection error"
            }))
        }
    }
}
