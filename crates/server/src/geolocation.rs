//! Pharmacy geolocation endpoints

use api_types::geolocation::{GeoLocation, GeoLocationUpsert};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use engine::{GeoLocationInput, PharmacyLocation};

use crate::{ServerError, server::ServerState};

fn view(saved: PharmacyLocation) -> GeoLocation {
    GeoLocation {
        id: saved.location.id.to_string(),
        latitude: saved.location.latitude,
        longitude: saved.location.longitude,
        pharmacy_id: saved.pharmacy_id.to_string(),
    }
}

/// Handle requests for creating or moving the location of a pharmacy
pub async fn upsert(
    State(state): State<ServerState>,
    payload: Result<Json<GeoLocationUpsert>, JsonRejection>,
) -> Result<(StatusCode, Json<GeoLocation>), ServerError> {
    let Json(payload) = payload.map_err(|rejection| ServerError::Generic(rejection.body_text()))?;

    let saved = state
        .engine
        .upsert_pharmacy_location(GeoLocationInput {
            latitude: payload.latitude,
            longitude: payload.longitude,
            pharmacy_id: payload.pharmacy_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(view(saved))))
}

/// Handle requests for reading the location of a pharmacy
pub async fn get(
    State(state): State<ServerState>,
    Path(pharmacy_id): Path<String>,
) -> Result<Json<GeoLocation>, ServerError> {
    let saved = state.engine.pharmacy_location(&pharmacy_id).await?;
    Ok(Json(view(saved)))
}
