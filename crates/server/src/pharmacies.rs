use api_types::pharmacy::{Location, PharmacySummary};
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

/// Handle requests for listing pharmacies
pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<PharmacySummary>>, ServerError> {
    let listing = state.engine.pharmacies().await?;

    Ok(Json(
        listing
            .into_iter()
            .map(|entry| PharmacySummary {
                id: entry.pharmacy.id.to_string(),
                name: entry.pharmacy.name,
                city: entry.pharmacy.address.city,
                verified: entry.pharmacy.verified,
                location: entry.location.map(|location| Location {
                    id: location.id.to_string(),
                    latitude: location.latitude,
                    longitude: location.longitude,
                }),
            })
            .collect(),
    ))
}
