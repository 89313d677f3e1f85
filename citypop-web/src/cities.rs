//! Web handlers for storing and retrieving city populations.

use actix_web::{
    get, route,
    web::{self, Data, ServiceConfig},
    HttpResponse,
};
use citypop_store::{CityEnvelope, CityStore};
use serde::Serialize;

use crate::errors::HandlerError;

/// Configure routes for the city service.
pub fn configure(config: &mut ServiceConfig) {
    config.service(upsert).service(fetch);
}

/// The body of a successful upsert response.
#[derive(Debug, Serialize)]
struct UpsertResponse {
    /// A human readable confirmation naming the city.
    message: String,
}

/// Add a city document, or fully replace the existing one with the same
/// name. The body is decoded by hand rather than with the `Json` extractor
/// so that malformed payloads produce this API's error body.
#[route("", method = "POST", method = "PUT")]
async fn upsert(store: Data<CityStore>, body: web::Bytes) -> Result<HttpResponse, HandlerError> {
    let envelope: CityEnvelope = serde_json::from_slice(&body).map_err(|error| {
        tracing::debug!(%error, "Error decoding request payload");
        HandlerError::InvalidPayload
    })?;

    let record = envelope.source;
    if !record.is_complete() {
        tracing::debug!("City and population must be provided");
        return Err(HandlerError::MissingFields);
    }

    tracing::info!(city = %record.name, "Indexing city");
    store.city_put(&record).await.map_err(|error| {
        tracing::error!(%error, r#type = "web.city.write-error", "Error indexing city");
        HandlerError::WriteFailed
    })?;

    Ok(HttpResponse::Ok().json(UpsertResponse {
        message: format!("{} added/updated successfully", record.name),
    }))
}

/// Retrieve the stored document for a city. The name is the full remainder
/// of the path after `/city/`, so it may contain any character.
#[get("/{name:.*}")]
async fn fetch(
    store: Data<CityStore>,
    name: web::Path<String>,
) -> Result<HttpResponse, HandlerError> {
    let name = name.into_inner();
    if name.is_empty() {
        tracing::debug!("City name must be provided");
        return Err(HandlerError::MissingCityName);
    }

    // Transport errors, error responses from the store, and undecodable
    // documents are indistinguishable to the client; the log line keeps the
    // cause.
    let envelope = store.city_get(&name).await.map_err(|error| {
        tracing::warn!(%error, r#type = "web.city.lookup-failed", "Error retrieving city");
        HandlerError::NotFound
    })?;

    tracing::info!(
        city = %envelope.source.name,
        population = envelope.source.population,
        "Retrieved city"
    );

    Ok(HttpResponse::Ok().json(envelope))
}
