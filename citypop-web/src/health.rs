//! The health endpoint, reporting whether the search index is reachable.

use actix_web::{
    get,
    web::{Data, ServiceConfig},
    HttpResponse,
};
use citypop_store::CityStore;
use serde::Serialize;

/// Configure routes for the health service.
pub fn configure(config: &mut ServiceConfig) {
    config.service(health);
}

/// The body of a health check response.
#[derive(Debug, Serialize)]
struct HealthStatus {
    /// A short human readable description of the server's state.
    status: &'static str,
}

/// Probe the search index and report the result. A failed probe is a
/// reportable condition, not an error, so this handler never fails.
#[get("")]
async fn health(store: Data<CityStore>) -> HttpResponse {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(HealthStatus { status: "OK" }),
        Err(error) => {
            tracing::warn!(%error, r#type = "web.health.unreachable", "Error pinging Elasticsearch");
            HttpResponse::ServiceUnavailable().json(HealthStatus {
                status: "Elasticsearch not reachable",
            })
        }
    }
}
