//! Any errors that citypop-web might generate, and supporting
//! implementations.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// An error that happened in a web handler.
///
/// Each variant's `Display` string is the message reported to the client,
/// rendered as a JSON body of the shape `{"error": "<message>"}` with the
/// variant's status code.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request body was not JSON of the expected shape.
    #[error("Invalid request payload")]
    InvalidPayload,

    /// The decoded record was missing its name or population.
    #[error("City and population must be provided")]
    MissingFields,

    /// The fetch path had an empty trailing segment.
    #[error("City name must be provided")]
    MissingCityName,

    /// The store rejected or never received the write.
    #[error("Failed to add/update city")]
    WriteFailed,

    /// The store did not produce a readable document for the requested name.
    #[error("City not found")]
    NotFound,
}

/// The JSON body reported to clients when a handler fails.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// The client-visible message.
    error: String,
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPayload | Self::MissingFields | Self::MissingCityName => {
                StatusCode::BAD_REQUEST
            }
            Self::WriteFailed => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::HandlerError;
    use actix_web::{body, http::StatusCode, ResponseError};
    use serde_json::{json, Value};

    /// Renders an error the way actix would and parses the JSON body.
    async fn rendered(error: HandlerError) -> (StatusCode, Value) {
        let response = error.error_response();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body()).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[actix_rt::test]
    async fn validation_errors_are_bad_requests() {
        let (status, body) = rendered(HandlerError::InvalidPayload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid request payload"}));

        let (status, body) = rendered(HandlerError::MissingFields).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "City and population must be provided"}));

        let (status, body) = rendered(HandlerError::MissingCityName).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "City name must be provided"}));
    }

    #[actix_rt::test]
    async fn store_failures_map_to_their_statuses() {
        let (status, body) = rendered(HandlerError::WriteFailed).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to add/update city"}));

        let (status, body) = rendered(HandlerError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "City not found"}));
    }
}
