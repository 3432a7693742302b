use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::Json;
use serde::Serialize;

use crate::utils::{AppError, ZoneId};

pub mod events;

/// Header carrying the client's IANA zone identifier.
pub const TIMEZONE_HEADER: &str = "x-timezone";

#[derive(Serialize)]
pub struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Json<HealthPayload> {
    Json(HealthPayload {
        status: "ok",
        service: "calendar-api",
    })
}

/// Zone the request's wall-clock values are expressed in.
#[derive(Debug, Clone, Copy)]
pub struct RequestZone(pub ZoneId);

#[async_trait]
impl<S> FromRequestParts<S> for RequestZone
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(TIMEZONE_HEADER).ok_or_else(|| {
            AppError::BadRequest("Required request header 'X-Timezone' is missing".to_string())
        })?;
        let id = value
            .to_str()
            .map_err(|_| AppError::InvalidTimezone(String::from_utf8_lossy(value.as_bytes()).into_owned()))?;

        ZoneId::parse(id).map(RequestZone)
    }
}
