use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::local_datetime;

/// Stored event. Identity and audit timestamps belong to the store.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct EventEntity {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_instant: DateTime<Utc>,
    pub end_instant: DateTime<Utc>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Event that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: Option<String>,
    pub start_instant: DateTime<Utc>,
    pub end_instant: DateTime<Utc>,
    pub location: Option<String>,
}

/// Wire shape for requests and responses. Start and end are wall-clock values
/// in the zone named by the request's `X-Timezone` header.
///
/// Every field is optional on input so validation can report all missing
/// fields together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(with = "local_datetime::option")]
    pub start_date_time: Option<NaiveDateTime>,
    #[serde(with = "local_datetime::option")]
    pub end_date_time: Option<NaiveDateTime>,
    pub location: Option<String>,
}
