use chrono::{DateTime, NaiveDateTime, Utc};

use crate::models::{EventEntity, EventPayload, NewEvent};
use crate::services::validation::{EVENT_FIELD, START_AFTER_END_MESSAGE};
use crate::utils::time::{to_instant, to_local};
use crate::utils::{AppError, AppResult, ZoneId};

/// Translation between the wire shape and the stored shape.
///
/// Text is trimmed on the way in; optional text that is blank after trimming
/// is stored as absent.
pub trait EventMapping: Send + Sync {
    /// `None` in, `None` out.
    fn to_entity(&self, input: Option<&EventPayload>, zone: &ZoneId) -> AppResult<Option<NewEvent>>;

    /// `None` in, `None` out.
    fn to_output(
        &self,
        entity: Option<&EventEntity>,
        zone: &ZoneId,
    ) -> AppResult<Option<EventPayload>>;

    /// Overwrites the client-editable fields of `existing`. Identity and audit
    /// timestamps are left for the store.
    fn apply_update(
        &self,
        input: &EventPayload,
        zone: &ZoneId,
        existing: &mut EventEntity,
    ) -> AppResult<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EventMapper;

impl EventMapper {
    pub fn new() -> Self {
        Self
    }
}

impl EventMapping for EventMapper {
    fn to_entity(&self, input: Option<&EventPayload>, zone: &ZoneId) -> AppResult<Option<NewEvent>> {
        let Some(input) = input else {
            return Ok(None);
        };
        let fields = MappedFields::from_payload(input, zone)?;

        Ok(Some(NewEvent {
            title: fields.title,
            description: fields.description,
            start_instant: fields.start_instant,
            end_instant: fields.end_instant,
            location: fields.location,
        }))
    }

    fn to_output(
        &self,
        entity: Option<&EventEntity>,
        zone: &ZoneId,
    ) -> AppResult<Option<EventPayload>> {
        let Some(entity) = entity else {
            return Ok(None);
        };

        Ok(Some(EventPayload {
            id: Some(entity.id),
            title: Some(entity.title.clone()),
            description: entity.description.clone(),
            start_date_time: Some(to_local(entity.start_instant, zone)?),
            end_date_time: Some(to_local(entity.end_instant, zone)?),
            location: entity.location.clone(),
        }))
    }

    fn apply_update(
        &self,
        input: &EventPayload,
        zone: &ZoneId,
        existing: &mut EventEntity,
    ) -> AppResult<()> {
        let fields = MappedFields::from_payload(input, zone)?;

        existing.title = fields.title;
        existing.description = fields.description;
        existing.start_instant = fields.start_instant;
        existing.end_instant = fields.end_instant;
        existing.location = fields.location;
        Ok(())
    }
}

struct MappedFields {
    title: String,
    description: Option<String>,
    start_instant: DateTime<Utc>,
    end_instant: DateTime<Utc>,
    location: Option<String>,
}

impl MappedFields {
    fn from_payload(input: &EventPayload, zone: &ZoneId) -> AppResult<Self> {
        let start = required(input.start_date_time, "startDateTime", "Start date time is required")?;
        let end = required(input.end_date_time, "endDateTime", "End date time is required")?;

        let start_instant = to_instant(start, zone)?;
        let end_instant = to_instant(end, zone)?;
        // A start inside a DST gap can overtake an end just after it
        if start_instant >= end_instant {
            return Err(AppError::field(EVENT_FIELD, START_AFTER_END_MESSAGE));
        }

        Ok(Self {
            title: input.title.as_deref().map(str::trim).unwrap_or_default().to_string(),
            description: trimmed(input.description.as_deref()),
            start_instant,
            end_instant,
            location: trimmed(input.location.as_deref()),
        })
    }
}

fn required(value: Option<NaiveDateTime>, field: &str, message: &str) -> AppResult<NaiveDateTime> {
    value.ok_or_else(|| AppError::field(field, message))
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
