use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDateTime};

use crate::models::EventPayload;
use crate::utils::{AppError, AppResult, FieldErrors};

pub const TITLE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 5000;
pub const LOCATION_MAX_CHARS: usize = 255;

/// Years a client may schedule in. Keeps every zone's wall clock representable.
pub const YEAR_RANGE: RangeInclusive<i32> = 1..=9999;

/// Key used for violations that involve more than one field.
pub const EVENT_FIELD: &str = "event";

pub const START_AFTER_END_MESSAGE: &str = "End date time must be after start date time";

/// Checks every constraint and reports all violations at once.
///
/// Start and end are compared as the wall-clock values the client sent,
/// before any zone conversion.
pub fn validate(input: &EventPayload) -> AppResult<()> {
    let mut errors = FieldErrors::new();

    match input.title.as_deref() {
        None => reject(&mut errors, "title", "Title is required"),
        Some(title) if title.trim().is_empty() => {
            reject(&mut errors, "title", "Title is required")
        }
        Some(title) if title.chars().count() > TITLE_MAX_CHARS => reject(
            &mut errors,
            "title",
            "Title must be less than 255 characters",
        ),
        Some(_) => {}
    }

    if exceeds(input.description.as_deref(), DESCRIPTION_MAX_CHARS) {
        reject(
            &mut errors,
            "description",
            "Description must be less than 5000 characters",
        );
    }

    if exceeds(input.location.as_deref(), LOCATION_MAX_CHARS) {
        reject(
            &mut errors,
            "location",
            "Location must be less than 255 characters",
        );
    }

    match input.start_date_time {
        None => reject(&mut errors, "startDateTime", "Start date time is required"),
        Some(start) if !in_year_range(start) => reject(
            &mut errors,
            "startDateTime",
            "Start date time must be between years 1 and 9999",
        ),
        Some(_) => {}
    }
    match input.end_date_time {
        None => reject(&mut errors, "endDateTime", "End date time is required"),
        Some(end) if !in_year_range(end) => reject(
            &mut errors,
            "endDateTime",
            "End date time must be between years 1 and 9999",
        ),
        Some(_) => {}
    }

    if let (Some(start), Some(end)) = (input.start_date_time, input.end_date_time) {
        if end <= start {
            reject(&mut errors, EVENT_FIELD, START_AFTER_END_MESSAGE);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::ValidationError(errors))
    }
}

fn in_year_range(value: NaiveDateTime) -> bool {
    YEAR_RANGE.contains(&value.year())
}

fn exceeds(value: Option<&str>, max_chars: usize) -> bool {
    value.is_some_and(|v| v.chars().count() > max_chars)
}

fn reject(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_insert_with(|| message.to_string());
}
