//! Conversion between client wall-clock time and stored instants.
//!
//! A local date-time is meaningless until paired with a zone. Zones are IANA
//! identifiers resolved through `chrono-tz`, so offsets follow the DST rules in
//! effect at the instant being converted.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;

use crate::utils::error::{AppError, AppResult};

/// Longest stretch searched backwards for the offset preceding a DST gap.
const GAP_SEARCH_STEPS: i64 = 48;
const GAP_SEARCH_STEP_MINUTES: i64 = 30;

/// A validated IANA zone identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneId(Tz);

impl ZoneId {
    pub const UTC: ZoneId = ZoneId(Tz::UTC);

    pub fn parse(id: &str) -> AppResult<Self> {
        id.trim()
            .parse::<Tz>()
            .map(ZoneId)
            .map_err(|_| AppError::InvalidTimezone(id.to_string()))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl FromStr for ZoneId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZoneId::parse(s)
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Interprets `local` as wall-clock time in `zone`.
///
/// Times repeated by a backwards transition resolve to the earlier instant.
/// Times skipped by a forward transition are read with the offset that was in
/// effect before the gap, which moves them forward by the gap's length.
pub fn to_instant(local: NaiveDateTime, zone: &ZoneId) -> AppResult<DateTime<Utc>> {
    let tz = zone.0;
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier.with_timezone(&Utc)),
        LocalResult::None => {
            let before_gap = (1..=GAP_SEARCH_STEPS).find_map(|step| {
                local
                    .checked_sub_signed(TimeDelta::minutes(step * GAP_SEARCH_STEP_MINUTES))
                    .and_then(|earlier| tz.from_local_datetime(&earlier).latest())
            });
            let offset = before_gap
                .map(|dt| dt.offset().fix().local_minus_utc())
                .ok_or_else(|| out_of_range(local, zone))?;
            local
                .checked_sub_signed(TimeDelta::seconds(i64::from(offset)))
                .map(|utc| Utc.from_utc_datetime(&utc))
                .ok_or_else(|| out_of_range(local, zone))
        }
    }
}

/// Projects `instant` onto the wall clock of `zone`.
///
/// Fails only when the shifted wall-clock value leaves the representable range.
pub fn to_local(instant: DateTime<Utc>, zone: &ZoneId) -> AppResult<NaiveDateTime> {
    let utc = instant.naive_utc();
    let offset = zone.0.offset_from_utc_datetime(&utc).fix();
    utc.checked_add_offset(offset).ok_or_else(|| {
        AppError::InternalServerError(format!("{instant} cannot be shown in {zone}"))
    })
}

fn out_of_range(local: NaiveDateTime, zone: &ZoneId) -> AppError {
    AppError::BadRequest(format!("{local} is out of range in {zone}"))
}
