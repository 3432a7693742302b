//! Serde for zone-less ISO-8601 date-times as browsers send them
//! (`2024-06-01T09:00`, `2024-06-01T09:00:00`, `2024-06-01T09:00:00.250`).

use chrono::NaiveDateTime;

const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const INPUT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

pub fn parse(value: &str) -> Result<NaiveDateTime, String> {
    INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .ok_or_else(|| format!("invalid local date-time '{value}', expected YYYY-MM-DDTHH:MM[:SS]"))
}

pub fn format(value: &NaiveDateTime) -> String {
    value.format(OUTPUT_FORMAT).to_string()
}

pub mod option {
    use chrono::NaiveDateTime;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_str(&super::format(value)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| super::parse(&raw).map_err(D::Error::custom))
            .transpose()
    }
}
