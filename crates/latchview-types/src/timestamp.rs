//! Lenient RFC 3339 timestamp (de)serialization.
//!
//! The monitor serializes timestamps with Python's `isoformat()`, which is
//! RFC 3339 compatible, but fields that have never been set arrive as the
//! empty string rather than `null`. This module accepts both spellings and
//! maps them to `None` instead of failing the whole message.

use serde::{Deserialize, Deserializer, Serializer};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => OffsetDateTime::parse(raw, &Rfc3339)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(ts) => {
            let formatted = ts.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
            serializer.serialize_str(&formatted)
        }
        None => serializer.serialize_none(),
    }
}
