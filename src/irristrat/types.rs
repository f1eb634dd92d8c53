use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use utoipa::openapi::schema::{
    AdditionalProperties, KnownFormat, ObjectBuilder, Schema, SchemaFormat, SchemaType,
};
use utoipa::openapi::RefOr;
use utoipa::ToSchema;

/// Sampling interval of an observation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Daily,
    Hourly,
    TenMinute,
}

impl Granularity {
    /// Whether records carry an hour component next to the date.
    pub fn is_sub_daily(self) -> bool {
        !matches!(self, Granularity::Daily)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::Hourly => write!(f, "hourly"),
            Granularity::TenMinute => write!(f, "10min"),
        }
    }
}

/// A single measurement as reported by the provider. Numbers stay JSON
/// numbers, so integers are never widened to floats.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Number(serde_json::Number),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<String>,
    #[serde(flatten)]
    pub measurements: BTreeMap<String, MeasurementValue>,
}

impl<'s> ToSchema<'s> for Observation {
    fn schema() -> (&'s str, RefOr<Schema>) {
        (
            "Observation",
            ObjectBuilder::new()
                .description(Some(
                    "Measurements for one station at one date (and hour for sub-daily data). \
                     Every other property is a named measurement, number or string; \
                     missing properties mean no data.",
                ))
                .property(
                    "date",
                    ObjectBuilder::new()
                        .schema_type(SchemaType::String)
                        .format(Some(SchemaFormat::KnownFormat(KnownFormat::Date))),
                )
                .required("date")
                .property(
                    "hour",
                    ObjectBuilder::new()
                        .schema_type(SchemaType::String)
                        .example(Some(serde_json::json!("08:00"))),
                )
                .additional_properties(Some(AdditionalProperties::FreeForm(true)))
                .into(),
        )
    }
}

/// Observations keyed by `YYYY-MM-DD` (daily) or `YYYY-MM-DD HH:MM`.
pub type ObservationSet = BTreeMap<String, Observation>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Station {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

// Provider payloads

/// Top-level body returned by irristrat: either an envelope or a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UpstreamPayload<T> {
    List(Vec<T>),
    Envelope(UpstreamEnvelope<T>),
}

/// Only `data` and `error` are recognised; any other key means the body is
/// not an irristrat envelope.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, bound(deserialize = "T: Deserialize<'de>"))]
pub struct UpstreamEnvelope<T> {
    /// `None` when the key is absent, `Some(None)` for an explicit `null`.
    #[serde(default, deserialize_with = "present")]
    pub data: Option<Option<UpstreamRecords<T>>>,
    pub error: Option<String>,
}

fn present<'de, D, V>(deserializer: D) -> Result<Option<V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    V::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum UpstreamRecords<T> {
    List(Vec<T>),
    Keyed(BTreeMap<String, T>),
}

impl<T> UpstreamRecords<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            UpstreamRecords::List(records) => records,
            UpstreamRecords::Keyed(records) => records.into_values().collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub hour: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "station id must be a string or number, got {}",
            other
        ))),
    }
}
