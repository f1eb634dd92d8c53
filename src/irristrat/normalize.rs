use super::client::UpstreamError;
use super::types::*;
use chrono::{NaiveDate, NaiveTime};
use std::collections::BTreeMap;

/// Turns a provider payload into an observation set keyed by date (daily)
/// or by `date hour` (hourly and 10-minute).
pub fn into_observation_set(
    payload: UpstreamPayload<UpstreamRecord>,
    granularity: Granularity,
) -> Result<ObservationSet, UpstreamError> {
    let records = into_records(payload)?;

    let mut set = ObservationSet::new();
    for record in records {
        let observation = normalize_record(record, granularity)?;
        let key = observation_key(&observation);
        if set.insert(key.clone(), observation).is_some() {
            tracing::debug!("Duplicate {} record for {}, keeping the last one", granularity, key);
        }
    }

    Ok(set)
}

/// Flattens a station listing payload.
pub fn into_stations(payload: UpstreamPayload<Station>) -> Result<Vec<Station>, UpstreamError> {
    into_records(payload)
}

/// A non-blank `error` always wins. A blank one is ignored when `data` is
/// present, including `"data": null`. An envelope with neither key is
/// rejected rather than read as an empty result.
fn into_records<T>(payload: UpstreamPayload<T>) -> Result<Vec<T>, UpstreamError> {
    let envelope = match payload {
        UpstreamPayload::List(records) => return Ok(records),
        UpstreamPayload::Envelope(envelope) => envelope,
    };

    match (envelope.data, envelope.error) {
        (_, Some(message)) if !message.trim().is_empty() => Err(UpstreamError::Provider(message)),
        (Some(data), _) => Ok(data.map(UpstreamRecords::into_vec).unwrap_or_default()),
        (None, Some(message)) => Err(UpstreamError::Provider(message)),
        (None, None) => Err(UpstreamError::Malformed(
            "payload has neither data nor error".to_string(),
        )),
    }
}

pub fn observation_key(observation: &Observation) -> String {
    match &observation.hour {
        Some(hour) => format!("{} {}", observation.date, hour),
        None => observation.date.clone(),
    }
}

fn normalize_record(
    record: UpstreamRecord,
    granularity: Granularity,
) -> Result<Observation, UpstreamError> {
    let date = record
        .date
        .ok_or_else(|| UpstreamError::Malformed("record without date".to_string()))?;
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| UpstreamError::Malformed(format!("invalid date '{}'", date)))?;

    let hour = if granularity.is_sub_daily() {
        let raw = record.hour.ok_or_else(|| {
            UpstreamError::Malformed(format!("{} record for {} without hour", granularity, date))
        })?;
        Some(parse_hour(&raw)?.format("%H:%M").to_string())
    } else {
        None
    };

    let mut measurements = BTreeMap::new();
    for (name, value) in record.fields {
        match value {
            serde_json::Value::Null => {}
            serde_json::Value::Number(n) => {
                measurements.insert(name, MeasurementValue::Number(n));
            }
            serde_json::Value::String(s) => {
                measurements.insert(name, MeasurementValue::Text(s));
            }
            _ => {
                return Err(UpstreamError::Malformed(format!(
                    "field '{}' is neither a number nor a string",
                    name
                )))
            }
        }
    }

    Ok(Observation {
        date: date.format("%Y-%m-%d").to_string(),
        hour,
        measurements,
    })
}

fn parse_hour(raw: &str) -> Result<NaiveTime, UpstreamError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| UpstreamError::Malformed(format!("invalid hour '{}'", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::irristrat::mock;

    fn parse(value: serde_json::Value) -> UpstreamPayload<UpstreamRecord> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_hourly_records_keyed_by_date_and_hour() {
        let payload = parse(mock::envelope(vec![
            mock::hourly_record("2024-01-01", "08:00:00", 11.2),
            mock::hourly_record("2024-01-01", "09:00:00", 12.9),
        ]));

        let set = into_observation_set(payload, Granularity::Hourly).unwrap();

        let keys: Vec<&str> = set.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2024-01-01 08:00", "2024-01-01 09:00"]);
        let first = &set["2024-01-01 08:00"];
        assert_eq!(first.hour.as_deref(), Some("08:00"));
        assert_eq!(
            first.measurements.get("air_temp_avg"),
            Some(&MeasurementValue::Number(serde_json::Number::from_f64(11.2).unwrap()))
        );
        assert!(first.measurements.contains_key("solar_radiation_avg"));
    }

    #[test]
    fn test_keyed_payload_and_bare_list_are_accepted() {
        let keyed = parse(serde_json::json!({
            "data": {
                "a": { "date": "2024-01-01", "hour": "08:00", "air_temp_avg": "10.5" }
            }
        }));
        let set = into_observation_set(keyed, Granularity::Hourly).unwrap();
        assert_eq!(
            set["2024-01-01 08:00"].measurements["air_temp_avg"],
            MeasurementValue::Text("10.5".to_string())
        );

        let list = parse(serde_json::json!([
            { "date": "2024-01-01", "hour": "08:10", "air_temp_avg": 10 }
        ]));
        let set = into_observation_set(list, Granularity::TenMinute).unwrap();
        assert!(set.contains_key("2024-01-01 08:10"));
    }

    #[test]
    fn test_empty_data_is_empty_set() {
        for value in [
            serde_json::json!({ "data": [] }),
            serde_json::json!({ "data": {} }),
            serde_json::json!({ "data": null }),
            serde_json::json!([]),
        ] {
            let set = into_observation_set(parse(value), Granularity::Hourly).unwrap();
            assert!(set.is_empty());
        }
    }

    #[test]
    fn test_object_without_data_or_error_is_malformed() {
        match into_observation_set(parse(serde_json::json!({})), Granularity::Hourly) {
            Err(UpstreamError::Malformed(message)) => {
                assert_eq!(message, "payload has neither data nor error")
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_envelope_keys_are_rejected() {
        for value in [
            serde_json::json!({ "message": "Unauthorized" }),
            serde_json::json!({
                "2024-01-01 08:00": { "date": "2024-01-01", "hour": "08:00", "air_temp_avg": 11.2 },
                "2024-01-01 09:00": { "date": "2024-01-01", "hour": "09:00", "air_temp_avg": 12.9 }
            }),
            serde_json::json!({ "data": [], "status": "ok" }),
        ] {
            let result = serde_json::from_value::<UpstreamPayload<UpstreamRecord>>(value.clone());
            assert!(result.is_err(), "accepted {}", value);
        }
    }

    #[test]
    fn test_blank_error_with_data_is_success() {
        let payload = parse(serde_json::json!({
            "data": [mock::hourly_record("2024-01-01", "08:00", 11.2)],
            "error": ""
        }));
        let set = into_observation_set(payload, Granularity::Hourly).unwrap();
        assert_eq!(set.len(), 1);

        let payload = parse(serde_json::json!({ "data": [], "error": "Estação desconhecida" }));
        assert!(matches!(
            into_observation_set(payload, Granularity::Hourly),
            Err(UpstreamError::Provider(_))
        ));
    }

    #[test]
    fn test_null_fields_are_dropped() {
        let payload = parse(serde_json::json!({
            "data": [{ "date": "2024-01-01", "hour": "08:00", "air_temp_avg": null, "wind_speed_avg": 2 }]
        }));
        let set = into_observation_set(payload, Granularity::Hourly).unwrap();
        let observation = &set["2024-01-01 08:00"];
        assert!(!observation.measurements.contains_key("air_temp_avg"));
        assert_eq!(
            serde_json::to_value(observation).unwrap(),
            serde_json::json!({ "date": "2024-01-01", "hour": "08:00", "wind_speed_avg": 2 })
        );
    }

    #[test]
    fn test_daily_records_keyed_by_date() {
        let payload = parse(mock::envelope(vec![
            mock::daily_record("2024-01-02", 14.0, 9.5, 18.25),
            mock::daily_record("2024-01-01", 13.0, 8.0, 17.0),
        ]));
        let set = into_observation_set(payload, Granularity::Daily).unwrap();
        let keys: Vec<&str> = set.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2024-01-01", "2024-01-02"]);
        assert!(set["2024-01-01"].hour.is_none());
    }

    #[test]
    fn test_malformed_records() {
        let cases = [
            serde_json::json!({ "data": [{ "hour": "08:00" }] }),
            serde_json::json!({ "data": [{ "date": "01/01/2024", "hour": "08:00" }] }),
            serde_json::json!({ "data": [{ "date": "2024-01-01" }] }),
            serde_json::json!({ "data": [{ "date": "2024-01-01", "hour": "25:00" }] }),
            serde_json::json!({ "data": [{ "date": "2024-01-01", "hour": "08:00", "air_temp_avg": [1, 2] }] }),
        ];
        for value in cases {
            let result = into_observation_set(parse(value.clone()), Granularity::Hourly);
            assert!(
                matches!(result, Err(UpstreamError::Malformed(_))),
                "expected malformed for {}",
                value
            );
        }
    }

    #[test]
    fn test_provider_error_is_reported() {
        let payload = parse(serde_json::json!({ "error": "Estação desconhecida" }));
        match into_observation_set(payload, Granularity::Hourly) {
            Err(UpstreamError::Provider(message)) => assert_eq!(message, "Estação desconhecida"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_stations_listing() {
        let payload: UpstreamPayload<Station> = serde_json::from_value(serde_json::json!({
            "data": [
                { "id": 17, "name": "Beja", "latitude": 38.01, "longitude": -7.86 },
                { "id": "EST001" }
            ]
        }))
        .unwrap();
        let stations = into_stations(payload).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].id, "17");
        assert_eq!(stations[1].name, None);

        let empty: UpstreamPayload<Station> =
            serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(into_stations(empty), Err(UpstreamError::Malformed(_))));
    }
}
