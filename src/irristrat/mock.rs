//! Canned irristrat payloads for tests.

use serde_json::{json, Value};

pub fn envelope(records: Vec<Value>) -> Value {
    json!({ "data": records })
}

pub fn hourly_record(date: &str, hour: &str, temp_avg: f64) -> Value {
    json!({
        "date": date,
        "hour": hour,
        "air_temp_avg": temp_avg,
        "air_temp_min": temp_avg - 0.8,
        "air_temp_max": temp_avg + 0.6,
        "relative_humidity_avg": 81,
        "wind_speed_avg": 2.4,
        "solar_radiation_avg": 112.5,
    })
}

pub fn daily_record(date: &str, avg: f64, min: f64, max: f64) -> Value {
    json!({
        "date": date,
        "air_temp_avg": avg,
        "air_temp_min": min,
        "air_temp_max": max,
    })
}

/// One day of hourly records following a simple diurnal temperature curve.
pub fn hourly_day(date: &str, hours: u32) -> Vec<Value> {
    (0..hours)
        .map(|hour| {
            let phase = (hour as f64 - 9.0) * std::f64::consts::PI / 12.0;
            let temp = ((14.0 + 6.0 * phase.sin()) * 10.0).round() / 10.0;
            hourly_record(date, &format!("{:02}:00:00", hour), temp)
        })
        .collect()
}

pub fn stations() -> Value {
    json!({
        "data": [
            { "id": "EST001", "name": "Beja", "latitude": 38.0151, "longitude": -7.8632 },
            { "id": 42, "name": "Évora", "latitude": 38.5714, "longitude": -7.9135 },
        ]
    })
}
