// Wave forecast domain model
use super::error::GraphError;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// Locations of the timeseries array, tried in order
pub const TIMESERIES_POINTERS: &[&str] = &["/properties/timeseries", "/timeseries"];

/// Current field name first, legacy name second
pub const HEIGHT_FIELDS: &[&str] = &["sea_surface_wave_height", "wave_height"];
pub const PERIOD_FIELDS: &[&str] = &["sea_surface_wave_period", "wave_period"];
pub const DIRECTION_FIELDS: &[&str] = &["sea_surface_wave_from_direction", "wave_direction"];

#[derive(Debug, Clone, PartialEq)]
pub struct WaveSample {
    pub time: Option<DateTime<Utc>>,
    pub height: f64,
    pub period: Option<f64>,
    pub direction: Option<f64>,
}

impl WaveSample {
    /// Read one timeseries entry. Values may sit directly on the entry or
    /// under `data.instant.details`.
    pub fn from_entry(entry: &Value) -> Result<Self, GraphError> {
        let details = entry.pointer("/data/instant/details").unwrap_or(entry);

        let height = first_number(details, HEIGHT_FIELDS).ok_or(GraphError::MissingWaveHeight)?;
        let time = entry
            .get("time")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));

        Ok(Self {
            time,
            height,
            period: first_number(details, PERIOD_FIELDS),
            direction: first_number(details, DIRECTION_FIELDS),
        })
    }
}

/// Whether a JSON payload has the shape of a wave forecast document
pub fn is_wave_forecast(payload: &Value) -> bool {
    payload
        .as_object()
        .map(|obj| obj.contains_key("properties") || obj.contains_key("timeseries"))
        .unwrap_or(false)
}

/// Parse every timeseries entry. A single entry without a height fails the
/// whole payload.
pub fn parse_samples(payload: &Value) -> Result<Vec<WaveSample>, GraphError> {
    let entries = TIMESERIES_POINTERS
        .iter()
        .find_map(|pointer| payload.pointer(pointer).and_then(Value::as_array))
        .filter(|entries| !entries.is_empty())
        .ok_or(GraphError::MissingTimeseries)?;

    entries.iter().map(WaveSample::from_entry).collect()
}

fn first_number(details: &Value, candidates: &[&str]) -> Option<f64> {
    candidates
        .iter()
        .find_map(|name| details.get(*name).and_then(Value::as_f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_current_field_names_under_details() {
        let payload = json!({
            "properties": {
                "timeseries": [{
                    "time": "2026-10-19T06:00:00Z",
                    "data": { "instant": { "details": {
                        "sea_surface_wave_height": 1.4,
                        "sea_surface_wave_period": 7.0,
                        "sea_surface_wave_from_direction": 245.0
                    }}}
                }]
            }
        });

        let samples = parse_samples(&payload).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].height, 1.4);
        assert_eq!(samples[0].period, Some(7.0));
        assert_eq!(samples[0].direction, Some(245.0));
        assert_eq!(
            samples[0].time.map(|t| t.to_rfc3339()),
            Some("2026-10-19T06:00:00+00:00".to_string())
        );
    }

    #[test]
    fn test_legacy_field_names_on_entry() {
        let payload = json!({ "timeseries": [{ "wave_height": 0.8, "wave_direction": 90 }] });

        let samples = parse_samples(&payload).unwrap();
        assert_eq!(samples[0].height, 0.8);
        assert_eq!(samples[0].period, None);
        assert_eq!(samples[0].direction, Some(90.0));
    }

    #[test]
    fn test_null_primary_falls_back_to_legacy() {
        let entry = json!({ "sea_surface_wave_height": null, "wave_height": 2.5 });
        assert_eq!(WaveSample::from_entry(&entry).unwrap().height, 2.5);
    }

    #[test]
    fn test_missing_height_fails_whole_payload() {
        let payload = json!({ "timeseries": [{ "wave_height": 1.0 }, { "wave_period": 5.0 }] });
        assert_eq!(parse_samples(&payload), Err(GraphError::MissingWaveHeight));
    }

    #[test]
    fn test_missing_or_empty_timeseries() {
        assert_eq!(
            parse_samples(&json!({ "properties": {} })),
            Err(GraphError::MissingTimeseries)
        );
        assert_eq!(
            parse_samples(&json!({ "properties": { "timeseries": [] } })),
            Err(GraphError::MissingTimeseries)
        );
    }

    #[test]
    fn test_wave_forecast_shape_detection() {
        assert!(is_wave_forecast(&json!({ "properties": {} })));
        assert!(is_wave_forecast(&json!({ "timeseries": [] })));
        assert!(!is_wave_forecast(&json!({ "svg": "<svg/>" })));
        assert!(!is_wave_forecast(&json!([1, 2, 3])));
    }
}
