//! Feed documents and the snapshots derived from them
//!
//! Feed rows are loosely typed: numbers may arrive as JSON numbers or as
//! strings, and the air quality flag as `1`, `"1"` or `true`. Derivation is
//! lenient; a value that cannot be read as a number counts as zero.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Largest chart window a caller may ask for
pub const MAX_WINDOW: usize = 500;

/// Feed document as returned by a readings source
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<RawRow>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One sample row, oldest first within a feed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "DateTime", default)]
    pub date_time: Value,
    #[serde(rename = "Temperature", default)]
    pub temperature: Value,
    #[serde(default)]
    pub humidity: Value,
    #[serde(default)]
    pub tvoc: Value,
    #[serde(default)]
    pub eco2: Value,
    #[serde(default)]
    pub airquality: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirQuality {
    Good,
    Poor,
}

/// Health band for a gas concentration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    Good,
    Moderate,
    Unhealthy,
}

impl Band {
    /// Band for a TVOC reading in ppb
    pub fn tvoc(ppb: i64) -> Self {
        if ppb > 300 {
            Band::Unhealthy
        } else if ppb > 200 {
            Band::Moderate
        } else {
            Band::Good
        }
    }

    /// Band for an eCO2 reading in ppm
    pub fn eco2(ppm: i64) -> Self {
        if ppm > 1000 {
            Band::Unhealthy
        } else if ppm > 800 {
            Band::Moderate
        } else {
            Band::Good
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Band::Good => "Good",
            Band::Moderate => "Moderate",
            Band::Unhealthy => "Unhealthy",
        }
    }
}

/// A normalized sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub timestamp: Option<DateTime<Utc>>,
    pub temperature: f64,
    pub humidity: f64,
    pub tvoc: i64,
    pub eco2: i64,
    pub air_quality: AirQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestStatus {
    pub air_quality: AirQuality,
    pub tvoc: Band,
    pub eco2: Band,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub timestamp: Option<DateTime<Utc>>,
    pub temperature: f64,
    pub humidity: f64,
}

/// What the dashboard shows for one device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingsSnapshot {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub sample_count: usize,
    pub latest: Option<Reading>,
    pub status: Option<LatestStatus>,
    pub chart: Vec<ChartPoint>,
}

/// Build a snapshot from the last `window` rows of a feed
pub fn derive_snapshot(
    source: &str,
    rows: &[RawRow],
    window: usize,
    fetched_at: DateTime<Utc>,
) -> ReadingsSnapshot {
    let window = window.clamp(1, MAX_WINDOW);
    let start = rows.len().saturating_sub(window);
    let recent: Vec<Reading> = rows[start..].iter().map(Reading::from_row).collect();

    let latest = recent.last().cloned();
    let status = latest.as_ref().map(|r| LatestStatus {
        air_quality: r.air_quality,
        tvoc: Band::tvoc(r.tvoc),
        eco2: Band::eco2(r.eco2),
    });

    let chart = recent
        .iter()
        .map(|r| ChartPoint {
            timestamp: r.timestamp,
            temperature: r.temperature,
            humidity: r.humidity,
        })
        .collect();

    ReadingsSnapshot {
        source: source.to_string(),
        fetched_at,
        sample_count: rows.len(),
        latest,
        status,
        chart,
    }
}

impl Reading {
    pub fn from_row(row: &RawRow) -> Self {
        Self {
            timestamp: parse_timestamp(&row.date_time),
            temperature: round_1dp(lenient_float(&row.temperature)),
            humidity: round_1dp(lenient_float(&row.humidity)),
            tvoc: lenient_int(&row.tvoc),
            eco2: lenient_int(&row.eco2),
            air_quality: if is_good_flag(&row.airquality) {
                AirQuality::Good
            } else {
                AirQuality::Poor
            },
        }
    }
}

fn float_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?")
            .expect("float prefix pattern is valid")
    })
}

fn int_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*[+-]?\d+").expect("int prefix pattern is valid"))
}

fn parse_float_prefix(s: &str) -> Option<f64> {
    let m = float_prefix().find(s)?;
    m.as_str().trim().parse().ok()
}

fn lenient_float(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_float_prefix(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn lenient_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => int_prefix()
            .find(s)
            .and_then(|m| m.as_str().trim().parse().ok())
            .unwrap_or(0),
        _ => 0,
    }
}

/// Loose equality with the number 1
fn is_good_flag(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().parse::<f64>().ok() == Some(1.0),
        _ => false,
    }
}

fn round_1dp(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y/%m/%d %H:%M:%S"] {
                if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
                    return Some(naive.and_utc());
                }
            }
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RawRow {
        serde_json::from_value(value).unwrap()
    }

    fn sample(i: i64) -> RawRow {
        row(json!({
            "DateTime": format!("2024-05-01T{:02}:00:00Z", i % 24),
            "Temperature": 20.0 + i as f64,
            "humidity": 50,
            "tvoc": 100,
            "eco2": 400,
            "airquality": 1,
        }))
    }

    #[test]
    fn test_window_takes_most_recent_rows() {
        let rows: Vec<RawRow> = (0..30).map(sample).collect();
        let snapshot = derive_snapshot("abc", &rows, 24, Utc::now());

        assert_eq!(snapshot.sample_count, 30);
        assert_eq!(snapshot.chart.len(), 24);
        assert_eq!(snapshot.chart[0].temperature, 26.0);
        assert_eq!(snapshot.latest.as_ref().unwrap().temperature, 49.0);
    }

    #[test]
    fn test_short_feed_and_window_clamp() {
        let rows: Vec<RawRow> = (0..3).map(sample).collect();

        assert_eq!(derive_snapshot("abc", &rows, 24, Utc::now()).chart.len(), 3);
        assert_eq!(derive_snapshot("abc", &rows, 0, Utc::now()).chart.len(), 1);
    }

    #[test]
    fn test_empty_feed() {
        let snapshot = derive_snapshot("abc", &[], 24, Utc::now());
        assert!(snapshot.latest.is_none());
        assert!(snapshot.status.is_none());
        assert!(snapshot.chart.is_empty());
    }

    #[test]
    fn test_lenient_numbers() {
        let reading = Reading::from_row(&row(json!({
            "DateTime": "not a date",
            "Temperature": "23.456 C",
            "humidity": "abc",
            "tvoc": "250.9ppb",
            "eco2": 812.7,
            "airquality": "1",
        })));

        assert_eq!(reading.timestamp, None);
        assert_eq!(reading.temperature, 23.5);
        assert_eq!(reading.humidity, 0.0);
        assert_eq!(reading.tvoc, 250);
        assert_eq!(reading.eco2, 812);
        assert_eq!(reading.air_quality, AirQuality::Good);
    }

    #[test]
    fn test_air_quality_flag() {
        for (flag, expected) in [
            (json!(1), AirQuality::Good),
            (json!(true), AirQuality::Good),
            (json!(" 1.0 "), AirQuality::Good),
            (json!(0), AirQuality::Poor),
            (json!("yes"), AirQuality::Poor),
            (Value::Null, AirQuality::Poor),
        ] {
            let reading = Reading::from_row(&row(json!({ "airquality": flag })));
            assert_eq!(reading.air_quality, expected, "flag {:?}", flag);
        }
    }

    #[test]
    fn test_bands() {
        assert_eq!(Band::tvoc(200), Band::Good);
        assert_eq!(Band::tvoc(201), Band::Moderate);
        assert_eq!(Band::tvoc(301), Band::Unhealthy);
        assert_eq!(Band::eco2(800), Band::Good);
        assert_eq!(Band::eco2(1000), Band::Moderate);
        assert_eq!(Band::eco2(1001), Band::Unhealthy);
        assert_eq!(Band::Moderate.label(), "Moderate");
    }

    #[test]
    fn test_status_follows_latest_row() {
        let rows = vec![
            sample(1),
            row(json!({ "tvoc": 350, "eco2": 900, "airquality": 0 })),
        ];
        let status = derive_snapshot("abc", &rows, 24, Utc::now()).status.unwrap();

        assert_eq!(status.air_quality, AirQuality::Poor);
        assert_eq!(status.tvoc, Band::Unhealthy);
        assert_eq!(status.eco2, Band::Moderate);
    }

    #[test]
    fn test_timestamp_formats() {
        let expected = "2024-05-01T08:30:00Z".parse::<DateTime<Utc>>().unwrap();

        assert_eq!(parse_timestamp(&json!("2024-05-01T08:30:00Z")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-05-01T10:30:00+02:00")), Some(expected));
        assert_eq!(parse_timestamp(&json!("2024-05-01 08:30:00")), Some(expected));
        assert_eq!(
            parse_timestamp(&json!(expected.timestamp_millis())),
            Some(expected)
        );
    }

    #[test]
    fn test_feed_defaults() {
        let feed: FeedResponse = serde_json::from_str("{}").unwrap();
        assert!(!feed.success);
        assert!(feed.data.is_empty());
        assert!(feed.error.is_none());
    }

    #[test]
    fn test_snapshot_wire_names() {
        let snapshot = derive_snapshot("abc", &[sample(2)], 24, Utc::now());
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["sampleCount"], 1);
        assert_eq!(json["latest"]["airQuality"], "Good");
        assert_eq!(json["status"]["tvoc"], "Good");
        assert!(json["fetchedAt"].is_string());
    }
}
