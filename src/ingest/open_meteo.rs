/// Open-Meteo payload decoding
///
/// Turns the JSON bodies of the Open-Meteo hourly forecast and ensemble
/// endpoints into `HourlySeries` / `EnsembleSeries`. Transport is not done
/// here: callers hand in the body text however they obtained it.
///
/// Forecast request shape this decoder expects:
///   /v1/forecast?latitude=..&longitude=..&timezone=Asia/Jakarta
///     &hourly=temperature_2m,relative_humidity_2m,precipitation,
///             precipitation_probability,windspeed_10m,winddirection_10m,
///             windgusts_10m,uv_index
///
/// Ensemble request shape:
///   /v1/ensemble?latitude=..&longitude=..&hourly=precipitation&models=..
///
/// Numeric columns are lenient: numbers, numeric strings, `null` and short
/// arrays all decode, with anything unreadable becoming 0.0. Time entries are
/// strict; one bad timestamp invalidates the payload.

use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::analysis::finite_or_zero;
use crate::model::{EnsembleMember, EnsembleSeries, HourlySample, HourlySeries, IngestError};

/// Local time formats used by the `time` axis.
const TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Member column prefixes in ensemble payloads.
const MEMBER_PREFIXES: &[&str] = &["rain_member", "precipitation_member"];

// ============================================================================
// Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: Option<ForecastHourly>,
}

/// Hourly block. Both the legacy (`windspeed_10m`) and current
/// (`wind_speed_10m`) column names are accepted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ForecastHourly {
    time: Vec<Value>,
    temperature_2m: Vec<Value>,
    relative_humidity_2m: Vec<Value>,
    precipitation: Vec<Value>,
    precipitation_probability: Vec<Value>,
    #[serde(alias = "wind_speed_10m")]
    windspeed_10m: Vec<Value>,
    #[serde(alias = "wind_direction_10m")]
    winddirection_10m: Vec<Value>,
    #[serde(alias = "wind_gusts_10m")]
    windgusts_10m: Vec<Value>,
    uv_index: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct EnsembleResponse {
    hourly: Option<EnsembleHourly>,
}

#[derive(Debug, Deserialize)]
struct EnsembleHourly {
    #[serde(default)]
    time: Vec<Value>,
    #[serde(flatten)]
    columns: BTreeMap<String, Value>,
}

/// The ensemble endpoint answers with an object, or with an array when
/// several coordinates were requested. `Batch` is tried first: a struct can
/// also be read from a sequence, which would swallow the array form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EnsemblePayload {
    Batch(Vec<EnsembleResponse>),
    Single(EnsembleResponse),
}

// ============================================================================
// Value Coercion
// ============================================================================

/// Number, numeric string, or 0.0.
fn number(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    finite_or_zero(raw)
}

fn column(values: &[Value], index: usize) -> f64 {
    number(values.get(index))
}

fn parse_time(value: &Value) -> Result<NaiveDateTime, IngestError> {
    let raw = match value {
        Value::String(s) => s.trim(),
        other => return Err(IngestError::InvalidTime(other.to_string())),
    };
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| IngestError::InvalidTime(raw.to_string()))
}

fn parse_time_axis(values: &[Value]) -> Result<Vec<NaiveDateTime>, IngestError> {
    values.iter().map(parse_time).collect()
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes a deterministic hourly forecast body.
///
/// The series has one sample per `time` entry, in payload order.
pub fn parse_forecast(body: &str) -> Result<HourlySeries, IngestError> {
    let response: ForecastResponse = serde_json::from_str(body)?;
    let hourly = response.hourly.ok_or(IngestError::MissingHourly)?;
    let times = parse_time_axis(&hourly.time)?;

    let samples = times
        .into_iter()
        .enumerate()
        .map(|(i, time)| HourlySample {
            time,
            temperature_c: column(&hourly.temperature_2m, i),
            humidity_pct: column(&hourly.relative_humidity_2m, i),
            precip_probability_pct: column(&hourly.precipitation_probability, i),
            precip_mm: column(&hourly.precipitation, i),
            wind_speed_kmh: column(&hourly.windspeed_10m, i),
            wind_direction_deg: column(&hourly.winddirection_10m, i),
            wind_gust_kmh: column(&hourly.windgusts_10m, i),
            uv_index: column(&hourly.uv_index, i),
        })
        .collect();

    Ok(HourlySeries::new(samples))
}

/// Decodes an ensemble precipitation body.
///
/// Returns `Ok(None)` when the payload carries no member columns. Members are
/// ordered by column name.
pub fn parse_ensemble(body: &str) -> Result<Option<EnsembleSeries>, IngestError> {
    let payload: EnsemblePayload = serde_json::from_str(body)?;
    let response = match payload {
        EnsemblePayload::Single(r) => r,
        EnsemblePayload::Batch(list) => match list.into_iter().next() {
            Some(r) => r,
            None => return Ok(None),
        },
    };
    let hourly = response.hourly.ok_or(IngestError::MissingHourly)?;
    let times = parse_time_axis(&hourly.time)?;

    // BTreeMap iteration keeps the members sorted by name.
    let members: Vec<EnsembleMember> = hourly
        .columns
        .iter()
        .filter(|(name, _)| MEMBER_PREFIXES.iter().any(|p| name.starts_with(p)))
        .filter_map(|(name, value)| {
            let values = value.as_array()?;
            Some(EnsembleMember {
                name: name.clone(),
                precip_mm: values.iter().map(|v| number(Some(v))).collect(),
            })
        })
        .collect();

    if members.is_empty() {
        return Ok(None);
    }
    Ok(Some(EnsembleSeries { times, members }))
}

// ============================================================================
// Tests
// ============================================================================
