/// Core data types for the hourly weather risk classifier.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic beyond small accessors, no I/O, and no external
/// state. Only types.

use chrono::{NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use std::fmt;

/// Display format used for every human-readable hour label.
pub const HOUR_LABEL_FORMAT: &str = "%Y-%m-%d %H:00";

/// Formats a slot timestamp as `YYYY-MM-DD HH:00`.
pub fn hour_label(time: &NaiveDateTime) -> String {
    time.format(HOUR_LABEL_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// Location
// ---------------------------------------------------------------------------

/// A named point for which a forecast series is classified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    /// Display name. Used verbatim (case-sensitive) as the primary store key.
    pub name: String,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// Secondary store key: `"lat,lon"` to 4 decimal places.
    pub fn coordinate_key(&self) -> String {
        format!("{:.4},{:.4}", self.latitude, self.longitude)
    }
}

// ---------------------------------------------------------------------------
// Input series
// ---------------------------------------------------------------------------

/// One hour of deterministic forecast.
///
/// Every numeric field defaults to 0.0 when the upstream value was absent or
/// unparsable; decoding never fails on a single bad number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlySample {
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub precip_probability_pct: f64,
    pub precip_mm: f64,
    pub wind_speed_kmh: f64,
    pub wind_direction_deg: f64,
    pub wind_gust_kmh: f64,
    pub uv_index: f64,
}

impl HourlySample {
    /// A sample at `time` with every indicator at 0.0.
    pub fn empty(time: NaiveDateTime) -> Self {
        Self {
            time,
            temperature_c: 0.0,
            humidity_pct: 0.0,
            precip_probability_pct: 0.0,
            precip_mm: 0.0,
            wind_speed_kmh: 0.0,
            wind_direction_deg: 0.0,
            wind_gust_kmh: 0.0,
            uv_index: 0.0,
        }
    }

    pub fn hour_of_day(&self) -> u32 {
        self.time.hour()
    }
}

/// A location's deterministic hourly forecast, in upstream order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlySeries {
    pub samples: Vec<HourlySample>,
}

impl HourlySeries {
    pub fn new(samples: Vec<HourlySample>) -> Self {
        Self { samples }
    }

    /// Index of the sample whose timestamp equals `time`.
    pub fn index_of(&self, time: &NaiveDateTime) -> Option<usize> {
        self.samples.iter().position(|s| &s.time == time)
    }

    /// Precipitation column, aligned with `samples`.
    pub fn precipitation(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.precip_mm).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One ensemble trajectory: hourly precipitation amounts in mm.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleMember {
    pub name: String,
    pub precip_mm: Vec<f64>,
}

/// Ensemble precipitation for one location.
///
/// Members are aligned by index to `times`. When `times` is empty the members
/// are assumed to share the deterministic series' index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnsembleSeries {
    pub times: Vec<NaiveDateTime>,
    pub members: Vec<EnsembleMember>,
}

impl EnsembleSeries {
    /// Resolves the member index for a slot, given the slot's index in the
    /// deterministic series.
    pub fn index_for(&self, time: &NaiveDateTime, deterministic_index: usize) -> Option<usize> {
        if self.times.is_empty() {
            Some(deterministic_index)
        } else {
            self.times.iter().position(|t| t == time)
        }
    }
}

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// Rain intensity for a millimetre amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RainCategory {
    None,
    Gerimis,
    Ringan,
    Sedang,
    Deras,
}

impl RainCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RainCategory::None => "NONE",
            RainCategory::Gerimis => "GERIMIS",
            RainCategory::Ringan => "RINGAN",
            RainCategory::Sedang => "SEDANG",
            RainCategory::Deras => "DERAS",
        }
    }
}

impl fmt::Display for RainCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sky condition label for one hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkyCondition {
    Cerah,
    Berawan,
    Mendung,
    HujanGerimis,
    HujanRingan,
    HujanSedang,
    HujanDeras,
    HujanPotensial,
}

impl SkyCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkyCondition::Cerah => "CERAH",
            SkyCondition::Berawan => "BERAWAN",
            SkyCondition::Mendung => "MENDUNG",
            SkyCondition::HujanGerimis => "HUJAN_GERIMIS",
            SkyCondition::HujanRingan => "HUJAN_RINGAN",
            SkyCondition::HujanSedang => "HUJAN_SEDANG",
            SkyCondition::HujanDeras => "HUJAN_DERAS",
            SkyCondition::HujanPotensial => "HUJAN_POTENSIAL",
        }
    }

    /// Lower-case, space separated form, e.g. `hujan ringan`.
    pub fn display_name(&self) -> String {
        self.as_str().to_lowercase().replace('_', " ")
    }
}

impl fmt::Display for SkyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precipitation volatility level from a standard deviation in mm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeviationLevel {
    None,
    Warn,
    Danger,
}

/// Final hour status, in ascending order of severity.
///
/// The ordering is what the status rule chain relies on: a rule may only
/// move the status up, never down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskStatus {
    Aman,
    Waspada,
    Rawan,
}

impl RiskStatus {
    /// Returns the more severe of `self` and `other`.
    pub fn escalate(self, other: RiskStatus) -> RiskStatus {
        self.max(other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskStatus::Aman => "Aman",
            RiskStatus::Waspada => "Waspada",
            RiskStatus::Rawan => "Rawan",
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Reasons
// ---------------------------------------------------------------------------

/// One contribution to an hour's classification, kept in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    Sky(SkyCondition),
    Rain(RainCategory),
    Humid,
    TempOk,
    TempDrop,
    WindOk,
    Gust,
    UvHigh,
    ProbabilityHigh,
    ProbabilityModerate,
    RainedNow,
    Drizzle,
    AdvisoryWarning,
    RainRawan,
    RainWaspada,
    AccumulatedRain,
    WindSustainedDanger,
    WindWarn,
    GustDanger,
    GustWarn,
    ThunderHeuristic,
}

impl Reason {
    /// Short token shown next to an hour, e.g. `sky_hujan_ringan`.
    pub fn token(&self) -> String {
        match self {
            Reason::Sky(sky) => format!("sky_{}", sky.as_str().to_lowercase()),
            Reason::Rain(RainCategory::Deras) => "rain_keras".to_string(),
            Reason::Rain(cat) => format!("rain_{}", cat.as_str().to_lowercase()),
            other => other.fixed_token().to_string(),
        }
    }

    fn fixed_token(&self) -> &'static str {
        match self {
            Reason::Humid => "humid",
            Reason::TempOk => "temp_ok",
            Reason::TempDrop => "temp_drop",
            Reason::WindOk => "wind_ok",
            Reason::Gust => "gust",
            Reason::UvHigh => "uv_high",
            Reason::ProbabilityHigh => "prob>=70",
            Reason::ProbabilityModerate => "prob>=50",
            Reason::RainedNow => "rained_now",
            Reason::Drizzle => "drizzle",
            Reason::AdvisoryWarning => "advisory_warn",
            Reason::RainRawan => "rainmm_rawan",
            Reason::RainWaspada => "rainmm_wasp",
            Reason::AccumulatedRain => "acc_rain",
            Reason::WindSustainedDanger => "wind_sust_danger",
            Reason::WindWarn => "wind_warn",
            Reason::GustDanger => "gust_danger",
            Reason::GustWarn => "gust_warn",
            Reason::ThunderHeuristic => "prob70_wind10",
            Reason::Sky(_) | Reason::Rain(_) => "",
        }
    }
}

impl Serialize for Reason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.token())
    }
}

// ---------------------------------------------------------------------------
// Classified hour
// ---------------------------------------------------------------------------

/// Side conditions recorded for an hour independently of its status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HourFlags {
    /// Advisory text matched a severe-weather keyword.
    pub thunder_advisory: bool,
    /// High probability with moving air.
    pub thunder_heuristic: bool,
    pub heat_waspada: bool,
    pub rain_waspada: bool,
    pub gust_waspada: bool,
    pub wind_warn: bool,
    pub wind_danger: bool,
    pub gust_warn: bool,
    pub gust_danger: bool,
    /// Measurable rain in this hour (not windowed).
    pub real_rain: bool,
}

impl HourFlags {
    pub fn thunder(&self) -> bool {
        self.thunder_advisory || self.thunder_heuristic
    }
}

/// Deviation value and level from one source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Deviation {
    pub std_dev_mm: f64,
    pub level: DeviationLevel,
}

/// Full classification of one hourly slot at one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedHour {
    pub sample: HourlySample,
    pub acc3_mm: f64,
    pub acc6_mm: f64,
    pub rain_category: RainCategory,
    pub sky: SkyCondition,
    pub deterministic_deviation: Deviation,
    /// `None` when no ensemble was available for the location.
    pub ensemble_deviation: Option<Deviation>,
    pub score: u32,
    pub reasons: Vec<Reason>,
    /// The leading reason tokens kept for display (`reasons_shown` of them).
    pub shown_reasons: Vec<String>,
    pub status: RiskStatus,
    pub flags: HourFlags,
    /// Set when the hour is unremarkable enough to collapse in a table.
    pub quiet: bool,
}

impl ClassifiedHour {
    pub fn time(&self) -> NaiveDateTime {
        self.sample.time
    }

    /// The first `limit` reasons, as shown next to the hour.
    pub fn display_reasons(&self, limit: usize) -> Vec<String> {
        self.reasons.iter().take(limit).map(Reason::token).collect()
    }

    /// Deviation levels from every available source, deterministic first.
    pub fn deviation_levels(&self) -> impl Iterator<Item = DeviationLevel> + '_ {
        std::iter::once(self.deterministic_deviation.level)
            .chain(self.ensemble_deviation.iter().map(|d| d.level))
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised while loading configuration. The only fatal inputs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors raised while decoding an upstream forecast payload.
///
/// Any of these causes the location (or, for ensembles, only the ensemble
/// path) to be skipped. They never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No hourly block in payload")]
    MissingHourly,
    #[error("Invalid time entry '{0}'")]
    InvalidTime(String),
}

/// Errors from the previous-temperature file. Logged and dropped by callers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
