/// Threshold and run configuration.
///
/// Every tunable used by the classifiers, the scorer, the status rules and
/// the aggregators lives in [`Thresholds`]. It is built once (from defaults or
/// a TOML file) and passed by reference everywhere; nothing in the crate reads
/// a threshold from global state.
///
/// Any subset of values may be overridden in TOML:
///
/// ```toml
/// utc_offset_hours = 7
/// store_path = "/var/lib/radar_cuaca/prev_temp.db"
///
/// [thresholds.status]
/// wind_danger_kmh = 30.0
///
/// [[locations]]
/// name = "Bogor"
/// forecast_file = "payloads/bogor.json"
///
/// [[locations]]
/// name = "Rumah"
/// coordinates = "-6.30,106.80"
/// forecast_file = "payloads/rumah.json"
/// ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::model::ConfigError;

// ============================================================================
// Threshold groups
// ============================================================================

/// Rain intensity breakpoints in mm. A value below `gerimis_min` is NONE.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RainBreakpoints {
    pub gerimis_min: f64,
    pub ringan_min: f64,
    pub sedang_min: f64,
    pub deras_min: f64,
}

impl Default for RainBreakpoints {
    fn default() -> Self {
        Self {
            gerimis_min: 0.0001,
            ringan_min: 1.0,
            sedang_min: 2.5,
            deras_min: 7.6,
        }
    }
}

/// Sky condition rules.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SkyThresholds {
    /// Minimum current-hour rain to use it as the reference rain.
    pub real_rain_mm: f64,
    pub acc3_rain_mm: f64,
    pub acc6_rain_mm: f64,
    /// Probability at or above which a dry hour is HUJAN_POTENSIAL.
    pub potential_probability_pct: f64,
    /// Daytime window, inclusive on both ends.
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub clear_uv_min: f64,
    /// CERAH requires humidity strictly below this.
    pub clear_humidity_below: f64,
    pub cloudy_humidity_min: f64,
    pub cloudy_humidity_max: f64,
    /// BERAWAN (humid band) requires probability strictly below this.
    pub cloudy_probability_below: f64,
    /// MENDUNG when humidity is strictly above this...
    pub overcast_humidity_above: f64,
    /// ...or probability is in `[overcast_probability_min, potential_probability_pct)`.
    pub overcast_probability_min: f64,
}

impl Default for SkyThresholds {
    fn default() -> Self {
        Self {
            real_rain_mm: 0.3,
            acc3_rain_mm: 0.3,
            acc6_rain_mm: 0.6,
            potential_probability_pct: 60.0,
            day_start_hour: 6,
            day_end_hour: 16,
            clear_uv_min: 7.0,
            clear_humidity_below: 75.0,
            cloudy_humidity_min: 60.0,
            cloudy_humidity_max: 85.0,
            cloudy_probability_below: 30.0,
            overcast_humidity_above: 75.0,
            overcast_probability_min: 30.0,
        }
    }
}

/// Risk score conditions and the points each contributes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub humid_above_pct: f64,
    pub humid_points: u32,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub temp_points: u32,
    pub temp_drop_c: f64,
    pub temp_drop_points: u32,
    pub wind_min_kmh: f64,
    pub wind_max_kmh: f64,
    pub wind_points: u32,
    pub gust_above_kmh: f64,
    pub gust_points: u32,
    pub uv_start_hour: u32,
    pub uv_end_hour: u32,
    pub uv_min: f64,
    pub uv_points: u32,
    pub probability_high_pct: f64,
    pub probability_high_points: u32,
    pub probability_moderate_pct: f64,
    pub probability_moderate_points: u32,
    pub rained_now_mm: f64,
    pub rained_now_points: u32,
    pub drizzle_mm: f64,
    pub drizzle_points: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            humid_above_pct: 80.0,
            humid_points: 2,
            temp_min_c: 27.0,
            temp_max_c: 34.0,
            temp_points: 1,
            temp_drop_c: 2.0,
            temp_drop_points: 2,
            wind_min_kmh: 10.0,
            wind_max_kmh: 25.0,
            wind_points: 1,
            gust_above_kmh: 25.0,
            gust_points: 1,
            uv_start_hour: 8,
            uv_end_hour: 16,
            uv_min: 7.0,
            uv_points: 2,
            probability_high_pct: 70.0,
            probability_high_points: 2,
            probability_moderate_pct: 50.0,
            probability_moderate_points: 1,
            rained_now_mm: 1.0,
            rained_now_points: 3,
            drizzle_mm: 0.3,
            drizzle_points: 1,
        }
    }
}

/// Status cut-offs and hard override limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatusThresholds {
    pub rawan_score: u32,
    pub waspada_score: u32,
    pub rain_rawan_mm: f64,
    pub rain_waspada_mm: f64,
    pub acc3_waspada_mm: f64,
    pub acc6_waspada_mm: f64,
    pub wind_warn_kmh: f64,
    pub wind_danger_kmh: f64,
    pub gust_warn_kmh: f64,
    pub gust_danger_kmh: f64,
    pub thunder_probability_pct: f64,
    pub thunder_wind_kmh: f64,
    pub heat_temp_c: f64,
    pub heat_uv_min: f64,
    pub humid_rain_humidity_pct: f64,
    pub humid_rain_probability_pct: f64,
    /// Minimum rain for an hour to count as a real rain event.
    pub real_rain_mm: f64,
}

impl Default for StatusThresholds {
    fn default() -> Self {
        Self {
            rawan_score: 7,
            waspada_score: 4,
            rain_rawan_mm: 6.0,
            rain_waspada_mm: 2.0,
            acc3_waspada_mm: 15.0,
            acc6_waspada_mm: 30.0,
            wind_warn_kmh: 15.0,
            wind_danger_kmh: 25.0,
            gust_warn_kmh: 30.0,
            gust_danger_kmh: 45.0,
            thunder_probability_pct: 70.0,
            thunder_wind_kmh: 10.0,
            heat_temp_c: 33.0,
            heat_uv_min: 7.0,
            humid_rain_humidity_pct: 75.0,
            humid_rain_probability_pct: 30.0,
            real_rain_mm: 0.3,
        }
    }
}

/// Precipitation standard deviation levels, in mm.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeviationThresholds {
    pub window_hours: usize,
    pub warn_mm: f64,
    pub danger_mm: f64,
}

impl Default for DeviationThresholds {
    fn default() -> Self {
        Self {
            window_hours: 3,
            warn_mm: 0.7,
            danger_mm: 1.0,
        }
    }
}

/// Cross-location window derivation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AggregateThresholds {
    /// Fraction of processed locations that must be Aman for a best safe hour.
    pub safe_fraction: f64,
    /// A slot is risky when strictly more than this many locations are Rawan.
    pub risky_more_than: usize,
}

impl Default for AggregateThresholds {
    fn default() -> Self {
        Self {
            safe_fraction: 0.8,
            risky_more_than: 1,
        }
    }
}

/// Every classification tunable, grouped per component.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub rain: RainBreakpoints,
    pub sky: SkyThresholds,
    pub score: ScoreWeights,
    pub status: StatusThresholds,
    pub deviation: DeviationThresholds,
    pub aggregate: AggregateThresholds,
    /// Advisory keywords that force Rawan. Matched case-insensitively.
    pub advisory_keywords: Vec<String>,
    /// How many reasons are shown next to an hour.
    pub reasons_shown: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            rain: RainBreakpoints::default(),
            sky: SkyThresholds::default(),
            score: ScoreWeights::default(),
            status: StatusThresholds::default(),
            deviation: DeviationThresholds::default(),
            aggregate: AggregateThresholds::default(),
            advisory_keywords: [
                "hujan sangat",
                "hujan lebat",
                "kilat",
                "petir",
                "badai",
                "thunder",
                "lightning",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            reasons_shown: 2,
        }
    }
}

// ============================================================================
// Run configuration
// ============================================================================

/// A location entry in the run configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationConfig {
    pub name: String,
    /// Falls back to the built-in registry when absent.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// `"lat,lon"` in coordinate-list form, used when `latitude`/`longitude`
    /// are not both given. A label before `:` is ignored.
    pub coordinates: Option<String>,
    /// Deterministic hourly payload (JSON).
    pub forecast_file: String,
    /// Ensemble payload (JSON), optional.
    pub ensemble_file: Option<String>,
    /// Advisory text given inline...
    pub advisory: Option<String>,
    /// ...or read from a file.
    pub advisory_file: Option<String>,
}

/// Root configuration file structure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub thresholds: Thresholds,
    pub store_path: String,
    pub log_file: Option<String>,
    pub utc_offset_hours: i32,
    pub slot_count: usize,
    pub locations: Vec<LocationConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            store_path: "prev_temp.db".to_string(),
            log_file: None,
            utc_offset_hours: 7,
            slot_count: 24,
            locations: Vec::new(),
        }
    }
}

/// Parses configuration from TOML text. `origin` names the source in errors.
pub fn parse_config(content: &str, origin: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: origin.to_string(),
        source,
    })
}

/// Loads configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    parse_config(&content, &display)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_yields_defaults() {
        let config = parse_config("", "inline").expect("empty TOML is valid");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.thresholds.status.wind_danger_kmh, 25.0);
        assert_eq!(config.thresholds.aggregate.safe_fraction, 0.8);
        assert_eq!(config.thresholds.advisory_keywords.len(), 7);
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let toml = r#"
            utc_offset_hours = 8

            [thresholds.status]
            wind_danger_kmh = 30.0

            [thresholds.deviation]
            warn_mm = 0.5
        "#;
        let config = parse_config(toml, "inline").expect("valid TOML");
        assert_eq!(config.utc_offset_hours, 8);
        assert_eq!(config.thresholds.status.wind_danger_kmh, 30.0);
        assert_eq!(config.thresholds.status.wind_warn_kmh, 15.0, "untouched field keeps default");
        assert_eq!(config.thresholds.deviation.warn_mm, 0.5);
        assert_eq!(config.thresholds.deviation.danger_mm, 1.0);
        assert_eq!(config.thresholds.rain, RainBreakpoints::default());
    }

    #[test]
    fn test_locations_parse() {
        let toml = r#"
            [[locations]]
            name = "Bogor"
            forecast_file = "bogor.json"

            [[locations]]
            name = "Pantai"
            latitude = -6.1
            longitude = 106.9
            forecast_file = "pantai.json"
            ensemble_file = "pantai_ens.json"
            advisory = "Hujan lebat disertai petir"

            [[locations]]
            name = "Rumah"
            coordinates = "-6.30,106.80"
            forecast_file = "rumah.json"
        "#;
        let config = parse_config(toml, "inline").expect("valid TOML");
        assert_eq!(config.locations.len(), 3);
        assert_eq!(config.locations[2].coordinates.as_deref(), Some("-6.30,106.80"));
        assert_eq!(config.locations[0].latitude, None);
        assert_eq!(config.locations[1].latitude, Some(-6.1));
        assert_eq!(
            config.locations[1].advisory.as_deref(),
            Some("Hujan lebat disertai petir")
        );
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = parse_config("thresholds = [", "broken.toml");
        match result {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, "broken.toml"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_config("/nonexistent/radar_cuaca.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
