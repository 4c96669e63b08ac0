/// One classification run over many locations.
///
/// Locations are processed one at a time in caller order, hours within a
/// location in slot order. A location without a forecast is skipped whole;
/// a location without an ensemble just loses the ensemble deviation path.
/// The previous-temperature store is read and written as hours go by, so
/// each hour's prior temperature is the hour before it (or the last run's
/// value for the first slot).

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs;

use crate::aggregate::{
    CrossLocationAggregator, GlobalAggregate, GlobalWindows, LocationAggregator, LocationSummary, RealRainRisk,
    WindowRanges,
};
use crate::alert::{HourContext, classify_hour};
use crate::analysis::deviation::{deterministic_deviation, ensemble_deviation};
use crate::analysis::window::{acc3, acc6};
use crate::config::{LocationConfig, Thresholds};
use crate::ingest::open_meteo::{parse_ensemble, parse_forecast};
use crate::locations::resolve_location;
use crate::logging::{self, Component};
use crate::model::{EnsembleSeries, HourlySeries, Location, RiskStatus};
use crate::store::PreviousTemperatureStore;

/// Everything known about one location before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationInput {
    pub location: Location,
    /// `None` when the forecast could not be obtained; the location is skipped.
    pub forecast: Option<HourlySeries>,
    pub ensemble: Option<EnsembleSeries>,
    pub advisory: Option<String>,
}

impl LocationInput {
    pub fn new(location: Location, forecast: Option<HourlySeries>) -> Self {
        Self {
            location,
            forecast,
            ensemble: None,
            advisory: None,
        }
    }
}

/// Whole-run verdict for one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationVerdict {
    pub name: String,
    pub overall_status: RiskStatus,
    pub real_rain_risk: RealRainRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub generated_for: Vec<NaiveDateTime>,
    pub locations: Vec<LocationSummary>,
    pub verdicts: Vec<LocationVerdict>,
    pub global: GlobalAggregate,
    pub windows: GlobalWindows,
    pub ranges: WindowRanges,
    /// Names of locations that produced no classified hour.
    pub skipped: Vec<String>,
}

/// Classifies every input over `slots` and aggregates the result.
pub fn run(
    inputs: &[LocationInput],
    slots: &[NaiveDateTime],
    thresholds: &Thresholds,
    store: &mut PreviousTemperatureStore,
) -> RunReport {
    let mut summaries = Vec::new();
    let mut skipped = Vec::new();

    for input in inputs {
        let name = input.location.name.as_str();
        let Some(forecast) = input.forecast.as_ref() else {
            logging::warn(Component::Forecast, Some(name), "No forecast available, location skipped");
            skipped.push(name.to_string());
            continue;
        };

        let summary = classify_location(input, forecast, slots, thresholds, store);
        if summary.hours.is_empty() {
            logging::warn(
                Component::Forecast,
                Some(name),
                "Forecast covers none of the run's slots, location skipped",
            );
            skipped.push(name.to_string());
            continue;
        }

        logging::info(
            Component::Run,
            Some(name),
            &format!(
                "Classified {} hours: {} aman, {} waspada, {} rawan",
                summary.hours.len(),
                summary.counts.aman,
                summary.counts.waspada,
                summary.counts.rawan
            ),
        );
        summaries.push(summary);
    }

    let mut cross = CrossLocationAggregator::new(slots);
    for summary in &summaries {
        cross.fold(summary);
    }
    let global = cross.finish();
    let windows = global.windows(&thresholds.aggregate);
    let ranges = windows.ranges();

    if let Some(now) = slots.first().and_then(|t| global.slot(t)) {
        logging::info(
            Component::Run,
            None,
            &format!(
                "Current hour across {} locations: {} aman, {} waspada, {} rawan",
                now.locations, now.aman, now.waspada, now.rawan
            ),
        );
    }
    logging::info(
        Component::Run,
        None,
        &format!("Best safe hours: {} | risky hours: {}", ranges.best_safe, ranges.any_risky),
    );
    logging::log_run_summary(inputs.len(), summaries.len(), skipped.len());

    let verdicts = summaries
        .iter()
        .map(|s| LocationVerdict {
            name: s.location.name.clone(),
            overall_status: s.overall_status(),
            real_rain_risk: s.real_rain_risk(),
        })
        .collect();

    RunReport {
        generated_for: slots.to_vec(),
        locations: summaries,
        verdicts,
        global,
        windows,
        ranges,
        skipped,
    }
}

/// Classifies one location's slots, updating the store after every hour.
fn classify_location(
    input: &LocationInput,
    forecast: &HourlySeries,
    slots: &[NaiveDateTime],
    thresholds: &Thresholds,
    store: &mut PreviousTemperatureStore,
) -> LocationSummary {
    let location = &input.location;
    let precipitation = forecast.precipitation();
    let advisory = input.advisory.as_deref().unwrap_or("");
    let ensemble = input.ensemble.as_ref().filter(|e| e.members.len() >= 2);
    if input.ensemble.is_some() && ensemble.is_none() {
        logging::debug(
            Component::Ensemble,
            Some(&location.name),
            "Fewer than two members, ensemble deviation disabled",
        );
    }

    let mut aggregator = LocationAggregator::new(location.clone());

    for slot in slots {
        let Some(index) = forecast.index_of(slot) else {
            logging::debug(
                Component::Forecast,
                Some(&location.name),
                &format!("No sample for slot {}", slot),
            );
            continue;
        };

        let ensemble_dev = ensemble.and_then(|e| {
            e.index_for(slot, index)
                .and_then(|i| ensemble_deviation(&e.members, i, &thresholds.deviation))
        });

        let ctx = HourContext {
            sample: forecast.samples[index],
            acc3_mm: acc3(&precipitation, index),
            acc6_mm: acc6(&precipitation, index),
            deterministic_deviation: deterministic_deviation(&precipitation, index, &thresholds.deviation),
            ensemble_deviation: ensemble_dev,
            prior_temperature_c: store.lookup_temperature(location),
            advisory,
        };

        let hour = classify_hour(&ctx, thresholds);
        store.record(location, hour.sample.temperature_c);
        aggregator.record(hour);
    }

    aggregator.finish()
}

// ---------------------------------------------------------------------------
// Input loading
// ---------------------------------------------------------------------------

/// Reads each configured location's payload files.
///
/// Nothing here is fatal. An unreadable or undecodable forecast leaves
/// `forecast` empty so the run skips the location; ensemble and advisory
/// problems only drop that input. Locations whose coordinates cannot be
/// resolved are logged and left out.
pub fn load_inputs(configs: &[LocationConfig]) -> Vec<LocationInput> {
    configs.iter().filter_map(load_input).collect()
}

fn load_input(config: &LocationConfig) -> Option<LocationInput> {
    let Some(location) = resolve_location(config) else {
        logging::error(
            Component::Config,
            Some(&config.name),
            "No coordinates configured and no built-in location with this name",
        );
        return None;
    };
    let name = location.name.clone();

    let forecast = read_payload(Component::Forecast, &name, &config.forecast_file)
        .and_then(|body| match parse_forecast(&body) {
            Ok(series) => Some(series),
            Err(e) => {
                logging::log_input_failure(Component::Forecast, Some(&name), "Forecast decode", &e);
                None
            }
        });

    let ensemble = config
        .ensemble_file
        .as_deref()
        .and_then(|path| read_payload(Component::Ensemble, &name, path))
        .and_then(|body| match parse_ensemble(&body) {
            Ok(ensemble) => ensemble,
            Err(e) => {
                logging::log_input_failure(Component::Ensemble, Some(&name), "Ensemble decode", &e);
                None
            }
        });

    let advisory = match (&config.advisory, &config.advisory_file) {
        (Some(text), _) => Some(text.clone()),
        (None, Some(path)) => read_payload(Component::Advisory, &name, path),
        (None, None) => None,
    };

    Some(LocationInput {
        location,
        forecast,
        ensemble,
        advisory,
    })
}

fn read_payload(component: Component, location: &str, path: &str) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(body) => Some(body),
        Err(e) => {
            logging::log_input_failure(component, Some(location), &format!("Read {}", path), &e);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DeviationLevel, EnsembleMember, HourlySample, Reason};
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn series(temps: &[f64], rain: &[f64]) -> HourlySeries {
        HourlySeries::new(
            temps
                .iter()
                .zip(rain)
                .enumerate()
                .map(|(i, (t, r))| HourlySample {
                    temperature_c: *t,
                    precip_mm: *r,
                    humidity_pct: 60.0,
                    ..HourlySample::empty(at(10 + i as u32))
                })
                .collect(),
        )
    }

    fn bogor() -> Location {
        Location::new("Bogor", -6.5971, 106.8060)
    }

    #[test]
    fn test_missing_forecast_skips_location() {
        let inputs = vec![
            LocationInput::new(bogor(), None),
            LocationInput::new(Location::new("Depok", -6.4025, 106.7941), Some(series(&[25.0], &[0.0]))),
        ];
        let mut store = PreviousTemperatureStore::new();
        let report = run(&inputs, &[at(10)], &Thresholds::default(), &mut store);

        assert_eq!(report.skipped, vec!["Bogor".to_string()]);
        assert_eq!(report.locations.len(), 1);
        assert_eq!(report.global.processed_locations, 1);
        assert!(store.lookup_temperature(&bogor()).is_none(), "skipped location leaves the store alone");
    }

    #[test]
    fn test_slots_outside_series_are_skipped() {
        let inputs = vec![LocationInput::new(bogor(), Some(series(&[25.0, 26.0], &[0.0, 0.0])))];
        let mut store = PreviousTemperatureStore::new();
        let report = run(&inputs, &[at(9), at(10), at(11)], &Thresholds::default(), &mut store);

        let summary = &report.locations[0];
        assert_eq!(summary.hours.len(), 2);
        assert_eq!(report.global.slot(&at(9)).map(|s| s.locations), Some(0));
    }

    #[test]
    fn test_prior_temperature_is_previous_hour() {
        // 30 -> 27.5 is a 2.5 degree drop between consecutive hours.
        let inputs = vec![LocationInput::new(bogor(), Some(series(&[30.0, 27.5], &[0.0, 0.0])))];
        let mut store = PreviousTemperatureStore::new();
        let report = run(&inputs, &[at(10), at(11)], &Thresholds::default(), &mut store);

        let hours = &report.locations[0].hours;
        assert!(!hours[0].reasons.contains(&Reason::TempDrop), "no prior for the first hour");
        assert!(hours[1].reasons.contains(&Reason::TempDrop));
        assert_eq!(store.get("Bogor"), Some("27.5"));
        assert_eq!(store.get("-6.5971,106.8060"), Some("27.5"));
    }

    #[test]
    fn test_prior_temperature_from_previous_run() {
        let inputs = vec![LocationInput::new(bogor(), Some(series(&[26.0], &[0.0])))];
        let mut store = PreviousTemperatureStore::parse("-6.5971,106.8060|29\n");
        let report = run(&inputs, &[at(10)], &Thresholds::default(), &mut store);
        assert!(report.locations[0].hours[0].reasons.contains(&Reason::TempDrop));
    }

    #[test]
    fn test_ensemble_deviation_aligned_by_time() {
        let forecast = series(&[25.0, 25.0], &[0.0, 0.0]);
        // Ensemble axis starts one hour earlier than the forecast.
        let ensemble = EnsembleSeries {
            times: vec![at(9), at(10), at(11)],
            members: vec![
                EnsembleMember { name: "rain_member01".into(), precip_mm: vec![9.0, 0.0, 0.0] },
                EnsembleMember { name: "rain_member02".into(), precip_mm: vec![9.0, 3.0, 0.0] },
            ],
        };
        let input = LocationInput { ensemble: Some(ensemble), ..LocationInput::new(bogor(), Some(forecast)) };
        let mut store = PreviousTemperatureStore::new();
        let report = run(&[input], &[at(10), at(11)], &Thresholds::default(), &mut store);

        let hours = &report.locations[0].hours;
        let first = hours[0].ensemble_deviation.expect("ensemble present");
        assert!((first.std_dev_mm - 1.5).abs() < 1e-9, "sums 0 and 3 over [10,11,12]");
        assert_eq!(first.level, DeviationLevel::Danger);
        assert_eq!(hours[1].ensemble_deviation.map(|d| d.level), Some(DeviationLevel::None));
        assert_eq!(hours[0].deterministic_deviation.level, DeviationLevel::None);
    }

    #[test]
    fn test_single_member_ensemble_is_ignored() {
        let ensemble = EnsembleSeries {
            times: Vec::new(),
            members: vec![EnsembleMember { name: "rain_member01".into(), precip_mm: vec![5.0] }],
        };
        let input = LocationInput {
            ensemble: Some(ensemble),
            ..LocationInput::new(bogor(), Some(series(&[25.0], &[0.0])))
        };
        let report = run(&[input], &[at(10)], &Thresholds::default(), &mut PreviousTemperatureStore::new());
        assert!(report.locations[0].hours[0].ensemble_deviation.is_none());
    }

    #[test]
    fn test_advisory_reaches_every_hour() {
        let input = LocationInput {
            advisory: Some("Waspada potensi KILAT".to_string()),
            ..LocationInput::new(bogor(), Some(series(&[25.0, 25.0], &[0.0, 0.0])))
        };
        let report = run(&[input], &[at(10), at(11)], &Thresholds::default(), &mut PreviousTemperatureStore::new());

        let summary = &report.locations[0];
        assert_eq!(summary.counts.rawan, 2);
        assert_eq!(summary.thunder_times.len(), 2);
        assert_eq!(report.verdicts[0].overall_status, RiskStatus::Rawan);
        assert_eq!(report.windows.thunder.len(), 2);
    }

    #[test]
    fn test_load_inputs_degrades_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let forecast = dir.path().join("bogor.json");
        let ensemble = dir.path().join("bogor_ens.json");
        fs::write(
            &forecast,
            r#"{"hourly":{"time":["2025-01-15T10:00"],"temperature_2m":[26.0],"precipitation":[0.0]}}"#,
        )
        .unwrap();
        fs::write(&ensemble, "not json").unwrap();

        let configs = vec![
            LocationConfig {
                name: "Bogor".to_string(),
                latitude: None,
                longitude: None,
                coordinates: None,
                forecast_file: forecast.display().to_string(),
                ensemble_file: Some(ensemble.display().to_string()),
                advisory: None,
                advisory_file: Some(dir.path().join("missing.txt").display().to_string()),
            },
            LocationConfig {
                name: "Depok".to_string(),
                latitude: None,
                longitude: None,
                coordinates: None,
                forecast_file: dir.path().join("absent.json").display().to_string(),
                ensemble_file: None,
                advisory: Some("cerah".to_string()),
                advisory_file: None,
            },
            LocationConfig {
                name: "Atlantis".to_string(),
                latitude: None,
                longitude: None,
                coordinates: None,
                forecast_file: "atlantis.json".to_string(),
                ensemble_file: None,
                advisory: None,
                advisory_file: None,
            },
        ];

        let inputs = load_inputs(&configs);
        assert_eq!(inputs.len(), 2, "unresolvable location is left out");

        assert_eq!(inputs[0].location, bogor());
        assert_eq!(inputs[0].forecast.as_ref().map(HourlySeries::len), Some(1));
        assert!(inputs[0].ensemble.is_none(), "bad ensemble only drops the ensemble");
        assert!(inputs[0].advisory.is_none());

        assert!(inputs[1].forecast.is_none());
        assert_eq!(inputs[1].advisory.as_deref(), Some("cerah"));
    }
}
