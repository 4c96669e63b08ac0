//! Per-location aggregation across the run's hourly slots.
//!
//! [`LocationAggregator`] takes classified hours in slot order and fills one
//! [`LocationSummary`]: status counts, the condition time-lists, the sky
//! histogram and a snapshot of the first slot.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use super::timeset::TimeSet;
use crate::model::{
    ClassifiedHour, Deviation, DeviationLevel, Location, RainCategory, RiskStatus, SkyCondition, hour_label,
};

// ---------------------------------------------------------------------------
// Summary parts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub aman: usize,
    pub waspada: usize,
    pub rawan: usize,
}

impl StatusCounts {
    pub fn add(&mut self, status: RiskStatus) {
        match status {
            RiskStatus::Aman => self.aman += 1,
            RiskStatus::Waspada => self.waspada += 1,
            RiskStatus::Rawan => self.rawan += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.aman + self.waspada + self.rawan
    }
}

/// One time-list per non-NONE rain category.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RainHours {
    pub gerimis: TimeSet,
    pub ringan: TimeSet,
    pub sedang: TimeSet,
    pub deras: TimeSet,
}

impl RainHours {
    pub fn for_category(&self, category: RainCategory) -> Option<&TimeSet> {
        match category {
            RainCategory::None => None,
            RainCategory::Gerimis => Some(&self.gerimis),
            RainCategory::Ringan => Some(&self.ringan),
            RainCategory::Sedang => Some(&self.sedang),
            RainCategory::Deras => Some(&self.deras),
        }
    }

    fn for_category_mut(&mut self, category: RainCategory) -> Option<&mut TimeSet> {
        match category {
            RainCategory::None => None,
            RainCategory::Gerimis => Some(&mut self.gerimis),
            RainCategory::Ringan => Some(&mut self.ringan),
            RainCategory::Sedang => Some(&mut self.sedang),
            RainCategory::Deras => Some(&mut self.deras),
        }
    }
}

/// Waspada overlay lists. Informational; independent of the hour status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WaspadaHours {
    /// Rain, accumulation or humid-rain hours.
    pub rain: TimeSet,
    /// Heat with strong UV.
    pub heat: TimeSet,
    pub gust: TimeSet,
}

impl WaspadaHours {
    pub fn is_empty(&self) -> bool {
        self.rain.is_empty() && self.heat.is_empty() && self.gust.is_empty()
    }
}

/// Deviation hours merged from both sources, de-duplicated per level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviationHours {
    pub warn: TimeSet,
    pub danger: TimeSet,
}

impl DeviationHours {
    pub fn is_empty(&self) -> bool {
        self.warn.is_empty() && self.danger.is_empty()
    }
}

/// An hour with measurable rain, tagged with its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealRainEvent {
    pub time: NaiveDateTime,
    pub category: RainCategory,
}

/// `YYYY-MM-DD HH:00:CATEGORY`
impl Serialize for RealRainEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}:{}", hour_label(&self.time), self.category))
    }
}

/// Coarse risk from how many real rain events a location has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RealRainRisk {
    None,
    Low,
    Medium,
    High,
}

impl RealRainRisk {
    pub fn from_event_count(count: usize) -> Self {
        match count {
            0 => RealRainRisk::None,
            1 => RealRainRisk::Low,
            2..=3 => RealRainRisk::Medium,
            _ => RealRainRisk::High,
        }
    }
}

/// Indicators at the first processed slot, for downstream summaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentSnapshot {
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub probability_pct: f64,
    pub rain_mm: f64,
    pub wind_direction_deg: f64,
    pub wind_speed_kmh: f64,
    pub wind_gust_kmh: f64,
    pub uv_index: f64,
    /// Most frequent sky label over the run.
    pub dominant_sky: SkyCondition,
    /// Ensemble deviation when available, else deterministic.
    pub deviation: Deviation,
}

// ---------------------------------------------------------------------------
// LocationSummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSummary {
    pub location: Location,
    pub counts: StatusCounts,
    pub thunder_times: TimeSet,
    pub rain_times: RainHours,
    pub real_rain_events: Vec<RealRainEvent>,
    pub waspada: WaspadaHours,
    pub deviation: DeviationHours,
    pub rawan_times: TimeSet,
    pub sky_histogram: BTreeMap<SkyCondition, usize>,
    pub current: Option<CurrentSnapshot>,
    pub hours: Vec<ClassifiedHour>,
}

impl LocationSummary {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            counts: StatusCounts::default(),
            thunder_times: TimeSet::new(),
            rain_times: RainHours::default(),
            real_rain_events: Vec::new(),
            waspada: WaspadaHours::default(),
            deviation: DeviationHours::default(),
            rawan_times: TimeSet::new(),
            sky_histogram: BTreeMap::new(),
            current: None,
            hours: Vec::new(),
        }
    }

    pub fn real_rain_risk(&self) -> RealRainRisk {
        RealRainRisk::from_event_count(self.real_rain_events.len())
    }

    /// Whole-run verdict for the location.
    ///
    /// Rawan when any hour was Rawan, rained for real, or carried thunder
    /// risk; Waspada when any waspada overlay or deviation hour exists.
    pub fn overall_status(&self) -> RiskStatus {
        if !self.rawan_times.is_empty() || !self.real_rain_events.is_empty() || !self.thunder_times.is_empty() {
            RiskStatus::Rawan
        } else if !self.waspada.is_empty() || !self.deviation.is_empty() {
            RiskStatus::Waspada
        } else {
            RiskStatus::Aman
        }
    }

    pub fn hour_at(&self, time: &NaiveDateTime) -> Option<&ClassifiedHour> {
        self.hours.iter().find(|h| &h.time() == time)
    }
}

// ---------------------------------------------------------------------------
// LocationAggregator
// ---------------------------------------------------------------------------

pub struct LocationAggregator {
    summary: LocationSummary,
    /// Sky labels in the order first seen, for histogram tie-breaks.
    sky_order: Vec<SkyCondition>,
}

impl LocationAggregator {
    pub fn new(location: Location) -> Self {
        Self {
            summary: LocationSummary::new(location),
            sky_order: Vec::new(),
        }
    }

    /// Folds one classified hour into the summary. Hours must arrive in slot order.
    pub fn record(&mut self, hour: ClassifiedHour) {
        let s = &mut self.summary;
        let time = hour.time();

        s.counts.add(hour.status);
        if hour.status == RiskStatus::Rawan {
            s.rawan_times.insert(time);
        }
        if hour.flags.thunder() {
            s.thunder_times.insert(time);
        }
        if let Some(list) = s.rain_times.for_category_mut(hour.rain_category) {
            list.insert(time);
        }
        if hour.flags.real_rain {
            let event = RealRainEvent { time, category: hour.rain_category };
            if !s.real_rain_events.contains(&event) {
                s.real_rain_events.push(event);
            }
        }
        if hour.flags.rain_waspada {
            s.waspada.rain.insert(time);
        }
        if hour.flags.heat_waspada {
            s.waspada.heat.insert(time);
        }
        if hour.flags.gust_waspada {
            s.waspada.gust.insert(time);
        }
        for level in hour.deviation_levels() {
            match level {
                DeviationLevel::Warn => {
                    s.deviation.warn.insert(time);
                }
                DeviationLevel::Danger => {
                    s.deviation.danger.insert(time);
                }
                DeviationLevel::None => {}
            }
        }

        *s.sky_histogram.entry(hour.sky).or_insert(0) += 1;
        if !self.sky_order.contains(&hour.sky) {
            self.sky_order.push(hour.sky);
        }

        s.hours.push(hour);
    }

    /// Most frequent sky label; ties go to the label seen first.
    fn dominant_sky(&self) -> Option<SkyCondition> {
        let mut best: Option<(SkyCondition, usize)> = None;
        for sky in &self.sky_order {
            let count = self.summary.sky_histogram.get(sky).copied().unwrap_or(0);
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((*sky, count));
            }
        }
        best.map(|(sky, _)| sky)
    }

    pub fn finish(mut self) -> LocationSummary {
        let dominant = self.dominant_sky();
        if let (Some(first), Some(dominant_sky)) = (self.summary.hours.first(), dominant) {
            let sample = first.sample;
            self.summary.current = Some(CurrentSnapshot {
                time: sample.time,
                temperature_c: sample.temperature_c,
                humidity_pct: sample.humidity_pct,
                probability_pct: sample.precip_probability_pct,
                rain_mm: sample.precip_mm,
                wind_direction_deg: sample.wind_direction_deg,
                wind_speed_kmh: sample.wind_speed_kmh,
                wind_gust_kmh: sample.wind_gust_kmh,
                uv_index: sample.uv_index,
                dominant_sky,
                deviation: first.ensemble_deviation.unwrap_or(first.deterministic_deviation),
            });
        }
        self.summary
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
