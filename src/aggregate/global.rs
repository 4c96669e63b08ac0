//! Cross-location aggregation.
//!
//! Per-slot counts are summed over every processed location, then the
//! recommendation windows are derived from those counts. Folding is
//! commutative: the location order never changes the result.

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;
use std::collections::BTreeSet;

use super::location::LocationSummary;
use super::timeset::TimeSet;
use crate::config::AggregateThresholds;
use crate::model::{ClassifiedHour, DeviationLevel, RainCategory, RiskStatus};

/// Counts for one hourly slot, across locations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotCounts {
    pub time: NaiveDateTime,
    /// Locations that produced a classified hour for this slot.
    pub locations: usize,
    pub aman: usize,
    pub waspada: usize,
    pub rawan: usize,
    /// Advisory and heuristic thunder detections added together; one
    /// location can count twice here.
    pub thunder: usize,
    pub wind_warn: usize,
    pub wind_danger: usize,
    pub gust_warn: usize,
    pub gust_danger: usize,
    /// Deterministic and ensemble detections added together; one location
    /// can count twice here.
    pub deviation_warn: usize,
    pub deviation_danger: usize,
    pub rain_gerimis: usize,
    pub rain_ringan: usize,
    pub rain_sedang: usize,
    pub rain_deras: usize,
}

impl SlotCounts {
    fn empty(time: NaiveDateTime) -> Self {
        Self {
            time,
            locations: 0,
            aman: 0,
            waspada: 0,
            rawan: 0,
            thunder: 0,
            wind_warn: 0,
            wind_danger: 0,
            gust_warn: 0,
            gust_danger: 0,
            deviation_warn: 0,
            deviation_danger: 0,
            rain_gerimis: 0,
            rain_ringan: 0,
            rain_sedang: 0,
            rain_deras: 0,
        }
    }

    fn add(&mut self, hour: &ClassifiedHour) {
        self.locations += 1;
        match hour.status {
            RiskStatus::Aman => self.aman += 1,
            RiskStatus::Waspada => self.waspada += 1,
            RiskStatus::Rawan => self.rawan += 1,
        }

        let flags = &hour.flags;
        self.thunder += usize::from(flags.thunder_advisory) + usize::from(flags.thunder_heuristic);
        self.wind_warn += usize::from(flags.wind_warn);
        self.wind_danger += usize::from(flags.wind_danger);
        self.gust_warn += usize::from(flags.gust_warn);
        self.gust_danger += usize::from(flags.gust_danger);

        for level in hour.deviation_levels() {
            match level {
                DeviationLevel::Warn => self.deviation_warn += 1,
                DeviationLevel::Danger => self.deviation_danger += 1,
                DeviationLevel::None => {}
            }
        }

        match hour.rain_category {
            RainCategory::None => {}
            RainCategory::Gerimis => self.rain_gerimis += 1,
            RainCategory::Ringan => self.rain_ringan += 1,
            RainCategory::Sedang => self.rain_sedang += 1,
            RainCategory::Deras => self.rain_deras += 1,
        }
    }

    /// Count for one rain category; 0 for NONE.
    pub fn rain(&self, category: RainCategory) -> usize {
        match category {
            RainCategory::None => 0,
            RainCategory::Gerimis => self.rain_gerimis,
            RainCategory::Ringan => self.rain_ringan,
            RainCategory::Sedang => self.rain_sedang,
            RainCategory::Deras => self.rain_deras,
        }
    }
}

/// Slots selected by each recommendation rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalWindows {
    pub best_safe: TimeSet,
    pub any_risky: TimeSet,
    pub thunder: TimeSet,
    pub wind_warn: TimeSet,
    pub wind_danger: TimeSet,
    pub gust_warn: TimeSet,
    pub gust_danger: TimeSet,
    pub deviation_warn: TimeSet,
    pub deviation_danger: TimeSet,
}

impl GlobalWindows {
    /// Each window collapsed into hour-of-day runs with [`hour_ranges`].
    pub fn ranges(&self) -> WindowRanges {
        WindowRanges {
            best_safe: hour_ranges(self.best_safe.as_slice()),
            any_risky: hour_ranges(self.any_risky.as_slice()),
            thunder: hour_ranges(self.thunder.as_slice()),
            wind_warn: hour_ranges(self.wind_warn.as_slice()),
            wind_danger: hour_ranges(self.wind_danger.as_slice()),
            gust_warn: hour_ranges(self.gust_warn.as_slice()),
            gust_danger: hour_ranges(self.gust_danger.as_slice()),
            deviation_warn: hour_ranges(self.deviation_warn.as_slice()),
            deviation_danger: hour_ranges(self.deviation_danger.as_slice()),
        }
    }
}

/// Compact `"06:00-08:00, 13:00"` rendering of [`GlobalWindows`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowRanges {
    pub best_safe: String,
    pub any_risky: String,
    pub thunder: String,
    pub wind_warn: String,
    pub wind_danger: String,
    pub gust_warn: String,
    pub gust_danger: String,
    pub deviation_warn: String,
    pub deviation_danger: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalAggregate {
    pub processed_locations: usize,
    pub slots: Vec<SlotCounts>,
}

impl GlobalAggregate {
    /// Aman locations needed for a best safe hour: `ceil(processed × fraction)`.
    pub fn required_safe_count(&self, thresholds: &AggregateThresholds) -> usize {
        let exact = self.processed_locations as f64 * thresholds.safe_fraction;
        // Absorb float noise such as 5 × 0.8 = 4.000000000000001.
        (exact - 1e-9).ceil().max(0.0) as usize
    }

    /// Slots where enough processed locations are Aman. Empty when nothing
    /// was processed.
    pub fn best_safe_hours(&self, thresholds: &AggregateThresholds) -> Vec<NaiveDateTime> {
        if self.processed_locations == 0 {
            return Vec::new();
        }
        let required = self.required_safe_count(thresholds);
        self.select(|s| s.aman >= required)
    }

    /// Slots where strictly more than `risky_more_than` locations are Rawan.
    pub fn any_risky_hours(&self, thresholds: &AggregateThresholds) -> Vec<NaiveDateTime> {
        self.select(|s| s.rawan > thresholds.risky_more_than)
    }

    pub fn windows(&self, thresholds: &AggregateThresholds) -> GlobalWindows {
        GlobalWindows {
            best_safe: collect(self.best_safe_hours(thresholds)),
            any_risky: collect(self.any_risky_hours(thresholds)),
            thunder: collect(self.select(|s| s.thunder > 0)),
            wind_warn: collect(self.select(|s| s.wind_warn > 0)),
            wind_danger: collect(self.select(|s| s.wind_danger > 0)),
            gust_warn: collect(self.select(|s| s.gust_warn > 0)),
            gust_danger: collect(self.select(|s| s.gust_danger > 0)),
            deviation_warn: collect(self.select(|s| s.deviation_warn > 0)),
            deviation_danger: collect(self.select(|s| s.deviation_danger > 0)),
        }
    }

    pub fn slot(&self, time: &NaiveDateTime) -> Option<&SlotCounts> {
        self.slots.iter().find(|s| &s.time == time)
    }

    fn select<F: Fn(&SlotCounts) -> bool>(&self, keep: F) -> Vec<NaiveDateTime> {
        self.slots.iter().filter(|s| keep(s)).map(|s| s.time).collect()
    }
}

fn collect(times: Vec<NaiveDateTime>) -> TimeSet {
    let mut set = TimeSet::new();
    for t in times {
        set.insert(t);
    }
    set
}

/// Sums location summaries into a [`GlobalAggregate`] over fixed slots.
pub struct CrossLocationAggregator {
    processed_locations: usize,
    slots: Vec<SlotCounts>,
}

impl CrossLocationAggregator {
    pub fn new(slots: &[NaiveDateTime]) -> Self {
        Self {
            processed_locations: 0,
            slots: slots.iter().copied().map(SlotCounts::empty).collect(),
        }
    }

    /// Adds one processed location. Hours outside the slot axis are ignored.
    pub fn fold(&mut self, summary: &LocationSummary) {
        self.processed_locations += 1;
        for slot in &mut self.slots {
            if let Some(hour) = summary.hour_at(&slot.time) {
                slot.add(hour);
            }
        }
    }

    pub fn finish(self) -> GlobalAggregate {
        GlobalAggregate {
            processed_locations: self.processed_locations,
            slots: self.slots,
        }
    }
}

/// Collapses slot times into compact hour-of-day runs, e.g.
/// `"06:00-09:00, 13:00"`. Hours are de-duplicated and sorted by hour of
/// day; `"-"` when empty.
pub fn hour_ranges(times: &[NaiveDateTime]) -> String {
    let hours: BTreeSet<u32> = times.iter().map(|t| t.hour()).collect();
    let mut iter = hours.into_iter();
    let Some(first) = iter.next() else {
        return "-".to_string();
    };

    let mut ranges = Vec::new();
    let (mut start, mut prev) = (first, first);
    for h in iter {
        if h == prev + 1 {
            prev = h;
            continue;
        }
        ranges.push(format_range(start, prev));
        start = h;
        prev = h;
    }
    ranges.push(format_range(start, prev));
    ranges.join(", ")
}

fn format_range(start: u32, end: u32) -> String {
    if start == end {
        format!("{:02}:00", start)
    } else {
        format!("{:02}:00-{:02}:00", start, end)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
