/// Aggregation of classified hours.
///
/// - `timeset`: ordered, de-duplicated timestamp lists.
/// - `location`: one summary per location across the run's slots.
/// - `global`: per-slot counts across locations and the derived
///   best-safe / any-risky windows.

pub mod global;
pub mod location;
pub mod timeset;

pub use global::{CrossLocationAggregator, GlobalAggregate, GlobalWindows, SlotCounts, WindowRanges, hour_ranges};
pub use location::{LocationAggregator, LocationSummary, RealRainRisk};
pub use timeset::TimeSet;
