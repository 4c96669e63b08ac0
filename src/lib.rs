//! Hourly weather risk classification for a set of locations.
//!
//! Each location's hourly forecast is classified hour by hour into a sky
//! label, a rain category and an Aman / Waspada / Rawan status, then folded
//! into per-location summaries and a cross-location aggregate with
//! recommended safe and risky hours.

pub mod aggregate;
pub mod alert;
pub mod analysis;
pub mod config;
pub mod ingest;
pub mod locations;
pub mod logging;
pub mod model;
pub mod run;
pub mod store;
pub mod timeline;
