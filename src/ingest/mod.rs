/// Upstream payload decoding.
///
/// Only decoding lives here; fetching is left to whatever drives the run.

pub mod open_meteo;
