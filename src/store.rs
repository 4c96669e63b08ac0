/// Previous-temperature store.
///
/// A flat `key|value` text file, one pair per line, remembering the last
/// temperature seen for each location across runs. Each location is written
/// under two keys: its name (case-sensitive) and its `"lat,lon"` coordinate
/// key to 4 decimals. Lookups try the name, then the coordinate key, then a
/// case-insensitive name match.
///
/// The store is a single-writer resource: loaded once before a run, mutated
/// by that run only, persisted once after. Reading degrades to an empty map
/// and writing is best-effort; neither ever blocks classification.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::logging::{self, Component};
use crate::model::{Location, StoreError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviousTemperatureStore {
    entries: BTreeMap<String, String>,
}

impl PreviousTemperatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the text form. Blank lines, lines without `|` and lines with an
    /// empty key or value are skipped. Keys and values are trimmed; the value
    /// is split on the first `|` only.
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once('|')?;
                let (key, value) = (key.trim(), value.trim());
                if key.is_empty() || value.is_empty() {
                    return None;
                }
                Some((key.to_string(), value.to_string()))
            })
            .collect();
        Self { entries }
    }

    /// Text form, one `key|value` per line, keys sorted.
    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}|{}\n", k, v))
            .collect()
    }

    /// Reads the store file.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Reads the store file, degrading to an empty store on any failure.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        match Self::read(path) {
            Ok(store) => {
                logging::debug(
                    Component::Store,
                    None,
                    &format!("Loaded {} previous-temperature entries", store.len()),
                );
                store
            }
            Err(e) => {
                logging::log_input_failure(Component::Store, None, "Store load", &e);
                Self::new()
            }
        }
    }

    /// Writes the store file.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        fs::write(path, self.serialize()).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Best-effort persist: failures are logged and dropped.
    pub fn save<P: AsRef<Path>>(&self, path: P) {
        if let Err(e) = self.write(path) {
            logging::warn(Component::Store, None, &format!("Store save dropped: {}", e));
        }
    }

    /// Raw value for a location: name, then coordinate key, then name ignoring case.
    pub fn lookup(&self, location: &Location) -> Option<&str> {
        self.candidates(location).next()
    }

    /// Last temperature for a location. A value that does not parse is
    /// passed over for the next key in lookup order.
    pub fn lookup_temperature(&self, location: &Location) -> Option<f64> {
        self.candidates(location)
            .filter_map(|v| v.parse::<f64>().ok())
            .find(|t| t.is_finite())
    }

    /// Stored values for a location, in lookup order.
    fn candidates<'a>(&'a self, location: &Location) -> impl Iterator<Item = &'a str> + use<'a> {
        let wanted = location.name.to_lowercase();
        let by_name = self.entries.get(&location.name);
        let by_coordinate = self.entries.get(&location.coordinate_key());
        let by_folded_name = self
            .entries
            .iter()
            .filter(move |(k, _)| k.to_lowercase() == wanted)
            .map(|(_, v)| v);
        by_name
            .into_iter()
            .chain(by_coordinate)
            .chain(by_folded_name)
            .map(String::as_str)
    }

    /// Records a temperature under both the name and the coordinate key.
    pub fn record(&mut self, location: &Location, temperature_c: f64) {
        let value = temperature_c.to_string();
        self.entries.insert(location.coordinate_key(), value.clone());
        self.entries.insert(location.name.clone(), value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
