/// Location registry for the Jabodetabek weather risk service.
///
/// Defines the built-in list of locations classified when a run does not
/// name its own, plus the parser for ad-hoc `label:lat,lon;...` coordinate
/// lists. Configured locations without coordinates are resolved against this
/// registry by name, ignoring case.

use crate::config::LocationConfig;
use crate::logging::{self, Component};
use crate::model::Location;

// ---------------------------------------------------------------------------
// Default locations
// ---------------------------------------------------------------------------

/// A built-in location.
pub struct DefaultLocation {
    pub name: &'static str,
    /// WGS84 latitude.
    pub latitude: f64,
    /// WGS84 longitude.
    pub longitude: f64,
}

impl DefaultLocation {
    pub fn to_location(&self) -> Location {
        Location::new(self.name, self.latitude, self.longitude)
    }
}

/// City centres of the five Jabodetabek cities, in reporting order.
pub static DEFAULT_LOCATIONS: &[DefaultLocation] = &[
    DefaultLocation { name: "Jakarta", latitude: -6.1754, longitude: 106.8272 },
    DefaultLocation { name: "Bogor", latitude: -6.5971, longitude: 106.8060 },
    DefaultLocation { name: "Depok", latitude: -6.4025, longitude: 106.7941 },
    DefaultLocation { name: "Tangerang", latitude: -6.1275, longitude: 106.6559 },
    DefaultLocation { name: "Bekasi", latitude: -6.2383, longitude: 106.9756 },
];

/// All built-in locations as `Location` values.
pub fn default_locations() -> Vec<Location> {
    DEFAULT_LOCATIONS.iter().map(DefaultLocation::to_location).collect()
}

/// Looks up a built-in location by name, ignoring case.
pub fn find_default_location(name: &str) -> Option<&'static DefaultLocation> {
    let wanted = name.trim();
    DEFAULT_LOCATIONS
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(wanted))
}

/// Resolves a configured location: explicit latitude/longitude win, then the
/// first entry of a `coordinates` string, then the registry entry with the
/// same name. `None` when none is available.
pub fn resolve_location(config: &LocationConfig) -> Option<Location> {
    if let (Some(lat), Some(lon)) = (config.latitude, config.longitude) {
        return Some(Location::new(config.name.clone(), lat, lon));
    }
    if let Some(parsed) = config
        .coordinates
        .as_deref()
        .and_then(|raw| parse_coordinate_list(raw).into_iter().next())
    {
        return Some(Location::new(config.name.clone(), parsed.latitude, parsed.longitude));
    }
    find_default_location(&config.name).map(|d| Location::new(config.name.clone(), d.latitude, d.longitude))
}

// ---------------------------------------------------------------------------
// Coordinate list parsing
// ---------------------------------------------------------------------------

/// Parses `"label:lat,lon;lat,lon|other:lat,lon"`.
///
/// Entries are separated by `;` or `|`. The label is optional and defaults
/// to the coordinates at 6 decimals. Malformed entries are logged and
/// skipped.
pub fn parse_coordinate_list(arg: &str) -> Vec<Location> {
    arg.split(|c| c == ';' || c == '|')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let parsed = parse_coordinate_entry(entry);
            if parsed.is_none() {
                logging::warn(
                    Component::Config,
                    None,
                    &format!("Invalid coordinate entry skipped: {}", entry),
                );
            }
            parsed
        })
        .collect()
}

fn parse_coordinate_entry(entry: &str) -> Option<Location> {
    let (label, coords) = match entry.split_once(':') {
        Some((label, coords)) => (label.trim(), coords),
        None => ("", entry),
    };
    let (lat, lon) = coords.trim().split_once(',')?;
    let latitude = parse_degrees(lat)?;
    let longitude = parse_degrees(lon)?;

    let name = if label.is_empty() {
        format!("{:.6},{:.6}", latitude, longitude)
    } else {
        label.to_string()
    };
    Some(Location::new(name, latitude, longitude))
}

/// Signed decimal degrees; must contain a fractional part.
fn parse_degrees(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if !raw.contains('.') {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_coordinates_are_in_jabodetabek() {
        for loc in DEFAULT_LOCATIONS {
            assert!(
                (-6.8..=-5.9).contains(&loc.latitude),
                "latitude for '{}' out of area: {}",
                loc.name,
                loc.latitude
            );
            assert!(
                (106.4..=107.2).contains(&loc.longitude),
                "longitude for '{}' out of area: {}",
                loc.name,
                loc.longitude
            );
        }
    }

    #[test]
    fn test_no_duplicate_names() {
        let mut seen = std::collections::HashSet::new();
        for loc in DEFAULT_LOCATIONS {
            assert!(seen.insert(loc.name), "duplicate location '{}' in DEFAULT_LOCATIONS", loc.name);
        }
        assert_eq!(default_locations().len(), 5);
    }

    #[test]
    fn test_find_default_location_ignores_case() {
        let bogor = find_default_location("  bOgOr ").expect("Bogor should be in registry");
        assert_eq!(bogor.latitude, -6.5971);
        assert!(find_default_location("Bandung").is_none());
    }

    #[test]
    fn test_resolve_location() {
        let registry = LocationConfig {
            name: "depok".to_string(),
            latitude: None,
            longitude: None,
            coordinates: None,
            forecast_file: "depok.json".to_string(),
            ensemble_file: None,
            advisory: None,
            advisory_file: None,
        };
        let resolved = resolve_location(&registry).expect("registry fallback");
        assert_eq!(resolved.name, "depok", "configured name is kept");
        assert_eq!(resolved.coordinate_key(), "-6.4025,106.7941");

        let explicit = LocationConfig { name: "Pantai".to_string(), latitude: Some(-6.1), longitude: Some(106.9), ..registry.clone() };
        assert_eq!(resolve_location(&explicit).map(|l| l.latitude), Some(-6.1));

        let unknown = LocationConfig { name: "Bandung".to_string(), ..registry.clone() };
        assert!(resolve_location(&unknown).is_none());

        let listed = LocationConfig {
            name: "Bandung".to_string(),
            coordinates: Some("Rumah:-6.9175,107.6191".to_string()),
            ..registry.clone()
        };
        let resolved = resolve_location(&listed).expect("coordinate string");
        assert_eq!(resolved.name, "Bandung", "configured name wins over the list label");
        assert_eq!(resolved.coordinate_key(), "-6.9175,107.6191");

        let malformed = LocationConfig { coordinates: Some("6,107".to_string()), ..registry };
        assert_eq!(
            resolve_location(&malformed).map(|l| l.coordinate_key()),
            Some("-6.4025,106.7941".to_string()),
            "unusable coordinate string falls back to the registry"
        );
    }

    #[test]
    fn test_parse_coordinate_list() {
        let parsed = parse_coordinate_list("Rumah:-6.30,106.80; -6.25 , 106.9 |bad entry|Kantor:1,2");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "Rumah");
        assert_eq!(parsed[0].latitude, -6.30);
        assert_eq!(parsed[1].name, "-6.250000,106.900000", "unlabelled entries are named by coordinates");
        assert!(parse_coordinate_list("   ").is_empty());
    }
}
