//! Ordered, de-duplicated set of slot timestamps.
//!
//! Insertion order is kept and the first occurrence wins. Slots are fed in
//! chronological order, so the set also reads chronologically.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::model::hour_label;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeSet {
    times: Vec<NaiveDateTime>,
}

impl TimeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `time` unless already present. Returns whether it was added.
    pub fn insert(&mut self, time: NaiveDateTime) -> bool {
        if self.times.contains(&time) {
            return false;
        }
        self.times.push(time);
        true
    }

    pub fn contains(&self, time: &NaiveDateTime) -> bool {
        self.times.contains(time)
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDateTime> {
        self.times.iter()
    }

    pub fn as_slice(&self) -> &[NaiveDateTime] {
        &self.times
    }

    /// Each member as `YYYY-MM-DD HH:00`.
    pub fn labels(&self) -> Vec<String> {
        self.times.iter().map(hour_label).collect()
    }
}

/// Space-separated labels, the form used in text reports.
impl fmt::Display for TimeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels().join(" "))
    }
}

impl Serialize for TimeSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.labels())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_first_occurrence_wins() {
        let mut set = TimeSet::new();
        assert!(set.insert(at(9)));
        assert!(set.insert(at(7)));
        assert!(!set.insert(at(9)), "duplicate insert must be rejected");
        assert_eq!(set.as_slice(), &[at(9), at(7)]);
    }

    #[test]
    fn test_display_is_space_joined() {
        let mut set = TimeSet::new();
        set.insert(at(7));
        set.insert(at(8));
        assert_eq!(set.to_string(), "2025-01-15 07:00 2025-01-15 08:00");
        assert_eq!(TimeSet::new().to_string(), "");
    }

    #[test]
    fn test_serializes_as_label_list() {
        let mut set = TimeSet::new();
        set.insert(at(13));
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["2025-01-15 13:00"]"#);
    }
}
