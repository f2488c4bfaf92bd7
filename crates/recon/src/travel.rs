use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::dates::parse_date_text;
use crate::model::TravelEntry;

/// Date -> travel country lookup built from the app travel log.
#[derive(Debug, Clone, Default)]
pub struct TravelIndex {
    by_date: HashMap<NaiveDate, String>,
}

impl TravelIndex {
    /// Index entries in order. Later entries overwrite earlier ones for the
    /// same date; entries without a parseable date are dropped.
    pub fn build(entries: &[TravelEntry]) -> Self {
        let mut by_date = HashMap::new();
        let mut dropped = 0usize;

        for entry in entries {
            let Some(date) = entry.date.as_deref().and_then(parse_date_text) else {
                dropped += 1;
                continue;
            };
            let country = entry.travel_country.clone().unwrap_or_default();
            by_date.insert(date, country);
        }

        if dropped > 0 {
            debug!(dropped, "travel entries without a parseable date");
        }

        Self { by_date }
    }

    /// Country recorded for `date`, or "" when there is none.
    pub fn lookup(&self, date: NaiveDate) -> &str {
        self.by_date.get(&date).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.by_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}
