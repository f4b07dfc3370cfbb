//! Creator search filter state.
//!
//! The core never interprets filters semantically; they feed cache keys and
//! suggestion heuristics. Sets are ordered so that structurally equal filter
//! states always serialize to the same bytes.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Lowest price shown by the directory's price slider.
pub const DEFAULT_MIN_PRICE: u32 = 0;

/// Highest price shown by the directory's price slider.
pub const DEFAULT_MAX_PRICE: u32 = 1_000;

/// Inclusive price range in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self { min: DEFAULT_MIN_PRICE, max: DEFAULT_MAX_PRICE }
    }
}

impl PriceRange {
    /// Whether the range is narrower than the full slider.
    pub fn is_narrowed(&self) -> bool {
        *self != Self::default()
    }
}

/// Creator response-time buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ResponseTime {
    #[serde(rename = "24h")]
    Within24Hours,
    #[serde(rename = "3d")]
    Within3Days,
    #[serde(rename = "7d")]
    Within7Days,
}

/// Creator availability mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    #[default]
    Any,
    Now,
    ThisWeek,
}

/// Filters applied to a creator search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FilterState {
    pub categories: BTreeSet<String>,
    pub price_range: PriceRange,
    pub languages: BTreeSet<String>,
    pub min_rating: f32,
    pub response_times: BTreeSet<ResponseTime>,
    pub availability: Availability,
    pub verified_only: bool,
    pub location: String,
}

impl FilterState {
    /// Number of active filters.
    ///
    /// Each selected category, language and response-time bucket counts on its
    /// own; a narrowed price range, a positive rating floor and the
    /// verified-only flag count once each.
    pub fn active_count(&self) -> usize {
        let mut count = self.categories.len() + self.languages.len() + self.response_times.len();
        if self.price_range.is_narrowed() {
            count += 1;
        }
        if self.min_rating > 0.0 {
            count += 1;
        }
        if self.verified_only {
            count += 1;
        }
        count
    }

    /// Drop every restriction.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
