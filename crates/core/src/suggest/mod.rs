//! Recovery suggestions for empty or over-filtered searches.
//!
//! The engine combines five heuristics, each with a fixed confidence and
//! priority:
//!
//! | kind | trigger | confidence | priority |
//! |---|---|---|---|
//! | spelling correction | a query word close to a known misspelling (edit distance scaled to its length, at most 2) | 90 | 1 |
//! | category expansion | a query word related to a category | 80 | 2 |
//! | filter relaxation | more than two active filters | 85 | 3 |
//! | filter relaxation | price ceiling below 100 | 75 | 4 |
//! | filter relaxation | exactly one language | 70 | 5 |
//! | alternative term | a query word with known alternatives | 65 | 6 |
//! | time based | morning or evening local hour | 60 | 7 |
//!
//! Suggestions are ordered by ascending priority, then descending confidence.

pub mod distance;
pub mod tables;

use chrono::Timelike;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cache::normalize_query;
use crate::filters::FilterState;

pub use distance::levenshtein;

/// Number of suggestions a UI should present.
pub const MAX_PRESENTED: usize = 5;

/// Largest edit distance accepted as a likely misspelling.
const MAX_SPELLING_DISTANCE: usize = 2;

/// Words shorter than this are never treated as misspellings.
const MIN_WORD_LEN: usize = 4;

/// Edit distance tolerated against `misspelling`: one per four chars, capped
/// at [`MAX_SPELLING_DISTANCE`].
fn spelling_tolerance(misspelling: &str) -> usize {
    (misspelling.chars().count() / 4).min(MAX_SPELLING_DISTANCE)
}

const PRICE_STEP: u32 = 50;
const LOW_PRICE_CEILING: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionKind {
    SpellingCorrection,
    CategoryExpansion,
    FilterRelaxation,
    AlternativeTerm,
    TimeBased,
}

/// Change a suggestion makes to the search when accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SuggestionAction {
    ReplaceQuery { query: String },
    /// Clear the query and every filter, then select one category.
    BrowseCategory { category: String },
    ClearFilters,
    SetMaxPrice { max: u32 },
    /// Drop the language restriction.
    WidenLanguages,
}

impl SuggestionAction {
    pub fn apply(&self, query: &mut String, filters: &mut FilterState) {
        match self {
            Self::ReplaceQuery { query: replacement } => *query = replacement.clone(),
            Self::BrowseCategory { category } => {
                query.clear();
                filters.clear();
                filters.categories.insert(category.clone());
            }
            Self::ClearFilters => filters.clear(),
            Self::SetMaxPrice { max } => filters.price_range.max = *max,
            Self::WidenLanguages => filters.languages.clear(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub title: String,
    pub description: String,
    /// 0 to 100.
    pub confidence: u8,
    /// Lower is shown first.
    pub priority: u8,
    pub action: SuggestionAction,
}

/// The suggestions a UI should present.
pub fn top(suggestions: &[Suggestion]) -> &[Suggestion] {
    &suggestions[..suggestions.len().min(MAX_PRESENTED)]
}

/// Produces ranked recovery suggestions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuggestionEngine;

impl SuggestionEngine {
    pub fn new() -> Self {
        Self
    }

    /// Suggestions for a search, using the local hour for time-based hints.
    pub fn suggest(&self, query: &str, filters: &FilterState, result_count: usize) -> Vec<Suggestion> {
        self.suggest_at(query, filters, result_count, chrono::Local::now().hour())
    }

    /// Suggestions for a search run at `hour` (0-23).
    ///
    /// Empty unless the search returned nothing or more than two filters are
    /// active.
    pub fn suggest_at(&self, query: &str, filters: &FilterState, result_count: usize, hour: u32) -> Vec<Suggestion> {
        if result_count > 0 && filters.active_count() <= 2 {
            return Vec::new();
        }

        let normalized = normalize_query(query);
        let mut suggestions = Vec::new();
        suggestions.extend(spelling_corrections(&normalized));
        suggestions.extend(category_expansions(&normalized, filters));
        suggestions.extend(filter_relaxations(filters));
        suggestions.extend(alternative_terms(&normalized));
        suggestions.extend(time_based(hour));

        suggestions.sort_by(|a, b| a.priority.cmp(&b.priority).then(b.confidence.cmp(&a.confidence)));
        suggestions
    }
}

fn replace_word(words: &[&str], index: usize, replacement: &str) -> String {
    words
        .iter()
        .enumerate()
        .map(|(i, word)| if i == index { replacement } else { *word })
        .collect::<Vec<_>>()
        .join(" ")
}

fn spelling_corrections(query: &str) -> Vec<Suggestion> {
    if query.is_empty() {
        return Vec::new();
    }
    let words: Vec<&str> = query.split(' ').collect();
    let mut suggestions = Vec::new();

    for (correct, misspellings) in tables::SPELLING_CORRECTIONS {
        let close = |candidate: &str| {
            candidate != *correct
                && candidate.chars().count() >= MIN_WORD_LEN
                && misspellings.iter().any(|m| levenshtein(candidate, m) <= spelling_tolerance(m))
        };

        let corrected = if close(query) {
            Some(correct.to_string())
        } else {
            words
                .iter()
                .position(|word| close(word))
                .map(|index| replace_word(&words, index, correct))
        };

        if let Some(corrected) = corrected
            && corrected != query
        {
            suggestions.push(Suggestion {
                kind: SuggestionKind::SpellingCorrection,
                title: format!("Did you mean \"{corrected}\"?"),
                description: format!("Search for \"{corrected}\" instead"),
                confidence: 90,
                priority: 1,
                action: SuggestionAction::ReplaceQuery { query: corrected },
            });
        }
    }
    suggestions
}

fn category_expansions(query: &str, filters: &FilterState) -> Vec<Suggestion> {
    let words: Vec<&str> = query.split(' ').filter(|w| !w.is_empty()).collect();
    tables::CATEGORY_TERMS
        .iter()
        .filter(|(category, _)| !filters.categories.contains(*category))
        .filter(|(category, related)| words.iter().any(|w| w == category || related.contains(w)))
        .map(|(category, _)| Suggestion {
            kind: SuggestionKind::CategoryExpansion,
            title: format!("Browse all {category}"),
            description: format!("See every creator in the {category} category"),
            confidence: 80,
            priority: 2,
            action: SuggestionAction::BrowseCategory { category: category.to_string() },
        })
        .collect()
}

fn filter_relaxations(filters: &FilterState) -> Vec<Suggestion> {
    let mut suggestions = Vec::new();

    let active = filters.active_count();
    if active > 2 {
        suggestions.push(Suggestion {
            kind: SuggestionKind::FilterRelaxation,
            title: "Try fewer filters".into(),
            description: format!("You have {active} filters active; removing some may show more creators"),
            confidence: 85,
            priority: 3,
            action: SuggestionAction::ClearFilters,
        });
    }

    if filters.price_range.max < LOW_PRICE_CEILING {
        let max = filters.price_range.max + PRICE_STEP;
        suggestions.push(Suggestion {
            kind: SuggestionKind::FilterRelaxation,
            title: format!("Expand price range to ${max}"),
            description: "More creators are available at slightly higher prices".into(),
            confidence: 75,
            priority: 4,
            action: SuggestionAction::SetMaxPrice { max },
        });
    }

    if filters.languages.len() == 1 {
        suggestions.push(Suggestion {
            kind: SuggestionKind::FilterRelaxation,
            title: "Include more languages".into(),
            description: "Many creators record messages in several languages".into(),
            confidence: 70,
            priority: 5,
            action: SuggestionAction::WidenLanguages,
        });
    }

    suggestions
}

fn alternative_terms(query: &str) -> Vec<Suggestion> {
    let words: Vec<&str> = query.split(' ').filter(|w| !w.is_empty()).collect();
    tables::ALTERNATIVE_TERMS
        .iter()
        .filter_map(|(term, alternatives)| {
            let index = words.iter().position(|w| w == term)?;
            let alternative = alternatives.first()?;
            Some(Suggestion {
                kind: SuggestionKind::AlternativeTerm,
                title: format!("Try \"{alternative}\""),
                description: format!("Creators often list {term} messages as {alternative}"),
                confidence: 65,
                priority: 6,
                action: SuggestionAction::ReplaceQuery { query: replace_word(&words, index, alternative) },
            })
        })
        .collect()
}

fn time_based(hour: u32) -> Option<Suggestion> {
    let (title, description, query) = match hour {
        6..=11 => ("Morning motivation", "Start the day with a pep talk from a motivational creator", "motivation"),
        18..=22 => ("Evening entertainment", "Wind down with comedians and entertainers", "comedy"),
        _ => return None,
    };
    Some(Suggestion {
        kind: SuggestionKind::TimeBased,
        title: title.into(),
        description: description.into(),
        confidence: 60,
        priority: 7,
        action: SuggestionAction::ReplaceQuery { query: query.into() },
    })
}
