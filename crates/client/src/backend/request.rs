//! Search backend request types and validation.

use serde::Serialize;
use shoutout_core::FilterState;

use super::BackendError;

/// Longest query accepted, in chars.
pub const MAX_QUERY_CHARS: usize = 200;

/// Body of `POST {backend}/search`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub filters: FilterState,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, filters: FilterState) -> Self {
        Self { query: query.into(), filters }
    }

    /// Validate the request before it is sent.
    pub fn validate(&self) -> Result<(), BackendError> {
        let query = self.query.trim();

        if query.is_empty() {
            return Err(BackendError::InvalidQuery("query cannot be empty".to_string()));
        }

        let chars = query.chars().count();
        if chars > MAX_QUERY_CHARS {
            return Err(BackendError::InvalidQuery(format!(
                "query too long: {chars} chars (max {MAX_QUERY_CHARS})"
            )));
        }

        if query.chars().any(char::is_control) {
            return Err(BackendError::InvalidQuery("query contains control characters".to_string()));
        }

        let range = self.filters.price_range;
        if range.min > range.max {
            return Err(BackendError::InvalidQuery(format!(
                "invalid price range: {} > {}",
                range.min, range.max
            )));
        }

        if !(0.0..=5.0).contains(&self.filters.min_rating) {
            return Err(BackendError::InvalidQuery(format!(
                "invalid minimum rating: {}",
                self.filters.min_rating
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoutout_core::PriceRange;

    #[test]
    fn test_valid_request() {
        let req = SearchRequest::new("birthday shoutout", FilterState::default());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_empty_query() {
        let req = SearchRequest::new("   ", FilterState::default());
        assert!(matches!(req.validate(), Err(BackendError::InvalidQuery(_))));

        let filters = FilterState { categories: ["comedy".to_string()].into(), ..Default::default() };
        assert!(SearchRequest::new("", filters).validate().is_err());
    }

    #[test]
    fn test_query_at_limit() {
        let req = SearchRequest::new("é".repeat(MAX_QUERY_CHARS), FilterState::default());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_query_too_long() {
        let req = SearchRequest::new("a".repeat(MAX_QUERY_CHARS + 1), FilterState::default());
        assert!(matches!(req.validate(), Err(BackendError::InvalidQuery(msg)) if msg.contains("too long")));
    }

    #[test]
    fn test_inverted_price_range() {
        let filters = FilterState { price_range: PriceRange { min: 500, max: 100 }, ..Default::default() };
        assert!(matches!(SearchRequest::new("roast", filters).validate(), Err(BackendError::InvalidQuery(_))));
    }

    #[test]
    fn test_rating_out_of_range() {
        let filters = FilterState { min_rating: 7.5, ..Default::default() };
        assert!(matches!(SearchRequest::new("roast", filters).validate(), Err(BackendError::InvalidQuery(_))));
    }
}
