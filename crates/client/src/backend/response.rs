//! Search backend response types.

use serde::Deserialize;
use serde_json::Value;

/// Raw response from `POST {backend}/search`.
///
/// Result records are passed through untouched.
#[derive(Debug, Deserialize)]
pub struct BackendResponse {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub total: Option<u64>,
}
