//! Recent-search operations.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

use super::connection::HistoryDb;
use crate::Error;
use crate::cache::normalize_query;
use crate::filters::FilterState;

/// A search the user ran recently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RecentSearch {
    pub query: String,
    pub filters: FilterState,
    pub result_count: usize,
    pub searched_at: String,
}

impl HistoryDb {
    /// Record a search.
    ///
    /// Searches that normalize to the same query replace each other, and the
    /// table is trimmed to the newest `limit` rows.
    pub async fn record(&self, query: &str, filters: &FilterState, result_count: usize) -> Result<(), Error> {
        let query_key = normalize_query(query);
        if query_key.is_empty() {
            return Err(Error::InvalidInput("query cannot be empty".into()));
        }
        let query = query.trim().to_string();
        let filters_json =
            serde_json::to_string(filters).map_err(|e| Error::InvalidInput(format!("unserializable filters: {e}")))?;
        let searched_at = Utc::now().to_rfc3339();
        let limit = self.limit as i64;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO recent_searches (query_key, query, filters_json, result_count, searched_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ON CONFLICT(query_key) DO UPDATE SET
                        query = excluded.query,
                        filters_json = excluded.filters_json,
                        result_count = excluded.result_count,
                        searched_at = excluded.searched_at",
                    params![query_key, query, filters_json, result_count as i64, searched_at],
                )?;
                tx.execute(
                    "DELETE FROM recent_searches WHERE query_key NOT IN (
                        SELECT query_key FROM recent_searches ORDER BY searched_at DESC, rowid DESC LIMIT ?1
                    )",
                    params![limit],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// The most recent searches, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<RecentSearch>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<RecentSearch>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT query, filters_json, result_count, searched_at FROM recent_searches
                    ORDER BY searched_at DESC, rowid DESC LIMIT ?1",
                )?;

                let rows = stmt.query_map(params![limit], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, i64>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                })?;

                let mut searches = Vec::new();
                for row in rows {
                    let (query, filters_json, result_count, searched_at) = row?;
                    let filters = serde_json::from_str(&filters_json).unwrap_or_else(|e| {
                        tracing::warn!("dropping unreadable filters for recent search {query:?}: {e}");
                        FilterState::default()
                    });
                    searches.push(RecentSearch {
                        query,
                        filters,
                        result_count: result_count.max(0) as usize,
                        searched_at,
                    });
                }
                Ok(searches)
            })
            .await
            .map_err(Error::from)
    }

    /// Forget every recorded search.
    ///
    /// Returns the number of deleted rows.
    pub async fn clear(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM recent_searches", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
