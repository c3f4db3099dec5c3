//! Code lookups: in-memory list first, network second.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::api::{CodeKind, CountriesApi};
use crate::error::Result;
use crate::models::CountryRecord;

/// Resolves country codes to records with as few requests as possible.
#[derive(Clone)]
pub struct CountryResolver {
    api: CountriesApi,
}

fn find_cached<'a>(cached: &'a [CountryRecord], code: &str) -> Option<&'a CountryRecord> {
    cached.iter().find(|c| c.has_code(code))
}

impl CountryResolver {
    pub fn new(api: CountriesApi) -> Self {
        Self { api }
    }

    /// Resolve one code, matching primary or secondary code as given.
    ///
    /// Falls back to a primary-code query, then a secondary-code query.
    /// `Ok(None)` means neither matched.
    pub async fn resolve_one(
        &self,
        cached: &[CountryRecord],
        code: &str,
    ) -> Result<Option<CountryRecord>> {
        if let Some(hit) = find_cached(cached, code) {
            debug!(code, "resolved from cache");
            return Ok(Some(hit.clone()));
        }

        debug!(code, "cache miss, querying by primary code");
        if let Some(record) = self.api.lookup(CodeKind::Primary, code).await? {
            return Ok(Some(record));
        }

        debug!(code, "no primary match, querying by secondary code");
        self.api.lookup(CodeKind::Secondary, code).await
    }

    /// Resolve a batch of codes, dropping the ones that do not resolve.
    ///
    /// Served entirely from `cached` when every code is there. Otherwise one
    /// primary-code request goes out per code; there is no secondary-code
    /// fallback on this path.
    pub async fn resolve_many(&self, cached: &[CountryRecord], codes: &[String]) -> Vec<CountryRecord> {
        if codes.is_empty() {
            return Vec::new();
        }

        let all_cached: Option<Vec<CountryRecord>> = codes
            .iter()
            .map(|code| find_cached(cached, code).cloned())
            .collect();
        if let Some(records) = all_cached {
            debug!(count = records.len(), "batch resolved from cache");
            return records;
        }

        let lookups = codes.iter().map(|code| async move {
            (code, self.api.lookup(CodeKind::Primary, code).await)
        });

        join_all(lookups)
            .await
            .into_iter()
            .filter_map(|(code, result)| match result {
                Ok(Some(record)) => Some(record),
                Ok(None) => {
                    debug!(code = code.as_str(), "no country for code, skipping");
                    None
                }
                Err(e) => {
                    warn!(code = code.as_str(), error = %e, "lookup failed, skipping");
                    None
                }
            })
            .collect()
    }
}
