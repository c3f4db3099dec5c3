//! Country API access: transport port, URL builder and typed fetches.

mod client;
mod endpoint;

pub use client::{HttpTransport, Transport};
pub use endpoint::{
    ApiVariant, CodeKind, Endpoint, LOCAL_MOCK_BASE, MAX_ALL_FIELDS, REST_COUNTRIES_BASE,
};

use futures::future::try_join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{DirectoryError, Result};
use crate::models::{CountryOverview, CountryRecord, LegacyRawCountry, RawCountry};
use crate::normalize::{legacy_to_record, to_overview, to_record};

/// Typed access to a country API over any [`Transport`].
#[derive(Clone)]
pub struct CountriesApi {
    transport: Arc<dyn Transport>,
    endpoint: Endpoint,
}

/// Some endpoints answer with a bare object, others with a list.
fn into_items(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(_) => Ok(vec![body]),
        Value::Null => Ok(Vec::new()),
        other => Err(DirectoryError::Decode {
            source: serde::de::Error::custom(format!(
                "expected a country object or list, got {other}"
            )),
        }),
    }
}

fn code_of(item: &Value) -> Option<&str> {
    item.get("cca3")
        .or_else(|| item.get("alpha3Code"))
        .and_then(Value::as_str)
}

/// Fold the fields of `items` into the entries of `merged` with the same code.
/// Items whose code is not already present are dropped.
fn merge_by_code(merged: &mut Vec<Value>, items: Vec<Value>) {
    if merged.is_empty() {
        *merged = items;
        return;
    }
    let index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .filter_map(|(i, item)| code_of(item).map(|code| (code.to_string(), i)))
        .collect();

    for item in items {
        let Some(&i) = code_of(&item).and_then(|code| index.get(code)) else {
            debug!("catalog part entry without a known code, skipping");
            continue;
        };
        if let (Value::Object(target), Value::Object(fields)) = (&mut merged[i], item) {
            target.extend(fields);
        }
    }
}

impl CountriesApi {
    pub fn new(transport: Arc<dyn Transport>, endpoint: Endpoint) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Decode a response body into normalized records for this API variant.
    pub fn decode_records(&self, body: Value) -> Result<Vec<CountryRecord>> {
        let items = into_items(body)?;
        match self.endpoint.variant() {
            ApiVariant::RestCountries => {
                let raw: Vec<RawCountry> = serde_json::from_value(Value::Array(items))?;
                Ok(raw.iter().map(to_record).collect())
            }
            ApiVariant::LocalMock => {
                let raw: Vec<LegacyRawCountry> = serde_json::from_value(Value::Array(items))?;
                Ok(raw.iter().map(legacy_to_record).collect())
            }
        }
    }

    /// Fetch a list view from a URL built by [`Endpoint::overview_url`].
    pub async fn fetch_overviews(&self, url: &str) -> Result<Vec<CountryOverview>> {
        let body = self.transport.get_json(url).await?;
        let overviews: Vec<CountryOverview> = match self.endpoint.variant() {
            ApiVariant::RestCountries => {
                let raw: Vec<RawCountry> = serde_json::from_value(Value::Array(into_items(body)?))?;
                raw.iter().map(to_overview).collect()
            }
            ApiVariant::LocalMock => self
                .decode_records(body)?
                .iter()
                .map(CountryOverview::from)
                .collect(),
        };
        debug!(url, count = overviews.len(), "overviews fetched");
        Ok(overviews)
    }

    /// Fetch full records; an empty answer is returned as an empty list.
    pub async fn fetch_records(&self, url: &str) -> Result<Vec<CountryRecord>> {
        let body = self.transport.get_json(url).await?;
        self.decode_records(body)
    }

    /// Fetch every country with the full field set, merging split parts by code.
    pub async fn fetch_catalog(&self) -> Result<Vec<CountryRecord>> {
        let urls = self.endpoint.catalog_urls();
        let bodies = try_join_all(urls.iter().map(|url| self.transport.get_json(url))).await?;

        let mut merged = Vec::new();
        for body in bodies {
            merge_by_code(&mut merged, into_items(body)?);
        }
        let records = self.decode_records(Value::Array(merged))?;
        debug!(count = records.len(), parts = urls.len(), "catalog fetched");
        Ok(records)
    }

    /// Fetch exactly one country; zero results is [`DirectoryError::NotFound`].
    pub async fn fetch_detail(&self, url: &str) -> Result<CountryRecord> {
        self.fetch_records(url)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DirectoryError::not_found(url))
    }

    /// First country matching `code` on the given code kind, or `None`.
    pub async fn lookup(&self, kind: CodeKind, code: &str) -> Result<Option<CountryRecord>> {
        let url = self.endpoint.lookup_url(kind, code);
        match self.fetch_records(&url).await {
            Ok(records) => Ok(records.into_iter().next()),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
