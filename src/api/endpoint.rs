//! URL construction for the two supported country APIs.

use clap::ValueEnum;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{DirectoryError, Result};

pub const REST_COUNTRIES_BASE: &str = "https://restcountries.com/v3.1/";
pub const LOCAL_MOCK_BASE: &str = "http://localhost:3000/";

const OVERVIEW_FIELDS: &str = "name,cca3,flags,population,region,capital";
const DETAIL_FIELDS: &str =
    "name,cca3,cca2,flags,population,region,subregion,capital,tld,currencies,languages,borders";

/// Most fields REST Countries accepts on `/all`.
pub const MAX_ALL_FIELDS: usize = 10;

/// The detail field set split into `/all`-sized parts; each part carries `cca3`.
const CATALOG_FIELDS: [&str; 2] = [
    "name,cca3,cca2,flags,population,region,subregion,capital,tld",
    "cca3,currencies,languages,borders",
];

/// Which upstream shape the base URL serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ApiVariant {
    /// REST Countries v3.1 (`/all`, `/name/{term}`, `/alpha/{code}`).
    RestCountries,
    /// json-server style mock serving v2-shaped records under `/countries`.
    LocalMock,
}

impl ApiVariant {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::RestCountries => REST_COUNTRIES_BASE,
            Self::LocalMock => LOCAL_MOCK_BASE,
        }
    }
}

/// Which country code a lookup filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    /// 3-letter code.
    Primary,
    /// 2-letter code.
    Secondary,
}

/// Builds request descriptors (URLs) for a base URL and API variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: Url,
    variant: ApiVariant,
}

impl Endpoint {
    pub fn new(base: &str, variant: ApiVariant) -> Result<Self> {
        let mut base = Url::parse(base).map_err(|e| DirectoryError::Config {
            message: format!("invalid base URL {base:?}: {e}"),
        })?;
        if base.cannot_be_a_base() {
            return Err(DirectoryError::Config {
                message: format!("base URL {base} cannot carry path segments"),
            });
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { base, variant })
    }

    pub fn variant(&self) -> ApiVariant {
        self.variant
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn url(&self, segments: &[&str], fields: Option<&str>, query: &[(&str, &str)]) -> String {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if let Some(fields) = fields {
            url.set_query(Some(&format!("fields={fields}")));
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url.into()
    }

    /// List query for the home view. An empty term means "all countries".
    ///
    /// The mock has no name endpoint, so the term goes to json-server's
    /// full-text `q` parameter instead.
    pub fn overview_url(&self, term: &str) -> String {
        match (self.variant, term.is_empty()) {
            (ApiVariant::RestCountries, true) => self.url(&["all"], Some(OVERVIEW_FIELDS), &[]),
            (ApiVariant::RestCountries, false) => {
                self.url(&["name", term], Some(OVERVIEW_FIELDS), &[])
            }
            (ApiVariant::LocalMock, true) => self.url(&["countries"], None, &[]),
            (ApiVariant::LocalMock, false) => self.url(&["countries"], None, &[("q", term)]),
        }
    }

    /// Requests that together return every country with the full detail
    /// field set, for the client-side cache. Parts are merged by `cca3`.
    pub fn catalog_urls(&self) -> Vec<String> {
        match self.variant {
            ApiVariant::RestCountries => CATALOG_FIELDS
                .iter()
                .map(|fields| self.url(&["all"], Some(fields), &[]))
                .collect(),
            ApiVariant::LocalMock => vec![self.url(&["countries"], None, &[])],
        }
    }

    /// Single-country query for the detail view.
    ///
    /// Mock records store upper-case codes and json-server matches exactly.
    pub fn detail_url(&self, code: &str) -> String {
        match self.variant {
            ApiVariant::RestCountries => self.url(&["alpha", code], Some(DETAIL_FIELDS), &[]),
            ApiVariant::LocalMock => {
                let code = code.to_uppercase();
                self.url(&["countries"], None, &[("alpha3Code", code.as_str())])
            }
        }
    }

    /// Code lookup used by the resolver; the code is sent exactly as given.
    pub fn lookup_url(&self, kind: CodeKind, code: &str) -> String {
        match (self.variant, kind) {
            (ApiVariant::RestCountries, CodeKind::Primary) => {
                self.url(&["alpha", code], Some(DETAIL_FIELDS), &[])
            }
            (ApiVariant::RestCountries, CodeKind::Secondary) => {
                self.url(&["alpha"], Some(DETAIL_FIELDS), &[("codes", code)])
            }
            (ApiVariant::LocalMock, CodeKind::Primary) => {
                self.url(&["countries"], None, &[("alpha3Code", code)])
            }
            (ApiVariant::LocalMock, CodeKind::Secondary) => {
                self.url(&["countries"], None, &[("alpha2Code", code)])
            }
        }
    }
}
