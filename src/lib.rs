//! Country directory core.
//!
//! Fetches countries from REST Countries (or a local json-server mock),
//! normalizes the loosely-typed payloads into display-ready records, and keeps
//! a reactive store of search term, region and selected country whose derived
//! requests never let a superseded response overwrite newer state.
//!
//! ```no_run
//! use country_directory::config::DirectoryConfig;
//! use country_directory::DirectoryBackend;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let directory = DirectoryConfig::default().backend()?;
//! directory.set_search_term("ger").settled().await;
//! directory.set_region("Europe");
//! for country in directory.snapshot().countries().value().into_iter().flatten() {
//!     println!("{} ({})", country.name, country.code);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod resolver;
pub mod resource;
pub mod store;
pub mod theme;
pub mod view;

pub use api::{ApiVariant, CountriesApi, Endpoint, HttpTransport, Transport};
pub use error::{DirectoryError, Result};
pub use models::{CountryDetail, CountryOverview, CountryRecord, RawCountry, NOT_AVAILABLE};
pub use resolver::CountryResolver;
pub use resource::FetchState;
pub use store::{
    follow_route, CachedDirectory, DirectoryBackend, DirectorySnapshot, Pending, QueryState,
    RemoteDirectory,
};
pub use theme::{Theme, ThemePreference};
