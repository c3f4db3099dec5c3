//! Field normalizer: raw API payloads into display-ready records.
//!
//! All functions here are pure and total over the optional-field space. An
//! absent list/map and an empty one normalize identically to [`NOT_AVAILABLE`].

use crate::models::{
    CountryDetail, CountryOverview, CountryRecord, Flags, LegacyRawCountry, RawCountry,
    NOT_AVAILABLE,
};

/// Joins non-blank values with `", "`, or returns the placeholder when nothing is left.
fn join_or_placeholder<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parts: Vec<String> = values
        .into_iter()
        .filter_map(|v| {
            let v = v.as_ref().trim();
            (!v.is_empty()).then(|| v.to_string())
        })
        .collect();

    if parts.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        parts.join(", ")
    }
}

fn or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

fn first_capital(capital: Option<&[String]>) -> String {
    or_placeholder(capital.and_then(|c| c.first()).map(String::as_str))
}

/// First native name in payload order, falling back to the common name.
///
/// The API does not promise a stable key order, so which locale wins can
/// change between calls for multilingual countries.
fn native_name(raw: &RawCountry) -> String {
    raw.name
        .native_name
        .as_ref()
        .and_then(|names| names.first())
        .and_then(|(_, n)| {
            let present = |s: &&str| !s.trim().is_empty();
            n.common
                .as_deref()
                .filter(present)
                .or(n.official.as_deref().filter(present))
        })
        .unwrap_or(&raw.name.common)
        .to_string()
}

/// List projection straight from a (possibly narrow) v3.1 payload.
pub fn to_overview(raw: &RawCountry) -> CountryOverview {
    CountryOverview {
        name: raw.name.common.clone(),
        code: raw.cca3.clone(),
        flags: raw.flags.clone().unwrap_or_default(),
        population: raw.population,
        region: raw.region.clone().unwrap_or_default(),
        capital: first_capital(raw.capital.as_deref()),
    }
}

/// Full normalized record from a v3.1 payload.
pub fn to_record(raw: &RawCountry) -> CountryRecord {
    CountryRecord {
        name: raw.name.common.clone(),
        official_name: raw
            .name
            .official
            .clone()
            .unwrap_or_else(|| raw.name.common.clone()),
        native_name: native_name(raw),
        code: raw.cca3.clone(),
        secondary_code: raw.cca2.clone(),
        flags: raw.flags.clone().unwrap_or_default(),
        population: raw.population,
        region: raw.region.clone().unwrap_or_default(),
        subregion: or_placeholder(raw.subregion.as_deref()),
        capital: first_capital(raw.capital.as_deref()),
        top_level_domain: join_or_placeholder(raw.tld.iter().flatten()),
        currencies: join_or_placeholder(
            raw.currencies
                .iter()
                .flatten()
                .filter_map(|(_, c)| c.name.as_deref()),
        ),
        languages: join_or_placeholder(raw.languages.iter().flatten().map(|(_, name)| name)),
        borders: raw.borders.clone().unwrap_or_default(),
    }
}

/// Detail view model from a v3.1 payload.
pub fn to_detail(raw: &RawCountry) -> CountryDetail {
    CountryDetail::from(&to_record(raw))
}

/// Full normalized record from the v2-style mock payload.
pub fn legacy_to_record(raw: &LegacyRawCountry) -> CountryRecord {
    let flags = match (&raw.flags, &raw.flag) {
        (Some(flags), _) => flags.clone(),
        (None, Some(svg)) => Flags {
            svg: Some(svg.clone()),
            ..Flags::default()
        },
        (None, None) => Flags::default(),
    };

    CountryRecord {
        name: raw.name.clone(),
        official_name: raw.name.clone(),
        native_name: raw
            .native_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| raw.name.clone()),
        code: raw.alpha3_code.clone(),
        secondary_code: raw.alpha2_code.clone(),
        flags,
        population: raw.population,
        region: raw.region.clone().unwrap_or_default(),
        subregion: or_placeholder(raw.subregion.as_deref()),
        capital: or_placeholder(raw.capital.as_deref()),
        top_level_domain: join_or_placeholder(raw.top_level_domain.iter().flatten()),
        currencies: join_or_placeholder(
            raw.currencies
                .iter()
                .flatten()
                .filter_map(|c| c.name.as_deref()),
        ),
        languages: join_or_placeholder(
            raw.languages
                .iter()
                .flatten()
                .filter_map(|l| l.name.as_deref()),
        ),
        borders: raw.borders.clone().unwrap_or_default(),
    }
}
