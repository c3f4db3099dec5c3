//! View model builders: list filtering/sorting, region sets, display formatting.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::models::{CountryDetail, CountryOverview};

/// Folds a name for collation: transliterated to ASCII, lower-cased.
///
/// "Åland Islands" sorts next to "Aland", not after "Zimbabwe".
pub fn collation_key(name: &str) -> String {
    deunicode::deunicode(name).to_lowercase()
}

/// Locale-aware name ordering with a byte-order tie-break.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

/// Region filter (exact match, empty = all) followed by an ascending name sort.
pub fn overview_list(countries: &[CountryOverview], region: &str) -> Vec<CountryOverview> {
    let mut list: Vec<CountryOverview> = countries
        .iter()
        .filter(|c| region.is_empty() || c.region == region)
        .cloned()
        .collect();
    list.sort_by(|a, b| compare_names(&a.name, &b.name));
    list
}

/// Case-insensitive substring match on name or capital. Empty term keeps everything.
pub fn matches_search(country: &CountryOverview, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty()
        || country.name.to_lowercase().contains(&term)
        || country.capital.to_lowercase().contains(&term)
}

/// Client-side search, then [`overview_list`].
pub fn search_overviews(
    countries: &[CountryOverview],
    term: &str,
    region: &str,
) -> Vec<CountryOverview> {
    let hits: Vec<CountryOverview> = countries
        .iter()
        .filter(|c| matches_search(c, term))
        .cloned()
        .collect();
    overview_list(&hits, region)
}

/// Distinct non-empty regions of a list.
pub fn unique_regions(countries: &[CountryOverview]) -> BTreeSet<String> {
    countries
        .iter()
        .filter(|c| !c.region.is_empty())
        .map(|c| c.region.clone())
        .collect()
}

/// Thousands-separated population, e.g. `83,240,525`.
pub fn format_population(population: u64) -> String {
    let digits = population.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Labelled rows of the detail view, in display order.
pub fn detail_rows(detail: &CountryDetail) -> Vec<(&'static str, String)> {
    vec![
        ("Native Name", detail.native_name.clone()),
        ("Population", format_population(detail.population)),
        ("Region", detail.region.clone()),
        ("Sub Region", detail.sub_region.clone()),
        ("Capital", detail.capital.clone()),
        ("Top Level Domain", detail.top_level_domain.clone()),
        ("Currencies", detail.currencies.clone()),
        ("Languages", detail.languages.clone()),
    ]
}
