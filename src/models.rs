//! Data models for country API responses and their normalized forms.

use serde::{Deserialize, Serialize};

/// Placeholder shown for any optional field the API left out.
pub const NOT_AVAILABLE: &str = "N/A";

/// Native spelling of a country name in one locale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeName {
    #[serde(default)]
    pub official: Option<String>,
    #[serde(default)]
    pub common: Option<String>,
}

/// Name block of a REST Countries v3.1 payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    pub common: String,
    #[serde(default)]
    pub official: Option<String>,
    /// Locale code -> native name, in the order the API sent them.
    #[serde(default, with = "ordered")]
    pub native_name: Option<Vec<(String, NativeName)>>,
}

/// Currency entry keyed by ISO 4217 code in the payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Flag image URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    #[serde(default)]
    pub png: Option<String>,
    #[serde(default)]
    pub svg: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// One country as returned by REST Countries v3.1.
///
/// Only `name.common`, `cca3` and `population` are required; everything else
/// may be missing or `null` depending on the `fields` list and the country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCountry {
    pub name: Name,
    pub cca3: String,
    #[serde(default)]
    pub cca2: Option<String>,
    #[serde(default)]
    pub tld: Option<Vec<String>>,
    #[serde(default, with = "ordered")]
    pub currencies: Option<Vec<(String, Currency)>>,
    #[serde(default)]
    pub capital: Option<Vec<String>>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub subregion: Option<String>,
    #[serde(default, with = "ordered")]
    pub languages: Option<Vec<(String, String)>>,
    #[serde(default)]
    pub borders: Option<Vec<String>>,
    pub population: u64,
    #[serde(default)]
    pub flags: Option<Flags>,
}

/// Currency entry of the v2-style payload served by the local mock.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyCurrency {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyLanguage {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub native_name: Option<String>,
}

/// One country in the v2 shape (flat name, string capital, list currencies).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyRawCountry {
    pub name: String,
    pub alpha3_code: String,
    #[serde(default)]
    pub alpha2_code: Option<String>,
    #[serde(default)]
    pub native_name: Option<String>,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub subregion: Option<String>,
    #[serde(default)]
    pub top_level_domain: Option<Vec<String>>,
    #[serde(default)]
    pub currencies: Option<Vec<LegacyCurrency>>,
    #[serde(default)]
    pub languages: Option<Vec<LegacyLanguage>>,
    #[serde(default)]
    pub borders: Option<Vec<String>>,
    pub population: u64,
    #[serde(default)]
    pub flags: Option<Flags>,
    #[serde(default)]
    pub flag: Option<String>,
}

/// Normalized country, independent of the upstream variant.
///
/// Every display string is already defaulted to [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub name: String,
    pub official_name: String,
    pub native_name: String,
    /// 3-letter code.
    pub code: String,
    /// 2-letter code, when the API sent one.
    pub secondary_code: Option<String>,
    pub flags: Flags,
    pub population: u64,
    pub region: String,
    pub subregion: String,
    pub capital: String,
    pub top_level_domain: String,
    pub currencies: String,
    pub languages: String,
    pub borders: Vec<String>,
}

impl CountryRecord {
    /// Primary or secondary code equality, case as given.
    pub fn has_code(&self, code: &str) -> bool {
        self.code == code || self.secondary_code.as_deref() == Some(code)
    }
}

/// List-view projection of a country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryOverview {
    pub name: String,
    pub code: String,
    pub flags: Flags,
    pub population: u64,
    pub region: String,
    pub capital: String,
}

impl From<&CountryRecord> for CountryOverview {
    fn from(record: &CountryRecord) -> Self {
        Self {
            name: record.name.clone(),
            code: record.code.clone(),
            flags: record.flags.clone(),
            population: record.population,
            region: record.region.clone(),
            capital: record.capital.clone(),
        }
    }
}

/// Display fields of the single-country view.
///
/// Population stays numeric; formatting happens in [`crate::view`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDetail {
    pub native_name: String,
    pub population: u64,
    pub region: String,
    pub sub_region: String,
    pub capital: String,
    pub top_level_domain: String,
    pub currencies: String,
    pub languages: String,
}

impl From<&CountryRecord> for CountryDetail {
    fn from(record: &CountryRecord) -> Self {
        Self {
            native_name: record.native_name.clone(),
            population: record.population,
            region: record.region.clone(),
            sub_region: record.subregion.clone(),
            capital: record.capital.clone(),
            top_level_domain: record.top_level_domain.clone(),
            currencies: record.currencies.clone(),
            languages: record.languages.clone(),
        }
    }
}

/// Serde adapter for JSON objects whose key order matters.
///
/// Deserializes `{"a": x, "b": y}` into `Some(vec![("a", x), ("b", y)])` and
/// `null` into `None`.
mod ordered {
    use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use serde::ser::{SerializeMap, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<S, T>(value: &Option<Vec<(String, T)>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: serde::Serialize,
    {
        match value {
            None => serializer.serialize_none(),
            Some(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Vec<(String, T)>>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de>,
    {
        struct OrderedVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for OrderedVisitor<T> {
            type Value = Option<Vec<(String, T)>>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object or null")
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
                d.deserialize_map(self)
            }

            fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, T>()? {
                    entries.push((key, value));
                }
                Ok(Some(entries))
            }
        }

        deserializer.deserialize_option(OrderedVisitor(PhantomData))
    }
}
