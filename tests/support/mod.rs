#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use country_directory::api::{ApiVariant, CountriesApi, Endpoint, Transport};
use country_directory::DirectoryError;

pub const BASE: &str = "http://stub.test/";

enum Canned {
    Json(Value),
    Fail(String),
}

/// In-process transport: canned bodies keyed by URL (minus the `fields`
/// parameter), optional gates to control arrival order, and a call log.
#[derive(Default)]
pub struct StubTransport {
    canned: Mutex<HashMap<String, Canned>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<Value>>>,
    calls: Mutex<Vec<String>>,
}

/// Drop the `fields=` query parameter so tests can key on the interesting part.
pub fn route_key(url: &str) -> String {
    match url.split_once('?') {
        None => url.to_string(),
        Some((path, query)) => {
            let rest: Vec<&str> = query
                .split('&')
                .filter(|pair| !pair.starts_with("fields="))
                .collect();
            if rest.is_empty() {
                path.to_string()
            } else {
                format!("{path}?{}", rest.join("&"))
            }
        }
    }
}

pub fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

impl StubTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, path: &str, body: Value) {
        self.canned
            .lock()
            .unwrap()
            .insert(url(path), Canned::Json(body));
    }

    pub fn fail(&self, path: &str, message: &str) {
        self.canned
            .lock()
            .unwrap()
            .insert(url(path), Canned::Fail(message.to_string()));
    }

    /// Hold the response for `path` until the returned sender fires.
    pub fn gate(&self, path: &str) -> oneshot::Sender<Value> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(url(path), rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get_json(&self, url: &str) -> country_directory::Result<Value> {
        let key = route_key(url);
        self.calls.lock().unwrap().push(key.clone());

        let gate = self.gates.lock().unwrap().remove(&key);
        if let Some(rx) = gate {
            return rx
                .await
                .map_err(|_| DirectoryError::transport(format!("gate for {key} dropped")));
        }

        match self.canned.lock().unwrap().get(&key) {
            Some(Canned::Json(body)) => Ok(body.clone()),
            Some(Canned::Fail(message)) => Err(DirectoryError::transport(message.clone())),
            None => Err(DirectoryError::not_found(key)),
        }
    }
}

pub fn api(stub: &Arc<StubTransport>) -> CountriesApi {
    api_for(stub, ApiVariant::RestCountries)
}

pub fn api_for(stub: &Arc<StubTransport>, variant: ApiVariant) -> CountriesApi {
    let transport: Arc<dyn Transport> = stub.clone();
    CountriesApi::new(transport, Endpoint::new(BASE, variant).unwrap())
}

/// v3.1-shaped payload with the fields the views care about.
pub fn country(common: &str, cca3: &str, cca2: &str, region: &str, borders: &[&str]) -> Value {
    json!({
        "name": {
            "common": common,
            "official": format!("Official {common}"),
            "nativeName": { "xxx": { "common": format!("Native {common}"), "official": common } }
        },
        "cca3": cca3,
        "cca2": cca2,
        "region": region,
        "subregion": format!("Sub {region}"),
        "capital": [format!("{common} City")],
        "population": 1000,
        "tld": [format!(".{}", cca2.to_lowercase())],
        "currencies": { "EUR": { "name": "Euro", "symbol": "€" } },
        "languages": { "xxx": format!("{common}ish") },
        "borders": borders,
        "flags": { "png": format!("https://flags.test/{cca2}.png"), "svg": format!("https://flags.test/{cca2}.svg") }
    })
}

pub fn europe() -> Value {
    json!([
        country("Germany", "DEU", "DE", "Europe", &["FRA", "AUT"]),
        country("France", "FRA", "FR", "Europe", &["DEU"]),
        country("Austria", "AUT", "AT", "Europe", &["DEU"]),
        country("Brazil", "BRA", "BR", "Americas", &[]),
    ])
}
