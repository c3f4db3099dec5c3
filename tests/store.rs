mod support;

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use country_directory::{
    follow_route, ApiVariant, CachedDirectory, DirectoryBackend, FetchState, RemoteDirectory,
};
use support::{api, api_for, country, europe, StubTransport};

fn names(state: FetchState<Vec<country_directory::CountryOverview>>) -> Vec<String> {
    state
        .value()
        .map(|list| list.iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn empty_search_lists_everything_sorted() {
    let stub = StubTransport::new();
    stub.respond("all", europe());
    let directory = RemoteDirectory::new(api(&stub));

    directory.set_search_term("").settled().await;

    assert_eq!(
        names(directory.snapshot().countries()),
        vec!["Austria", "Brazil", "France", "Germany"]
    );
    assert_eq!(stub.calls(), vec!["http://stub.test/all".to_string()]);
}

#[tokio::test]
async fn region_filter_needs_no_request() {
    let stub = StubTransport::new();
    stub.respond("all", europe());
    let directory = RemoteDirectory::new(api(&stub));
    directory.set_search_term("").settled().await;

    directory.set_region("Americas");

    let snapshot = directory.snapshot();
    assert_eq!(names(snapshot.countries()), vec!["Brazil"]);
    assert_eq!(
        snapshot.regions().into_iter().collect::<Vec<_>>(),
        vec!["Americas", "Europe"]
    );
    assert_eq!(stub.call_count(), 1);
}

#[tokio::test]
async fn search_term_goes_to_the_name_endpoint() {
    let stub = StubTransport::new();
    stub.respond("name/ger", json!([country("Germany", "DEU", "DE", "Europe", &[])]));
    let directory = RemoteDirectory::new(api(&stub));

    directory.set_search_term("ger").settled().await;

    assert_eq!(names(directory.snapshot().countries()), vec!["Germany"]);
    assert_eq!(stub.calls(), vec!["http://stub.test/name/ger".to_string()]);
}

#[tokio::test]
async fn unchanged_descriptor_issues_nothing() {
    let stub = StubTransport::new();
    stub.respond("name/ger", json!([country("Germany", "DEU", "DE", "Europe", &[])]));
    let directory = RemoteDirectory::new(api(&stub));

    directory.set_search_term("ger").settled().await;
    let again = directory.set_search_term("ger ");

    assert!(again.is_idle());
    assert_eq!(directory.snapshot().query.search_term, "ger ");
    assert_eq!(stub.call_count(), 1);
}

#[tokio::test]
async fn loading_is_visible_while_in_flight() {
    let stub = StubTransport::new();
    let release = stub.gate("all");
    let directory = RemoteDirectory::new(api(&stub));

    let pending = directory.set_search_term("");
    assert!(directory.snapshot().countries().is_loading());

    release.send(europe()).unwrap();
    pending.settled().await;
    assert_eq!(names(directory.snapshot().countries()).len(), 4);
}

#[tokio::test]
async fn late_response_for_superseded_code_is_discarded() {
    let stub = StubTransport::new();
    let release_a = stub.gate("alpha/aaa");
    let release_b = stub.gate("alpha/bbb");
    let directory = RemoteDirectory::new(api(&stub));

    let first = directory.set_country_code("aaa");
    let second = directory.set_country_code("bbb");

    release_b
        .send(country("Bravo", "BBB", "BB", "Europe", &[]))
        .unwrap();
    second.settled().await;
    release_a
        .send(country("Alpha", "AAA", "AA", "Europe", &[]))
        .unwrap();
    first.settled().await;

    let snapshot = directory.snapshot();
    assert_eq!(snapshot.query.country_code, "bbb");
    assert_eq!(snapshot.detail.state().value().map(|r| r.code.as_str()), Some("BBB"));
}

#[tokio::test]
async fn early_response_for_superseded_code_never_lands() {
    let stub = StubTransport::new();
    let release_a = stub.gate("alpha/aaa");
    let release_b = stub.gate("alpha/bbb");
    let directory = RemoteDirectory::new(api(&stub));

    let first = directory.set_country_code("aaa");
    let second = directory.set_country_code("bbb");

    release_a
        .send(country("Alpha", "AAA", "AA", "Europe", &[]))
        .unwrap();
    first.settled().await;
    assert!(directory.snapshot().detail.state().is_loading());

    release_b
        .send(country("Bravo", "BBB", "BB", "Europe", &[]))
        .unwrap();
    second.settled().await;
    assert_eq!(
        directory.snapshot().detail.state().value().map(|r| r.name.as_str()),
        Some("Bravo")
    );
}

#[tokio::test]
async fn country_code_is_trimmed_and_lowercased() {
    let stub = StubTransport::new();
    stub.respond("alpha/deu", country("Germany", "DEU", "DE", "Europe", &["FRA"]));
    let directory = RemoteDirectory::new(api(&stub));

    directory.set_country_code(" DEU ").settled().await;

    let snapshot = directory.snapshot();
    assert_eq!(snapshot.query.country_code, "deu");
    assert_eq!(stub.calls(), vec!["http://stub.test/alpha/deu".to_string()]);

    let record = snapshot.detail.state().value().unwrap();
    assert_eq!(record.name, "Germany");
    assert_eq!(record.borders, vec!["FRA".to_string()]);

    let detail = snapshot.detail_view();
    let detail = detail.value().unwrap();
    assert_eq!(detail.currencies, "Euro");
    assert_eq!(detail.capital, "Germany City");
}

#[tokio::test]
async fn clearing_the_code_resets_detail_and_orphans_fetch() {
    let stub = StubTransport::new();
    let release = stub.gate("alpha/deu");
    let directory = RemoteDirectory::new(api(&stub));

    let pending = directory.set_country_code("deu");
    assert!(directory.set_country_code("").is_idle());

    release
        .send(country("Germany", "DEU", "DE", "Europe", &[]))
        .unwrap();
    pending.settled().await;

    assert!(matches!(
        directory.snapshot().detail.state(),
        FetchState::NotRequested
    ));
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let stub = StubTransport::new();
    let directory = RemoteDirectory::new(api(&stub));

    directory.set_country_code("zzz").settled().await;

    let snapshot = directory.snapshot();
    assert!(snapshot.detail.state().is_not_found());
    assert!(snapshot.detail_view().is_not_found());
}

#[tokio::test]
async fn load_retries_after_an_error() {
    let stub = StubTransport::new();
    stub.fail("all", "connection refused");
    let directory = RemoteDirectory::new(api(&stub));

    directory.set_search_term("").settled().await;
    let errored = directory.snapshot().countries();
    assert!(errored.error().is_some());
    assert!(!errored.is_not_found());

    stub.respond("all", europe());
    directory.load().settled().await;

    assert_eq!(names(directory.snapshot().countries()).len(), 4);
    assert_eq!(stub.call_count(), 2);
}

#[tokio::test]
async fn border_countries_fill_the_cache() {
    let stub = StubTransport::new();
    stub.respond("alpha/deu", country("Germany", "DEU", "DE", "Europe", &["FRA", "AUT"]));
    stub.respond("alpha/FRA", country("France", "FRA", "FR", "Europe", &["DEU"]));
    stub.respond("alpha/AUT", country("Austria", "AUT", "AT", "Europe", &["DEU"]));
    let directory = RemoteDirectory::new(api(&stub));
    directory.set_country_code("deu").settled().await;

    let neighbours = directory.border_countries().await;
    let codes: Vec<_> = neighbours.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["FRA", "AUT"]);
    assert_eq!(stub.call_count(), 3);

    let again = directory.border_countries().await;
    assert_eq!(again.len(), 2);
    assert_eq!(stub.call_count(), 3);
}

#[tokio::test]
async fn no_selection_has_no_borders() {
    let stub = StubTransport::new();
    let directory = RemoteDirectory::new(api(&stub));

    assert!(directory.border_countries().await.is_empty());
    assert_eq!(stub.call_count(), 0);
}

#[tokio::test]
async fn cached_backend_filters_in_memory() {
    let stub = StubTransport::new();
    stub.respond("all", europe());
    let directory = CachedDirectory::new(api(&stub));

    directory.load().settled().await;
    assert!(directory.set_search_term("fr").is_idle());
    assert_eq!(names(directory.snapshot().countries()), vec!["France"]);

    directory.set_search_term("");
    directory.set_region("Europe");
    assert_eq!(
        names(directory.snapshot().countries()),
        vec!["Austria", "France", "Germany"]
    );
    assert_eq!(directory.snapshot().catalog().len(), 4);
    assert_eq!(
        stub.calls(),
        vec!["http://stub.test/all".to_string(), "http://stub.test/all".to_string()]
    );
}

#[tokio::test]
async fn cached_backend_search_matches_capital() {
    let stub = StubTransport::new();
    stub.respond("all", europe());
    let directory = CachedDirectory::new(api(&stub));
    directory.load().settled().await;

    directory.set_search_term("BRAZIL CITY");

    assert_eq!(names(directory.snapshot().countries()), vec!["Brazil"]);
}

#[tokio::test]
async fn cached_backend_resolves_codes_without_network() {
    let stub = StubTransport::new();
    stub.respond("all", europe());
    let directory = CachedDirectory::new(api(&stub));
    directory.load().settled().await;

    directory.set_country_code("DEU").settled().await;
    let snapshot = directory.snapshot();
    assert_eq!(snapshot.query.country_code, "deu");
    assert_eq!(snapshot.detail.state().value().map(|r| r.name.as_str()), Some("Germany"));

    directory.set_country_code("FR").settled().await;
    assert_eq!(
        directory.snapshot().detail.state().value().map(|r| r.code.as_str()),
        Some("FRA")
    );

    let neighbours = directory.border_countries().await;
    assert_eq!(neighbours.len(), 1);
    assert_eq!(stub.call_count(), 2);
}

#[tokio::test]
async fn cached_backend_falls_back_to_the_api() {
    let stub = StubTransport::new();
    stub.respond("alpha?codes=PT", json!([country("Portugal", "PRT", "PT", "Europe", &[])]));
    let directory = CachedDirectory::new(api(&stub));

    directory.set_country_code("PT").settled().await;

    assert_eq!(
        directory.snapshot().detail.state().value().map(|r| r.code.as_str()),
        Some("PRT")
    );
    assert_eq!(
        stub.calls(),
        vec![
            "http://stub.test/alpha/PT".to_string(),
            "http://stub.test/alpha?codes=PT".to_string()
        ]
    );
}

#[tokio::test]
async fn cached_catalog_merges_split_parts() {
    let stub = StubTransport::new();
    stub.respond("all", europe());
    let directory = CachedDirectory::new(api(&stub));

    directory.load().settled().await;

    let snapshot = directory.snapshot();
    let germany = snapshot
        .catalog()
        .iter()
        .find(|c| c.code == "DEU")
        .unwrap();
    assert_eq!(germany.borders, vec!["FRA".to_string(), "AUT".to_string()]);
    assert_eq!(germany.currencies, "Euro");
    assert_eq!(germany.capital, "Germany City");
}

#[tokio::test]
async fn cached_catalog_fails_when_a_part_fails() {
    let stub = StubTransport::new();
    stub.fail("all", "bad request");
    let directory = CachedDirectory::new(api(&stub));

    directory.load().settled().await;

    assert!(directory.snapshot().countries().error().is_some());
    assert!(directory.snapshot().catalog().is_empty());
}

fn legacy(
    name: &str,
    alpha3: &str,
    alpha2: &str,
    capital: &str,
    borders: &[&str],
) -> serde_json::Value {
    json!({
        "name": name,
        "alpha3Code": alpha3,
        "alpha2Code": alpha2,
        "nativeName": format!("Native {name}"),
        "capital": capital,
        "region": "Europe",
        "subregion": "Western Europe",
        "population": 1000,
        "topLevelDomain": [format!(".{}", alpha2.to_lowercase())],
        "currencies": [{ "code": "EUR", "name": "Euro", "symbol": "€" }],
        "languages": [{ "name": format!("{name}ish"), "nativeName": name }],
        "borders": borders,
        "flag": format!("https://flags.test/{alpha2}.svg")
    })
}

#[tokio::test]
async fn local_mock_serves_the_cached_backend() {
    let stub = StubTransport::new();
    stub.respond(
        "countries",
        json!([
            legacy("Germany", "DEU", "DE", "Berlin", &["FRA"]),
            legacy("France", "FRA", "FR", "Paris", &["DEU"]),
        ]),
    );
    let directory = CachedDirectory::new(api_for(&stub, ApiVariant::LocalMock));

    directory.load().settled().await;
    assert_eq!(stub.calls(), vec!["http://stub.test/countries".to_string()]);

    directory.set_search_term("berlin");
    assert_eq!(names(directory.snapshot().countries()), vec!["Germany"]);

    directory.set_country_code("DEU").settled().await;
    let snapshot = directory.snapshot();
    let record = snapshot.detail.state().value().unwrap();
    assert_eq!(record.capital, "Berlin");
    assert_eq!(record.native_name, "Native Germany");
    assert_eq!(record.secondary_code.as_deref(), Some("DE"));
    let detail = snapshot.detail_view();
    assert_eq!(detail.value().unwrap().top_level_domain, ".de");

    let neighbours = directory.border_countries().await;
    assert_eq!(neighbours.len(), 1);
    assert_eq!(neighbours[0].name, "France");
    assert_eq!(stub.call_count(), 1);
}

#[tokio::test]
async fn local_mock_lookup_falls_back_to_alpha2() {
    let stub = StubTransport::new();
    stub.respond("countries?alpha3Code=ES", json!([]));
    stub.respond(
        "countries?alpha2Code=ES",
        json!([legacy("Spain", "ESP", "ES", "Madrid", &[])]),
    );
    let directory = CachedDirectory::new(api_for(&stub, ApiVariant::LocalMock));

    directory.set_country_code("ES").settled().await;

    assert_eq!(
        directory.snapshot().detail.state().value().map(|r| r.code.as_str()),
        Some("ESP")
    );
    assert_eq!(
        stub.calls(),
        vec![
            "http://stub.test/countries?alpha3Code=ES".to_string(),
            "http://stub.test/countries?alpha2Code=ES".to_string()
        ]
    );
}

#[tokio::test]
async fn subscribers_see_settled_results() {
    let stub = StubTransport::new();
    stub.respond("all", europe());
    let directory = RemoteDirectory::new(api(&stub));
    let mut updates = directory.subscribe();

    drop(directory.set_search_term(""));

    let seen = tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|s| s.overview.state().value().is_some()),
    )
    .await
    .expect("overview never settled")
    .unwrap()
    .overview
    .state()
    .value()
    .map(Vec::len);
    assert_eq!(seen, Some(4));
}

#[tokio::test]
async fn route_changes_drive_the_selected_country() {
    let stub = StubTransport::new();
    stub.respond("alpha/deu", country("Germany", "DEU", "DE", "Europe", &[]));
    stub.respond("alpha/fra", country("France", "FRA", "FR", "Europe", &[]));
    let directory: Arc<dyn DirectoryBackend> = Arc::new(RemoteDirectory::new(api(&stub)));
    let mut updates = directory.subscribe();

    let (route, route_rx) = watch::channel(String::new());
    let follower = follow_route(Arc::clone(&directory), route_rx);

    route.send("DEU".to_string()).unwrap();
    tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|s| s.detail.state().value().is_some_and(|r| r.code == "DEU")),
    )
    .await
    .expect("first route never applied")
    .unwrap();

    route.send("fra".to_string()).unwrap();
    tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|s| s.detail.state().value().is_some_and(|r| r.code == "FRA")),
    )
    .await
    .expect("second route never applied")
    .unwrap();

    drop(route);
    tokio::time::timeout(Duration::from_secs(5), follower)
        .await
        .expect("follower did not stop")
        .unwrap();
    assert_eq!(directory.snapshot().query.country_code, "fra");
}
