//! End-to-end harvest runs against wiremock and the in-memory catalog.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use mplscoffee_core::{
    BoundingBox, CatalogEntry, CatalogStore, DetailRecord, MissingDataPolicy, ReconcileOutcome,
};
use mplscoffee_harvester::{Harvester, HarvestError, MemoryCatalog};
use mplscoffee_places::{PlacesClient, PlacesError, RetryPolicy};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn run_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 3, 0, 0).unwrap()
}

fn seeds(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}

fn client(server: &MockServer) -> PlacesClient {
    PlacesClient::with_base_url("test-key", 30, RetryPolicy::NONE, &server.uri())
        .expect("client construction should not fail")
}

fn hit(place_id: &str, lat: f64, lng: f64) -> serde_json::Value {
    serde_json::json!({
        "place_id": place_id,
        "name": format!("Cafe {place_id}"),
        "geometry": { "location": { "lat": lat, "lng": lng } }
    })
}

fn detail_body(name: &str, periods: usize) -> serde_json::Value {
    let periods: Vec<serde_json::Value> = (0..periods)
        .map(|day| {
            serde_json::json!({
                "open": { "day": day, "time": "0700" },
                "close": { "day": day, "time": "1700" }
            })
        })
        .collect();
    serde_json::json!({
        "status": "OK",
        "result": {
            "name": name,
            "formatted_address": "Minneapolis, MN",
            "rating": 4.5,
            "user_ratings_total": 10,
            "geometry": { "location": { "lat": 44.98, "lng": -93.27 } },
            "opening_hours": { "periods": periods, "weekday_text": ["Monday: 7 AM – 5 PM"] }
        }
    })
}

async fn mount_geocode(server: &MockServer, seed: &str, location: Option<(f64, f64)>) {
    let body = match location {
        Some((lat, lng)) => serde_json::json!({
            "status": "OK",
            "results": [{ "geometry": { "location": { "lat": lat, "lng": lng } } }]
        }),
        None => serde_json::json!({ "status": "ZERO_RESULTS", "results": [] }),
    };
    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .and(query_param("address", seed))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_search(server: &MockServer, location: &str, hits: Vec<serde_json::Value>) {
    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .and(query_param("location", location))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "OK", "results": hits })),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_details(server: &MockServer, place_id: &str, body: serde_json::Value, times: u64) {
    Mock::given(method("GET"))
        .and(path("/place/details/json"))
        .and(query_param("place_id", place_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn seed_to_catalog_keeps_only_in_bounds_places() {
    let server = MockServer::start().await;
    mount_geocode(&server, "55401", Some((44.98, -93.27))).await;
    mount_search(
        &server,
        "44.98,-93.27",
        vec![hit("inbox", 44.98, -93.27), hit("outbox", 45.5, -93.27)],
    )
    .await;
    mount_details(&server, "inbox", detail_body("Inbox Coffee", 5), 1).await;
    mount_details(&server, "outbox", detail_body("Far Away", 1), 0).await;

    let places = client(&server);
    let catalog = MemoryCatalog::new();
    let harvester = Harvester::new(
        &places,
        &catalog,
        BoundingBox::MINNEAPOLIS,
        MissingDataPolicy::Skip,
    );

    let report = harvester
        .run(&seeds(&["55401"]), run_at())
        .await
        .expect("run should succeed");

    assert_eq!(report.seeds_processed, 1);
    assert_eq!(report.candidates_seen, 2);
    assert_eq!(report.candidates_out_of_bounds, 1);
    assert_eq!(report.candidates_unique, 1);
    assert_eq!(report.entries_created, 1);

    assert_eq!(catalog.len(), 1);
    let entry = catalog.get("inbox").expect("in-bounds place is stored");
    assert_eq!(entry.name, "Inbox Coffee");
    assert_eq!(entry.hours.len(), 5);
    assert_eq!(entry.last_updated, Some(run_at()));
    assert!(entry.is_good.is_none());
    assert!(catalog.get("outbox").is_none());
}

#[tokio::test]
async fn overlapping_seeds_fetch_each_place_once() {
    let server = MockServer::start().await;
    mount_geocode(&server, "55401", Some((44.98, -93.27))).await;
    mount_geocode(&server, "55403", Some((44.97, -93.28))).await;
    mount_search(
        &server,
        "44.98,-93.27",
        vec![hit("a", 44.98, -93.27), hit("shared", 44.975, -93.275)],
    )
    .await;
    mount_search(
        &server,
        "44.97,-93.28",
        vec![hit("shared", 44.975, -93.275), hit("b", 44.97, -93.28)],
    )
    .await;
    for id in ["a", "shared", "b"] {
        mount_details(&server, id, detail_body(id, 1), 1).await;
    }

    let places = client(&server);
    let catalog = MemoryCatalog::new();
    let report = Harvester::new(
        &places,
        &catalog,
        BoundingBox::MINNEAPOLIS,
        MissingDataPolicy::Skip,
    )
    .run(&seeds(&["55401", "55403"]), run_at())
    .await
    .unwrap();

    assert_eq!(report.candidates_seen, 4);
    assert_eq!(report.candidates_duplicate, 1);
    assert_eq!(report.candidates_unique, 3);
    assert_eq!(report.entries_reconciled(), 3);
    assert_eq!(catalog.len(), 3);
}

#[tokio::test]
async fn ungeocodable_seed_is_skipped_under_skip_policy() {
    let server = MockServer::start().await;
    mount_geocode(&server, "99999", None).await;
    mount_geocode(&server, "55401", Some((44.98, -93.27))).await;
    mount_search(&server, "44.98,-93.27", vec![hit("a", 44.98, -93.27)]).await;
    mount_details(&server, "a", detail_body("A", 1), 1).await;

    let places = client(&server);
    let catalog = MemoryCatalog::new();
    let report = Harvester::new(
        &places,
        &catalog,
        BoundingBox::MINNEAPOLIS,
        MissingDataPolicy::Skip,
    )
    .run(&seeds(&["99999", "55401"]), run_at())
    .await
    .unwrap();

    assert_eq!(report.seeds_skipped, 1);
    assert_eq!(report.seeds_processed, 1);
    assert_eq!(catalog.len(), 1);
}

#[tokio::test]
async fn ungeocodable_seed_aborts_under_abort_policy() {
    let server = MockServer::start().await;
    mount_geocode(&server, "99999", None).await;

    let places = client(&server);
    let catalog = MemoryCatalog::new();
    let err = Harvester::new(
        &places,
        &catalog,
        BoundingBox::MINNEAPOLIS,
        MissingDataPolicy::Abort,
    )
    .run(&seeds(&["99999"]), run_at())
    .await
    .unwrap_err();

    assert!(matches!(err, HarvestError::SeedNotGeocoded { ref seed } if seed == "99999"));
    assert!(catalog.is_empty());
}

#[tokio::test]
async fn missing_detail_skips_one_place_and_keeps_the_rest() {
    let server = MockServer::start().await;
    mount_geocode(&server, "55401", Some((44.98, -93.27))).await;
    mount_search(
        &server,
        "44.98,-93.27",
        vec![hit("a-good", 44.98, -93.27), hit("b-gone", 44.97, -93.27)],
    )
    .await;
    mount_details(&server, "a-good", detail_body("Good", 2), 1).await;
    mount_details(&server, "b-gone", serde_json::json!({ "status": "OK" }), 1).await;

    let places = client(&server);
    let catalog = MemoryCatalog::new();
    let report = Harvester::new(
        &places,
        &catalog,
        BoundingBox::MINNEAPOLIS,
        MissingDataPolicy::Skip,
    )
    .run(&seeds(&["55401"]), run_at())
    .await
    .unwrap();

    assert_eq!(report.entries_created, 1);
    assert_eq!(report.entries_skipped, 1);
    assert!(catalog.get("a-good").is_some());
    assert!(catalog.get("b-gone").is_none());
}

#[tokio::test]
async fn missing_detail_aborts_but_keeps_committed_entries() {
    let server = MockServer::start().await;
    mount_geocode(&server, "55401", Some((44.98, -93.27))).await;
    // Candidates are visited in place_id order: "a-good" before "b-gone".
    mount_search(
        &server,
        "44.98,-93.27",
        vec![hit("b-gone", 44.97, -93.27), hit("a-good", 44.98, -93.27)],
    )
    .await;
    mount_details(&server, "a-good", detail_body("Good", 2), 1).await;
    mount_details(&server, "b-gone", serde_json::json!({ "status": "OK" }), 1).await;

    let places = client(&server);
    let catalog = MemoryCatalog::new();
    let err = Harvester::new(
        &places,
        &catalog,
        BoundingBox::MINNEAPOLIS,
        MissingDataPolicy::Abort,
    )
    .run(&seeds(&["55401"]), run_at())
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        HarvestError::Places {
            source: PlacesError::MissingDetail { .. },
            ..
        }
    ));
    assert!(catalog.get("a-good").is_some(), "earlier entry stays committed");
}

#[tokio::test]
async fn transport_failure_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let places = client(&server);
    let catalog = MemoryCatalog::new();
    let err = Harvester::new(
        &places,
        &catalog,
        BoundingBox::MINNEAPOLIS,
        MissingDataPolicy::Skip,
    )
    .run(&seeds(&["55401"]), run_at())
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        HarvestError::Places {
            source: PlacesError::Http(_),
            ..
        }
    ));
}

#[tokio::test]
async fn rerun_updates_existing_entries_and_preserves_curation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/geocode/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [{ "geometry": { "location": { "lat": 44.98, "lng": -93.27 } } }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [hit("a", 44.98, -93.27)]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/place/details/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body("A", 3)))
        .mount(&server)
        .await;

    let places = client(&server);
    let catalog = MemoryCatalog::new();
    let mut curated = CatalogEntry::new("a");
    curated.is_good = Some(true);
    catalog.insert(curated);

    let harvester = Harvester::new(
        &places,
        &catalog,
        BoundingBox::MINNEAPOLIS,
        MissingDataPolicy::Skip,
    );
    let first = harvester.run(&seeds(&["55401"]), run_at()).await.unwrap();
    let later = run_at() + chrono::Duration::days(7);
    let second = harvester.run(&seeds(&["55401"]), later).await.unwrap();

    assert_eq!(first.entries_updated, 1);
    assert_eq!(second.entries_updated, 1);
    let entry = catalog.get("a").unwrap();
    assert_eq!(entry.is_good, Some(true));
    assert_eq!(entry.last_updated, Some(later));
    assert_eq!(entry.hours.len(), 3);
    assert_eq!(catalog.hour_rows().len(), 3);
}

#[tokio::test]
async fn empty_seed_list_is_rejected() {
    let server = MockServer::start().await;
    let places = client(&server);
    let catalog = MemoryCatalog::new();
    let err = Harvester::new(
        &places,
        &catalog,
        BoundingBox::MINNEAPOLIS,
        MissingDataPolicy::Skip,
    )
    .run(&[], run_at())
    .await
    .unwrap_err();
    assert!(matches!(err, HarvestError::NoSeeds));
}

/// Store that refuses writes for selected places.
struct FlakyStore {
    inner: MemoryCatalog,
    failing: HashSet<String>,
    attempts: Mutex<Vec<String>>,
}

#[derive(Debug)]
struct Refused;

impl std::fmt::Display for Refused {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "write refused")
    }
}

impl std::error::Error for Refused {}

impl CatalogStore for FlakyStore {
    type Error = Refused;

    async fn reconcile(
        &self,
        record: &DetailRecord,
        run_at: DateTime<Utc>,
    ) -> Result<ReconcileOutcome, Self::Error> {
        self.attempts.lock().unwrap().push(record.place_id.clone());
        if self.failing.contains(&record.place_id) {
            return Err(Refused);
        }
        Ok(self.inner.reconcile(record, run_at).await.unwrap())
    }
}

#[tokio::test]
async fn persistence_failure_is_isolated_to_one_entry() {
    let server = MockServer::start().await;
    mount_geocode(&server, "55401", Some((44.98, -93.27))).await;
    mount_search(
        &server,
        "44.98,-93.27",
        vec![
            hit("a", 44.98, -93.27),
            hit("b-broken", 44.97, -93.27),
            hit("c", 44.96, -93.27),
        ],
    )
    .await;
    for id in ["a", "b-broken", "c"] {
        mount_details(&server, id, detail_body(id, 1), 1).await;
    }

    let places = client(&server);
    let store = FlakyStore {
        inner: MemoryCatalog::new(),
        failing: HashSet::from(["b-broken".to_string()]),
        attempts: Mutex::new(Vec::new()),
    };
    let report = Harvester::new(
        &places,
        &store,
        BoundingBox::MINNEAPOLIS,
        MissingDataPolicy::Skip,
    )
    .run(&seeds(&["55401"]), run_at())
    .await
    .expect("a failed write must not abort the run");

    assert_eq!(report.entries_created, 2);
    assert_eq!(report.entries_failed, 1);
    assert_eq!(store.attempts.lock().unwrap().len(), 3);
    assert!(store.inner.get("c").is_some());
    assert!(store.inner.get("b-broken").is_none());
}
