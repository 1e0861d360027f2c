use super::*;

fn test_client(base_url: &str) -> PlacesClient {
    PlacesClient::with_base_url("test-key", 30, RetryPolicy::NONE, base_url)
        .expect("client construction should not fail")
}

#[test]
fn build_url_appends_endpoint_and_key() {
    let client = test_client("https://maps.googleapis.com/maps/api");
    let url = client
        .build_url("geocode/json", &[("address", "55401")])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://maps.googleapis.com/maps/api/geocode/json?address=55401&key=test-key"
    );
}

#[test]
fn build_url_tolerates_trailing_slash() {
    let client = test_client("https://maps.googleapis.com/maps/api/");
    let url = client
        .build_url("place/details/json", &[("place_id", "abc")])
        .unwrap();
    assert_eq!(
        url.as_str(),
        "https://maps.googleapis.com/maps/api/place/details/json?place_id=abc&key=test-key"
    );
}

#[test]
fn build_url_encodes_special_characters() {
    let client = test_client("https://maps.googleapis.com/maps/api");
    let url = client
        .build_url("geocode/json", &[("address", "Hennepin & Lake")])
        .unwrap();
    assert!(
        url.as_str().contains("Hennepin+%26+Lake"),
        "query param should be percent-encoded: {url}"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let result = PlacesClient::with_base_url("k", 30, RetryPolicy::NONE, "not a url");
    assert!(matches!(result, Err(PlacesError::InvalidBaseUrl { .. })));
}

#[test]
fn check_status_accepts_ok_and_zero_results() {
    assert!(PlacesClient::check_status("geocode", "OK", None).is_ok());
    assert!(PlacesClient::check_status("geocode", "ZERO_RESULTS", None).is_ok());
    assert!(PlacesClient::check_status("geocode", "", None).is_ok());
}

#[test]
fn check_status_rejects_denied() {
    let err = PlacesClient::check_status(
        "nearbysearch",
        "REQUEST_DENIED",
        Some("The provided API key is invalid."),
    )
    .unwrap_err();
    match err {
        PlacesError::Api {
            endpoint,
            status,
            message,
        } => {
            assert_eq!(endpoint, "nearbysearch");
            assert_eq!(status, "REQUEST_DENIED");
            assert!(message.contains("invalid"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[test]
fn check_status_without_message_uses_placeholder() {
    let err = PlacesClient::check_status("details", "OVER_QUERY_LIMIT", None).unwrap_err();
    assert!(err.to_string().contains("no error message"));
}
