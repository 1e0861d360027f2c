//! Places provider response types.
//!
//! Every response carries a `status` string next to its payload. Fields
//! the provider may omit are `Option` or defaulted so that a sparse record
//! still deserializes; defaults are filled in by [`crate::normalize`].

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(default)]
    pub location: Option<LatLng>,
}

// ---------------------------------------------------------------------------
// geocode
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

// ---------------------------------------------------------------------------
// nearbysearch
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct NearbySearchResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<PlaceResult>,
    /// Present when more pages exist. Only usable after a short delay.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// One nearby-search hit.
#[derive(Debug, Deserialize)]
pub struct PlaceResult {
    pub place_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<i32>,
}

// ---------------------------------------------------------------------------
// details
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlaceDetailsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub result: Option<PlaceDetailsResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaceDetailsResult {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub opening_hours: Option<OpeningHours>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<i32>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub periods: Option<Vec<Period>>,
    #[serde(default)]
    pub weekday_text: Option<Vec<String>>,
}

/// An open/close pair. Places open around the clock report only `open`.
#[derive(Debug, Default, Deserialize)]
pub struct Period {
    #[serde(default)]
    pub open: Option<DayTime>,
    #[serde(default)]
    pub close: Option<DayTime>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DayTime {
    /// 0 = Sunday.
    #[serde(default)]
    pub day: Option<i16>,
    /// `HHMM`, zero-padded.
    #[serde(default)]
    pub time: Option<String>,
}
