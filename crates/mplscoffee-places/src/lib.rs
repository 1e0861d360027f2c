//! Client for the places provider: geocoding, paginated nearby search and
//! place details.

pub mod client;
mod details;
pub mod error;
mod geocode;
pub mod normalize;
pub mod retry;
mod search;
pub mod types;

pub use client::PlacesClient;
pub use details::DETAIL_FIELDS;
pub use error::PlacesError;
pub use normalize::parse_time_code;
pub use retry::RetryPolicy;
pub use search::{
    MAX_SEARCH_PAGES, PAGE_TOKEN_DELAY, SEARCH_KEYWORD, SEARCH_RADIUS_METERS, SEARCH_TYPE,
};
