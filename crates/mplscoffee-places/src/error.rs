use thiserror::Error;

/// Errors returned by the places client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network, TLS or non-2xx failure from the underlying HTTP client.
    /// The request URL is stripped because it carries the API key.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered 200 but with a failing `status` envelope.
    #[error("{endpoint} returned status {status}: {message}")]
    Api {
        endpoint: &'static str,
        status: String,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The details endpoint returned no `result` payload for this place.
    #[error("no detail payload for place {place_id}")]
    MissingDetail { place_id: String },

    #[error("nearby search at {location} exceeded {max_pages} pages")]
    PaginationLimit { location: String, max_pages: usize },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl PlacesError {
    /// `true` when the provider simply had nothing for the request, as
    /// opposed to a transport or protocol failure.
    #[must_use]
    pub fn is_missing_data(&self) -> bool {
        matches!(self, PlacesError::MissingDetail { .. })
    }
}
