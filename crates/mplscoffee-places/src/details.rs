use mplscoffee_core::DetailRecord;

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::normalize::detail_record;
use crate::types::PlaceDetailsResponse;

const ENDPOINT: &str = "place/details/json";

/// Fields requested from the details endpoint.
pub const DETAIL_FIELDS: &str =
    "name,website,formatted_address,opening_hours,rating,user_ratings_total,geometry";

impl PlacesClient {
    /// Fetches the detail record for one place.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::MissingDetail`] when the provider answers `NOT_FOUND`
    ///   or omits the `result` payload.
    /// - [`PlacesError::Api`] on any other failing status envelope.
    /// - [`PlacesError::Http`] on transport failure after retries.
    /// - [`PlacesError::Deserialize`] if the body does not match.
    pub async fn place_details(&self, place_id: &str) -> Result<DetailRecord, PlacesError> {
        let url = self.build_url(ENDPOINT, &[("place_id", place_id), ("fields", DETAIL_FIELDS)])?;
        let response: PlaceDetailsResponse = self.request_json("details", &url).await?;

        if response.status == "NOT_FOUND" {
            return Err(PlacesError::MissingDetail {
                place_id: place_id.to_owned(),
            });
        }
        Self::check_status("details", &response.status, response.error_message.as_deref())?;

        let result = response.result.ok_or_else(|| PlacesError::MissingDetail {
            place_id: place_id.to_owned(),
        })?;
        Ok(detail_record(place_id, result))
    }
}
