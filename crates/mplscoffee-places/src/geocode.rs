use mplscoffee_core::Coordinates;

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::types::GeocodeResponse;

const ENDPOINT: &str = "geocode/json";

impl PlacesClient {
    /// Resolves a seed (postal code or address) to coordinates.
    ///
    /// Returns `Ok(None)` when the geocoder has no result for the seed, or
    /// when its first result carries no location.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Http`] on transport failure after retries.
    /// - [`PlacesError::Api`] on a failing status envelope.
    /// - [`PlacesError::Deserialize`] if the body does not match.
    pub async fn geocode(&self, seed: &str) -> Result<Option<Coordinates>, PlacesError> {
        let url = self.build_url(ENDPOINT, &[("address", seed)])?;
        let response: GeocodeResponse = self.request_json("geocode", &url).await?;
        Self::check_status("geocode", &response.status, response.error_message.as_deref())?;

        let location = response
            .results
            .first()
            .and_then(|r| r.geometry.as_ref())
            .and_then(|g| g.location)
            .map(|l| Coordinates::new(l.lat, l.lng));

        match location {
            Some(coords) => tracing::debug!(seed, %coords, "geocoded seed"),
            None => tracing::debug!(seed, status = %response.status, "geocoder returned no location"),
        }
        Ok(location)
    }
}
