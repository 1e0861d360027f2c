//! Paginated nearby search.

use std::time::Duration;

use mplscoffee_core::{Candidate, Coordinates};

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::normalize::candidate_from_result;
use crate::types::NearbySearchResponse;

const ENDPOINT: &str = "place/nearbysearch/json";

pub const SEARCH_RADIUS_METERS: u32 = 2_000;
pub const SEARCH_TYPE: &str = "cafe";
pub const SEARCH_KEYWORD: &str = "coffee";

/// Wait before requesting a continuation page. The provider rejects a
/// token used sooner with `INVALID_REQUEST` or an empty page.
pub const PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);

/// Guard against a provider that keeps handing out tokens. The provider
/// itself stops at three pages.
pub const MAX_SEARCH_PAGES: usize = 10;

impl PlacesClient {
    /// Fetches one page of nearby-search results around `location`.
    async fn nearby_search_page(
        &self,
        location: Coordinates,
        page_token: Option<&str>,
    ) -> Result<NearbySearchResponse, PlacesError> {
        let location_param = location.to_string();
        let radius = SEARCH_RADIUS_METERS.to_string();
        let mut params = vec![
            ("location", location_param.as_str()),
            ("radius", radius.as_str()),
            ("type", SEARCH_TYPE),
            ("keyword", SEARCH_KEYWORD),
        ];
        if let Some(token) = page_token {
            params.push(("pagetoken", token));
        }

        let url = self.build_url(ENDPOINT, &params)?;
        let response: NearbySearchResponse = self.request_json("nearbysearch", &url).await?;
        Self::check_status(
            "nearbysearch",
            &response.status,
            response.error_message.as_deref(),
        )?;
        Ok(response)
    }

    /// Runs a nearby search around `location` and follows continuation
    /// tokens until the provider stops returning one.
    ///
    /// Every continuation request is preceded by [`PAGE_TOKEN_DELAY`].
    /// Results are concatenated in the order returned; hits without
    /// coordinates are dropped. An empty first page yields an empty list.
    ///
    /// All-or-nothing: a failing page discards the pages already fetched.
    ///
    /// # Errors
    ///
    /// Propagates any page error, and returns
    /// [`PlacesError::PaginationLimit`] past [`MAX_SEARCH_PAGES`] pages.
    pub async fn nearby_search(&self, location: Coordinates) -> Result<Vec<Candidate>, PlacesError> {
        let mut candidates = Vec::new();
        let mut token: Option<String> = None;
        let mut page = 0usize;

        loop {
            page += 1;
            if page > MAX_SEARCH_PAGES {
                return Err(PlacesError::PaginationLimit {
                    location: location.to_string(),
                    max_pages: MAX_SEARCH_PAGES,
                });
            }

            if token.is_some() {
                tokio::time::sleep(PAGE_TOKEN_DELAY).await;
            }

            let response = self.nearby_search_page(location, token.as_deref()).await?;
            let returned = response.results.len();
            for result in response.results {
                let place_id = result.place_id.clone();
                match candidate_from_result(result) {
                    Some(candidate) => candidates.push(candidate),
                    None => tracing::debug!(%place_id, "search hit has no geometry; dropped"),
                }
            }
            tracing::debug!(%location, page, returned, "nearby search page fetched");

            token = response.next_page_token.filter(|t| !t.is_empty());
            if token.is_none() {
                break;
            }
        }

        Ok(candidates)
    }
}
