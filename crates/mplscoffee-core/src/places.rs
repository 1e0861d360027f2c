//! Provider-neutral records produced by the places client.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// A nearby-search hit. Uniqueness key is `place_id`; discarded once the
/// run's candidate set has been built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub place_id: String,
    pub name: String,
    pub location: Coordinates,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<i32>,
}

/// One opening period from the detail response, already converted from the
/// provider's `HHMM` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// 0 = Sunday through 6 = Saturday.
    pub day_of_week: i16,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

/// Full detail record for one place.
///
/// Every optional upstream field has already been replaced by its default,
/// so nothing here is ever unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub rating: f64,
    pub user_ratings_total: i32,
    pub location: Coordinates,
    pub website: String,
    pub schedule: Vec<ScheduleEntry>,
    pub weekday_text: Vec<String>,
}
