//! Conversion from provider payloads to provider-neutral records.
//!
//! Every optional upstream field is replaced by an explicit default here so
//! that [`DetailRecord`] never carries an unset value.

use chrono::NaiveTime;
use mplscoffee_core::{Candidate, Coordinates, DetailRecord, ScheduleEntry};

use crate::types::{DayTime, Geometry, OpeningHours, Period, PlaceDetailsResult, PlaceResult};

pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_ADDRESS: &str = "Address not available";
pub const DEFAULT_TIME_CODE: &str = "0000";

/// Parses a compact `HHMM` time code into a time of day.
///
/// The code must be exactly four ASCII digits; hours are the integer
/// quotient by 100 and minutes the remainder. Anything else, including
/// out-of-range values such as `"2400"` or `"0960"`, resolves to midnight.
#[must_use]
pub fn parse_time_code(code: &str) -> NaiveTime {
    if code.len() != 4 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return NaiveTime::MIN;
    }
    let Ok(value) = code.parse::<u32>() else {
        return NaiveTime::MIN;
    };
    NaiveTime::from_hms_opt(value / 100, value % 100, 0).unwrap_or(NaiveTime::MIN)
}

fn location_of(geometry: Option<&Geometry>) -> Option<Coordinates> {
    geometry
        .and_then(|g| g.location)
        .map(|l| Coordinates::new(l.lat, l.lng))
}

/// Converts a nearby-search hit into a [`Candidate`].
///
/// Returns `None` when the hit has no coordinates: it cannot be geofenced.
#[must_use]
pub fn candidate_from_result(result: PlaceResult) -> Option<Candidate> {
    let location = location_of(result.geometry.as_ref())?;
    Some(Candidate {
        place_id: result.place_id,
        name: result.name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        location,
        rating: result.rating,
        user_ratings_total: result.user_ratings_total,
    })
}

fn time_of(day_time: Option<&DayTime>) -> NaiveTime {
    parse_time_code(
        day_time
            .and_then(|dt| dt.time.as_deref())
            .unwrap_or(DEFAULT_TIME_CODE),
    )
}

fn schedule_entry(period: &Period) -> ScheduleEntry {
    ScheduleEntry {
        day_of_week: period.open.as_ref().and_then(|o| o.day).unwrap_or(0),
        open_time: time_of(period.open.as_ref()),
        close_time: time_of(period.close.as_ref()),
    }
}

fn schedule(hours: Option<&OpeningHours>) -> Vec<ScheduleEntry> {
    hours
        .and_then(|h| h.periods.as_deref())
        .map(|periods| periods.iter().map(schedule_entry).collect())
        .unwrap_or_default()
}

/// Builds a fully-defaulted [`DetailRecord`] for `place_id`.
#[must_use]
pub fn detail_record(place_id: &str, result: PlaceDetailsResult) -> DetailRecord {
    let schedule = schedule(result.opening_hours.as_ref());
    let weekday_text = result
        .opening_hours
        .and_then(|h| h.weekday_text)
        .unwrap_or_default();

    DetailRecord {
        place_id: place_id.to_string(),
        name: result.name.unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        address: result
            .formatted_address
            .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string()),
        rating: result.rating.unwrap_or(0.0),
        user_ratings_total: result.user_ratings_total.unwrap_or(0),
        location: location_of(result.geometry.as_ref()).unwrap_or(Coordinates::new(0.0, 0.0)),
        website: result.website.unwrap_or_default(),
        schedule,
        weekday_text,
    }
}
