use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback values used when a listing field cannot be resolved
pub const NAME_NOT_FOUND: &str = "N/A";
pub const PRICE_NOT_VISIBLE: &str = "Price not visible";
pub const RATING_NOT_AVAILABLE: &str = "Rating not available";
pub const IMAGE_NOT_FOUND: &str = "Image not found";

/// Fallback value for a room whose price could not be paired
pub const ROOM_PRICE_NOT_FOUND: &str = "Price not found";

/// One result card from the search results page.
///
/// Every string field is best-effort: when the field is missing from the card it
/// holds its sentinel (see the `*_NOT_*` constants), never an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub name: String,
    pub price: String,
    pub rating: String,
    pub image_url: String,
    /// Heuristic: any mention of "breakfast" on the card counts, including
    /// "breakfast not included".
    pub breakfast_included: bool,
    pub free_cancellation: bool,
}

/// One row of the availability table on a property detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub room_type: String,
    pub price: String,
}

impl RoomRecord {
    /// Build a record, substituting the sentinel for a blank price
    pub fn new(room_type: impl Into<String>, price: impl Into<String>) -> Self {
        let price = price.into();
        let price = if price.trim().is_empty() {
            ROOM_PRICE_NOT_FOUND.to_string()
        } else {
            price
        };
        Self {
            room_type: room_type.into(),
            price,
        }
    }

    pub fn has_price(&self) -> bool {
        self.price != ROOM_PRICE_NOT_FOUND
    }
}

/// A calendar day, keyed by its `YYYY-MM-DD` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateTarget(NaiveDate);

impl DateTarget {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Local today
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Local today shifted by `days`; `None` past the representable range
    pub fn from_today(days: i64) -> Option<Self> {
        Self::today().plus_days(days)
    }

    pub fn parse(raw: &str) -> Result<Self, chrono::ParseError> {
        NaiveDate::parse_from_str(raw.trim(), Self::FORMAT).map(Self)
    }

    /// Shift by `days` (negative goes back); `None` on overflow
    pub fn plus_days(self, days: i64) -> Option<Self> {
        let delta = Duration::try_days(days)?;
        self.0.checked_add_signed(delta).map(Self)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// Canonical key matched against `data-date` attributes on calendar cells
    pub fn key(self) -> String {
        self.0.format(Self::FORMAT).to_string()
    }
}

impl fmt::Display for DateTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_target_key_is_zero_padded() {
        let date = DateTarget::new(NaiveDate::from_ymd_opt(2026, 3, 7).unwrap());
        assert_eq!(date.key(), "2026-03-07");
        assert_eq!(date.to_string(), "2026-03-07");
    }

    #[test]
    fn date_target_crosses_month_boundary() {
        let date = DateTarget::parse("2026-01-30").unwrap().plus_days(3).unwrap();
        assert_eq!(date.key(), "2026-02-02");
    }

    #[test]
    fn date_target_overflow_is_none() {
        let date = DateTarget::parse("2026-01-30").unwrap();
        assert!(date.plus_days(9_999_999_999).is_none());
        assert!(date.plus_days(i64::MIN).is_none());
        assert_eq!(date.plus_days(-30).unwrap().key(), "2025-12-31");
        assert!(DateTarget::from_today(i64::MAX).is_none());
    }

    #[test]
    fn room_record_blank_price_becomes_sentinel() {
        let room = RoomRecord::new("Deluxe Room", "   ");
        assert_eq!(room.price, ROOM_PRICE_NOT_FOUND);
        assert!(!room.has_price());
    }
}
