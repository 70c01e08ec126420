//! The search engine: waits, element resolution, overlay handling, and the
//! calendar, filter and extraction steps built on them.

pub mod calendar;
pub mod filters;
pub mod listings;
pub mod locator;
pub mod overlay;
pub mod rooms;
pub mod sections;
pub mod wait;

pub use calendar::{CalendarNavigator, CalendarState};
pub use filters::{FilterApplier, FilterOutcome, FilterSpec};
pub use rooms::{extract_rooms, normalize_price, RoomTableOptions};
pub use wait::WaitSpec;
