use crate::error::ConfigError;
use crate::scrapers::filters::DEFAULT_SETTLE as FILTER_SETTLE;
use crate::scrapers::rooms::SCROLL_SETTLE;
use crate::scrapers::wait::WaitSpec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Furthest check-in accepted, in days from today
pub const MAX_CHECK_IN_OFFSET_DAYS: i64 = 365;
/// Longest stay accepted, in nights
pub const MAX_STAY_NIGHTS: i64 = 90;

/// Fixed pauses letting the page re-render between steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    /// After each filter click
    pub filter_settle: Duration,
    /// After the detail page body appears
    pub detail_load: Duration,
    /// Between scrolls while looking for the availability section
    pub availability_scroll: Duration,
    /// After scrolling to the bottom of the detail page
    pub bottom_scroll: Duration,
}

impl Pacing {
    /// No pauses at all, for static documents
    pub const fn instant() -> Self {
        Self {
            filter_settle: Duration::ZERO,
            detail_load: Duration::ZERO,
            availability_scroll: Duration::ZERO,
            bottom_scroll: Duration::ZERO,
        }
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            filter_settle: FILTER_SETTLE,
            detail_load: Duration::from_millis(800),
            availability_scroll: SCROLL_SETTLE,
            bottom_scroll: Duration::from_millis(1200),
        }
    }
}

/// Parameters for one search run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoutConfig {
    /// Landing page of the target site
    pub base_url: String,
    /// Text typed into the destination field
    pub destination: String,
    /// Lower-case keyword an autocomplete option must contain to be picked
    pub destination_keyword: String,
    /// Check-in date as days from today
    pub check_in_offset_days: i64,
    /// Nights between check-in and check-out
    pub stay_nights: i64,
    /// Minimum result cards for the run to count as passed
    pub min_expected_results: usize,
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    /// Directory receiving screenshots and `results.json`
    pub output_dir: PathBuf,
    /// Currency glyph used to pair and trim room prices
    pub currency: String,
    pub pacing: Pacing,
    pub standard_wait: WaitSpec,
    pub short_wait: WaitSpec,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.booking.com/".to_string(),
            destination: "Goa, India".to_string(),
            destination_keyword: "goa".to_string(),
            check_in_offset_days: 10,
            stay_nights: 3,
            min_expected_results: 3,
            headless: true,
            window_width: 1920,
            window_height: 1080,
            output_dir: PathBuf::from("."),
            currency: "₹".to_string(),
            pacing: Pacing::default(),
            standard_wait: WaitSpec::STANDARD,
            short_wait: WaitSpec::SHORT,
        }
    }
}

/// Load configuration from `STAY_SCOUT_*` environment variables.
///
/// Calls `dotenvy::dotenv().ok()` first so a local `.env` file is honoured.
///
/// # Errors
///
/// Returns `ConfigError` if a variable is present but cannot be parsed.
pub fn load_config() -> Result<ScoutConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_config(|key| std::env::var(key))
}

/// Build configuration from an env-var lookup, starting from the defaults.
///
/// Unset variables keep their default; set-but-invalid ones are errors.
pub fn build_config<F>(lookup: F) -> Result<ScoutConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let mut config = ScoutConfig::default();

    let parse_i64 = |var: &str, current: i64| -> Result<i64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.trim().parse::<i64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(current),
        }
    };

    let parse_bool = |var: &str, current: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                other => Err(ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: format!("expected a boolean, got '{other}'"),
                }),
            },
            Err(_) => Ok(current),
        }
    };

    if let Ok(url) = lookup("STAY_SCOUT_BASE_URL") {
        config.base_url = url;
    }
    if let Ok(destination) = lookup("STAY_SCOUT_DESTINATION") {
        config.destination = destination;
    }
    if let Ok(keyword) = lookup("STAY_SCOUT_DESTINATION_KEYWORD") {
        config.destination_keyword = keyword.to_lowercase();
    }
    if let Ok(dir) = lookup("STAY_SCOUT_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    if let Ok(currency) = lookup("STAY_SCOUT_CURRENCY") {
        config.currency = currency;
    }

    let in_range = |var: &str, value: i64, min: i64, max: i64| -> Result<i64, ConfigError> {
        if (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("{value} is outside {min}..={max}"),
            })
        }
    };

    config.check_in_offset_days = in_range(
        "STAY_SCOUT_CHECK_IN_OFFSET_DAYS",
        parse_i64("STAY_SCOUT_CHECK_IN_OFFSET_DAYS", config.check_in_offset_days)?,
        0,
        MAX_CHECK_IN_OFFSET_DAYS,
    )?;
    config.stay_nights = in_range(
        "STAY_SCOUT_STAY_NIGHTS",
        parse_i64("STAY_SCOUT_STAY_NIGHTS", config.stay_nights)?,
        1,
        MAX_STAY_NIGHTS,
    )?;

    let min_results = parse_i64(
        "STAY_SCOUT_MIN_RESULTS",
        config.min_expected_results as i64,
    )?;
    config.min_expected_results =
        usize::try_from(min_results).map_err(|e| ConfigError::InvalidEnvVar {
            var: "STAY_SCOUT_MIN_RESULTS".to_string(),
            reason: e.to_string(),
        })?;

    config.headless = parse_bool("STAY_SCOUT_HEADLESS", config.headless)?;

    Ok(config)
}
