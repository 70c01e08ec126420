//! The end-to-end search scenario.
//!
//! [`run_search`] and [`inspect_detail`] drive any [`Document`]; [`run`] wires
//! them to a live Chrome session, prints the report and stores artifacts.

use crate::config::ScoutConfig;
use crate::driver::chrome::launch_browser;
use crate::driver::{ChromeDocument, Document, Query};
use crate::error::FlowError;
use crate::models::{DateTarget, ListingRecord, RoomRecord};
use crate::report;
use crate::scrapers::filters::{default_filters, FilterApplier, FilterOutcome};
use crate::scrapers::listings::{extract_all, find_cards, PROPERTY_CARD};
use crate::scrapers::overlay::suppress;
use crate::scrapers::rooms::{extract_rooms, scroll_to_availability, RoomTableOptions, MAX_ROOMS};
use crate::scrapers::sections::reviews_or_policies_visible;
use crate::scrapers::wait::{
    pause, wait_for_all_visible, wait_for_clickable, wait_for_present, wait_for_visible,
};
use crate::scrapers::CalendarNavigator;
use crate::sink::{save_json, ArtifactSink};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use headless_chrome::Browser;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

const DESTINATION_INPUT: &str = "input[name='ss']";
const AUTOCOMPLETE_OPTION: &str = "li[data-testid='autocomplete-result']";
const SUBMIT_BUTTON: &str =
    "button[type='submit'][data-testid='searchbox-submit-button'], button[type='submit']";
const FIRST_RESULT_LINK: &str = "div[data-testid='property-card'] a[data-testid='title-link'], \
     div[data-testid='property-card'] a";
const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

pub const RESULTS_FILE: &str = "results.json";
pub const ERROR_SCREENSHOT: &str = "error.png";
pub const ROOMS_NOT_FOUND_SCREENSHOT: &str = "rooms_not_found.png";
pub const FINAL_SCREENSHOT: &str = "final_step.png";

/// Whether enough results survived the filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Validation {
    Passed { count: usize },
    Failed { count: usize },
}

impl Validation {
    pub fn evaluate(count: usize, minimum: usize) -> Self {
        if count >= minimum {
            Validation::Passed { count }
        } else {
            Validation::Failed { count }
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, Validation::Passed { .. })
    }

    pub fn count(&self) -> usize {
        match self {
            Validation::Passed { count } | Validation::Failed { count } => *count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub name: &'static str,
    pub outcome: FilterOutcome,
}

/// Everything learned on the results page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub check_in: DateTarget,
    pub check_out: DateTarget,
    pub filters: Vec<FilterReport>,
    pub listings: Vec<ListingRecord>,
    pub validation: Validation,
}

/// Everything learned on a property page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailOutcome {
    pub url: String,
    /// The availability section was reached while scrolling
    pub availability_reached: bool,
    pub rooms: Vec<RoomRecord>,
    pub reviews_or_policies_visible: bool,
}

/// How the property page for the first result is reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailTarget {
    /// Load this absolute URL in a separate page
    NewPage(String),
    /// The link was clicked and the current page is navigating
    InPlace,
}

/// Contents of `results.json`
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub destination: String,
    #[serde(flatten)]
    pub search: SearchOutcome,
    pub detail: DetailOutcome,
    pub artifacts: Vec<PathBuf>,
    pub finished_at: DateTime<Utc>,
}

/// Check-in and check-out relative to `today`
pub fn stay_dates(
    config: &ScoutConfig,
    today: DateTarget,
) -> Result<(DateTarget, DateTarget), FlowError> {
    let check_in = today
        .plus_days(config.check_in_offset_days)
        .ok_or(FlowError::DateOutOfRange {
            days: config.check_in_offset_days,
        })?;
    let check_out = check_in
        .plus_days(config.stay_nights)
        .ok_or(FlowError::DateOutOfRange {
            days: config.stay_nights,
        })?;
    Ok((check_in, check_out))
}

/// Resolve `href` against the URL of the page it was found on
pub fn absolute_url(base: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    let Some(scheme_end) = base.find("://") else {
        return href.to_string();
    };
    if href.starts_with("//") {
        return format!("{}:{href}", &base[..scheme_end]);
    }

    let after_scheme = scheme_end + 3;
    let origin_end = base[after_scheme..]
        .find(['/', '?', '#'])
        .map_or(base.len(), |i| after_scheme + i);
    let origin = &base[..origin_end];
    if href.starts_with('/') {
        return format!("{origin}{href}");
    }

    let path = &base[origin_end..];
    let path = &path[..path.find(['?', '#']).unwrap_or(path.len())];
    match path.rfind('/') {
        Some(i) => format!("{origin}{}{href}", &path[..=i]),
        None => format!("{origin}/{href}"),
    }
}

/// Type the destination and settle the autocomplete.
///
/// A matching suggestion is clicked; otherwise, or when no suggestion list
/// appears in time, Enter is pressed in the field.
pub fn enter_destination<D: Document>(doc: &D, config: &ScoutConfig) -> Result<(), FlowError> {
    let input = wait_for_present(
        doc,
        &[Query::css(DESTINATION_INPUT)],
        config.standard_wait,
        "destination input",
    )?
    .into_iter()
    .next()
    .ok_or_else(|| FlowError::MissingElement {
        what: "destination input".to_string(),
    })?;

    if let Err(e) = doc.focus(&input) {
        warn!(error = %e, "Could not focus destination input");
    }
    if let Err(e) = doc.clear(&input) {
        warn!(error = %e, "Could not clear destination input");
    }
    doc.type_text(&input, &config.destination)?;
    info!(destination = %config.destination, "Destination typed");

    let keyword = config.destination_keyword.to_lowercase();
    match wait_for_all_visible(
        doc,
        &[Query::css(AUTOCOMPLETE_OPTION)],
        config.short_wait,
        "autocomplete suggestions",
    ) {
        Ok(options) => {
            let wanted = options.iter().find(|option| {
                doc.text(option)
                    .map(|t| t.to_lowercase().contains(&keyword))
                    .unwrap_or(false)
            });
            if let Some(option) = wanted {
                doc.click(option)?;
                info!("Autocomplete suggestion picked");
                return Ok(());
            }
            info!(keyword = %keyword, "No suggestion matches keyword, submitting with Enter");
        }
        Err(e) => info!("{e}, submitting with Enter"),
    }

    doc.press_key(&input, "Enter")?;
    Ok(())
}

/// Search for the configured stay, apply filters and read the result cards
pub fn run_search<D: Document>(doc: &D, config: &ScoutConfig) -> Result<SearchOutcome, FlowError> {
    let (check_in, check_out) = stay_dates(config, DateTarget::today())?;
    run_search_for(doc, config, check_in, check_out)
}

/// [`run_search`] with explicit dates
pub fn run_search_for<D: Document>(
    doc: &D,
    config: &ScoutConfig,
    check_in: DateTarget,
    check_out: DateTarget,
) -> Result<SearchOutcome, FlowError> {
    suppress(doc);
    enter_destination(doc, config)?;

    let mut calendar = CalendarNavigator::new(doc, config.standard_wait);
    calendar.open()?;
    calendar.select_tab();
    calendar.pick_stay(check_in, check_out)?;
    info!(%check_in, %check_out, "Stay dates selected");

    let submit = wait_for_clickable(
        doc,
        &[Query::css(SUBMIT_BUTTON)],
        config.standard_wait,
        "search button",
    )?;
    doc.click(&submit)?;

    let cards_query = [Query::css(PROPERTY_CARD)];
    wait_for_visible(doc, &cards_query, config.standard_wait, "search results")?;
    info!("Search results loaded");

    let filters = FilterApplier::with_settle(doc, config.pacing.filter_settle)
        .apply_all(&default_filters())
        .into_iter()
        .map(|(name, outcome)| FilterReport { name, outcome })
        .collect();

    wait_for_visible(doc, &cards_query, config.standard_wait, "filtered results")?;

    let cards = find_cards(doc);
    let listings = extract_all(doc, &cards);
    let validation = Validation::evaluate(listings.len(), config.min_expected_results);
    if validation.passed() {
        info!(count = validation.count(), "Validation passed");
    } else {
        warn!(
            count = validation.count(),
            minimum = config.min_expected_results,
            "Validation failed"
        );
    }

    Ok(SearchOutcome {
        check_in,
        check_out,
        filters,
        listings,
        validation,
    })
}

/// Locate the first result's link; prefer its URL, else click it in place
pub fn open_first_result<D: Document>(
    doc: &D,
    config: &ScoutConfig,
) -> Result<DetailTarget, FlowError> {
    let link = wait_for_clickable(
        doc,
        &[Query::css(FIRST_RESULT_LINK)],
        config.standard_wait,
        "first result link",
    )?;

    let href = doc
        .attribute(&link, "href")
        .ok()
        .flatten()
        .filter(|h| !h.trim().is_empty());

    match href {
        Some(href) => {
            let base = doc.current_url().unwrap_or_default();
            Ok(DetailTarget::NewPage(absolute_url(&base, &href)))
        }
        None => {
            doc.click(&link)?;
            Ok(DetailTarget::InPlace)
        }
    }
}

/// Read rooms and check for the reviews/policies block on a property page
pub fn inspect_detail<D: Document>(
    doc: &D,
    config: &ScoutConfig,
) -> Result<DetailOutcome, FlowError> {
    wait_for_present(doc, &[Query::css("body")], config.standard_wait, "detail page")?;
    pause(config.pacing.detail_load);

    let url = doc.current_url().unwrap_or_default();
    suppress(doc);

    let availability_reached = scroll_to_availability(doc, config.pacing.availability_scroll);
    let rooms = extract_rooms(
        doc,
        &RoomTableOptions {
            currency: config.currency.clone(),
            max_rooms: MAX_ROOMS,
        },
    );

    if let Err(e) = doc.execute_script(SCROLL_TO_BOTTOM) {
        warn!(error = %e, "Scroll to bottom failed");
    }
    pause(config.pacing.bottom_scroll);
    let sections_visible = reviews_or_policies_visible(doc);

    Ok(DetailOutcome {
        url,
        availability_reached,
        rooms,
        reviews_or_policies_visible: sections_visible,
    })
}

async fn capture<D: Document>(doc: &D, sink: &dyn ArtifactSink, name: &str) -> Result<PathBuf> {
    let png = doc.capture_screenshot()?;
    let path = sink.save(name, &png).await?;
    println!("✅ Screenshot saved: {name}");
    Ok(path)
}

struct Session {
    browser: Browser,
    main: ChromeDocument,
    detail: Option<ChromeDocument>,
}

impl Session {
    fn active(&self) -> &ChromeDocument {
        self.detail.as_ref().unwrap_or(&self.main)
    }
}

/// Run the full scenario against the live site.
///
/// On failure an `error.png` of the active page is stored on a best-effort
/// basis before the error is returned.
pub async fn run(config: &ScoutConfig, sink: &dyn ArtifactSink) -> Result<RunSummary> {
    let browser = launch_browser(config.headless, config.window_width, config.window_height)
        .context("Failed to launch Chrome browser")?;
    let tab = browser.new_tab().context("Failed to open tab")?;

    let mut session = Session {
        browser,
        main: ChromeDocument::new(tab),
        detail: None,
    };

    let result = drive(&mut session, config, sink).await;
    if let Err(e) = &result {
        error!("❌ Run failed: {e:#}");
        if let Err(shot) = capture(session.active(), sink, ERROR_SCREENSHOT).await {
            warn!("Could not store {ERROR_SCREENSHOT}: {shot:#}");
        }
    }
    result
}

async fn drive(
    session: &mut Session,
    config: &ScoutConfig,
    sink: &dyn ArtifactSink,
) -> Result<RunSummary> {
    session.main.navigate(&config.base_url)?;

    let search = run_search(&session.main, config)?;
    report::print_listings(&search.listings)?;
    report::print_validation(&search.validation, config.min_expected_results)?;

    if let DetailTarget::NewPage(url) = open_first_result(&session.main, config)? {
        session.detail = Some(ChromeDocument::open(&session.browser, &url)?);
    }
    let page = session.active();

    let detail = inspect_detail(page, config)?;
    report::print_detail_header(&detail.url)?;

    let mut artifacts = Vec::new();
    report::print_rooms(&detail.rooms)?;
    if detail.rooms.is_empty() {
        artifacts.push(capture(page, sink, ROOMS_NOT_FOUND_SCREENSHOT).await?);
    }
    report::print_sections(detail.reviews_or_policies_visible)?;
    artifacts.push(capture(page, sink, FINAL_SCREENSHOT).await?);

    let summary = RunSummary {
        destination: config.destination.clone(),
        search,
        detail,
        artifacts,
        finished_at: Utc::now(),
    };
    let written = save_json(sink, RESULTS_FILE, &summary).await?;
    info!("💾 Saved run summary to {} via {}", written.display(), sink.sink_name());

    Ok(summary)
}
