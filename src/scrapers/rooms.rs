//! Room and price extraction from a property's availability section.
//!
//! The section is found by text ("Room type") when its usual id is missing,
//! because the markup around it changes more often than its wording. Room
//! names are gathered from several element shapes, filtered against known
//! page furniture, de-duplicated, and each is paired with the nearest price.

use crate::driver::{normalize_whitespace, Document, Query};
use crate::models::{RoomRecord, ROOM_PRICE_NOT_FOUND};
use crate::scrapers::locator::{first_text, resolve, resolve_first, resolve_within};
use crate::scrapers::overlay::hard_hide;
use crate::scrapers::wait::pause;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound on records returned from one page
pub const MAX_ROOMS: usize = 12;

const AVAILABILITY_TABLE: &str = "#hprt-table";
const ROOM_TYPE_HEADER: &str = "Room type";

/// Containers tried, innermost first, around a "Room type" header
const HEADER_CONTAINERS: &[&str] = &[
    "table",
    "section",
    "[id*='availability'], [data-testid*='availability']",
];

/// Every shape a room name has been seen in; matched in document order
const ROOM_NAME_SHAPES: &str =
    "a.hprt-roomtype-link, a[href*='room'], td:first-child a, th:first-child a, h3, h2";

/// Ancestors that hold one room's row of data, tried in order
const ROW_CONTAINERS: &[&str] = &[
    "tr",
    "[data-block-id]",
    "[data-testid*='room']",
    "li",
    "article",
];

/// Case-insensitive prefixes of names that are headings, not rooms
const FURNITURE_PREFIXES: &[&str] = &["filter by", "your choices", "price for"];

/// Scroll attempts made while looking for the availability section
const SCROLL_ATTEMPTS: usize = 10;
pub const SCROLL_SETTLE: Duration = Duration::from_millis(450);

fn price_regions() -> Vec<Query> {
    vec![
        Query::css("span.prco-valign-middle-helper"),
        Query::css("span[class*='prco']"),
        Query::css("[data-testid*='price']"),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomTableOptions {
    /// Glyph marking a price, e.g. `₹`
    pub currency: String,
    pub max_rooms: usize,
}

impl Default for RoomTableOptions {
    fn default() -> Self {
        Self {
            currency: "₹".to_string(),
            max_rooms: MAX_ROOMS,
        }
    }
}

/// Trim a raw price down to its headline amount.
///
/// Whitespace is collapsed. When `currency` occurs, everything before its first
/// occurrence is dropped, and so is everything from the first "tax" (any case)
/// after it. Applying the function twice gives the same result as once.
pub fn normalize_price(raw: &str, currency: &str) -> String {
    let collapsed = normalize_whitespace(raw);
    if currency.is_empty() {
        return collapsed;
    }
    let Some(start) = collapsed.find(currency) else {
        return collapsed;
    };

    let from_glyph = collapsed[start..].trim();
    // ASCII lowering keeps byte offsets aligned with `from_glyph`.
    match from_glyph.to_ascii_lowercase().find("tax") {
        Some(tax) if tax > 0 => from_glyph[..tax].trim().to_string(),
        _ => from_glyph.to_string(),
    }
}

/// Names that belong to the table's furniture rather than to a room
pub fn is_furniture(name: &str) -> bool {
    let name = normalize_whitespace(name).to_lowercase();
    name == ROOM_TYPE_HEADER.to_lowercase()
        || FURNITURE_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
}

/// Jump to the availability anchor and scroll until the room table shows up.
///
/// Returns whether the section was seen; not finding it is not an error.
pub fn scroll_to_availability<D: Document>(doc: &D, settle: Duration) -> bool {
    if let Err(e) = doc.execute_script("window.location.hash = 'availability';") {
        debug!(error = %e, "availability anchor jump failed");
    }

    for attempt in 0..SCROLL_ATTEMPTS {
        hard_hide(doc);
        if !resolve(doc, &[Query::css(AVAILABILITY_TABLE)]).is_empty()
            || !resolve(doc, &[Query::with_text("*", ROOM_TYPE_HEADER)]).is_empty()
        {
            debug!(attempt, "availability section reached");
            return true;
        }
        if let Err(e) = doc.execute_script("window.scrollBy(0, 900);") {
            debug!(error = %e, "scroll failed");
        }
        pause(settle);
    }
    false
}

/// The container holding the room list, if the page has one
pub fn find_availability_section<D: Document>(doc: &D) -> Option<D::Node<'_>> {
    if let Some(table) = resolve_first(doc, &[Query::css(AVAILABILITY_TABLE)]) {
        return Some(table);
    }

    // Stray "Room type" labels (facets, nav) sit outside any container; skip them.
    let headers = resolve(doc, &[Query::with_text("*", ROOM_TYPE_HEADER)]);
    HEADER_CONTAINERS.iter().find_map(|css| {
        headers
            .iter()
            .find_map(|header| doc.closest(header, css).ok().flatten())
    })
}

/// Text of the innermost element under `row` showing a priced amount
fn glyph_price_text<'a, D: Document>(
    doc: &'a D,
    row: &D::Node<'a>,
    currency: &str,
) -> Option<String> {
    let query = [Query::containing("*", currency)];
    let mut current = resolve_within(doc, row, &query).into_iter().next()?;
    let mut text = doc.text(&current).ok()?;

    // Descend while a nested match still carries digits; a lone glyph span
    // must not replace the amount next to it.
    loop {
        let deeper = resolve_within(doc, &current, &query)
            .into_iter()
            .find_map(|child| {
                let child_text = doc.text(&child).ok()?;
                child_text
                    .chars()
                    .any(|c| c.is_ascii_digit())
                    .then_some((child, child_text))
            });
        match deeper {
            Some((child, child_text)) => {
                current = child;
                text = child_text;
            }
            None => break,
        }
    }
    Some(text)
}

fn pair_price<'a, D: Document>(
    doc: &'a D,
    name_node: &D::Node<'a>,
    options: &RoomTableOptions,
) -> String {
    let Some(row) = ROW_CONTAINERS
        .iter()
        .find_map(|css| doc.closest(name_node, css).ok().flatten())
    else {
        return ROOM_PRICE_NOT_FOUND.to_string();
    };

    let raw = (!options.currency.is_empty())
        .then(|| glyph_price_text(doc, &row, &options.currency))
        .flatten()
        .or_else(|| first_text(doc, &row, &price_regions()));

    match raw.map(|r| normalize_price(&r, &options.currency)) {
        Some(price) if !price.is_empty() => price,
        _ => ROOM_PRICE_NOT_FOUND.to_string(),
    }
}

/// Rooms listed in the availability section, first occurrence of each name wins.
///
/// Returns an empty list when the section cannot be found.
pub fn extract_rooms<D: Document>(doc: &D, options: &RoomTableOptions) -> Vec<RoomRecord> {
    let Some(section) = find_availability_section(doc) else {
        info!("Availability section not found");
        return Vec::new();
    };

    let candidates = resolve_within(doc, &section, &[Query::css(ROOM_NAME_SHAPES)]);
    debug!(candidates = candidates.len(), "room name candidates");

    let mut seen = HashSet::new();
    let mut rooms = Vec::new();

    for candidate in &candidates {
        if rooms.len() >= options.max_rooms {
            debug!(max = options.max_rooms, "room cap reached");
            break;
        }

        let name = match doc.text(candidate) {
            Ok(text) => normalize_whitespace(&text),
            Err(e) => {
                debug!(error = %e, "unreadable room name");
                continue;
            }
        };
        if name.is_empty() || is_furniture(&name) {
            continue;
        }
        if !seen.insert(name.clone()) {
            continue;
        }

        let price = pair_price(doc, candidate, options);
        rooms.push(RoomRecord::new(name, price));
    }

    info!(count = rooms.len(), "Extracted rooms");
    rooms
}
