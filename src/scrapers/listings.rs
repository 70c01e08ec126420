//! Result card extraction.
//!
//! Each field is looked up independently and falls back to its sentinel, so a
//! card with a missing rating still yields a record.

use crate::driver::{Document, Query};
use crate::models::{
    ListingRecord, IMAGE_NOT_FOUND, NAME_NOT_FOUND, PRICE_NOT_VISIBLE, RATING_NOT_AVAILABLE,
};
use crate::scrapers::locator::{attr_or, resolve, text_or};
use tracing::{debug, info};

pub const PROPERTY_CARD: &str = "div[data-testid='property-card']";

fn name_strategies() -> Vec<Query> {
    vec![Query::css("div[data-testid='title']")]
}

fn price_strategies() -> Vec<Query> {
    vec![Query::css("span[data-testid='price-and-discounted-price']")]
}

fn rating_strategies() -> Vec<Query> {
    vec![Query::css(
        "div[aria-label*='Scored'], div[data-testid='review-score']",
    )]
}

fn image_strategies() -> Vec<Query> {
    vec![Query::css("img")]
}

/// All result cards currently on the page
pub fn find_cards<D: Document>(doc: &D) -> Vec<D::Node<'_>> {
    resolve(doc, &[Query::css(PROPERTY_CARD)])
}

/// Build one record from a card
pub fn extract_listing<'a, D: Document>(doc: &'a D, card: &D::Node<'a>) -> ListingRecord {
    // Keyword flags come from the card's whole text: no structured marker exists.
    let card_text = doc
        .text(card)
        .map(|t| t.to_lowercase())
        .unwrap_or_default();

    ListingRecord {
        name: text_or(doc, card, &name_strategies(), NAME_NOT_FOUND),
        price: text_or(doc, card, &price_strategies(), PRICE_NOT_VISIBLE),
        rating: text_or(doc, card, &rating_strategies(), RATING_NOT_AVAILABLE),
        image_url: attr_or(doc, card, &image_strategies(), "src", IMAGE_NOT_FOUND),
        breakfast_included: card_text.contains("breakfast"),
        free_cancellation: card_text.contains("free cancellation"),
    }
}

/// One record per card, in card order
pub fn extract_all<'a, D: Document>(doc: &'a D, cards: &[D::Node<'a>]) -> Vec<ListingRecord> {
    let records: Vec<ListingRecord> = cards
        .iter()
        .map(|card| extract_listing(doc, card))
        .collect();

    for record in &records {
        debug!(name = %record.name, price = %record.price, "listing");
    }
    info!(count = records.len(), "Extracted listings");
    records
}
