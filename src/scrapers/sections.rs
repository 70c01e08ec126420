use crate::driver::{Document, Query};
use crate::scrapers::locator::first_displayed;

const REVIEWS: &str = "#hotel_reviews, [data-testid*='reviews'], [id*='reviews']";
const POLICIES: &str = "#hotel_policy, #hotelPolicies, [data-testid*='policies'], [id*='policy']";

/// Whether a reviews or house-policies block is shown on a detail page
pub fn reviews_or_policies_visible<D: Document>(doc: &D) -> bool {
    first_displayed(doc, &[Query::css(REVIEWS)]) || first_displayed(doc, &[Query::css(POLICIES)])
}
