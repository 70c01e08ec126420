//! Element resolution through ordered fallback chains.
//!
//! A chain is a slice of [`Query`] values. Strategies are tried in order and the
//! first one with at least one match wins; later strategies are not evaluated.
//! Finding nothing is an ordinary outcome, so these functions return empty
//! results instead of errors.

use crate::driver::{normalize_whitespace, Document, Query};
use tracing::debug;

fn resolve_from<'a, D: Document>(
    doc: &'a D,
    scope: Option<&D::Node<'a>>,
    strategies: &[Query],
) -> Vec<D::Node<'a>> {
    for (index, strategy) in strategies.iter().enumerate() {
        match doc.query(scope, strategy) {
            Ok(found) if !found.is_empty() => {
                debug!(strategy = %strategy, index, matches = found.len(), "resolved");
                return found;
            }
            Ok(_) => debug!(strategy = %strategy, index, "no match"),
            Err(e) => debug!(strategy = %strategy, index, error = %e, "strategy failed"),
        }
    }
    Vec::new()
}

/// Matches of the first strategy that finds anything, searching the whole page
pub fn resolve<'a, D: Document>(doc: &'a D, strategies: &[Query]) -> Vec<D::Node<'a>> {
    resolve_from(doc, None, strategies)
}

/// Same as [`resolve`], rooted at `scope`
pub fn resolve_within<'a, D: Document>(
    doc: &'a D,
    scope: &D::Node<'a>,
    strategies: &[Query],
) -> Vec<D::Node<'a>> {
    resolve_from(doc, Some(scope), strategies)
}

/// First node of the winning strategy
pub fn resolve_first<'a, D: Document>(doc: &'a D, strategies: &[Query]) -> Option<D::Node<'a>> {
    resolve(doc, strategies).into_iter().next()
}

/// Trimmed text of the first match under `scope`, or `fallback` when nothing matches.
///
/// A match with blank text yields the blank text, so "missing" and "empty" stay
/// distinguishable.
pub fn text_or<'a, D: Document>(
    doc: &'a D,
    scope: &D::Node<'a>,
    strategies: &[Query],
    fallback: &str,
) -> String {
    resolve_within(doc, scope, strategies)
        .first()
        .and_then(|node| doc.text(node).ok())
        .map(|text| text.trim().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// Attribute of the first match under `scope`; `fallback` when missing or blank
pub fn attr_or<'a, D: Document>(
    doc: &'a D,
    scope: &D::Node<'a>,
    strategies: &[Query],
    attribute: &str,
    fallback: &str,
) -> String {
    resolve_within(doc, scope, strategies)
        .first()
        .and_then(|node| doc.attribute(node, attribute).ok().flatten())
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Whitespace-normalized text of the first strategy whose first match has non-blank text.
///
/// Unlike [`resolve_within`], a strategy whose match is blank does not stop the chain.
pub fn first_text<'a, D: Document>(
    doc: &'a D,
    scope: &D::Node<'a>,
    strategies: &[Query],
) -> Option<String> {
    strategies.iter().find_map(|strategy| {
        let found = doc.query(Some(scope), strategy).ok()?;
        let text = normalize_whitespace(&doc.text(found.first()?).ok()?);
        (!text.is_empty()).then_some(text)
    })
}

/// Whether the first match of the chain is currently displayed
pub fn first_displayed<D: Document>(doc: &D, strategies: &[Query]) -> bool {
    resolve_first(doc, strategies)
        .map(|node| doc.is_displayed(&node).unwrap_or(false))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::HtmlDocument;

    const CARD: &str = r#"
        <div class="card">
          <h3 class="title">Sea View Resort</h3>
          <span class="price"> </span>
          <img src="">
          <a class="link" href="/hotel/sea-view">Open</a>
        </div>
        <div class="extra">Extra</div>"#;

    #[test]
    fn first_matching_strategy_wins() {
        let doc = HtmlDocument::new(CARD);
        let found = resolve(
            &doc,
            &[
                Query::css(".missing"),
                Query::css(".title"),
                Query::css("div"),
            ],
        );
        assert_eq!(found.len(), 1);
        assert_eq!(doc.text(&found[0]).unwrap(), "Sea View Resort");
    }

    #[test]
    fn later_strategies_are_never_consulted() {
        let doc = HtmlDocument::new(CARD);
        resolve(
            &doc,
            &[
                Query::css(".nope"),
                Query::css(".card"),
                Query::css(".extra"),
                Query::css("div"),
            ],
        );
        assert_eq!(doc.query_log(), vec![".nope".to_string(), ".card".to_string()]);
    }

    #[test]
    fn exhausted_chain_is_empty_not_an_error() {
        let doc = HtmlDocument::new(CARD);
        assert!(resolve(&doc, &[Query::css(".a"), Query::css(".b")]).is_empty());
        assert!(resolve(&doc, &[]).is_empty());
    }

    #[test]
    fn invalid_strategy_falls_through() {
        let doc = HtmlDocument::new(CARD);
        let found = resolve(&doc, &[Query::css("div[[["), Query::css(".extra")]);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn text_strategies_filter_candidates() {
        let doc = HtmlDocument::new(CARD);
        let found = resolve(&doc, &[Query::containing("div", "extra")]);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn scoped_accessors_use_fallbacks() {
        let doc = HtmlDocument::new(CARD);
        let card = resolve_first(&doc, &[Query::css(".card")]).unwrap();

        assert_eq!(text_or(&doc, &card, &[Query::css(".title")], "N/A"), "Sea View Resort");
        assert_eq!(text_or(&doc, &card, &[Query::css(".rating")], "Rating not available"), "Rating not available");
        // present but blank stays blank
        assert_eq!(text_or(&doc, &card, &[Query::css(".price")], "Price not visible"), "");
        assert_eq!(attr_or(&doc, &card, &[Query::css("img")], "src", "Image not found"), "Image not found");
        assert_eq!(attr_or(&doc, &card, &[Query::css("a")], "href", "none"), "/hotel/sea-view");
    }

    #[test]
    fn first_text_skips_blank_matches() {
        let doc = HtmlDocument::new(CARD);
        let card = resolve_first(&doc, &[Query::css(".card")]).unwrap();
        let text = first_text(&doc, &card, &[Query::css(".price"), Query::css(".link")]);
        assert_eq!(text.as_deref(), Some("Open"));
        assert_eq!(first_text(&doc, &card, &[Query::css(".price")]), None);
    }
}
