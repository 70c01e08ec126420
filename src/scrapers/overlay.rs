//! Best-effort removal of consent banners, modals and backdrops.
//!
//! Nothing here fails: every problem is logged at debug level and swallowed.
//! Hiding too much is acceptable; leaving a stale overlay over a control is not.

use crate::driver::{Document, Query};
use crate::scrapers::locator::resolve_first;
use tracing::debug;

/// Consent and close buttons clicked when visible
const DISMISS_CONTROLS: &[&str] = &[
    "#onetrust-accept-btn-handler",
    "button[data-testid='cookie-policy-dialog-accept-button']",
    "button[aria-label='Dismiss']",
    "button[aria-label='Close']",
];

/// Anything that looks like a dialog, modal or backdrop
pub const OVERLAY_SELECTOR: &str = "div[role='dialog'], div[role='alertdialog'], \
     div[class*='backdrop'], div[class*='overlay'], div[class*='modal'], \
     div[aria-modal='true'], div[data-testid*='modal'], div[data-testid*='overlay'], \
     div.bbe73dce14";

/// Neutral viewport point clicked to collapse tooltips and popovers
const NEUTRAL_POINT: (f64, f64) = (5.0, 5.0);

/// Click known consent/close controls, then click a neutral point
pub fn dismiss_quick<D: Document>(doc: &D) {
    for css in DISMISS_CONTROLS {
        let Some(control) = resolve_first(doc, &[Query::css(*css)]) else {
            continue;
        };
        if !doc.is_displayed(&control).unwrap_or(false) {
            continue;
        }
        match doc.click(&control) {
            Ok(()) => debug!(control = *css, "dismissed overlay"),
            Err(e) => debug!(control = *css, error = %e, "dismiss click failed"),
        }
    }

    if let Err(e) = doc.click_at(NEUTRAL_POINT.0, NEUTRAL_POINT.1) {
        debug!(error = %e, "neutral click failed");
    }
}

/// Force every overlay-like element invisible, whether or not it is blocking
pub fn hard_hide<D: Document>(doc: &D) {
    match doc.hide_matching(OVERLAY_SELECTOR) {
        Ok(0) => {}
        Ok(hidden) => debug!(hidden, "hid overlay elements"),
        Err(e) => debug!(error = %e, "overlay hide failed"),
    }
}

/// Both tiers, quick dismiss first
pub fn suppress<D: Document>(doc: &D) {
    dismiss_quick(doc);
    hard_hide(doc);
}
