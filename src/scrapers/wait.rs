//! Poll-until-condition waiting.
//!
//! Every blocking wait in the engine goes through [`wait_until`]. It keeps no
//! state between calls, so waits may nest freely.

use crate::driver::{Document, Query};
use crate::error::WaitTimeout;
use crate::scrapers::locator::resolve;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

const MIN_POLL: Duration = Duration::from_millis(1);

/// Timeout and poll interval for one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitSpec {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl WaitSpec {
    /// Primary navigation waits
    pub const STANDARD: WaitSpec = WaitSpec::new(Duration::from_secs(10), Duration::from_millis(100));
    /// Optional UI such as autocomplete, where a timeout just means "skip it"
    pub const SHORT: WaitSpec = WaitSpec::new(Duration::from_secs(3), Duration::from_millis(100));

    pub const fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }
}

impl Default for WaitSpec {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Evaluate `check` every `poll_interval` until it yields a value or the timeout elapses.
///
/// The check always runs at least once, and once more at the deadline.
///
/// # Errors
///
/// Returns [`WaitTimeout`] naming `what` when the deadline passes; callers decide
/// whether that is fatal.
pub fn wait_until<T, F>(spec: WaitSpec, what: &str, mut check: F) -> Result<T, WaitTimeout>
where
    F: FnMut() -> Option<T>,
{
    let start = Instant::now();
    let poll = spec.poll_interval.max(MIN_POLL);

    loop {
        if let Some(value) = check() {
            return Ok(value);
        }

        let elapsed = start.elapsed();
        if elapsed >= spec.timeout {
            debug!(what, ?elapsed, "wait timed out");
            return Err(WaitTimeout {
                what: what.to_string(),
                elapsed,
            });
        }

        thread::sleep(poll.min(spec.timeout - elapsed));
    }
}

/// Fixed pause letting an asynchronous re-render finish
pub fn pause(duration: Duration) {
    if !duration.is_zero() {
        thread::sleep(duration);
    }
}

/// Wait until some strategy resolves to at least one node
pub fn wait_for_present<'a, D: Document>(
    doc: &'a D,
    strategies: &[Query],
    spec: WaitSpec,
    what: &str,
) -> Result<Vec<D::Node<'a>>, WaitTimeout> {
    wait_until(spec, what, || {
        let found = resolve(doc, strategies);
        (!found.is_empty()).then_some(found)
    })
}

/// Wait until a resolved node is displayed; yields the displayed ones
pub fn wait_for_visible<'a, D: Document>(
    doc: &'a D,
    strategies: &[Query],
    spec: WaitSpec,
    what: &str,
) -> Result<Vec<D::Node<'a>>, WaitTimeout> {
    wait_until(spec, what, || {
        let visible: Vec<_> = resolve(doc, strategies)
            .into_iter()
            .filter(|node| doc.is_displayed(node).unwrap_or(false))
            .collect();
        (!visible.is_empty()).then_some(visible)
    })
}

/// Wait until the resolved set is non-empty and every node in it is displayed
pub fn wait_for_all_visible<'a, D: Document>(
    doc: &'a D,
    strategies: &[Query],
    spec: WaitSpec,
    what: &str,
) -> Result<Vec<D::Node<'a>>, WaitTimeout> {
    wait_until(spec, what, || {
        let found = resolve(doc, strategies);
        let all_visible = !found.is_empty()
            && found
                .iter()
                .all(|node| doc.is_displayed(node).unwrap_or(false));
        all_visible.then_some(found)
    })
}

/// Wait for a displayed node that is not disabled
pub fn wait_for_clickable<'a, D: Document>(
    doc: &'a D,
    strategies: &[Query],
    spec: WaitSpec,
    what: &str,
) -> Result<D::Node<'a>, WaitTimeout> {
    wait_until(spec, what, || {
        resolve(doc, strategies).into_iter().find(|node| {
            doc.is_displayed(node).unwrap_or(false)
                && doc.attribute(node, "disabled").ok().flatten().is_none()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::HtmlDocument;
    use std::cell::Cell;

    const FAST: WaitSpec = WaitSpec::new(Duration::from_millis(60), Duration::from_millis(5));

    #[test]
    fn returns_immediately_when_condition_holds() {
        let calls = Cell::new(0);
        let value = wait_until(FAST, "ready", || {
            calls.set(calls.get() + 1);
            Some(42)
        })
        .unwrap();
        assert_eq!(value, 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn polls_until_condition_holds() {
        let calls = Cell::new(0);
        let value = wait_until(FAST, "third poll", || {
            calls.set(calls.get() + 1);
            (calls.get() >= 3).then_some("done")
        })
        .unwrap();
        assert_eq!(value, "done");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn times_out_without_panicking() {
        let err = wait_until(FAST, "never", || None::<()>).unwrap_err();
        assert_eq!(err.what, "never");
        assert!(err.elapsed >= FAST.timeout);
    }

    #[test]
    fn nested_waits_are_independent() {
        let outer_calls = Cell::new(0);
        let result = wait_until(FAST, "outer", || {
            outer_calls.set(outer_calls.get() + 1);
            let inner = wait_until(
                WaitSpec::new(Duration::from_millis(10), Duration::from_millis(2)),
                "inner",
                || None::<()>,
            );
            inner.is_err().then_some(outer_calls.get())
        })
        .unwrap();
        assert_eq!(result, 1);
    }

    #[test]
    fn zero_timeout_still_checks_once() {
        let spec = WaitSpec::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(wait_until(spec, "once", || Some(1)).unwrap(), 1);
        assert!(wait_until(spec, "once", || None::<u8>).is_err());
    }

    #[test]
    fn visible_wait_skips_hidden_matches() {
        let doc = HtmlDocument::new(
            r#"<div class="panel" style="display:none">a</div><div class="panel">b</div>"#,
        );
        let visible = wait_for_visible(&doc, &[Query::css(".panel")], FAST, "panel").unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(doc.text(&visible[0]).unwrap(), "b");
    }

    #[test]
    fn all_visible_wait_requires_every_match() {
        let doc = HtmlDocument::new(r#"<li class="opt">a</li><li class="opt" hidden>b</li>"#);
        assert!(wait_for_all_visible(&doc, &[Query::css(".opt")], FAST, "options").is_err());
    }

    #[test]
    fn clickable_wait_ignores_disabled_controls() {
        let doc = HtmlDocument::new(
            r#"<button type="submit" disabled>Wait</button><button type="submit">Search</button>"#,
        );
        let button =
            wait_for_clickable(&doc, &[Query::css("button[type='submit']")], FAST, "submit")
                .unwrap();
        assert_eq!(doc.text(&button).unwrap(), "Search");
    }
}
