//! Result filter toggling.
//!
//! Filters are advisory: one that cannot be found is logged and skipped. They
//! are applied strictly one after another with a settle pause in between,
//! since each click re-renders the result list.

use crate::driver::{Document, Query};
use crate::error::DriverError;
use crate::scrapers::wait::pause;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

pub const DEFAULT_SETTLE: Duration = Duration::from_millis(700);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FilterOutcome {
    /// Clicked through the strategy at this index
    Applied { strategy: usize },
    NotFound,
}

/// A named filter and the ways of finding its control
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub name: &'static str,
    pub strategies: Vec<Query>,
}

/// Four or five star properties
pub fn star_rating() -> FilterSpec {
    FilterSpec {
        name: "4+ stars",
        strategies: vec![
            Query::css("input[name='class=4'], input[name='class=5']"),
            Query::containing("div[data-filters-group='class'] span", "4 stars"),
            Query::containing("div[data-filters-group='class'] span", "4"),
        ],
    }
}

pub fn breakfast_included() -> FilterSpec {
    FilterSpec {
        name: "breakfast included",
        strategies: vec![
            Query::css("input[name='mealplan=1']"),
            Query::containing("div[data-testid*='filters-group'] span", "breakfast"),
            Query::containing("span", "breakfast included"),
        ],
    }
}

pub fn free_cancellation() -> FilterSpec {
    FilterSpec {
        name: "free cancellation",
        strategies: vec![
            Query::css("input[name='fc=1']"),
            Query::containing("div[data-testid*='filters-group'] span", "free cancellation"),
            Query::containing("span", "free cancellation"),
        ],
    }
}

/// The filters applied by a standard search run, in order
pub fn default_filters() -> Vec<FilterSpec> {
    vec![star_rating(), breakfast_included(), free_cancellation()]
}

pub struct FilterApplier<'a, D: Document> {
    doc: &'a D,
    settle: Duration,
}

impl<'a, D: Document> FilterApplier<'a, D> {
    pub fn new(doc: &'a D) -> Self {
        Self::with_settle(doc, DEFAULT_SETTLE)
    }

    pub fn with_settle(doc: &'a D, settle: Duration) -> Self {
        Self { doc, settle }
    }

    /// Toggle the first control any strategy finds, preferring an input's label
    pub fn apply(&self, filter: &FilterSpec) -> FilterOutcome {
        for (index, strategy) in filter.strategies.iter().enumerate() {
            let control = match self.doc.query(None, strategy) {
                Ok(found) => found.into_iter().next(),
                Err(e) => {
                    debug!(filter = filter.name, strategy = %strategy, error = %e, "strategy failed");
                    None
                }
            };
            let Some(control) = control else {
                continue;
            };

            match self.toggle(&control) {
                Ok(()) => {
                    info!(filter = filter.name, strategy = %strategy, "Filter applied");
                    pause(self.settle);
                    return FilterOutcome::Applied { strategy: index };
                }
                Err(e) => {
                    debug!(filter = filter.name, strategy = %strategy, error = %e, "filter click failed");
                }
            }
        }

        info!(
            filter = filter.name,
            strategies = filter.strategies.len(),
            "Filter not found"
        );
        FilterOutcome::NotFound
    }

    /// Apply each filter in turn
    pub fn apply_all(&self, filters: &[FilterSpec]) -> Vec<(&'static str, FilterOutcome)> {
        filters.iter().map(|f| (f.name, self.apply(f))).collect()
    }

    fn toggle(&self, control: &D::Node<'a>) -> Result<(), DriverError> {
        if self.doc.tag_name(control)? != "input" {
            return self.doc.click(control);
        }

        if let Some(label) = self.label_for(control) {
            match self.doc.click(&label) {
                Ok(()) => return Ok(()),
                Err(e) => debug!(error = %e, "label click failed, clicking input"),
            }
        }
        self.doc.click(control)
    }

    fn label_for(&self, input: &D::Node<'a>) -> Option<D::Node<'a>> {
        let id = self
            .doc
            .attribute(input, "id")
            .ok()
            .flatten()
            .filter(|id| !id.trim().is_empty())?;
        let css = format!("label[for='{}']", id.replace('\'', "\\'"));
        self.doc.select(None, &css).ok()?.into_iter().next()
    }
}
