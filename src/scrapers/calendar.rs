//! Date picker navigation.
//!
//! `Closed → Open → TabSelected → DateVisible → Selected`. The tab step is
//! optional; single-tab pickers go straight from `Open` to the date search.
//! Unlike most of the engine, failing to find a date is fatal: the search has
//! no meaning without one.

use crate::driver::{Document, Query};
use crate::error::FlowError;
use crate::models::DateTarget;
use crate::scrapers::locator::resolve_first;
use crate::scrapers::overlay::{hard_hide, suppress};
use crate::scrapers::wait::{wait_for_present, wait_for_visible, WaitSpec};
use tracing::{debug, info};

/// Months paged through before giving up on a date
pub const MAX_MONTH_PAGES: usize = 10;

const OPENER: &str = "span[data-testid='date-display-field-start'], \
     button[data-testid='date-display-field-start']";
const PICKER: &str = "div[role='dialog'], [data-testid='searchbox-datepicker-calendar']";
const CALENDAR_TAB: &str = "button#calendar-searchboxdatepicker-tab-trigger";
const NEXT_MONTH: &str = "button[aria-label*='Next month'], button[data-testid='calendar-next']";

fn day_cell(date: DateTarget) -> Query {
    let key = date.key();
    Query::css(format!(
        "span[data-date='{key}'], td[data-date='{key}']"
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarState {
    Closed,
    Open,
    TabSelected,
    /// The target cell is on screen but not yet clicked
    DateVisible(DateTarget),
    Selected(DateTarget),
}

pub struct CalendarNavigator<'a, D: Document> {
    doc: &'a D,
    wait: WaitSpec,
    max_pages: usize,
    state: CalendarState,
}

impl<'a, D: Document> CalendarNavigator<'a, D> {
    pub fn new(doc: &'a D, wait: WaitSpec) -> Self {
        Self {
            doc,
            wait,
            max_pages: MAX_MONTH_PAGES,
            state: CalendarState::Closed,
        }
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn state(&self) -> CalendarState {
        self.state
    }

    fn confirm_open(&self) -> Result<(), FlowError> {
        wait_for_visible(self.doc, &[Query::css(PICKER)], self.wait, "date picker")?;
        Ok(())
    }

    /// Activate the date field and wait for the picker surface
    pub fn open(&mut self) -> Result<(), FlowError> {
        suppress(self.doc);

        let opener = wait_for_present(self.doc, &[Query::css(OPENER)], self.wait, "date field")?;
        if let Some(opener) = opener.first() {
            self.doc.click(opener)?;
        }
        self.confirm_open()?;

        info!("Date picker open");
        self.state = CalendarState::Open;
        Ok(())
    }

    /// Switch to the calendar tab if the picker has tabs; a missing tab is fine
    pub fn select_tab(&mut self) -> bool {
        let Some(tab) = resolve_first(self.doc, &[Query::css(CALENDAR_TAB)]) else {
            debug!("no calendar tab, assuming single-tab picker");
            return false;
        };
        match self.doc.click(&tab) {
            Ok(()) => {
                if self.state == CalendarState::Open {
                    self.state = CalendarState::TabSelected;
                }
                true
            }
            Err(e) => {
                debug!(error = %e, "calendar tab click failed");
                false
            }
        }
    }

    /// Page forward until the cell for `date` shows up, then click it.
    ///
    /// # Errors
    ///
    /// [`FlowError::CalendarClosed`] before [`open`](Self::open),
    /// [`FlowError::NextMonthMissing`] when paging is impossible, and
    /// [`FlowError::DateNotFound`] once the page bound is exhausted.
    pub fn pick(&mut self, date: DateTarget) -> Result<(), FlowError> {
        if self.state == CalendarState::Closed {
            return Err(FlowError::CalendarClosed);
        }
        let cell_query = [day_cell(date)];

        for page in 0..self.max_pages {
            hard_hide(self.doc);

            if let Some(cell) = resolve_first(self.doc, &cell_query) {
                self.state = CalendarState::DateVisible(date);
                self.doc.click(&cell)?;
                self.state = CalendarState::Selected(date);
                info!(%date, pages_turned = page, "Date selected");
                return Ok(());
            }

            let Some(next) = resolve_first(self.doc, &[Query::css(NEXT_MONTH)]) else {
                return Err(FlowError::NextMonthMissing {
                    date: date.key(),
                });
            };
            debug!(%date, page, "date not on screen, paging forward");
            self.doc.click(&next)?;
            self.confirm_open()?;
        }

        Err(FlowError::DateNotFound {
            date: date.key(),
            attempts: self.max_pages,
        })
    }

    /// Pick check-in, then check-out; the picker re-renders after the first pick
    pub fn pick_stay(&mut self, check_in: DateTarget, check_out: DateTarget) -> Result<(), FlowError> {
        if check_out <= check_in {
            return Err(FlowError::InvalidStay {
                check_in: check_in.key(),
                check_out: check_out.key(),
            });
        }
        self.pick(check_in)?;
        self.pick(check_out)
    }
}
