//! Incremental character list: page cursor, append-only items, busy flag.
//!
//! # Design
//! `ListState` is the whole state machine with no I/O: `begin` claims the
//! busy flag and hands out a `PageTicket`, `finish` applies the outcome and
//! releases the flag. Hosts that do their own networking (the C ABI) drive it
//! directly. `ListController` is the async driver over a `CharacterSource`.
//!
//! The controller keeps its state in a `RefCell`, so it is `!Sync` and can
//! only be used from one thread. Busy is checked and set inside a single
//! borrow before the first `.await`, which makes overlap suppression sound
//! under cooperative scheduling.

use std::cell::RefCell;

use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::fetch::CharacterSource;
use crate::present::{CharacterCard, Labels, ListView};
use crate::types::CharacterSummary;

/// Fraction of the visible item count that counts as "near the end".
pub const DEFAULT_END_REACHED_THRESHOLD: f32 = 0.2;

/// Proof that a page load was started. Consumed by `finish` or `abandon`.
#[derive(Debug)]
#[must_use = "a ticket holds the busy flag until finished or abandoned"]
pub struct PageTicket {
    target: u32,
}

impl PageTicket {
    pub fn target(&self) -> u32 {
        self.target
    }
}

#[derive(Debug, Clone)]
pub struct ListState {
    items: Vec<CharacterSummary>,
    page: u32,
    busy: bool,
    activated: bool,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new()
    }
}

impl ListState {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            busy: false,
            activated: false,
        }
    }

    pub fn items(&self) -> &[CharacterSummary] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Claim the busy flag for a load of `target`. Returns `None` while
    /// another load is in flight.
    pub fn begin(&mut self, target: u32) -> Option<PageTicket> {
        if self.busy {
            debug!(target, page = self.page, "page load suppressed, another load in flight");
            return None;
        }
        self.busy = true;
        Some(PageTicket { target })
    }

    /// First activation loads page 1; later activations do nothing.
    pub fn activate(&mut self) -> Option<PageTicket> {
        if self.activated {
            return None;
        }
        let ticket = self.begin(1)?;
        self.activated = true;
        Some(ticket)
    }

    /// Start loading the page after the current cursor.
    pub fn end_reached(&mut self) -> Option<PageTicket> {
        self.begin(self.page + 1)
    }

    pub fn finish(&mut self, ticket: PageTicket, outcome: Result<Vec<CharacterSummary>, ApiError>) {
        match outcome {
            Ok(results) => {
                let count = results.len();
                self.items.extend(results);
                self.page = ticket.target;
                info!(page = self.page, count, total = self.items.len(), "page loaded");
            }
            Err(err) => {
                error!(page = ticket.target, error = %err, "failed to fetch character page");
            }
        }
        self.busy = false;
    }

    /// Release the busy flag without touching items or page.
    pub fn abandon(&mut self, ticket: PageTicket) {
        debug!(page = ticket.target, "page load abandoned");
        self.busy = false;
    }

    /// Whether the last visible row is within `threshold × visible_count`
    /// rows of the end of the list.
    pub fn is_near_end(&self, last_visible: usize, visible_count: usize, threshold: f32) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let last = self.items.len() - 1;
        let remaining = last.saturating_sub(last_visible);
        remaining as f32 <= threshold * visible_count as f32
    }

    pub fn view(&self, labels: &Labels) -> ListView {
        ListView::new(
            self.items.iter().map(|item| CharacterCard::from_summary(item, labels)),
            self.busy,
        )
    }
}

/// Async list controller over a `CharacterSource`.
pub struct ListController<S> {
    source: S,
    state: RefCell<ListState>,
    threshold: f32,
}

impl<S: CharacterSource> ListController<S> {
    pub fn new(source: S) -> Self {
        Self::with_threshold(source, DEFAULT_END_REACHED_THRESHOLD)
    }

    pub fn with_threshold(source: S, threshold: f32) -> Self {
        Self {
            source,
            state: RefCell::new(ListState::new()),
            threshold,
        }
    }

    pub fn items(&self) -> Vec<CharacterSummary> {
        self.state.borrow().items().to_vec()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn page(&self) -> u32 {
        self.state.borrow().page()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    pub fn view(&self, labels: &Labels) -> ListView {
        self.state.borrow().view(labels)
    }

    /// Load `target` and append its results. No-op while busy.
    pub async fn load_page(&self, target: u32) {
        let ticket = self.state.borrow_mut().begin(target);
        self.run(ticket).await;
    }

    /// Screen became active.
    pub async fn activate(&self) {
        let ticket = self.state.borrow_mut().activate();
        self.run(ticket).await;
    }

    /// The consumer rendered close to the end of the list.
    pub async fn end_reached(&self) {
        let ticket = self.state.borrow_mut().end_reached();
        self.run(ticket).await;
    }

    /// Scroll position report; loads the next page when near the end.
    pub async fn scrolled(&self, last_visible: usize, visible_count: usize) {
        let near_end = self
            .state
            .borrow()
            .is_near_end(last_visible, visible_count, self.threshold);
        if near_end {
            self.end_reached().await;
        }
    }

    async fn run(&self, ticket: Option<PageTicket>) {
        let Some(ticket) = ticket else { return };
        let target = ticket.target();
        let mut pending = Pending {
            state: &self.state,
            ticket: Some(ticket),
        };
        let outcome = self.source.fetch_page(target).await;
        pending.finish(outcome);
    }
}

/// Releases the busy flag if the load future is dropped mid-flight.
struct Pending<'a> {
    state: &'a RefCell<ListState>,
    ticket: Option<PageTicket>,
}

impl Pending<'_> {
    fn finish(&mut self, outcome: Result<Vec<CharacterSummary>, ApiError>) {
        if let Some(ticket) = self.ticket.take() {
            self.state.borrow_mut().finish(ticket, outcome);
        }
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            if let Ok(mut state) = self.state.try_borrow_mut() {
                state.abandon(ticket);
            }
        }
    }
}
