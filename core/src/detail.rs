//! Single-record loader for the detail screen.
//!
//! The screen refetches every time it gains focus, so unlike the list there
//! is no overlap suppression: each `begin` bumps a generation counter and
//! hands out a ticket tagged with it. What happens when an older ticket
//! completes after a newer one was issued is governed by `StalePolicy`.

use std::cell::RefCell;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::fetch::CharacterSource;
use crate::present::{DetailView, Labels};
use crate::types::CharacterRecord;

/// How completions of superseded requests are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StalePolicy {
    /// Only the most recent request may update the record or clear busy.
    #[default]
    DiscardSuperseded,
    /// Every completion applies; whichever resolves last wins.
    LastWriterWins,
}

impl FromStr for StalePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "discard_superseded" => Ok(StalePolicy::DiscardSuperseded),
            "last_writer_wins" => Ok(StalePolicy::LastWriterWins),
            other => Err(format!("unsupported stale policy: {other}")),
        }
    }
}

#[derive(Debug)]
#[must_use = "a ticket holds the busy flag until finished or abandoned"]
pub struct RecordTicket {
    id: u32,
    generation: u64,
}

impl RecordTicket {
    /// Position of this request in issue order, starting at 1.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub struct DetailState {
    record: Option<CharacterRecord>,
    busy: bool,
    generation: u64,
    policy: StalePolicy,
}

impl Default for DetailState {
    fn default() -> Self {
        Self::new(StalePolicy::default())
    }
}

impl DetailState {
    /// Starts busy: the screen shows a spinner before the first fetch.
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            record: None,
            busy: true,
            generation: 0,
            policy,
        }
    }

    pub fn record(&self) -> Option<&CharacterRecord> {
        self.record.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn begin(&mut self, id: u32) -> RecordTicket {
        self.busy = true;
        self.generation += 1;
        RecordTicket {
            id,
            generation: self.generation,
        }
    }

    fn is_current(&self, ticket: &RecordTicket) -> bool {
        self.policy == StalePolicy::LastWriterWins || ticket.generation == self.generation
    }

    /// Returns `false` when the completion was discarded as superseded.
    pub fn finish(&mut self, ticket: RecordTicket, outcome: Result<CharacterRecord, ApiError>) -> bool {
        if !self.is_current(&ticket) {
            warn!(
                id = ticket.id,
                generation = ticket.generation,
                latest = self.generation,
                "discarding superseded character response"
            );
            return false;
        }
        match outcome {
            Ok(record) => {
                info!(id = ticket.id, name = %record.name, "character loaded");
                self.record = Some(record);
            }
            Err(err) => {
                error!(id = ticket.id, error = %err, "failed to fetch character");
            }
        }
        self.busy = false;
        true
    }

    pub fn abandon(&mut self, ticket: RecordTicket) {
        if self.is_current(&ticket) {
            self.busy = false;
        }
    }

    pub fn view(&self, labels: &Labels) -> DetailView {
        DetailView::derive(self.busy, self.record.as_ref(), labels)
    }
}

/// Async detail controller over a `CharacterSource`.
pub struct DetailController<S> {
    source: S,
    state: RefCell<DetailState>,
}

impl<S: CharacterSource> DetailController<S> {
    pub fn new(source: S) -> Self {
        Self::with_policy(source, StalePolicy::default())
    }

    pub fn with_policy(source: S, policy: StalePolicy) -> Self {
        Self {
            source,
            state: RefCell::new(DetailState::new(policy)),
        }
    }

    pub fn record(&self) -> Option<CharacterRecord> {
        self.state.borrow().record().cloned()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    pub fn view(&self, labels: &Labels) -> DetailView {
        self.state.borrow().view(labels)
    }

    /// Fetch `id` and replace the record on success.
    pub async fn load_record(&self, id: u32) {
        let ticket = self.state.borrow_mut().begin(id);
        let mut pending = Pending {
            state: &self.state,
            ticket: Some(ticket),
        };
        let outcome = self.source.fetch_character(id).await;
        pending.finish(outcome);
    }

    /// The screen became active for `id`.
    pub async fn focus(&self, id: u32) {
        self.load_record(id).await;
    }
}

struct Pending<'a> {
    state: &'a RefCell<DetailState>,
    ticket: Option<RecordTicket>,
}

impl Pending<'_> {
    fn finish(&mut self, outcome: Result<CharacterRecord, ApiError>) {
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
