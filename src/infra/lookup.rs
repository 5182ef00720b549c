//! Debounced address lookups for the origin and destination fields.
//!
//! Each field has its own [`Debouncer`], so typing in one never cancels the
//! other. Outcomes arrive on a channel in completion order; the session
//! decides whether they are still current.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use super::debounce::Debouncer;
use crate::domain::{
    AddressCandidate, AddressResolver, AddressSide, Language, LookupTicket, ResolveError,
};

#[derive(Debug)]
pub struct LookupOutcome {
    pub ticket: LookupTicket,
    pub result: Result<Vec<AddressCandidate>, ResolveError>,
}

pub struct AddressLookup<R> {
    resolver: Arc<R>,
    origin: Debouncer,
    destination: Debouncer,
    outcomes_tx: mpsc::UnboundedSender<LookupOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<LookupOutcome>,
}

impl<R> AddressLookup<R>
where
    R: AddressResolver + 'static,
{
    pub fn new(resolver: Arc<R>, delay: Duration) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            resolver,
            origin: Debouncer::new(delay),
            destination: Debouncer::new(delay),
            outcomes_tx,
            outcomes_rx,
        }
    }

    fn debouncer(&mut self, side: AddressSide) -> &mut Debouncer {
        match side {
            AddressSide::Origin => &mut self.origin,
            AddressSide::Destination => &mut self.destination,
        }
    }

    /// Queues `ticket` for resolution after the field has been quiet for the
    /// debounce delay. A newer ticket for the same field replaces it.
    pub fn schedule(&mut self, ticket: LookupTicket, language: Language) {
        let resolver = Arc::clone(&self.resolver);
        let outcomes = self.outcomes_tx.clone();
        self.debouncer(ticket.side).schedule(async move {
            debug!(side = %ticket.side, seq = ticket.seq, "resolving address");
            let result = resolver.resolve(&ticket.query, language).await;
            // Receiver only goes away with `self`.
            let _ = outcomes.send(LookupOutcome { ticket, result });
        });
    }

    pub fn cancel(&mut self, side: AddressSide) {
        self.debouncer(side).cancel();
    }

    pub fn cancel_all(&mut self) {
        self.origin.cancel();
        self.destination.cancel();
    }

    pub fn is_pending(&self, side: AddressSide) -> bool {
        match side {
            AddressSide::Origin => self.origin.is_pending(),
            AddressSide::Destination => self.destination.is_pending(),
        }
    }

    /// Waits for the next finished lookup.
    pub async fn next_outcome(&mut self) -> Option<LookupOutcome> {
        self.outcomes_rx.recv().await
    }

    pub fn try_next_outcome(&mut self) -> Option<LookupOutcome> {
        self.outcomes_rx.try_recv().ok()
    }
}
