//! Offer stream
//!
//! A lazy, bounded sequence of `{ contact, contract }` offers for one
//! published shard contract. Farmers push offers in; the coordinator
//! drains up to `max_offers` of them, then the stream ends.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use shardnet_core::{Contract, FarmerContact, PublicKey};
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferError {
    Destroyed,
    DuplicateFarmer,
    IncompleteContract,
    QueueFull,
}

pub struct Offer {
    pub contact: FarmerContact,
    pub contract: Contract,
}

struct State {
    queue: VecDeque<Offer>,
    seen_farmers: HashSet<PublicKey>,
    enqueued_total: usize,
    destroyed: bool,
}

/// One published contract's offer queue. `max_offers` bounds both the
/// in-queue depth and the lifetime total ever accepted.
pub struct OfferStream {
    max_offers: usize,
    state: Mutex<State>,
    notify: Notify,
}

impl OfferStream {
    pub fn new(max_offers: usize) -> Self {
        Self {
            max_offers,
            state: Mutex::new(State {
                queue: VecDeque::new(),
                seen_farmers: HashSet::new(),
                enqueued_total: 0,
                destroyed: false,
            }),
            notify: Notify::new(),
        }
    }

    /// Admit one offer. Rejects if destroyed, the farmer has already
    /// offered, the contract isn't complete, or the queue has already
    /// accepted `max_offers` offers over its lifetime.
    pub fn add_offer(&self, contact: FarmerContact, contract: Contract) -> Result<(), OfferError> {
        if !contract.is_complete() {
            return Err(OfferError::IncompleteContract);
        }
        let mut state = self.state.lock().expect("offer stream poisoned");
        if state.destroyed {
            return Err(OfferError::Destroyed);
        }
        if state.seen_farmers.contains(&contact.node_id) {
            return Err(OfferError::DuplicateFarmer);
        }
        if state.enqueued_total >= self.max_offers {
            return Err(OfferError::QueueFull);
        }
        state.seen_farmers.insert(contact.node_id);
        state.enqueued_total += 1;
        state.queue.push_back(Offer { contact, contract });
        drop(state);
        self.notify.notify_one();
        Ok(())
    }

    /// Dequeue the next offer, waiting if the queue is currently empty.
    /// Returns `None` once `max_offers` have been emitted or the stream
    /// is destroyed.
    pub async fn next(&self) -> Option<Offer> {
        loop {
            {
                let mut state = self.state.lock().expect("offer stream poisoned");
                if let Some(offer) = state.queue.pop_front() {
                    return Some(offer);
                }
                if state.destroyed || state.enqueued_total >= self.max_offers {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    /// Immediately clears the queue and marks the stream destroyed;
    /// any waiting consumer wakes and sees `None`.
    pub fn destroy(&self) {
        let mut state = self.state.lock().expect("offer stream poisoned");
        state.queue.clear();
        state.destroyed = true;
        drop(state);
        self.notify.notify_waiters();
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.lock().expect("offer stream poisoned").destroyed
    }

    pub fn accepted_count(&self) -> usize {
        self.state.lock().expect("offer stream poisoned").enqueued_total
    }
}
