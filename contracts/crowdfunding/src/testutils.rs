//! Test doubles for the host capabilities.

extern crate std;

use core::cell::{Cell, RefCell};
use std::vec::Vec;

use soroban_sdk::{Address, Env};

use crate::host::{Clock, ValueTransfer};
use crate::ledger::CampaignLedger;
use crate::storage;
use crate::types::CampaignStatus;
use crate::Error;

/// A clock the test moves by hand.
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn at(now: u64) -> Self {
        ManualClock {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.set(now);
    }

    pub fn advance(&self, secs: u64) {
        self.now.set(self.now.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.get()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Movement {
    Received(Address, i128),
    Sent(Address, i128),
}

/// Records every value movement instead of performing it.
pub struct RecordingTransfer {
    movements: RefCell<Vec<Movement>>,
}

impl RecordingTransfer {
    pub fn new() -> Self {
        RecordingTransfer {
            movements: RefCell::new(Vec::new()),
        }
    }

    pub fn movements(&self) -> Vec<Movement> {
        self.movements.borrow().clone()
    }
}

impl ValueTransfer for RecordingTransfer {
    fn receive(&self, from: &Address, amount: i128) {
        self.movements
            .borrow_mut()
            .push(Movement::Received(from.clone(), amount));
    }

    fn transfer(&self, to: &Address, amount: i128) {
        self.movements
            .borrow_mut()
            .push(Movement::Sent(to.clone(), amount));
    }
}

/// The call a hostile counterparty makes back into the ledger mid-movement.
pub enum Reentry {
    Contribute(Address, i128),
    Collect(Address),
    Withdraw(Address),
}

/// A counterparty that re-enters the ledger from inside `receive` (for
/// [`Reentry::Contribute`]) or `transfer` (otherwise) and records what it was
/// able to observe and achieve.
pub struct ReentrantRecipient<'a> {
    env: &'a Env,
    clock: ManualClock,
    reentry: Reentry,
    inner: RecordingTransfer,
    sent: RecordingTransfer,
    outcomes: RefCell<Vec<Result<i128, Error>>>,
    observed_status: Cell<Option<CampaignStatus>>,
    observed_contribution: Cell<Option<i128>>,
}

impl<'a> ReentrantRecipient<'a> {
    pub fn new(env: &'a Env, now: u64, reentry: Reentry) -> Self {
        ReentrantRecipient {
            env,
            clock: ManualClock::at(now),
            reentry,
            inner: RecordingTransfer::new(),
            sent: RecordingTransfer::new(),
            outcomes: RefCell::new(Vec::new()),
            observed_status: Cell::new(None),
            observed_contribution: Cell::new(None),
        }
    }

    pub fn outcomes(&self) -> Vec<Result<i128, Error>> {
        self.outcomes.borrow().clone()
    }

    pub fn observed_status(&self) -> Option<CampaignStatus> {
        self.observed_status.get()
    }

    pub fn observed_contribution(&self) -> Option<i128> {
        self.observed_contribution.get()
    }

    /// Transfers made by the outer call, excluding anything the reentrant
    /// call managed to move.
    pub fn sent(&self) -> Vec<Movement> {
        self.sent.movements()
    }
}

impl<'a> ReentrantRecipient<'a> {
    fn observe_and_reenter(&self, counterparty: &Address) {
        self.observed_status
            .set(storage::load_state(self.env).ok().map(|s| s.status));
        self.observed_contribution
            .set(Some(storage::contribution_of(self.env, counterparty)));

        let ledger = CampaignLedger::new(self.env, &self.clock, &self.inner);
        let outcome = match &self.reentry {
            Reentry::Contribute(contributor, amount) => ledger.contribute(contributor, *amount),
            Reentry::Collect(caller) => ledger.collect(caller),
            Reentry::Withdraw(caller) => ledger.withdraw(caller),
        };
        self.outcomes.borrow_mut().push(outcome);
    }
}

impl ValueTransfer for ReentrantRecipient<'_> {
    fn receive(&self, from: &Address, amount: i128) {
        self.sent.receive(from, amount);
        if matches!(self.reentry, Reentry::Contribute(..)) {
            self.observe_and_reenter(from);
        }
    }

    fn transfer(&self, to: &Address, amount: i128) {
        self.sent.transfer(to, amount);
        if !matches!(self.reentry, Reentry::Contribute(..)) {
            self.observe_and_reenter(to);
        }
    }
}
