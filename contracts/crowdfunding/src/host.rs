//! # Host capabilities
//!
//! The ledger never reads the clock or moves tokens directly; it goes through
//! [`Clock`] and [`ValueTransfer`]. On chain these are [`LedgerClock`] and
//! [`TokenTransfer`]; tests substitute the doubles in `testutils`.

use soroban_sdk::{token, Address, Env};

/// Source of the current time, in seconds.
pub trait Clock {
    fn now(&self) -> u64;
}

/// Movement of campaign value in and out of contract custody.
///
/// Both calls are atomic with the invocation that makes them: a failed
/// movement traps and the whole invocation is rolled back. `transfer` may run
/// code controlled by the recipient, so callers must commit bookkeeping first.
pub trait ValueTransfer {
    /// Pull `amount` from `from` into contract custody.
    fn receive(&self, from: &Address, amount: i128);
    /// Send `amount` out of contract custody to `to`.
    fn transfer(&self, to: &Address, amount: i128);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> u64 {
        (**self).now()
    }
}

impl<T: ValueTransfer + ?Sized> ValueTransfer for &T {
    fn receive(&self, from: &Address, amount: i128) {
        (**self).receive(from, amount)
    }

    fn transfer(&self, to: &Address, amount: i128) {
        (**self).transfer(to, amount)
    }
}

/// Ledger close time of the current invocation.
pub struct LedgerClock<'a> {
    env: &'a Env,
}

impl<'a> LedgerClock<'a> {
    pub fn new(env: &'a Env) -> Self {
        LedgerClock { env }
    }
}

impl Clock for LedgerClock<'_> {
    fn now(&self) -> u64 {
        self.env.ledger().timestamp()
    }
}

/// Moves the campaign token between accounts and this contract's address.
pub struct TokenTransfer<'a> {
    env: &'a Env,
    token: Address,
}

impl<'a> TokenTransfer<'a> {
    pub fn new(env: &'a Env, token: Address) -> Self {
        TokenTransfer { env, token }
    }

    fn client(&self) -> token::Client<'a> {
        token::Client::new(self.env, &self.token)
    }
}

impl ValueTransfer for TokenTransfer<'_> {
    fn receive(&self, from: &Address, amount: i128) {
        self.client()
            .transfer(from, &self.env.current_contract_address(), &amount);
    }

    fn transfer(&self, to: &Address, amount: i128) {
        self.client()
            .transfer(&self.env.current_contract_address(), to, &amount);
    }
}
