use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use thiserror::Error;

use super::account::Username;
use super::session::Session;
use super::store::Store;

/// Approved loans land on the account this long after the request.
pub(crate) const LOAN_DELAY_SECONDS: i64 = 3;

#[derive(Error, Debug)]
pub enum TransferError {
    /// Covers every rejected transfer: non-positive amount, unknown
    /// recipient, self-transfer, insufficient balance, or no active session.
    #[error("Transfer rejected")]
    InvalidRequest,
}

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("Loan request rejected")]
    InvalidRequest,
}

#[derive(Error, Debug)]
pub enum CloseError {
    #[error("Credentials do not match the active account")]
    Mismatch,
}

/// Move `amount` from the logged-in account to `to`. Both movements are
/// appended with independently captured timestamps, or neither is: every
/// precondition is checked before the first mutation.
pub fn transfer(
    store: &mut Store,
    session: &mut Session,
    to: &Username,
    amount: Decimal,
) -> Result<(), TransferError> {
    let sender = session
        .current()
        .cloned()
        .ok_or(TransferError::InvalidRequest)?;

    if amount <= dec!(0) || *to == sender {
        return Err(TransferError::InvalidRequest);
    }
    if store.find(to).is_none() {
        return Err(TransferError::InvalidRequest);
    }
    let sender_balance = store
        .find(&sender)
        .ok_or(TransferError::InvalidRequest)?
        .balance();
    if sender_balance < amount {
        return Err(TransferError::InvalidRequest);
    }

    if let Some(account) = store.find_mut(&sender) {
        account.record(-amount, Utc::now());
    }
    if let Some(account) = store.find_mut(to) {
        account.record(amount, Utc::now());
    }

    session.touch();
    Ok(())
}

/// Ask for a loan on the logged-in account. The amount is floored to a whole
/// number, must be positive, and some single past movement must reach 10% of
/// it. Approval only schedules the credit; nothing is applied until the
/// scheduler's poll finds the task due.
pub fn request_loan(
    store: &Store,
    session: &Session,
    scheduler: &mut LoanScheduler,
    amount: Decimal,
    now: DateTime<Utc>,
) -> Result<(), LoanError> {
    let username = session.current().ok_or(LoanError::InvalidRequest)?;
    let account = store.find(username).ok_or(LoanError::InvalidRequest)?;

    let amount = amount.floor();
    if amount <= dec!(0) || !account.has_movement_at_least(amount * dec!(0.1)) {
        return Err(LoanError::InvalidRequest);
    }

    scheduler.schedule(username.clone(), amount, now);
    Ok(())
}

/// Self-closure only: the supplied username and pin must match the account
/// that is currently logged in. Removes the account, drops its pending
/// loans, and ends the session.
pub fn close_account(
    store: &mut Store,
    session: &mut Session,
    scheduler: &mut LoanScheduler,
    username: &str,
    pin: &str,
) -> Result<(), CloseError> {
    let active = session.current().cloned().ok_or(CloseError::Mismatch)?;
    let pin: u32 = pin.trim().parse().map_err(|_| CloseError::Mismatch)?;

    let account = store.find(&active).ok_or(CloseError::Mismatch)?;
    if account.username().as_str() != username || !account.pin_matches(pin) {
        return Err(CloseError::Mismatch);
    }

    scheduler.cancel_for(&active);
    store.remove(&active).map_err(|_| CloseError::Mismatch)?;
    session.logout();
    Ok(())
}

#[derive(Debug)]
struct PendingLoan {
    username: Username,
    amount: Decimal,
    due: DateTime<Utc>,
}

/// One-shot delayed credits, polled by the event loop with an explicit
/// clock. A pending loan outlives the session that requested it (a plain
/// logout does not cancel it), but account closure drops it.
#[derive(Debug, Default)]
pub struct LoanScheduler {
    pending: Vec<PendingLoan>,
}

impl LoanScheduler {
    pub(crate) fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    fn schedule(&mut self, username: Username, amount: Decimal, now: DateTime<Utc>) {
        let due = now + Duration::seconds(LOAN_DELAY_SECONDS);
        debug!("loan of {amount} for {username} scheduled at {due}");
        self.pending.push(PendingLoan {
            username,
            amount,
            due,
        });
    }

    pub(crate) fn cancel_for(&mut self, username: &Username) {
        self.pending.retain(|loan| loan.username != *username);
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Apply every loan that has come due. The session is only touched when
    /// it still belongs to the credited account; a due loan whose account
    /// has vanished is dropped with a warning.
    pub(crate) fn poll(&mut self, store: &mut Store, session: &mut Session, now: DateTime<Utc>) {
        let (due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|loan| loan.due <= now);
        self.pending = pending;

        for loan in due {
            match store.find_mut(&loan.username) {
                Some(account) => {
                    account.record(loan.amount, now);
                    debug!("loan of {} applied to {}", loan.amount, loan.username);
                    if session.current() == Some(&loan.username) {
                        session.touch();
                    }
                }
                None => warn!(
                    "dropping due loan of {} for missing account {}",
                    loan.amount, loan.username
                ),
            }
        }
    }
}
