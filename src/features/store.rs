use std::collections::BTreeMap;

use thiserror::Error;

use super::account::{Account, Movement, SeedAccount, Username};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No account found for username {0}")]
    NotFound(Username),

    #[error("Username {0} is already taken")]
    DuplicateUsername(Username),

    #[error("Account {owner} has {movements} movements but {dates} movement dates")]
    MovementDateMismatch {
        owner: String,
        movements: usize,
        dates: usize,
    },
}

type StoreResult<T> = Result<T, StoreError>;

/// Keeps every account, keyed by its derived username. Small N; all access
/// is single-threaded and UI-driven.
#[derive(Debug, Default)]
pub struct Store {
    pub(crate) accounts: BTreeMap<Username, Account>,
}

impl Store {
    pub(crate) fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
        }
    }

    /// Build a store from seed data, zipping each account's parallel
    /// amount/date arrays into movements. Fails when the arrays disagree in
    /// length or when two owners collapse to the same username.
    pub(crate) fn from_seed(seeds: Vec<SeedAccount>) -> StoreResult<Self> {
        let mut store = Self::new();
        for seed in seeds {
            if seed.movements.len() != seed.movements_dates.len() {
                return Err(StoreError::MovementDateMismatch {
                    owner: seed.owner,
                    movements: seed.movements.len(),
                    dates: seed.movements_dates.len(),
                });
            }

            let movements = seed
                .movements
                .iter()
                .zip(&seed.movements_dates)
                .map(|(&amount, &date)| Movement { amount, date })
                .collect();

            store.insert(Account::new(
                &seed.owner,
                movements,
                seed.interest_rate,
                seed.pin,
                &seed.currency,
                &seed.locale,
            ))?;
        }
        Ok(store)
    }

    pub(crate) fn insert(&mut self, account: Account) -> StoreResult<()> {
        let username = account.username().clone();
        if self.accounts.contains_key(&username) {
            return Err(StoreError::DuplicateUsername(username));
        }
        self.accounts.insert(username, account);
        Ok(())
    }

    pub(crate) fn find(&self, username: &Username) -> Option<&Account> {
        self.accounts.get(username)
    }

    pub(crate) fn find_mut(&mut self, username: &Username) -> Option<&mut Account> {
        self.accounts.get_mut(username)
    }

    pub(crate) fn remove(&mut self, username: &Username) -> StoreResult<Account> {
        self.accounts
            .remove(username)
            .ok_or_else(|| StoreError::NotFound(username.clone()))
    }
}
