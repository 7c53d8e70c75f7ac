use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::Deserialize;

/// Lowercase initials of the owner's name, e.g. "Jonas Schmedtmann" -> "js".
/// Derived once when the account enters the store; the store enforces
/// uniqueness across accounts.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Username(String);

impl Username {
    pub(crate) fn derive(owner: &str) -> Self {
        let initials = owner
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_lowercase)
            .collect();
        Self(initials)
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Username {
    fn from(raw: &str) -> Self {
        Self(raw.to_owned())
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single signed transaction amount recorded against an account, with the
/// timestamp captured at the moment it was appended. Positive amounts are
/// deposits, negative amounts withdrawals.
#[derive(Debug, Clone, Copy)]
pub struct Movement {
    pub(crate) amount: Decimal,
    pub(crate) date: DateTime<Utc>,
}

/// Income/expense/interest totals over an account's movements. Recomputed
/// from scratch on every call; nothing here is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Sum of all deposits.
    pub(crate) incomes: Decimal,
    /// Sum of all withdrawals, sign preserved (always <= 0).
    pub(crate) out: Decimal,
    /// Interest earned across deposits, skipping sub-unit contributions.
    pub(crate) interest: Decimal,
}

/// Seed-data shape for one account, matching the original fixture format:
/// amounts and timestamps arrive as two parallel arrays and are zipped into
/// `Movement`s when the store is built.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SeedAccount {
    pub(crate) owner: String,
    pub(crate) movements: Vec<Decimal>,
    pub(crate) movements_dates: Vec<DateTime<Utc>>,
    pub(crate) interest_rate: Decimal,
    pub(crate) pin: u32,
    pub(crate) currency: String,
    pub(crate) locale: String,
}

/// Bank account
#[derive(Debug, Clone)]
pub struct Account {
    owner: String,
    username: Username,
    movements: Vec<Movement>,

    /// Percentage applied to each deposit when computing eligible interest
    interest_rate: Decimal,
    pin: u32,

    /// Formatting hints, immutable after creation
    currency: String,
    locale: String,

    /// Derived sum of all movement amounts, refreshed after every mutation.
    /// The movements themselves stay the source of truth.
    balance: Decimal,
}

impl Account {
    pub(crate) fn new(
        owner: &str,
        movements: Vec<Movement>,
        interest_rate: Decimal,
        pin: u32,
        currency: &str,
        locale: &str,
    ) -> Self {
        let mut account = Self {
            owner: owner.to_owned(),
            username: Username::derive(owner),
            movements,
            interest_rate,
            pin,
            currency: currency.to_owned(),
            locale: locale.to_owned(),
            balance: dec!(0),
        };
        account.recompute_balance();
        account
    }

    pub(crate) fn owner(&self) -> &str {
        &self.owner
    }

    pub(crate) fn username(&self) -> &Username {
        &self.username
    }

    pub(crate) fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub(crate) fn currency(&self) -> &str {
        &self.currency
    }

    pub(crate) fn locale(&self) -> &str {
        &self.locale
    }

    pub(crate) fn balance(&self) -> Decimal {
        self.balance
    }

    pub(crate) fn pin_matches(&self, pin: u32) -> bool {
        self.pin == pin
    }

    /// Append a movement and refresh the derived balance. Movements are
    /// append-only; nothing ever rewrites or deletes an entry.
    pub(crate) fn record(&mut self, amount: Decimal, date: DateTime<Utc>) {
        self.movements.push(Movement { amount, date });
        self.recompute_balance();
    }

    pub(crate) fn recompute_balance(&mut self) -> Decimal {
        self.balance = self.movements.iter().map(|m| m.amount).sum();
        self.balance
    }

    /// Whether any single recorded movement reaches `threshold`. Used as the
    /// loan affordability heuristic.
    pub(crate) fn has_movement_at_least(&self, threshold: Decimal) -> bool {
        self.movements.iter().any(|m| m.amount >= threshold)
    }

    pub(crate) fn summary(&self) -> Summary {
        let deposits = || {
            self.movements
                .iter()
                .map(|m| m.amount)
                .filter(|amount| *amount > dec!(0))
        };

        let incomes = deposits().sum();
        let out = self
            .movements
            .iter()
            .map(|m| m.amount)
            .filter(|amount| *amount < dec!(0))
            .sum();

        // Per-deposit contributions under one unit of currency earn nothing.
        let rate = self.interest_rate / dec!(100);
        let interest = deposits()
            .map(|deposit| deposit * rate)
            .filter(|int| *int >= dec!(1))
            .sum();

        Summary {
            incomes,
            out,
            interest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn movement(amount: Decimal) -> Movement {
        Movement {
            amount,
            date: Utc::now(),
        }
    }

    #[test_case("Jonas Schmedtmann", "js")]
    #[test_case("Jessica Davis", "jd")]
    #[test_case("Ada", "a")]
    #[test_case("Steven Thomas Williams", "stw")]
    fn derives_lowercase_initials(owner: &str, expected: &str) {
        assert_eq!(Username::derive(owner).as_str(), expected);
    }

    #[test]
    fn balance_is_sum_of_movements() {
        let mut account = Account::new(
            "Jonas Schmedtmann",
            vec![movement(dec!(200)), movement(dec!(-50.5))],
            dec!(1.2),
            1111,
            "EUR",
            "pt-PT",
        );
        assert_eq!(account.balance(), dec!(149.5));

        account.record(dec!(100), Utc::now());
        assert_eq!(account.balance(), dec!(249.5));
    }

    #[test]
    fn summary_splits_incomes_and_expenses() {
        let account = Account::new(
            "Jessica Davis",
            vec![
                movement(dec!(5000)),
                movement(dec!(-150)),
                movement(dec!(3400)),
                movement(dec!(-790)),
            ],
            dec!(1.5),
            2222,
            "USD",
            "en-US",
        );

        let summary = account.summary();
        assert_eq!(summary.incomes, dec!(8400));
        assert_eq!(summary.out, dec!(-940));
    }

    #[test]
    fn interest_skips_sub_unit_contributions() {
        // 50 * 1.2% = 0.6 is dropped, 100 * 1.2% = 1.2 counts.
        let account = Account::new(
            "Jonas Schmedtmann",
            vec![movement(dec!(50)), movement(dec!(100))],
            dec!(1.2),
            1111,
            "EUR",
            "pt-PT",
        );
        assert_eq!(account.summary().interest, dec!(1.2));
    }

    #[test]
    fn interest_ignores_withdrawals() {
        let account = Account::new(
            "Jonas Schmedtmann",
            vec![movement(dec!(1000)), movement(dec!(-1000))],
            dec!(1.2),
            1111,
            "EUR",
            "pt-PT",
        );
        assert_eq!(account.summary().interest, dec!(12));
    }

    #[test]
    fn affordability_checks_individual_movements() {
        let account = Account::new(
            "Jonas Schmedtmann",
            vec![movement(dec!(90)), movement(dec!(40))],
            dec!(1.2),
            1111,
            "EUR",
            "pt-PT",
        );
        assert!(account.has_movement_at_least(dec!(90)));
        // The total would cover it, but no single movement does.
        assert!(!account.has_movement_at_least(dec!(100)));
    }
}
