use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use rust_decimal_macros::dec;

use super::account::Account;

/// Locale-aware rendering capability, injected at the boundary. The real
/// formatting work belongs to whatever implements this; the engine only
/// passes locale and currency hints through.
pub trait Formatter {
    fn format_currency(&self, locale: &str, currency: &str, amount: Decimal) -> String;
    fn format_date(&self, date: DateTime<Utc>, locale: &str, include_time: bool) -> String;
}

/// Minimal built-in formatter: day-first date patterns except for en-*
/// locales, currency rendered as "amount CODE".
#[derive(Debug, Default)]
pub struct LocaleFormatter;

impl Formatter for LocaleFormatter {
    fn format_currency(&self, _locale: &str, currency: &str, amount: Decimal) -> String {
        format!("{amount:.2} {currency}")
    }

    fn format_date(&self, date: DateTime<Utc>, locale: &str, include_time: bool) -> String {
        let pattern = match (locale.starts_with("en-US"), include_time) {
            (true, true) => "%m/%d/%Y, %H:%M",
            (true, false) => "%m/%d/%Y",
            (false, true) => "%d/%m/%Y, %H:%M",
            (false, false) => "%d/%m/%Y",
        };
        date.format(pattern).to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKind {
    Deposit,
    Withdrawal,
}

impl MovementKind {
    fn of(amount: Decimal) -> Self {
        if amount > dec!(0) {
            Self::Deposit
        } else {
            Self::Withdrawal
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }
}

/// One display-ready row of the movements list.
#[derive(Debug, Clone, Copy)]
pub struct MovementView {
    pub(crate) amount: Decimal,
    pub(crate) date: DateTime<Utc>,
    pub(crate) kind: MovementKind,
}

/// Project an account's movements for display, in recorded order or
/// reordered ascending by amount when `sorted` is set.
pub fn project_movements(account: &Account, sorted: bool) -> Vec<MovementView> {
    let mut views: Vec<_> = account
        .movements()
        .iter()
        .map(|movement| MovementView {
            amount: movement.amount,
            date: movement.date,
            kind: MovementKind::of(movement.amount),
        })
        .collect();

    if sorted {
        views.sort_by(|a, b| a.amount.cmp(&b.amount));
    }
    views
}

/// Relative day label for a movement: "Today", "Yesterday", "N days ago" up
/// to a week, then the absolute locale-formatted date without time-of-day.
/// Days passed are whole 24h periods, not calendar boundaries.
pub fn relative_day_label(
    date: DateTime<Utc>,
    now: DateTime<Utc>,
    locale: &str,
    formatter: &dyn Formatter,
) -> String {
    let days_passed = (now - date).num_days().abs();
    match days_passed {
        0 => "Today".to_owned(),
        1 => "Yesterday".to_owned(),
        2..=7 => format!("{days_passed} days ago"),
        _ => formatter.format_date(date, locale, false),
    }
}
