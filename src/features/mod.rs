mod account;
mod session;
mod store;
mod transaction;
mod view;

pub use self::{
    account::{SeedAccount, Username},
    session::{Countdown, Session},
    store::Store,
    transaction::{close_account, request_loan, transfer, LoanScheduler},
    view::{project_movements, relative_day_label, Formatter, LocaleFormatter},
};
