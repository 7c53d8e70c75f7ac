use std::{process, thread, time};
#[macro_use]
extern crate log;

mod features;

use anyhow::Context;
use chrono::Utc;
use clap::{Arg, Command};
use rust_decimal_macros::dec;

use features::{
    close_account, project_movements, relative_day_label, request_loan, transfer, Countdown,
    Formatter, LoanScheduler, LocaleFormatter, SeedAccount, Session, Store, Username,
};

/// The two demo accounts, in the original fixture shape: movement amounts
/// and timestamps as parallel arrays, zipped when the store is built.
const SEED: &str = r#"[
  {
    "owner": "Jonas Schmedtmann",
    "movements": [200, 455.23, -306.5, 25000, -642.21, -133.9, 79.97, 1300],
    "interestRate": 1.2,
    "pin": 1111,
    "movementsDates": [
      "2019-11-18T21:31:17.178Z",
      "2019-12-23T07:42:02.383Z",
      "2020-01-28T09:15:04.904Z",
      "2020-04-01T10:17:24.185Z",
      "2020-05-08T14:11:59.604Z",
      "2020-05-02T13:01:17.194Z",
      "2025-05-03T10:36:17.929Z",
      "2025-05-04T06:51:36.790Z"
    ],
    "currency": "EUR",
    "locale": "pt-PT"
  },
  {
    "owner": "Jessica Davis",
    "movements": [5000, 3400, -150, -790, -3210, -1000, 8500, -30],
    "interestRate": 1.5,
    "pin": 2222,
    "movementsDates": [
      "2019-11-01T13:15:33.035Z",
      "2019-11-30T09:48:16.867Z",
      "2019-12-25T06:04:23.907Z",
      "2020-01-25T14:18:46.235Z",
      "2020-02-05T16:33:06.386Z",
      "2020-04-10T14:43:26.374Z",
      "2020-06-25T18:49:59.371Z",
      "2020-07-26T12:01:20.894Z"
    ],
    "currency": "USD",
    "locale": "en-US"
  }
]"#;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{e:#}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let matches = Command::new("bankist")
        .about("Event-driven demo bank: log in, transfer, take a loan, close")
        .arg(
            Arg::new("user")
                .long("user")
                .takes_value(true)
                .default_value("js")
                .help("Username to log in with"),
        )
        .arg(
            Arg::new("pin")
                .long("pin")
                .takes_value(true)
                .default_value("1111"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .takes_value(true)
                .default_value("jd")
                .help("Transfer recipient"),
        )
        .arg(
            Arg::new("sorted")
                .long("sorted")
                .help("Sort the movements list by amount"),
        )
        .arg(
            Arg::new("close")
                .long("close")
                .help("Close the account at the end of the demo"),
        )
        .get_matches();

    let seeds: Vec<SeedAccount> = serde_json::from_str(SEED).context("invalid seed data")?;
    let mut store = Store::from_seed(seeds)?;
    let mut session = Session::new();
    let mut scheduler = LoanScheduler::new();
    let formatter = LocaleFormatter;

    let sorted = matches.is_present("sorted");
    let user = matches.value_of("user").unwrap_or_default();
    let pin = matches.value_of("pin").unwrap_or_default();

    // The original UI gives no feedback on a failed login; it just stays on
    // the login screen. Log and stop.
    let (owner, locale) = match session.login(&store, user, pin) {
        Ok(account) => (account.owner().to_owned(), account.locale().to_owned()),
        Err(e) => {
            warn!("{e}");
            return Ok(());
        }
    };

    let first_name = owner.split_whitespace().next().unwrap_or(&owner);
    println!("Welcome back, {first_name}");
    println!("{}", formatter.format_date(Utc::now(), &locale, true));

    let me = Username::from(user);
    render(&store, &me, sorted, &formatter);

    let to = Username::from(matches.value_of("to").unwrap_or_default());
    if let Err(e) = transfer(&mut store, &mut session, &to, dec!(90)) {
        warn!("{e}");
    }

    if let Err(e) = request_loan(&store, &session, &mut scheduler, dec!(1500), Utc::now()) {
        warn!("{e}");
    }

    // Tick once per second until the loan lands, like the browser's loop.
    while scheduler.has_pending() {
        thread::sleep(time::Duration::from_secs(1));
        match session.tick() {
            Countdown::Running(label) => println!("{label}"),
            Countdown::Expired(label) => {
                println!("{label}");
                println!("Log in to get started");
                break;
            }
            Countdown::LoggedOut => break,
        }
        scheduler.poll(&mut store, &mut session, Utc::now());
    }

    render(&store, &me, sorted, &formatter);

    if matches.is_present("close") {
        match close_account(&mut store, &mut session, &mut scheduler, user, pin) {
            Ok(()) => println!("Account {user} closed. Log in to get started"),
            Err(e) => warn!("{e}"),
        }
    }

    Ok(())
}

/// Print what the original UI shows: balance, the movements list (newest on
/// top when unsorted), and the in/out/interest summary.
fn render(store: &Store, username: &Username, sorted: bool, formatter: &LocaleFormatter) {
    let Some(account) = store.find(username) else {
        return;
    };
    let currency = account.currency();
    let locale = account.locale();

    println!(
        "\nBalance: {}",
        formatter.format_currency(locale, currency, account.balance())
    );

    let now = Utc::now();
    for (i, view) in project_movements(account, sorted).iter().enumerate().rev() {
        println!(
            "{:>2} {:<10} {:<12} {:>14}",
            i + 1,
            view.kind.label(),
            relative_day_label(view.date, now, locale, formatter),
            formatter.format_currency(locale, currency, view.amount),
        );
    }

    let summary = account.summary();
    println!(
        "In: {}  Out: {}  Interest: {}\n",
        formatter.format_currency(locale, currency, summary.incomes),
        formatter.format_currency(locale, currency, summary.out.abs()),
        formatter.format_currency(locale, currency, summary.interest),
    );
}
