use thiserror::Error;

use super::account::{Account, Username};
use super::store::Store;

/// Inactivity window for a fresh or touched session.
pub(crate) const SESSION_SECONDS: u32 = 5 * 60;

#[derive(Error, Debug)]
pub enum AuthError {
    /// Unknown username, wrong pin, or a pin that isn't a number at all.
    /// Deliberately undifferentiated so the caller can't probe which part
    /// was wrong.
    #[error("Invalid username or pin")]
    InvalidCredentials,
}

/// Outcome of one countdown tick, carrying the zero-padded `MM:SS` label the
/// UI shows for that second.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Countdown {
    Running(String),
    /// The boundary tick: the label is "00:00" and the session has just
    /// transitioned to logged-out.
    Expired(String),
    LoggedOut,
}

#[derive(Debug)]
struct LogoutTimer {
    remaining: u32,
}

impl LogoutTimer {
    fn new() -> Self {
        Self {
            remaining: SESSION_SECONDS,
        }
    }

    fn label(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}

#[derive(Debug)]
struct Active {
    username: Username,
    timer: LogoutTimer,
}

/// The live authenticated context, at most one account at a time. Holds the
/// account by username rather than by reference; the store stays the single
/// owner of account data.
#[derive(Debug, Default)]
pub struct Session {
    current: Option<Active>,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self { current: None }
    }

    pub(crate) fn current(&self) -> Option<&Username> {
        self.current.as_ref().map(|active| &active.username)
    }

    /// Authenticate against the store and start a fresh countdown. The pin
    /// arrives as raw input and is parsed explicitly; non-numeric input is a
    /// credential failure, never a panic. Logging in over an existing
    /// session simply replaces it, timer included.
    pub(crate) fn login<'s>(
        &mut self,
        store: &'s Store,
        username: &str,
        pin: &str,
    ) -> Result<&'s Account, AuthError> {
        let pin: u32 = pin
            .trim()
            .parse()
            .map_err(|_| AuthError::InvalidCredentials)?;

        let username = Username::from(username);
        let account = store.find(&username).ok_or(AuthError::InvalidCredentials)?;
        if !account.pin_matches(pin) {
            return Err(AuthError::InvalidCredentials);
        }

        // Replacing the whole Active value swaps the timer in the same
        // assignment, so two countdowns never coexist.
        self.current = Some(Active {
            username,
            timer: LogoutTimer::new(),
        });
        Ok(account)
    }

    /// Restart the countdown from the full window. No-op when logged out.
    pub(crate) fn touch(&mut self) {
        if let Some(active) = &mut self.current {
            active.timer = LogoutTimer::new();
        }
    }

    /// Advance the countdown by one second. The current label is produced
    /// before decrementing, and the tick that lands on zero logs the session
    /// out instead of going negative.
    pub(crate) fn tick(&mut self) -> Countdown {
        let Some(active) = self.current.as_mut() else {
            return Countdown::LoggedOut;
        };

        let label = active.timer.label();
        if active.timer.remaining == 0 {
            self.current = None;
            return Countdown::Expired(label);
        }

        active.timer.remaining -= 1;
        Countdown::Running(label)
    }

    pub(crate) fn logout(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn store() -> Store {
        let mut store = Store::new();
        store
            .insert(Account::new(
                "Jonas Schmedtmann",
                vec![],
                dec!(1.2),
                1111,
                "EUR",
                "pt-PT",
            ))
            .unwrap();
        store
    }

    #[test]
    fn login_yields_the_account() {
        let store = store();
        let mut session = Session::new();

        let account = session.login(&store, "js", "1111").unwrap();
        assert_eq!(account.owner(), "Jonas Schmedtmann");
        assert_eq!(session.current().map(Username::as_str), Some("js"));
    }

    #[test_case("js", "9999"; "wrong pin")]
    #[test_case("nobody", "1111"; "unknown username")]
    #[test_case("js", "one one one one"; "non numeric pin")]
    #[test_case("js", ""; "empty pin")]
    fn login_rejects_bad_credentials(username: &str, pin: &str) {
        let store = store();
        let mut session = Session::new();

        assert!(matches!(
            session.login(&store, username, pin),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(session.current().is_none());
    }

    #[test]
    fn countdown_starts_at_five_minutes() {
        let store = store();
        let mut session = Session::new();
        session.login(&store, "js", "1111").unwrap();

        assert_eq!(session.tick(), Countdown::Running("05:00".to_owned()));
    }

    #[test]
    fn countdown_reaches_four_minutes_after_sixty_more_ticks() {
        let store = store();
        let mut session = Session::new();
        session.login(&store, "js", "1111").unwrap();

        session.tick();
        let mut last = Countdown::LoggedOut;
        for _ in 0..60 {
            last = session.tick();
        }
        assert_eq!(last, Countdown::Running("04:00".to_owned()));
    }

    #[test]
    fn expiry_fires_at_zero_and_never_goes_negative() {
        let store = store();
        let mut session = Session::new();
        session.login(&store, "js", "1111").unwrap();

        for second in (1..=SESSION_SECONDS).rev() {
            let expected = format!("{:02}:{:02}", second / 60, second % 60);
            assert_eq!(session.tick(), Countdown::Running(expected));
        }

        assert_eq!(session.tick(), Countdown::Expired("00:00".to_owned()));
        assert!(session.current().is_none());
        assert_eq!(session.tick(), Countdown::LoggedOut);
        assert_eq!(session.tick(), Countdown::LoggedOut);
    }

    #[test]
    fn touch_restarts_the_countdown() {
        let store = store();
        let mut session = Session::new();
        session.login(&store, "js", "1111").unwrap();

        for _ in 0..42 {
            session.tick();
        }
        session.touch();
        assert_eq!(session.tick(), Countdown::Running("05:00".to_owned()));
    }

    #[test]
    fn touch_while_logged_out_is_a_no_op() {
        let mut session = Session::new();
        session.touch();
        assert_eq!(session.tick(), Countdown::LoggedOut);
    }

    #[test]
    fn relogin_replaces_the_running_timer() {
        let store = store();
        let mut session = Session::new();
        session.login(&store, "js", "1111").unwrap();
        for _ in 0..100 {
            session.tick();
        }

        session.login(&store, "js", "1111").unwrap();
        assert_eq!(session.tick(), Countdown::Running("05:00".to_owned()));
    }
}
