//! Display state of a conversion session.
//!
//! Each submission takes a [`RequestToken`]. A completed request may only
//! update the displayed result if its token is the latest one issued, so a
//! slow response can never overwrite a newer one.

use crate::core::currency::{Amount, Conversion};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Idle,
    RequestInFlight,
    Displayed,
}

/// What happened to a completed request when it reached the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Superseded,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    input: Option<String>,
    converted: Option<Conversion>,
    last_error: Option<String>,
    latest_token: u64,
    in_flight: usize,
}

impl Session {
    pub fn new(default_amount: Option<Amount>) -> Self {
        Self {
            input: default_amount.map(|a| a.to_string()),
            ..Default::default()
        }
    }

    /// Records the user input and issues the token for its request.
    pub fn begin(&mut self, input: &str) -> RequestToken {
        self.latest_token += 1;
        self.in_flight += 1;
        self.input = Some(input.trim().to_string());
        RequestToken(self.latest_token)
    }

    /// Records rejected input without issuing a request.
    pub fn reject(&mut self, input: &str, message: String) {
        self.input = Some(input.trim().to_string());
        self.last_error = Some(message);
    }

    pub fn complete(&mut self, token: RequestToken, conversion: Conversion) -> Completion {
        self.in_flight = self.in_flight.saturating_sub(1);
        if !self.is_latest(token) {
            return Completion::Superseded;
        }
        self.converted = Some(conversion);
        self.last_error = None;
        Completion::Applied
    }

    /// Records a failed request. Input is kept so it can be resubmitted.
    pub fn fail(&mut self, token: RequestToken, message: String) -> Completion {
        self.in_flight = self.in_flight.saturating_sub(1);
        if !self.is_latest(token) {
            return Completion::Superseded;
        }
        self.last_error = Some(message);
        Completion::Applied
    }

    fn is_latest(&self, token: RequestToken) -> bool {
        token.0 == self.latest_token
    }

    pub fn state(&self) -> DisplayState {
        if self.in_flight > 0 {
            DisplayState::RequestInFlight
        } else if self.converted.is_some() {
            DisplayState::Displayed
        } else {
            DisplayState::Idle
        }
    }

    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    pub fn converted_amount(&self) -> Option<f64> {
        self.converted.as_ref().map(|c| c.result)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
