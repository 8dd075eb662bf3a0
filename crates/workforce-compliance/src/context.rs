use axum::http::HeaderMap;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of the user performing an operation, as supplied by the session layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub const SYSTEM_USER: &str = "system";
pub const ACTING_USER_HEADER: &str = "x-acting-user";

/// Explicit per-call context: who is acting and what "now" means for this call.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub acting_user: UserId,
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(acting_user: impl Into<String>) -> Self {
        Self::at(acting_user, Utc::now())
    }

    pub fn at(acting_user: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            acting_user: UserId(acting_user.into()),
            now,
        }
    }

    pub fn system() -> Self {
        Self::new(SYSTEM_USER)
    }

    /// Context for an HTTP call; the session layer forwards the user in `x-acting-user`.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user = headers
            .get(ACTING_USER_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(SYSTEM_USER);
        Self::new(user)
    }

    /// Re-anchor the clock to the start of `date`, for back-dated or forecast scans.
    pub fn as_of(mut self, date: NaiveDate) -> Self {
        if date != self.today() {
            self.now = date.and_time(chrono::NaiveTime::MIN).and_utc();
        }
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }
}
