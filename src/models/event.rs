use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authentication action recorded on a log line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    LoginFailed,
    LoginSuccess,
    /// Any other action; ignored by the detectors that filter on action
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::LoginFailed => "login_failed",
            Action::LoginSuccess => "login_success",
            Action::Other(s) => s,
        }
    }
}

impl From<String> for Action {
    fn from(s: String) -> Self {
        match s.as_str() {
            "login_failed" => Action::LoginFailed,
            "login_success" => Action::LoginSuccess,
            _ => Action::Other(s),
        }
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        Action::from(s.to_string())
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        match action {
            Action::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One authentication log line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthEvent {
    pub timestamp: NaiveDateTime,
    pub user_id: String,
    /// Kept as text; addresses that fail to parse are still carried through
    pub ip_address: String,
    pub action: Action,
}

impl AuthEvent {
    pub fn new(
        timestamp: NaiveDateTime,
        user_id: impl Into<String>,
        ip_address: impl Into<String>,
        action: impl Into<Action>,
    ) -> Self {
        AuthEvent {
            timestamp,
            user_id: user_id.into(),
            ip_address: ip_address.into(),
            action: action.into(),
        }
    }

    pub fn is_failed_login(&self) -> bool {
        self.action == Action::LoginFailed
    }

    pub fn is_successful_login(&self) -> bool {
        self.action == Action::LoginSuccess
    }
}
