//! One-time passcodes sent by email

use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// What a passcode unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasscodeCategory {
    Reset,
    Activation,
}

impl PasscodeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PasscodeCategory::Reset => "RESET",
            PasscodeCategory::Activation => "ACTIVATION",
        }
    }
}

impl fmt::Display for PasscodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PasscodeCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "RESET" => Ok(PasscodeCategory::Reset),
            "ACTIVATION" => Ok(PasscodeCategory::Activation),
            other => Err(format!("Unknown passcode category: {}", other)),
        }
    }
}

/// A token tied to one user; its id is the secret put in the email link
#[derive(Debug, Clone, PartialEq)]
pub struct Passcode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: PasscodeCategory,
    pub expiration: DateTime<Utc>,
}

impl Passcode {
    /// A passcode expiring `ttl` from now
    pub fn new(user_id: Uuid, category: PasscodeCategory, ttl: Duration) -> Self {
        Passcode {
            id: Uuid::new_v4(),
            user_id,
            category,
            expiration: Utc::now() + ttl,
        }
    }

    pub fn activation(user_id: Uuid, ttl: Duration) -> Self {
        Self::new(user_id, PasscodeCategory::Activation, ttl)
    }

    pub fn reset(user_id: Uuid, ttl: Duration) -> Self {
        Self::new(user_id, PasscodeCategory::Reset, ttl)
    }

    pub fn is_expired(&self) -> bool {
        self.expiration <= Utc::now()
    }
}
