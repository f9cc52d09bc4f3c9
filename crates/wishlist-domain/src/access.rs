//! Token purposes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a bearer token may be used for. Stored as the `access` column of
/// `user_tokens` and embedded in the JWT `access` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Session token sent in `X-Authorization` on every authenticated request.
    Auth,
    /// Single-use token mailed to the user; consumed by email verification.
    EmailVerify,
}

impl TokenPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::EmailVerify => "email_verify",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
