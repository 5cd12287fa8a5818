//! Player names: three letters, stored uppercase.

use std::fmt;

use serde::Serialize;

/// Number of letters in a player name.
pub const USERNAME_LEN: usize = 3;

/// A validated player name such as `"ABC"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Username(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameError {
    #[error("Username must be 3 letters A-Z")]
    Malformed,
}

impl Username {
    /// Validate `raw` and normalize it to uppercase.
    ///
    /// Only ASCII letters are accepted, so `"ab1"`, `"abcd"` and `"äbc"` are
    /// all rejected.
    pub fn parse(raw: &str) -> Result<Self, UsernameError> {
        if raw.len() != USERNAME_LEN || !raw.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(UsernameError::Malformed);
        }
        Ok(Self(raw.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
