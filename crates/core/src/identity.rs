//! Session owner identity and account address validation.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::limits::ACCOUNT_ADDRESS_PATTERN;

/// Compiled account address regex (lazy initialization).
static ACCOUNT_ADDRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ACCOUNT_ADDRESS_PATTERN).expect("invalid address pattern"));

/// Owning identity of a session, stored in lowercase-normalized form.
///
/// Two identities are equal when their raw inputs match case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Normalizes any identity token. Format checks belong to the caller.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive match against a caller-supplied identity.
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == raw.trim().to_lowercase()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `raw` is a well-formed account address.
pub fn is_account_address(raw: &str) -> bool {
    ACCOUNT_ADDRESS_REGEX.is_match(raw)
}
