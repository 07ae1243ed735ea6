//! Operation identifiers and the artifact keys derived from them.
//!
//! Key format: `{role}-image-{operation_id}` where `role` is `source` or
//! `result` and `operation_id` is 32 lowercase hex characters. Anything else
//! reading or writing the store must use exactly this format.

use std::fmt;
use std::str::FromStr;

/// Length of a rendered [`OperationId`].
pub const OPERATION_ID_LEN: usize = 32;

/// 128 random bits identifying one transform invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationId(u128);

impl OperationId {
    /// Draw a fresh identifier from the thread-local RNG.
    pub fn generate() -> Self {
        Self(rand::random())
    }

    /// Store key for the given role.
    pub fn key(&self, role: Role) -> String {
        format!("{}-image-{}", role.as_str(), self)
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// Returned when a string is not 32 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOperationId(pub String);

impl fmt::Display for InvalidOperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid operation id: {:?}", self.0)
    }
}

impl std::error::Error for InvalidOperationId {}

impl FromStr for OperationId {
    type Err = InvalidOperationId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let well_formed = s.len() == OPERATION_ID_LEN
            && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));

        if !well_formed {
            return Err(InvalidOperationId(s.to_string()));
        }

        u128::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| InvalidOperationId(s.to_string()))
    }
}

/// Which side of a transform an artifact holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Source,
    Result,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Source => "source",
            Role::Result => "result",
        }
    }
}
