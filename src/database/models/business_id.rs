use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const PREFIX: &str = "BIS";
const DIGITS: usize = 5;
const MAX_SEQUENCE: u32 = 99_999;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusinessIdError {
    #[error("Invalid business number format. Expected format: BIS00001")]
    Malformed,

    #[error("Business number space exhausted after BIS99999")]
    Exhausted,
}

/// Public tenant identifier: `BIS` followed by a 5-digit zero-padded sequence.
///
/// Fixed width means lexicographic order equals allocation order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BusinessId(String);

impl BusinessId {
    pub fn first() -> Self {
        Self(format!("{PREFIX}{:0width$}", 1, width = DIGITS))
    }

    pub fn from_sequence(sequence: u32) -> Result<Self, BusinessIdError> {
        if sequence == 0 || sequence > MAX_SEQUENCE {
            return Err(BusinessIdError::Exhausted);
        }
        Ok(Self(format!("{PREFIX}{sequence:0width$}", width = DIGITS)))
    }

    pub fn sequence(&self) -> u32 {
        self.0[PREFIX.len()..].parse().unwrap_or(0)
    }

    /// Allocate the id following `last`, the greatest id currently stored.
    ///
    /// No previous id, or one that does not parse, restarts at `BIS00001`.
    pub fn next_after(last: Option<&str>) -> Result<Self, BusinessIdError> {
        match last.map(str::parse::<BusinessId>) {
            Some(Ok(last)) => Self::from_sequence(last.sequence() + 1),
            Some(Err(_)) => {
                tracing::warn!("Unparsable last business number {:?}, restarting sequence", last);
                Ok(Self::first())
            }
            None => Ok(Self::first()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for BusinessId {
    type Err = BusinessIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix(PREFIX).ok_or(BusinessIdError::Malformed)?;
        if digits.len() != DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BusinessIdError::Malformed);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for BusinessId {
    type Error = BusinessIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BusinessId> for String {
    fn from(id: BusinessId) -> Self {
        id.0
    }
}

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
