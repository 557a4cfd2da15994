//! Transaction process descriptors.
//!
//! A community configures one or more transaction processes. Only the kind of
//! each process matters here: a `preauthorize` process (payment hold before
//! capture) is what makes shipping and online payments configurable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a configured transaction process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessKind {
    /// Payment is authorized (held) before it is captured.
    Preauthorize,
    /// Payment is requested after the transaction is accepted.
    Postpay,
    /// No payment step at all.
    None,
}

impl ProcessKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preauthorize => "preauthorize",
            Self::Postpay => "postpay",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "preauthorize" => Ok(Self::Preauthorize),
            "postpay" => Ok(Self::Postpay),
            "none" => Ok(Self::None),
            other => Err(crate::Error::UnknownProcess(other.to_string())),
        }
    }
}

/// A transaction process as reported by the process lookup collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionProcess {
    pub process: ProcessKind,
}

impl TransactionProcess {
    pub fn new(process: ProcessKind) -> Self {
        Self { process }
    }
}
