use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::models::{StatusKind, SyncItem};

/// Status filter for ledger listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(StatusKind),
}

impl StatusFilter {
    #[must_use]
    pub fn matches(self, item: &SyncItem) -> bool {
        match self {
            Self::All => true,
            Self::Only(kind) => item.kind() == kind,
        }
    }
}

impl From<StatusKind> for StatusFilter {
    fn from(kind: StatusKind) -> Self {
        Self::Only(kind)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(kind) => write!(f, "{kind}"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}
