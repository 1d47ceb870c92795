//! Common Bolt protocol types.

use crate::error::Error;

/// Number of records requested by PULL or DISCARD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchSize {
    /// Every remaining record (`n = -1` on the wire)
    #[default]
    All,
    /// At most this many records
    Limited(u64),
}

impl FetchSize {
    /// Wire value meaning "all remaining records".
    pub const ALL: i64 = -1;

    /// Get the limit as a `usize`, or `None` for `All`.
    pub fn limit(self) -> Option<usize> {
        match self {
            FetchSize::All => None,
            FetchSize::Limited(n) => Some(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }

    /// Get the wire representation.
    pub fn as_i64(self) -> i64 {
        match self {
            FetchSize::All => Self::ALL,
            FetchSize::Limited(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }
}

impl TryFrom<i64> for FetchSize {
    type Error = Error;

    /// Parse the `n` field of PULL/DISCARD.
    ///
    /// `-1` means all records; zero and other negative values are rejected.
    fn try_from(n: i64) -> Result<Self, Self::Error> {
        match n {
            Self::ALL => Ok(FetchSize::All),
            n if n > 0 => Ok(FetchSize::Limited(n.unsigned_abs())),
            _ => Err(Error::Protocol(format!(
                "Invalid fetch size: expected a positive count or -1, got {}",
                n
            ))),
        }
    }
}

/// Transaction access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    /// Read only
    Read,
    /// Read and write
    #[default]
    Write,
}

impl AccessMode {
    /// Parse the `mode` field of BEGIN/RUN (`"r"` means read, anything else write).
    pub fn from_wire(mode: Option<&str>) -> Self {
        match mode {
            Some("r") => AccessMode::Read,
            _ => AccessMode::Write,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_size_from_wire() {
        assert_eq!(FetchSize::try_from(-1).unwrap(), FetchSize::All);
        assert_eq!(FetchSize::try_from(1000).unwrap(), FetchSize::Limited(1000));
        assert!(FetchSize::try_from(0).is_err());
        assert!(FetchSize::try_from(-2).is_err());
    }

    #[test]
    fn test_access_mode() {
        assert_eq!(AccessMode::from_wire(Some("r")), AccessMode::Read);
        assert_eq!(AccessMode::from_wire(Some("w")), AccessMode::Write);
        assert_eq!(AccessMode::from_wire(None), AccessMode::Write);
    }
}
