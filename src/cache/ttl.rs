//! TTL Module
//!
//! Normalizes caller-supplied expiry into whole seconds.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::InvalidInput;

// == Ttl ==
/// Expiry in whole seconds, always rounded up from the requested value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ttl(u64);

impl Ttl {
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Rounds `secs` up to the next whole second.
    ///
    /// Rejects negative, NaN and infinite values.
    pub fn from_secs_f64(secs: f64) -> Result<Self, InvalidInput> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(InvalidInput::TtlOutOfRange(secs));
        }
        let rounded = secs.ceil();
        if rounded > u64::MAX as f64 {
            return Err(InvalidInput::TtlOutOfRange(secs));
        }
        Ok(Self(rounded as u64))
    }

    /// Normalizes an optional TTL; `None` passes through.
    pub fn normalize(ttl: Option<f64>) -> Result<Option<Self>, InvalidInput> {
        ttl.map(Self::from_secs_f64).transpose()
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }

    pub const fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl From<Duration> for Ttl {
    fn from(duration: Duration) -> Self {
        let extra = u64::from(duration.subsec_nanos() > 0);
        Self(duration.as_secs().saturating_add(extra))
    }
}

impl TryFrom<f64> for Ttl {
    type Error = InvalidInput;

    fn try_from(secs: f64) -> Result<Self, Self::Error> {
        Self::from_secs_f64(secs)
    }
}

impl FromStr for Ttl {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs: f64 = s
            .trim()
            .parse()
            .map_err(|_| InvalidInput::TtlNotNumeric(s.to_string()))?;
        Self::from_secs_f64(secs)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}
