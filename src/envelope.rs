//! Refresh timestamp and time-to-live carried by every host and metric

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maximum age an entry may reach before the sweeper removes it
///
/// Configured and transmitted as whole seconds, where `0` means the entry
/// never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    #[default]
    Immortal,
    After(TimeDelta),
}

impl Ttl {
    pub fn from_secs(secs: u64) -> Self {
        match i64::try_from(secs).ok().and_then(TimeDelta::try_seconds) {
            Some(delta) if secs > 0 => Ttl::After(delta),
            // zero, or too large to ever elapse
            _ => Ttl::Immortal,
        }
    }

    pub fn as_secs(&self) -> u64 {
        match self {
            Ttl::Immortal => 0,
            Ttl::After(delta) => delta.num_seconds().max(0) as u64,
        }
    }

    pub fn is_immortal(&self) -> bool {
        matches!(self, Ttl::Immortal)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ttl::Immortal => write!(f, "immortal"),
            Ttl::After(_) => write!(f, "{}s", self.as_secs()),
        }
    }
}

impl Serialize for Ttl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.as_secs())
    }
}

impl<'de> Deserialize<'de> for Ttl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Ttl::from_secs)
    }
}

/// Uniform wrapper around a stored payload
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub last_refresh: DateTime<Utc>,
    pub ttl: Ttl,
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn new(payload: T, ttl: Ttl, now: DateTime<Utc>) -> Self {
        Self {
            last_refresh: now,
            ttl,
            payload,
        }
    }

    pub fn refresh(&mut self, ttl: Ttl, now: DateTime<Utc>) {
        self.last_refresh = now;
        self.ttl = ttl;
    }

    /// Refresh the timestamp but keep the current ttl
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_refresh = now;
    }

    /// Time elapsed since the last refresh (negative if refreshed "after" now)
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(self.last_refresh)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_expired(now, self.last_refresh, self.ttl)
    }
}

/// Whether an entry refreshed at `last_refresh` has outlived `ttl` at `now`
///
/// Immortal entries never expire. Everything else expires once its age is
/// strictly greater than its ttl.
pub fn is_expired(now: DateTime<Utc>, last_refresh: DateTime<Utc>, ttl: Ttl) -> bool {
    match ttl {
        Ttl::Immortal => false,
        Ttl::After(limit) => now.signed_duration_since(last_refresh) > limit,
    }
}
