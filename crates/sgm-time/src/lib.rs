//! Simple wrappers to make many errors hard to make

#![warn(unused_crate_dependencies)]

use std::{fmt::Display, time::Duration};

/// Intended to be similar to Duration but always clear that it is in Seconds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, PartialOrd, Ord,
)]
pub struct Seconds(u64);

/// Milliseconds since the unix epoch
///
/// Serializes as a bare number so it matches the `expiresAt` field used in
/// persisted sessions. Keeps on ticking if the computer is sleeping, only
/// works with data/time after the unix epoch
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, PartialOrd, Ord,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn now() -> Self {
        let elapsed = web_time::SystemTime::UNIX_EPOCH
            .elapsed()
            .expect("expected date on system to be after the epoch");
        Self(elapsed.as_millis() as u64)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Converts from the seconds based timestamps used in credential claims
    pub fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// True once `now` has reached this timestamp. A deadline equal to `now`
    /// counts as passed.
    pub fn is_reached_at(&self, now: Self) -> bool {
        self.0 <= now.0
    }

    pub fn as_local_datetime(&self) -> Option<chrono::DateTime<chrono::Local>> {
        let millis = i64::try_from(self.0).ok()?;
        chrono::DateTime::from_timestamp_millis(millis).map(Into::into)
    }

    pub fn display_as_locale_datetime(&self) -> String {
        match self.as_local_datetime() {
            Some(datetime) => datetime.format("%c").to_string(),
            None => format!("{} ms after the epoch", self.0),
        }
    }

    /// Returns the number of whole seconds left until this timestamp or None
    /// if it has already been reached
    pub fn seconds_until(self, now: Self) -> Option<Seconds> {
        if self.is_reached_at(now) {
            None
        } else {
            Some(Seconds((self.0 - now.0) / 1000))
        }
    }
}

impl std::ops::Add<Seconds> for Timestamp {
    type Output = Self;

    fn add(self, rhs: Seconds) -> Self::Output {
        Self(self.0.saturating_add(rhs.0.saturating_mul(1000)))
    }
}

impl Seconds {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Returns true if this represents zero seconds
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<Seconds> for Duration {
    fn from(value: Seconds) -> Self {
        Duration::from_secs(value.0)
    }
}

impl Display for Seconds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
