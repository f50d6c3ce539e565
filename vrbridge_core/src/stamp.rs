//! Wall-clock stamps in the `{secs, nsecs}` form rosbridge headers use

use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Seconds + nanoseconds since the UNIX epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Stamp {
    pub secs: u64,
    pub nsecs: u32,
}

impl Stamp {
    /// Capture the current wall-clock time
    ///
    /// A clock set before 1970 yields the zero stamp.
    pub fn now() -> Self {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(Self::from_duration)
            .unwrap_or_default()
    }

    /// Build a stamp from a duration since the UNIX epoch
    pub fn from_duration(since_epoch: Duration) -> Self {
        Self {
            secs: since_epoch.as_secs(),
            nsecs: since_epoch.subsec_nanos(),
        }
    }
}
