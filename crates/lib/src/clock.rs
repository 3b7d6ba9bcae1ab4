//! Time provider abstraction
//!
//! History and audit entries are stamped through a [`Clock`] so that
//! production code uses real system time while tests can use a
//! controllable clock.
//!
//! # Example
//!
//! ```
//! use sitecms::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let now = clock.now_utc();
//! assert!(now.timestamp() > 0);
//! ```

use std::fmt::Debug;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, TimeZone, Utc};

/// A time provider for stamping history and audit records.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as milliseconds since Unix epoch.
    fn now_millis(&self) -> u64;

    /// Returns the current time as a UTC datetime.
    fn now_utc(&self) -> DateTime<Utc> {
        let millis = self.now_millis();
        Utc.timestamp_millis_opt(millis as i64)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock with auto-advancing time.
///
/// Every `now_millis()` call returns the current value and then advances by
/// one millisecond, so consecutive records always get strictly increasing
/// timestamps and newest-first ordering is deterministic in tests.
///
/// ```
/// use sitecms::{Clock, FixedClock};
///
/// let clock = FixedClock::new(1000);
/// let t1 = clock.now_millis();
/// let t2 = clock.now_millis();
/// assert!(t2 > t1);
/// ```
pub struct FixedClock {
    millis: Mutex<u64>,
}

impl FixedClock {
    /// Create a new fixed clock with the given initial time in milliseconds.
    pub fn new(millis: u64) -> Self {
        Self {
            millis: Mutex::new(millis),
        }
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance(&self, ms: u64) {
        *self.lock() += ms;
    }

    /// Get the current time without advancing.
    pub fn get(&self) -> u64 {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, u64> {
        self.millis
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        let mut millis = self.lock();
        let t = *millis;
        *millis += 1;
        t
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1704067200000)
    }
}

impl Debug for FixedClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixedClock")
            .field("millis", &self.get())
            .finish()
    }
}
