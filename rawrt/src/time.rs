//! Wall-clock and monotonic time.
//!
//! Maps time operations to syscalls:
//! - `clock_gettime` -> SYS_CLOCK_GETTIME
//!
//! [`gettimeofday`] is built on `clock_gettime` and truncates nanoseconds to
//! microseconds. It forwards whichever clock the caller names, so it is only
//! monotonic when given a monotonic clock.

use crate::error::Result;
use crate::sys::{self, syscall2, syscall_result};

// ============================================================================
// Clock IDs
// ============================================================================

/// Kernel clock sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum ClockId {
    /// System-wide real-time clock.
    Realtime = 0,
    /// Monotonic clock (cannot be set).
    Monotonic = 1,
    /// Per-process CPU-time clock.
    ProcessCputime = 2,
    /// Per-thread CPU-time clock.
    ThreadCputime = 3,
    /// Monotonic clock without NTP slewing.
    MonotonicRaw = 4,
    RealtimeCoarse = 5,
    MonotonicCoarse = 6,
    /// Monotonic clock that includes suspend time.
    Boottime = 7,
}

// ============================================================================
// Time Structures
// ============================================================================

/// POSIX timespec structure.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timespec {
    /// Seconds.
    pub tv_sec: i64,
    /// Nanoseconds (0..999_999_999).
    pub tv_nsec: i64,
}

/// POSIX timeval structure.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timeval {
    /// Seconds.
    pub tv_sec: i64,
    /// Microseconds (0..999_999).
    pub tv_usec: i64,
}

impl Timeval {
    /// Milliseconds since the clock's epoch.
    pub fn as_millis(&self) -> u64 {
        (self.tv_sec as u64)
            .wrapping_mul(1000)
            .wrapping_add(self.tv_usec as u64 / 1000)
    }

    /// Microseconds since the clock's epoch.
    pub fn as_micros(&self) -> u64 {
        (self.tv_sec as u64)
            .wrapping_mul(1_000_000)
            .wrapping_add(self.tv_usec as u64)
    }
}

impl From<Timespec> for Timeval {
    fn from(ts: Timespec) -> Self {
        Timeval {
            tv_sec: ts.tv_sec,
            tv_usec: ts.tv_nsec / 1000,
        }
    }
}

// ============================================================================
// Time Operations
// ============================================================================

/// Read `clock` into `tp`. Returns the raw kernel word (0 on success).
pub fn clock_gettime(clock: ClockId, tp: &mut Timespec) -> isize {
    // SAFETY: tp is a valid, exclusively borrowed Timespec.
    unsafe {
        syscall2(
            sys::SYS_CLOCK_GETTIME,
            clock as usize,
            tp as *mut Timespec as usize,
        )
    }
}

/// Fill `tv` from `clock`. A `None` destination is a successful no-op.
///
/// Returns 0 or the negative kernel word.
pub fn gettimeofday(tv: Option<&mut Timeval>, clock: ClockId) -> isize {
    let Some(tv) = tv else {
        return 0;
    };
    let mut ts = Timespec::default();
    let ret = clock_gettime(clock, &mut ts);
    if sys::is_error(ret) {
        return ret;
    }
    *tv = ts.into();
    0
}

/// Current time on `clock`.
pub fn now(clock: ClockId) -> Result<Timeval> {
    let mut ts = Timespec::default();
    syscall_result(clock_gettime(clock, &mut ts))?;
    Ok(ts.into())
}

/// Frame-delta timer for the render loop.
///
/// [`FrameClock::tick`] reports the time since the previous tick in units of
/// 60 Hz frames, so a steady 60 fps loop sees values near 1.0.
#[derive(Debug)]
pub struct FrameClock {
    clock: ClockId,
    prev_ms: u64,
}

impl FrameClock {
    pub fn new(clock: ClockId) -> Result<Self> {
        Ok(Self {
            clock,
            prev_ms: now(clock)?.as_millis(),
        })
    }

    /// Milliseconds at the last tick (or at creation).
    pub fn last_ms(&self) -> u64 {
        self.prev_ms
    }

    pub fn tick(&mut self) -> Result<f64> {
        let curr = now(self.clock)?.as_millis();
        let dt = Self::frames_between(self.prev_ms, curr);
        self.prev_ms = curr;
        Ok(dt)
    }

    /// `(curr - prev) * 60 / 1000`.
    pub fn frames_between(prev_ms: u64, curr_ms: u64) -> f64 {
        (curr_ms.wrapping_sub(prev_ms) as f64 * 60.0) / 1000.0
    }
}
