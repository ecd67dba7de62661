//! rawrt Runtime Substrate
//!
//! A freestanding layer over raw Linux system calls: memory mapping, block
//! memory operations, bounded formatted output, clocks, fast trig and a fatal
//! assertion path. Nothing here links against libc.
//!
//! The crate is `no_std`; unit tests build against std on a Linux host.

#![cfg_attr(not(test), no_std)]

pub mod sys;
pub mod error;
pub mod fs;
pub mod fmt;
pub mod mem;
pub mod mm;
pub mod time;
pub mod math;
pub mod process;
pub mod config;
pub mod assert;
pub mod logger;
pub mod arena;
pub mod heap;
pub mod orient;
pub mod auxv;
pub mod dl;

// Re-export commonly used items
pub use arena::Arena;
pub use assert::{panic_abort, Site};
pub use config::{AbortSignals, Config};
pub use error::{Errno, Result};
pub use fmt::{format_to, print, BufWriter, Output};
pub use fs::{Fd, OpenFlags};
pub use heap::RegionHeap;
pub use mm::{MapFlags, Prot, Region, MAP_FAILED, PAGE_SIZE};
pub use orient::{Quat, Vec3};
pub use time::{now, ClockId, FrameClock, Timespec, Timeval};
