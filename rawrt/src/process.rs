//! Process identity and signal delivery.
//!
//! Maps process operations to syscalls:
//! - `getpid` -> SYS_GETPID
//! - `gettid` -> SYS_GETTID
//! - `tgkill` -> SYS_TGKILL
//! - `exit_group` -> SYS_EXIT_GROUP

use crate::error::Result;
use crate::sys::{self, syscall0, syscall1, syscall3, syscall_result};

/// Trace/breakpoint trap.
pub const SIGTRAP: i32 = 5;
/// Abort; default action dumps core.
pub const SIGABRT: i32 = 6;
/// Kill; cannot be caught or ignored.
pub const SIGKILL: i32 = 9;

/// Thread-group (process) ID.
pub fn getpid() -> i32 {
    // SAFETY: getpid never fails.
    unsafe { syscall0(sys::SYS_GETPID) as i32 }
}

/// Kernel thread ID of the caller.
pub fn gettid() -> i32 {
    // SAFETY: gettid never fails.
    unsafe { syscall0(sys::SYS_GETTID) as i32 }
}

/// Send `sig` to thread `tid` of thread group `tgid`.
pub fn tgkill(tgid: i32, tid: i32, sig: i32) -> Result<()> {
    // SAFETY: the kernel validates ids and signal number.
    let ret = unsafe { syscall3(sys::SYS_TGKILL, tgid as usize, tid as usize, sig as usize) };
    syscall_result(ret).map(|_| ())
}

/// Send `sig` to the calling thread.
pub fn raise(sig: i32) -> Result<()> {
    tgkill(getpid(), gettid(), sig)
}

/// Terminate every thread in the process.
pub fn exit_group(code: i32) -> ! {
    // SAFETY: exit_group terminates the process and does not return.
    unsafe {
        syscall1(sys::SYS_EXIT_GROUP, code as usize);
    }
    // The kernel should never return, but just in case:
    loop {
        core::hint::spin_loop();
    }
}
