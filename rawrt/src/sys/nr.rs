//! Syscall numbers.
//!
//! These must match the host kernel's table exactly.

#[cfg(target_arch = "x86_64")]
mod table {
    pub const SYS_READ: usize = 0;
    pub const SYS_WRITE: usize = 1;
    pub const SYS_OPEN: usize = 2;
    pub const SYS_CLOSE: usize = 3;
    pub const SYS_MMAP: usize = 9;
    pub const SYS_MUNMAP: usize = 11;
    pub const SYS_GETPID: usize = 39;
    pub const SYS_GETTID: usize = 186;
    pub const SYS_CLOCK_GETTIME: usize = 228;
    pub const SYS_EXIT_GROUP: usize = 231;
    pub const SYS_TGKILL: usize = 234;
    pub const SYS_OPENAT: usize = 257;
}

// The generic table has no open(2); open goes through openat(AT_FDCWD, ...).
#[cfg(target_arch = "aarch64")]
mod table {
    pub const SYS_OPENAT: usize = 56;
    pub const SYS_CLOSE: usize = 57;
    pub const SYS_READ: usize = 63;
    pub const SYS_WRITE: usize = 64;
    pub const SYS_EXIT_GROUP: usize = 94;
    pub const SYS_CLOCK_GETTIME: usize = 113;
    pub const SYS_TGKILL: usize = 131;
    pub const SYS_GETPID: usize = 172;
    pub const SYS_GETTID: usize = 178;
    pub const SYS_MUNMAP: usize = 215;
    pub const SYS_MMAP: usize = 222;
}

pub use table::*;

/// `dirfd` value meaning "relative to the current directory".
pub const AT_FDCWD: isize = -100;
