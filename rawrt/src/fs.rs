//! File descriptor I/O.
//!
//! Maps descriptor operations to syscalls:
//! - `open` -> SYS_OPEN (SYS_OPENAT with AT_FDCWD on aarch64)
//! - `close` -> SYS_CLOSE
//! - `read` -> SYS_READ
//! - `write` -> SYS_WRITE

use core::ffi::CStr;

use bitflags::bitflags;

use crate::error::{Errno, Result};
use crate::fmt::Output;
use crate::sys::{self, syscall1, syscall3, syscall_result};

bitflags! {
    /// `open(2)` flags. The empty set is read-only access.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const WRONLY = 0o1;
        const RDWR = 0o2;
        const CREAT = 0o100;
        const EXCL = 0o200;
        const TRUNC = 0o1000;
        const APPEND = 0o2000;
        const NONBLOCK = 0o4000;
        const CLOEXEC = 0o2000000;
    }
}

impl OpenFlags {
    /// `O_RDONLY`.
    pub const READ_ONLY: Self = Self::empty();
}

/// A raw file descriptor number.
///
/// `Fd` is `Copy` and does not close on drop; whoever opened it calls
/// [`Fd::close`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fd(i32);

impl Fd {
    /// Standard input.
    pub const STDIN: Fd = Fd(0);
    /// Standard output.
    pub const STDOUT: Fd = Fd(1);
    /// Standard error.
    pub const STDERR: Fd = Fd(2);

    /// Wrap an existing descriptor number.
    pub const fn from_raw(fd: i32) -> Self {
        Fd(fd)
    }

    /// Return the raw descriptor number.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Read into `buf`. Returns the number of bytes read (0 at EOF).
    pub fn read(self, buf: &mut [u8]) -> Result<usize> {
        // SAFETY: buf is a valid, writable region of buf.len() bytes.
        let ret = unsafe {
            syscall3(
                sys::SYS_READ,
                self.0 as usize,
                buf.as_mut_ptr() as usize,
                buf.len(),
            )
        };
        syscall_result(ret)
    }

    /// Write `data` with a single syscall. Returns the number of bytes the
    /// kernel accepted.
    pub fn write(self, data: &[u8]) -> Result<usize> {
        syscall_result(write_raw(self, data))
    }

    /// Write all bytes, retrying on partial writes.
    pub fn write_all(self, data: &[u8]) -> Result<usize> {
        let mut written = 0;
        while written < data.len() {
            let n = match self.write(&data[written..]) {
                Ok(n) => n,
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e),
            };
            if n == 0 {
                return Err(Errno::EIO);
            }
            written += n;
        }
        Ok(written)
    }

    /// Close the descriptor.
    pub fn close(self) -> Result<()> {
        // SAFETY: close takes a plain integer; an invalid fd yields EBADF.
        let ret = unsafe { syscall1(sys::SYS_CLOSE, self.0 as usize) };
        syscall_result(ret).map(|_| ())
    }
}

/// One write syscall, returning the raw kernel word.
#[inline]
pub(crate) fn write_raw(fd: Fd, data: &[u8]) -> isize {
    // SAFETY: data is a valid, readable region of data.len() bytes.
    unsafe {
        syscall3(
            sys::SYS_WRITE,
            fd.0 as usize,
            data.as_ptr() as usize,
            data.len(),
        )
    }
}

impl Output for Fd {
    fn write_bytes(&self, bytes: &[u8]) -> isize {
        write_raw(*self, bytes)
    }
}

/// Open `path` and return the raw kernel word (descriptor or error).
pub fn open_raw(path: &CStr, flags: OpenFlags, mode: u32) -> isize {
    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: path is NUL-terminated and outlives the call.
        unsafe {
            syscall3(
                sys::SYS_OPEN,
                path.as_ptr() as usize,
                flags.bits() as usize,
                mode as usize,
            )
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: path is NUL-terminated and outlives the call.
        unsafe {
            crate::sys::syscall4(
                sys::SYS_OPENAT,
                sys::AT_FDCWD as usize,
                path.as_ptr() as usize,
                flags.bits() as usize,
                mode as usize,
            )
        }
    }
}

/// Open `path`. `mode` only matters together with [`OpenFlags::CREAT`].
pub fn open(path: &CStr, flags: OpenFlags, mode: u32) -> Result<Fd> {
    let fd = syscall_result(open_raw(path, flags, mode))?;
    Ok(Fd(fd as i32))
}
