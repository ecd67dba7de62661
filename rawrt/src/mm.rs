//! Virtual memory reservation.
//!
//! Syscall mappings:
//! - `mmap` -> SYS_MMAP
//! - `munmap` -> SYS_MUNMAP
//!
//! The common pattern is a huge anonymous, private, no-reserve mapping used
//! as a never-moving arena base. The kernel backs pages only when they are
//! first touched; nothing here tracks which pages are live.

use bitflags::bitflags;

use crate::error::{Errno, Result};
use crate::fs::Fd;
use crate::sys::{self, syscall2, syscall6, syscall_result};

/// Page granularity assumed for alignment helpers.
pub const PAGE_SIZE: usize = 4096;

/// Returned by [`mmap`] on failure.
pub const MAP_FAILED: usize = usize::MAX; // (void *)-1

bitflags! {
    /// Page protection. The empty set is `PROT_NONE`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Prot: usize {
        const READ = 0x1;
        const WRITE = 0x2;
        const EXEC = 0x4;
        const GROWSDOWN = 0x0100_0000;
        const GROWSUP = 0x0200_0000;
    }
}

bitflags! {
    /// Mapping flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MapFlags: usize {
        const SHARED = 0x01;
        const PRIVATE = 0x02;
        const FIXED = 0x10;
        const ANONYMOUS = 0x20;
        const GROWSDOWN = 0x0100;
        const DENYWRITE = 0x0800;
        const EXECUTABLE = 0x1000;
        const LOCKED = 0x2000;
        const NORESERVE = 0x4000;
        const POPULATE = 0x8000;
        const NONBLOCK = 0x1_0000;
        const STACK = 0x2_0000;
        const HUGETLB = 0x4_0000;
        const FIXED_NOREPLACE = 0x10_0000;
    }
}

impl MapFlags {
    /// Mask of the sharing-type bits.
    pub const TYPE_MASK: usize = 0x0f;
}

/// Round `len` up to a whole number of pages.
#[inline]
pub const fn page_align_up(len: usize) -> usize {
    (len + PAGE_SIZE - 1) & !(PAGE_SIZE - 1)
}

/// Map memory. Returns the base address or [`MAP_FAILED`].
///
/// `addr` is a hint (0 lets the kernel choose) unless `flags` contains
/// `FIXED`/`FIXED_NOREPLACE`. `fd` is ignored for anonymous mappings; pass
/// -1.
///
/// # Safety
/// With `MapFlags::FIXED` the kernel silently replaces whatever was mapped in
/// the target range, so the caller must own that range.
pub unsafe fn mmap(
    addr: usize,
    len: usize,
    prot: Prot,
    flags: MapFlags,
    fd: i32,
    offset: usize,
) -> usize {
    // SAFETY: caller upholds the FIXED contract; every other combination
    // only creates a new mapping.
    let ret = unsafe {
        syscall6(
            sys::SYS_MMAP,
            addr,
            len,
            prot.bits(),
            flags.bits(),
            fd as isize as usize,
            offset,
        )
    };
    // The kernel returns -errno rather than -1; fold every error into the
    // sentinel.
    if sys::is_error(ret) {
        MAP_FAILED
    } else {
        ret as usize
    }
}

/// Unmap `[addr, addr + len)`. Returns the raw kernel status word.
///
/// # Safety
/// Nothing may reference the range afterwards, and it should match an
/// earlier mapping (or a page-aligned piece of one).
pub unsafe fn munmap(addr: usize, len: usize) -> isize {
    // SAFETY: caller guarantees the range is no longer referenced.
    unsafe { syscall2(sys::SYS_MUNMAP, addr, len) }
}

/// A successful reservation: the base/length pair that must be released
/// together.
///
/// Deliberately neither `Clone` nor `Drop`: [`Region::release`] consumes the
/// pair once, and an unreleased region simply lives for the process.
#[derive(Debug, PartialEq, Eq)]
pub struct Region {
    base: usize,
    len: usize,
}

impl Region {
    /// Reserve `len` bytes wherever the kernel chooses.
    pub fn reserve(len: usize, prot: Prot, flags: MapFlags) -> Result<Region> {
        Self::map(0, len, prot, flags & !(MapFlags::FIXED), -1, 0)
    }

    /// Reserve `len` bytes at `hint`. With `MapFlags::FIXED_NOREPLACE` the
    /// call fails with `EEXIST` if anything is already mapped there.
    ///
    /// Plain `MapFlags::FIXED` is stripped; replacing existing mappings
    /// needs the unsafe [`mmap`].
    pub fn reserve_at(hint: usize, len: usize, prot: Prot, flags: MapFlags) -> Result<Region> {
        Self::map(hint, len, prot, flags & !(MapFlags::FIXED), -1, 0)
    }

    /// Read/write anonymous private no-reserve reservation for arenas.
    pub fn reserve_arena(len: usize) -> Result<Region> {
        Self::reserve(
            len,
            Prot::READ | Prot::WRITE,
            MapFlags::PRIVATE | MapFlags::ANONYMOUS | MapFlags::NORESERVE,
        )
    }

    /// Map `len` bytes of `fd` starting at `offset` (page aligned).
    pub fn map_file(fd: Fd, len: usize, prot: Prot, flags: MapFlags, offset: usize) -> Result<Region> {
        let flags = flags & !(MapFlags::FIXED | MapFlags::ANONYMOUS);
        Self::map(0, len, prot, flags, fd.raw(), offset)
    }

    fn map(
        hint: usize,
        len: usize,
        prot: Prot,
        flags: MapFlags,
        fd: i32,
        offset: usize,
    ) -> Result<Region> {
        if len == 0 {
            return Err(Errno::EINVAL);
        }
        // SAFETY: FIXED was stripped by every caller, so no existing
        // mapping can be replaced.
        let ret = unsafe {
            syscall6(
                sys::SYS_MMAP,
                hint,
                len,
                prot.bits(),
                flags.bits(),
                fd as isize as usize,
                offset,
            )
        };
        match syscall_result(ret) {
            Ok(base) => {
                log::debug!("mm: reserved {:#x} bytes at {:#x}", len, base);
                Ok(Region { base, len })
            }
            Err(e) => {
                log::debug!("mm: reserve of {:#x} bytes failed: {}", len, e);
                Err(e)
            }
        }
    }

    /// Rebuild a region from a base/length pair obtained elsewhere.
    ///
    /// # Safety
    /// The pair must describe a live mapping nothing else will release.
    pub unsafe fn from_raw_parts(base: usize, len: usize) -> Region {
        Region { base, len }
    }

    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.base as *mut u8
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte.
    #[inline]
    pub fn end(&self) -> usize {
        self.base + self.len
    }

    /// Give back the `(base, len)` pair without unmapping.
    pub fn into_raw_parts(self) -> (usize, usize) {
        (self.base, self.len)
    }

    /// Unmap the region with exactly the base and length it was reserved
    /// with.
    pub fn release(self) -> Result<()> {
        // SAFETY: self was produced by a successful mmap of exactly this
        // range and is consumed here, so nothing safe can reach it again.
        let ret = unsafe { munmap(self.base, self.len) };
        syscall_result(ret)?;
        log::debug!("mm: released {:#x} bytes at {:#x}", self.len, self.base);
        Ok(())
    }
}
