//! Raw Linux syscall entry points.
//!
//! This is the only module that contains inline assembly. Everything else in
//! the crate goes through `syscall0`..`syscall6` and interprets the returned
//! word itself.
//!
//! # Syscall Convention
//!
//! - **x86_64**: `syscall` instruction, nr in `rax`, args in `rdi/rsi/rdx/r10/r8/r9`
//! - **aarch64**: `svc #0`, nr in `x8`, args in `x0-x5`
//!
//! The kernel reports failure by returning a word in `-4095..=-1`; these
//! functions hand it back untouched.

mod nr;

pub use nr::*;

use crate::error::Errno;

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
compile_error!("rawrt only implements the x86_64 and aarch64 Linux syscall conventions");

/// Largest magnitude the kernel uses for an error return.
pub const MAX_ERRNO: usize = 4095;

/// Invoke a syscall with 0 arguments.
///
/// # Safety
/// `nr` must name a syscall whose side effects the caller is prepared for.
#[inline(always)]
pub unsafe fn syscall0(nr: usize) -> isize {
    let ret: isize;

    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: Caller guarantees nr is a valid syscall number.
        // The syscall instruction is the standard x86_64 mechanism for
        // entering the kernel. rcx and r11 are clobbered by the CPU.
        unsafe {
            core::arch::asm!(
                "syscall",
                inlateout("rax") nr as isize => ret,
                lateout("rcx") _,
                lateout("r11") _,
                options(nostack),
            );
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: Caller guarantees nr is a valid syscall number.
        // svc #0 is the standard AArch64 supervisor call instruction.
        unsafe {
            core::arch::asm!(
                "svc #0",
                inlateout("x0") 0isize => ret,
                in("x8") nr,
                options(nostack),
            );
        }
    }

    ret
}

/// Invoke a syscall with 1 argument.
///
/// # Safety
/// `nr` must be a valid syscall and `a1` must satisfy its contract (pointer
/// arguments must be valid for the access the kernel performs).
#[inline(always)]
pub unsafe fn syscall1(nr: usize, a1: usize) -> isize {
    let ret: isize;

    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: Caller guarantees valid syscall number and argument.
        unsafe {
            core::arch::asm!(
                "syscall",
                inlateout("rax") nr as isize => ret,
                in("rdi") a1,
                lateout("rcx") _,
                lateout("r11") _,
                options(nostack),
            );
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: Caller guarantees valid syscall number and argument.
        unsafe {
            core::arch::asm!(
                "svc #0",
                inlateout("x0") a1 as isize => ret,
                in("x8") nr,
                options(nostack),
            );
        }
    }

    ret
}

/// Invoke a syscall with 2 arguments.
///
/// # Safety
/// See [`syscall1`].
#[inline(always)]
pub unsafe fn syscall2(nr: usize, a1: usize, a2: usize) -> isize {
    let ret: isize;

    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: Caller guarantees valid syscall number and arguments.
        unsafe {
            core::arch::asm!(
                "syscall",
                inlateout("rax") nr as isize => ret,
                in("rdi") a1,
                in("rsi") a2,
                lateout("rcx") _,
                lateout("r11") _,
                options(nostack),
            );
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: Caller guarantees valid syscall number and arguments.
        unsafe {
            core::arch::asm!(
                "svc #0",
                inlateout("x0") a1 as isize => ret,
                in("x1") a2,
                in("x8") nr,
                options(nostack),
            );
        }
    }

    ret
}

/// Invoke a syscall with 3 arguments.
///
/// # Safety
/// See [`syscall1`].
#[inline(always)]
pub unsafe fn syscall3(nr: usize, a1: usize, a2: usize, a3: usize) -> isize {
    let ret: isize;

    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: Caller guarantees valid syscall number and arguments.
        unsafe {
            core::arch::asm!(
                "syscall",
                inlateout("rax") nr as isize => ret,
                in("rdi") a1,
                in("rsi") a2,
                in("rdx") a3,
                lateout("rcx") _,
                lateout("r11") _,
                options(nostack),
            );
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: Caller guarantees valid syscall number and arguments.
        unsafe {
            core::arch::asm!(
                "svc #0",
                inlateout("x0") a1 as isize => ret,
                in("x1") a2,
                in("x2") a3,
                in("x8") nr,
                options(nostack),
            );
        }
    }

    ret
}

/// Invoke a syscall with 4 arguments.
///
/// # Safety
/// See [`syscall1`].
#[inline(always)]
pub unsafe fn syscall4(nr: usize, a1: usize, a2: usize, a3: usize, a4: usize) -> isize {
    let ret: isize;

    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: Caller guarantees valid syscall number and arguments.
        unsafe {
            core::arch::asm!(
                "syscall",
                inlateout("rax") nr as isize => ret,
                in("rdi") a1,
                in("rsi") a2,
                in("rdx") a3,
                in("r10") a4,
                lateout("rcx") _,
                lateout("r11") _,
                options(nostack),
            );
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: Caller guarantees valid syscall number and arguments.
        unsafe {
            core::arch::asm!(
                "svc #0",
                inlateout("x0") a1 as isize => ret,
                in("x1") a2,
                in("x2") a3,
                in("x3") a4,
                in("x8") nr,
                options(nostack),
            );
        }
    }

    ret
}

/// Invoke a syscall with 5 arguments.
///
/// # Safety
/// See [`syscall1`].
#[inline(always)]
pub unsafe fn syscall5(
    nr: usize,
    a1: usize,
    a2: usize,
    a3: usize,
    a4: usize,
    a5: usize,
) -> isize {
    let ret: isize;

    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: Caller guarantees valid syscall number and arguments.
        unsafe {
            core::arch::asm!(
                "syscall",
                inlateout("rax") nr as isize => ret,
                in("rdi") a1,
                in("rsi") a2,
                in("rdx") a3,
                in("r10") a4,
                in("r8") a5,
                lateout("rcx") _,
                lateout("r11") _,
                options(nostack),
            );
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: Caller guarantees valid syscall number and arguments.
        unsafe {
            core::arch::asm!(
                "svc #0",
                inlateout("x0") a1 as isize => ret,
                in("x1") a2,
                in("x2") a3,
                in("x3") a4,
                in("x4") a5,
                in("x8") nr,
                options(nostack),
            );
        }
    }

    ret
}

/// Invoke a syscall with 6 arguments.
///
/// # Safety
/// See [`syscall1`].
#[inline(always)]
pub unsafe fn syscall6(
    nr: usize,
    a1: usize,
    a2: usize,
    a3: usize,
    a4: usize,
    a5: usize,
    a6: usize,
) -> isize {
    let ret: isize;

    #[cfg(target_arch = "x86_64")]
    {
        // SAFETY: Caller guarantees valid syscall number and arguments.
        unsafe {
            core::arch::asm!(
                "syscall",
                inlateout("rax") nr as isize => ret,
                in("rdi") a1,
                in("rsi") a2,
                in("rdx") a3,
                in("r10") a4,
                in("r8") a5,
                in("r9") a6,
                lateout("rcx") _,
                lateout("r11") _,
                options(nostack),
            );
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // SAFETY: Caller guarantees valid syscall number and arguments.
        unsafe {
            core::arch::asm!(
                "svc #0",
                inlateout("x0") a1 as isize => ret,
                in("x1") a2,
                in("x2") a3,
                in("x3") a4,
                in("x4") a5,
                in("x5") a6,
                in("x8") nr,
                options(nostack),
            );
        }
    }

    ret
}

// ============================================================================
// Error Handling
// ============================================================================

/// Returns true if `ret` is one of the kernel's error words.
#[inline]
pub fn is_error(ret: isize) -> bool {
    (ret as usize) > usize::MAX - MAX_ERRNO
}

/// Convert a raw syscall return value to a Result.
///
/// Only the typed wrappers use this; the raw entry points above never
/// translate.
#[inline]
pub fn syscall_result(ret: isize) -> Result<usize, Errno> {
    if is_error(ret) {
        Err(Errno::from_raw(ret))
    } else {
        Ok(ret as usize)
    }
}
