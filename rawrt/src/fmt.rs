//! Formatted text output.
//!
//! `core::fmt` is the formatting engine; this module only decides where the
//! bytes go. Two entry points:
//!
//! - [`format_to`] renders into a caller buffer with snprintf semantics: at
//!   most `len - 1` bytes plus a NUL, returning the length the full output
//!   would have had.
//! - [`print`] renders into an `N`-byte stack buffer and hands the result to
//!   an [`Output`] in one write. There is no buffering between calls.

use core::fmt::{self, Write};

use crate::config;

/// Stack buffer size used by [`printf!`](crate::printf) and the assertion path.
pub const DEFAULT_PRINT_CAPACITY: usize = 4096;

/// Destination for formatted bytes.
///
/// [`crate::fs::Fd`] implements this with one `write` syscall per call.
pub trait Output {
    /// Write `bytes`, returning the raw result word (bytes written or a
    /// negative kernel error).
    fn write_bytes(&self, bytes: &[u8]) -> isize;
}

impl<O: Output + ?Sized> Output for &O {
    fn write_bytes(&self, bytes: &[u8]) -> isize {
        (**self).write_bytes(bytes)
    }
}

/// A truncating `fmt::Write` over a fixed byte buffer.
///
/// Keeps counting after the buffer is full so [`BufWriter::len`] reports the
/// untruncated length. The last byte of the buffer is reserved for the NUL
/// written by [`BufWriter::finish`].
pub struct BufWriter<'a> {
    buf: &'a mut [u8],
    written: usize,
    total: usize,
}

impl<'a> BufWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self {
            buf,
            written: 0,
            total: 0,
        }
    }

    /// Bytes the full output needs, excluding the NUL.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Bytes actually stored, excluding the NUL.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn is_truncated(&self) -> bool {
        self.written < self.total
    }

    /// The stored prefix of the output.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.written]
    }

    /// NUL-terminate and return the untruncated length.
    pub fn finish(self) -> usize {
        if let Some(slot) = self.buf.get_mut(self.written) {
            *slot = 0;
        }
        self.total
    }
}

impl Write for BufWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        self.total += bytes.len();

        let room = self.buf.len().saturating_sub(1).saturating_sub(self.written);
        let take = bytes.len().min(room);
        self.buf[self.written..self.written + take].copy_from_slice(&bytes[..take]);
        self.written += take;
        Ok(())
    }
}

/// Format `args` into `buf` and return the would-be length.
///
/// Never touches `buf[buf.len()..]`. A non-empty `buf` is always
/// NUL-terminated; a return value `>= buf.len()` means the text was cut.
pub fn format_to(buf: &mut [u8], args: fmt::Arguments<'_>) -> usize {
    let mut w = BufWriter::new(buf);
    // A Display impl may bail out early; what was produced so far stands.
    let _ = w.write_fmt(args);
    w.finish()
}

/// Format `args` into an `N`-byte stack buffer and write the stored bytes to
/// `out` with a single call. Returns the would-be length.
pub fn print<const N: usize, O: Output>(out: O, args: fmt::Arguments<'_>) -> usize {
    let mut buf = [0u8; N];
    let mut w = BufWriter::new(&mut buf);
    let _ = w.write_fmt(args);
    let stored = w.written();
    let total = w.finish();
    if stored > 0 {
        out.write_bytes(&buf[..stored]);
    }
    total
}

/// [`print`] to the configured output descriptor.
pub fn print_default(args: fmt::Arguments<'_>) -> usize {
    print::<DEFAULT_PRINT_CAPACITY, _>(config::get().output, args)
}

/// Format into a byte buffer, snprintf style. Evaluates to the would-be
/// length.
///
/// ```ignore
/// let mut path = [0u8; 256];
/// let n = snprintf!(&mut path, "{}{}", base, name);
/// ```
#[macro_export]
macro_rules! snprintf {
    ($buf:expr, $($arg:tt)*) => {
        $crate::fmt::format_to($buf, format_args!($($arg)*))
    };
}

/// Print to the configured output descriptor (stdout unless configured
/// otherwise) with a 4096-byte stack buffer.
#[macro_export]
macro_rules! printf {
    ($($arg:tt)*) => {
        $crate::fmt::print_default(format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use std::vec::Vec;

    struct Capture {
        bytes: RefCell<Vec<u8>>,
        calls: RefCell<usize>,
    }

    impl Capture {
        fn new() -> Self {
            Self {
                bytes: RefCell::new(Vec::new()),
                calls: RefCell::new(0),
            }
        }
    }

    impl Output for Capture {
        fn write_bytes(&self, bytes: &[u8]) -> isize {
            self.bytes.borrow_mut().extend_from_slice(bytes);
            *self.calls.borrow_mut() += 1;
            bytes.len() as isize
        }
    }

    #[test]
    fn test_fits() {
        let mut buf = [0xAAu8; 32];
        let n = format_to(&mut buf, format_args!("x={} y={:#x}", 42, 255));
        assert_eq!(n, 11);
        assert_eq!(&buf[..n], b"x=42 y=0xff");
        assert_eq!(buf[n], 0);
        assert_eq!(buf[n + 1], 0xAA);
    }

    #[test]
    fn test_truncates_and_terminates() {
        // Guard byte after the declared capacity must survive.
        let mut backing = [0xAAu8; 9];
        let (buf, guard) = backing.split_at_mut(8);
        let n = format_to(buf, format_args!("{}", "abcdefghijklmnop"));
        assert_eq!(n, 16);
        assert_eq!(&buf[..7], b"abcdefg");
        assert_eq!(buf[7], 0);
        assert_eq!(guard[0], 0xAA);
    }

    #[test]
    fn test_exact_fit_loses_last_byte() {
        let mut buf = [0u8; 4];
        let n = snprintf!(&mut buf, "abcd");
        assert_eq!(n, 4);
        assert_eq!(&buf, b"abc\0");
    }

    #[test]
    fn test_zero_capacity() {
        let mut buf = [0u8; 0];
        assert_eq!(format_to(&mut buf, format_args!("hello")), 5);
    }

    #[test]
    fn test_padding_precision_float() {
        let mut buf = [0u8; 64];
        let n = snprintf!(&mut buf, "[{:>5}|{:<4}|{:.3}|{:08.2}|{}]", 7, 'c', 1.0f64 / 3.0, -2.5f32, "s");
        assert_eq!(&buf[..n], b"[    7|c   |0.333|-0002.50|s]");
    }

    #[test]
    fn test_many_small_writes() {
        struct Pieces;
        impl fmt::Display for Pieces {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for i in 0..10 {
                    write!(f, "{}", i)?;
                }
                Ok(())
            }
        }
        let mut buf = [0u8; 6];
        let n = snprintf!(&mut buf, "{}", Pieces);
        assert_eq!(n, 10);
        assert_eq!(&buf, b"01234\0");
    }

    #[test]
    fn test_print_single_write() {
        let cap = Capture::new();
        let n = print::<64, _>(&cap, format_args!("{} + {} = {}\n", 1, 2, 3));
        assert_eq!(n, 10);
        assert_eq!(cap.bytes.borrow().as_slice(), b"1 + 2 = 3\n");
        assert_eq!(*cap.calls.borrow(), 1);
    }

    #[test]
    fn test_print_truncated_output() {
        let cap = Capture::new();
        let n = print::<4, _>(&cap, format_args!("truncate me"));
        assert_eq!(n, 11);
        assert_eq!(cap.bytes.borrow().as_slice(), b"tru");
    }

    #[test]
    fn test_print_empty_skips_write() {
        let cap = Capture::new();
        assert_eq!(print::<16, _>(&cap, format_args!("")), 0);
        assert_eq!(*cap.calls.borrow(), 0);
    }
}
