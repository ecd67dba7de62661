//! Byte-wise block operations.

/// Fill `n` bytes starting at `dst` with `c`.
///
/// # Safety
/// `dst` must be valid for writes of `n` bytes.
pub unsafe fn memset(dst: *mut u8, c: u8, n: usize) -> *mut u8 {
    for i in 0..n {
        // SAFETY: caller guarantees dst..dst+n is writable.
        unsafe { *dst.add(i) = c };
    }
    dst
}

/// Copy `n` bytes from `src` to `dst` in ascending address order.
///
/// # Safety
/// `src` must be valid for reads and `dst` for writes of `n` bytes, and the
/// regions must not overlap.
pub unsafe fn memcpy(dst: *mut u8, src: *const u8, n: usize) -> *mut u8 {
    for i in 0..n {
        // SAFETY: caller guarantees both ranges are valid and disjoint.
        unsafe { *dst.add(i) = *src.add(i) };
    }
    dst
}

/// Set every byte of `dst` to `c`.
pub fn fill(dst: &mut [u8], c: u8) {
    // SAFETY: the slice is exactly dst.len() writable bytes.
    unsafe { memset(dst.as_mut_ptr(), c, dst.len()) };
}

/// Copy all of `src` to the front of `dst`.
///
/// A destination shorter than `src` is fatal.
pub fn copy(dst: &mut [u8], src: &[u8]) {
    crate::rt_assert!(dst.len() >= src.len());
    // SAFETY: bounds checked above; `&mut` and `&` borrows cannot alias.
    unsafe { memcpy(dst.as_mut_ptr(), src.as_ptr(), src.len()) };
}

/// True if the first `n` bytes of `a` and `b` are equal. Slices shorter than
/// `n` compare unequal.
pub fn prefix_eq(a: &[u8], b: &[u8], n: usize) -> bool {
    match (a.get(..n), b.get(..n)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_stays_in_bounds() {
        for len in [0usize, 1, 7, 64, 255] {
            for v in [0x00u8, 0x5A, 0xFF] {
                let mut buf = [0x11u8; 256];
                fill(&mut buf[..len], v);
                assert!(buf[..len].iter().all(|&b| b == v));
                assert_eq!(buf[len], 0x11);
            }
        }
    }

    #[test]
    fn test_raw_memset_returns_dst() {
        let mut buf = [0u8; 8];
        let p = buf.as_mut_ptr();
        // SAFETY: buf has 8 bytes; we touch 5.
        let r = unsafe { memset(p, 3, 5) };
        assert_eq!(r, p);
        assert_eq!(buf, [3, 3, 3, 3, 3, 0, 0, 0]);
    }

    #[test]
    fn test_copy_matches_source() {
        let src: std::vec::Vec<u8> = (0..=255u8).collect();
        let mut dst = [0u8; 300];
        copy(&mut dst, &src);
        assert_eq!(&dst[..256], src.as_slice());
        assert!(dst[256..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_copy_empty() {
        let mut dst = [9u8; 2];
        copy(&mut dst, &[]);
        assert_eq!(dst, [9, 9]);
    }

    #[test]
    fn test_prefix_eq() {
        assert!(prefix_eq(b"shader.vert", b"shader.frag", 7));
        assert!(!prefix_eq(b"shader.vert", b"shader.frag", 8));
        assert!(prefix_eq(b"abc", b"xyz", 0));
        assert!(!prefix_eq(b"ab", b"abc", 3));
    }
}
