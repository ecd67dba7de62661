//! Auxiliary vector lookup through `/proc/self/auxv`.
//!
//! The file is a sequence of native-endian `(type, value)` word pairs ending
//! with `AT_NULL`.

use crate::error::{Errno, Result};
use crate::fs::{self, OpenFlags};

pub const AT_NULL: u64 = 0;
pub const AT_PHDR: u64 = 3;
pub const AT_PAGESZ: u64 = 6;
pub const AT_BASE: u64 = 7;
pub const AT_ENTRY: u64 = 9;
pub const AT_HWCAP: u64 = 16;
pub const AT_RANDOM: u64 = 25;
/// Base of the vDSO image mapped into every process.
pub const AT_SYSINFO_EHDR: u64 = 33;

/// Enough for every entry current kernels emit.
const AUXV_CAPACITY: usize = 1024;

const ENTRY_SIZE: usize = 16;

/// Value of auxiliary entry `ty`, or `None` if the kernel did not supply it.
pub fn read(ty: u64) -> Result<Option<u64>> {
    let mut buf = [0u8; AUXV_CAPACITY];
    let len = load(&mut buf)?;
    Ok(find(&buf[..len], ty))
}

/// Base address of the vDSO, if the kernel mapped one.
pub fn vdso_base() -> Result<Option<usize>> {
    Ok(read(AT_SYSINFO_EHDR)?.map(|v| v as usize))
}

fn load(buf: &mut [u8]) -> Result<usize> {
    let fd = fs::open(c"/proc/self/auxv", OpenFlags::READ_ONLY | OpenFlags::CLOEXEC, 0)?;
    let mut len = 0;
    let res = loop {
        if len == buf.len() {
            break Ok(len);
        }
        match fd.read(&mut buf[len..]) {
            Ok(0) => break Ok(len),
            Ok(n) => len += n,
            Err(Errno::EINTR) => continue,
            Err(e) => break Err(e),
        }
    };
    fd.close()?;
    res
}

fn word(bytes: &[u8]) -> u64 {
    let mut w = [0u8; 8];
    w.copy_from_slice(&bytes[..8]);
    u64::from_ne_bytes(w)
}

fn find(auxv: &[u8], ty: u64) -> Option<u64> {
    for entry in auxv.chunks_exact(ENTRY_SIZE) {
        let key = word(entry);
        if key == AT_NULL {
            break;
        }
        if key == ty {
            return Some(word(&entry[8..]));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ty: u64, val: u64) -> [u8; 16] {
        let mut e = [0u8; 16];
        e[..8].copy_from_slice(&ty.to_ne_bytes());
        e[8..].copy_from_slice(&val.to_ne_bytes());
        e
    }

    #[test]
    fn test_find_stops_at_null() {
        let mut v = std::vec::Vec::new();
        v.extend_from_slice(&entry(AT_PAGESZ, 4096));
        v.extend_from_slice(&entry(AT_NULL, 0));
        v.extend_from_slice(&entry(AT_ENTRY, 0x1234));
        assert_eq!(find(&v, AT_PAGESZ), Some(4096));
        assert_eq!(find(&v, AT_ENTRY), None);
        assert_eq!(find(&v[..10], AT_PAGESZ), None);
    }

    #[test]
    fn test_page_size_from_kernel() {
        let page = read(AT_PAGESZ).unwrap().expect("AT_PAGESZ");
        assert!(page.is_power_of_two() && page >= crate::mm::PAGE_SIZE as u64);
    }

    #[test]
    fn test_vdso_present() {
        let base = vdso_base().unwrap().expect("kernel maps a vDSO");
        assert_eq!(base % crate::mm::PAGE_SIZE, 0);
    }
}
