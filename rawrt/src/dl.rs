//! Symbol lookup in an ELF64 image that is already mapped.
//!
//! Nothing is loaded or relocated here. The image (typically the vDSO, see
//! [`crate::auxv::vdso_base`]) must be mapped in full at `base`, and its
//! dynamic table must still hold link-time addresses; every address read
//! from it is adjusted by the load bias.

use core::ffi::{c_char, CStr};
use core::fmt;
use core::ptr;

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
const ELFCLASS64: u8 = 2;
const ELFDATA2LSB: u8 = 1;

const PT_LOAD: u32 = 1;
const PT_DYNAMIC: u32 = 2;

const DT_NULL: i64 = 0;
const DT_HASH: i64 = 4;
const DT_STRTAB: i64 = 5;
const DT_SYMTAB: i64 = 6;
const DT_GNU_HASH: i64 = 0x6fff_fef5;

const SHN_UNDEF: u16 = 0;
const STB_GLOBAL: u8 = 1;
const STB_WEAK: u8 = 2;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
struct Elf64Header {
    ident: [u8; 16],
    elf_type: u16,
    machine: u16,
    version: u32,
    entry: u64,
    phoff: u64,
    shoff: u64,
    flags: u32,
    ehsize: u16,
    phentsize: u16,
    phnum: u16,
    shentsize: u16,
    shnum: u16,
    shstrndx: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
struct Elf64ProgramHeader {
    p_type: u32,
    p_flags: u32,
    p_offset: u64,
    p_vaddr: u64,
    p_paddr: u64,
    p_filesz: u64,
    p_memsz: u64,
    p_align: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct Elf64Dynamic {
    d_tag: i64,
    d_val: u64,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
#[allow(dead_code)]
struct Elf64Symbol {
    st_name: u32,
    st_info: u8,
    st_other: u8,
    st_shndx: u16,
    st_value: u64,
    st_size: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DlError {
    NullBase,
    InvalidMagic,
    InvalidClass,
    InvalidData,
    NoLoadSegment,
    NoDynamic,
    NoSymbolTable,
    NoHashTable,
}

impl fmt::Display for DlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DlError::NullBase => "null image base",
            DlError::InvalidMagic => "not an ELF image",
            DlError::InvalidClass => "not a 64-bit ELF image",
            DlError::InvalidData => "not a little-endian ELF image",
            DlError::NoLoadSegment => "no PT_LOAD segment",
            DlError::NoDynamic => "no PT_DYNAMIC segment",
            DlError::NoSymbolTable => "missing DT_SYMTAB or DT_STRTAB",
            DlError::NoHashTable => "missing DT_GNU_HASH and DT_HASH",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, Copy)]
enum HashTable {
    Gnu(*const u32),
    Sysv(*const u32),
}

/// A mapped ELF image ready for symbol lookups.
#[derive(Debug, Clone, Copy)]
pub struct Image {
    base: usize,
    bias: usize,
    symtab: *const Elf64Symbol,
    strtab: *const u8,
    hash: HashTable,
}

impl Image {
    /// Parse the image mapped at `base`.
    ///
    /// # Safety
    ///
    /// `base` must point at a complete ELF image mapped for reading, and
    /// the mapping must outlive the returned `Image`.
    pub unsafe fn from_base(base: *const u8) -> Result<Image, DlError> {
        if base.is_null() {
            return Err(DlError::NullBase);
        }
        // SAFETY: the caller guarantees a readable ELF header at base.
        let ehdr = unsafe { ptr::read_unaligned(base as *const Elf64Header) };
        if ehdr.ident[..4] != ELF_MAGIC {
            return Err(DlError::InvalidMagic);
        }
        if ehdr.ident[4] != ELFCLASS64 {
            return Err(DlError::InvalidClass);
        }
        if ehdr.ident[5] != ELFDATA2LSB {
            return Err(DlError::InvalidData);
        }

        let base_addr = base as usize;
        let mut bias = None;
        let mut dynamic = None;
        for i in 0..ehdr.phnum as usize {
            let off = ehdr.phoff as usize + i * ehdr.phentsize as usize;
            // SAFETY: program headers lie inside the mapped image.
            let phdr = unsafe { ptr::read_unaligned(base.add(off) as *const Elf64ProgramHeader) };
            match phdr.p_type {
                PT_LOAD if bias.is_none() => {
                    bias = Some(
                        base_addr
                            .wrapping_add(phdr.p_offset as usize)
                            .wrapping_sub(phdr.p_vaddr as usize),
                    );
                }
                PT_DYNAMIC => dynamic = Some(phdr.p_vaddr as usize),
                _ => {}
            }
        }
        let bias = bias.ok_or(DlError::NoLoadSegment)?;
        let dynamic = dynamic.ok_or(DlError::NoDynamic)?;

        let mut symtab = None;
        let mut strtab = None;
        let mut gnu_hash = None;
        let mut sysv_hash = None;
        let mut entry = bias.wrapping_add(dynamic) as *const Elf64Dynamic;
        loop {
            // SAFETY: the dynamic table is inside the image and ends with
            // DT_NULL.
            let dyn_entry = unsafe { ptr::read_unaligned(entry) };
            let addr = bias.wrapping_add(dyn_entry.d_val as usize);
            match dyn_entry.d_tag {
                DT_NULL => break,
                DT_SYMTAB => symtab = Some(addr as *const Elf64Symbol),
                DT_STRTAB => strtab = Some(addr as *const u8),
                DT_GNU_HASH => gnu_hash = Some(addr as *const u32),
                DT_HASH => sysv_hash = Some(addr as *const u32),
                _ => {}
            }
            // SAFETY: not past DT_NULL yet.
            entry = unsafe { entry.add(1) };
        }

        let (symtab, strtab) = symtab.zip(strtab).ok_or(DlError::NoSymbolTable)?;
        let hash = match (gnu_hash, sysv_hash) {
            (Some(h), _) => HashTable::Gnu(h),
            (None, Some(h)) => HashTable::Sysv(h),
            (None, None) => return Err(DlError::NoHashTable),
        };
        log::debug!("dl: image at {:#x}, bias {:#x}", base_addr, bias);
        Ok(Image {
            base: base_addr,
            bias,
            symtab,
            strtab,
            hash,
        })
    }

    pub fn base(&self) -> usize {
        self.base
    }

    /// Address of the defined global or weak symbol `name`.
    pub fn lookup(&self, name: &str) -> Option<usize> {
        let name = name.as_bytes();
        // SAFETY: from_base validated the tables, and the image stays
        // mapped for the life of self.
        let index = unsafe {
            match self.hash {
                HashTable::Gnu(h) => self.gnu_lookup(h, name),
                HashTable::Sysv(h) => self.sysv_lookup(h, name),
            }
        }?;
        // SAFETY: the hash table only yields indices into symtab.
        let sym = unsafe { ptr::read_unaligned(self.symtab.add(index)) };
        Some(self.bias.wrapping_add(sym.st_value as usize))
    }

    /// # Safety
    ///
    /// `index` must be a valid symbol index of this image.
    unsafe fn matches(&self, index: usize, name: &[u8]) -> bool {
        // SAFETY: per the caller, index is in range.
        let sym = unsafe { ptr::read_unaligned(self.symtab.add(index)) };
        let bind = sym.st_info >> 4;
        if sym.st_shndx == SHN_UNDEF || !(bind == STB_GLOBAL || bind == STB_WEAK) {
            return false;
        }
        // SAFETY: st_name is an offset of a NUL-terminated string in strtab.
        let sym_name = unsafe { CStr::from_ptr(self.strtab.add(sym.st_name as usize) as *const c_char) };
        sym_name.to_bytes() == name
    }

    /// # Safety
    ///
    /// `table` must be this image's DT_GNU_HASH table.
    unsafe fn gnu_lookup(&self, table: *const u32, name: &[u8]) -> Option<usize> {
        // SAFETY: the four-word header, bloom filter, buckets and chains
        // are laid out back to back in the mapped table.
        unsafe {
            let nbuckets = *table as usize;
            let symoffset = *table.add(1) as usize;
            let bloom_size = *table.add(2) as usize;
            let bloom_shift = *table.add(3);
            if nbuckets == 0 || bloom_size == 0 {
                return None;
            }
            let bloom = table.add(4) as *const u64;
            let buckets = bloom.add(bloom_size) as *const u32;
            let chains = buckets.add(nbuckets);

            let hash = gnu_hash(name);
            let word = ptr::read_unaligned(bloom.add((hash as usize / 64) % bloom_size));
            let mask = (1u64 << (hash % 64)) | (1u64 << ((hash >> bloom_shift) % 64));
            if word & mask != mask {
                return None;
            }

            let mut index = *buckets.add(hash as usize % nbuckets) as usize;
            if index < symoffset {
                return None;
            }
            loop {
                let chain_hash = *chains.add(index - symoffset);
                if (hash | 1) == (chain_hash | 1) && self.matches(index, name) {
                    return Some(index);
                }
                if chain_hash & 1 != 0 {
                    return None;
                }
                index += 1;
            }
        }
    }

    /// # Safety
    ///
    /// `table` must be this image's DT_HASH table.
    unsafe fn sysv_lookup(&self, table: *const u32, name: &[u8]) -> Option<usize> {
        // SAFETY: nbucket, nchain, then the bucket and chain arrays.
        unsafe {
            let nbucket = *table as usize;
            if nbucket == 0 {
                return None;
            }
            let buckets = table.add(2);
            let chains = buckets.add(nbucket);
            let mut index = *buckets.add(elf_hash(name) as usize % nbucket) as usize;
            while index != 0 {
                if self.matches(index, name) {
                    return Some(index);
                }
                index = *chains.add(index) as usize;
            }
            None
        }
    }
}

/// Resolve `name` in the image mapped at `handle`.
///
/// # Safety
///
/// Same contract as [`Image::from_base`].
pub unsafe fn dlsym(handle: *const u8, name: &str) -> Option<usize> {
    // SAFETY: forwarded from the caller.
    let image = unsafe { Image::from_base(handle) }.ok()?;
    image.lookup(name)
}

/// DT_GNU_HASH function (djb2, 32-bit).
fn gnu_hash(name: &[u8]) -> u32 {
    name.iter()
        .fold(5381u32, |h, &c| h.wrapping_mul(33).wrapping_add(c as u32))
}

/// DT_HASH function from the System V ABI.
fn elf_hash(name: &[u8]) -> u32 {
    let mut h: u32 = 0;
    for &c in name {
        h = (h << 4).wrapping_add(c as u32);
        let g = h & 0xf000_0000;
        if g != 0 {
            h ^= g >> 24;
        }
        h &= !g;
    }
    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{self, ClockId, Timespec};

    #[cfg(target_arch = "x86_64")]
    const CLOCK_GETTIME: &str = "__vdso_clock_gettime";
    #[cfg(target_arch = "aarch64")]
    const CLOCK_GETTIME: &str = "__kernel_clock_gettime";

    #[test]
    fn test_hash_functions() {
        assert_eq!(gnu_hash(b""), 5381);
        assert_eq!(gnu_hash(b"printf"), 0x156b_2bb8);
        assert_eq!(elf_hash(b""), 0);
        assert_eq!(elf_hash(b"printf"), 0x0779_05a6);
    }

    #[test]
    fn test_rejects_non_elf() {
        let zeros = [0u8; 128];
        // SAFETY: 128 readable bytes cover the header check.
        let err = unsafe { Image::from_base(zeros.as_ptr()) }.unwrap_err();
        assert_eq!(err, DlError::InvalidMagic);
        // SAFETY: null is rejected before any read.
        assert_eq!(unsafe { Image::from_base(ptr::null()) }.unwrap_err(), DlError::NullBase);
    }

    #[test]
    fn test_vdso_clock_gettime() {
        let base = crate::auxv::vdso_base().unwrap().expect("vDSO");
        // SAFETY: the kernel maps the whole vDSO for the life of the process.
        let image = unsafe { Image::from_base(base as *const u8) }.unwrap();
        assert_eq!(image.base(), base);
        assert_eq!(image.lookup("no_such_symbol_here"), None);

        let addr = image.lookup(CLOCK_GETTIME).expect("clock_gettime in vDSO");
        // SAFETY: the vDSO entry has the clock_gettime C signature.
        let vdso_gettime: extern "C" fn(usize, *mut Timespec) -> i32 =
            unsafe { core::mem::transmute(addr) };

        let before = time::now(ClockId::Monotonic).unwrap();
        let mut ts = Timespec::default();
        assert_eq!(vdso_gettime(ClockId::Monotonic as usize, &mut ts), 0);
        let after = time::now(ClockId::Monotonic).unwrap();
        let mid = time::Timeval::from(ts);
        assert!(before.as_micros() <= mid.as_micros());
        assert!(mid.as_micros() <= after.as_micros());

        // SAFETY: same image as above.
        assert_eq!(unsafe { dlsym(base as *const u8, CLOCK_GETTIME) }, Some(addr));
    }
}
