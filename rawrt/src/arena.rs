//! Bump arena over a reservation.
//!
//! The usual setup reserves far more address space than will ever be used
//! (hundreds of GiB, no-reserve) so the arena base never moves and pointers
//! into it stay valid for the life of the process. Only pages the arena
//! hands out and the caller touches are ever backed.
//!
//! There is no free list: memory comes back all at once with [`Arena::reset`]
//! or by releasing the region.

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::error::Result;
use crate::mem;
use crate::mm::Region;

pub struct Arena {
    region: Region,
    offset: usize,
}

impl Arena {
    /// Reserve a fresh no-reserve region of `len` bytes for the arena.
    pub fn reserve(len: usize) -> Result<Arena> {
        Ok(Self::new(Region::reserve_arena(len)?))
    }

    /// Build an arena over a read/write region.
    pub fn new(region: Region) -> Arena {
        Arena { region, offset: 0 }
    }

    /// Bump-allocate `layout`. `None` once the region is exhausted.
    pub fn alloc(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        let base = self.region.base();
        let start = base.checked_add(self.offset)?;
        let aligned = start.checked_add(layout.align() - 1)? & !(layout.align() - 1);
        let end = aligned.checked_add(layout.size())?;
        if end > self.region.end() {
            log::trace!("arena: {:#x} bytes do not fit", layout.size());
            return None;
        }
        self.offset = end - base;
        NonNull::new(aligned as *mut u8)
    }

    /// Like [`Arena::alloc`] but zero-filled. Fresh anonymous pages are
    /// already zero; this matters after [`Arena::reset`].
    pub fn alloc_zeroed(&mut self, layout: Layout) -> Option<NonNull<u8>> {
        let ptr = self.alloc(layout)?;
        // SAFETY: alloc just handed out layout.size() bytes at ptr.
        unsafe { mem::memset(ptr.as_ptr(), 0, layout.size()) };
        Some(ptr)
    }

    /// Allocate room for one `T` and move `value` into it.
    pub fn alloc_value<T>(&mut self, value: T) -> Option<&mut T> {
        let ptr = self.alloc(Layout::new::<T>())?.cast::<T>();
        // SAFETY: ptr is aligned for T, sized for T and not aliased; the
        // borrow of self keeps the arena from being reset while the
        // reference lives.
        unsafe {
            ptr.as_ptr().write(value);
            Some(&mut *ptr.as_ptr())
        }
    }

    /// Bytes handed out so far, alignment padding included.
    pub fn used(&self) -> usize {
        self.offset
    }

    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    pub fn base(&self) -> usize {
        self.region.base()
    }

    /// Forget every allocation. Pages stay mapped and keep their contents.
    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Stop using the arena and give the region back to the caller.
    pub fn into_region(self) -> Region {
        self.region
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_and_align() {
        let mut arena = Arena::reserve(1 << 20).unwrap();
        let a = arena.alloc(Layout::from_size_align(3, 1).unwrap()).unwrap();
        let b = arena.alloc(Layout::from_size_align(8, 8).unwrap()).unwrap();
        assert_eq!(a.as_ptr() as usize, arena.base());
        assert_eq!(b.as_ptr() as usize % 8, 0);
        assert_eq!(b.as_ptr() as usize, arena.base() + 8);
        assert_eq!(arena.used(), 16);
        arena.into_region().release().unwrap();
    }

    #[test]
    fn test_exhaustion() {
        let mut arena = Arena::reserve(4096).unwrap();
        assert!(arena.alloc(Layout::from_size_align(4000, 1).unwrap()).is_some());
        assert!(arena.alloc(Layout::from_size_align(200, 1).unwrap()).is_none());
        assert!(arena.alloc(Layout::from_size_align(96, 1).unwrap()).is_some());
        assert_eq!(arena.used(), 4096);
        arena.into_region().release().unwrap();
    }

    #[test]
    fn test_reset_and_zeroed() {
        let mut arena = Arena::reserve(4096).unwrap();
        let layout = Layout::from_size_align(64, 8).unwrap();
        let p = arena.alloc(layout).unwrap();
        // SAFETY: 64 bytes were just allocated at p.
        unsafe { mem::memset(p.as_ptr(), 0xEE, 64) };
        arena.reset();
        let q = arena.alloc_zeroed(layout).unwrap();
        assert_eq!(p, q);
        // SAFETY: q points at 64 initialized bytes inside the arena.
        let bytes = unsafe { core::slice::from_raw_parts(q.as_ptr(), 64) };
        assert!(bytes.iter().all(|&b| b == 0));
        arena.into_region().release().unwrap();
    }

    #[test]
    fn test_state_struct_at_base() {
        struct State {
            frame: u64,
            vert_source: [u8; 4096],
        }
        let mut arena = Arena::reserve(64 << 30).unwrap();
        let base = arena.base();
        let state = arena
            .alloc_value(State {
                frame: 7,
                vert_source: [0; 4096],
            })
            .unwrap();
        state.frame += 1;
        assert_eq!(state.frame, 8);
        assert_eq!(state.vert_source[4095], 0);
        assert_eq!(&*state as *const State as usize, base);
        arena.into_region().release().unwrap();
    }
}
