//! General-purpose heap over a reservation.
//!
//! Where [`crate::arena::Arena`] only bumps, this wraps a linked-list
//! allocator so individual blocks can be freed. Backing it with a large
//! no-reserve region keeps the heap from ever needing to grow: pages are
//! faulted in as allocations reach them.
//!
//! ```ignore
//! #[global_allocator]
//! static HEAP: RegionHeap = RegionHeap::empty();
//!
//! HEAP.reserve_and_init(64 << 30)?;
//! ```

use core::alloc::{GlobalAlloc, Layout};
use core::sync::atomic::{AtomicBool, Ordering};

use linked_list_allocator::LockedHeap;

use crate::error::{Errno, Result};
use crate::mm::Region;

pub struct RegionHeap {
    heap: LockedHeap,
    initialized: AtomicBool,
}

impl RegionHeap {
    pub const fn empty() -> Self {
        Self {
            heap: LockedHeap::empty(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Hand `region` to the heap for good. A second call returns the region
    /// untouched.
    pub fn init(&self, region: Region) -> core::result::Result<(), Region> {
        if self
            .initialized
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(region);
        }
        let (base, len) = region.into_raw_parts();
        // SAFETY: the region is a live read/write mapping that nothing else
        // can release now that its Region is consumed, and the flag above
        // lets init run only once.
        unsafe { self.heap.lock().init(base as *mut u8, len) };
        log::debug!("heap: {:#x} bytes at {:#x}", len, base);
        Ok(())
    }

    /// Reserve a no-reserve arena of `len` bytes and use it as the heap.
    pub fn reserve_and_init(&self, len: usize) -> Result<()> {
        let region = Region::reserve_arena(len)?;
        self.init(region).map_err(|region| {
            // Already initialized; the fresh reservation is not needed.
            let _ = region.release();
            Errno::EBUSY
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Bytes currently allocated.
    pub fn used(&self) -> usize {
        self.heap.lock().used()
    }

    /// Bytes still available.
    pub fn free(&self) -> usize {
        self.heap.lock().free()
    }

    /// Total heap size.
    pub fn size(&self) -> usize {
        self.heap.lock().size()
    }
}

impl Default for RegionHeap {
    fn default() -> Self {
        Self::empty()
    }
}

// SAFETY: every call is forwarded to LockedHeap, which upholds the
// GlobalAlloc contract behind its own lock.
unsafe impl GlobalAlloc for RegionHeap {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: forwarded unchanged; caller upholds GlobalAlloc::alloc.
        unsafe { self.heap.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: forwarded unchanged; caller upholds GlobalAlloc::dealloc.
        unsafe { self.heap.dealloc(ptr, layout) }
    }
}
