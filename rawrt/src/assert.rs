//! Fatal assertions.
//!
//! A failed [`rt_assert!`](crate::rt_assert) prints one diagnostic line,
//! signals the calling thread twice (see [`AbortSignals`]) and then spins.
//! There is no unwinding and nothing is cleaned up.

use core::panic::PanicInfo;

use crate::config::{self, AbortSignals};
use crate::fmt::{print, Output, DEFAULT_PRINT_CAPACITY};
use crate::process;

/// Where an assertion lives and what it checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Site {
    pub expr: &'static str,
    pub file: &'static str,
    pub line: u32,
    pub function: &'static str,
}

/// Check `condition`; on `false`, terminate via [`fail`].
#[inline(always)]
pub fn assert(condition: bool, site: &Site) {
    if !condition {
        fail(site)
    }
}

/// Report `site` to the configured output and terminate.
#[cold]
#[inline(never)]
pub fn fail(site: &Site) -> ! {
    let cfg = config::get();
    fail_with(cfg.output, cfg.abort, site)
}

/// [`fail`] with an explicit output and signal pair.
#[cold]
pub fn fail_with<O: Output>(out: O, signals: AbortSignals, site: &Site) -> ! {
    report(out, site);
    terminate(signals)
}

/// Write the diagnostic line for `site`. Returns its length.
pub fn report<O: Output>(out: O, site: &Site) -> usize {
    print::<DEFAULT_PRINT_CAPACITY, _>(
        out,
        format_args!(
            "Assertion failed: {} ({}: {}: {})\n",
            site.expr, site.file, site.function, site.line
        ),
    )
}

/// Deliver `signals.first` then `signals.second` to the calling thread and
/// never return.
pub fn terminate(signals: AbortSignals) -> ! {
    let pid = process::getpid();
    let tid = process::gettid();
    // Results are ignored: if the first signal is handled we still want
    // the second, and if both are somehow deferred we spin below.
    let _ = process::tgkill(pid, tid, signals.first);
    let _ = process::tgkill(pid, tid, signals.second);
    loop {
        core::hint::spin_loop();
    }
}

/// Panic-handler body for freestanding binaries built on this crate.
///
/// ```ignore
/// #[panic_handler]
/// fn panic(info: &core::panic::PanicInfo) -> ! {
///     rawrt::assert::panic_abort(info)
/// }
/// ```
pub fn panic_abort(info: &PanicInfo<'_>) -> ! {
    let cfg = config::get();
    print::<DEFAULT_PRINT_CAPACITY, _>(cfg.output, format_args!("PANIC: {}\n", info));
    terminate(cfg.abort)
}

/// Name of the enclosing function, for assertion sites.
#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            core::any::type_name::<T>()
        }
        let name = type_name_of(f);
        match name.strip_suffix("::f") {
            Some(name) => name,
            None => name,
        }
    }};
}

/// Assert `cond`, terminating the process when it is false.
///
/// Unlike `assert!` this never unwinds and is active in every build profile.
#[macro_export]
macro_rules! rt_assert {
    ($cond:expr $(,)?) => {
        $crate::assert::assert(
            $cond,
            &$crate::assert::Site {
                expr: stringify!($cond),
                file: file!(),
                line: line!(),
                function: $crate::__function_name!(),
            },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;
    use std::vec::Vec;

    struct Capture(RefCell<Vec<u8>>);

    impl Output for Capture {
        fn write_bytes(&self, bytes: &[u8]) -> isize {
            self.0.borrow_mut().extend_from_slice(bytes);
            bytes.len() as isize
        }
    }

    #[test]
    fn test_report_line_format() {
        let cap = Capture(RefCell::new(Vec::new()));
        let site = Site {
            expr: "len > 0",
            file: "src/arena.rs",
            line: 42,
            function: "rawrt::arena::Arena::alloc",
        };
        report(&cap, &site);
        assert_eq!(
            cap.0.borrow().as_slice(),
            b"Assertion failed: len > 0 (src/arena.rs: rawrt::arena::Arena::alloc: 42)\n"
        );
    }

    #[test]
    fn test_true_condition_is_noop() {
        let x = 3;
        crate::rt_assert!(x == 3);
        crate::rt_assert!(x > 0,);
    }

    #[test]
    fn test_function_name() {
        let name = crate::__function_name!();
        assert!(name.ends_with("test_function_name"), "{}", name);
    }
}
