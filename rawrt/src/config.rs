//! Process-wide runtime configuration.
//!
//! Set once, early, with [`init`]; until then (or if never called) every
//! reader sees [`Config::DEFAULT`].

use log::LevelFilter;
use spin::Once;

use crate::fs::Fd;
use crate::process::{SIGABRT, SIGKILL};

/// The two signals the fatal-assertion path sends to the failing thread.
///
/// `first` gives an attached debugger or handler a chance to look; `second`
/// must be uncatchable so the process dies regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortSignals {
    pub first: i32,
    pub second: i32,
}

impl AbortSignals {
    pub const DEFAULT: AbortSignals = AbortSignals {
        first: SIGABRT,
        second: SIGKILL,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Descriptor for `printf!`, log records and assertion diagnostics.
    pub output: Fd,
    pub abort: AbortSignals,
    pub log_level: LevelFilter,
}

impl Config {
    pub const DEFAULT: Config = Config {
        output: Fd::STDOUT,
        abort: AbortSignals::DEFAULT,
        log_level: LevelFilter::Info,
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

static CONFIG: Once<Config> = Once::new();

/// Install `config`. The first call wins; later calls return the config
/// already in place.
pub fn init(config: Config) -> &'static Config {
    CONFIG.call_once(|| config)
}

/// The active configuration.
#[inline]
pub fn get() -> &'static Config {
    CONFIG.get().unwrap_or(&Config::DEFAULT)
}
