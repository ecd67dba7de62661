//! `log` backend writing to the configured output descriptor.
//!
//! Each record becomes one line, `[LEVEL] target: message`, formatted on the
//! stack and emitted with a single write. Lines longer than
//! [`LINE_CAPACITY`] are cut.

use core::fmt::Write;

use log::{Log, Metadata, Record, SetLoggerError};

use crate::config;
use crate::fmt::{BufWriter, Output};

/// Stack buffer per record.
pub const LINE_CAPACITY: usize = 512;

struct FdLogger;

static LOGGER: FdLogger = FdLogger;

impl Log for FdLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= config::get().log_level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut line = [0u8; LINE_CAPACITY];
        let total = render(record, &mut line);
        // Keep the newline even when the message was cut.
        let stored = total.min(LINE_CAPACITY - 1);
        if total > stored {
            line[stored - 1] = b'\n';
        }
        config::get().output.write_bytes(&line[..stored]);
    }

    fn flush(&self) {}
}

/// Format `record` as a log line into `buf`. Returns the untruncated length.
pub fn render(record: &Record<'_>, buf: &mut [u8]) -> usize {
    let mut w = BufWriter::new(buf);
    let _ = writeln!(
        w,
        "[{:<5}] {}: {}",
        record.level(),
        record.target(),
        record.args()
    );
    w.finish()
}

/// Install the backend and apply the configured level.
///
/// Fails if another logger was installed first.
pub fn init() -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(config::get().log_level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_render_line() {
        let mut buf = [0u8; 128];
        let n = render(
            &Record::builder()
                .args(format_args!("reserved {:#x} bytes", 4096))
                .level(Level::Debug)
                .target("rawrt::mm")
                .build(),
            &mut buf,
        );
        assert_eq!(&buf[..n], b"[DEBUG] rawrt::mm: reserved 0x1000 bytes\n");
    }

    #[test]
    fn test_render_pads_level() {
        let mut buf = [0u8; 64];
        let n = render(
            &Record::builder()
                .args(format_args!("up"))
                .level(Level::Info)
                .target("app")
                .build(),
            &mut buf,
        );
        assert_eq!(&buf[..n], b"[INFO ] app: up\n");
    }

    #[test]
    fn test_render_truncates() {
        let mut buf = [0u8; 8];
        let n = render(
            &Record::builder()
                .args(format_args!("a long message"))
                .level(Level::Warn)
                .target("t")
                .build(),
            &mut buf,
        );
        assert_eq!(n, "[WARN ] t: a long message\n".len());
        assert_eq!(&buf, b"[WARN ]\0");
    }

    #[test]
    fn test_enabled_follows_config() {
        // Unit tests only ever run with Info (default) or Debug installed.
        let logger = FdLogger;
        let error = Metadata::builder().level(Level::Error).build();
        let trace = Metadata::builder().level(Level::Trace).build();
        assert!(logger.enabled(&error));
        assert!(!logger.enabled(&trace));
    }
}
