//! Leveled diagnostic logging for the collective engines.
//!
//! Purely observational — nothing in `coll` or `coll-transport` branches on
//! whether logging is enabled. Tags each line with the calling rank and
//! (when set) the current collective phase/step, instead of a thread id.
//!
//! # Environment variables
//!
//! - `COLL_LOG_LEVEL` - off/error/warn/info/debug/trace (or 0-5)
//! - `COLL_LOG_TIME` - include elapsed nanoseconds since process start
//! - `COLL_LOG_FLUSH` - flush stderr after every line (useful when
//!   diagnosing a hang partway through a collective)
//!
//! # Usage
//!
//! ```ignore
//! use coll_core::{cinfo, cdebug};
//!
//! cdebug!("sending chunk {} to rank {}", chunk, dst);
//! cinfo!("collective complete");
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Instant;

use crate::env::env_get_bool;

/// Log levels, most to least severe.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Trace => "[TRACE]",
        }
    }
}

static FLUSH_ENABLED: AtomicBool = AtomicBool::new(false);
static TIME_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);
static INITIALIZED: AtomicBool = AtomicBool::new(false);

static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize logging from environment variables. Idempotent; called
/// automatically on first log line.
pub fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }
    START_TIME.get_or_init(Instant::now);
    FLUSH_ENABLED.store(env_get_bool("COLL_LOG_FLUSH", false), Ordering::Relaxed);
    TIME_ENABLED.store(env_get_bool("COLL_LOG_TIME", false), Ordering::Relaxed);

    if let Ok(val) = std::env::var("COLL_LOG_LEVEL") {
        let level = match val.to_lowercase().as_str() {
            "off" | "0" => LogLevel::Off,
            "error" | "1" => LogLevel::Error,
            "warn" | "2" => LogLevel::Warn,
            "info" | "3" => LogLevel::Info,
            "debug" | "4" => LogLevel::Debug,
            "trace" | "5" => LogLevel::Trace,
            _ => LogLevel::Info,
        };
        LOG_LEVEL.store(level as u8, Ordering::Relaxed);
    }
}

#[inline]
fn flush_enabled() -> bool {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    FLUSH_ENABLED.load(Ordering::Relaxed)
}

#[inline]
fn time_enabled() -> bool {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    TIME_ENABLED.load(Ordering::Relaxed)
}

#[inline]
fn log_level() -> LogLevel {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Set log level programmatically (overrides `COLL_LOG_LEVEL`).
pub fn set_log_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

#[inline]
fn level_enabled(level: LogLevel) -> bool {
    level as u8 <= log_level() as u8
}

#[inline]
fn elapsed_ns() -> u64 {
    let start = START_TIME.get_or_init(Instant::now);
    start.elapsed().as_nanos() as u64
}

thread_local! {
    static RANK: std::cell::Cell<Option<u32>> = const { std::cell::Cell::new(None) };
}

/// Set the rank tag used in log lines emitted from this thread.
pub fn set_rank(rank: u32) {
    RANK.with(|r| r.set(Some(rank)));
}

/// Clear the rank tag for this thread.
pub fn clear_rank() {
    RANK.with(|r| r.set(None));
}

fn format_context() -> String {
    match RANK.with(|r| r.get()) {
        Some(r) => format!("[r{}]", r),
        None => "[r-]".to_string(),
    }
}

#[doc(hidden)]
pub fn _clog_impl(level: LogLevel, args: std::fmt::Arguments<'_>) {
    if !level_enabled(level) {
        return;
    }
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = write!(handle, "{} ", level.prefix());
    if time_enabled() {
        let _ = write!(handle, "[{}] ", elapsed_ns());
    }
    let _ = write!(handle, "{} ", format_context());
    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");
    if flush_enabled() {
        let _ = handle.flush();
    }
}

/// Error-level log with rank context.
#[macro_export]
macro_rules! cerror {
    ($($arg:tt)*) => {{
        $crate::diag::_clog_impl($crate::diag::LogLevel::Error, format_args!($($arg)*));
    }};
}

/// Warning-level log with rank context.
#[macro_export]
macro_rules! cwarn {
    ($($arg:tt)*) => {{
        $crate::diag::_clog_impl($crate::diag::LogLevel::Warn, format_args!($($arg)*));
    }};
}

/// Info-level log with rank context.
#[macro_export]
macro_rules! cinfo {
    ($($arg:tt)*) => {{
        $crate::diag::_clog_impl($crate::diag::LogLevel::Info, format_args!($($arg)*));
    }};
}

/// Debug-level log with rank context.
#[macro_export]
macro_rules! cdebug {
    ($($arg:tt)*) => {{
        $crate::diag::_clog_impl($crate::diag::LogLevel::Debug, format_args!($($arg)*));
    }};
}

/// Trace-level log with rank context.
#[macro_export]
macro_rules! ctrace {
    ($($arg:tt)*) => {{
        $crate::diag::_clog_impl($crate::diag::LogLevel::Trace, format_args!($($arg)*));
    }};
}
