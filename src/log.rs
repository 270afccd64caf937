//! Minimal diagnostic logging for the allocator.
//!
//! Mirrors the single-backend, runtime-level-filtered design used elsewhere
//! in the host kernel's logging subsystem, but without an early-boot serial
//! fallback: until a backend is registered, log calls are no-ops. That keeps
//! this crate dependency-free and usable on any `no_std` target, including
//! ones without a serial port.

use core::fmt;
use core::sync::atomic::{AtomicPtr, AtomicU8, Ordering};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

/// Signature of a log backend: receives the level and the pre-formatted line.
pub type Backend = fn(LogLevel, fmt::Arguments<'_>);

/// Stored as a raw pointer; null means "no backend registered".
static BACKEND: AtomicPtr<()> = AtomicPtr::new(core::ptr::null_mut());
static CURRENT_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

#[inline(always)]
fn is_enabled(level: LogLevel) -> bool {
    (level as u8) <= CURRENT_LEVEL.load(Ordering::Relaxed)
}

/// Register a backend that receives all log lines at or above the current level.
pub fn register_backend(backend: Backend) {
    BACKEND.store(backend as *mut (), Ordering::Release);
}

pub fn set_level(level: LogLevel) {
    CURRENT_LEVEL.store(level as u8, Ordering::Relaxed);
}

pub fn get_level() -> LogLevel {
    match CURRENT_LEVEL.load(Ordering::Relaxed) {
        0 => LogLevel::Error,
        1 => LogLevel::Warn,
        2 => LogLevel::Info,
        3 => LogLevel::Debug,
        _ => LogLevel::Trace,
    }
}

/// Emit a formatted log line at the given level; a no-op if no backend is
/// registered or the level is filtered out.
#[doc(hidden)]
pub fn log_args(level: LogLevel, args: fmt::Arguments<'_>) {
    if !is_enabled(level) {
        return;
    }
    let ptr = BACKEND.load(Ordering::Acquire);
    if ptr.is_null() {
        return;
    }
    // SAFETY: `register_backend` only ever stores a valid `Backend` fn
    // pointer, which is the same size as `*mut ()` on all supported targets.
    let backend: Backend = unsafe { core::mem::transmute(ptr) };
    backend(level, args);
}

#[macro_export]
macro_rules! alloc_log {
    ($level:expr, $($arg:tt)*) => {{
        $crate::log::log_args($level, ::core::format_args!($($arg)*));
    }};
}

#[macro_export]
macro_rules! alloc_error {
    ($($arg:tt)*) => { $crate::alloc_log!($crate::log::LogLevel::Error, $($arg)*) };
}

#[macro_export]
macro_rules! alloc_warn {
    ($($arg:tt)*) => { $crate::alloc_log!($crate::log::LogLevel::Warn, $($arg)*) };
}

#[macro_export]
macro_rules! alloc_debug {
    ($($arg:tt)*) => { $crate::alloc_log!($crate::log::LogLevel::Debug, $($arg)*) };
}

#[macro_export]
macro_rules! alloc_trace {
    ($($arg:tt)*) => { $crate::alloc_log!($crate::log::LogLevel::Trace, $($arg)*) };
}
