#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! With the `tracing` feature the usual `tracing` macros are re-exported so
//! arbiter transitions can be observed. Without it, no-op macros with the
//! same names keep call sites compiling at zero cost.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, trace, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op debug_span macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }

    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op warn macro when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }
}

/// A no-op span for when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Enter the no-op span (does nothing).
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

/// A no-op span guard.
#[cfg(not(feature = "tracing"))]
pub struct NoopGuard;

/// Install a JSON formatted global subscriber filtered by `RUST_LOG`.
///
/// Falls back to `info` when `RUST_LOG` is unset or invalid. Returns `false`
/// if a global subscriber was already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_subscriber() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
