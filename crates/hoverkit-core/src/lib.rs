#![forbid(unsafe_code)]

//! Core: hover activation arbitration, region trees, and pointer routing.

pub mod arbiter;
pub mod config;
pub mod event;
pub mod geometry;
pub mod hover_router;
pub mod logging;
pub mod region;
pub mod timer;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, warn};
