//! Logging for the flattener.
//!
//! With the `tracing` feature these are `tracing`'s macros; without it they
//! expand to nothing and their arguments are never evaluated.
//!
//! Levels: `warn` for anything left un-flattened (unsupported elements,
//! residual transforms, dangling links), `info` for the run summary, `debug`
//! for per-element matrices and skipped or deferred subtrees.

#[cfg(feature = "tracing")]
pub use tracing::{debug, info, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, info, warn};
