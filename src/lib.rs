//! pickfun - checkpoint results of pure functions per call site
//!
//! Wrap a function with [`checkpoint`] and call it through
//! [`Checkpointed::call`]. The first run computes the value and writes it to
//! a `.ckpnt` file named after the calling file, line and function; later
//! runs reaching the same line load the file instead of calling the function.
//!
//! The call site is captured at compile time with `#[track_caller]`, so it is
//! the line of the `call`, not the line where the wrapper was created.

pub mod cache;
pub mod checkpoint;
pub mod clock;
pub mod config;
pub mod error;
pub mod site;

pub use checkpoint::{checkpoint, log_level, set_log_level, Checkpoint, Checkpointed};
pub use error::{CheckpointError, Result};
pub use site::CallSite;

/// Checkpoint a single call, keyed by this line and the function's name
///
/// ```no_run
/// fn slow_square(i: i64) -> i64 {
///     i * i
/// }
///
/// let value: i64 = pickfun::checkpoint!(slow_square(10));
/// let in_dir: i64 = pickfun::checkpoint!(dir = "/tmp", slow_square(10));
/// ```
#[macro_export]
macro_rules! checkpoint {
    (dir = $dir:expr, $func:ident ( $($arg:expr),* $(,)? )) => {
        $crate::Checkpoint::new($crate::CallSite::new(file!(), line!(), stringify!($func)))
            .in_dir($dir)
            .run(|| $func($($arg),*))
    };
    ($func:ident ( $($arg:expr),* $(,)? )) => {
        $crate::Checkpoint::new($crate::CallSite::new(file!(), line!(), stringify!($func)))
            .run(|| $func($($arg),*))
    };
}
