//! The checkpoint wrapper
//!
//! A checkpointed function runs once per call site. Its return value is
//! written to `.{file}:{line}:{function}.ckpnt` in the working directory and
//! every later call from the same line, in this or any later run, returns the
//! stored value without executing the function. The arguments are not part
//! of the key.
//!
//! Failures to read or write the checkpoint file never reach the caller. They
//! are logged as warnings and the call behaves as if caching were disabled.

use crate::cache;
use crate::clock;
use crate::config;
use crate::site::{self, CallSite};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn, Level};

/// Warning logged when an existing checkpoint cannot be used
pub const LOAD_FAILURE_MESSAGE: &str = "There was a problem while loading checkpoint data from file. \
     Reverting to executing the function.";

/// Warning logged when a computed value cannot be persisted
pub const STORE_FAILURE_MESSAGE: &str =
    "There was a problem while creating checkpoint file but function completed successfully. \
     Returning value without writing checkpoint file.";

static THRESHOLD: RwLock<LevelFilter> = RwLock::new(LevelFilter::TRACE);

/// Set the minimum severity of messages emitted by checkpointed calls
///
/// This applies on top of whatever the installed subscriber allows.
pub fn set_log_level(level: LevelFilter) {
    let mut threshold = THRESHOLD.write().unwrap_or_else(|e| e.into_inner());
    *threshold = level;
}

/// The current threshold set by [`set_log_level`]
pub fn log_level() -> LevelFilter {
    *THRESHOLD.read().unwrap_or_else(|e| e.into_inner())
}

fn enabled(level: Level) -> bool {
    level <= log_level()
}

enum Lookup<T> {
    /// A readable checkpoint was found
    Hit(T),
    /// No usable checkpoint; holds where to write one, if that is known
    Miss(Option<PathBuf>),
}

/// A resolved call site plus the directory its checkpoint lives in
#[derive(Debug, Clone)]
pub struct Checkpoint {
    site: CallSite,
    dir: Option<PathBuf>,
}

impl Checkpoint {
    /// Checkpoint for `site` in the current working directory
    pub fn new(site: CallSite) -> Self {
        Self { site, dir: None }
    }

    /// Store the checkpoint in `dir` instead of the working directory
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn site(&self) -> &CallSite {
        &self.site
    }

    /// Full path of the checkpoint file
    pub fn path(&self) -> crate::Result<PathBuf> {
        let dir = config::resolve_dir(self.dir.as_deref())?;
        Ok(cache::checkpoint_path(&dir, &self.site))
    }

    /// Return the stored value, or run `func` and store what it returns
    ///
    /// A panic inside `func` propagates unchanged and nothing is written.
    pub fn run<R, F>(&self, func: F) -> R
    where
        F: FnOnce() -> R,
        R: Serialize + DeserializeOwned,
    {
        match self.lookup() {
            Lookup::Hit(value) => value,
            Lookup::Miss(path) => {
                let value = func();
                self.persist(path.as_deref(), &value);
                value
            }
        }
    }

    /// Like [`Checkpoint::run`], for functions that can fail
    ///
    /// Only `Ok` values are stored. An `Err` is returned unchanged and leaves
    /// the checkpoint file as it was.
    pub fn try_run<T, E, F>(&self, func: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        T: Serialize + DeserializeOwned,
    {
        match self.lookup() {
            Lookup::Hit(value) => Ok(value),
            Lookup::Miss(path) => {
                let value = func()?;
                self.persist(path.as_deref(), &value);
                Ok(value)
            }
        }
    }

    fn lookup<T: DeserializeOwned>(&self) -> Lookup<T> {
        let path = match self.path() {
            Ok(path) => path,
            Err(e) => {
                if enabled(Level::WARN) {
                    warn!(site = %self.site, error = %e, "{}", LOAD_FAILURE_MESSAGE);
                }
                return Lookup::Miss(None);
            }
        };

        if !path.is_file() {
            return Lookup::Miss(Some(path));
        }

        match cache::load(&path) {
            Ok(value) => {
                if enabled(Level::INFO) {
                    if let Ok(modified) = clock::modified_in_local_tz(&path) {
                        info!(
                            "Checkpoint from {} found ({}). \
                             Skipping function execution and loading result from file.",
                            clock::time_ago(modified, clock::now()),
                            modified
                        );
                    }
                }
                Lookup::Hit(value)
            }
            Err(e) => {
                if enabled(Level::WARN) {
                    warn!(path = %path.display(), error = %e, "{}", LOAD_FAILURE_MESSAGE);
                }
                Lookup::Miss(Some(path))
            }
        }
    }

    fn persist<T: Serialize>(&self, path: Option<&Path>, value: &T) {
        let path = match path {
            Some(path) => path,
            None => {
                if enabled(Level::WARN) {
                    warn!(site = %self.site, "{}", STORE_FAILURE_MESSAGE);
                }
                return;
            }
        };

        match cache::store(path, value) {
            Ok(()) => {
                if enabled(Level::INFO) {
                    if let Ok(modified) = clock::modified_in_local_tz(path) {
                        info!(
                            "Checkpoint created at: {} with filename {}.",
                            modified,
                            self.site.file_name()
                        );
                    }
                }
            }
            Err(e) => {
                if enabled(Level::WARN) {
                    warn!(path = %path.display(), error = %e, "{}", STORE_FAILURE_MESSAGE);
                }
            }
        }
    }
}

/// A function wrapped by [`checkpoint`]
#[derive(Debug, Clone)]
pub struct Checkpointed<F> {
    func: F,
    name: String,
    dir: Option<PathBuf>,
}

/// Wrap `func` so its result is persisted per call site
///
/// The function takes a single argument; pass a tuple for several and `()`
/// for none. The name used in the key is the function's declared name, or
/// `{{closure}}` for closures; use [`Checkpointed::named`] to pick another.
/// Function pointers and boxed closures have no declared name and are keyed
/// as `fn` unless named explicitly.
///
/// ```no_run
/// use pickfun::checkpoint;
///
/// fn square(i: i64) -> i64 {
///     i * i
/// }
///
/// let square = checkpoint(square);
/// assert_eq!(square.call(10), 100);
/// ```
pub fn checkpoint<F>(func: F) -> Checkpointed<F> {
    Checkpointed {
        name: site::function_name::<F>(),
        func,
        dir: None,
    }
}

impl<F> Checkpointed<F> {
    /// Use `name` as the function name in the checkpoint key
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Store checkpoints in `dir` instead of the working directory
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The checkpoint for the location this is called from
    #[track_caller]
    pub fn at_caller(&self) -> Checkpoint {
        let checkpoint = Checkpoint::new(CallSite::caller(self.name.clone()));
        match &self.dir {
            Some(dir) => checkpoint.in_dir(dir.clone()),
            None => checkpoint,
        }
    }

    /// Call the wrapped function, or load its result for this call site
    #[track_caller]
    pub fn call<A, R>(&self, args: A) -> R
    where
        F: Fn(A) -> R,
        R: Serialize + DeserializeOwned,
    {
        let func = &self.func;
        self.at_caller().run(move || func(args))
    }

    /// Call a fallible wrapped function; only `Ok` results are persisted
    #[track_caller]
    pub fn try_call<A, T, E>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Result<T, E>,
        T: Serialize + DeserializeOwned,
    {
        let func = &self.func;
        self.at_caller().try_run(move || func(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn square(i: i64) -> i64 {
        i * i
    }

    #[test]
    fn test_checkpoint_name_from_fn_item() {
        assert_eq!(checkpoint(square).name(), "square");
        assert_eq!(checkpoint(square).named("sq").name(), "sq");
    }

    #[test]
    fn test_call_writes_file_for_this_line() {
        let temp = TempDir::new().unwrap();
        let wrapped = checkpoint(square).in_dir(temp.path());

        let line = line!() + 1;
        assert_eq!(wrapped.call(10), 100);

        let expected = temp
            .path()
            .join(format!(".checkpoint.rs:{}:square.ckpnt", line));
        assert!(expected.is_file());
        let stored: i64 = cache::load(&expected).unwrap();
        assert_eq!(stored, 100);
    }

    #[test]
    fn test_run_executes_once_per_site() {
        let temp = TempDir::new().unwrap();
        let checkpoint = Checkpoint::new(CallSite::new("main.rs", 1, "count")).in_dir(temp.path());
        let calls = Cell::new(0);

        for _ in 0..3 {
            let value: u32 = checkpoint.run(|| {
                calls.set(calls.get() + 1);
                42
            });
            assert_eq!(value, 42);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_try_run_does_not_store_errors() {
        let temp = TempDir::new().unwrap();
        let checkpoint = Checkpoint::new(CallSite::new("main.rs", 2, "parse")).in_dir(temp.path());

        let failed: Result<u8, String> = checkpoint.try_run(|| Err("bad input".to_string()));
        assert_eq!(failed, Err("bad input".to_string()));
        assert!(!checkpoint.path().unwrap().exists());

        let ok: Result<u8, String> = checkpoint.try_run(|| Ok(3));
        assert_eq!(ok, Ok(3));

        let cached: Result<u8, String> = checkpoint.try_run(|| Err("not called".to_string()));
        assert_eq!(cached, Ok(3));
    }

    #[test]
    fn test_enabled_follows_default_threshold() {
        // Default threshold lets every level through to the subscriber
        assert!(enabled(Level::WARN));
    }
}
