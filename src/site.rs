//! Call-site identity and checkpoint file naming

use serde::Serialize;
use std::fmt;
use std::panic::Location;
use std::path::Path;

/// File name suffix shared by every checkpoint file
pub const CHECKPOINT_SUFFIX: &str = ".ckpnt";

/// A source location plus the name of the function invoked there
///
/// One checkpoint file exists per distinct call site. The arguments passed
/// to the function play no part in the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CallSite {
    /// Base name of the calling source file
    pub file: String,
    /// Line of the call in that file
    pub line: u32,
    /// Declared name of the wrapped function
    pub function: String,
}

impl CallSite {
    /// Create a call site from an explicit location
    ///
    /// Directories are stripped from `file`.
    pub fn new(file: &str, line: u32, function: impl Into<String>) -> Self {
        Self {
            file: basename(file),
            line,
            function: function.into(),
        }
    }

    /// Capture the location of whoever called this function
    ///
    /// Every function between the user's call and this one must also be
    /// `#[track_caller]`, otherwise the location of the innermost untracked
    /// frame is recorded instead.
    #[track_caller]
    pub fn caller(function: impl Into<String>) -> Self {
        Self::from_location(Location::caller(), function)
    }

    /// Create a call site from a captured location
    pub fn from_location(location: &Location<'_>, function: impl Into<String>) -> Self {
        Self::new(location.file(), location.line(), function)
    }

    /// The cache key: `{basename}:{line}:{function}`
    pub fn key(&self) -> String {
        format!("{}:{}:{}", self.file, self.line, self.function)
    }

    /// The checkpoint file name: `.{key}.ckpnt`
    pub fn file_name(&self) -> String {
        format!(".{}{}", self.key(), CHECKPOINT_SUFFIX)
    }

    /// Parse a checkpoint file name back into its call site
    ///
    /// Returns None for anything that is not a checkpoint file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let key = name.strip_prefix('.')?.strip_suffix(CHECKPOINT_SUFFIX)?;

        // The file name may itself contain ':', so split from the right
        let mut parts = key.rsplitn(3, ':');
        let function = parts.next()?;
        let line = parts.next()?.parse().ok()?;
        let file = parts.next()?;

        if file.is_empty() || function.is_empty() {
            return None;
        }

        Some(Self {
            file: file.to_string(),
            line,
            function: function.to_string(),
        })
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Declared name of a function value, from its type
///
/// `fn` items and methods yield their own name, closures yield `{{closure}}`.
/// Function pointers and trait objects carry no name and yield `fn`; give
/// those an explicit one with [`crate::Checkpointed::named`].
pub fn function_name<F>() -> String {
    name_from_type(std::any::type_name::<F>())
}

fn name_from_type(full: &str) -> String {
    // Trait objects name their trait, not the function behind them
    if full.contains("dyn ") {
        return "fn".to_string();
    }

    // Drop every `<...>` group: generic arguments, `<impl T>`, `<X as Trait>`
    let mut path = String::with_capacity(full.len());
    let mut depth = 0usize;
    let mut prev = '\0';
    for c in full.chars() {
        match c {
            '<' => depth += 1,
            // `->` in a signature is not a closing bracket
            '>' if prev != '-' && depth > 0 => depth -= 1,
            _ if depth == 0 => path.push(c),
            _ => {}
        }
        prev = c;
    }

    match path.rsplit("::").find(|segment| !segment.is_empty()) {
        Some(segment) if is_name_segment(segment) => segment.to_string(),
        _ => "fn".to_string(),
    }
}

fn is_name_segment(segment: &str) -> bool {
    if segment.starts_with("{{") && segment.ends_with("}}") {
        return true;
    }
    segment.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
