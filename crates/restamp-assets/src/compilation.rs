//! Compilation context and the after-compile hook.

use std::fmt;

use crate::set::AssetSet;

/// Error recorded by a hook into the build-wide error log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationError {
    /// Name of the hook that reported the error.
    pub hook: String,
    /// Human-readable message.
    pub message: String,
}

impl fmt::Display for CompilationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.hook, self.message)
    }
}

impl std::error::Error for CompilationError {}

/// State handed to hooks once all assets of a build pass are finalized.
///
/// The host owns the compilation. Hooks get exclusive access for the duration
/// of a single [`AfterCompile::after_compile`] call.
#[derive(Debug, Default)]
pub struct Compilation {
    /// Every asset produced by this pass and carried over from earlier passes.
    pub assets: AssetSet,
    /// Errors accumulated by hooks. The host decides whether they fail the build.
    pub errors: Vec<CompilationError>,
}

impl Compilation {
    /// Create an empty compilation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a compilation over an existing asset set.
    #[must_use]
    pub fn with_assets(assets: AssetSet) -> Self {
        Self {
            assets,
            errors: Vec::new(),
        }
    }

    /// Append an error on behalf of `hook`.
    pub fn push_error(&mut self, hook: &str, error: impl fmt::Display) {
        let message = error.to_string();
        tracing::debug!(hook, error = %message, "Compilation error recorded");
        self.errors.push(CompilationError {
            hook: hook.to_owned(),
            message,
        });
    }

    /// Check whether any hook reported an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Hook invoked once per build pass after all assets are finalized.
///
/// The host calls hooks one at a time and waits for each call to return
/// before writing assets out. Failures are reported through
/// [`Compilation::push_error`], never by panicking.
pub trait AfterCompile: Send + Sync {
    /// Hook name used to attribute errors.
    fn name(&self) -> &str;

    /// Inspect and rewrite the compilation's assets.
    fn after_compile(&self, compilation: &mut Compilation);
}
