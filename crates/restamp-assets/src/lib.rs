//! Build output model for restamp.
//!
//! This crate describes what a host build pipeline hands to its post-processing
//! hooks once every output asset has been produced:
//!
//! - [`Asset`]: a named unit of output with an [`AssetSource`] and an `emitted` flag
//! - [`AssetSet`]: insertion-ordered name → asset map owned by the host
//! - [`Compilation`]: the asset set plus the build-wide error log
//! - [`AfterCompile`]: the single "assets finalized" hook
//!
//! # Example
//!
//! ```
//! use restamp_assets::{AfterCompile, Asset, Compilation};
//!
//! struct Shout;
//!
//! impl AfterCompile for Shout {
//!     fn name(&self) -> &str {
//!         "shout"
//!     }
//!
//!     fn after_compile(&self, compilation: &mut Compilation) {
//!         compilation.push_error(self.name(), "nothing to do");
//!     }
//! }
//!
//! let mut compilation = Compilation::new();
//! compilation.assets.insert("index.html", Asset::raw("<html></html>"));
//! Shout.after_compile(&mut compilation);
//! assert!(compilation.has_errors());
//! ```

mod asset;
mod compilation;
mod set;

pub use asset::{Asset, AssetSource, SourceKind};
pub use compilation::{AfterCompile, Compilation, CompilationError};
pub use set::AssetSet;
