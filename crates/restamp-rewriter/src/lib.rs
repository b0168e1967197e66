//! Placeholder rewriting for content-hashed build output.
//!
//! Templates cannot know the hash a bundler assigns to a file name, so they
//! carry a placeholder such as `{{JS_BUNDLE}}`. After the build, [`Rewriter`]
//! looks up the real asset name by pattern and substitutes it into the target
//! asset's content.
//!
//! # Example
//!
//! ```
//! use regex::Regex;
//! use restamp_assets::{Asset, Compilation};
//! use restamp_rewriter::{Rewriter, Rule, TargetSpec};
//!
//! let rewriter = Rewriter::new(vec![
//!     TargetSpec::exact("index.html")
//!         .rule(Rule::parse(r"main.*\.js", r"\{\{JS\}\}").unwrap()),
//! ]);
//!
//! let mut compilation = Compilation::new();
//! compilation.assets.insert("index.html", Asset::raw("<script src='{{JS}}'>"));
//! compilation.assets.insert("main-e4f1.js", Asset::raw("console.log(1)"));
//!
//! rewriter.process(&mut compilation);
//!
//! let html = compilation.assets.get("index.html").unwrap();
//! assert_eq!(html.source.as_raw(), Some(&b"<script src='main-e4f1.js'>"[..]));
//! ```

mod error;
mod matcher;
mod rewriter;
mod target;

pub use error::RewriteError;
pub use matcher::{NameMatcher, basename};
pub use rewriter::{RewriteReport, Rewriter};
pub use target::{Rule, TargetSpec};
