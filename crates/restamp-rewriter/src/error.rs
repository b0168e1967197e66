//! Rewrite error types.

use restamp_assets::SourceKind;

/// Error recorded while rewriting a target asset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    /// Target asset is not raw text and cannot be rewritten. The asset is skipped.
    #[error("can only modify RawSource assets, but {asset} is a {kind}")]
    UnsupportedSource {
        /// Target asset name.
        asset: String,
        /// Actual source kind.
        kind: SourceKind,
    },

    /// Target asset content is not valid UTF-8. The asset is skipped.
    #[error("{asset} is not valid UTF-8 text")]
    InvalidUtf8 {
        /// Target asset name.
        asset: String,
    },

    /// No asset name matches a rule's source pattern. The whole pass stops.
    #[error("no matching asset for /{pattern}/ while rewriting {asset}")]
    UnresolvedSource {
        /// Target asset being rewritten.
        asset: String,
        /// Source pattern that matched nothing.
        pattern: String,
    },
}

impl RewriteError {
    /// Whether this error stops the remaining rewrite pass.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnresolvedSource { .. })
    }
}
