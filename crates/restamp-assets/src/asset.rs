//! Asset records and their source representations.

use std::fmt;

/// Representation of an asset's content.
///
/// Only [`AssetSource::Raw`] holds plain bytes that may be rewritten in place.
/// The other variants are produced by later pipeline stages and carry structure
/// (child sources, source maps) that a textual rewrite would invalidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    /// Raw, uncompiled bytes.
    Raw(Vec<u8>),
    /// Concatenation of several sources.
    Concat(Vec<AssetSource>),
    /// Generated code paired with its source map.
    Mapped {
        /// Generated code.
        code: Vec<u8>,
        /// Serialized source map.
        map: Vec<u8>,
    },
}

/// Discriminant of an [`AssetSource`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Raw,
    Concat,
    Mapped,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Raw => "RawSource",
            Self::Concat => "ConcatSource",
            Self::Mapped => "SourceMapSource",
        };
        f.write_str(name)
    }
}

impl AssetSource {
    /// Kind of this source.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Raw(_) => SourceKind::Raw,
            Self::Concat(_) => SourceKind::Concat,
            Self::Mapped { .. } => SourceKind::Mapped,
        }
    }

    /// Borrow the bytes of a raw source.
    ///
    /// Returns `None` for every other kind.
    #[must_use]
    pub fn as_raw(&self) -> Option<&[u8]> {
        match self {
            Self::Raw(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Flattened content of the source.
    ///
    /// Concatenated sources are joined in order; mapped sources yield their code.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            Self::Raw(bytes) | Self::Mapped { code: bytes, .. } => bytes.clone(),
            Self::Concat(children) => children.iter().flat_map(Self::bytes).collect(),
        }
    }
}

/// A named unit of build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    /// Content representation.
    pub source: AssetSource,
    /// True if this asset was already emitted by a previous build pass.
    pub emitted: bool,
}

impl Asset {
    /// Create a freshly produced asset with raw content.
    #[must_use]
    pub fn raw(content: impl Into<Vec<u8>>) -> Self {
        Self::new(AssetSource::Raw(content.into()))
    }

    /// Create a freshly produced asset with the given source.
    #[must_use]
    pub fn new(source: AssetSource) -> Self {
        Self {
            source,
            emitted: false,
        }
    }

    /// Mark the asset as carried over from a previous pass.
    #[must_use]
    pub fn emitted(mut self) -> Self {
        self.emitted = true;
        self
    }
}
