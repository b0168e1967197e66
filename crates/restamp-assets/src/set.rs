//! Insertion-ordered asset collection.

use indexmap::IndexMap;

use crate::asset::{Asset, AssetSource};

/// Name → [`Asset`] map that remembers insertion order.
///
/// Hooks see names in the order the host inserted them, so any "first match"
/// decision made over [`AssetSet::names`] is deterministic.
///
/// Hooks receive the set by mutable borrow and may swap an asset's source with
/// [`AssetSet::replace_source`]. They cannot add or remove names through that
/// method, and the `emitted` flag is left alone.
#[derive(Debug, Default, Clone)]
pub struct AssetSet {
    entries: IndexMap<String, Asset>,
}

impl AssetSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an asset, keeping its original position if the name already exists.
    ///
    /// Returns the previous asset stored under `name`, if any.
    pub fn insert(&mut self, name: impl Into<String>, asset: Asset) -> Option<Asset> {
        self.entries.insert(name.into(), asset)
    }

    /// Look up an asset by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Asset> {
        self.entries.get(name)
    }

    /// Look up an asset by name for mutation.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Asset> {
        self.entries.get_mut(name)
    }

    /// Replace the source of an existing asset.
    ///
    /// Returns the previous source, or `None` (leaving the set unchanged) if
    /// `name` is not present.
    pub fn replace_source(&mut self, name: &str, source: AssetSource) -> Option<AssetSource> {
        let asset = self.get_mut(name)?;
        Some(std::mem::replace(&mut asset.source, source))
    }

    /// Check whether an asset with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Asset names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Name/asset pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Asset)> {
        self.entries.iter().map(|(name, asset)| (name.as_str(), asset))
    }

    /// Number of assets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the set has no assets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Asset)> for AssetSet {
    fn from_iter<I: IntoIterator<Item = (N, Asset)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, asset)| (name.into(), asset))
                .collect(),
        }
    }
}
