//! Filesystem host for after-compile hooks.
//!
//! Loads a finished build output directory into an [`AssetSet`], runs hooks
//! over it, and writes changed assets back. Asset names are `/`-separated
//! paths relative to the output directory, inserted in sorted order.
//!
//! Names recorded in the manifest by the previous run are loaded as
//! `emitted`, so assets a rebuild produced under new names take precedence
//! over stale ones still lying around in the directory.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use restamp_assets::{AfterCompile, Asset, AssetSet, Compilation};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

/// Manifest filename, stored at the root of the output directory.
pub(crate) const MANIFEST_FILENAME: &str = ".restamp-manifest.json";

/// Asset names seen by the previous run.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    assets: Vec<String>,
}

/// A build output directory.
pub(crate) struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Load every file as a raw asset.
    ///
    /// Names listed in the manifest are marked as emitted.
    pub(crate) fn load(&self) -> Result<AssetSet, CliError> {
        let previous: HashSet<String> = self.read_manifest()?.assets.into_iter().collect();

        let mut names = Vec::new();
        walk_dir(&self.root, &self.root, &mut names)?;
        names.sort();

        let mut assets = AssetSet::new();
        for name in names {
            if name == MANIFEST_FILENAME {
                continue;
            }
            let mut asset = Asset::raw(std::fs::read(self.root.join(&name))?);
            if previous.contains(&name) {
                asset = asset.emitted();
            }
            assets.insert(name, asset);
        }
        tracing::debug!(
            dir = %self.root.display(),
            assets = assets.len(),
            emitted = previous.len(),
            "Loaded build output"
        );
        Ok(assets)
    }

    /// Write the given assets' content to disk.
    pub(crate) fn write(&self, assets: &AssetSet, names: &[String]) -> Result<(), CliError> {
        for name in names {
            let Some(asset) = assets.get(name) else {
                continue;
            };
            let path = self.root.join(name);
            std::fs::write(&path, asset.source.bytes())?;
            tracing::debug!(path = %path.display(), "Wrote asset");
        }
        Ok(())
    }

    /// Record the current asset names for the next run.
    pub(crate) fn save_manifest(&self, assets: &AssetSet) -> Result<(), CliError> {
        let manifest = Manifest {
            assets: assets.names().map(str::to_owned).collect(),
        };
        let json = serde_json::to_string_pretty(&manifest)?;
        std::fs::write(self.root.join(MANIFEST_FILENAME), json)?;
        Ok(())
    }

    fn read_manifest(&self) -> Result<Manifest, CliError> {
        let path = self.root.join(MANIFEST_FILENAME);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Manifest::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Run hooks in order over a compilation.
pub(crate) fn run_hooks(hooks: &[&dyn AfterCompile], compilation: &mut Compilation) {
    for hook in hooks {
        tracing::debug!(hook = hook.name(), "Running after-compile hook");
        hook.after_compile(compilation);
    }
}

/// Names whose content differs between `before` and `after`, in `after` order.
pub(crate) fn changed_assets(before: &AssetSet, after: &AssetSet) -> Vec<String> {
    after
        .iter()
        .filter(|(name, asset)| before.get(name).is_none_or(|old| old.source != asset.source))
        .map(|(name, _)| name.to_owned())
        .collect()
}

/// Recursively collect file paths relative to `base`.
///
/// Symlinks are not followed, and names that are not valid UTF-8 are skipped.
fn walk_dir(base: &Path, dir: &Path, result: &mut Vec<String>) -> Result<(), CliError> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let path = entry.path();
        if file_type.is_symlink() {
            tracing::debug!(path = %path.display(), "Skipping symlink");
        } else if file_type.is_dir() {
            walk_dir(base, &path, result)?;
        } else if let Ok(rel) = path.strip_prefix(base) {
            let Some(name) = rel.to_str() else {
                tracing::warn!(path = %path.display(), "Skipping file with non-UTF-8 name");
                continue;
            };
            // Normalize to forward slashes
            result.push(name.replace('\\', "/"));
        }
    }
    Ok(())
}
