use std::path::{Component, Path, PathBuf};

use crate::error::{VietQrError, VietQrResult};

/// Looks up template and logo files inside a single read-only directory.
#[derive(Debug, Clone)]
pub struct AssetStore {
    root: PathBuf,
}

impl AssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a bare file name against the asset root.
    ///
    /// Names containing separators, `..` or an absolute prefix are rejected.
    /// A valid name that does not exist resolves to `Ok(None)`.
    pub fn resolve(&self, name: &str) -> VietQrResult<Option<PathBuf>> {
        validate_name(name)?;

        let path = self.root.join(name);
        if path.is_file() {
            Ok(Some(path))
        } else {
            log::warn!("Asset {} not found under {}", name, self.root.display());
            Ok(None)
        }
    }
}

fn validate_name(name: &str) -> VietQrResult<()> {
    let invalid = || VietQrError::InvalidAssetName(name.to_string());

    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(invalid());
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("logo.png"), b"x").unwrap();

        let store = AssetStore::new(dir.path());
        let path = store.resolve("logo.png").unwrap();
        assert_eq!(path, Some(dir.path().join("logo.png")));
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = AssetStore::new(dir.path());
        assert_eq!(store.resolve("nope.png").unwrap(), None);
    }

    #[test]
    fn directories_are_not_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let store = AssetStore::new(dir.path());
        assert_eq!(store.resolve("sub").unwrap(), None);
    }

    #[test]
    fn traversal_is_rejected() {
        let store = AssetStore::new("assets");
        for name in ["../secret.png", "..", ".", "a/b.png", "a\\b.png", "/etc/passwd", ""] {
            let err = store.resolve(name).unwrap_err();
            assert!(
                matches!(err, VietQrError::InvalidAssetName(_)),
                "{:?} should be rejected",
                name
            );
        }
    }
}
