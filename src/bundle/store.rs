//! Content-addressed storage for bundle files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::BundleError;

/// Byte store keyed by bundle file name (`<digest>.css` / `<digest>.js`).
pub trait CacheStore: Send + Sync {
  /// Whether an entry named `name` is present. Existence is the only cache-hit signal.
  fn exists(&self, name: &str) -> bool;
  /// Read a stored entry.
  fn read(&self, name: &str) -> Result<Vec<u8>, BundleError>;
  /// Store `bytes` so that readers observe either no entry or the complete entry.
  fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<(), BundleError>;
}

/// Cache directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsCacheStore {
  root: PathBuf,
}

impl FsCacheStore {
  /// Store rooted at `root`. The directory is created on first write.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// Cache root directory.
  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Path of the entry named `name`.
  pub fn path_for(&self, name: &str) -> PathBuf {
    self.root.join(name)
  }
}

impl CacheStore for FsCacheStore {
  fn exists(&self, name: &str) -> bool {
    self.path_for(name).is_file()
  }

  fn read(&self, name: &str) -> Result<Vec<u8>, BundleError> {
    let path = self.path_for(name);
    fs::read(&path).map_err(|source| BundleError::CacheRead { path, source })
  }

  fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<(), BundleError> {
    let path = self.path_for(name);
    let write_error = |source: std::io::Error| BundleError::CacheWrite {
      path: path.clone(),
      source,
    };

    fs::create_dir_all(&self.root).map_err(write_error)?;

    // The temporary file lives next to the target so the rename stays on one filesystem.
    let mut staged = NamedTempFile::new_in(&self.root).map_err(write_error)?;
    staged.write_all(bytes).map_err(write_error)?;
    staged.as_file().sync_all().map_err(write_error)?;
    staged
      .persist(&path)
      .map_err(|err| write_error(err.error))?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn writes_and_reads_entries() -> Result<(), BundleError> {
    let dir = tempdir().expect("failed to create temp dir");
    let store = FsCacheStore::new(dir.path().join("cache"));

    assert!(!store.exists("abc.css"));
    store.write_atomic("abc.css", b"a{}")?;
    assert!(store.exists("abc.css"));
    assert_eq!(store.read("abc.css")?, b"a{}");
    Ok(())
  }

  #[test]
  fn leaves_no_temporary_files_behind() -> Result<(), BundleError> {
    let dir = tempdir().expect("failed to create temp dir");
    let store = FsCacheStore::new(dir.path());

    store.write_atomic("abc.js", b"one")?;
    store.write_atomic("abc.js", b"one")?;

    let names: Vec<String> = fs::read_dir(dir.path())
      .expect("cache dir should be readable")
      .flatten()
      .map(|entry| entry.file_name().to_string_lossy().into_owned())
      .collect();
    assert_eq!(names, vec!["abc.js".to_string()]);
    Ok(())
  }

  #[test]
  fn concurrent_writers_produce_a_complete_file() {
    let dir = tempdir().expect("failed to create temp dir");
    let store = FsCacheStore::new(dir.path());
    let payload = vec![b'x'; 256 * 1024];

    std::thread::scope(|scope| {
      for _ in 0..4 {
        scope.spawn(|| store.write_atomic("same.css", &payload).expect("write should succeed"));
      }
    });

    assert_eq!(store.read("same.css").expect("entry should exist"), payload);
  }

  #[test]
  fn reports_write_failures() {
    let dir = tempdir().expect("failed to create temp dir");
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, b"file").expect("failed to write blocker");

    let store = FsCacheStore::new(&blocker);
    let err = store.write_atomic("abc.css", b"a{}").unwrap_err();
    assert!(matches!(err, BundleError::CacheWrite { .. }));
    assert!(err.is_fatal());
  }

  #[test]
  fn reports_missing_entries() {
    let dir = tempdir().expect("failed to create temp dir");
    let store = FsCacheStore::new(dir.path());
    assert!(matches!(
      store.read("missing.js"),
      Err(BundleError::CacheRead { .. })
    ));
  }
}
