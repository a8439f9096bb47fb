use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Error raised when a logical IRI cannot be served from the working
/// directory.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// No file under the working directory maps to the IRI.
    #[error("no file under the working directory maps to <{iri}>")]
    NotFound { iri: String },
    /// The mapped file exists but could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Maps logical IRIs to the files of a working directory.
///
/// The directory is walked once when the locator is built; afterwards every
/// file below it is addressable as `<base><relative-path>`.
pub struct FileLocator {
    entries: HashMap<String, PathBuf>,
}

impl FileLocator {
    /// A locator that resolves nothing.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Walks `directory` and maps every file below it under `base`.
    pub fn walk(base: &str, directory: &Path) -> io::Result<Self> {
        let mut entries = HashMap::new();
        collect(directory, directory, base, &mut entries)?;
        debug!(files = entries.len(), "indexed working directory");
        Ok(Self { entries })
    }

    /// Resolves a logical IRI to the file backing it.
    pub fn resolve(&self, iri: &str) -> Result<&Path, ResourceError> {
        self.entries
            .get(iri)
            .map(PathBuf::as_path)
            .ok_or_else(|| ResourceError::NotFound {
                iri: iri.to_owned(),
            })
    }
}

fn collect(
    root: &Path,
    directory: &Path,
    base: &str,
    entries: &mut HashMap<String, PathBuf>,
) -> io::Result<()> {
    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect(root, &path, base, entries)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            // Relative paths become IRI-style regardless of the platform.
            let relative = relative.to_string_lossy().replace('\\', "/");
            entries.insert(format!("{base}{relative}"), path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    #[test]
    fn maps_nested_files_under_the_base() {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("data").create_dir_all().unwrap();
        dir.child("data/cities.ttl").write_str("# empty").unwrap();
        dir.child("select.rq").write_str("SELECT * {}").unwrap();
        let locator = FileLocator::walk("http://example.org/", dir.path()).unwrap();
        assert!(locator
            .resolve("http://example.org/data/cities.ttl")
            .is_ok());
        assert!(locator.resolve("http://example.org/select.rq").is_ok());
    }

    #[test]
    fn unmapped_iris_are_not_found() {
        let locator = FileLocator::empty();
        assert!(matches!(
            locator.resolve("http://example.org/missing.ttl"),
            Err(ResourceError::NotFound { .. })
        ));
    }
}
