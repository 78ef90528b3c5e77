//! Local file backend.

use std::path::{Path, PathBuf};
use std::{fs, io};

use configuration_core::{ConfigurationInterface, Error, KeyValueMap, Tree};

use crate::ini;
use crate::tree_store::TreeStore;

const INI_SUFFIXES: [&str; 2] = [".ini", ".cfg"];

/// A backend reading and writing a local INI file.
///
/// The file suffix picks the format; `.ini` and `.cfg` are understood as INI.
/// The whole file is parsed when the backend is created and rewritten on
/// every put. A file that does not exist yet reads as empty and is created by
/// the first put.
///
/// The prefix is prepended to the path inside the document.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    store: TreeStore,
}

impl FileBackend {
    /// Open the file at `path`.
    ///
    /// # Errors
    ///
    /// * `UnsupportedFileType` - the suffix is not a known format.
    /// * `Parse` - the file exists but is malformed.
    /// * `Io` - the file exists but could not be read.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let name = path.to_string_lossy();
        if !INI_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            return Err(Error::UnsupportedFileType {
                path: name.into_owned(),
            });
        }

        let tree = match fs::read_to_string(&path) {
            Ok(text) => ini::parse(&text, &name)?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "file does not exist yet, starting empty");
                Tree::new()
            }
            Err(error) => return Err(error.into()),
        };
        tracing::debug!(path = %path.display(), values = tree.len(), "loaded");

        Ok(Self {
            path,
            store: TreeStore::with_tree(tree),
        })
    }

    /// The file this backend is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, tree: &Tree) -> Result<(), Error> {
        tracing::debug!(path = %self.path.display(), "writing");
        fs::write(&self.path, ini::render(tree))?;
        Ok(())
    }
}

impl ConfigurationInterface for FileBackend {
    fn put_string(&mut self, path: &str, value: &str) -> Result<(), Error> {
        for segment in self.store.settings.resolve(path) {
            ini::check_segment(&segment)?;
        }
        ini::check_value(value)?;
        let staged = self.store.staged_put(path, value)?;
        self.save(&staged)?;
        self.store.tree = staged;
        Ok(())
    }

    fn get_string(&mut self, path: &str) -> Result<Option<String>, Error> {
        Ok(self.store.get(path))
    }

    fn set_prefix(&mut self, prefix: &str) {
        self.store.settings.set_prefix(prefix)
    }

    fn set_path_separator(&mut self, separator: char) {
        self.store.settings.set_separator(separator)
    }

    fn reset_path_separator(&mut self) {
        self.store.settings.reset_separator()
    }

    fn get_recursive(&mut self, path: &str) -> Result<Tree, Error> {
        Ok(self.store.get_recursive(path))
    }

    fn get_recursive_map(&mut self, path: &str) -> Result<KeyValueMap, Error> {
        Ok(self.store.get_recursive_map(path))
    }
}
