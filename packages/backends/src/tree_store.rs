//! Shared storage for backends that keep their whole document as a `Tree`.

use configuration_core::{Error, KeyValueMap, Node, PathSettings, Tree};

/// Path state plus a document stored under full (prefixed) paths.
#[derive(Debug, Default)]
pub(crate) struct TreeStore {
    pub(crate) settings: PathSettings,
    pub(crate) tree: Tree,
}

impl TreeStore {
    pub(crate) fn with_tree(tree: Tree) -> Self {
        Self {
            settings: PathSettings::new(),
            tree,
        }
    }

    pub(crate) fn put(&mut self, path: &str, value: &str) -> Result<(), Error> {
        let segments = self.settings.resolve(path);
        tracing::debug!(?segments, "put");
        self.tree.insert_segments(&segments, value)
    }

    /// A copy of the document with `value` set at `path`; the store is untouched.
    pub(crate) fn staged_put(&self, path: &str, value: &str) -> Result<Tree, Error> {
        let segments = self.settings.resolve(path);
        tracing::debug!(?segments, "staged put");
        let mut staged = self.tree.clone();
        staged.insert_segments(&segments, value)?;
        Ok(staged)
    }

    pub(crate) fn get(&self, path: &str) -> Option<String> {
        let segments = self.settings.resolve(path);
        tracing::debug!(?segments, "get");
        self.tree
            .get_segments(&segments)
            .and_then(Node::value)
            .map(str::to_owned)
    }

    pub(crate) fn get_recursive(&self, path: &str) -> Tree {
        let segments = self.settings.resolve(path);
        tracing::debug!(?segments, "get recursive");
        self.tree
            .subtree_segments(&segments)
            .rebase(self.settings.prefix(), self.settings.separator())
    }

    pub(crate) fn get_recursive_map(&self, path: &str) -> KeyValueMap {
        self.get_recursive(path).flatten()
    }
}
