//! Process-local backend.

use configuration_core::{ConfigurationInterface, Error, KeyValueMap, Tree};

use crate::tree_store::TreeStore;

/// A backend that keeps everything in memory for the life of the instance.
///
/// Useful in tests and as a scratch destination for `copy`.
///
/// # Example
///
/// ```rust
/// use configuration_backends::MemoryBackend;
/// use configuration_core::ConfigurationInterface;
///
/// let mut config = MemoryBackend::new();
/// config.put_string("server/host", "localhost").unwrap();
/// assert_eq!(config.get_string("server/host").unwrap().as_deref(), Some("localhost"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    store: TreeStore,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend holding `tree`, whose paths become storage paths.
    pub fn with_tree(tree: Tree) -> Self {
        Self {
            store: TreeStore::with_tree(tree),
        }
    }

    /// Everything stored, ignoring the prefix.
    pub fn tree(&self) -> &Tree {
        &self.store.tree
    }
}

impl ConfigurationInterface for MemoryBackend {
    fn put_string(&mut self, path: &str, value: &str) -> Result<(), Error> {
        self.store.put(path, value)
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

#[cfg(test)]
mod tests {
    use super::*;
    use configuration_core::ConfigurationExt;

    fn map(entries: &[(&str, &str)]) -> KeyValueMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn put_get_round_trip() {
        let mut config = MemoryBackend::new();
        config.put("s", "value".to_string()).unwrap();
        config.put("i", 3_i64).unwrap();
        config.put("f", -0.5_f64).unwrap();

        assert_eq!(config.get::<String>("s").unwrap().as_deref(), Some("value"));
        assert_eq!(config.get::<i64>("i").unwrap(), Some(3));
        assert_eq!(config.get::<f64>("f").unwrap(), Some(-0.5));
    }

    #[test]
    fn absent_is_none() {
        let mut config = MemoryBackend::new();
        assert_eq!(config.get_string("nothing/here").unwrap(), None);
        assert!(!config.exists("nothing/here").unwrap());
    }

    #[test]
    fn get_on_branch_is_none() {
        let mut config = MemoryBackend::new();
        config.put_string("a/b", "1").unwrap();
        assert_eq!(config.get_string("a").unwrap(), None);
    }

    #[test]
    fn recursive_scenario() {
        let mut config = MemoryBackend::new();
        config.put_string("a/b", "1").unwrap();
        config.put_string("a/c", "2").unwrap();
        config.put_string("b/x", "3").unwrap();

        assert_eq!(
            config.get_recursive_map("a").unwrap(),
            map(&[("a/b", "1"), ("a/c", "2")])
        );

        let tree = config.get_recursive("a").unwrap();
        let a = tree.get("a").unwrap();
        assert_eq!(a.child("b").and_then(|n| n.value()), Some("1"));
        assert_eq!(a.child("c").and_then(|n| n.value()), Some("2"));
        assert_eq!(a.children().count(), 2);
    }

    #[test]
    fn recursive_on_missing_path_is_empty() {
        let mut config = MemoryBackend::new();
        config.put_string("a/b", "1").unwrap();
        assert!(config.get_recursive_map("zzz").unwrap().is_empty());
        assert!(config.get_recursive("zzz").unwrap().is_empty());
    }

    #[test]
    fn conflicting_put_fails() {
        let mut config = MemoryBackend::new();
        config.put_string("a/b", "1").unwrap();
        assert!(matches!(
            config.put_string("a/b/c", "2"),
            Err(Error::PathConflict { .. })
        ));
        assert!(matches!(
            config.put_string("a", "2"),
            Err(Error::PathConflict { .. })
        ));
    }

    #[test]
    fn prefix_and_separator() {
        let mut config = MemoryBackend::new();
        config.set_prefix("/apps/web");
        config.set_path_separator('.');
        config.put_string("db.host", "localhost").unwrap();

        assert!(config.tree().get("apps/web/db/host").is_some());
        assert_eq!(
            config.get_recursive_map("db").unwrap(),
            map(&[("db.host", "localhost")])
        );

        // prefix is still '/'-separated and unaffected by the separator change
        config.reset_path_separator();
        assert_eq!(
            config.get_string("db/host").unwrap().as_deref(),
            Some("localhost")
        );
        assert_eq!(config.get_string("db.host").unwrap(), None);
    }

    #[test]
    fn recursive_root_with_prefix_is_relative() {
        let mut config = MemoryBackend::new();
        config.put_string("p/x", "1").unwrap();
        config.put_string("q/y", "2").unwrap();
        config.set_prefix("p");
        assert_eq!(config.get_recursive_map("").unwrap(), map(&[("x", "1")]));
    }
}
