//! The access contract every configuration backend implements.

use crate::{Error, KeyValueMap, Tree};

/// Put and get configuration values by path.
///
/// Backends implement the string operations, the path state setters and the
/// recursive reads. Integer and float access, plus [`exists`], come for free
/// by converting through strings; a backend with a native typed store can
/// override them.
///
/// Paths passed to put/get use the separator set by
/// [`set_path_separator`]. The prefix given to [`set_prefix`] always uses
/// `/`, regardless of the current separator.
///
/// Every call is one direct round-trip to the backend's storage. Instances
/// hold mutable state (separator, prefix, connection or document) and are
/// not meant to be shared between threads without external locking.
///
/// # Object Safety
///
/// This trait is object-safe: the factory hands out
/// `Box<dyn ConfigurationInterface>`.
///
/// [`exists`]: ConfigurationInterface::exists
/// [`set_path_separator`]: ConfigurationInterface::set_path_separator
/// [`set_prefix`]: ConfigurationInterface::set_prefix
pub trait ConfigurationInterface: Send {
    /// Store a string at `path`.
    fn put_string(&mut self, path: &str, value: &str) -> Result<(), Error>;

    /// Read the string at `path`.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - Nothing is stored at the path (not an error condition).
    /// * `Ok(Some(value))` - The stored value.
    /// * `Err(Error)` - The backend failed.
    fn get_string(&mut self, path: &str) -> Result<Option<String>, Error>;

    /// Set a prefix ("directory") prepended to every later path.
    ///
    /// Always `/`-separated. How it is applied is up to the backend.
    fn set_prefix(&mut self, prefix: &str);

    /// Use `separator` for the paths of later put/get calls.
    fn set_path_separator(&mut self, separator: char);

    /// Go back to the default `/` separator.
    fn reset_path_separator(&mut self);

    /// Read everything at and below `path` as a tree.
    ///
    /// The tree is rooted at the prefix, so the node for `path` is found by
    /// navigating `path` inside it. A missing path yields an empty tree.
    fn get_recursive(&mut self, path: &str) -> Result<Tree, Error>;

    /// Read everything at and below `path` as a flat map.
    ///
    /// Keys are full paths relative to the prefix, joined with the current
    /// separator. A missing path yields an empty map.
    fn get_recursive_map(&mut self, path: &str) -> Result<KeyValueMap, Error>;

    fn put_int(&mut self, path: &str, value: i64) -> Result<(), Error> {
        self.put_string(path, &value.to_string())
    }

    fn put_float(&mut self, path: &str, value: f64) -> Result<(), Error> {
        self.put_string(path, &value.to_string())
    }

    /// Read an integer. A stored value that does not parse is an
    /// [`Error::Conversion`], never a silent default.
    fn get_int(&mut self, path: &str) -> Result<Option<i64>, Error> {
        self.get_string(path)?
            .map(|value| parse_value(path, value, "integer"))
            .transpose()
    }

    fn get_float(&mut self, path: &str) -> Result<Option<f64>, Error> {
        self.get_string(path)?
            .map(|value| parse_value(path, value, "float"))
            .transpose()
    }

    /// Check whether a value exists at `path`.
    ///
    /// This can cost as much as a full read, and the answer may be stale by
    /// the time a following get runs. Prefer matching on the `Option`
    /// returned by the getters over an exists-then-get sequence.
    fn exists(&mut self, path: &str) -> Result<bool, Error> {
        Ok(self.get_string(path)?.is_some())
    }
}

fn parse_value<T: std::str::FromStr>(
    path: &str,
    value: String,
    target: &'static str,
) -> Result<T, Error> {
    value.parse().map_err(|_| Error::Conversion {
        path: path.to_owned(),
        value,
        target,
    })
}

// Blanket implementations for references and boxes

impl<T: ConfigurationInterface + ?Sized> ConfigurationInterface for &mut T {
    fn put_string(&mut self, path: &str, value: &str) -> Result<(), Error> {
        (**self).put_string(path, value)
    }

    fn get_string(&mut self, path: &str) -> Result<Option<String>, Error> {
        (**self).get_string(path)
    }

    fn set_prefix(&mut self, prefix: &str) {
        (**self).set_prefix(prefix)
    }

    fn set_path_separator(&mut self, separator: char) {
        (**self).set_path_separator(separator)
    }

    fn reset_path_separator(&mut self) {
        (**self).reset_path_separator()
    }

    fn get_recursive(&mut self, path: &str) -> Result<Tree, Error> {
        (**self).get_recursive(path)
    }

    fn get_recursive_map(&mut self, path: &str) -> Result<KeyValueMap, Error> {
        (**self).get_recursive_map(path)
    }

    fn put_int(&mut self, path: &str, value: i64) -> Result<(), Error> {
        (**self).put_int(path, value)
    }

    fn put_float(&mut self, path: &str, value: f64) -> Result<(), Error> {
        (**self).put_float(path, value)
    }

    fn get_int(&mut self, path: &str) -> Result<Option<i64>, Error> {
        (**self).get_int(path)
    }

    fn get_float(&mut self, path: &str) -> Result<Option<f64>, Error> {
        (**self).get_float(path)
    }

    fn exists(&mut self, path: &str) -> Result<bool, Error> {
        (**self).exists(path)
    }
}

impl<T: ConfigurationInterface + ?Sized> ConfigurationInterface for Box<T> {
    fn put_string(&mut self, path: &str, value: &str) -> Result<(), Error> {
        self.as_mut().put_string(path, value)
    }

    fn get_string(&mut self, path: &str) -> Result<Option<String>, Error> {
        self.as_mut().get_string(path)
    }

    fn set_prefix(&mut self, prefix: &str) {
        self.as_mut().set_prefix(prefix)
    }

    fn set_path_separator(&mut self, separator: char) {
        self.as_mut().set_path_separator(separator)
    }

    fn reset_path_separator(&mut self) {
        self.as_mut().reset_path_separator()
    }

    fn get_recursive(&mut self, path: &str) -> Result<Tree, Error> {
        self.as_mut().get_recursive(path)
    }

    fn get_recursive_map(&mut self, path: &str) -> Result<KeyValueMap, Error> {
        self.as_mut().get_recursive_map(path)
    }

    fn put_int(&mut self, path: &str, value: i64) -> Result<(), Error> {
        self.as_mut().put_int(path, value)
    }

    fn put_float(&mut self, path: &str, value: f64) -> Result<(), Error> {
        self.as_mut().put_float(path, value)
    }

    fn get_int(&mut self, path: &str) -> Result<Option<i64>, Error> {
        self.as_mut().get_int(path)
    }

    fn get_float(&mut self, path: &str) -> Result<Option<f64>, Error> {
        self.as_mut().get_float(path)
    }

    fn exists(&mut self, path: &str) -> Result<bool, Error> {
        self.as_mut().exists(path)
    }
}
