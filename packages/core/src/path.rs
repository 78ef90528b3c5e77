//! Path splitting and the per-instance separator/prefix state.
//!
//! Operation paths are split with the instance's current separator, while
//! prefixes are always written with [`DEFAULT_SEPARATOR`]. Backends keep a
//! [`PathSettings`] privately and resolve every incoming path through it
//! before touching storage.

/// The canonical path separator. Prefixes always use it.
pub const DEFAULT_SEPARATOR: char = '/';

/// Split `path` on `separator`, dropping empty segments.
///
/// Leading, trailing and repeated separators are therefore ignored:
/// `"/a//b/"` splits to `["a", "b"]`.
pub fn split_path(path: &str, separator: char) -> Vec<String> {
    path.split(separator)
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Join segments with `separator`.
pub fn join_path<S: AsRef<str>>(segments: &[S], separator: char) -> String {
    let mut joined = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            joined.push(separator);
        }
        joined.push_str(segment.as_ref());
    }
    joined
}

/// Mutable path state owned by a single interface instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSettings {
    separator: char,
    prefix: Vec<String>,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            prefix: Vec::new(),
        }
    }
}

impl PathSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// The separator used for operation paths.
    pub fn separator(&self) -> char {
        self.separator
    }

    pub fn set_separator(&mut self, separator: char) {
        self.separator = separator;
    }

    pub fn reset_separator(&mut self) {
        self.separator = DEFAULT_SEPARATOR;
    }

    /// Set the prefix. It is always split on `/`, whatever the current separator.
    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix = split_path(prefix, DEFAULT_SEPARATOR);
    }

    pub fn prefix(&self) -> &[String] {
        &self.prefix
    }

    /// Split an operation path with the current separator. The prefix is not applied.
    pub fn split(&self, path: &str) -> Vec<String> {
        split_path(path, self.separator)
    }

    /// Full storage segments for an operation path: prefix followed by the path.
    pub fn resolve(&self, path: &str) -> Vec<String> {
        let mut segments = self.prefix.clone();
        segments.extend(self.split(path));
        tracing::trace!(path, ?segments, "resolved path");
        segments
    }

    /// Strip the prefix from full storage segments.
    ///
    /// Returns `None` when the segments do not live under the prefix.
    pub fn relative<'a>(&self, segments: &'a [String]) -> Option<&'a [String]> {
        if segments.len() < self.prefix.len() {
            return None;
        }
        let (head, tail) = segments.split_at(self.prefix.len());
        if head == self.prefix.as_slice() {
            Some(tail)
        } else {
            None
        }
    }

    /// Join segments with the current separator.
    pub fn join<S: AsRef<str>>(&self, segments: &[S]) -> String {
        join_path(segments, self.separator)
    }
}
