//! JSON document backend.

use std::path::{Path, PathBuf};
use std::{fs, io};

use serde_json::{Map, Value as JsonValue};

use configuration_core::{ConfigurationInterface, Error, KeyValueMap, PathSettings, Tree};

/// A backend over a JSON document on disk.
///
/// Strings are returned verbatim; numbers and booleans as their JSON text.
/// `null`, objects and arrays are not scalars and read as absent. Array
/// elements are addressed by decimal index. Puts store JSON strings and
/// rewrite the document.
#[derive(Debug)]
pub struct JsonBackend {
    path: PathBuf,
    settings: PathSettings,
    document: JsonValue,
}

impl JsonBackend {
    /// Load the document at `path`. A missing file starts as `{}`.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        let document = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| Error::Parse {
                source_name: path.display().to_string(),
                line: Some(e.line()),
                message: e.to_string(),
            })?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "document does not exist yet, starting empty");
                JsonValue::Object(Map::new())
            }
            Err(error) => return Err(error.into()),
        };

        Ok(Self {
            path,
            settings: PathSettings::new(),
            document,
        })
    }

    /// The document this backend is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The parsed document.
    pub fn document(&self) -> &JsonValue {
        &self.document
    }

    fn save(&self, document: &JsonValue) -> Result<(), Error> {
        tracing::debug!(path = %self.path.display(), "writing");
        let text = serde_json::to_string_pretty(document)
            .map_err(|e| Error::backend(format!("failed to serialize document: {}", e)))?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

fn get_sub_tree<'doc>(document: &'doc JsonValue, segments: &[String]) -> Option<&'doc JsonValue> {
    let mut cursor = document;
    for segment in segments {
        cursor = match cursor {
            JsonValue::Object(map) => map.get(segment)?,
            JsonValue::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(cursor)
}

fn scalar_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

fn array_index(arr: &[JsonValue], segment: &str, segments: &[String]) -> Result<usize, Error> {
    match segment.parse::<usize>() {
        Ok(index) if index <= arr.len() => Ok(index),
        _ => Err(Error::InvalidPath {
            message: format!(
                "'{}' is not a valid index for an array of length {} in '{}'",
                segment,
                arr.len(),
                segments.join("/")
            ),
        }),
    }
}

fn conflict(segments: &[String], depth: usize) -> Error {
    Error::PathConflict {
        path: segments[..depth].join("/"),
        message: "a value exists where a branch is needed".to_string(),
    }
}

/// Set `value` at `segments`, creating objects on the way.
fn set_string(document: &mut JsonValue, segments: &[String], value: &str) -> Result<(), Error> {
    let Some((last, parents)) = segments.split_last() else {
        return Err(Error::InvalidPath {
            message: "cannot put a value at an empty path".to_string(),
        });
    };

    let mut cursor = document;
    for (depth, segment) in parents.iter().enumerate() {
        if cursor.is_null() {
            *cursor = JsonValue::Object(Map::new());
        }
        cursor = match cursor {
            JsonValue::Object(map) => map
                .entry(segment.clone())
                .or_insert_with(|| JsonValue::Object(Map::new())),
            JsonValue::Array(arr) => {
                let index = array_index(arr, segment, segments)?;
                if index == arr.len() {
                    arr.push(JsonValue::Object(Map::new()));
                }
                &mut arr[index]
            }
            _ => return Err(conflict(segments, depth)),
        };
    }

    if cursor.is_null() {
        *cursor = JsonValue::Object(Map::new());
    }
    let slot = match cursor {
        JsonValue::Object(map) => map.entry(last.clone()).or_insert(JsonValue::Null),
        JsonValue::Array(arr) => {
            let index = array_index(arr, last, segments)?;
            if index == arr.len() {
                arr.push(JsonValue::Null);
            }
            &mut arr[index]
        }
        _ => return Err(conflict(segments, parents.len())),
    };

    if slot.is_object() || slot.is_array() {
        return Err(Error::PathConflict {
            path: segments.join("/"),
            message: "a branch exists where a value would be set".to_string(),
        });
    }
    *slot = JsonValue::String(value.to_owned());
    Ok(())
}

/// Insert every scalar at or below `value` into `tree`, under `path`.
fn collect(value: &JsonValue, path: &mut Vec<String>, tree: &mut Tree) -> Result<(), Error> {
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map {
                path.push(key.clone());
                collect(child, path, tree)?;
                path.pop();
            }
        }
        JsonValue::Array(arr) => {
            for (index, child) in arr.iter().enumerate() {
                path.push(index.to_string());
                collect(child, path, tree)?;
                path.pop();
            }
        }
        scalar => {
            if let Some(text) = scalar_text(scalar) {
                if !path.is_empty() {
                    tree.insert_segments(path.as_slice(), text)?;
                }
            }
        }
    }
    Ok(())
}

impl ConfigurationInterface for JsonBackend {
    fn put_string(&mut self, path: &str, value: &str) -> Result<(), Error> {
        let segments = self.settings.resolve(path);
        tracing::debug!(?segments, "put");
        let mut staged = self.document.clone();
        set_string(&mut staged, &segments, value)?;
        self.save(&staged)?;
        self.document = staged;
        Ok(())
    }

    fn get_string(&mut self, path: &str) -> Result<Option<String>, Error> {
        let segments = self.settings.resolve(path);
        tracing::debug!(?segments, "get");
        Ok(get_sub_tree(&self.document, &segments).and_then(scalar_text))
    }

    fn set_prefix(&mut self, prefix: &str) {
        self.settings.set_prefix(prefix)
    }

    fn set_path_separator(&mut self, separator: char) {
        self.settings.set_separator(separator)
    }

    fn reset_path_separator(&mut self) {
        self.settings.reset_separator()
    }

    fn get_recursive(&mut self, path: &str) -> Result<Tree, Error> {
        let segments = self.settings.resolve(path);
        tracing::debug!(?segments, "get recursive");
        let mut tree = Tree::with_separator(self.settings.separator());
        if let Some(node) = get_sub_tree(&self.document, &segments) {
            let mut relative = self.settings.split(path);
            collect(node, &mut relative, &mut tree)?;
        }
        Ok(tree)
    }

    fn get_recursive_map(&mut self, path: &str) -> Result<KeyValueMap, Error> {
        Ok(self.get_recursive(path)?.flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration_core::ConfigurationExt;
    use serde_json::json;
    use tempfile::TempDir;

    fn backend_with(dir: &TempDir, document: JsonValue) -> JsonBackend {
        let path = dir.path().join("config.json");
        fs::write(&path, document.to_string()).unwrap();
        JsonBackend::new(path).unwrap()
    }

    #[test]
    fn reads_scalars() {
        let dir = TempDir::new().unwrap();
        let mut config = backend_with(
            &dir,
            json!({
                "name": "demo",
                "port": 8080,
                "ratio": 0.5,
                "debug": true,
                "nothing": null,
                "nested": {"k": "v"},
                "list": ["x", "y"]
            }),
        );

        assert_eq!(config.get_string("name").unwrap().as_deref(), Some("demo"));
        assert_eq!(config.get_int("port").unwrap(), Some(8080));
        assert_eq!(config.get_float("ratio").unwrap(), Some(0.5));
        assert_eq!(config.get_string("debug").unwrap().as_deref(), Some("true"));
        assert_eq!(config.get_string("nothing").unwrap(), None);
        assert_eq!(config.get_string("nested").unwrap(), None);
        assert_eq!(config.get_string("nested/k").unwrap().as_deref(), Some("v"));
        assert_eq!(config.get_string("list/1").unwrap().as_deref(), Some("y"));
        assert_eq!(config.get_string("list/9").unwrap(), None);
        assert_eq!(config.get_string("name/deeper").unwrap(), None);
    }

    #[test]
    fn missing_file_starts_empty_and_put_creates_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new.json");
        let mut config = JsonBackend::new(&path).unwrap();
        assert_eq!(config.get_string("a").unwrap(), None);

        config.put("a/b", 5_i64).unwrap();
        let written: JsonValue = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"a": {"b": "5"}}));

        let mut reopened = JsonBackend::new(&path).unwrap();
        assert_eq!(reopened.get::<i64>("a/b").unwrap(), Some(5));
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\n  \"a\": \n").unwrap();
        assert!(matches!(
            JsonBackend::new(&path),
            Err(Error::Parse { line: Some(_), .. })
        ));
    }

    #[test]
    fn put_conflicts() {
        let dir = TempDir::new().unwrap();
        let mut config = backend_with(&dir, json!({"a": {"b": "1"}, "s": 3}));
        assert!(matches!(
            config.put_string("s/x", "1"),
            Err(Error::PathConflict { .. })
        ));
        assert!(matches!(
            config.put_string("a", "1"),
            Err(Error::PathConflict { .. })
        ));
        // overwriting a scalar of another type is fine
        config.put_string("s", "three").unwrap();
        assert_eq!(config.document()["s"], json!("three"));
    }

    #[test]
    fn failed_write_leaves_document_unchanged() {
        let dir = TempDir::new().unwrap();
        let mut config = JsonBackend::new(dir.path().join("missing").join("doc.json")).unwrap();

        assert!(matches!(config.put_string("a/b", "1"), Err(Error::Io(_))));
        assert_eq!(config.get_string("a/b").unwrap(), None);
        assert_eq!(config.document(), &json!({}));
    }

    #[test]
    fn put_into_array() {
        let dir = TempDir::new().unwrap();
        let mut config = backend_with(&dir, json!({"list": ["a"]}));
        config.put_string("list/0", "z").unwrap();
        config.put_string("list/1", "b").unwrap();
        assert_eq!(config.document()["list"], json!(["z", "b"]));
        assert!(matches!(
            config.put_string("list/5", "x"),
            Err(Error::InvalidPath { .. })
        ));
    }

    #[test]
    fn recursive_scenario() {
        let dir = TempDir::new().unwrap();
        let mut config = backend_with(&dir, json!({"a": {"b": "1", "c": 2}, "z": "no"}));

        let map = config.get_recursive_map("a").unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a/b").map(String::as_str), Some("1"));
        assert_eq!(map.get("a/c").map(String::as_str), Some("2"));

        let tree = config.get_recursive("a").unwrap();
        let a = tree.get("a").unwrap();
        assert_eq!(a.children().count(), 2);

        assert!(config.get_recursive_map("missing").unwrap().is_empty());
    }

    #[test]
    fn recursive_with_prefix_and_separator() {
        let dir = TempDir::new().unwrap();
        let mut config = backend_with(&dir, json!({"apps": {"web": {"db": {"host": "h", "ports": [1, 2]}}}}));
        config.set_prefix("/apps/web");
        config.set_path_separator('.');

        let map = config.get_recursive_map("db").unwrap();
        assert_eq!(map.get("db.host").map(String::as_str), Some("h"));
        assert_eq!(map.get("db.ports.1").map(String::as_str), Some("2"));
        assert_eq!(config.get_int("db.ports.0").unwrap(), Some(1));
    }
}
