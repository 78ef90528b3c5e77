use std::fs;

use tempfile::TempDir;

use configuration::{get_configuration, ConfigurationExt, ConfigurationInterface, Error, KeyValueMap};

fn file_uri(path: &std::path::Path) -> String {
    format!("file:{}", path.display())
}

#[test]
fn file_uri_reads_and_writes_ini() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("app.ini");
    fs::write(&path, "[a]\nb = 1\nc = 2\n").unwrap();

    let mut config = get_configuration(&file_uri(&path)).unwrap();
    assert_eq!(config.get_int("a/b").unwrap(), Some(1));

    let expected: KeyValueMap = [("a/b", "1"), ("a/c", "2")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    assert_eq!(config.get_recursive_map("a").unwrap(), expected);

    config.put_float("a/d", 1.25).unwrap();
    let mut reopened = get_configuration(&file_uri(&path)).unwrap();
    assert_eq!(reopened.get::<f64>("a/d").unwrap(), Some(1.25));
}

#[test]
fn malformed_file_fails_at_construction() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.cfg");
    fs::write(&path, "[unterminated\n").unwrap();

    assert!(matches!(
        get_configuration(&file_uri(&path)),
        Err(Error::Parse { .. })
    ));
}

#[cfg(feature = "json")]
#[test]
fn json_uri_reads_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.json");
    fs::write(&path, r#"{"server": {"port": 9000, "name": "api"}}"#).unwrap();

    let uri = format!("json://{}", path.display());
    let mut config = get_configuration(&uri).unwrap();
    assert_eq!(config.get_int("server/port").unwrap(), Some(9000));

    config.set_path_separator('.');
    assert_eq!(
        config.get_string("server.name").unwrap().as_deref(),
        Some("api")
    );
    assert_eq!(config.get_recursive("server").unwrap().len(), 2);
}

#[test]
fn copy_between_backends() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("copy.ini");

    let mut source = get_configuration("memory:").unwrap();
    source.put_string("db/host", "localhost").unwrap();
    source.put_int("db/port", 5432).unwrap();
    source.put_string("name", "svc").unwrap();

    let mut destination = get_configuration(&file_uri(&path)).unwrap();
    for (key, value) in source.get_recursive_map("").unwrap() {
        destination.put_string(&key, &value).unwrap();
    }

    let mut reopened = get_configuration(&file_uri(&path)).unwrap();
    assert_eq!(
        reopened.get_recursive_map("").unwrap(),
        source.get_recursive_map("").unwrap()
    );
}

#[test]
fn absent_values_are_not_errors() {
    let mut config = get_configuration("memory:").unwrap();
    assert_eq!(config.get_string("never/written").unwrap(), None);
    assert!(config.get_recursive_map("never").unwrap().is_empty());
    assert!(config.get_recursive("never").unwrap().is_empty());
}

#[test]
fn file_uri_with_space_opens_literal_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("my app.ini");
    fs::write(&path, "k = v\n").unwrap();

    let mut config = get_configuration(&file_uri(&path)).unwrap();
    assert_eq!(config.get_string("k").unwrap().as_deref(), Some("v"));

    config.put_string("n", "1").unwrap();
    assert!(!dir.path().join("my%20app.ini").exists());
    assert_eq!(fs::read_to_string(&path).unwrap(), "k = v\nn = 1\n");

    let encoded = format!("file:{}/my%20app.ini", dir.path().display());
    let mut reopened = get_configuration(&encoded).unwrap();
    assert_eq!(reopened.get_string("n").unwrap().as_deref(), Some("1"));
}
