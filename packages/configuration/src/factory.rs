//! Scheme-based backend selection.

use std::collections::HashMap;
use std::fmt;

use configuration_backends::{FileBackend, MemoryBackend};
use configuration_core::{ConfigurationInterface, Error};

use crate::uri::BackendUri;

/// A boxed backend, as handed out by the factory.
pub type BoxedConfiguration = Box<dyn ConfigurationInterface>;

/// Builds a backend from a parsed URI.
pub type Constructor = Box<dyn Fn(&BackendUri) -> Result<BoxedConfiguration, Error> + Send + Sync>;

/// Turns configuration URIs into live backends.
///
/// The factory owns a table from URI scheme to constructor. The default
/// table knows `file`, `json`, `consul` and `memory`; more schemes can be
/// added with [`register`](ConfigurationFactory::register) without touching
/// the dispatch.
///
/// # Example
///
/// ```rust
/// use configuration::{ConfigurationFactory, ConfigurationInterface};
///
/// let factory = ConfigurationFactory::default();
/// let mut config = factory.get_configuration("memory:").unwrap();
/// config.put_string("a/b", "1").unwrap();
/// assert_eq!(config.get_string("a/b").unwrap().as_deref(), Some("1"));
/// ```
pub struct ConfigurationFactory {
    constructors: HashMap<String, Constructor>,
}

impl Default for ConfigurationFactory {
    fn default() -> Self {
        Self::with_default_backends()
    }
}

impl fmt::Debug for ConfigurationFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationFactory")
            .field("schemes", &self.schemes())
            .finish()
    }
}

impl ConfigurationFactory {
    /// A factory that recognizes no schemes.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// A factory with `file`, `json`, `consul` and `memory` registered.
    ///
    /// `json` and `consul` are always registered; when their cargo feature is
    /// off the constructor fails with `BackendDisabled`.
    pub fn with_default_backends() -> Self {
        let mut factory = Self::new();
        factory
            .register("file", file_backend)
            .register("json", json_backend)
            .register("consul", consul_backend)
            .register("memory", memory_backend);
        factory
    }

    /// Register `constructor` for `scheme`, replacing any previous entry.
    pub fn register<F>(&mut self, scheme: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(&BackendUri) -> Result<BoxedConfiguration, Error> + Send + Sync + 'static,
    {
        let scheme = scheme.into().to_ascii_lowercase();
        self.constructors.insert(scheme, Box::new(constructor));
        self
    }

    pub fn is_registered(&self, scheme: &str) -> bool {
        self.constructors.contains_key(&scheme.to_ascii_lowercase())
    }

    /// Registered schemes in sorted order.
    pub fn schemes(&self) -> Vec<&str> {
        let mut schemes: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        schemes.sort_unstable();
        schemes
    }

    /// Parse `uri` and build the backend registered for its scheme.
    ///
    /// # Errors
    ///
    /// * `IllFormedUri` - the URI has no usable scheme.
    /// * `UnrecognizedBackend` - nothing is registered for the scheme.
    /// * `BackendDisabled` - the backend was compiled out.
    /// * anything the backend constructor itself reports.
    pub fn get_configuration(&self, uri: &str) -> Result<BoxedConfiguration, Error> {
        let parsed = BackendUri::parse(uri)?;
        let constructor =
            self.constructors
                .get(parsed.scheme())
                .ok_or_else(|| Error::UnrecognizedBackend {
                    scheme: parsed.scheme().to_owned(),
                })?;
        tracing::debug!(scheme = parsed.scheme(), uri, "creating backend");
        constructor(&parsed)
    }
}

/// Build a backend for `uri` with the default scheme table.
pub fn get_configuration(uri: &str) -> Result<BoxedConfiguration, Error> {
    ConfigurationFactory::with_default_backends().get_configuration(uri)
}

fn file_backend(uri: &BackendUri) -> Result<BoxedConfiguration, Error> {
    Ok(Box::new(FileBackend::new(uri.document_path())?))
}

fn memory_backend(_uri: &BackendUri) -> Result<BoxedConfiguration, Error> {
    Ok(Box::new(MemoryBackend::new()))
}

#[cfg(feature = "json")]
fn json_backend(uri: &BackendUri) -> Result<BoxedConfiguration, Error> {
    Ok(Box::new(configuration_backends::JsonBackend::new(
        uri.document_path(),
    )?))
}

#[cfg(not(feature = "json"))]
fn json_backend(_uri: &BackendUri) -> Result<BoxedConfiguration, Error> {
    Err(Error::BackendDisabled {
        backend: "json".to_string(),
    })
}

#[cfg(feature = "consul")]
fn consul_backend(uri: &BackendUri) -> Result<BoxedConfiguration, Error> {
    use configuration_backends::consul::{ConsulBackend, ConsulOptions, DEFAULT_PORT};

    let host = match uri.host() {
        "" => "localhost",
        host => host,
    };
    let port = uri.port().unwrap_or(DEFAULT_PORT);
    let mut consul = ConsulBackend::with_options(host, port, ConsulOptions::from_env())?;
    if !uri.path().is_empty() {
        consul.set_prefix(uri.path());
    }
    Ok(Box::new(consul))
}

#[cfg(not(feature = "consul"))]
fn consul_backend(_uri: &BackendUri) -> Result<BoxedConfiguration, Error> {
    Err(Error::BackendDisabled {
        backend: "consul".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use configuration_core::ConfigurationExt;

    #[test]
    fn default_schemes() {
        let factory = ConfigurationFactory::default();
        assert_eq!(factory.schemes(), vec!["consul", "file", "json", "memory"]);
        assert!(factory.is_registered("FILE"));
        assert!(!factory.is_registered("etcd"));
    }

    #[test]
    fn empty_factory_recognizes_nothing() {
        let factory = ConfigurationFactory::new();
        assert!(matches!(
            factory.get_configuration("memory:"),
            Err(Error::UnrecognizedBackend { .. })
        ));
    }

    #[test]
    fn unknown_scheme_is_unrecognized() {
        match get_configuration("foo://x") {
            Err(Error::UnrecognizedBackend { scheme }) => assert_eq!(scheme, "foo"),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn empty_scheme_is_ill_formed() {
        assert!(matches!(
            get_configuration("/etc/app.ini"),
            Err(Error::IllFormedUri { .. })
        ));
        assert!(matches!(
            get_configuration("://x"),
            Err(Error::IllFormedUri { .. })
        ));
    }

    #[test]
    fn memory_backend_is_usable() {
        let mut config = get_configuration("memory:").unwrap();
        config.put("n", 3_i64).unwrap();
        assert_eq!(config.get::<i64>("n").unwrap(), Some(3));
    }

    #[test]
    fn custom_scheme_can_be_registered() {
        let mut factory = ConfigurationFactory::new();
        factory.register("scratch", |uri: &BackendUri| {
            let mut backend = MemoryBackend::new();
            backend.put_string("origin", uri.path())?;
            Ok(Box::new(backend) as BoxedConfiguration)
        });

        let mut config = factory.get_configuration("scratch:/seeded").unwrap();
        assert_eq!(
            config.get_string("origin").unwrap().as_deref(),
            Some("/seeded")
        );
    }

    #[test]
    fn register_replaces_existing_entry() {
        let mut factory = ConfigurationFactory::with_default_backends();
        factory.register("file", |_: &BackendUri| {
            Err(Error::BackendDisabled {
                backend: "file".to_string(),
            })
        });
        assert!(matches!(
            factory.get_configuration("file:/tmp/x.ini"),
            Err(Error::BackendDisabled { .. })
        ));
        assert_eq!(factory.schemes().len(), 4);
    }

    #[test]
    fn unsupported_file_type_surfaces() {
        assert!(matches!(
            get_configuration("file:/tmp/settings.yaml"),
            Err(Error::UnsupportedFileType { .. })
        ));
    }

    #[cfg(feature = "consul")]
    #[test]
    fn consul_uri_builds_backend_without_connecting() {
        assert!(get_configuration("consul://127.0.0.1:1/apps/web").is_ok());
    }

    #[cfg(not(feature = "json"))]
    #[test]
    fn json_disabled() {
        assert!(matches!(
            get_configuration("json:///tmp/x.json"),
            Err(Error::BackendDisabled { .. })
        ));
    }

    #[cfg(not(feature = "consul"))]
    #[test]
    fn consul_disabled() {
        assert!(matches!(
            get_configuration("consul://localhost:8500"),
            Err(Error::BackendDisabled { .. })
        ));
    }
}
