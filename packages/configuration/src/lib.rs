//! Configuration: uniform path-addressed access to configuration data
//!
//! Pick a backend with a URI and talk to it through one interface:
//!
//! | URI | backend |
//! |---|---|
//! | `file:/etc/app.ini` | INI file (`.ini`, `.cfg`) |
//! | `json:///etc/app.json` | JSON document (feature `json`) |
//! | `consul://host:8500/prefix` | Consul KV (feature `consul`) |
//! | `memory:` | process-local scratch store |
//!
//! # Example
//!
//! ```rust
//! use configuration::{get_configuration, ConfigurationInterface};
//!
//! let mut config = get_configuration("memory:").unwrap();
//! config.put_int("server/port", 8080).unwrap();
//! assert_eq!(config.get_int("server/port").unwrap(), Some(8080));
//!
//! let subtree = config.get_recursive_map("server").unwrap();
//! assert_eq!(subtree.get("server/port").map(String::as_str), Some("8080"));
//! ```

mod factory;
mod uri;

pub use factory::{get_configuration, BoxedConfiguration, ConfigurationFactory, Constructor};
pub use uri::BackendUri;

pub use configuration_core::{
    join_path, split_path, ConfigValue, ConfigurationExt, ConfigurationInterface, Error,
    KeyValueMap, Node, PathSettings, Tree, Visitor, DEFAULT_SEPARATOR,
};

pub use configuration_backends::{FileBackend, MemoryBackend};

#[cfg(feature = "json")]
pub use configuration_backends::JsonBackend;

#[cfg(feature = "consul")]
pub use configuration_backends::{ConsulBackend, ConsulOptions};
