//! Configuration core: the backend-agnostic access contract
//!
//! This crate defines what every configuration backend looks like from the
//! outside:
//! - `ConfigurationInterface`: put/get strings and numbers by path, read
//!   whole subtrees
//! - `Tree`/`Node`: owned snapshot of a subtree, with a two-case `Visitor`
//! - `KeyValueMap`: the flattened dual of a `Tree`
//! - `PathSettings`: the separator/prefix state each backend keeps
//!
//! Concrete backends live in `configuration-backends`; the URI factory in
//! `configuration`.
//!
//! # Example
//!
//! ```rust
//! use configuration_core::{ConfigurationInterface, Error};
//!
//! fn read_port(config: &mut dyn ConfigurationInterface) -> Result<i64, Error> {
//!     Ok(config.get_int("server/port")?.unwrap_or(8080))
//! }
//! ```

mod error;
mod interface;
mod path;
mod tree;
mod typed;

pub use error::Error;
pub use interface::ConfigurationInterface;
pub use path::{join_path, split_path, PathSettings, DEFAULT_SEPARATOR};
pub use tree::{KeyValueMap, Node, Tree, Visitor};
pub use typed::{ConfigValue, ConfigurationExt};
