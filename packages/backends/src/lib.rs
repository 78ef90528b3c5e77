//! Configuration backends
//!
//! Concrete implementations of `ConfigurationInterface`:
//! - `FileBackend`: local INI files (`.ini`, `.cfg`)
//! - `JsonBackend`: JSON documents (feature `json`)
//! - `ConsulBackend`: the Consul KV HTTP API (feature `consul`)
//! - `MemoryBackend`: process-local, for tests and scratch use
//!
//! Each backend owns its separator/prefix state and its document or
//! connection; none of them cache, retry or batch.

mod ini;
mod tree_store;

pub mod file;
pub mod memory;

#[cfg(feature = "json")]
pub mod json;

#[cfg(feature = "consul")]
pub mod consul;

pub use file::FileBackend;
pub use memory::MemoryBackend;

#[cfg(feature = "json")]
pub use json::JsonBackend;

#[cfg(feature = "consul")]
pub use consul::{ConsulBackend, ConsulOptions};
