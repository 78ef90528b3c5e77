//! Consul key-value backend.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;

use configuration_core::{
    split_path, ConfigurationInterface, Error, KeyValueMap, PathSettings, Tree, DEFAULT_SEPARATOR,
};

/// Port of a local Consul agent's HTTP API.
pub const DEFAULT_PORT: u16 = 8500;

/// Environment variable holding the ACL token, as read by the Consul CLI.
pub const TOKEN_ENV: &str = "CONSUL_HTTP_TOKEN";

const TOKEN_HEADER: &str = "X-Consul-Token";

/// Connection settings for [`ConsulBackend`].
#[derive(Debug, Clone)]
pub struct ConsulOptions {
    /// Per-request timeout.
    pub timeout: Duration,
    /// ACL token sent with every request.
    pub token: Option<String>,
}

impl Default for ConsulOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            token: None,
        }
    }
}

impl ConsulOptions {
    /// Defaults, with the token taken from `CONSUL_HTTP_TOKEN` when set.
    pub fn from_env() -> Self {
        Self {
            token: std::env::var(TOKEN_ENV).ok().filter(|token| !token.is_empty()),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct KvEntry {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Value")]
    value: Option<String>,
}

/// A backend over the Consul KV HTTP API.
///
/// Configuration paths map to KV keys with `/` between segments; the prefix
/// is prepended to every key. Each operation is one blocking HTTP request:
/// - `get_string` performs `GET /v1/kv/<key>?raw`
/// - `put_string` performs `PUT /v1/kv/<key>` with the value as body
/// - `get_recursive*` performs `GET /v1/kv/<key>?recurse`
///
/// Recursive results are keyed relative to the prefix and include the
/// queried path.
///
/// # Example
///
/// ```ignore
/// use configuration_backends::ConsulBackend;
/// use configuration_core::ConfigurationInterface;
///
/// let mut consul = ConsulBackend::new("localhost", 8500)?;
/// consul.set_prefix("apps/web");
/// let host = consul.get_string("db/host")?;
/// ```
#[derive(Debug)]
pub struct ConsulBackend {
    client: Client,
    base_url: Url,
    token: Option<String>,
    settings: PathSettings,
}

impl ConsulBackend {
    /// Connect to the agent at `host:port` with default options.
    pub fn new(host: &str, port: u16) -> Result<Self, Error> {
        Self::with_options(host, port, ConsulOptions::default())
    }

    pub fn with_options(host: &str, port: u16, options: ConsulOptions) -> Result<Self, Error> {
        Self::from_url(&format!("http://{}:{}/", host, port), options)
    }

    /// Connect to the agent whose HTTP API lives at `base_url`.
    pub fn from_url(base_url: &str, options: ConsulOptions) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::backend(format!("invalid Consul address '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::backend(format!(
                "invalid Consul address '{}'",
                base_url
            )));
        }
        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| Error::backend(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: options.token,
            settings: PathSettings::new(),
        })
    }

    /// The agent address requests go to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the KV endpoint for a key given as segments.
    fn key_url(&self, segments: &[String]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| Error::backend("Consul address cannot be a base URL"))?;
            path.pop_if_empty().push("v1").push("kv");
            if segments.is_empty() {
                path.push("");
            } else {
                path.extend(segments);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }

    fn send(&self, builder: RequestBuilder, url: &Url) -> Result<Response, Error> {
        builder
            .send()
            .map_err(|e| Error::backend(format!("request to {} failed: {}", url, e)))
    }

    fn unexpected_status(response: Response, url: &Url) -> Error {
        let status = response.status();
        let body = response.text().unwrap_or_default();
        tracing::warn!(%url, %status, "unexpected response from Consul");
        Error::backend(format!(
            "Consul returned {} for {}: {}",
            status,
            url,
            body.trim()
        ))
    }

    /// Every value at or below `path`, as segments relative to the prefix.
    fn fetch_entries(&self, path: &str) -> Result<Vec<(Vec<String>, String)>, Error> {
        let segments = self.settings.resolve(path);
        let mut url = self.key_url(&segments)?;
        url.set_query(Some("recurse"));
        tracing::debug!(%url, "get recursive");

        let response = self.send(self.request(Method::GET, url.clone()), &url)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(Self::unexpected_status(response, &url));
        }
        let listing: Vec<KvEntry> = response
            .json()
            .map_err(|e| Error::backend(format!("malformed listing from {}: {}", url, e)))?;

        let mut entries = Vec::with_capacity(listing.len());
        for entry in listing {
            // Folder markers carry no value
            let Some(encoded) = entry.value else {
                continue;
            };
            if entry.key.ends_with(DEFAULT_SEPARATOR) {
                continue;
            }
            // `?recurse` matches on the textual key prefix, so `a` also lists `ab/...`
            let full = split_path(&entry.key, DEFAULT_SEPARATOR);
            if !full.starts_with(&segments) {
                continue;
            }
            let Some(relative) = self.settings.relative(&full) else {
                continue;
            };
            let decoded = STANDARD.decode(encoded.as_bytes()).map_err(|e| {
                Error::backend(format!("invalid base64 value for key '{}': {}", entry.key, e))
            })?;
            let value = String::from_utf8(decoded).map_err(|e| {
                Error::backend(format!("non UTF-8 value for key '{}': {}", entry.key, e))
            })?;
            entries.push((relative.to_vec(), value));
        }
        Ok(entries)
    }
}

impl ConfigurationInterface for ConsulBackend {
    fn put_string(&mut self, path: &str, value: &str) -> Result<(), Error> {
        let segments = self.settings.resolve(path);
        if segments.is_empty() {
            return Err(Error::InvalidPath {
                message: "cannot put a value at an empty key".to_string(),
            });
        }
        let url = self.key_url(&segments)?;
        tracing::debug!(%url, "put");

        let response = self.send(
            self.request(Method::PUT, url.clone()).body(value.to_owned()),
            &url,
        )?;
        if !response.status().is_success() {
            return Err(Self::unexpected_status(response, &url));
        }
        let accepted = response
            .text()
            .map_err(|e| Error::backend(format!("failed to read response from {}: {}", url, e)))?;
        if accepted.trim() == "false" {
            return Err(Error::backend(format!("Consul rejected the write to {}", url)));
        }
        Ok(())
    }

    fn get_string(&mut self, path: &str) -> Result<Option<String>, Error> {
        let segments = self.settings.resolve(path);
        if segments.is_empty() {
            return Ok(None);
        }
        let mut url = self.key_url(&segments)?;
        url.set_query(Some("raw"));
        tracing::debug!(%url, "get");

        let response = self.send(self.request(Method::GET, url.clone()), &url)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::unexpected_status(response, &url));
        }
        response
            .text()
            .map(Some)
            .map_err(|e| Error::backend(format!("failed to read response from {}: {}", url, e)))
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

    /// Fails with `PathConflict` when Consul holds values both at a key and below it.
    fn get_recursive(&mut self, path: &str) -> Result<Tree, Error> {
        let mut tree = Tree::with_separator(self.settings.separator());
        for (segments, value) in self.fetch_entries(path)? {
            if !segments.is_empty() {
                tree.insert_segments(&segments, value)?;
            }
        }
        Ok(tree)
    }

    fn get_recursive_map(&mut self, path: &str) -> Result<KeyValueMap, Error> {
        Ok(self
            .fetch_entries(path)?
            .into_iter()
            .filter(|(segments, _)| !segments.is_empty())
            .map(|(segments, value)| (self.settings.join(&segments), value))
            .collect())
    }
}
