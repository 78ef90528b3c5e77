//! URI parsing for backend selection.

use percent_encoding::percent_decode_str;
use url::Url;

use configuration_core::Error;

/// The parts of a configuration URI the factory dispatches on.
///
/// Host and path are percent-decoded, so `file:/tmp/my%20app.ini` and
/// `file:/tmp/my app.ini` name the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendUri {
    scheme: String,
    host: String,
    port: Option<u16>,
    path: String,
}

impl BackendUri {
    /// Parse `uri`. A missing or unparseable scheme is `IllFormedUri`.
    pub fn parse(uri: &str) -> Result<Self, Error> {
        let ill_formed = |message: String| Error::IllFormedUri {
            uri: uri.to_owned(),
            message,
        };

        let url = Url::parse(uri).map_err(|e| ill_formed(e.to_string()))?;
        if url.scheme().is_empty() {
            return Err(ill_formed("missing scheme".to_string()));
        }

        let host = match raw_host(uri) {
            Some(host) => decode(host).map_err(ill_formed)?,
            None => String::new(),
        };
        let path = decode(url.path()).map_err(ill_formed)?;

        Ok(Self {
            scheme: url.scheme().to_owned(),
            host,
            port: url.port(),
            path,
        })
    }

    /// Lower-case scheme, e.g. `file` or `consul`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Host as written, or an empty string when the URI has no authority.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Decoded path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Host and path taken together as one filesystem or document path.
    ///
    /// `json://etc/app.json` puts `etc` in the host slot; this glues it back
    /// on to give `/etc/app.json`. Without a host the path is returned as is.
    pub fn document_path(&self) -> String {
        if self.host.is_empty() {
            self.path.clone()
        } else {
            format!("/{}{}", self.host, self.path)
        }
    }
}

/// The host text exactly as written in `uri`.
///
/// `Url` lowercases and IDNA-maps hosts of special schemes such as `file`,
/// which would change the meaning of `file://Etc/app.ini`.
fn raw_host(uri: &str) -> Option<&str> {
    let (_, rest) = uri.split_once(':')?;
    let rest = rest.strip_prefix("//")?;
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    let host_and_port = authority
        .rsplit_once('@')
        .map_or(authority, |(_, host)| host);

    let host = if host_and_port.starts_with('[') {
        match host_and_port.find(']') {
            Some(close) => &host_and_port[..=close],
            None => host_and_port,
        }
    } else {
        host_and_port
            .split_once(':')
            .map_or(host_and_port, |(host, _)| host)
    };
    Some(host).filter(|host| !host.is_empty())
}

fn decode(text: &str) -> Result<String, String> {
    percent_decode_str(text)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| format!("'{}' is not valid UTF-8 once decoded: {}", text, e))
}
