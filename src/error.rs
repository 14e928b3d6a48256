//! Error types shared by the data sources and the configuration loader.
//!
//! Adapter errors never reach the view model's arithmetic: the view model
//! keeps a cloneable [`AdapterFailure`](crate::viewmodel::AdapterFailure)
//! summary and exposes it to the presentation layer as an error flag.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a [`DataSource`](crate::source::DataSource) or
/// [`DetailSource`](crate::source::DetailSource).
#[derive(Debug, Error)]
pub enum AdapterError {
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    #[error("request to {url} failed: {source}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status code.
    ///
    /// `message` is the response body, or `HTTP error! status: N` when the
    /// body was empty.
    #[error("{message}")]
    Status {
        /// The URL that was requested.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Response text or a generated status message.
        message: String,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("failed to parse JSON response from {url}: {source}")]
    Decode {
        /// The URL that was requested.
        url: String,
        /// The JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The GraphQL endpoint answered with an `errors` array.
    #[error("GraphQL error: {0}")]
    GraphQl(String),

    /// The requested entry does not exist upstream.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// Collection name, e.g. `pokemon`.
        kind: String,
        /// Requested id or name.
        id: String,
    },

    /// A configured base URL could not be parsed or joined.
    #[error("invalid url '{0}'")]
    InvalidUrl(String),
}

impl AdapterError {
    /// Builds the status variant the way the original request wrapper did:
    /// the body text wins, an empty body falls back to the status code.
    pub(crate) fn status(url: impl Into<String>, status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("HTTP error! status: {status}")
        } else {
            body.to_string()
        };
        AdapterError::Status {
            url: url.into(),
            status,
            message,
        }
    }
}

/// Failure while loading or validating a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("could not read config file {path}: {source}")]
    Read {
        /// The file that was read.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`Config`](crate::config::Config).
    #[error("could not parse config file {path}: {source}")]
    Parse {
        /// The file that was parsed.
        path: PathBuf,
        /// The TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_prefers_body_text() {
        let err = AdapterError::status("https://pokeapi.co/api/v2/pokemon/", 404, "Not Found");
        assert_eq!(err.to_string(), "Not Found");
    }

    #[test]
    fn status_falls_back_to_code_for_empty_body() {
        let err = AdapterError::status("https://pokeapi.co/api/v2/pokemon/", 502, "  \n");
        assert_eq!(err.to_string(), "HTTP error! status: 502");
        match err {
            AdapterError::Status { status, .. } => assert_eq!(status, 502),
            other => panic!("unexpected error variant {other:?}"),
        }
    }
}
