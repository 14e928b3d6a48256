//! Runtime configuration.
//!
//! Values come from, in increasing priority: built-in defaults, a TOML file
//! (`$CONFIG_DIR/pokemonster/config.toml` unless a path is given),
//! `POKEMONSTER_*` environment variables, and command-line flags applied by
//! the binary.
//!
//! ```toml
//! resource = "berry"
//! backend = "graphql"
//! page_size = 20
//! match_mode = "fuzzy"
//! page_strip = "dots"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::ResourceKind;
use crate::error::{AdapterError, ConfigError};
use crate::paginator;
use crate::search::MatchMode;
use crate::source::{self, graphql, rest, DataSource, DetailSource, GraphqlSource, Paging, RestSource};
use crate::viewmodel::DEFAULT_BULK_LIMIT;

/// Environment variable overriding `page_size`.
pub const ENV_PAGE_SIZE: &str = "POKEMONSTER_PAGE_SIZE";
/// Environment variable overriding `backend`.
pub const ENV_BACKEND: &str = "POKEMONSTER_BACKEND";

/// Which PokeAPI flavour to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `https://pokeapi.co/api/v2/`.
    #[default]
    Rest,
    /// `https://graphql.pokeapi.co/v1beta2`.
    Graphql,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Rest => "rest",
            Backend::Graphql => "graphql",
        })
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Backend::Rest),
            "graphql" | "gql" => Ok(Backend::Graphql),
            other => Err(ConfigError::Invalid(format!("unknown backend '{other}'"))),
        }
    }
}

/// The sources an application instance reads from.
#[derive(Clone)]
pub struct Sources {
    /// Paged catalog listing.
    pub list: Arc<dyn DataSource>,
    /// Pokemon details.
    pub detail: Arc<dyn DetailSource>,
}

impl fmt::Debug for Sources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sources")
            .field("list", &self.list.name())
            .finish_non_exhaustive()
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Collection to browse.
    pub resource: ResourceKind,
    /// API flavour.
    pub backend: Backend,
    /// Forces a paging mode; the backend's preference is used otherwise.
    pub paging: Option<Paging>,
    /// Items per page; 24 for Pokemon and 20 otherwise when unset.
    pub page_size: Option<usize>,
    /// Number of page buttons in the page strip.
    pub max_page_buttons: usize,
    /// How the page strip is drawn.
    pub page_strip: paginator::Type,
    /// How queries are matched locally.
    pub match_mode: MatchMode,
    /// REST host.
    pub rest_base_url: String,
    /// GraphQL endpoint.
    pub graphql_url: String,
    /// `limit` for full-collection loads.
    pub bulk_limit: usize,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// Where the binary writes its log.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resource: ResourceKind::default(),
            backend: Backend::default(),
            paging: None,
            page_size: None,
            max_page_buttons: paginator::DEFAULT_MAX_BUTTONS,
            page_strip: paginator::Type::default(),
            match_mode: MatchMode::default(),
            rest_base_url: rest::DEFAULT_BASE_URL.to_string(),
            graphql_url: graphql::DEFAULT_ENDPOINT.to_string(),
            bulk_limit: DEFAULT_BULK_LIMIT,
            request_timeout_secs: 30,
            log_file: None,
        }
    }
}

impl Config {
    /// Reads `path`. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Reads the default config file when it exists; defaults otherwise.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// `$CONFIG_DIR/pokemonster/config.toml`, if the platform has a config
    /// directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pokemonster").join("config.toml"))
    }

    /// Applies `POKEMONSTER_*` variables from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, which maps variable names to values.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            let size = raw.trim().parse::<usize>().map_err(|_| {
                ConfigError::Invalid(format!("{ENV_PAGE_SIZE} must be a positive integer, got '{raw}'"))
            })?;
            self.page_size = Some(size);
        }
        if let Some(raw) = lookup(ENV_BACKEND) {
            self.backend = raw.parse()?;
        }
        Ok(())
    }

    /// Rejects values the application cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == Some(0) {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if self.max_page_buttons == 0 {
            return Err(ConfigError::Invalid("max_page_buttons must be at least 1".into()));
        }
        if self.bulk_limit == 0 {
            return Err(ConfigError::Invalid("bulk_limit must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be at least 1".into()));
        }
        for (key, url) in [("rest_base_url", &self.rest_base_url), ("graphql_url", &self.graphql_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!("{key} must be an http(s) URL, got '{url}'")));
            }
        }
        Ok(())
    }

    /// Items per page for the configured resource.
    pub fn effective_page_size(&self) -> usize {
        self.page_size_for(self.resource)
    }

    /// Items per page for `kind`: the configured size, or 24 for Pokemon
    /// and 20 otherwise.
    pub fn page_size_for(&self, kind: ResourceKind) -> usize {
        self.page_size.unwrap_or(match kind {
            ResourceKind::Pokemon => 24,
            ResourceKind::Berry | ResourceKind::Location => 20,
        })
    }

    /// Paging mode: the configured one, or what `source` prefers.
    pub fn effective_paging(&self, source: &dyn DataSource) -> Paging {
        self.paging.unwrap_or_else(|| source.preferred_paging())
    }

    /// Builds the list and detail sources for the configured resource.
    pub fn build_sources(&self) -> Result<Sources, AdapterError> {
        HttpSources::new(self)?.sources(self.resource)
    }
}

/// Builds [`Sources`] per collection, so the front end can switch
/// collections at runtime.
pub trait SourceFactory: Send + Sync {
    /// Sources listing `kind`.
    fn sources(&self, kind: ResourceKind) -> Result<Sources, AdapterError>;
}

impl<F> SourceFactory for F
where
    F: Fn(ResourceKind) -> Result<Sources, AdapterError> + Send + Sync,
{
    fn sources(&self, kind: ResourceKind) -> Result<Sources, AdapterError> {
        self(kind)
    }
}

impl SourceFactory for Config {
    fn sources(&self, kind: ResourceKind) -> Result<Sources, AdapterError> {
        HttpSources::new(self)?.sources(kind)
    }
}

/// Network sources for the configured backend, sharing one HTTP client
/// across collections.
#[derive(Debug, Clone)]
pub struct HttpSources {
    backend: Backend,
    rest_base_url: String,
    graphql_url: String,
    bulk_limit: usize,
    client: reqwest::Client,
}

impl HttpSources {
    /// Checks the endpoint URLs and builds the shared client.
    pub fn new(config: &Config) -> Result<Self, AdapterError> {
        for url in [&config.rest_base_url, &config.graphql_url] {
            let parsed =
                reqwest::Url::parse(url).map_err(|_| AdapterError::InvalidUrl(url.clone()))?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
                return Err(AdapterError::InvalidUrl(url.clone()));
            }
        }
        Ok(Self {
            backend: config.backend,
            rest_base_url: config.rest_base_url.clone(),
            graphql_url: config.graphql_url.clone(),
            bulk_limit: config.bulk_limit,
            client: source::http_client(Duration::from_secs(config.request_timeout_secs))?,
        })
    }
}

impl SourceFactory for HttpSources {
    fn sources(&self, kind: ResourceKind) -> Result<Sources, AdapterError> {
        let sources = match self.backend {
            Backend::Rest => {
                let rest = Arc::new(
                    RestSource::new(self.client.clone(), self.rest_base_url.clone(), kind)
                        .with_index_limit(self.bulk_limit),
                );
                Sources {
                    list: rest.clone(),
                    detail: rest,
                }
            }
            Backend::Graphql => {
                let graphql = Arc::new(
                    GraphqlSource::new(self.client.clone(), self.graphql_url.clone(), kind)
                        .with_rest_base_url(self.rest_base_url.clone()),
                );
                Sources {
                    list: graphql.clone(),
                    detail: graphql,
                }
            }
        };
        debug!(backend = %self.backend, resource = %kind, "built sources");
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.effective_page_size(), 24);
        assert_eq!(config.rest_base_url, "https://pokeapi.co");
    }

    #[test]
    fn page_size_defaults_per_resource() {
        let config = Config {
            resource: ResourceKind::Location,
            ..Config::default()
        };
        assert_eq!(config.effective_page_size(), 20);
    }

    #[test]
    fn loads_partial_file() {
        let file = write_config(
            r#"
resource = "berry"
backend = "graphql"
page_size = 10
match_mode = "fuzzy"
paging = "client-held"
"#,
        );
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.resource, ResourceKind::Berry);
        assert_eq!(config.backend, Backend::Graphql);
        assert_eq!(config.effective_page_size(), 10);
        assert_eq!(config.match_mode, MatchMode::Fuzzy);
        assert_eq!(config.paging, Some(Paging::ClientHeld));
        assert_eq!(config.max_page_buttons, 7);
        assert_eq!(config.page_strip, paginator::Type::Numbers);
    }

    #[test]
    fn loads_page_strip_type() {
        let file = write_config("page_strip = \"dots\"\n");
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.page_strip, paginator::Type::Dots);

        let file = write_config("page_strip = \"roman\"\n");
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn http_sources_reject_unparseable_urls() {
        for url in ["http://", "not a url", "ftp://pokeapi.co"] {
            let config = Config {
                graphql_url: url.into(),
                ..Config::default()
            };
            match HttpSources::new(&config) {
                Err(AdapterError::InvalidUrl(bad)) => assert_eq!(bad, url),
                other => panic!("expected invalid url for {url}, got {other:?}"),
            }
        }
    }

    #[test]
    fn factory_builds_each_collection() {
        let factory = HttpSources::new(&Config::default()).unwrap();
        for kind in ResourceKind::ALL {
            let sources = factory.sources(kind).unwrap();
            assert_eq!(sources.list.name(), "rest");
        }
        let closure = |kind: ResourceKind| Config { resource: kind, ..Config::default() }.build_sources();
        assert!(closure.sources(ResourceKind::Berry).is_ok());
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let file = write_config("page_size = \"many\"");
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "{err:?}");
    }

    #[test]
    fn env_overrides_page_size_and_backend() {
        let vars: HashMap<&str, &str> =
            [(ENV_PAGE_SIZE, "12"), (ENV_BACKEND, "GraphQL")].into_iter().collect();
        let mut config = Config::default();
        config
            .apply_env_from(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.page_size, Some(12));
        assert_eq!(config.backend, Backend::Graphql);
    }

    #[test]
    fn env_rejects_garbage() {
        let mut config = Config::default();
        let err = config
            .apply_env_from(|key| (key == ENV_PAGE_SIZE).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_PAGE_SIZE));
    }

    #[test]
    fn validate_rejects_zero_values() {
        for config in [
            Config { page_size: Some(0), ..Config::default() },
            Config { max_page_buttons: 0, ..Config::default() },
            Config { bulk_limit: 0, ..Config::default() },
            Config { rest_base_url: "pokeapi.co".into(), ..Config::default() },
        ] {
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))), "{config:?}");
        }
    }

    #[test]
    fn builds_sources_for_each_backend() {
        let rest = Config::default().build_sources().unwrap();
        assert_eq!(rest.list.name(), "rest");
        assert_eq!(Config::default().effective_paging(rest.list.as_ref()), Paging::ServerPaged);

        let graphql = Config {
            backend: Backend::Graphql,
            ..Config::default()
        }
        .build_sources()
        .unwrap();
        assert_eq!(graphql.list.name(), "graphql");
        assert_eq!(Config::default().effective_paging(graphql.list.as_ref()), Paging::ClientHeld);

        let forced = Config {
            paging: Some(Paging::ServerPaged),
            ..Config::default()
        };
        assert_eq!(forced.effective_paging(graphql.list.as_ref()), Paging::ServerPaged);
    }
}
