use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;

use crate::error::AuthError;

/// Cache slot used when a provider does not name one.
pub const DEFAULT_CACHE_BACKEND: &str = "default";

/// Scope requested when a provider does not name one.
pub const DEFAULT_SCOPE: &str = "openid";

/// LRU capacity of in-memory cache slots.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 10_000;

const ENV_PREFIX: &str = "OIDCACHE";

/// Configuration for a single OIDC provider.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub name: String,
    pub provider_uri: Url,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: Url,
    /// Path of the realm/configuration below `provider_uri`.
    pub config_uri: Option<String>,
    pub redirect_failure_uri: Option<Url>,
    pub redirect_logout_uri: Option<Url>,
    pub redirect_success_default_uri: Option<Url>,
    pub redirect_requires_https: bool,
    pub redirect_allowed_hosts: Vec<String>,
    pub scope: String,
    /// Name of the cache slot sessions for this provider live in.
    pub cache_backend: String,
}

impl ProviderSettings {
    /// Creates settings with the required fields and defaults for the rest.
    pub fn new(
        name: impl Into<String>,
        provider_uri: Url,
        client_id: impl Into<String>,
        redirect_uri: Url,
    ) -> Self {
        Self {
            name: name.into(),
            provider_uri,
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri,
            config_uri: None,
            redirect_failure_uri: None,
            redirect_logout_uri: None,
            redirect_success_default_uri: None,
            redirect_requires_https: true,
            redirect_allowed_hosts: Vec::new(),
            scope: DEFAULT_SCOPE.to_string(),
            cache_backend: DEFAULT_CACHE_BACKEND.to_string(),
        }
    }

    pub fn with_cache_backend(mut self, cache_backend: impl Into<String>) -> Self {
        self.cache_backend = cache_backend.into();
        self
    }

    pub fn with_allowed_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.redirect_allowed_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_redirect_requires_https(mut self, requires_https: bool) -> Self {
        self.redirect_requires_https = requires_https;
        self
    }

    /// Whether a post-login redirect target is acceptable for this provider.
    ///
    /// Relative paths are accepted when they start with a single `/` and
    /// stay on the current host once resolved. Absolute URLs must point at
    /// one of `redirect_allowed_hosts`, over https when
    /// `redirect_requires_https`. Targets with control characters or `\`
    /// are always rejected, since browsers read `\` as `/`.
    pub fn allows_redirect(&self, target: &str) -> bool {
        if target.chars().any(|c| c.is_control() || c == '\\') {
            return false;
        }

        if target.starts_with('/') {
            return !target.starts_with("//") && stays_on_origin(target);
        }

        let Ok(url) = Url::parse(target) else {
            return false;
        };

        let scheme_ok = match url.scheme() {
            "https" => true,
            "http" => !self.redirect_requires_https,
            _ => false,
        };

        scheme_ok
            && url.host_str().is_some_and(|host| {
                self.redirect_allowed_hosts
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(host))
            })
    }
}

/// Which cache implementation backs a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKind {
    Memory,
    /// Redis connection URL.
    Redis(String),
}

impl CacheKind {
    /// Short name for logs. Never includes the connection URL.
    pub fn label(&self) -> &'static str {
        match self {
            CacheKind::Memory => "memory",
            CacheKind::Redis(_) => "redis",
        }
    }
}

/// Configuration for a named cache slot.
#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub name: String,
    pub kind: CacheKind,
    pub max_entries: usize,
    /// Expiry applied by the slot when a write carries none.
    pub default_ttl: Option<Duration>,
}

impl CacheSettings {
    /// An in-memory slot with default capacity and no expiry.
    pub fn memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CacheKind::Memory,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            default_ttl: None,
        }
    }

    pub fn redis(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CacheKind::Redis(url.into()),
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            default_ttl: None,
        }
    }
}

/// Complete configuration: identity providers and the cache slots they use.
#[derive(Debug, Clone, Default)]
pub struct BridgeConfig {
    pub providers: BTreeMap<String, ProviderSettings>,
    pub caches: BTreeMap<String, CacheSettings>,
}

impl BridgeConfig {
    /// Load from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OIDCACHE_PROVIDERS`: comma separated provider names (default: none)
    /// - `OIDCACHE_<P>_PROVIDER_URI`: issuer base URL (required)
    /// - `OIDCACHE_<P>_CLIENT_ID`: client ID (required)
    /// - `OIDCACHE_<P>_CLIENT_SECRET`: client secret (optional)
    /// - `OIDCACHE_<P>_REDIRECT_URI`: callback URL (required)
    /// - `OIDCACHE_<P>_CONFIG_URI`: realm path (optional)
    /// - `OIDCACHE_<P>_REDIRECT_FAILURE_URI`, `_REDIRECT_LOGOUT_URI`,
    ///   `_REDIRECT_SUCCESS_DEFAULT_URI`: redirect targets (optional)
    /// - `OIDCACHE_<P>_REDIRECT_REQUIRES_HTTPS`: (default: true)
    /// - `OIDCACHE_<P>_REDIRECT_ALLOWED_HOSTS`: comma separated hosts
    /// - `OIDCACHE_<P>_SCOPE`: (default: `openid`)
    /// - `OIDCACHE_<P>_CACHE_BACKEND`: cache slot name (default: `default`)
    /// - `OIDCACHE_CACHES`: comma separated slot names (default: `default`)
    /// - `OIDCACHE_CACHE_<S>_URL`: `memory` or a `redis://` URL (default: `memory`)
    /// - `OIDCACHE_CACHE_<S>_MAX_ENTRIES`: in-memory capacity (default: 10,000)
    /// - `OIDCACHE_CACHE_<S>_TTL_SECONDS`: slot default TTL (optional)
    ///
    /// `<P>` and `<S>` are the names upper-cased with `-` replaced by `_`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Config` if a required variable is missing, a value
    /// does not parse, or a provider names an undeclared cache slot.
    pub fn from_env() -> Result<Self, AuthError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`BridgeConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let mut config = Self::default();

        let cache_names = vars
            .get(&format!("{ENV_PREFIX}_CACHES"))
            .map(|v| split_list(&v))
            .unwrap_or_else(|| vec![DEFAULT_CACHE_BACKEND.to_string()]);
        for name in cache_names {
            let settings = vars.cache_settings(&name)?;
            config.caches.insert(name, settings);
        }

        let provider_names = vars
            .get(&format!("{ENV_PREFIX}_PROVIDERS"))
            .map(|v| split_list(&v))
            .unwrap_or_default();
        for name in provider_names {
            let settings = vars.provider_settings(&name)?;
            config.providers.insert(name, settings);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_provider(mut self, settings: ProviderSettings) -> Self {
        self.providers.insert(settings.name.clone(), settings);
        self
    }

    pub fn with_cache(mut self, settings: CacheSettings) -> Self {
        self.caches.insert(settings.name.clone(), settings);
        self
    }

    /// Settings of the named provider.
    ///
    /// # Errors
    ///
    /// Returns `ProviderNotConfigured` if no provider has that name.
    pub fn provider(&self, name: &str) -> Result<&ProviderSettings, AuthError> {
        self.providers
            .get(name)
            .ok_or_else(|| AuthError::ProviderNotConfigured(name.to_string()))
    }

    /// Settings of the named cache slot.
    ///
    /// # Errors
    ///
    /// Returns `CacheNotConfigured` if no slot has that name.
    pub fn cache(&self, name: &str) -> Result<&CacheSettings, AuthError> {
        self.caches
            .get(name)
            .ok_or_else(|| AuthError::CacheNotConfigured(name.to_string()))
    }

    /// Checks that every provider points at a declared slot and every
    /// in-memory slot has room for at least one entry.
    pub fn validate(&self) -> Result<(), AuthError> {
        for provider in self.providers.values() {
            if !self.caches.contains_key(&provider.cache_backend) {
                return Err(AuthError::Config(format!(
                    "provider '{}' uses undeclared cache slot '{}'",
                    provider.name, provider.cache_backend
                )));
            }
        }

        for cache in self.caches.values() {
            if cache.kind == CacheKind::Memory && cache.max_entries == 0 {
                return Err(AuthError::Config(format!(
                    "cache slot '{}' must allow at least one entry",
                    cache.name
                )));
            }
        }

        Ok(())
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.trim().is_empty())
    }

    fn require(&self, key: &str) -> Result<String, AuthError> {
        self.get(key)
            .ok_or_else(|| AuthError::Config(format!("missing environment variable {key}")))
    }

    fn url(&self, key: &str) -> Result<Option<Url>, AuthError> {
        self.get(key)
            .map(|v| parse_url(key, &v))
            .transpose()
    }

    fn required_url(&self, key: &str) -> Result<Url, AuthError> {
        parse_url(key, &self.require(key)?)
    }

    fn provider_settings(&self, name: &str) -> Result<ProviderSettings, AuthError> {
        let prefix = format!("{ENV_PREFIX}_{}", env_name(name));
        let key = |suffix: &str| format!("{prefix}_{suffix}");

        Ok(ProviderSettings {
            name: name.to_string(),
            provider_uri: self.required_url(&key("PROVIDER_URI"))?,
            client_id: self.require(&key("CLIENT_ID"))?,
            client_secret: self.get(&key("CLIENT_SECRET")),
            redirect_uri: self.required_url(&key("REDIRECT_URI"))?,
            config_uri: self.get(&key("CONFIG_URI")),
            redirect_failure_uri: self.url(&key("REDIRECT_FAILURE_URI"))?,
            redirect_logout_uri: self.url(&key("REDIRECT_LOGOUT_URI"))?,
            redirect_success_default_uri: self.url(&key("REDIRECT_SUCCESS_DEFAULT_URI"))?,
            redirect_requires_https: self
                .get(&key("REDIRECT_REQUIRES_HTTPS"))
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            redirect_allowed_hosts: self
                .get(&key("REDIRECT_ALLOWED_HOSTS"))
                .map(|v| split_list(&v))
                .unwrap_or_default(),
            scope: self
                .get(&key("SCOPE"))
                .unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            cache_backend: self
                .get(&key("CACHE_BACKEND"))
                .unwrap_or_else(|| DEFAULT_CACHE_BACKEND.to_string()),
        })
    }

    fn cache_settings(&self, name: &str) -> Result<CacheSettings, AuthError> {
        let prefix = format!("{ENV_PREFIX}_CACHE_{}", env_name(name));
        let key = |suffix: &str| format!("{prefix}_{suffix}");

        let kind = match self.get(&key("URL")) {
            None => CacheKind::Memory,
            Some(url) if url == "memory" => CacheKind::Memory,
            Some(url) if url.starts_with("redis://") || url.starts_with("rediss://") => {
                CacheKind::Redis(url)
            }
            Some(url) => {
                return Err(AuthError::Config(format!(
                    "{}: unsupported cache URL '{}'",
                    key("URL"),
                    url
                )))
            }
        };

        let max_entries = match self.get(&key("MAX_ENTRIES")) {
            Some(v) => v.parse::<usize>().map_err(|e| {
                AuthError::Config(format!("{}: {}", key("MAX_ENTRIES"), e))
            })?,
            None => DEFAULT_CACHE_MAX_ENTRIES,
        };

        let default_ttl = self
            .get(&key("TTL_SECONDS"))
            .map(|v| {
                v.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|e| AuthError::Config(format!("{}: {}", key("TTL_SECONDS"), e)))
            })
            .transpose()?;

        Ok(CacheSettings {
            name: name.to_string(),
            kind,
            max_entries,
            default_ttl,
        })
    }
}

const RELATIVE_BASE_HOST: &str = "relative.invalid";

/// Whether a relative target resolves to the page it is relative to.
fn stays_on_origin(target: &str) -> bool {
    Url::parse(&format!("https://{RELATIVE_BASE_HOST}/"))
        .and_then(|base| base.join(target))
        .is_ok_and(|url| url.host_str() == Some(RELATIVE_BASE_HOST))
}

fn env_name(name: &str) -> String {
    name.to_ascii_uppercase().replace('-', "_")
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_url(key: &str, value: &str) -> Result<Url, AuthError> {
    value
        .parse()
        .map_err(|e| AuthError::Config(format!("{key} must be a valid URL: {e}")))
}
