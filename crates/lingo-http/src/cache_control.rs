//! `Cache-Control` policies for responses.

use http::{
    HeaderMap, HeaderValue,
    header::CACHE_CONTROL,
};
use lingo_core::{error::Error, extension::TomlTableExt, state::Env};
use std::fmt;
use toml::Table;

/// Default `max-age` in seconds.
const DEFAULT_MAX_AGE: u64 = 300;

/// Default `s-maxage` in seconds.
const DEFAULT_S_MAXAGE: u64 = 600;

/// A `Cache-Control` policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheControl {
    /// Responses must not be cached.
    NoStore,
    /// Responses may be cached by browsers and shared caches.
    Public {
        /// `max-age` in seconds.
        max_age: u64,
        /// `s-maxage` in seconds.
        s_maxage: u64,
    },
}

impl CacheControl {
    /// Parses the `[cache-control]` table.
    pub fn from_table(config: &Table) -> Self {
        if config.get_bool("enabled") == Some(false) {
            return Self::NoStore;
        }
        Self::Public {
            max_age: config.get_u64("max-age").unwrap_or(DEFAULT_MAX_AGE),
            s_maxage: config.get_u64("s-maxage").unwrap_or(DEFAULT_S_MAXAGE),
        }
    }

    /// Returns the policy for the environment.
    /// Caching is always disabled in the `dev` environment.
    pub fn for_env(env: Env, config: Option<&Table>) -> Self {
        if env.is_dev() {
            Self::NoStore
        } else {
            config.map(Self::from_table).unwrap_or_default()
        }
    }

    /// Returns the header value.
    #[inline]
    pub fn header_value(&self) -> Result<HeaderValue, Error> {
        HeaderValue::try_from(self.to_string()).map_err(Error::from)
    }

    /// Sets the `cache-control` header.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), Error> {
        headers.insert(CACHE_CONTROL, self.header_value()?);
        Ok(())
    }
}

impl Default for CacheControl {
    #[inline]
    fn default() -> Self {
        Self::Public {
            max_age: DEFAULT_MAX_AGE,
            s_maxage: DEFAULT_S_MAXAGE,
        }
    }
}

impl From<bool> for CacheControl {
    #[inline]
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::default()
        } else {
            Self::NoStore
        }
    }
}

impl fmt::Display for CacheControl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::NoStore => write!(f, "no-cache, no-store, must-revalidate"),
            Self::Public { max_age, s_maxage } => write!(
                f,
                "public, max-age={max_age}, s-maxage={s_maxage}, stale-while-revalidate"
            ),
        }
    }
}
