use super::{AcceptLanguage, match_locale, parse_accept_language};
use crate::{bail, error::Error, extension::TomlTableExt};
use std::{path::PathBuf, time::Duration};
use toml::value::Table;

/// Default name of the cookie which records the chosen locale.
const DEFAULT_COOKIE_NAME: &str = "locale";

/// Default name of the response header which carries the chosen locale.
const DEFAULT_HEADER_NAME: &str = "x-locale";

/// Default name of the query parameter which overrides the locale.
const DEFAULT_SEARCH_PARAM: &str = "lang";

/// Default max age of the locale cookie: one year.
const DEFAULT_COOKIE_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// Locales supported by an application and how the chosen one is recorded.
#[derive(Debug, Clone)]
pub struct LocaleConfig {
    /// Available locales.
    locales: Vec<String>,
    /// Default locale, always a member of `locales`.
    default_locale: String,
    /// Cookie name.
    cookie_name: String,
    /// Response header name.
    header_name: String,
    /// Query parameter name.
    search_param: String,
    /// Max age of the cookie.
    cookie_max_age: Duration,
    /// Directory of the `<locale>.json` dictionaries.
    dictionary_dir: Option<PathBuf>,
}

impl LocaleConfig {
    /// Creates a new instance.
    ///
    /// The list of locales must not be empty. A default locale which is not
    /// one of them is replaced by the first locale.
    pub fn new<I, S>(locales: I, default_locale: &str) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let locales = locales
            .into_iter()
            .map(|locale| locale.into())
            .filter(|locale| !locale.trim().is_empty())
            .collect::<Vec<_>>();
        let Some(first_locale) = locales.first() else {
            bail!("at least one locale should be available");
        };
        let default_locale = if locales.iter().any(|locale| locale == default_locale) {
            default_locale.to_owned()
        } else {
            tracing::warn!(
                default_locale,
                "default locale is not available; `{first_locale}` is used instead"
            );
            first_locale.clone()
        };
        Ok(Self {
            locales,
            default_locale,
            cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
            header_name: DEFAULT_HEADER_NAME.to_owned(),
            search_param: DEFAULT_SEARCH_PARAM.to_owned(),
            cookie_max_age: DEFAULT_COOKIE_MAX_AGE,
            dictionary_dir: None,
        })
    }

    /// Parses the config from the `[i18n]` table.
    ///
    /// ```toml
    /// [i18n]
    /// locales = ["en", "de"]
    /// default-locale = "en"
    /// cookie-name = "locale"
    /// header-name = "x-locale"
    /// search-param = "lang"
    /// cookie-max-age = 31536000
    /// dictionary-dir = "locale"
    /// ```
    pub fn from_table(config: &Table) -> Result<Self, Error> {
        let Some(locales) = config.get_str_array("locales") else {
            bail!("the `i18n.locales` field should be an array of strings");
        };
        let default_locale = config
            .get_str("default-locale")
            .or_else(|| locales.first().copied())
            .unwrap_or_default();
        let mut locale_config = Self::new(locales.iter().copied(), default_locale)?;
        if let Some(cookie_name) = config.get_str("cookie-name") {
            locale_config.set_cookie_name(cookie_name);
        }
        if let Some(header_name) = config.get_str("header-name") {
            locale_config.set_header_name(header_name);
        }
        if let Some(search_param) = config.get_str("search-param") {
            locale_config.set_search_param(search_param);
        }
        if let Some(max_age) = config.get_duration_secs("cookie-max-age") {
            locale_config.set_cookie_max_age(max_age);
        }
        if let Some(dir) = config.get_str("dictionary-dir") {
            locale_config.dictionary_dir = Some(dir.into());
        }
        Ok(locale_config)
    }

    /// Sets the cookie name.
    #[inline]
    pub fn set_cookie_name(&mut self, cookie_name: &str) {
        self.cookie_name = cookie_name.to_owned();
    }

    /// Sets the response header name.
    #[inline]
    pub fn set_header_name(&mut self, header_name: &str) {
        self.header_name = header_name.to_ascii_lowercase();
    }

    /// Sets the query parameter name.
    #[inline]
    pub fn set_search_param(&mut self, search_param: &str) {
        self.search_param = search_param.to_owned();
    }

    /// Sets the max age of the cookie.
    #[inline]
    pub fn set_cookie_max_age(&mut self, max_age: Duration) {
        self.cookie_max_age = max_age;
    }

    /// Returns the available locales.
    #[inline]
    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// Returns the default locale.
    #[inline]
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Returns the cookie name.
    #[inline]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Returns the response header name.
    #[inline]
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Returns the query parameter name.
    #[inline]
    pub fn search_param(&self) -> &str {
        &self.search_param
    }

    /// Returns the max age of the cookie.
    #[inline]
    pub fn cookie_max_age(&self) -> Duration {
        self.cookie_max_age
    }

    /// Returns the directory of the dictionaries.
    #[inline]
    pub fn dictionary_dir(&self) -> Option<&PathBuf> {
        self.dictionary_dir.as_ref()
    }

    /// Returns `true` if the locale is one of the available locales.
    ///
    /// The comparison is exact; use [`match_locale`] for case folding and fallbacks.
    #[inline]
    pub fn is_supported(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }

    /// Matches the requested language tags against the available locales.
    #[inline]
    pub fn match_locale<S: AsRef<str>>(&self, requested: &[S]) -> &str {
        match_locale(requested, &self.locales, &self.default_locale)
    }

    /// Selects the best available locale for the `Accept-Language` header.
    pub fn select_language(&self, header: AcceptLanguage<'_>) -> &str {
        let languages = parse_accept_language(header)
            .into_iter()
            .map(|preference| preference.tag())
            .collect::<Vec<_>>();
        self.match_locale(&languages)
    }
}
