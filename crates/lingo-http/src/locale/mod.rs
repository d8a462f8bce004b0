//! Locale negotiation for requests.
//!
//! The negotiator inspects the locale query parameter, the locale cookie and
//! the `accept-language` header of a request, and decides whether the request
//! may continue or should be redirected to a URL carrying the right locale.
//! Either way the chosen locale is recorded in a response header and a cookie.

use crate::helper;
use cookie::Cookie;
use http::{
    HeaderMap, HeaderName, HeaderValue, Response, StatusCode, Uri,
    header::{ACCEPT_LANGUAGE, LOCATION, SET_COOKIE},
    request::Parts,
};
use lingo_core::{
    error::Error,
    locale::{AcceptLanguage, LocaleConfig},
};

/// What to do with a request after the locale has been negotiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleAction {
    /// Pass the request on to the next handler.
    Continue,
    /// Redirect to the URI with `302 Found`.
    Redirect(Uri),
}

/// The result of negotiating the locale of a request.
#[derive(Debug, Clone)]
pub struct LocaleOutcome {
    /// Chosen locale.
    locale: String,
    /// Action to take.
    action: LocaleAction,
    /// Response header which carries the locale.
    header_name: HeaderName,
    /// Cookie which records the locale.
    cookie: Cookie<'static>,
}

impl LocaleOutcome {
    /// Returns the chosen locale.
    #[inline]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Returns the action to take.
    #[inline]
    pub fn action(&self) -> &LocaleAction {
        &self.action
    }

    /// Returns `true` if the request should be redirected.
    #[inline]
    pub fn is_redirect(&self) -> bool {
        matches!(self.action, LocaleAction::Redirect(_))
    }

    /// Returns the URI to redirect to.
    #[inline]
    pub fn redirect_uri(&self) -> Option<&Uri> {
        match &self.action {
            LocaleAction::Redirect(uri) => Some(uri),
            LocaleAction::Continue => None,
        }
    }

    /// Returns the cookie which records the locale.
    #[inline]
    pub fn cookie(&self) -> &Cookie<'static> {
        &self.cookie
    }

    /// Sets the locale header and appends the locale cookie to the response headers.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<(), Error> {
        let locale = HeaderValue::from_str(&self.locale)
            .map_err(|err| Error::with_source(format!("invalid locale `{}`", self.locale), err))?;
        let cookie = HeaderValue::try_from(self.cookie.to_string())?;
        headers.insert(self.header_name.clone(), locale);
        headers.append(SET_COOKIE, cookie);
        Ok(())
    }

    /// Converts a redirect outcome into a `302 Found` response,
    /// or returns `None` if the request should continue.
    pub fn into_redirect(self) -> Result<Option<Response<()>>, Error> {
        let Some(uri) = self.redirect_uri() else {
            return Ok(None);
        };
        let location = HeaderValue::try_from(uri.to_string())?;
        let mut response = Response::new(());
        *response.status_mut() = StatusCode::FOUND;
        let headers = response.headers_mut();
        headers.insert(LOCATION, location);
        self.apply(headers)?;
        Ok(Some(response))
    }
}

/// Negotiates the locale of requests.
#[derive(Debug, Clone)]
pub struct LocaleNegotiator {
    /// Locale config.
    config: LocaleConfig,
    /// Response header which carries the locale.
    header_name: HeaderName,
}

impl LocaleNegotiator {
    /// Creates a new instance.
    pub fn new(config: LocaleConfig) -> Result<Self, Error> {
        let header_name = HeaderName::from_bytes(config.header_name().as_bytes()).map_err(|err| {
            let header_name = config.header_name();
            Error::with_source(format!("invalid locale header name `{header_name}`"), err)
        })?;
        Ok(Self {
            config,
            header_name,
        })
    }

    /// Returns the locale config.
    #[inline]
    pub fn config(&self) -> &LocaleConfig {
        &self.config
    }

    /// Negotiates the locale for the request.
    ///
    /// - Without a locale query parameter, the locale cookie is used. A cookie
    ///   locale other than the default one redirects to the URL with the query
    ///   parameter; no cookie at all continues with the default locale.
    /// - An unsupported query parameter is replaced by the best match for the
    ///   `accept-language` header.
    /// - The default locale is removed from the URL.
    /// - Any other supported locale continues as it is.
    pub fn negotiate(&self, parts: &Parts) -> Result<LocaleOutcome, Error> {
        let config = &self.config;
        let default_locale = config.default_locale();
        let search_param = config.search_param();
        let uri = &parts.uri;
        let query_locale = helper::get_query_param(uri, search_param);
        let (locale, action) = match query_locale {
            None => match helper::get_cookie(&parts.headers, config.cookie_name()) {
                None => (default_locale.to_owned(), LocaleAction::Continue),
                Some(cookie) if cookie.value() != default_locale => {
                    let locale = cookie.value();
                    let redirect_uri = helper::with_query_param(uri, search_param, Some(locale))?;
                    (locale.to_owned(), LocaleAction::Redirect(redirect_uri))
                }
                Some(cookie) => (cookie.value().to_owned(), LocaleAction::Continue),
            },
            Some(locale) if !config.is_supported(&locale) => {
                let accept_language = match parts.headers.get(ACCEPT_LANGUAGE) {
                    Some(value) => value
                        .to_str()
                        .map(AcceptLanguage::Value)
                        .unwrap_or(AcceptLanguage::Null),
                    None => AcceptLanguage::Absent,
                };
                let matched = config.select_language(accept_language);
                tracing::debug!(
                    requested = locale.as_str(),
                    matched,
                    "unsupported locale replaced"
                );
                let redirect_uri = helper::with_query_param(uri, search_param, Some(matched))?;
                (matched.to_owned(), LocaleAction::Redirect(redirect_uri))
            }
            Some(locale) if locale == default_locale => {
                let redirect_uri = helper::with_query_param(uri, search_param, None)?;
                (locale, LocaleAction::Redirect(redirect_uri))
            }
            Some(locale) => (locale, LocaleAction::Continue),
        };

        let max_age = config.cookie_max_age();
        let cookie = helper::build_cookie(config.cookie_name(), &locale, Some(max_age));
        tracing::debug!(
            locale = locale.as_str(),
            redirect = matches!(action, LocaleAction::Redirect(_)),
            "locale negotiated"
        );
        Ok(LocaleOutcome {
            locale,
            action,
            header_name: self.header_name.clone(),
            cookie,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{LocaleAction, LocaleNegotiator, LocaleOutcome};
    use http::{
        HeaderValue, Request, StatusCode,
        header::{ACCEPT_LANGUAGE, COOKIE, LOCATION, SET_COOKIE},
        request::Parts,
    };
    use lingo_core::locale::LocaleConfig;
    use std::time::Duration;

    fn redirect_location(outcome: &LocaleOutcome) -> Option<String> {
        outcome.redirect_uri().map(|uri| uri.to_string())
    }

    fn negotiator() -> LocaleNegotiator {
        let mut config = LocaleConfig::new(["en", "de"], "en").unwrap();
        config.set_cookie_max_age(Duration::from_secs(3600));
        LocaleNegotiator::new(config).unwrap()
    }

    fn request_parts(uri: &str, cookie: Option<&str>, accept_language: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(COOKIE, cookie);
        }
        if let Some(accept_language) = accept_language {
            builder = builder.header(ACCEPT_LANGUAGE, accept_language);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn it_sets_default_locale_if_none_present() {
        let parts = request_parts("https://example.com/", None, Some("de"));
        let outcome = negotiator().negotiate(&parts).unwrap();
        assert_eq!(outcome.locale(), "en");
        assert_eq!(outcome.action(), &LocaleAction::Continue);

        let mut headers = http::HeaderMap::new();
        outcome.apply(&mut headers).unwrap();
        assert_eq!(headers["x-locale"], "en");
        assert_eq!(headers[SET_COOKIE], "locale=en; Path=/; Max-Age=3600");
    }

    #[test]
    fn it_redirects_if_cookie_locale_is_not_default() {
        let parts = request_parts("https://example.com/books?page=2", Some("locale=de"), None);
        let outcome = negotiator().negotiate(&parts).unwrap();
        assert_eq!(outcome.locale(), "de");
        assert_eq!(
            redirect_location(&outcome).as_deref(),
            Some("https://example.com/books?page=2&lang=de")
        );

        let response = outcome.into_redirect().unwrap().unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "https://example.com/books?page=2&lang=de");
        assert_eq!(response.headers()["x-locale"], "de");
    }

    #[test]
    fn it_continues_if_cookie_locale_is_default() {
        let parts = request_parts("/", Some("theme=dark; locale=en"), None);
        let outcome = negotiator().negotiate(&parts).unwrap();
        assert_eq!(outcome.locale(), "en");
        assert!(!outcome.is_redirect());
        assert!(outcome.into_redirect().unwrap().is_none());
    }

    #[test]
    fn it_matches_unsupported_locale_param() {
        let parts = request_parts("/?lang=fr", None, Some("fr;q=0.9, de-AT;q=0.8, en;q=0.1"));
        let outcome = negotiator().negotiate(&parts).unwrap();
        assert_eq!(outcome.locale(), "de");
        assert_eq!(redirect_location(&outcome).as_deref(), Some("/?lang=de"));

        let parts = request_parts("/?lang=fr", Some("locale=de"), None);
        let outcome = negotiator().negotiate(&parts).unwrap();
        assert_eq!(outcome.locale(), "en");
        assert_eq!(redirect_location(&outcome).as_deref(), Some("/?lang=en"));
    }

    #[test]
    fn it_treats_opaque_accept_language_as_null() {
        let parts = request_parts("/?lang=fr", None, Some("de"));
        let outcome = negotiator().negotiate(&parts).unwrap();
        assert_eq!(outcome.locale(), "de");

        let mut parts = request_parts("/?lang=fr", None, None);
        let value = HeaderValue::from_bytes(b"de, fr-\xe4").unwrap();
        assert!(value.to_str().is_err());
        parts.headers.insert(ACCEPT_LANGUAGE, value);
        let outcome = negotiator().negotiate(&parts).unwrap();
        assert_eq!(outcome.locale(), "en");
        assert_eq!(redirect_location(&outcome).as_deref(), Some("/?lang=en"));
    }

    #[test]
    fn it_removes_default_locale_param() {
        let parts = request_parts("/books?lang=en&page=3", None, None);
        let outcome = negotiator().negotiate(&parts).unwrap();
        assert_eq!(outcome.locale(), "en");
        assert_eq!(redirect_location(&outcome).as_deref(), Some("/books?page=3"));
    }

    #[test]
    fn it_passes_through_supported_locale_param() {
        let parts = request_parts("/books?lang=de", Some("locale=en"), None);
        let outcome = negotiator().negotiate(&parts).unwrap();
        assert_eq!(outcome.locale(), "de");
        assert_eq!(outcome.action(), &LocaleAction::Continue);
        assert_eq!(outcome.cookie().value(), "de");
    }

    #[test]
    fn it_rejects_invalid_header_names() {
        let mut config = LocaleConfig::new(["en"], "en").unwrap();
        config.set_header_name("x locale");
        assert!(LocaleNegotiator::new(config).is_err());
    }
}
