//! Double-submit CSRF tokens signed with a server secret.
//!
//! The token lives in a cookie as `<token>|<signature>` where the signature is
//! `hex(sha256(token + hex(sha256(secret))))`. A request is verified if it
//! echoes the token in a header or a form field.

use crate::helper;
use bytes::Bytes;
use cookie::{Cookie, SameSite};
use http::{
    HeaderMap, HeaderName, HeaderValue,
    header::{CONTENT_TYPE, SET_COOKIE},
    request::Parts,
};
use lingo_core::{bail, error::Error, extension::TomlTableExt};
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use toml::Table;
use url::form_urlencoded;

/// Number of random bytes in a token.
const TOKEN_LENGTH: usize = 32;

/// Configuration of CSRF tokens.
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    /// Secret used to sign tokens.
    secret: String,
    /// Cookie which stores the signed token.
    cookie_name: String,
    /// Request header which carries the token.
    header_name: String,
    /// Request header set to `1` or `0` after verification.
    verified_header: String,
    /// Form field which carries the token.
    body_field: String,
}

impl CsrfConfig {
    /// Creates a new instance with the secret and default names.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            cookie_name: "csrf".to_owned(),
            header_name: "x-csrf-token".to_owned(),
            verified_header: "x-csrf-verified".to_owned(),
            body_field: "csrf_token".to_owned(),
        }
    }

    /// Parses the `[csrf]` table.
    pub fn from_table(config: &Table) -> Result<Self, Error> {
        let Some(secret) = config.get_str("secret").filter(|s| !s.is_empty()) else {
            bail!("the CSRF secret should be specified");
        };
        let mut csrf_config = Self::new(secret);
        if let Some(cookie_name) = config.get_str("cookie-name") {
            csrf_config.cookie_name = cookie_name.to_owned();
        }
        if let Some(header_name) = config.get_str("header-name") {
            csrf_config.header_name = header_name.to_ascii_lowercase();
        }
        if let Some(verified_header) = config.get_str("verified-header") {
            csrf_config.verified_header = verified_header.to_ascii_lowercase();
        }
        if let Some(body_field) = config.get_str("body-field") {
            csrf_config.body_field = body_field.to_owned();
        }
        Ok(csrf_config)
    }

    /// Returns the cookie name.
    #[inline]
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Returns the token header name.
    #[inline]
    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    /// Returns the verified header name.
    #[inline]
    pub fn verified_header(&self) -> &str {
        &self.verified_header
    }

    /// Returns the form field name.
    #[inline]
    pub fn body_field(&self) -> &str {
        &self.body_field
    }
}

/// Issues and verifies CSRF tokens.
#[derive(Debug, Clone)]
pub struct CsrfGuard {
    /// Hex-encoded SHA-256 digest of the secret.
    secret_digest: String,
    /// Cookie name.
    cookie_name: String,
    /// Token header.
    header_name: HeaderName,
    /// Verified header.
    verified_header: HeaderName,
    /// Form field name.
    body_field: String,
}

impl CsrfGuard {
    /// Creates a new instance.
    pub fn new(config: &CsrfConfig) -> Result<Self, Error> {
        let header_name = HeaderName::from_bytes(config.header_name.as_bytes())?;
        let verified_header = HeaderName::from_bytes(config.verified_header.as_bytes())?;
        Ok(Self {
            secret_digest: hex_digest(config.secret.as_bytes()),
            cookie_name: config.cookie_name.clone(),
            header_name,
            verified_header,
            body_field: config.body_field.clone(),
        })
    }

    /// Verifies the request against the token stored in the cookie.
    ///
    /// A missing or tampered cookie yields a fresh token which is never verified.
    pub fn verify(&self, parts: &Parts, body_token: Option<&str>) -> CsrfOutcome {
        let headers = &parts.headers;
        let stored_token = helper::get_cookie(headers, &self.cookie_name)
            .and_then(|cookie| self.unsign(cookie.value()).map(|token| token.to_owned()));
        if let Some(token) = stored_token {
            let header_token = helper::get_header_str(headers, &self.header_name);
            let verified = [header_token, body_token]
                .into_iter()
                .flatten()
                .any(|candidate| bool::from(candidate.as_bytes().ct_eq(token.as_bytes())));
            tracing::debug!(verified, "CSRF token checked");
            CsrfOutcome {
                token,
                verified,
                cookie: None,
                header_name: self.header_name.clone(),
                verified_header: self.verified_header.clone(),
            }
        } else {
            let token = generate_token();
            let secure = parts.uri.scheme_str() == Some("https")
                || helper::get_header_str(headers, "x-forwarded-proto") == Some("https");
            let cookie = Cookie::build((self.cookie_name.clone(), self.sign(&token)))
                .http_only(true)
                .path("/")
                .same_site(SameSite::Lax)
                .secure(secure)
                .build();
            tracing::debug!("CSRF token issued");
            CsrfOutcome {
                token,
                verified: false,
                cookie: Some(cookie),
                header_name: self.header_name.clone(),
                verified_header: self.verified_header.clone(),
            }
        }
    }

    /// Extracts the token from the request body according to its `content-type`.
    ///
    /// Only `multipart/form-data` and `application/x-www-form-urlencoded`
    /// bodies are inspected; any other body yields `None`.
    pub async fn body_token(
        &self,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<Option<String>, Error> {
        let Some(content_type) = helper::get_header_str(headers, CONTENT_TYPE) else {
            return Ok(None);
        };
        let mime_type = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime_type.as_str() {
            "multipart/form-data" => self.body_token_from_multipart(content_type, body).await,
            "application/x-www-form-urlencoded" => Ok(self.body_token_from_form(&body)),
            _ => Ok(None),
        }
    }

    /// Extracts the token from a `multipart/form-data` body.
    ///
    /// Form actions may prefix field names, so the first text field whose name
    /// contains the body field is taken. File fields are skipped.
    pub async fn body_token_from_multipart(
        &self,
        content_type: &str,
        body: Bytes,
    ) -> Result<Option<String>, Error> {
        let body_field = self.body_field.as_str();
        helper::find_text_field(content_type, body, |name| name.contains(body_field)).await
    }

    /// Extracts the token from an `application/x-www-form-urlencoded` body.
    pub fn body_token_from_form(&self, body: &[u8]) -> Option<String> {
        form_urlencoded::parse(body)
            .find(|(key, _)| key == self.body_field.as_str())
            .map(|(_, value)| value.into_owned())
    }

    /// Returns `true` if the verified header of the request is `1`.
    pub fn is_verified(&self, headers: &HeaderMap) -> bool {
        helper::get_header_str(headers, &self.verified_header) == Some("1")
    }

    /// Returns the token which has been set on the request.
    pub fn token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        helper::get_header_str(headers, &self.header_name)
    }

    /// Signs the token as the cookie value.
    fn sign(&self, token: &str) -> String {
        let signature = hex_digest(format!("{token}{}", self.secret_digest).as_bytes());
        format!("{token}|{signature}")
    }

    /// Returns the token if the signature of the cookie value is valid.
    fn unsign<'a>(&self, value: &'a str) -> Option<&'a str> {
        let (token, signature) = value.split_once('|')?;
        let expected = hex_digest(format!("{token}{}", self.secret_digest).as_bytes());
        let valid = signature.as_bytes().ct_eq(expected.as_bytes());
        (!token.is_empty() && bool::from(valid)).then_some(token)
    }
}

/// The result of verifying a request.
#[derive(Debug, Clone)]
pub struct CsrfOutcome {
    /// Token of the session.
    token: String,
    /// Whether the request echoes the token.
    verified: bool,
    /// Cookie to set if a new token was issued.
    cookie: Option<Cookie<'static>>,
    /// Token header.
    header_name: HeaderName,
    /// Verified header.
    verified_header: HeaderName,
}

impl CsrfOutcome {
    /// Returns the token.
    #[inline]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns `true` if the request has been verified.
    #[inline]
    pub fn is_verified(&self) -> bool {
        self.verified
    }

    /// Returns the cookie if a new token was issued.
    #[inline]
    pub fn cookie(&self) -> Option<&Cookie<'static>> {
        self.cookie.as_ref()
    }

    /// Sets the token and the verified headers on the request.
    pub fn apply_to_request(&self, headers: &mut HeaderMap) -> Result<(), Error> {
        let token = HeaderValue::from_str(&self.token)?;
        let verified = HeaderValue::from_static(if self.verified { "1" } else { "0" });
        headers.insert(self.header_name.clone(), token);
        headers.insert(self.verified_header.clone(), verified);
        Ok(())
    }

    /// Appends the cookie to the response if a new token was issued.
    pub fn apply_to_response(&self, headers: &mut HeaderMap) -> Result<(), Error> {
        if let Some(cookie) = &self.cookie {
            headers.append(SET_COOKIE, HeaderValue::try_from(cookie.to_string())?);
        }
        Ok(())
    }
}

/// Generates a random hex-encoded token.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_LENGTH];
    rand::rng().fill(&mut bytes);
    faster_hex::hex_string(&bytes)
}

/// Returns the hex-encoded SHA-256 digest.
fn hex_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    faster_hex::hex_string(hasher.finalize().as_slice())
}

#[cfg(test)]
mod tests {
    use super::{CsrfConfig, CsrfGuard, hex_digest};
    use bytes::Bytes;
    use futures::executor::block_on;
    use http::{
        HeaderMap, HeaderValue, Request,
        header::{CONTENT_TYPE, COOKIE},
        request::Parts,
    };

    fn guard() -> CsrfGuard {
        CsrfGuard::new(&CsrfConfig::new("secret")).unwrap()
    }

    fn request_parts(uri: &str, headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri(uri);
        for &(name, value) in headers {
            builder = builder.header(name, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn it_digests_with_sha256() {
        assert_eq!(
            hex_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn it_issues_new_tokens() {
        let guard = guard();
        let outcome = guard.verify(&request_parts("https://example.com/", &[]), None);
        assert!(!outcome.is_verified());
        assert_eq!(outcome.token().len(), 64);

        let cookie = outcome.cookie().unwrap();
        assert_eq!(cookie.name(), "csrf");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(guard.unsign(cookie.value()), Some(outcome.token()));

        let mut headers = http::HeaderMap::new();
        outcome.apply_to_response(&mut headers).unwrap();
        assert!(headers["set-cookie"].to_str().unwrap().contains("SameSite=Lax"));

        let other = guard.verify(&request_parts("/", &[]), None);
        assert_ne!(other.token(), outcome.token());
        assert_eq!(other.cookie().and_then(|cookie| cookie.secure()), Some(false));
    }

    #[test]
    fn it_verifies_header_and_body_tokens() {
        let guard = guard();
        let cookie = format!("csrf={}", guard.sign("abc123"));
        let headers = [(COOKIE.as_str(), cookie.as_str()), ("x-csrf-token", "abc123")];
        let parts = request_parts("/", &headers);
        let outcome = guard.verify(&parts, None);
        assert!(outcome.is_verified());
        assert!(outcome.cookie().is_none());
        assert_eq!(outcome.token(), "abc123");

        let parts = request_parts("/", &[(COOKIE.as_str(), cookie.as_str())]);
        let body_token = guard.body_token_from_form(b"name=lingo&csrf_token=abc123");
        assert!(guard.verify(&parts, body_token.as_deref()).is_verified());
        assert!(!guard.verify(&parts, Some("abc124")).is_verified());
        assert!(!guard.verify(&parts, None).is_verified());
        assert!(!guard.verify(&parts, Some("abc12")).is_verified());
        assert!(!guard.verify(&parts, Some("abc1234")).is_verified());
    }

    #[test]
    fn it_extracts_body_tokens_by_content_type() {
        let guard = guard();
        let mut headers = HeaderMap::new();
        let body = Bytes::from_static(b"name=lingo&csrf_token=abc123");
        assert_eq!(block_on(guard.body_token(&headers, body.clone())).unwrap(), None);

        let form_type = "application/x-www-form-urlencoded; charset=utf-8";
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(form_type));
        let token = block_on(guard.body_token(&headers, body.clone())).unwrap();
        assert_eq!(token.as_deref(), Some("abc123"));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert_eq!(block_on(guard.body_token(&headers, body)).unwrap(), None);

        let body = Bytes::from_static(
            b"--lingo\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\r\n\
            Hello\r\n\
            --lingo\r\n\
            Content-Disposition: form-data; name=\"1_csrf_token\"\r\n\r\n\
            abc123\r\n\
            --lingo--\r\n",
        );
        let multipart_type = "multipart/form-data; boundary=lingo";
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(multipart_type));
        let token = block_on(guard.body_token(&headers, body)).unwrap();
        assert_eq!(token.as_deref(), Some("abc123"));

        let cookie = format!("csrf={}", guard.sign("abc123"));
        let parts = request_parts("/", &[(COOKIE.as_str(), cookie.as_str())]);
        assert!(guard.verify(&parts, token.as_deref()).is_verified());
    }

    #[test]
    fn it_rejects_tampered_cookies() {
        let guard = guard();
        let signed = CsrfGuard::new(&CsrfConfig::new("other")).unwrap().sign("abc123");
        let cookie = format!("csrf={signed}");
        let headers = [(COOKIE.as_str(), cookie.as_str()), ("x-csrf-token", "abc123")];
        let parts = request_parts("/", &headers);
        let outcome = guard.verify(&parts, None);
        assert!(!outcome.is_verified());
        assert_ne!(outcome.token(), "abc123");
        assert!(outcome.cookie().is_some());
        assert_eq!(guard.unsign("abc123"), None);
    }

    #[test]
    fn it_marks_requests() {
        let guard = guard();
        let cookie = format!("csrf={}", guard.sign("abc123"));
        let parts = request_parts("/", &[(COOKIE.as_str(), cookie.as_str())]);
        let outcome = guard.verify(&parts, Some("abc123"));

        let mut headers = http::HeaderMap::new();
        outcome.apply_to_request(&mut headers).unwrap();
        assert!(guard.is_verified(&headers));
        assert_eq!(guard.token(&headers), Some("abc123"));

        outcome.apply_to_response(&mut headers).unwrap();
        assert!(headers.get("set-cookie").is_none());
    }

    #[test]
    fn it_parses_csrf_table() {
        let table: toml::Table = toml::from_str(
            r#"
            secret = "s3cret"
            cookie-name = "xsrf"
            header-name = "X-XSRF-Token"
            "#,
        )
        .unwrap();
        let config = CsrfConfig::from_table(&table).unwrap();
        assert_eq!(config.cookie_name(), "xsrf");
        assert_eq!(config.header_name(), "x-xsrf-token");
        assert_eq!(config.body_field(), "csrf_token");
        assert!(CsrfConfig::from_table(&toml::Table::new()).is_err());
    }
}
