//! Locale negotiation.
//!
//! Negotiation happens in two steps: [`preferred_languages`] turns an
//! `Accept-Language` header value into language tags ordered by preference,
//! then [`match_locale`] picks the best available locale for those tags.
//! Both are pure functions without shared state.
//!
//! ```rust
//! use lingo_core::locale::{match_locale, preferred_languages};
//!
//! let languages = preferred_languages(Some("en-US;q=0.8, fr, de;q=0.9"));
//! assert_eq!(languages, ["fr", "de", "en-US"]);
//!
//! let locale = match_locale(&["de-u-ca-gregory"], &["en", "de", "fr"], "en");
//! assert_eq!(locale, "de");
//! ```

mod accept_language;
mod config;
mod matcher;

pub use accept_language::{
    AcceptLanguage, LanguagePreference, parse_accept_language, preferred_languages,
};
pub use config::LocaleConfig;
pub use matcher::{canonicalize_locale, match_locale};
