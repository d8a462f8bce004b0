use serde::Serialize;

/// The `Accept-Language` header of a request.
///
/// HTTP distinguishes a missing header, which means any language is
/// acceptable, from a header which is present but carries no languages.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum AcceptLanguage<'a> {
    /// The header is absent.
    #[default]
    Absent,
    /// The header is explicitly unset, so no language is acceptable.
    Null,
    /// The raw header value.
    Value(&'a str),
}

impl<'a> From<Option<&'a str>> for AcceptLanguage<'a> {
    #[inline]
    fn from(header: Option<&'a str>) -> Self {
        match header {
            Some(value) => Self::Value(value),
            None => Self::Absent,
        }
    }
}

impl<'a> From<&'a str> for AcceptLanguage<'a> {
    #[inline]
    fn from(value: &'a str) -> Self {
        Self::Value(value)
    }
}

/// A language tag with its quality value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LanguagePreference<'a> {
    /// Language tag as written in the header.
    tag: &'a str,
    /// Quality value.
    quality: f64,
}

impl<'a> LanguagePreference<'a> {
    /// The wildcard preference which accepts any language.
    pub const WILDCARD: LanguagePreference<'static> = LanguagePreference {
        tag: "*",
        quality: 1.0,
    };

    /// Parses an entry of the form `tag[;q=value][;param=value]*`.
    ///
    /// A `q` parameter which is not a finite number is treated as absent,
    /// so the entry keeps the default quality `1`. Other parameters are ignored.
    pub fn parse(entry: &'a str) -> Option<Self> {
        let mut parts = entry.split(';');
        let tag = parts.next()?.trim();
        if tag.is_empty()
            || tag.starts_with('-')
            || tag.ends_with('-')
            || tag.contains(char::is_whitespace)
        {
            return None;
        }

        let mut quality = 1.0;
        for param in parts {
            if let Some((key, value)) = param.split_once('=')
                && key.trim() == "q"
            {
                quality = value
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|q| q.is_finite())
                    .unwrap_or(1.0);
            }
        }
        Some(Self { tag, quality })
    }

    /// Returns the language tag.
    #[inline]
    pub fn tag(&self) -> &'a str {
        self.tag
    }

    /// Returns the quality value.
    #[inline]
    pub fn quality(&self) -> f64 {
        self.quality
    }

    /// Returns `true` if the language has been explicitly rejected with `q=0`.
    #[inline]
    pub fn is_rejected(&self) -> bool {
        self.quality == 0.0
    }
}

/// Parses the `Accept-Language` header into language preferences
/// sorted by descending quality.
///
/// Entries with the same quality keep the order in which they appear,
/// and rejected entries with `q=0` are dropped.
pub fn parse_accept_language(header: AcceptLanguage<'_>) -> Vec<LanguagePreference<'_>> {
    let value = match header {
        AcceptLanguage::Absent => return vec![LanguagePreference::WILDCARD],
        AcceptLanguage::Null => return Vec::new(),
        AcceptLanguage::Value(value) => value,
    };
    let mut preferences = value
        .split(',')
        .filter_map(LanguagePreference::parse)
        .filter(|preference| !preference.is_rejected())
        .collect::<Vec<_>>();

    // `sort_by` is stable, which keeps the first-seen order on ties.
    preferences.sort_by(|a, b| b.quality.total_cmp(&a.quality));
    preferences
}

/// Returns the language tags of the `Accept-Language` header ordered by preference.
///
/// A missing header (`None`) yields the wildcard `["*"]`, while an empty
/// header yields no languages. Use [`parse_accept_language`] with
/// [`AcceptLanguage::Null`] for a header that is explicitly unset.
pub fn preferred_languages<'a>(header: impl Into<AcceptLanguage<'a>>) -> Vec<String> {
    parse_accept_language(header.into())
        .into_iter()
        .map(|preference| preference.tag.to_owned())
        .collect()
}
