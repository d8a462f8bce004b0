use super::{Dictionary, render_template};
use crate::{JsonValue, SharedString};
use std::sync::Arc;

/// Translates dictionary messages for a locale.
///
/// The dictionary is shared behind an [`Arc`], so a translator can be created
/// cheaply per request. Adding messages with [`set`](Self::set) copies the
/// dictionary on first write and leaves other translators untouched.
#[derive(Debug, Clone)]
pub struct Translator {
    /// Dictionary of messages.
    dictionary: Arc<Dictionary>,
    /// Active locale.
    locale: String,
}

impl Translator {
    /// Creates a new instance with the active locale.
    #[inline]
    pub fn new(dictionary: Arc<Dictionary>, locale: &str) -> Self {
        Self {
            dictionary,
            locale: locale.to_owned(),
        }
    }

    /// Returns the active locale.
    #[inline]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Sets the active locale if the given one is not empty,
    /// and returns the active locale.
    pub fn set_locale(&mut self, locale: Option<&str>) -> &str {
        if let Some(locale) = locale.filter(|s| !s.is_empty()) {
            self.locale = locale.to_owned();
        }
        &self.locale
    }

    /// Merges the messages into the table of a locale.
    #[inline]
    pub fn set(&mut self, locale: &str, table: JsonValue) {
        Arc::make_mut(&mut self.dictionary).insert(locale, table);
    }

    /// Returns the message tree of a locale.
    #[inline]
    pub fn table(&self, locale: &str) -> Option<&JsonValue> {
        self.dictionary.table(locale)
    }

    /// Translates the message for the active locale.
    #[inline]
    pub fn translate(&self, key: &str, params: Option<&JsonValue>) -> SharedString {
        self.translate_in(key, params, &self.locale)
    }

    /// Translates the message for the given locale.
    ///
    /// String messages are rendered as templates with `params`, while numbers
    /// and booleans are formatted as they are. A missing message yields an
    /// empty string.
    pub fn translate_in(
        &self,
        key: &str,
        params: Option<&JsonValue>,
        locale: &str,
    ) -> SharedString {
        match self.dictionary.lookup(locale, key) {
            Some(JsonValue::String(message)) => {
                let params = params.unwrap_or(&JsonValue::Null);
                render_template(message, params).into()
            }
            Some(value @ (JsonValue::Number(_) | JsonValue::Bool(_))) => value.to_string().into(),
            Some(_) => "".into(),
            None => {
                tracing::debug!(locale, key, "translation message is missing");
                "".into()
            }
        }
    }
}
