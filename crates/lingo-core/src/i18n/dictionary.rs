use super::lookup_path;
use crate::{JsonValue, Map, error::Error};
use std::{fs, io::ErrorKind, path::Path};

/// Message trees keyed by locale.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    /// Message tree for each locale.
    tables: Map,
}

impl Dictionary {
    /// Creates a new empty dictionary.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new instance from a map of locales to message trees.
    #[inline]
    pub fn from_map(tables: Map) -> Self {
        Self { tables }
    }

    /// Loads the `<locale>.json` files in a directory.
    ///
    /// A missing directory yields an empty dictionary.
    pub fn load_dir(dir: &Path) -> Result<Self, Error> {
        let mut dictionary = Self::new();
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::warn!(dir = %dir.display(), "dictionary directory does not exist");
                return Ok(dictionary);
            }
            Err(err) => {
                let dir = dir.display();
                return Err(Error::with_source(format!("fail to read `{dir}`"), err));
            }
        };
        for entry in entries {
            let file = entry?.path();
            if file.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(locale) = file.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let data = fs::read_to_string(&file)?;
            let table = serde_json::from_str::<JsonValue>(&data).map_err(|err| {
                let file = file.display();
                Error::with_source(format!("fail to parse the dictionary `{file}`"), err)
            })?;
            tracing::info!(locale, "dictionary `{}` loaded", file.display());
            dictionary.insert(locale, table);
        }
        Ok(dictionary)
    }

    /// Inserts the messages for a locale.
    ///
    /// Objects are merged recursively into the existing messages,
    /// while other values replace them.
    pub fn insert(&mut self, locale: &str, table: JsonValue) {
        match self.tables.get_mut(locale) {
            Some(existing) => merge(existing, table),
            None => {
                self.tables.insert(locale.to_owned(), table);
            }
        }
    }

    /// Returns the message tree of a locale.
    #[inline]
    pub fn table(&self, locale: &str) -> Option<&JsonValue> {
        self.tables.get(locale)
    }

    /// Returns an iterator over the locales.
    #[inline]
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|locale| locale.as_str())
    }

    /// Returns `true` if there are no messages.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Looks up the message for a locale by a dot-notated key.
    #[inline]
    pub fn lookup(&self, locale: &str, key: &str) -> Option<&JsonValue> {
        self.table(locale).and_then(|table| lookup_path(table, key))
    }
}

/// Merges `other` into `value` recursively.
fn merge(value: &mut JsonValue, other: JsonValue) {
    match (value, other) {
        (JsonValue::Object(map), JsonValue::Object(other)) => {
            for (key, other_value) in other {
                match map.get_mut(&key) {
                    Some(value) => merge(value, other_value),
                    None => {
                        map.insert(key, other_value);
                    }
                }
            }
        }
        (value, other) => *value = other,
    }
}
