//! Application scoped state.

use crate::{bail, error::Error, extension::TomlTableExt, i18n::Dictionary, locale::LocaleConfig};
use std::{
    fs,
    path::{Path, PathBuf},
};
use toml::value::Table;

mod env;

pub use env::Env;

/// A state is a record of the env and config.
///
/// There is no global instance: callers load a state once at startup and pass
/// references to it where they are needed.
#[derive(Debug, Clone, Default)]
pub struct State {
    /// Environment.
    env: Env,
    /// Configuration.
    config: Table,
}

impl State {
    /// Creates a new instance with an empty config.
    #[inline]
    pub fn new(env: Env) -> Self {
        Self {
            env,
            config: Table::new(),
        }
    }

    /// Creates a new instance with the given config.
    #[inline]
    pub fn with_config(env: Env, config: Table) -> Self {
        Self { env, config }
    }

    /// Loads `config.{env}.toml` from the config directory.
    pub fn load(env: Env, config_dir: impl AsRef<Path>) -> Result<Self, Error> {
        let config_file = config_dir.as_ref().join(env.config_file_name());
        let mut state = Self::new(env);
        state.load_config(&config_file)?;
        Ok(state)
    }

    /// Reads the config from a local file, replacing the current config.
    ///
    /// Files with the `json` extension are parsed as JSON, all others as TOML.
    pub fn load_config(&mut self, config_file: &Path) -> Result<(), Error> {
        let data = fs::read_to_string(config_file).map_err(|err| {
            let config_file = config_file.display();
            Error::with_source(format!("fail to read the config file `{config_file}`"), err)
        })?;
        let config = match config_file.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str::<Table>(&data)?,
            _ => data.parse::<Table>()?,
        };
        if let Some(file_name) = config_file.file_name().and_then(|s| s.to_str()) {
            tracing::info!(env = self.env.as_str(), "`{file_name}` loaded");
        }
        self.config = config;
        Ok(())
    }

    /// Returns the env.
    #[inline]
    pub fn env(&self) -> Env {
        self.env
    }

    /// Returns a reference to the config.
    #[inline]
    pub fn config(&self) -> &Table {
        &self.config
    }

    /// Returns the config table corresponding to the key.
    #[inline]
    pub fn get_config(&self, key: &str) -> Option<&Table> {
        self.config.get_table(key)
    }

    /// Parses the `[i18n]` table as a locale config.
    pub fn locale_config(&self) -> Result<LocaleConfig, Error> {
        let Some(config) = self.get_config("i18n") else {
            bail!("the `i18n` table should be configured");
        };
        LocaleConfig::from_table(config)
    }

    /// Loads the dictionaries in the `i18n.dictionary-dir` directory,
    /// which is resolved relative to the config directory.
    pub fn load_dictionary(&self, config_dir: impl AsRef<Path>) -> Result<Dictionary, Error> {
        let locale_config = self.locale_config()?;
        let Some(dir) = locale_config.dictionary_dir() else {
            return Ok(Dictionary::new());
        };
        let dir = self.parse_path(config_dir, dir);
        let dictionary = Dictionary::load_dir(&dir)?;
        for locale in locale_config.locales() {
            if dictionary.table(locale).is_none() {
                tracing::warn!(
                    locale = locale.as_str(),
                    "no dictionary for the available locale"
                );
            }
        }
        Ok(dictionary)
    }

    /// Resolves a path relative to the config directory.
    pub fn parse_path(&self, config_dir: impl AsRef<Path>, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            config_dir.as_ref().join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Env, State};
    use std::fs;

    #[test]
    fn it_loads_config_files() {
        let config_dir = tempfile::tempdir().unwrap();
        let config_dir = config_dir.path();
        fs::write(
            config_dir.join("config.dev.toml"),
            r#"
                [i18n]
                locales = ["en", "de"]
                default-locale = "en"
                dictionary-dir = "locale"
            "#,
        )
        .unwrap();
        fs::create_dir_all(config_dir.join("locale")).unwrap();
        fs::write(config_dir.join("locale/en.json"), r#"{ "title": "Home" }"#).unwrap();

        let state = State::load(Env::Dev, config_dir).unwrap();
        assert!(state.env().is_dev());
        let locale_config = state.locale_config().unwrap();
        assert_eq!(locale_config.default_locale(), "en");
        assert_eq!(locale_config.locales(), ["en", "de"]);

        let dictionary = state.load_dictionary(config_dir).unwrap();
        assert_eq!(dictionary.locales().collect::<Vec<_>>(), ["en"]);

        let err = State::load(Env::Prod, config_dir).unwrap_err();
        assert!(err.message().starts_with("fail to read the config file"));
        assert!(err.source().is_some());
    }

    #[test]
    fn it_loads_json_config_files() {
        let config_dir = tempfile::tempdir().unwrap();
        let config_file = config_dir.path().join("config.json");
        fs::write(&config_file, r#"{ "i18n": { "locales": ["fr"] } }"#).unwrap();

        let mut state = State::new(Env::Prod);
        state.load_config(&config_file).unwrap();
        assert_eq!(state.env().as_str(), "prod");
        assert_eq!(state.locale_config().unwrap().default_locale(), "fr");
    }

    #[test]
    fn it_requires_i18n_table() {
        let state = State::new(Env::Prod);
        assert!(state.locale_config().is_err());
        assert!(state.get_config("i18n").is_none());
    }
}
