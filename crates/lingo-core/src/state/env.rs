use crate::{bail, error::Error};
use std::{fmt, str::FromStr};

/// Running environment of an application.
///
/// It selects the `config.{env}.toml` file and the defaults for logging and caching.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Env {
    /// Local development: pretty logs and no response caching.
    #[default]
    Dev,
    /// Production deployment.
    Prod,
}

impl Env {
    /// Name of the environment variable read by [`Env::from_env_var`].
    pub const VAR_NAME: &'static str = "LINGO_ENV";

    /// Reads the env from the `LINGO_ENV` variable, falling back to `dev` if unset.
    pub fn from_env_var() -> Result<Self, Error> {
        match std::env::var(Self::VAR_NAME) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Returns `true` for the development environment.
    #[inline]
    pub fn is_dev(self) -> bool {
        self == Self::Dev
    }

    /// Returns the short name used in config file names.
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::Prod => "prod",
        }
    }

    /// Returns the name of the config file for the env.
    #[inline]
    pub fn config_file_name(self) -> String {
        format!("config.{}.toml", self.as_str())
    }
}

impl fmt::Display for Env {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Env {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Self::Dev),
            "prod" | "production" => Ok(Self::Prod),
            _ => bail!("unknown env `{}`", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Env;

    #[test]
    fn it_parses_env_names() {
        assert_eq!("dev".parse::<Env>().unwrap(), Env::Dev);
        assert_eq!(" Production ".parse::<Env>().unwrap(), Env::Prod);
        assert!("staging".parse::<Env>().is_err());
        assert_eq!(Env::default().to_string(), "dev");
        assert_eq!(Env::Prod.config_file_name(), "config.prod.toml");
        assert!(Env::Dev.is_dev() && !Env::Prod.is_dev());
    }
}
