//! Type-erased errors with tracing functionalities.

use crate::SharedString;
use std::{error, fmt, iter};

/// An error type backed by an allocation-optimized string.
#[derive(Debug)]
pub struct Error {
    /// Error message.
    message: SharedString,
    /// Error source.
    source: Option<Box<Error>>,
}

impl Error {
    /// Creates a new instance with the supplied message.
    #[inline]
    pub fn new(message: impl Into<SharedString>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new instance with the supplied message and the error source.
    #[inline]
    pub fn with_source(message: impl Into<SharedString>, source: impl Into<Error>) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source.into())),
        }
    }

    /// Creates a new instance and records it as a warning event.
    #[doc(hidden)]
    pub fn warn(message: impl Into<SharedString>) -> Self {
        let message = message.into();
        tracing::warn!("{message}");
        Self::new(message)
    }

    /// Returns a new instance with the supplied message and `self` as the error source.
    #[inline]
    pub fn wrap(self, message: impl Into<SharedString>) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(self)),
        }
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        self.message.as_ref()
    }

    /// Returns the source.
    #[inline]
    pub fn source(&self) -> Option<&Error> {
        self.source.as_deref()
    }

    /// Returns an iterator of the error itself followed by its sources.
    #[inline]
    pub fn sources(&self) -> impl Iterator<Item = &Error> {
        iter::successors(Some(self), |err| err.source())
    }

    /// Returns the lowest level source, or `None` if there is no source.
    #[inline]
    pub fn root_source(&self) -> Option<&Error> {
        self.sources().skip(1).last()
    }
}

impl<E: error::Error + 'static> From<E> for Error {
    #[inline]
    fn from(err: E) -> Self {
        Self {
            message: err.to_string().into(),
            source: err.source().map(|err| Box::new(Self::new(err.to_string()))),
        }
    }
}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = &self.message;
        if let Some(source) = &self.source {
            write!(f, "{message}: {source}")
        } else {
            write!(f, "{message}")
        }
    }
}

/// Returns early with an [`Error`].
#[macro_export]
macro_rules! bail {
    ($message:literal $(,)?) => {
        return Err($crate::error::Error::new(format!($message)))
    };
    ($fmt:expr, $($arg:tt)+) => {
        return Err($crate::error::Error::new(format!($fmt, $($arg)+)))
    };
}

/// Constructs an [`Error`] and emits a warning event with the same message.
#[macro_export]
macro_rules! warn {
    ($message:literal $(,)?) => {
        $crate::error::Error::warn(format!($message))
    };
    ($fmt:expr, $($arg:tt)+) => {
        $crate::error::Error::warn(format!($fmt, $($arg)+))
    };
}
