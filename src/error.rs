use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The inventory endpoint could not be reached, answered with a non-2xx
    /// status, or returned a body that is not a model list.
    #[error("inventory request to {url} failed")]
    Remote {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("config {}: {reason}", path.display())]
    Config {
        path: PathBuf,
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("failed to read answer from terminal")]
    Prompt(#[from] dialoguer::Error),

    #[error("failed to read answer from stdin")]
    Stdin(#[source] std::io::Error),
}

impl Error {
    pub(crate) fn remote<E>(url: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Remote {
            url: url.into(),
            source: Box::new(source),
        }
    }

    pub(crate) fn config<E>(path: impl Into<PathBuf>, reason: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Config {
            path: path.into(),
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    pub(crate) fn config_msg(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Config {
            path: path.into(),
            reason: reason.into(),
            source: None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Remote { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config { .. })
    }
}
