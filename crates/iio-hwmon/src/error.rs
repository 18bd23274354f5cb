use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("raw sample file not found: {}", path.display())]
    Missing { path: PathBuf },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("raw sample file is empty: {}", path.display())]
    Empty { path: PathBuf },
    #[error("unparsable raw sample {token:?} in {}", path.display())]
    Parse { path: PathBuf, token: String },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("channel table is empty")]
    Empty,
    #[error("duplicate channel name: {0}")]
    DuplicateName(String),
    #[error("channel name is not a valid path element: {0:?}")]
    InvalidName(String),
    #[error("channel {name}: {field} is not a finite number")]
    NonFinite { name: String, field: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("sample period must be greater than zero")]
    ZeroPeriod,
    #[error("invalid object prefix: {0:?}")]
    InvalidPrefix(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
