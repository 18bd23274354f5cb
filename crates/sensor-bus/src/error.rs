use thiserror::Error;

pub type Result<T, E = BusError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("invalid object path: {0}")]
    InvalidPath(String),
    #[error("object already registered: {0}")]
    AlreadyRegistered(String),
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("failed to claim bus name {name}: {reason}")]
    NameClaim { name: String, reason: String },
    #[error("bus backend error: {0}")]
    Backend(String),
}

#[cfg(feature = "dbus")]
impl From<zbus::Error> for BusError {
    fn from(e: zbus::Error) -> Self {
        BusError::Backend(e.to_string())
    }
}
