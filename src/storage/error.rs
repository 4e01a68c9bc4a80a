use crate::BoxError;
use derive_more::Display;
use thiserror::Error;

/// The error returned by the filesystem adapter and the mapped-file cache.
#[derive(Debug, Error)]
#[error("storage error: {kind}")]
pub struct Error {
    kind: ErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    /// Creates a new storage error
    pub fn new<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<BoxError>,
    {
        Error {
            kind,
            source: Some(error.into()),
        }
    }

    /// Tells what the FTP server should do with the failure
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error { kind, source: None }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::PermanentFileNotAvailable,
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            _ => ErrorKind::LocalError,
        };
        Error::new(kind, err)
    }
}

/// The `ErrorKind` variants the storage layer can produce. Each carries the
/// FTP reply class the failure surfaces as.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum ErrorKind {
    /// 450 Requested file action not taken.
    ///     File unavailable (e.g., file busy).
    #[display(fmt = "450 Transient file not available")]
    TransientFileNotAvailable,
    /// 550 Requested action not taken.
    ///     File unavailable (e.g., file not found, no access).
    #[display(fmt = "550 Permanent file not available")]
    PermanentFileNotAvailable,
    /// 550 Requested action not taken.
    ///     File unavailable (no access).
    #[display(fmt = "550 Permission denied")]
    PermissionDenied,
    /// 451 Requested action aborted. Local error in processing.
    #[display(fmt = "451 Local error")]
    LocalError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn io_errors_classify_by_kind() {
        let not_found = Error::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(not_found.kind(), ErrorKind::PermanentFileNotAvailable);

        let denied = Error::from(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert_eq!(denied.kind(), ErrorKind::PermissionDenied);

        let other = Error::from(std::io::Error::from(std::io::ErrorKind::BrokenPipe));
        assert_eq!(other.kind(), ErrorKind::LocalError);
    }

    #[test]
    fn display_carries_the_reply_class() {
        let err = Error::from(ErrorKind::TransientFileNotAvailable);
        assert_eq!(err.to_string(), "storage error: 450 Transient file not available");
    }
}
