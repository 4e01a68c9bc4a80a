//! Contains the `ControlChanError` type covering parse failures and I/O
//! errors on the control channel.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlChanError {
    /// We encountered a system IO error.
    #[error("failed to perform IO: {0}")]
    Io(#[from] std::io::Error),
    /// We encountered a non-UTF8 character in the command.
    #[error("non-UTF8 character in command")]
    Utf8,
    /// The client issued a command we don't know about.
    #[error("unknown command: {command}")]
    UnknownCommand {
        /// The verb that we don't know about
        command: String,
    },
    /// The client issued a command that we know about, but with a malformed
    /// or missing parameter.
    #[error("invalid command parameter")]
    InvalidCommand,
}

impl From<std::str::Utf8Error> for ControlChanError {
    fn from(_: std::str::Utf8Error) -> ControlChanError {
        ControlChanError::Utf8
    }
}
