//! The RFC 959 Append (`APPE`) command
//
// Like STOR, but received bytes go to the end of an existing
// file. Which permission applies depends on whether the target
// exists: appending to an existing file needs the append bit,
// creating a fresh one needs the write bit.

use super::{start_transfer, storage_error_reply};
use crate::auth::Permissions;
use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use crate::server::datachan::DataCommand;
use crate::storage::filesystem::{FileStatus, FileType, WritableFile, WriteMode};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Appe {
    path: String,
}

impl Appe {
    pub fn new(path: String) -> Self {
        Appe { path }
    }
}

#[async_trait]
impl CommandHandler for Appe {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let user = match session.user.clone() {
            Some(user) => user,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in")),
        };

        let local_path = session.to_local_path(&user, &self.path);
        let existing = FileStatus::of(&local_path);
        let mode = if existing.is_ok() {
            if !user.permissions().contains(Permissions::FILE_APPEND) {
                return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
            }
            if existing.file_type() != FileType::RegularFile {
                return Ok(Reply::new(ReplyCode::FileError, "Pathname is not a file"));
            }
            WriteMode::Append
        } else {
            if !user.permissions().contains(Permissions::FILE_WRITE) {
                return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
            }
            WriteMode::Truncate
        };

        if session.data_listener.is_none() {
            return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "Error opening data connection"));
        }

        let file = match WritableFile::open(&local_path, mode).await {
            Ok(file) => file,
            Err(err) => {
                slog::warn!(args.logger, "Error opening {:?} for append: {}", local_path, err);
                return Ok(storage_error_reply(&err, "Error opening file for transfer"));
            }
        };

        let listener = match session.data_listener.take() {
            Some(listener) => listener,
            None => return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "Error opening data connection")),
        };
        start_transfer(&args, listener, DataCommand::Receive(file)).await;
        Ok(Reply::new(ReplyCode::FileStatusOkay, "Receiving file"))
    }
}
