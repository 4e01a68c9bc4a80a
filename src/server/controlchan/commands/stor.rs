//! The RFC 959 Store (`STOR`) command
//
// This command causes the server-DTP to accept the data
// transferred via the data connection and to store the data as
// a file at the server site. Overwriting an existing file
// additionally requires the delete permission.

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
pub struct Stor {
    path: String,
}

impl Stor {
    pub fn new(path: String) -> Self {
        Stor { path }
    }
}

#[async_trait]
impl CommandHandler for Stor {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let user = match session.user.clone() {
            Some(user) => user,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in")),
        };
        if !user.permissions().contains(Permissions::FILE_WRITE) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }
        if session.data_listener.is_none() {
            return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "Error opening data connection"));
        }

        let local_path = session.to_local_path(&user, &self.path);
        let existing = FileStatus::of(&local_path);
        if existing.is_ok() {
            if existing.file_type() == FileType::RegularFile && !user.permissions().contains(Permissions::FILE_DELETE) {
                return Ok(Reply::new(ReplyCode::BadFileName, "File already exists. Permission denied to overwrite file."));
            }
            if existing.file_type() == FileType::Dir {
                return Ok(Reply::new(ReplyCode::BadFileName, "Cannot create file. A directory with that name already exists."));
            }
        }

        let file = match WritableFile::open(&local_path, WriteMode::Truncate).await {
            Ok(file) => file,
            Err(err) => {
                slog::warn!(args.logger, "Error opening {:?} for upload: {}", local_path, err);
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
