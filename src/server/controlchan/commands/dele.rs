//! The RFC 959 Delete (`DELE`) command
//
// This command causes the file specified in the pathname to be
// deleted at the server site.

use super::storage_error_reply;
use crate::auth::Permissions;
use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use crate::storage::filesystem::{self, FileStatus, FileType};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Dele {
    path: String,
}

impl Dele {
    pub fn new(path: String) -> Self {
        Dele { path }
    }
}

#[async_trait]
impl CommandHandler for Dele {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let user = match session.user.clone() {
            Some(user) => user,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in")),
        };

        let local_path = session.to_local_path(&user, &self.path);
        let status = FileStatus::of(&local_path);
        if !status.is_ok() {
            return Ok(Reply::new(ReplyCode::FileError, "Resource does not exist"));
        }
        if status.file_type() != FileType::RegularFile {
            return Ok(Reply::new(ReplyCode::FileError, "Resource is not a file"));
        }
        if !user.permissions().contains(Permissions::FILE_DELETE) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }

        match filesystem::remove_file(&local_path) {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "Successfully deleted file")),
            Err(err) => {
                slog::warn!(args.logger, "Error deleting {:?}: {}", local_path, err);
                Ok(storage_error_reply(&err, "Unable to delete file"))
            }
        }
    }
}
