//! The RFC 959 Name List (`NLST`) command
//
// Like LIST, but transfers only the entry names, one per line.

use super::{start_transfer, storage_error_reply};
use crate::auth::Permissions;
use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use crate::server::datachan::DataCommand;
use crate::storage::filesystem::{dir_content, FileStatus, FileType};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Nlst {
    param: Option<String>,
}

impl Nlst {
    pub fn new(param: Option<String>) -> Self {
        Nlst { param }
    }
}

#[async_trait]
impl CommandHandler for Nlst {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let user = match session.user.clone() {
            Some(user) => user,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in")),
        };
        if !user.permissions().contains(Permissions::DIR_LIST) {
            return Ok(Reply::new(ReplyCode::TransientFileError, "Permission denied"));
        }

        let path = self.param.as_deref().unwrap_or("");
        let local_path = session.to_local_path(&user, path);
        let status = FileStatus::of(&local_path);
        if !status.is_ok() {
            return Ok(Reply::new(ReplyCode::TransientFileError, "Path does not exist"));
        }
        if status.file_type() != FileType::Dir {
            return Ok(Reply::new(ReplyCode::TransientFileError, "Path is not a directory"));
        }
        if !status.can_open_dir() {
            return Ok(Reply::new(ReplyCode::TransientFileError, "Permission denied"));
        }

        let listener = match session.data_listener.take() {
            Some(listener) => listener,
            None => return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "Error opening data connection")),
        };

        let content = match dir_content(&local_path) {
            Ok(content) => content,
            Err(err) => {
                slog::warn!(args.logger, "Error reading directory {:?}: {}", local_path, err);
                return Ok(storage_error_reply(&err, "Failed to read directory"));
            }
        };
        let mut listing = Vec::new();
        for name in content.keys() {
            listing.extend_from_slice(name.as_bytes());
            listing.extend_from_slice(b"\r\n");
        }

        start_transfer(&args, listener, DataCommand::SendBytes(listing)).await;
        Ok(Reply::new(ReplyCode::FileStatusOkay, "Sending name list"))
    }
}
