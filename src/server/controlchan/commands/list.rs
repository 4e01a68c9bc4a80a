//! The RFC 959 List (`LIST`) command
//
// Sends a Unix-style directory listing over the data channel.
//
// Some FTP clients pass `ls` flags along, as in "LIST -a" or
// "LIST -la dirname". Those flag words are recognized and
// dropped, even though this technically breaks listing a
// directory literally named "-a"; clients overwhelmingly CWD
// first and the compatibility win outweighs that corner.

use super::{start_transfer, storage_error_reply};
use crate::auth::Permissions;
use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use crate::server::datachan::DataCommand;
use crate::storage::filesystem::{dir_content, list_line, FileStatus, FileType};

use async_trait::async_trait;

#[derive(Debug)]
pub struct List {
    param: Option<String>,
}

impl List {
    pub fn new(param: Option<String>) -> Self {
        List { param }
    }
}

// Strips the leading flag words clients like to send.
pub(super) fn strip_list_flags(param: &str) -> &str {
    match param {
        "-a" | "-l" | "-al" | "-la" => "",
        _ if (param.starts_with("-a ") || param.starts_with("-l ")) && param.len() > 3 => &param[3..],
        _ if (param.starts_with("-al ") || param.starts_with("-la ")) && param.len() > 4 => &param[4..],
        _ => param,
    }
}

#[async_trait]
impl CommandHandler for List {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let user = match session.user.clone() {
            Some(user) => user,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in")),
        };
        // RFC 959 does not allow a permanent 550 here, so the rejection is
        // the transient 450.
        if !user.permissions().contains(Permissions::DIR_LIST) {
            return Ok(Reply::new(ReplyCode::TransientFileError, "Permission denied"));
        }

        let path = strip_list_flags(self.param.as_deref().unwrap_or(""));
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
        for (name, entry_status) in &content {
            listing.extend_from_slice(list_line(name, entry_status).as_bytes());
            listing.extend_from_slice(b"\r\n");
        }

        start_transfer(&args, listener, DataCommand::SendBytes(listing)).await;
        Ok(Reply::new(ReplyCode::FileStatusOkay, "Sending directory listing"))
    }
}
