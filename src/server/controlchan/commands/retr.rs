//! The RFC 959 Retrieve (`RETR`) command
//
// This command causes the server-DTP to transfer a copy of the
// file specified in the pathname to the client. The bytes go out
// straight from the shared read-only mapping; concurrent
// downloads of the same file share one mapping.

use super::{start_transfer, storage_error_reply};
use crate::auth::Permissions;
use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use crate::server::datachan::DataCommand;
use crate::storage::mapped::MappedFile;

use async_trait::async_trait;

#[derive(Debug)]
pub struct Retr {
    path: String,
}

impl Retr {
    pub fn new(path: String) -> Self {
        Retr { path }
    }
}

#[async_trait]
impl CommandHandler for Retr {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let user = match session.user.clone() {
            Some(user) => user,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in")),
        };
        if !user.permissions().contains(Permissions::FILE_READ) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }
        if session.data_listener.is_none() {
            return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "Error opening data connection"));
        }

        let local_path = session.to_local_path(&user, &self.path);
        slog::debug!(
            args.logger,
            "Sending {:?} in {} mode",
            local_path,
            if session.binary_mode { "binary" } else { "ASCII" }
        );
        let file = match MappedFile::open(&local_path) {
            Ok(file) => file,
            Err(err) => {
                slog::warn!(args.logger, "Error opening {:?} for transfer: {}", local_path, err);
                return Ok(storage_error_reply(&err, "Error opening file for transfer"));
            }
        };

        let listener = match session.data_listener.take() {
            Some(listener) => listener,
            None => return Ok(Reply::new(ReplyCode::CantOpenDataConnection, "Error opening data connection")),
        };
        start_transfer(&args, listener, DataCommand::SendMapped(file)).await;
        Ok(Reply::new(ReplyCode::FileStatusOkay, "Sending file"))
    }
}
