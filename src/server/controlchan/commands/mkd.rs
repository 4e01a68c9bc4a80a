//! The RFC 959 Make Directory (`MKD`) command
//
// This command causes the directory specified in the pathname
// to be created as a directory. The 257 reply carries the
// quoted absolute virtual path of the new directory.

use super::{quote_path, storage_error_reply};
use crate::auth::Permissions;
use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use crate::storage::filesystem;

use async_trait::async_trait;

#[derive(Debug)]
pub struct Mkd {
    path: String,
}

impl Mkd {
    pub fn new(path: String) -> Self {
        Mkd { path }
    }
}

#[async_trait]
impl CommandHandler for Mkd {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let user = match session.user.clone() {
            Some(user) => user,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in")),
        };
        if !user.permissions().contains(Permissions::DIR_CREATE) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }

        let local_path = session.to_local_path(&user, &self.path);
        match filesystem::create_dir(&local_path) {
            Ok(()) => {
                let created = quote_path(&session.to_ftp_absolute(&self.path));
                Ok(Reply::new_with_string(ReplyCode::PathCreated, format!("{} Successfully created", created)))
            }
            Err(err) => {
                slog::warn!(args.logger, "Error creating directory {:?}: {}", local_path, err);
                Ok(storage_error_reply(&err, "Unable to create directory"))
            }
        }
    }
}
