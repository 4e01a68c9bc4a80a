//! The RFC 959 Remove Directory (`RMD`) command
//
// This command causes the directory specified in the pathname
// to be removed.

use super::storage_error_reply;
use crate::auth::Permissions;
use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use crate::storage::filesystem;

use async_trait::async_trait;

#[derive(Debug)]
pub struct Rmd {
    path: String,
}

impl Rmd {
    pub fn new(path: String) -> Self {
        Rmd { path }
    }
}

#[async_trait]
impl CommandHandler for Rmd {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let user = match session.user.clone() {
            Some(user) => user,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in")),
        };
        if !user.permissions().contains(Permissions::DIR_DELETE) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }

        let local_path = session.to_local_path(&user, &self.path);
        match filesystem::remove_dir(&local_path) {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "Successfully removed directory")),
            Err(err) => {
                slog::warn!(args.logger, "Error removing directory {:?}: {}", local_path, err);
                Ok(storage_error_reply(&err, "Unable to remove directory"))
            }
        }
    }
}
