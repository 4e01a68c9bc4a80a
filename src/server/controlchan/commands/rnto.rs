//! The RFC 959 Rename To (`RNTO`) command
//
// This command specifies the new pathname of the file specified
// in the immediately preceding RNFR command. Renaming never
// overwrites: the native rename overwrites on some platforms
// and refuses on others, so an existing target is rejected up
// front to keep the behavior uniform.

use super::rnfr::check_renamable;
use super::storage_error_reply;
use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use crate::storage::filesystem::{self, FileStatus};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Rnto {
    path: String,
}

impl Rnto {
    pub fn new(path: String) -> Self {
        Rnto { path }
    }
}

#[async_trait]
impl CommandHandler for Rnto {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let user = match session.user.clone() {
            Some(user) => user,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in")),
        };

        // One RNTO per RNFR, whatever the outcome.
        let rename_from = session.rename_from.take();
        let source = match (session.last_verb, rename_from) {
            (Some("RNFR"), Some(source)) => source,
            _ => return Ok(Reply::new(ReplyCode::BadCommandSequence, "Please specify target file first")),
        };
        if self.path.is_empty() {
            return Ok(Reply::new(ReplyCode::ParameterSyntaxError, "No target name given"));
        }

        // The source may have changed since RNFR; re-check it.
        if let Err(reply) = check_renamable(&session, &source) {
            return Ok(reply);
        }

        let local_from = session.to_local_path(&user, &source);
        let local_to = session.to_local_path(&user, &self.path);
        if FileStatus::of(&local_to).is_ok() {
            return Ok(Reply::new(ReplyCode::TransientFileError, "Target path exists already."));
        }

        match filesystem::rename(&local_from, &local_to) {
            Ok(()) => Ok(Reply::new(ReplyCode::FileActionOkay, "OK")),
            Err(err) => {
                slog::warn!(args.logger, "Error renaming {:?} to {:?}: {}", local_from, local_to, err);
                Ok(storage_error_reply(&err, "Error renaming file"))
            }
        }
    }
}
