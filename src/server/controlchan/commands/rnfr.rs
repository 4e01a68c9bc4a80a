//! The RFC 959 Rename From (`RNFR`) command
//
// This command specifies the old pathname of the file which is
// to be renamed. It must be immediately followed by RNTO.

use crate::auth::Permissions;
use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use crate::server::session::Session;
use crate::storage::filesystem::{FileStatus, FileType};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Rnfr {
    path: String,
}

impl Rnfr {
    pub fn new(path: String) -> Self {
        Rnfr { path }
    }
}

// Checks that `path` names an existing resource the session's user may
// rename: directories need the directory-rename bit, everything else the
// file-rename bit. Shared with RNTO, which re-checks before acting.
pub(super) fn check_renamable(session: &Session, path: &str) -> Result<(), Reply> {
    let user = match session.user.clone() {
        Some(user) => user,
        None => return Err(Reply::new(ReplyCode::NotLoggedIn, "Not logged in")),
    };
    if path.is_empty() {
        return Err(Reply::new(ReplyCode::ParameterSyntaxError, "Empty path"));
    }

    let local_path = session.to_local_path(&user, path);
    let status = FileStatus::of(&local_path);
    if !status.is_ok() {
        return Err(Reply::new(ReplyCode::FileError, "File does not exist"));
    }
    let required = if status.file_type() == FileType::Dir {
        Permissions::DIR_RENAME
    } else {
        Permissions::FILE_RENAME
    };
    if !user.permissions().contains(required) {
        return Err(Reply::new(ReplyCode::FileError, "Permission denied"));
    }
    Ok(())
}

#[async_trait]
impl CommandHandler for Rnfr {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.rename_from = None;

        match check_renamable(&session, &self.path) {
            Ok(()) => {
                session.rename_from = Some(self.path.clone());
                Ok(Reply::new(ReplyCode::FileActionPending, "Enter target name"))
            }
            Err(reply) => Ok(reply),
        }
    }
}
