//! The RFC 3659 File Size (`SIZE`) command
//
// Reports the transfer size of a file. The reported size is the
// one for TYPE I; no STRU/MODE/TYPE dependent recalculation is
// performed.

use crate::auth::Permissions;
use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};
use crate::storage::filesystem::{FileStatus, FileType};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Size {
    path: String,
}

impl Size {
    pub fn new(path: String) -> Self {
        Size { path }
    }
}

#[async_trait]
impl CommandHandler for Size {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        let user = match session.user.clone() {
            Some(user) => user,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in")),
        };
        // SIZE works for downloaders and for listers alike.
        if !user.permissions().intersects(Permissions::FILE_READ | Permissions::DIR_LIST) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }

        let local_path = session.to_local_path(&user, &self.path);
        let status = FileStatus::of(&local_path);
        if !status.is_ok() || status.file_type() != FileType::RegularFile {
            return Ok(Reply::new(ReplyCode::LocalError, "Error opening file for size retrieval"));
        }
        Ok(Reply::new_with_string(ReplyCode::FileStatus, status.len().to_string()))
    }
}
