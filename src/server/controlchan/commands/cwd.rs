//! The RFC 959 Change Working Directory (`CWD`) command
//
// This command allows the user to work with a different
// directory for file storage or retrieval without altering his
// login or accounting information. Transfer parameters are
// similarly unchanged.

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
pub struct Cwd {
    path: String,
}

impl Cwd {
    pub fn new(path: String) -> Self {
        Cwd { path }
    }
}

// The actual directory change, shared with CDUP which differs only in its
// success code.
pub(super) fn execute_cwd(session: &mut Session, path: &str) -> Reply {
    let user = match session.user.clone() {
        Some(user) => user,
        None => return Reply::new(ReplyCode::NotLoggedIn, "Not logged in"),
    };
    if !user.permissions().contains(Permissions::DIR_LIST) {
        return Reply::new(ReplyCode::FileError, "Permission denied");
    }
    if path.is_empty() {
        return Reply::new(ReplyCode::ParameterSyntaxError, "No path given");
    }

    let new_working_dir = session.to_ftp_absolute(path);
    let local_path = session.to_local_path(&user, &new_working_dir);
    let status = FileStatus::of(&local_path);

    if !status.is_ok() {
        return Reply::new(ReplyCode::FileError, "Failed to change directory: The given resource does not exist or permission denied.");
    }
    if status.file_type() != FileType::Dir {
        return Reply::new(ReplyCode::FileError, "Failed to change directory: The given resource is not a directory.");
    }
    if !status.can_open_dir() {
        return Reply::new(ReplyCode::FileError, "Failed to change directory: Permission denied.");
    }
    session.cwd = new_working_dir;
    Reply::new_with_string(ReplyCode::FileActionOkay, format!("Working directory changed to {}", session.cwd))
}

#[async_trait]
impl CommandHandler for Cwd {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        Ok(execute_cwd(&mut session, &self.path))
    }
}
