//! The RFC 959 Change To Parent Directory (`CDUP`) command
//
// A special case of CWD which allows the transfer of directory
// trees between operating systems having different syntaxes for
// naming the parent directory. Its own success code is 200
// rather than CWD's 250.

use super::cwd::execute_cwd;
use crate::auth::Permissions;
use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Cdup;

#[async_trait]
impl CommandHandler for Cdup {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        let user = match session.user.clone() {
            Some(user) => user,
            None => return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in")),
        };
        if !user.permissions().contains(Permissions::DIR_LIST) {
            return Ok(Reply::new(ReplyCode::FileError, "Permission denied"));
        }

        if session.cwd == "/" {
            return Ok(Reply::new(ReplyCode::FileError, "Already at root directory"));
        }
        match execute_cwd(&mut session, "..") {
            Reply::CodeAndMsg {
                code: ReplyCode::FileActionOkay,
                msg,
            } => Ok(Reply::new_with_string(ReplyCode::CommandOkay, msg)),
            other => Ok(other),
        }
    }
}
