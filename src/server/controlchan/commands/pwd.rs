//! The RFC 959 Print Working Directory (`PWD`) command
//
// This command causes the name of the current working
// directory to be returned in the reply.

use super::quote_path;
use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Pwd;

#[async_trait]
impl CommandHandler for Pwd {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let session = args.session.lock().await;
        // RFC 959 does not allow 530 here, so 550 carries the rejection.
        if session.user.is_none() {
            return Ok(Reply::new(ReplyCode::FileError, "Not logged in"));
        }
        Ok(Reply::new_with_string(ReplyCode::PathCreated, quote_path(&session.cwd)))
    }
}
