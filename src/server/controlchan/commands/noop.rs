//! The RFC 959 No Operation (`NOOP`) command

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Noop;

#[async_trait]
impl CommandHandler for Noop {
    #[tracing_attributes::instrument]
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::CommandOkay, "OK"))
    }
}
