//! The RFC 959 System (`SYST`) command
//
// Always answers "UNIX": some clients disconnect on an unknown
// operating system string, and the LIST output emulates Unix
// `ls` on every platform anyway, so this is the compatible
// answer everywhere.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Syst;

#[async_trait]
impl CommandHandler for Syst {
    #[tracing_attributes::instrument]
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(ReplyCode::SystemType, "UNIX"))
    }
}
