//! The RFC 2389 Options (`OPTS`) command
//
// The only recognized option is "UTF8 ON"; paths are UTF-8 on
// the wire whether or not a client asks.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Opts {
    option: String,
}

impl Opts {
    pub fn new(option: String) -> Self {
        Opts { option }
    }
}

#[async_trait]
impl CommandHandler for Opts {
    #[tracing_attributes::instrument]
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        if self.option.eq_ignore_ascii_case("UTF8 ON") {
            Ok(Reply::new(ReplyCode::CommandOkay, "OK"))
        } else {
            Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Unrecognized parameter"))
        }
    }
}
