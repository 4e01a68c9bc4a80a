//! The RFC 959 Representation Type (`TYPE`) command
//
// Only ASCII and Image types are accepted. ASCII mode performs
// no line-ending conversion; bytes travel the wire unchanged in
// both modes.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Type {
    param: String,
}

impl Type {
    pub fn new(param: String) -> Self {
        Type { param }
    }
}

#[async_trait]
impl CommandHandler for Type {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        if session.user.is_none() {
            return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in"));
        }
        match self.param.as_str() {
            "A" => {
                session.binary_mode = false;
                Ok(Reply::new(ReplyCode::CommandOkay, "Switching to ASCII mode"))
            }
            "I" => {
                session.binary_mode = true;
                Ok(Reply::new(ReplyCode::CommandOkay, "Switching to binary mode"))
            }
            _ => Ok(Reply::new(ReplyCode::CommandNotImplementedForParameter, "Unknown or unsupported type")),
        }
    }
}
