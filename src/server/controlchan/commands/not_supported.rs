//! The catch-all handler for verbs the server recognizes but does not
//! implement: PORT, STRU, MODE, REIN, ACCT, ALLO, REST, ABOR, STOU, SITE,
//! STAT and HELP. Each keeps its historical reply code and text.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};

use async_trait::async_trait;

#[derive(Debug)]
pub struct NotSupported {
    code: ReplyCode,
    text: &'static str,
}

impl NotSupported {
    pub fn new(code: ReplyCode, text: &'static str) -> Self {
        NotSupported { code, text }
    }
}

#[async_trait]
impl CommandHandler for NotSupported {
    #[tracing_attributes::instrument]
    async fn handle(&self, _args: CommandContext) -> Result<Reply, ControlChanError> {
        Ok(Reply::new(self.code, self.text))
    }
}
