//! The RFC 959 User Name (`USER`) command
//
// The argument field is a Telnet string identifying the user.
// The user identification is that which is required by the
// server for access to its file system.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};

use async_trait::async_trait;

#[derive(Debug)]
pub struct User {
    username: String,
}

impl User {
    pub fn new(username: String) -> Self {
        User { username }
    }
}

#[async_trait]
impl CommandHandler for User {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        // A fresh USER always drops any previous login, even when the new
        // name turns out to be unusable.
        session.user = None;
        session.username_for_login = Some(self.username.clone());
        session.cwd = "/".to_string();

        if self.username.is_empty() {
            Ok(Reply::new(ReplyCode::ParameterSyntaxError, "Please provide username"))
        } else {
            Ok(Reply::new(ReplyCode::NeedPassword, "Please enter password"))
        }
    }
}
