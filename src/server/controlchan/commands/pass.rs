//! The RFC 959 Password (`PASS`) command
//
// The argument field is a Telnet string specifying the user's
// password. This command must be immediately preceded by the
// user name command.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Pass {
    password: String,
}

impl Pass {
    pub fn new(password: String) -> Self {
        Pass { password }
    }
}

#[async_trait]
impl CommandHandler for Pass {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        if session.last_verb != Some("USER") {
            return Ok(Reply::new(ReplyCode::BadCommandSequence, "Please specify username first"));
        }

        let username = session.username_for_login.clone().unwrap_or_default();
        match args.users.get_user(&username, &self.password) {
            Some(user) => {
                let shown = if username.is_empty() { "anonymous" } else { username.as_str() };
                slog::info!(args.logger, "User {} logged in", shown);
                session.user = Some(user);
                Ok(Reply::new(ReplyCode::UserLoggedIn, "Login successful"))
            }
            None => {
                slog::warn!(args.logger, "Failed login attempt for user {}", username);
                Ok(Reply::new(ReplyCode::NotLoggedIn, "Failed to log in"))
            }
        }
    }
}
