//! The RFC 959 Logout (`QUIT`) command
//
// This command terminates a USER and, if file transfer is not
// in progress, the server closes the control connection.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};

use async_trait::async_trait;

#[derive(Debug)]
pub struct Quit;

#[async_trait]
impl CommandHandler for Quit {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        session.user = None;
        // The control loop closes the socket once this reply is on the wire.
        session.quit_requested = true;
        Ok(Reply::new(ReplyCode::ClosingControlConnection, "Connection shutting down"))
    }
}
