use crate::auth::UserDatabase;
use crate::server::controlchan::{error::ControlChanError, Reply};
use crate::server::session::SharedSession;
use crate::server::shutdown;
use crate::server::ControlChanMsg;

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Sender;

// Common interface for all handlers of `Command`s
#[async_trait]
pub(crate) trait CommandHandler: Send + Sync + std::fmt::Debug {
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError>;
}

/// Represents arguments passed to a `CommandHandler`
#[derive(Debug)]
pub(crate) struct CommandContext {
    pub session: SharedSession,
    pub users: Arc<UserDatabase>,
    pub tx_control_chan: Sender<ControlChanMsg>,
    pub local_addr: SocketAddr,
    pub logger: slog::Logger,
    pub data_done_delay: Duration,
    pub shutdown_topic: Arc<shutdown::Notifier>,
}
