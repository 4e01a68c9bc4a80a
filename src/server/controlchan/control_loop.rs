//! The per-session control-channel event loop.
//!
//! One loop task runs per connection. It is the only writer on the control
//! socket, so replies leave the wire in exactly the order they were
//! produced: command handlers return their reply directly, and the final
//! reply of a running transfer is fed back in through the session's message
//! queue by the data channel.

use crate::auth::UserDatabase;
use crate::server::controlchan::{
    commands,
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Command, FtpCodec, Reply, ReplyCode,
};
use crate::server::registry::SessionRegistry;
use crate::server::session::{Session, SharedSession};
use crate::server::shutdown;
use crate::server::ControlChanMsg;

use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::sync::Mutex;
use tokio_util::codec::Decoder;

#[derive(Debug, Clone)]
pub(crate) struct LoopConfig {
    pub users: Arc<UserDatabase>,
    pub greeting: &'static str,
    pub logger: slog::Logger,
    pub data_done_delay: Duration,
    pub registry: Arc<SessionRegistry>,
    pub shutdown_topic: Arc<shutdown::Notifier>,
}

/// Sets up session state for an accepted control connection and spawns its
/// event loop.
pub(crate) async fn spawn_loop(config: LoopConfig, tcp_stream: TcpStream, mut shutdown: shutdown::Listener) -> Result<(), ControlChanError> {
    let LoopConfig {
        users,
        greeting,
        logger,
        data_done_delay,
        registry,
        shutdown_topic,
    } = config;

    if let Err(err) = tcp_stream.set_nodelay(true) {
        slog::warn!(logger, "Unable to set socket option tcp::no_delay: {}", err);
    }
    let local_addr = tcp_stream.local_addr()?;

    let (control_msg_tx, mut control_msg_rx): (Sender<ControlChanMsg>, Receiver<ControlChanMsg>) = channel(8);
    let session = Session::new(Arc::clone(&registry));
    let logger = logger.new(slog::o!("trace-id" => format!("{}", session.trace_id)));
    let trace_id = session.trace_id;
    let shared_session: SharedSession = Arc::new(Mutex::new(session));
    registry.insert(trace_id, Arc::downgrade(&shared_session));

    let mut framed = FtpCodec::new().framed(tcp_stream);
    framed.send(Reply::new(ReplyCode::ServiceReady, greeting)).await?;
    let (mut reply_sink, mut command_source) = framed.split();

    tokio::spawn(async move {
        slog::info!(logger, "Starting control loop");
        loop {
            let reply = tokio::select! {
                incoming = command_source.next() => {
                    match incoming {
                        None => {
                            slog::info!(logger, "Control connection closed by client");
                            break;
                        }
                        Some(Err(err)) => {
                            slog::warn!(logger, "Control connection read error: {}", err);
                            break;
                        }
                        Some(Ok(Err(parse_err))) => {
                            let (reply, close) = parse_error_reply(&parse_err);
                            if close {
                                let _ = reply_sink.send(reply).await;
                                break;
                            }
                            reply
                        }
                        Some(Ok(Ok(command))) => {
                            let verb = command.verb();
                            let context = CommandContext {
                                session: Arc::clone(&shared_session),
                                users: Arc::clone(&users),
                                tx_control_chan: control_msg_tx.clone(),
                                local_addr,
                                logger: logger.clone(),
                                data_done_delay,
                                shutdown_topic: Arc::clone(&shutdown_topic),
                            };
                            match dispatch(command).handle(context).await {
                                Ok(reply) => {
                                    // Sequencing state only advances for
                                    // recognized commands.
                                    shared_session.lock().await.last_verb = Some(verb);
                                    reply
                                }
                                Err(err) => {
                                    slog::warn!(logger, "Error handling {}: {}", verb, err);
                                    Reply::new(ReplyCode::LocalError, "Unknown internal server error, please try again later")
                                }
                            }
                        }
                    }
                }
                Some(msg) = control_msg_rx.recv() => {
                    match &msg {
                        ControlChanMsg::SentData { bytes } => slog::info!(logger, "Sent {} bytes", bytes),
                        ControlChanMsg::WrittenData { bytes } => slog::info!(logger, "Wrote {} bytes", bytes),
                        ControlChanMsg::DirectorySent => slog::info!(logger, "Directory listing sent"),
                        ControlChanMsg::TransferAborted { reason } => slog::warn!(logger, "Data transfer aborted: {}", reason),
                        ControlChanMsg::LocalError { reason } => slog::warn!(logger, "Local error on data channel: {}", reason),
                    }
                    transfer_reply(msg)
                }
                _ = shutdown.listen() => {
                    slog::info!(logger, "Shutting down control loop");
                    break;
                }
            };

            if reply_sink.send(reply).await.is_err() {
                slog::warn!(logger, "Could not send reply to client");
                break;
            }

            // QUIT: its 221 is flushed by the send above, nothing may follow.
            if shared_session.lock().await.quit_requested {
                slog::info!(logger, "Exiting control loop");
                break;
            }
        }
    });

    Ok(())
}

// The reply for a line that did not parse, and whether the connection is
// beyond saving.
fn parse_error_reply(err: &ControlChanError) -> (Reply, bool) {
    match err {
        ControlChanError::UnknownCommand { .. } => (Reply::new(ReplyCode::CommandSyntaxError, "Unrecognized command"), false),
        ControlChanError::InvalidCommand => (Reply::new(ReplyCode::ParameterSyntaxError, "Invalid parameter"), false),
        ControlChanError::Utf8 => (Reply::new(ReplyCode::CommandSyntaxError, "Invalid UTF8 in command"), true),
        ControlChanError::Io(_) => (Reply::new(ReplyCode::LocalError, "Unknown internal server error, please try again later"), true),
    }
}

// Maps a data-channel completion onto the reply that ends the transfer.
fn transfer_reply(msg: ControlChanMsg) -> Reply {
    match msg {
        ControlChanMsg::SentData { .. } | ControlChanMsg::WrittenData { .. } | ControlChanMsg::DirectorySent => {
            Reply::new(ReplyCode::ClosingDataConnection, "Done")
        }
        ControlChanMsg::TransferAborted { reason } => Reply::new_with_string(ReplyCode::TransferAborted, format!("Data transfer aborted: {}", reason)),
        ControlChanMsg::LocalError { .. } => Reply::new(ReplyCode::LocalError, "Failed to write file to disk"),
    }
}

// One handler per verb; the unimplemented ones keep their historical codes.
fn dispatch(command: Command) -> Box<dyn CommandHandler> {
    match command {
        Command::User { username } => Box::new(commands::User::new(username)),
        Command::Pass { password } => Box::new(commands::Pass::new(password)),
        Command::Cwd { path } => Box::new(commands::Cwd::new(path)),
        Command::Cdup => Box::new(commands::Cdup),
        Command::Quit => Box::new(commands::Quit),
        Command::Pasv => Box::new(commands::Pasv),
        Command::Type { param } => Box::new(commands::Type::new(param)),
        Command::Retr { path } => Box::new(commands::Retr::new(path)),
        Command::Stor { path } => Box::new(commands::Stor::new(path)),
        Command::Appe { path } => Box::new(commands::Appe::new(path)),
        Command::List { param } => Box::new(commands::List::new(param)),
        Command::Nlst { param } => Box::new(commands::Nlst::new(param)),
        Command::Dele { path } => Box::new(commands::Dele::new(path)),
        Command::Rmd { path } => Box::new(commands::Rmd::new(path)),
        Command::Mkd { path } => Box::new(commands::Mkd::new(path)),
        Command::Pwd => Box::new(commands::Pwd),
        Command::Rnfr { path } => Box::new(commands::Rnfr::new(path)),
        Command::Rnto { path } => Box::new(commands::Rnto::new(path)),
        Command::Syst => Box::new(commands::Syst),
        Command::Noop => Box::new(commands::Noop),
        Command::Feat => Box::new(commands::Feat),
        Command::Opts { option } => Box::new(commands::Opts::new(option)),
        Command::Size { path } => Box::new(commands::Size::new(path)),
        Command::Port => Box::new(commands::NotSupported::new(
            ReplyCode::CommandSyntaxError,
            "FTP active mode is not supported by this server",
        )),
        Command::Stru => Box::new(commands::NotSupported::new(ReplyCode::CommandSyntaxError, "Unsupported command")),
        Command::Mode => Box::new(commands::NotSupported::new(ReplyCode::CommandSyntaxError, "Unsupported command")),
        Command::Acct => Box::new(commands::NotSupported::new(ReplyCode::CommandSyntaxError, "Unsupported command")),
        Command::Rein => Box::new(commands::NotSupported::new(ReplyCode::CommandNotImplemented, "Unsupported command")),
        Command::Allo => Box::new(commands::NotSupported::new(ReplyCode::CommandSyntaxError, "Command not implemented")),
        Command::Stou => Box::new(commands::NotSupported::new(ReplyCode::CommandSyntaxError, "Command not implemented")),
        Command::Site => Box::new(commands::NotSupported::new(ReplyCode::CommandSyntaxError, "Command not implemented")),
        Command::Rest => Box::new(commands::NotSupported::new(ReplyCode::CommandNotImplemented, "Command not implemented")),
        Command::Abor => Box::new(commands::NotSupported::new(ReplyCode::CommandNotImplemented, "Command not implemented")),
        Command::Stat => Box::new(commands::NotSupported::new(ReplyCode::CommandNotImplemented, "Command not implemented")),
        Command::Help => Box::new(commands::NotSupported::new(ReplyCode::CommandNotImplemented, "Command not implemented")),
    }
}
