//! Contains code pertaining to the FTP *data* channel
//!
//! A transfer consumes the listener opened by the preceding PASV: exactly
//! one connection is accepted, the payload flows, the socket is closed, and
//! the outcome is reported back to the control loop which emits the final
//! reply. The data socket lives entirely inside the spawned task, so server
//! shutdown tears it down by waking the task's shutdown listener.

use super::chancomms::ControlChanMsg;
use super::shutdown;
use crate::storage::filesystem::WritableFile;
use crate::storage::mapped::MappedFile;

use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::Sender;

// Buffer size for draining upload sockets.
const READ_BUF_SIZE: usize = 1024 * 1024;

// What to do with the data connection once the client is on it.
#[derive(Debug)]
pub enum DataCommand {
    // Pre-rendered listing bytes (LIST/NLST).
    SendBytes(Vec<u8>),
    // A shared mapping to stream out (RETR).
    SendMapped(Arc<MappedFile>),
    // A write handle to stream into (STOR/APPE).
    Receive(WritableFile),
}

#[derive(Debug)]
pub struct DataTransfer {
    pub listener: TcpListener,
    pub tx_control_chan: Sender<ControlChanMsg>,
    pub logger: slog::Logger,
    // Optional pause between closing the data socket and reporting
    // completion, for clients that race the close.
    pub done_delay: Duration,
    pub shutdown: shutdown::Listener,
}

impl DataTransfer {
    /// Runs the transfer in a new task. Returns immediately; the outcome
    /// arrives on the control channel message queue.
    pub fn spawn(self, cmd: DataCommand) {
        let DataTransfer {
            listener,
            tx_control_chan,
            logger,
            done_delay,
            mut shutdown,
        } = self;
        tokio::spawn(async move {
            tokio::select! {
                _ = execute(listener, cmd, &tx_control_chan, &logger, done_delay) => {}
                _ = shutdown.listen() => {
                    slog::info!(logger, "Data transfer interrupted by server shutdown");
                }
            }
        });
    }
}

#[tracing_attributes::instrument(skip(cmd, tx, logger))]
async fn execute(listener: TcpListener, cmd: DataCommand, tx: &Sender<ControlChanMsg>, logger: &slog::Logger, done_delay: Duration) {
    let socket = match listener.accept().await {
        Ok((socket, _peer)) => socket,
        Err(err) => {
            slog::warn!(logger, "Failed to accept data connection: {}", err);
            send_msg(tx, logger, ControlChanMsg::TransferAborted { reason: err.to_string() }).await;
            return;
        }
    };
    // The listener is spent: one accept per PASV.
    drop(listener);

    let msg = match cmd {
        DataCommand::SendBytes(bytes) => match send_all(socket, &bytes, logger).await {
            Ok(_) => ControlChanMsg::DirectorySent,
            Err(err) => ControlChanMsg::TransferAborted { reason: err.to_string() },
        },
        DataCommand::SendMapped(file) => match send_all(socket, file.bytes(), logger).await {
            Ok(bytes) => ControlChanMsg::SentData { bytes },
            Err(err) => ControlChanMsg::TransferAborted { reason: err.to_string() },
        },
        DataCommand::Receive(file) => receive(socket, file, logger).await,
    };

    if !done_delay.is_zero() {
        tokio::time::sleep(done_delay).await;
    }
    send_msg(tx, logger, msg).await;
}

// Writes the whole payload and closes the socket. Zero-length payloads are
// not written at all.
async fn send_all(mut socket: TcpStream, bytes: &[u8], logger: &slog::Logger) -> Result<u64, std::io::Error> {
    if !bytes.is_empty() {
        socket.write_all(bytes).await?;
    }
    if let Err(err) = socket.shutdown().await {
        slog::warn!(logger, "Could not shut down data socket after send: {}", err);
    }
    Ok(bytes.len() as u64)
}

// Drains the socket into the file until the client closes its end.
async fn receive(socket: TcpStream, mut file: WritableFile, logger: &slog::Logger) -> ControlChanMsg {
    let mut reader = BufReader::with_capacity(READ_BUF_SIZE, socket);
    match file.write_stream(&mut reader).await {
        Ok(bytes) => ControlChanMsg::WrittenData { bytes },
        Err(err) => {
            slog::warn!(logger, "Error writing received data: {}", err);
            ControlChanMsg::LocalError { reason: err.to_string() }
        }
    }
}

async fn send_msg(tx: &Sender<ControlChanMsg>, logger: &slog::Logger, msg: ControlChanMsg) {
    if let Err(err) = tx.send(msg).await {
        slog::warn!(logger, "Could not notify control channel of transfer result: {}", err);
    }
}
