//! The RFC 959 Passive (`PASV`) command
//
// This command requests the server-DTP to "listen" on a data
// port (which is not its default data port) and to wait for a
// connection rather than initiate one upon receipt of a
// transfer command. The response to this command includes the
// host and port address this server is listening on.

use crate::server::controlchan::{
    error::ControlChanError,
    handler::{CommandContext, CommandHandler},
    Reply, ReplyCode,
};

use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use tokio::net::TcpListener;

#[derive(Debug)]
pub struct Pasv;

#[async_trait]
impl CommandHandler for Pasv {
    #[tracing_attributes::instrument]
    async fn handle(&self, args: CommandContext) -> Result<Reply, ControlChanError> {
        let mut session = args.session.lock().await;
        if session.user.is_none() {
            return Ok(Reply::new(ReplyCode::NotLoggedIn, "Not logged in"));
        }

        // A new PASV invalidates any previous listener.
        session.data_listener = None;

        // The data listener binds to the same interface the control
        // connection came in on; the 227 format can only carry IPv4.
        let ip = match args.local_addr.ip() {
            IpAddr::V4(ip) => ip,
            IpAddr::V6(_) => {
                slog::error!(args.logger, "Cannot enter passive mode on an IPv6 control connection");
                return Ok(Reply::new(ReplyCode::ServiceNotAvailable, "Failed to enter passive mode."));
            }
        };

        let listener = match TcpListener::bind(SocketAddr::new(IpAddr::V4(ip), 0)).await {
            Ok(listener) => listener,
            Err(err) => {
                slog::error!(args.logger, "Error opening data listener: {}", err);
                return Ok(Reply::new(ReplyCode::ServiceNotAvailable, "Failed to enter passive mode."));
            }
        };
        let port = match listener.local_addr() {
            Ok(addr) => addr.port(),
            Err(err) => {
                slog::error!(args.logger, "Error reading data listener address: {}", err);
                return Ok(Reply::new(ReplyCode::ServiceNotAvailable, "Failed to enter passive mode."));
            }
        };
        session.data_listener = Some(listener);

        let octets = ip.octets();
        Ok(Reply::new_with_string(
            ReplyCode::EnteringPassiveMode,
            format!(
                "Entering passive mode ({},{},{},{},{},{})",
                octets[0],
                octets[1],
                octets[2],
                octets[3],
                (port >> 8) & 0xff,
                port & 0xff
            ),
        ))
    }
}
