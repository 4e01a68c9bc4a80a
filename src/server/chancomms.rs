//! Contains the messages the data channel sends back to the control loop.
//!
//! Transfers run in their own task; the final FTP reply for a transfer must
//! still leave the control socket in command order, so the data task never
//! writes replies itself. It posts one of these and the control loop turns
//! it into the 226/426/451 that ends the transfer.

use std::fmt;

#[derive(PartialEq, Eq, Debug)]
pub enum ControlChanMsg {
    /// File bytes were sent to the client (RETR).
    SentData {
        bytes: u64,
    },
    /// Client bytes were written to storage (STOR/APPE).
    WrittenData {
        bytes: u64,
    },
    /// A LIST or NLST listing went out completely.
    DirectorySent,
    /// The data connection failed (accept error, socket error).
    TransferAborted {
        reason: String,
    },
    /// Writing received bytes to local storage failed.
    LocalError {
        reason: String,
    },
}

impl fmt::Display for ControlChanMsg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
