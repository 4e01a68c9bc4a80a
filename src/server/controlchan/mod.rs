//! Contains code pertaining to the FTP *control* channel

pub(crate) mod command;
pub(crate) use command::Command;

pub(crate) mod parser;

pub(crate) mod codecs;
pub(crate) use codecs::FtpCodec;

pub(crate) mod reply;
pub(crate) use reply::{Reply, ReplyCode};

mod error;
pub(crate) use error::ControlChanError;

pub(crate) mod handler;

pub(super) mod commands;

mod control_loop;
pub(crate) use control_loop::{spawn_loop, LoopConfig};
