use super::{error::ControlChanError, parser, Command, Reply};

use bytes::BytesMut;
use std::io::Write;
use tokio_util::codec::{Decoder, Encoder};

// FtpCodec implements tokio's `Decoder` and `Encoder` traits for the control
// channel: incoming bytes are split on newlines and parsed into commands,
// outgoing replies are rendered in RFC 959 wire form.
pub struct FtpCodec {
    // Index of the next byte to examine for a '\n'. Remembering it avoids
    // re-scanning the prefix of a partially received line on every decode
    // call.
    next_index: usize,
}

impl FtpCodec {
    pub fn new() -> Self {
        FtpCodec { next_index: 0 }
    }
}

impl Decoder for FtpCodec {
    // Parse failures are yielded as items rather than stream errors: a
    // mistyped command must get its 500 and leave the session running, while
    // a framed stream terminates for good once it has produced an `Err`.
    type Item = Result<Command, ControlChanError>;
    type Error = ControlChanError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(newline_offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
            let newline_index = newline_offset + self.next_index;
            let line = buf.split_to(newline_index + 1);
            self.next_index = 0;
            Ok(Some(parser::parse(&line)))
        } else {
            self.next_index = buf.len();
            Ok(None)
        }
    }
}

impl Encoder<Reply> for FtpCodec {
    type Error = ControlChanError;

    fn encode(&mut self, reply: Reply, buf: &mut BytesMut) -> Result<(), Self::Error> {
        let mut buffer = vec![];
        match reply {
            Reply::CodeAndMsg { code, msg } => {
                if msg.is_empty() {
                    write!(buffer, "{}\r\n", code as u32)?;
                } else {
                    write!(buffer, "{} {}\r\n", code as u32, msg)?;
                }
            }
            Reply::MultiLine { code, mut lines } => {
                // The last line repeats the code, terminating the reply.
                let last = lines.pop().unwrap_or_default();
                if lines.is_empty() {
                    write!(buffer, "{} {}\r\n", code as u32, last)?;
                } else {
                    write!(buffer, "{}-{}\r\n", code as u32, lines.remove(0))?;
                    for line in lines {
                        write!(buffer, "{}\r\n", line)?;
                    }
                    write!(buffer, "{} {}\r\n", code as u32, last)?;
                }
            }
        }
        buf.extend(&buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::controlchan::ReplyCode;
    use pretty_assertions::assert_eq;

    fn encoded(reply: Reply) -> String {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(reply, &mut buf).unwrap();
        String::from_utf8(buf.to_vec()).unwrap()
    }

    #[test]
    fn encodes_single_line_replies() {
        assert_eq!(encoded(Reply::new(ReplyCode::CommandOkay, "OK")), "200 OK\r\n");
        assert_eq!(encoded(Reply::new(ReplyCode::CommandOkay, "")), "200\r\n");
    }

    #[test]
    fn encodes_multi_line_replies() {
        let reply = Reply::new_multiline(ReplyCode::SystemStatus, vec![" Feature List:", " UTF8", " SIZE", "END"]);
        assert_eq!(encoded(reply), "211- Feature List:\r\n UTF8\r\n SIZE\r\n211 END\r\n");
    }

    #[test]
    fn decodes_complete_lines_only() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from(&b"NOOP"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"\r\nUSER x\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().unwrap(), Command::Noop);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().unwrap(), Command::User { username: "x".to_string() });
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn bad_lines_are_items_not_stream_errors() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from(&b"WAT\r\nNOOP\r\n"[..]);
        // The unknown command is an inner Err; the stream itself stays Ok.
        assert!(codec.decode(&mut buf).unwrap().unwrap().is_err());
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap().unwrap(), Command::Noop);
    }
}
