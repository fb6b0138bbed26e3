use std::io;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Upper bound on one request line. Anything longer is not a diagnostic
/// command and the session is torn down.
pub const MAX_LINE: usize = 512;

/// One request line from a diagnostic session. Lines are matched
/// case-insensitively; anything unrecognized is carried through for the
/// error reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagRequest {
    Ping,
    Info,
    Quit,
    Unknown(String),
}

impl DiagRequest {
    fn parse(line: &str) -> DiagRequest {
        let trimmed = line.trim();
        match trimmed.to_ascii_uppercase().as_str() {
            "PING" => DiagRequest::Ping,
            "INFO" => DiagRequest::Info,
            "QUIT" => DiagRequest::Quit,
            _ => DiagRequest::Unknown(trimmed.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagResponse {
    Pong,
    Bye,
    Error(String),
    /// A counted block of `key=value` lines, as produced by `INFO`.
    Fields(Vec<(String, String)>),
}

#[derive(Debug, thiserror::Error)]
pub enum DiagError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<DiagError> for io::Error {
    fn from(value: DiagError) -> Self {
        match value {
            DiagError::Io(e) => e,
            DiagError::Protocol(msg) => io::Error::new(io::ErrorKind::InvalidData, msg),
        }
    }
}

/// Line codec for the diagnostic protocol: newline-terminated requests in
/// (with or without a carriage return), typed replies out.
#[derive(Debug, Default)]
pub struct DiagCodec;

impl Decoder for DiagCodec {
    type Item = DiagRequest;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<Self::Item>> {
        let Some(newline) = src.iter().position(|&b| b == b'\n') else {
            if src.len() > MAX_LINE {
                return Err(DiagError::Protocol("request line too long".into()).into());
            }
            return Ok(None);
        };
        if newline > MAX_LINE {
            return Err(DiagError::Protocol("request line too long".into()).into());
        }

        let line = src.split_to(newline + 1);
        let line = &line[..newline];
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let text = std::str::from_utf8(line)
            .map_err(|e| DiagError::Protocol(e.to_string()))
            .map_err(io::Error::from)?;
        Ok(Some(DiagRequest::parse(text)))
    }
}

impl Encoder<DiagResponse> for DiagCodec {
    type Error = io::Error;

    fn encode(&mut self, item: DiagResponse, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            DiagResponse::Pong => dst.extend_from_slice(b"+PONG\r\n"),
            DiagResponse::Bye => dst.extend_from_slice(b"+BYE\r\n"),
            DiagResponse::Error(msg) => {
                dst.put_u8(b'-');
                dst.extend_from_slice(msg.as_bytes());
                dst.extend_from_slice(b"\r\n");
            }
            DiagResponse::Fields(fields) => {
                dst.put_u8(b'*');
                dst.extend_from_slice(fields.len().to_string().as_bytes());
                dst.extend_from_slice(b"\r\n");
                for (key, value) in &fields {
                    dst.extend_from_slice(key.as_bytes());
                    dst.put_u8(b'=');
                    dst.extend_from_slice(value.as_bytes());
                    dst.extend_from_slice(b"\r\n");
                }
            }
        }
        Ok(())
    }
}
