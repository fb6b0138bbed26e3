use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;

use super::{Inbound, Transport};

/// TCP listening endpoint. Locator parameters follow
/// `host=<host>,port=<port>`, each given exactly once; binding port 0 is
/// allowed and the effective locator carries the kernel-assigned port.
pub struct TcpTransport {
    listener: TcpListener,
    locator: String,
    timeout: Option<Duration>,
}

impl TcpTransport {
    pub async fn bind(params: &str, timeout_ms: u32) -> io::Result<TcpTransport> {
        let (host, port) = parse_params(params)?;
        let listener = TcpListener::bind((host.as_str(), port)).await?;
        let local = listener.local_addr()?;
        Ok(TcpTransport {
            listener,
            locator: format!("tcp:host={},port={}", local.ip(), local.port()),
            timeout: (timeout_ms > 0).then(|| Duration::from_millis(u64::from(timeout_ms))),
        })
    }
}

#[async_trait]
impl Transport for TcpTransport {
    fn listening_locator(&self) -> &str {
        &self.locator
    }

    fn session_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn accept(&self) -> io::Result<Inbound> {
        let (stream, peer) = self.listener.accept().await?;
        Ok(Inbound {
            stream: Box::new(stream),
            peer: peer.to_string(),
        })
    }
}

fn parse_params(params: &str) -> io::Result<(String, u16)> {
    let mut host = None;
    let mut port = None;
    for piece in params.split(',') {
        match piece.split_once('=') {
            Some(("host", value)) => {
                if host.is_some() {
                    return Err(invalid(format!("duplicate locator parameter {piece:?}")));
                }
                host = Some(value.to_string());
            }
            Some(("port", value)) => {
                if port.is_some() {
                    return Err(invalid(format!("duplicate locator parameter {piece:?}")));
                }
                port = Some(
                    value
                        .parse::<u16>()
                        .map_err(|_| invalid(format!("bad port {value:?}")))?,
                );
            }
            _ => return Err(invalid(format!("unknown locator parameter {piece:?}"))),
        }
    }
    let host = host.ok_or_else(|| invalid("missing host parameter".into()))?;
    let port = port.ok_or_else(|| invalid("missing port parameter".into()))?;
    Ok((host, port))
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}
