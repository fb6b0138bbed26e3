pub mod tcp;

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::FatalError;

/// Byte stream backing one accepted session.
pub trait SessionStream: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> SessionStream for T {}

/// One accepted session, with a printable peer address for logs.
pub struct Inbound {
    pub stream: Box<dyn SessionStream>,
    pub peer: String,
}

/// A bound listening endpoint. Implementations are selected at runtime from
/// the locator scheme, so everything downstream depends only on this surface.
#[async_trait]
pub trait Transport: Send + Sync {
    /// The effective locator, which may differ from the requested one (most
    /// visibly when binding port 0).
    fn listening_locator(&self) -> &str;

    /// Idle timeout to apply to accepted sessions, when one was configured.
    fn session_timeout(&self) -> Option<Duration>;

    async fn accept(&self) -> io::Result<Inbound>;
}

/// Bind a listening transport for `locator`, choosing the implementation
/// from the scheme prefix. The timeout is forwarded unchanged; 0 leaves
/// session handling at the transport's default.
pub async fn bind(locator: &str, timeout_ms: u32) -> Result<Box<dyn Transport>, FatalError> {
    let (scheme, params) = locator.split_once(':').unwrap_or((locator, ""));
    match scheme {
        "tcp" => {
            let transport = tcp::TcpTransport::bind(params, timeout_ms)
                .await
                .map_err(|source| FatalError::TransportBind {
                    locator: locator.to_string(),
                    source,
                })?;
            Ok(Box::new(transport))
        }
        other => Err(FatalError::TransportBind {
            locator: locator.to_string(),
            source: io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unknown transport scheme {other:?}"),
            ),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_scheme_is_fatal() {
        let result = bind("infrc:host=a,port=1", 0).await;
        assert!(matches!(
            result,
            Err(FatalError::TransportBind { locator, .. }) if locator == "infrc:host=a,port=1"
        ));
    }

    #[tokio::test]
    async fn locator_without_scheme_is_fatal() {
        assert!(bind("garbage", 0).await.is_err());
    }

    #[tokio::test]
    async fn tcp_scheme_binds() {
        let transport = bind("tcp:host=127.0.0.1,port=0", 0).await.unwrap();
        assert!(transport.listening_locator().starts_with("tcp:host=127.0.0.1,port="));
    }
}
