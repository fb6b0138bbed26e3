use std::time::Duration;

use futures::{SinkExt, StreamExt};
use metrics::counter;
use tokio_util::codec::Framed;

use crate::protocol::{DiagCodec, DiagRequest, DiagResponse};
use crate::server::ServerStatus;
use crate::transport::Inbound;

pub async fn handle_session(
    inbound: Inbound,
    status: ServerStatus,
    idle_timeout: Option<Duration>,
) -> std::io::Result<()> {
    let Inbound { stream, peer } = inbound;
    let mut framed = Framed::new(stream, DiagCodec::default());

    loop {
        let next = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, framed.next()).await {
                Ok(frame) => frame,
                Err(_) => {
                    tracing::debug!(peer = %peer, "session idle timeout");
                    break;
                }
            },
            None => framed.next().await,
        };
        let Some(frame) = next else {
            break;
        };

        match frame {
            Ok(request) => {
                let closing = matches!(request, DiagRequest::Quit);
                let response = respond(&request, &status);
                // Ignore send errors (e.g., client closed) by breaking out.
                if let Err(err) = framed.send(response).await {
                    tracing::warn!(error = %err, "failed to send response");
                    break;
                }
                if closing {
                    break;
                }
            }
            Err(err) => {
                tracing::warn!(peer = %peer, error = %err, "protocol error");
                break;
            }
        }
    }

    Ok(())
}

fn respond(request: &DiagRequest, status: &ServerStatus) -> DiagResponse {
    match request {
        DiagRequest::Ping => {
            counter!("segstore.diag.commands", "command" => "ping").increment(1);
            DiagResponse::Pong
        }
        DiagRequest::Info => {
            counter!("segstore.diag.commands", "command" => "info").increment(1);
            DiagResponse::Fields(info_fields(status))
        }
        DiagRequest::Quit => {
            counter!("segstore.diag.commands", "command" => "quit").increment(1);
            DiagResponse::Bye
        }
        DiagRequest::Unknown(name) => {
            counter!("segstore.diag.commands", "command" => "unknown").increment(1);
            DiagResponse::Error(format!("ERR unknown command {name:?}"))
        }
    }
}

fn info_fields(status: &ServerStatus) -> Vec<(String, String)> {
    let config = &status.config;
    vec![
        ("services".into(), config.services.to_string()),
        ("locator".into(), config.local_locator.clone()),
        ("coordinator".into(), config.coordinator_locator.clone()),
        ("cluster".into(), config.cluster_name.to_string()),
        ("replicas".into(), config.master.num_replicas.to_string()),
        ("log_bytes".into(), config.master.log_bytes.to_string()),
        (
            "hash_table_bytes".into(),
            config.master.hash_table_bytes.to_string(),
        ),
        (
            "segment_frames".into(),
            config.backup.segment_frames.to_string(),
        ),
        (
            "detect_failures".into(),
            config.detect_failures.to_string(),
        ),
        (
            "uptime_secs".into(),
            status.started_at.elapsed().as_secs().to_string(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use clap::Parser;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use crate::config::ServerConfig;
    use crate::options::ServerOptions;

    use super::*;

    fn status_from(args: &[&str]) -> ServerStatus {
        let options = ServerOptions::try_parse_from(args).unwrap();
        let config = ServerConfig::from_options(&options).unwrap();
        ServerStatus {
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }

    #[test]
    fn ping_pongs() {
        let status = status_from(&["segstore"]);
        assert_eq!(respond(&DiagRequest::Ping, &status), DiagResponse::Pong);
    }

    #[test]
    fn unknown_commands_get_an_error_reply() {
        let status = status_from(&["segstore"]);
        let response = respond(&DiagRequest::Unknown("FLUSH".into()), &status);
        assert_eq!(
            response,
            DiagResponse::Error("ERR unknown command \"FLUSH\"".into())
        );
    }

    #[test]
    fn info_reports_resolved_configuration() {
        let status = status_from(&["segstore", "-B", "--clusterName=alpha", "--segmentFrames=64"]);
        let fields = info_fields(&status);
        let get = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(get("services"), "BACKUP, MEMBERSHIP, PING");
        assert_eq!(get("cluster"), "alpha");
        assert_eq!(get("segment_frames"), "64");
        assert_eq!(get("log_bytes"), "0");
    }

    #[tokio::test]
    async fn session_serves_ping_then_quit() {
        let (client, server) = tokio::io::duplex(1024);
        let status = status_from(&["segstore"]);
        let inbound = Inbound {
            stream: Box::new(server),
            peer: "test".into(),
        };
        let handler = tokio::spawn(handle_session(inbound, status, None));

        let (mut read_half, mut write_half) = tokio::io::split(client);
        write_half.write_all(b"PING\r\nQUIT\r\n").await.unwrap();

        let mut replies = Vec::new();
        read_half.read_to_end(&mut replies).await.unwrap();
        assert_eq!(&replies[..], b"+PONG\r\n+BYE\r\n");

        handler.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn idle_sessions_are_dropped_after_the_timeout() {
        let (client, server) = tokio::io::duplex(1024);
        let status = status_from(&["segstore"]);
        let inbound = Inbound {
            stream: Box::new(server),
            peer: "test".into(),
        };

        let handler = tokio::spawn(handle_session(
            inbound,
            status,
            Some(Duration::from_millis(50)),
        ));

        // No input at all: the handler should give up on its own.
        tokio::time::timeout(Duration::from_secs(2), handler)
            .await
            .expect("handler did not time out")
            .unwrap()
            .unwrap();
        drop(client);
    }
}
