//! Getting hold of a connected stream: resolve and connect on the client,
//! bind, listen and accept on the server.

use std::net::{Ipv4Addr, SocketAddr};

use tokio::net::{lookup_host, TcpListener, TcpSocket, TcpStream};

use crate::error::{ChatError, Result};

/// Resolve `host` and connect to the first address that answers.
pub async fn connect(host: &str, port: u16) -> Result<TcpStream> {
    if port == 0 {
        return Err(ChatError::Usage("port must be between 1 and 65535".into()));
    }

    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|e| ChatError::Resolution {
            host: host.to_string(),
            source: Some(e),
        })?
        .collect();
    if addrs.is_empty() {
        return Err(ChatError::Resolution {
            host: host.to_string(),
            source: None,
        });
    }

    let mut last_err = None;
    for addr in addrs {
        log::info!("Connecting to remote host {addr}...");
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                log::info!("Connected.");
                return Ok(stream);
            }
            Err(e) => {
                log::debug!("connect to {addr} failed: {e}");
                last_err = Some(e);
            }
        }
    }
    Err(ChatError::connect(
        "connect",
        last_err.unwrap_or_else(|| std::io::ErrorKind::NotFound.into()),
    ))
}

/// Bind the wildcard address on `port` and start listening.
pub fn listen(port: u16, backlog: u32) -> Result<TcpListener> {
    let socket = TcpSocket::new_v4().map_err(|e| ChatError::connect("socket", e))?;
    log::info!("Created TCP socket");
    socket
        .set_reuseaddr(true)
        .map_err(|e| ChatError::connect("setsockopt", e))?;
    socket
        .bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))
        .map_err(|e| ChatError::connect("bind", e))?;
    let listener = socket
        .listen(backlog)
        .map_err(|e| ChatError::connect("listen", e))?;
    let bound = listener
        .local_addr()
        .map_err(|e| ChatError::connect("getsockname", e))?;
    log::info!("Bound TCP socket to port {}", bound.port());
    Ok(listener)
}

pub async fn accept(listener: &TcpListener) -> Result<(TcpStream, SocketAddr)> {
    log::info!("Waiting for an incoming connection...");
    let (stream, peer) = listener
        .accept()
        .await
        .map_err(|e| ChatError::connect("accept", e))?;
    log::info!("Incoming connection from {}:{}", peer.ip(), peer.port());
    Ok((stream, peer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connects_to_local_listener() {
        let listener = listen(0, 1).unwrap();
        let port = listener.local_addr().unwrap().port();

        let (client, server) = tokio::join!(connect("localhost", port), accept(&listener));
        let client = client.unwrap();
        let (server, peer) = server.unwrap();
        assert_eq!(client.local_addr().unwrap().port(), peer.port());
        assert_eq!(server.local_addr().unwrap().port(), port);
    }

    #[tokio::test]
    async fn refused_connection_is_a_connect_error() {
        let port = {
            let listener = listen(0, 1).unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = connect("127.0.0.1", port).await.unwrap_err();
        assert!(matches!(err, ChatError::Connect { op: "connect", .. }), "{err:?}");
    }

    #[tokio::test]
    async fn unknown_host_is_a_resolution_error() {
        let err = connect("no-such-host.invalid", 80).await.unwrap_err();
        assert!(matches!(err, ChatError::Resolution { .. }), "{err:?}");
    }

    #[tokio::test]
    async fn port_zero_is_a_usage_error() {
        let err = connect("localhost", 0).await.unwrap_err();
        assert!(matches!(err, ChatError::Usage(_)));
    }
}
