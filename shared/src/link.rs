//! Point-to-point TCP link between exactly one Host and one Remote.
//!
//! A [`Link`] is split into a [`LinkReader`] and a [`LinkWriter`] so that each
//! direction is owned by a single task and a slow write can never stall a read.

use crate::error::{ConnectError, LinkError};
use log::{debug, info};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};

/// Host side listening endpoint. Accepts a single Remote.
pub struct LinkListener {
    listener: TcpListener,
}

impl LinkListener {
    pub async fn bind(addr: &str) -> Result<Self, ConnectError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ConnectError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        info!("Listening for a remote on {}", addr);
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ConnectError> {
        self.listener.local_addr().map_err(ConnectError::Accept)
    }

    /// Blocks until one Remote connects, then stops listening.
    pub async fn accept(self) -> Result<Link, ConnectError> {
        let (stream, peer) = self.listener.accept().await.map_err(ConnectError::Accept)?;
        info!("Remote connected from {}", peer);
        Link::from_stream(stream, peer).map_err(ConnectError::Accept)
    }
}

/// An established, ordered, reliable byte stream.
#[derive(Debug)]
pub struct Link {
    stream: TcpStream,
    peer: SocketAddr,
}

impl Link {
    /// Binds `addr` and blocks until exactly one Remote connects.
    pub async fn listen(addr: &str) -> Result<Self, ConnectError> {
        LinkListener::bind(addr).await?.accept().await
    }

    /// Connects to a listening Host. `None` waits as long as the OS allows.
    pub async fn connect(addr: &str, timeout: Option<Duration>) -> Result<Self, ConnectError> {
        let attempt = TcpStream::connect(addr);
        let result = match timeout {
            Some(limit) => tokio::time::timeout(limit, attempt).await.map_err(|_| {
                ConnectError::Timeout {
                    addr: addr.to_string(),
                    timeout: limit,
                }
            })?,
            None => attempt.await,
        };

        let stream = result.map_err(|source| ConnectError::Connect {
            addr: addr.to_string(),
            source,
        })?;
        let peer = stream
            .peer_addr()
            .map_err(|source| ConnectError::Connect {
                addr: addr.to_string(),
                source,
            })?;
        info!("Connected to host at {}", peer);
        Link::from_stream(stream, peer).map_err(|source| ConnectError::Connect {
            addr: addr.to_string(),
            source,
        })
    }

    fn from_stream(stream: TcpStream, peer: SocketAddr) -> io::Result<Self> {
        // Snapshots are small and latency matters more than throughput.
        stream.set_nodelay(true)?;
        Ok(Self { stream, peer })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn into_split(self) -> (LinkReader, LinkWriter) {
        let (read, write) = self.stream.into_split();
        (LinkReader { inner: read }, LinkWriter { inner: write })
    }
}

/// Receiving half of a link.
#[derive(Debug)]
pub struct LinkReader {
    inner: OwnedReadHalf,
}

impl LinkReader {
    /// Reads exactly `n` bytes. A clean EOF, even mid-record, is [`LinkError::Closed`].
    pub async fn receive_exactly(&mut self, n: usize) -> Result<Vec<u8>, LinkError> {
        let mut buffer = vec![0u8; n];
        match self.inner.read_exact(&mut buffer).await {
            Ok(_) => Ok(buffer),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(LinkError::Closed),
            Err(e) => Err(LinkError::Io(e)),
        }
    }
}

/// Sending half of a link.
#[derive(Debug)]
pub struct LinkWriter {
    inner: OwnedWriteHalf,
}

impl LinkWriter {
    pub async fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.inner.write_all(bytes).await?;
        Ok(())
    }

    /// Flushes and closes our direction of the stream; the peer reads EOF.
    pub async fn shutdown(&mut self) -> Result<(), LinkError> {
        self.inner.shutdown().await?;
        debug!("Link write half shut down");
        Ok(())
    }
}
