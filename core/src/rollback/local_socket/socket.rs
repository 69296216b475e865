//! Non-blocking UDP socket

use std::net::{SocketAddr, UdpSocket};

use super::error::LocalSocketError;

/// Port used when the netplay config does not name one
pub const DEFAULT_NETPLAY_PORT: u16 = 7000;

/// ggrs datagrams are small; anything larger is not ours
pub(super) const RECV_BUFFER_SIZE: usize = 4096;

/// Datagram counters since the socket was bound
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SocketStats {
    pub sent: u64,
    pub received: u64,
    /// Datagrams that did not decode as ggrs messages
    pub malformed: u64,
    /// Sends that failed or targeted an unparseable address
    pub send_errors: u64,
}

/// UDP socket carrying ggrs messages between peers
pub struct LocalSocket {
    pub(super) socket: UdpSocket,
    pub(super) local_addr: SocketAddr,
    pub(super) recv_buf: Vec<u8>,
    pub(super) stats: SocketStats,
}

pub(super) fn parse_addr(addr: &str) -> Result<SocketAddr, LocalSocketError> {
    addr.parse().map_err(|e: std::net::AddrParseError| {
        LocalSocketError::InvalidAddress {
            addr: addr.to_string(),
            reason: e.to_string(),
        }
    })
}

impl LocalSocket {
    /// Bind to `addr` (`"ip:port"`) in non-blocking mode
    pub fn bind(addr: &str) -> Result<Self, LocalSocketError> {
        let socket_addr = parse_addr(addr)?;
        let socket =
            UdpSocket::bind(socket_addr).map_err(|e| LocalSocketError::Bind(e.to_string()))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| LocalSocketError::NonBlocking(e.to_string()))?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| LocalSocketError::Bind(e.to_string()))?;

        tracing::info!(addr = %local_addr, "Netplay socket bound");
        Ok(Self {
            socket,
            local_addr,
            recv_buf: vec![0u8; RECV_BUFFER_SIZE],
            stats: SocketStats::default(),
        })
    }

    /// Bind every interface on `port`
    pub fn bind_port(port: u16) -> Result<Self, LocalSocketError> {
        Self::bind(&format!("0.0.0.0:{}", port))
    }

    /// Bind an ephemeral localhost port
    pub fn bind_any() -> Result<Self, LocalSocketError> {
        Self::bind("127.0.0.1:0")
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The bound address in the form peers use to name this socket
    pub fn local_addr_string(&self) -> String {
        self.local_addr.to_string()
    }

    pub fn stats(&self) -> SocketStats {
        self.stats
    }
}

impl std::fmt::Debug for LocalSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSocket")
            .field("local_addr", &self.local_addr)
            .field("stats", &self.stats)
            .finish()
    }
}
