//! UDP transport for P2P sessions
//!
//! [`LocalSocket`] implements ggrs's `NonBlockingSocket<String>` over a plain
//! non-blocking UDP socket. Peers are addressed by `"ip:port"` strings, the
//! same strings passed as `PlayerType::Remote` when the session is built.
//!
//! ```ignore
//! let socket = LocalSocket::bind("0.0.0.0:7000")?;
//! let players = vec![
//!     (0, PlayerType::Local),
//!     (1, PlayerType::Remote("192.168.1.20:7000".to_string())),
//! ];
//! let session = RollbackSession::new_p2p(SessionConfig::online(2), socket, players)?;
//! ```
//!
//! There is no NAT traversal or relay; both peers must be reachable.

mod error;
mod ggrs_impl;
mod socket;


pub use error::LocalSocketError;
pub use socket::{DEFAULT_NETPLAY_PORT, LocalSocket, SocketStats};
