//! Socket errors

/// Why a [`LocalSocket`](super::LocalSocket) could not be opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalSocketError {
    /// The address string is not `ip:port`
    InvalidAddress { addr: String, reason: String },
    Bind(String),
    /// The socket could not be switched to non-blocking mode
    NonBlocking(String),
}

impl std::fmt::Display for LocalSocketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAddress { addr, reason } => {
                write!(f, "Invalid address '{}': {}", addr, reason)
            }
            Self::Bind(e) => write!(f, "Cannot bind UDP socket: {}", e),
            Self::NonBlocking(e) => write!(f, "Cannot make socket non-blocking: {}", e),
        }
    }
}

impl std::error::Error for LocalSocketError {}
