//! Which netplay handles this machine controls

use ggrs::PlayerType;

/// Maximum number of netplay handles in a session
pub const MAX_PLAYERS: usize = 4;

/// Local/remote split of a session's player handles.
///
/// Bit N of the mask is set when handle N reads input from a device on
/// this machine. The player count is clamped to `1..=MAX_PLAYERS`.
///
/// ```
/// use rollcade_core::rollback::PlayerSessionConfig;
///
/// let couch = PlayerSessionConfig::all_local(2);
/// assert_eq!(couch.local_players(), vec![0, 1]);
///
/// let online = PlayerSessionConfig::with_local_players(2, &[1]);
/// assert_eq!(online.remote_players(), vec![0]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSessionConfig {
    num_players: usize,
    local_mask: u32,
}

impl PlayerSessionConfig {
    pub fn new(num_players: usize, local_mask: u32) -> Self {
        let num_players = num_players.clamp(1, MAX_PLAYERS);
        Self {
            num_players,
            local_mask: local_mask & ((1u32 << num_players) - 1),
        }
    }

    /// Every handle is local
    pub fn all_local(num_players: usize) -> Self {
        Self::new(num_players, u32::MAX)
    }

    pub fn with_local_players(num_players: usize, local: &[usize]) -> Self {
        let mask = local
            .iter()
            .filter(|&&h| h < MAX_PLAYERS)
            .fold(0u32, |m, &h| m | (1 << h));
        Self::new(num_players, mask)
    }

    /// Derive the split from a ggrs player list
    pub fn from_players(num_players: usize, players: &[(usize, PlayerType<String>)]) -> Self {
        let local: Vec<usize> = players
            .iter()
            .filter(|(_, ty)| matches!(ty, PlayerType::Local))
            .map(|(h, _)| *h)
            .collect();
        Self::with_local_players(num_players, &local)
    }

    pub fn num_players(&self) -> usize {
        self.num_players
    }

    pub fn local_mask(&self) -> u32 {
        self.local_mask
    }

    pub fn is_local(&self, handle: usize) -> bool {
        handle < self.num_players && self.local_mask & (1 << handle) != 0
    }

    pub fn local_players(&self) -> Vec<usize> {
        (0..self.num_players).filter(|&h| self.is_local(h)).collect()
    }

    pub fn remote_players(&self) -> Vec<usize> {
        (0..self.num_players).filter(|&h| !self.is_local(h)).collect()
    }
}

impl Default for PlayerSessionConfig {
    fn default() -> Self {
        Self::all_local(1)
    }
}
