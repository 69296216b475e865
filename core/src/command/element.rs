//! One parsed step of a move notation

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::key::CommandKey;

/// Keys matched together by one element (`DB`, `a+b`, `~$F`, ...)
pub type KeySet = SmallVec<[CommandKey; 4]>;

/// A single comma-separated token of a notation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandElement {
    pub keys: KeySet,
    /// Minimum frames the keys must be held before this element may match
    pub charge_time: i32,
    /// Hold marker (`/`)
    pub slash: bool,
    /// Must be the most recent change of any input (`>`)
    pub greater: bool,
    /// Second of two consecutive single-direction elements
    pub direction: bool,
}

impl Default for CommandElement {
    fn default() -> Self {
        Self {
            keys: KeySet::new(),
            charge_time: 1,
            slash: false,
            greater: false,
            direction: false,
        }
    }
}

impl CommandElement {
    /// A single direction key with no hold marker
    pub fn is_direction(&self) -> bool {
        !self.slash && self.keys.len() == 1 && !self.keys[0].is_button()
    }

    /// Whether matching this element should immediately retry `next` on the
    /// same frame.
    ///
    /// Only direction-only elements chain. They chain into an element of a
    /// different shape, or into one where a changed key is a released
    /// direction.
    pub fn chains_into(&self, next: &CommandElement) -> bool {
        if next.slash || self.keys.iter().any(|k| k.is_button()) {
            return false;
        }
        if self.keys.len() != next.keys.len() {
            return true;
        }
        self.keys.iter().zip(&next.keys).any(|(&k, &n)| {
            k != n && (k.is_released_direction() || n.is_released_direction())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    fn elem(keys: &[CommandKey]) -> CommandElement {
        CommandElement {
            keys: keys.iter().copied().collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_direction() {
        assert!(elem(&[CommandKey::DF]).is_direction());
        assert!(elem(&[CommandKey::nBs]).is_direction());
        assert!(!elem(&[CommandKey::a]).is_direction());
        assert!(!elem(&[CommandKey::D, CommandKey::F]).is_direction());

        let mut slash = elem(&[CommandKey::D]);
        slash.slash = true;
        assert!(!slash.is_direction());
    }

    #[test]
    fn test_chains_into_released_direction() {
        let charge = elem(&[CommandKey::nBs]);
        assert!(charge.chains_into(&elem(&[CommandKey::F])));
        assert!(!elem(&[CommandKey::DB]).chains_into(&elem(&[CommandKey::F])));
    }

    #[test]
    fn test_buttons_never_chain() {
        let e = CommandElement {
            keys: smallvec![CommandKey::a],
            ..Default::default()
        };
        assert!(!e.chains_into(&elem(&[CommandKey::b, CommandKey::c])));
    }

    #[test]
    fn test_shape_change_chains() {
        assert!(elem(&[CommandKey::D]).chains_into(&elem(&[CommandKey::F, CommandKey::a])));
    }
}
