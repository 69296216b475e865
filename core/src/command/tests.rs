//! Tests for notation parsing and command matching

use rollcade_shared::InputBits;

use super::*;
use crate::state::SimRng;

const DOWN_BACK: InputBits = InputBits::DOWN.union(InputBits::LEFT);
const NEUTRAL: InputBits = InputBits::empty();

/// A command list driven frame by frame, facing right.
struct Rig {
    list: CommandList,
    rng: SimRng,
    ai: bool,
    hitpause: bool,
}

impl Rig {
    fn new(commands: &[(&str, &str)]) -> Self {
        Self::with_list(CommandList::default(), commands)
    }

    fn with_list(mut list: CommandList, commands: &[(&str, &str)]) -> Self {
        for (name, notation) in commands {
            list.add(name, notation);
        }
        Self {
            list,
            rng: SimRng::new(99),
            ai: false,
            hitpause: false,
        }
    }

    fn frame(&mut self, bits: InputBits) {
        self.list.input(bits, 1);
        let mut ctx = StepContext {
            ai: self.ai,
            hitpause: self.hitpause,
            extra_buffer_time: 0,
            rng: &mut self.rng,
        };
        self.list.step(&mut ctx);
    }

    fn frames(&mut self, bits: InputBits, n: usize) {
        for _ in 0..n {
            self.frame(bits);
        }
    }

    fn active(&self, name: &str) -> bool {
        self.list.is_active(name)
    }
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_motion_and_button() {
    let cmd = Command::parse("DB, F, a");
    assert_eq!(cmd.elements.len(), 3);
    assert_eq!(cmd.elements[0].keys.as_slice(), &[CommandKey::DB]);
    assert_eq!(cmd.elements[1].keys.as_slice(), &[CommandKey::F]);
    assert_eq!(cmd.elements[2].keys.as_slice(), &[CommandKey::a]);
    assert!(!cmd.elements[0].direction);
    assert!(cmd.elements[1].direction);
    assert!(!cmd.elements[2].direction);
    assert!(cmd.hold.is_empty());
    assert_eq!(cmd.charge_index, -1);
}

#[test]
fn test_parse_hold_prefix() {
    let cmd = Command::parse("/a, b");
    assert_eq!(cmd.hold.len(), 1);
    assert_eq!(cmd.hold[0].as_slice(), &[CommandKey::a]);
    assert_eq!(cmd.held, vec![false]);
    assert_eq!(cmd.elements.len(), 1);
    assert_eq!(cmd.elements[0].keys.as_slice(), &[CommandKey::b]);
}

#[test]
fn test_parse_trailing_hold_stays_an_element() {
    let cmd = Command::parse("x, /F");
    assert_eq!(cmd.elements.len(), 2);
    assert!(cmd.elements[1].slash);
    assert_eq!(cmd.hold.len(), 1);
    assert_eq!(cmd.hold[0].as_slice(), &[CommandKey::F]);
}

#[test]
fn test_parse_charge() {
    let cmd = Command::parse("~30$B, F, a");
    assert_eq!(cmd.elements[0].charge_time, 30);
    assert_eq!(cmd.elements[0].keys.as_slice(), &[CommandKey::nBs]);
    assert_eq!(cmd.elements[1].charge_time, 1);
}

#[test]
fn test_parse_release_without_time() {
    let cmd = Command::parse("~a");
    assert_eq!(cmd.elements[0].keys.as_slice(), &[CommandKey::na]);
    assert_eq!(cmd.elements[0].charge_time, 1);
}

#[test]
fn test_parse_greater_prefix() {
    let cmd = Command::parse(">~F");
    assert!(cmd.elements[0].greater);
    assert_eq!(cmd.elements[0].keys.as_slice(), &[CommandKey::nF]);

    let cmd = Command::parse("a, >/b");
    assert!(cmd.elements[1].greater);
    assert!(cmd.elements[1].slash);
}

#[test]
fn test_parse_simultaneous_keys() {
    let cmd = Command::parse("a+b + ~c");
    assert_eq!(
        cmd.elements[0].keys.as_slice(),
        &[CommandKey::a, CommandKey::b, CommandKey::nc]
    );
}

#[test]
fn test_parse_strict_diagonals() {
    let cmd = Command::parse("$DF, ~$UB, $D");
    assert_eq!(cmd.elements[0].keys.as_slice(), &[CommandKey::DFs]);
    assert_eq!(cmd.elements[1].keys.as_slice(), &[CommandKey::nUBs]);
    assert_eq!(cmd.elements[2].keys.as_slice(), &[CommandKey::Ds]);
}

#[test]
fn test_parse_diagonal_needs_adjacent_letters() {
    let cmd = Command::parse("D F");
    assert_eq!(cmd.elements[0].keys.as_slice(), &[CommandKey::D, CommandKey::F]);
}

#[test]
fn test_parse_dollar_before_unknown_is_reconsidered() {
    let cmd = Command::parse("$a");
    assert_eq!(cmd.elements[0].keys.as_slice(), &[CommandKey::a]);
}

#[test]
fn test_parse_ignores_garbage() {
    let cmd = Command::parse("q!?, F");
    assert_eq!(cmd.elements.len(), 2);
    assert!(cmd.elements[0].keys.is_empty());
    assert!(!cmd.elements[1].direction);
}

// ============================================================================
// Matching
// ============================================================================

#[test]
fn test_quarter_circle_completes_in_order() {
    let mut rig = Rig::new(&[("qcf", "DB, F, a")]);
    rig.frame(DOWN_BACK);
    assert!(!rig.active("qcf"));
    rig.frame(InputBits::RIGHT);
    assert!(!rig.active("qcf"));
    rig.frame(InputBits::A);
    assert!(rig.active("qcf"));
}

#[test]
fn test_reordered_motion_does_not_complete() {
    let mut rig = Rig::new(&[("qcf", "DB, F, a")]);
    rig.frame(InputBits::RIGHT);
    rig.frame(DOWN_BACK);
    rig.frame(InputBits::A);
    assert!(!rig.active("qcf"));
    for _ in 0..30 {
        rig.frame(NEUTRAL);
        assert!(!rig.active("qcf"));
    }
}

#[test]
fn test_motion_times_out() {
    let mut rig = Rig::new(&[("qcf", "DB, F, a")]);
    rig.frame(DOWN_BACK);
    rig.frame(InputBits::RIGHT);
    rig.frames(NEUTRAL, DEFAULT_COMMAND_TIME as usize + 2);
    rig.frame(InputBits::A);
    assert!(!rig.active("qcf"));
}

#[test]
fn test_hold_requirement_met() {
    let mut rig = Rig::new(&[("hold", "/a, b")]);
    rig.frames(InputBits::A, 3);
    assert!(!rig.active("hold"));
    rig.frame(InputBits::A | InputBits::B);
    assert!(rig.active("hold"));
}

#[test]
fn test_hold_released_early_never_completes() {
    let mut rig = Rig::new(&[("hold", "/a, b")]);
    rig.frames(InputBits::A, 3);
    rig.frame(NEUTRAL);
    rig.frame(InputBits::B);
    assert!(!rig.active("hold"));
    rig.frames(NEUTRAL, 5);
    assert!(!rig.active("hold"));
}

#[test]
fn test_ai_ignores_hold_requirements() {
    let mut rig = Rig::new(&[("hold", "/a, b")]);
    rig.ai = true;
    rig.frame(InputBits::B);
    assert!(rig.active("hold"));
}

#[test]
fn test_charge_completes_after_hold_time() {
    let mut rig = Rig::new(&[("sonic", "~30$B, F, a")]);
    rig.frames(InputBits::LEFT, 40);
    rig.frame(InputBits::RIGHT);
    assert!(!rig.active("sonic"));
    rig.frame(InputBits::A);
    assert!(rig.active("sonic"));
}

#[test]
fn test_charge_too_short_fails() {
    let mut rig = Rig::new(&[("sonic", "~30$B, F, a")]);
    rig.frames(InputBits::LEFT, 10);
    rig.frame(InputBits::RIGHT);
    rig.frame(InputBits::A);
    assert!(!rig.active("sonic"));
}

#[test]
fn test_dash_requires_neutral_between_taps() {
    let mut rig = Rig::new(&[("dash", "F, F")]);
    rig.frame(InputBits::RIGHT);
    rig.frame(NEUTRAL);
    rig.frame(InputBits::RIGHT);
    assert!(rig.active("dash"));

    let mut held = Rig::new(&[("dash", "F, F")]);
    for _ in 0..30 {
        held.frame(InputBits::RIGHT);
        assert!(!held.active("dash"));
    }
}

#[test]
fn test_completion_stays_active_for_buffer_time() {
    let mut rig = Rig::with_list(CommandList::new(DEFAULT_COMMAND_TIME, 3), &[("jab", "a")]);
    rig.frame(InputBits::A);
    assert!(rig.active("jab"));
    rig.frame(NEUTRAL);
    assert!(rig.active("jab"));
    rig.frame(NEUTRAL);
    assert!(rig.active("jab"));
    rig.frame(NEUTRAL);
    assert!(!rig.active("jab"));
    rig.frames(NEUTRAL, 10);
    assert!(!rig.active("jab"));
}

#[test]
fn test_hitpause_freezes_buffer_countdown() {
    let mut rig = Rig::with_list(CommandList::new(DEFAULT_COMMAND_TIME, 2), &[("jab", "a")]);
    rig.frame(InputBits::A);
    rig.hitpause = true;
    rig.frames(NEUTRAL, 10);
    assert!(rig.active("jab"));
    rig.hitpause = false;
    rig.frames(NEUTRAL, 2);
    assert!(!rig.active("jab"));
}

#[test]
fn test_facing_left_mirrors_motion() {
    let mut list = CommandList::default();
    list.add("qcf", "D, DF, F, a");
    let mut rng = SimRng::new(1);
    for bits in [
        InputBits::DOWN,
        InputBits::DOWN | InputBits::LEFT,
        InputBits::LEFT,
        InputBits::A,
    ] {
        list.input(bits, -1);
        let mut ctx = StepContext {
            ai: false,
            hitpause: false,
            extra_buffer_time: 0,
            rng: &mut rng,
        };
        list.step(&mut ctx);
    }
    assert!(list.is_active("qcf"));
}

#[test]
fn test_cloned_list_continues_identically() {
    let mut rig = Rig::new(&[("qcf", "DB, F, a"), ("dash", "F, F")]);
    rig.frame(DOWN_BACK);
    rig.frame(InputBits::RIGHT);

    let mut fork = Rig {
        list: rig.list.clone(),
        rng: rig.rng,
        ai: false,
        hitpause: false,
    };
    rig.frame(InputBits::A);
    fork.frame(InputBits::A);
    assert_eq!(rig.list, fork.list);
    assert!(fork.active("qcf"));
}

#[test]
fn test_greater_needs_previous_key_to_be_last_change() {
    let mut rig = Rig::new(&[("link", "a, >b")]);
    let mut seen = Vec::new();
    for bits in [InputBits::A, NEUTRAL, InputBits::B] {
        rig.frame(bits);
        seen.push(rig.active("link"));
    }
    assert_eq!(seen, [false, false, true]);
}

#[test]
fn test_greater_rejects_intervening_button() {
    let mut rig = Rig::new(&[("link", "a, >b")]);
    for bits in [InputBits::A, NEUTRAL, InputBits::C, InputBits::B] {
        rig.frame(bits);
        assert!(!rig.active("link"));
    }

    // without `>` the same inputs complete
    let mut loose = Rig::new(&[("link", "a, b")]);
    for bits in [InputBits::A, NEUTRAL, InputBits::C] {
        loose.frame(bits);
    }
    loose.frame(InputBits::B);
    assert!(loose.active("link"));
}

#[test]
fn test_release_fires_on_release() {
    let mut rig = Rig::new(&[("release", "~a")]);
    for _ in 0..3 {
        rig.frame(InputBits::A);
        assert!(!rig.active("release"));
    }
    rig.frame(NEUTRAL);
    assert!(rig.active("release"));
    rig.frame(NEUTRAL);
    assert!(!rig.active("release"));
}

#[test]
fn test_trailing_hold_completes_after_button() {
    let mut rig = Rig::new(&[("cancel", "x, /F")]);
    rig.frame(InputBits::X);
    assert!(!rig.active("cancel"));
    rig.frame(InputBits::RIGHT);
    assert!(rig.active("cancel"));

    let mut none = Rig::new(&[("cancel", "x, /F")]);
    for _ in 0..5 {
        none.frame(InputBits::RIGHT);
        assert!(!none.active("cancel"));
    }
}

#[test]
fn test_trailing_hold_waits_while_button_is_down() {
    // F held before x: the step waits until x is let go
    let mut rig = Rig::new(&[("cancel", "x, /F")]);
    rig.frame(InputBits::RIGHT);
    rig.frame(InputBits::RIGHT | InputBits::X);
    assert!(!rig.active("cancel"));
    rig.frame(InputBits::RIGHT | InputBits::X);
    assert!(!rig.active("cancel"));
    rig.frame(InputBits::RIGHT);
    assert!(rig.active("cancel"));
}

#[test]
fn test_direction_junction_keeps_progress() {
    let mut rig = Rig::new(&[("fd", "F, D")]);
    rig.frame(InputBits::RIGHT);
    rig.frame(NEUTRAL);
    assert!(!rig.active("fd"));
    rig.frame(InputBits::DOWN);
    assert!(rig.active("fd"));
}

#[test]
fn test_direction_junction_drops_stale_progress() {
    let mut rig = Rig::new(&[("fd", "F, D")]);
    for bits in [InputBits::RIGHT, NEUTRAL, InputBits::LEFT, InputBits::DOWN] {
        rig.frame(bits);
        assert!(!rig.active("fd"));
    }
}

#[test]
fn test_direction_junction_restarts_from_first_element() {
    let mut rig = Rig::new(&[("bfd", "B, F, D")]);
    let sequence = [
        InputBits::LEFT,
        InputBits::RIGHT,
        NEUTRAL,
        // stale: back again restarts the motion on this frame
        InputBits::LEFT,
        InputBits::RIGHT,
    ];
    for bits in sequence {
        rig.frame(bits);
        assert!(!rig.active("bfd"));
    }
    rig.frame(InputBits::DOWN);
    assert!(rig.active("bfd"));
}

#[test]
fn test_ai_charge_is_rolled() {
    // one frame of back: a human never charges, a CPU sometimes does
    let run = |seed: u64, ai: bool| {
        let mut rig = Rig::new(&[("sonic", "~30$B, F, a")]);
        rig.rng = SimRng::new(seed);
        rig.ai = ai;
        rig.frame(InputBits::LEFT);
        rig.frame(InputBits::RIGHT);
        rig.frame(InputBits::A);
        rig.active("sonic")
    };
    let cpu = (0..1000).filter(|&seed| run(seed, true)).count();
    let human = (0..1000).filter(|&seed| run(seed, false)).count();
    assert_eq!(human, 0);
    assert!(cpu > 0);
    assert!(cpu < 250);
}
