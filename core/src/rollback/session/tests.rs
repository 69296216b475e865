//! Tests for rollback session

use std::time::{Duration, Instant};

use ggrs::PlayerType;
use rollcade_shared::InputBits;

use super::{FrameStatus, NetState, RollbackSession, SessionType};
use crate::rollback::events::{MatchEndReason, SessionError, SessionEvent};
use crate::rollback::{ConnectionState, LocalSocket, SessionConfig};
use crate::sim::{Sandbox, SandboxConfig, Simulation, StepOutcome};
use crate::state::World;
use crate::test_utils::{sandbox_sync_test, script};

/// Keeps state outside the world, so resimulation diverges
struct Leaky {
    calls: i32,
}

impl Simulation for Leaky {
    fn simulate(&mut self, world: &mut World, _inputs: &[InputBits]) -> StepOutcome {
        self.calls += 1;
        world.cam.pos[0] = self.calls as f32;
        StepOutcome::Continue
    }
}

fn feed(session: &mut RollbackSession, inputs: &[InputBits]) {
    for (handle, &bits) in inputs.iter().enumerate() {
        session.add_local_input(handle, bits).unwrap();
    }
}

#[test]
fn test_local_session_advances_once_per_call() {
    let mut session = RollbackSession::new_local(2);
    let mut world = Sandbox::world(1, 2);
    let mut sim = Sandbox::default();
    assert_eq!(session.session_type(), SessionType::Local);
    assert_eq!(session.local_players(), &[0, 1]);
    assert_eq!(session.net_state(), NetState::Playing);

    feed(&mut session, &[InputBits::RIGHT, InputBits::LEFT]);
    let status = session.advance(&mut world, &mut sim).unwrap();
    assert_eq!(
        status,
        FrameStatus::Advanced {
            frames: 1,
            rolled_back: 0
        }
    );
    assert_eq!(session.current_frame(), 1);
    assert_eq!(world.time, 1);
    assert_eq!(world.slots[1].chars[0].input_flag, InputBits::LEFT);
}

#[test]
fn test_local_session_has_no_events_or_stats() {
    let mut session = RollbackSession::new_local(2);
    assert!(session.handle_events().is_empty());
    assert!(session.all_player_stats().is_empty());
    assert_eq!(session.connection_state(), ConnectionState::Running);
}

#[test]
fn test_match_over_closes_session() {
    let mut session = RollbackSession::new_local(2);
    let mut world = Sandbox::world(1, 2);
    let mut sim = Sandbox::new(SandboxConfig {
        match_frames: Some(2),
        ..Default::default()
    });

    assert!(matches!(
        session.advance(&mut world, &mut sim),
        Ok(FrameStatus::Advanced { .. })
    ));
    assert_eq!(
        session.advance(&mut world, &mut sim),
        Ok(FrameStatus::Ended(MatchEndReason::MatchOver))
    );
    assert!(session.is_closed());
    assert_eq!(session.net_state(), NetState::Ended);
    assert_eq!(
        session.advance(&mut world, &mut sim),
        Err(SessionError::Closed)
    );
    assert_eq!(
        session.add_local_input(0, InputBits::A),
        Err(SessionError::Closed)
    );
    assert_eq!(
        session.handle_events(),
        vec![SessionEvent::MatchEnded {
            reason: MatchEndReason::MatchOver
        }]
    );
}

#[test]
fn test_sync_test_sandbox_is_deterministic() {
    let (mut session, mut world, mut sim) = sandbox_sync_test(2, 4);
    assert_eq!(session.session_type(), SessionType::SyncTest);

    for inputs in script(120, 2) {
        feed(&mut session, &inputs);
        let status = session.advance(&mut world, &mut sim).unwrap();
        assert!(matches!(status, FrameStatus::Advanced { .. }));
    }
    assert!(!session.has_desync());
    assert!(session.total_rollback_frames() > 0);
    assert_eq!(world.time, 120);
    assert_eq!(session.current_frame(), 120);
}

#[test]
fn test_sync_test_catches_state_outside_world() {
    let config = SessionConfig::sync_test(1).with_check_distance(2);
    let mut session = RollbackSession::new_sync_test(config).unwrap();
    let mut world = Sandbox::world(1, 1);
    let mut sim = Leaky { calls: 0 };

    let mut error = None;
    for _ in 0..20 {
        session.add_local_input(0, InputBits::empty()).unwrap();
        if let Err(e) = session.advance(&mut world, &mut sim) {
            error = Some(e);
            break;
        }
    }
    assert!(matches!(error, Some(SessionError::Desync { .. })));
    assert!(session.has_desync());
    assert_eq!(session.net_state(), NetState::Error);
    assert!(
        session
            .handle_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::Desync { .. }))
    );
}

#[test]
fn test_ggrs_checksum_mismatch_keeps_reported_frame() {
    let (mut session, mut world, mut sim) = sandbox_sync_test(2, 4);
    for inputs in script(12, 2) {
        feed(&mut session, &inputs);
        session.advance(&mut world, &mut sim).unwrap();
    }
    let frame = session.current_frame() - 2;
    let local = session.snapshots().checksum_of(frame);
    assert!(local.is_some());

    let error = session.checksum_mismatch(session.current_frame(), &[frame + 1, frame]);
    assert_eq!(
        error,
        SessionError::Desync {
            frame,
            local_checksum: local.unwrap(),
            remote_checksum: local.unwrap(),
        }
    );
    assert!(session.has_desync());

    let current = session.current_frame();
    let error = session.checksum_mismatch(current, &[]);
    assert!(matches!(error, SessionError::Desync { frame, .. } if frame == current));
}

#[test]
fn test_close_releases_snapshots() {
    let (mut session, mut world, mut sim) = sandbox_sync_test(2, 2);
    for inputs in script(10, 2) {
        feed(&mut session, &inputs);
        session.advance(&mut world, &mut sim).unwrap();
    }
    assert!(!session.snapshots().is_empty());
    session.close(MatchEndReason::Quit);
    assert!(session.snapshots().is_empty());
    assert_eq!(session.snapshots().pooled(), 0);
    assert_eq!(session.end_reason(), Some(MatchEndReason::Quit));
}

#[test]
fn test_peer_disconnect_forces_match_end() {
    let mut session = RollbackSession::new_local(2);
    session.peer_disconnected(1);

    let notice = session.disconnect_notice().cloned().unwrap();
    assert_eq!(notice.message, "Player 2 disconnected.");
    assert_eq!(session.end_reason(), Some(MatchEndReason::PeerDisconnected));

    let events = session.handle_events();
    assert!(events.contains(&SessionEvent::DisconnectedFromPeer { notice }));
    assert!(events.contains(&SessionEvent::MatchEnded {
        reason: MatchEndReason::PeerDisconnected
    }));
    assert_eq!(session.connection_state(), ConnectionState::Disconnected);

    let mut world = Sandbox::world(1, 2);
    assert_eq!(
        session.advance(&mut world, &mut Sandbox::default()),
        Err(SessionError::Disconnected { player_handle: 1 })
    );
}

#[test]
fn test_p2p_stalls_until_synchronized() {
    let a = LocalSocket::bind_any().unwrap();
    let peer = LocalSocket::bind_any().unwrap();
    let players = vec![
        (0, PlayerType::Local),
        (1, PlayerType::Remote(peer.local_addr_string())),
    ];
    let mut session = RollbackSession::new_p2p(SessionConfig::online(2), a, players).unwrap();
    assert_eq!(session.session_type(), SessionType::P2P);
    assert_eq!(session.net_state(), NetState::Stopped);
    assert_eq!(session.local_players(), &[0]);

    let mut world = Sandbox::world(1, 2);
    assert_eq!(
        session.advance(&mut world, &mut Sandbox::default()),
        Ok(FrameStatus::Stalled)
    );
    assert_eq!(world.time, 0);
}

#[test]
fn test_p2p_peers_synchronize_over_udp() {
    let a = LocalSocket::bind_any().unwrap();
    let b = LocalSocket::bind_any().unwrap();
    let (addr_a, addr_b) = (a.local_addr_string(), b.local_addr_string());

    let mut host = RollbackSession::new_p2p(
        SessionConfig::online(2),
        a,
        vec![(0, PlayerType::Local), (1, PlayerType::Remote(addr_b))],
    )
    .unwrap();
    let mut guest = RollbackSession::new_p2p(
        SessionConfig::online(2),
        b,
        vec![(0, PlayerType::Remote(addr_a)), (1, PlayerType::Local)],
    )
    .unwrap();

    let mut host_events = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    while !(host.is_running() && guest.is_running()) && Instant::now() < deadline {
        host.poll_remote_clients();
        guest.poll_remote_clients();
        host_events.extend(host.handle_events());
        guest.handle_events();
        std::thread::sleep(Duration::from_millis(2));
    }
    host_events.extend(host.handle_events());

    assert!(host.is_running() && guest.is_running());
    assert!(host_events.contains(&SessionEvent::ConnectedToPeer { player_handle: 1 }));
    assert!(host_events.contains(&SessionEvent::Running));
    assert_eq!(host.connection_state(), ConnectionState::Running);
    assert_eq!(host.net_state(), NetState::Playing);
}
